//! Asks for the [`Contact`] fields the command line left empty. Email, phone,
//! and note are read without echo when the prompter hides sensitive input,
//! since passing them as flags exposes them in the process list.

use crate::vcard::Contact;
use log::debug;
use std::io::{self, BufRead, Write};

/// Reads answers line by line from `input`, writing the questions to
/// `output`. End of input answers every remaining question with nothing.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    hide_sensitive: bool,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Prompter<R, W> {
        Prompter {
            input,
            output,
            hide_sensitive: false,
        }
    }

    /// Reads sensitive answers from the terminal without echoing them. Falls
    /// back to `input` when there is no terminal.
    pub fn hide_sensitive(mut self) -> Prompter<R, W> {
        self.hide_sensitive = true;
        self
    }

    /// Asks for every empty field of `contact`, in the order a person would
    /// fill in a card. The full name is only asked for when neither a given
    /// name nor a surname was provided.
    pub fn fill_missing(&mut self, contact: &mut Contact) -> io::Result<()> {
        self.fill(&mut contact.given, "Given name (first name) (optional): ")?;
        self.fill(&mut contact.surname, "Surname / family name (optional): ")?;
        self.fill(
            &mut contact.preferred_name,
            "Preferred name / nickname (optional): ",
        )?;
        if contact.given.is_empty() && contact.surname.is_empty() {
            self.fill(
                &mut contact.name,
                "Full formatted name (required if no given/surname): ",
            )?;
        }

        self.fill_hidden(&mut contact.email, "Email (optional): ")?;
        self.fill_hidden(&mut contact.phone, "Phone (optional): ")?;
        self.fill_hidden(&mut contact.note, "Note/comment (optional): ")?;

        self.fill(
            &mut contact.avatar,
            "Avatar URL to include? (leave blank to skip) ",
        )?;
        self.fill(
            &mut contact.pgp_key_uri,
            "PGP public key URL to include? (leave blank to skip) ",
        )?;
        self.fill(
            &mut contact.pgp_fingerprint,
            "PGP fingerprint (40, 16, or 8 hex characters) (leave blank to skip): ",
        )?;
        self.fill(&mut contact.country, "Country (optional): ")?;
        self.fill(&mut contact.city, "City/locality (optional): ")?;
        self.fill(&mut contact.github, "GitHub username or full URL (optional): ")
    }

    fn fill(&mut self, field: &mut String, question: &str) -> io::Result<()> {
        if field.is_empty() {
            *field = self.ask(question)?;
        }
        Ok(())
    }

    fn fill_hidden(&mut self, field: &mut String, question: &str) -> io::Result<()> {
        if !field.is_empty() {
            return Ok(());
        }
        if self.hide_sensitive {
            match rpassword::prompt_password(question) {
                Ok(answer) => {
                    *field = answer.trim().to_owned();
                    return Ok(());
                }
                Err(e) => debug!("reading without echo: {}; echoing instead", e),
            }
        }
        self.fill(field, question)
    }

    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_owned())
    }
}
