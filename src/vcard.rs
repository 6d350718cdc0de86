//! Builds vCard 3.0 contact cards. A [`Contact`] holds the raw fields as they
//! come from the project file or the command line; [`Contact::to_vcard`]
//! resolves the names, validates the URLs and the PGP fingerprint, and
//! produces the folded vCard text.

use log::{info, warn};
use serde::Deserialize;
use std::fmt;

/// Payloads above this many bytes make dense QR codes that some scanners
/// struggle with.
pub const WARN_QR_BYTES: usize = 2000;

/// The largest payload we're willing to encode into a QR code.
pub const MAX_QR_BYTES: usize = 2950;

/// vCard lines longer than this are folded.
const FOLD_WIDTH: usize = 75;

/// The line terminator used in the vCard text.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    Crlf,
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Crlf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        LineEnding::Crlf
    }
}

impl std::str::FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "crlf" => Ok(LineEnding::Crlf),
            "lf" => Ok(LineEnding::Lf),
            _ => Err(format!("unknown line ending `{}`", s)),
        }
    }
}

/// The raw contact fields. Every field is optional on its own, but at least
/// one of `name`, `given`, and `surname` must be set.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Contact {
    /// The full formatted name (FN). Used to derive `given` and `surname` when
    /// neither is provided.
    pub name: String,
    pub given: String,
    pub surname: String,

    /// Populates NICKNAME and X-PREFERRED-NAME, and leads the FN when `name`
    /// is empty.
    pub preferred_name: String,
    pub email: String,
    pub phone: String,

    /// A GitHub username or a full profile URL.
    pub github: String,
    pub city: String,
    pub country: String,
    pub note: String,

    /// An http(s) URL for the contact photo. Inline images aren't supported.
    pub avatar: String,

    /// An http(s) URL for the public PGP key.
    pub pgp_key_uri: String,

    /// An 8, 16, or 40 hex-digit key id or fingerprint. Separators are
    /// ignored.
    pub pgp_fingerprint: String,
    pub line_ending: LineEnding,
}

/// The structured name fields resolved from a [`Contact`].
#[derive(Debug, PartialEq)]
pub struct Names {
    /// The formatted name (FN).
    pub formatted: String,
    pub given: String,
    pub surname: String,
}

impl Contact {
    /// Resolves the structured name and the formatted name.
    pub fn names(&self) -> Result<Names> {
        let name = self.name.trim();
        let mut given = self.given.trim().to_owned();
        let mut surname = self.surname.trim().to_owned();
        if name.is_empty() && given.is_empty() && surname.is_empty() {
            return Err(Error::MissingName);
        }

        if given.is_empty() && surname.is_empty() {
            let tokens: Vec<&str> = name.split_whitespace().collect();
            match tokens.split_last() {
                Some((last, rest)) if !rest.is_empty() => {
                    surname = (*last).to_owned();
                    given = rest.join(" ");
                }
                _ => given = name.to_owned(),
            }
        }

        let preferred = self.preferred_name.trim();
        let formatted = if !name.is_empty() {
            name.to_owned()
        } else if !preferred.is_empty() {
            match surname.is_empty() {
                true => preferred.to_owned(),
                false => format!("{} {}", preferred, surname),
            }
        } else {
            [given.as_str(), surname.as_str()]
                .iter()
                .filter(|part| !part.is_empty())
                .cloned()
                .collect::<Vec<&str>>()
                .join(" ")
        };

        Ok(Names {
            formatted,
            given,
            surname,
        })
    }

    /// The GitHub profile URL, if any.
    pub fn github_url(&self) -> Option<String> {
        let github = self.github.trim();
        match github.is_empty() {
            true => None,
            false if is_http_url(github) => Some(github.to_owned()),
            false => Some(format!("https://github.com/{}", github)),
        }
    }

    /// Builds the vCard text. The output always ends with a line ending.
    pub fn to_vcard(&self) -> Result<String> {
        let names = self.names()?;
        let fingerprint = normalize_fingerprint(&self.pgp_fingerprint)?;
        match fingerprint.len() {
            8 => warn!(
                "8-hex short key id is collision-prone; prefer the 16-hex \
                 long key id or the full 40-hex fingerprint"
            ),
            16 => info!(
                "using a 16-hex long key id; include the full fingerprint if \
                 possible"
            ),
            _ => {}
        }

        let mut lines: Vec<String> = vec![
            String::from("BEGIN:VCARD"),
            String::from("VERSION:3.0"),
            format!("FN:{}", escape(&names.formatted)),
            format!("N:{};{};;;", escape(&names.surname), escape(&names.given)),
        ];

        if !self.phone.is_empty() {
            lines.push(format!("TEL;TYPE=CELL:{}", escape(&self.phone)));
        }
        if !self.email.is_empty() {
            lines.push(format!("EMAIL;TYPE=INTERNET:{}", escape(&self.email)));
        }

        if let Some(url) = self.github_url() {
            let url = escape(&url);
            lines.push(format!("URL:{}", url));
            lines.push(format!("X-SOCIALPROFILE;TYPE=github:{}", url));
            lines.push(format!("item1.URL;type=pref:{}", url));
            lines.push(String::from("item1.X-ABLabel:GitHub"));
        }

        if !self.city.is_empty() || !self.country.is_empty() {
            lines.push(format!(
                "ADR:;;;{};;{}",
                escape(&self.city),
                escape(&self.country)
            ));
        }
        if !self.note.is_empty() {
            lines.push(format!("NOTE:{}", escape(&self.note)));
        }

        if !self.avatar.is_empty() {
            if !is_http_url(&self.avatar) {
                return Err(Error::AvatarNotHttp(self.avatar.clone()));
            }
            lines.push(format!("PHOTO;VALUE=URI:{}", escape(&self.avatar)));
        }
        if !self.pgp_key_uri.is_empty() {
            if !is_http_url(&self.pgp_key_uri) {
                return Err(Error::PgpKeyNotHttp(self.pgp_key_uri.clone()));
            }
            lines.push(format!("KEY;VALUE=URI:{}", escape(&self.pgp_key_uri)));
        }
        if !fingerprint.is_empty() {
            lines.push(format!("X-PGP-FP:{}", fingerprint));
        }

        let preferred = self.preferred_name.trim();
        if !preferred.is_empty() {
            let preferred = escape(preferred);
            lines.push(format!("NICKNAME:{}", preferred));
            lines.push(format!("X-PREFERRED-NAME:{}", preferred));
        }

        lines.push(String::from("END:VCARD"));

        let line_ending = self.line_ending.as_str();
        let mut out = String::new();
        for line in &lines {
            out.push_str(&fold(line, line_ending));
            out.push_str(line_ending);
        }
        check_size(&out)?;
        Ok(out)
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Escapes a vCard property value.
pub fn escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace(';', "\\;")
        .replace(',', "\\,")
        .replace("\r\n", "\\n")
        .replace('\n', "\\n")
}

/// Splits `line` into chunks of at most 75 characters, each continuation
/// prefixed with a single space.
pub fn fold(line: &str, line_ending: &str) -> String {
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= FOLD_WIDTH {
        return line.to_owned();
    }
    chars
        .chunks(FOLD_WIDTH)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<String>>()
        .join(&format!("{} ", line_ending))
}

/// Strips separators from a PGP fingerprint and uppercases it. An empty input
/// yields an empty output.
pub fn normalize_fingerprint(fp: &str) -> Result<String> {
    if fp.trim().is_empty() {
        return Ok(String::new());
    }
    let hex: String = fp
        .chars()
        .filter(char::is_ascii_hexdigit)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    match hex.len() {
        8 | 16 | 40 => Ok(hex),
        _ => Err(Error::Fingerprint(fp.to_owned())),
    }
}

fn check_size(vcard: &str) -> Result<()> {
    let len = vcard.len();
    if len > MAX_QR_BYTES {
        return Err(Error::TooLarge(len));
    }
    if len > WARN_QR_BYTES {
        warn!(
            "vCard is {} bytes; large payloads make dense QR codes that some \
             scanners struggle to read",
            len
        );
    }
    Ok(())
}

/// The result of building a vCard.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem building a vCard.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// Returned when none of `name`, `given`, and `surname` is set.
    MissingName,

    /// Returned when the avatar isn't an http(s) URL.
    AvatarNotHttp(String),

    /// Returned when the PGP key location isn't an http(s) URL.
    PgpKeyNotHttp(String),

    /// Returned when the fingerprint doesn't have 8, 16, or 40 hex digits.
    Fingerprint(String),

    /// Returned when the vCard exceeds [`MAX_QR_BYTES`]. Holds the size.
    TooLarge(usize),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingName => write!(
                f,
                "a name is required: set `name` or `given`/`surname`"
            ),
            Error::AvatarNotHttp(url) => {
                write!(f, "avatar must be an http(s) URL; found '{}'", url)
            }
            Error::PgpKeyNotHttp(url) => {
                write!(f, "PGP key URI must be an http(s) URL; found '{}'", url)
            }
            Error::Fingerprint(fp) => write!(
                f,
                "PGP fingerprint '{}' must be 8, 16, or 40 hex characters",
                fp
            ),
            Error::TooLarge(len) => write!(
                f,
                "vCard is {} bytes, more than the {} a practical QR code \
                 holds; shorten or remove fields",
                len, MAX_QR_BYTES
            ),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;

    fn contact(name: &str) -> Contact {
        Contact {
            name: name.to_owned(),
            ..Contact::default()
        }
    }

    #[test]
    fn test_minimal_vcard() -> Result<()> {
        assert_eq!(
            "BEGIN:VCARD\r\n\
             VERSION:3.0\r\n\
             FN:Jane Q Doe\r\n\
             N:Doe;Jane Q;;;\r\n\
             END:VCARD\r\n",
            contact("Jane Q Doe").to_vcard()?
        );
        Ok(())
    }

    #[test]
    fn test_lf_line_endings() -> Result<()> {
        let mut c = contact("Jane");
        c.line_ending = LineEnding::Lf;
        assert_eq!(
            "BEGIN:VCARD\nVERSION:3.0\nFN:Jane\nN:;Jane;;;\nEND:VCARD\n",
            c.to_vcard()?
        );
        Ok(())
    }

    #[test]
    fn test_missing_name() {
        assert_eq!(Err(Error::MissingName), Contact::default().to_vcard());
    }

    #[test]
    fn test_formatted_name_from_preferred_name() -> Result<()> {
        let c = Contact {
            given: String::from("Jonathan"),
            surname: String::from("Smith"),
            preferred_name: String::from("Jon"),
            ..Contact::default()
        };
        let names = c.names()?;
        assert_eq!("Jon Smith", names.formatted);
        assert_eq!("Jonathan", names.given);
        assert_eq!("Smith", names.surname);
        Ok(())
    }

    #[test]
    fn test_formatted_name_from_parts() -> Result<()> {
        let c = Contact {
            surname: String::from("Smith"),
            ..Contact::default()
        };
        assert_eq!("Smith", c.names()?.formatted);
        Ok(())
    }

    #[test]
    fn test_all_fields_in_order() -> Result<()> {
        let c = Contact {
            name: String::from("Jane Doe"),
            preferred_name: String::from("JD"),
            email: String::from("jane@example.org"),
            phone: String::from("+1-555-0100"),
            github: String::from("janedoe"),
            city: String::from("Oslo"),
            country: String::from("Norway"),
            note: String::from("Open for hire; remote, too"),
            avatar: String::from("https://example.org/a.jpg"),
            pgp_key_uri: String::from("https://example.org/key.asc"),
            pgp_fingerprint: String::from("dead beef cafe f00d"),
            line_ending: LineEnding::Lf,
            ..Contact::default()
        };
        let wanted = "BEGIN:VCARD\n\
                      VERSION:3.0\n\
                      FN:Jane Doe\n\
                      N:Doe;Jane;;;\n\
                      TEL;TYPE=CELL:+1-555-0100\n\
                      EMAIL;TYPE=INTERNET:jane@example.org\n\
                      URL:https://github.com/janedoe\n\
                      X-SOCIALPROFILE;TYPE=github:https://github.com/janedoe\n\
                      item1.URL;type=pref:https://github.com/janedoe\n\
                      item1.X-ABLabel:GitHub\n\
                      ADR:;;;Oslo;;Norway\n\
                      NOTE:Open for hire\\; remote\\, too\n\
                      PHOTO;VALUE=URI:https://example.org/a.jpg\n\
                      KEY;VALUE=URI:https://example.org/key.asc\n\
                      X-PGP-FP:DEADBEEFCAFEF00D\n\
                      NICKNAME:JD\n\
                      X-PREFERRED-NAME:JD\n\
                      END:VCARD\n";
        assert_eq!(wanted, c.to_vcard()?);
        Ok(())
    }

    #[test]
    fn test_github_url_kept() {
        let c = Contact {
            github: String::from("https://gitlab.com/jane"),
            ..Contact::default()
        };
        assert_eq!(Some(String::from("https://gitlab.com/jane")), c.github_url());
    }

    #[test]
    fn test_avatar_must_be_http() {
        let mut c = contact("Jane");
        c.avatar = String::from("/home/jane/me.jpg");
        assert_eq!(
            Err(Error::AvatarNotHttp(String::from("/home/jane/me.jpg"))),
            c.to_vcard()
        );
    }

    #[test]
    fn test_pgp_key_must_be_http() {
        let mut c = contact("Jane");
        c.pgp_key_uri = String::from("ftp://example.org/key.asc");
        assert!(matches!(c.to_vcard(), Err(Error::PgpKeyNotHttp(_))));
    }

    #[test]
    fn test_escape() {
        assert_eq!("a\\\\b\\;c\\,d\\ne\\nf", escape("a\\b;c,d\r\ne\nf"));
    }

    #[test]
    fn test_fold() {
        let line = "x".repeat(160);
        let folded = fold(&line, "\r\n");
        let parts: Vec<&str> = folded.split("\r\n ").collect();
        assert_eq!(vec![75, 75, 10], parts.iter().map(|p| p.len()).collect::<Vec<_>>());
        assert_eq!("short", fold("short", "\r\n"));
    }

    #[test]
    fn test_fingerprint() -> Result<()> {
        assert_eq!("", normalize_fingerprint("  ")?);
        assert_eq!("0123ABCD", normalize_fingerprint("0123 abcd")?);
        assert_eq!(
            "0123456789ABCDEF0123456789ABCDEF01234567",
            normalize_fingerprint("0123 4567 89ab cdef 0123  4567 89AB CDEF 0123 4567")?
        );
        assert!(matches!(
            normalize_fingerprint("0123abc"),
            Err(Error::Fingerprint(_))
        ));
        Ok(())
    }

    #[test]
    fn test_too_large() {
        let mut c = contact("Jane");
        c.note = "n".repeat(MAX_QR_BYTES);
        assert!(matches!(c.to_vcard(), Err(Error::TooLarge(_))));
    }

    #[test]
    fn test_deserialize() {
        let c: Contact = serde_yaml::from_str(
            "name: Jane Doe\ngithub: janedoe\nline_ending: lf\n",
        )
        .unwrap();
        assert_eq!("Jane Doe", c.name);
        assert_eq!(LineEnding::Lf, c.line_ending);
        assert_eq!("", c.email);
    }
}
