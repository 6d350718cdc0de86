//! Defines [`Content`], the optional markdown body of the landing page, and
//! the logic for parsing it from its source file. The source file must be
//! structured as follows:
//!
//! 1. Initial frontmatter fence (a first line of exactly `---`)
//! 2. YAML frontmatter with optional fields `Title`, `Date`, and `Description`
//! 3. Terminal frontmatter fence (the next line of exactly `---`)
//! 4. Markdown body
//!
//! For example:
//!
//! ```md
//! ---
//! Title: Hi, I'm Jane
//! Date: 2021-04-16
//! ---
//! I write *software*.
//! ```

use chrono::NaiveDate;
use pulldown_cmark::{html, Options, Parser};
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const FENCE: &str = "---";

/// The format of `Date` in the frontmatter.
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Frontmatter {
    #[serde(default, rename = "Title")]
    title: Option<String>,

    #[serde(default, rename = "Date")]
    date: Option<String>,

    #[serde(default, rename = "Description")]
    description: Option<String>,
}

/// The parsed landing-page content.
#[derive(Clone, Debug, PartialEq)]
pub struct Content {
    /// The page title. The site title is used when this is absent.
    pub title: Option<String>,

    /// A short summary, typically for the `description` meta tag.
    pub description: Option<String>,
    pub date: Option<NaiveDate>,

    /// The markdown body rendered to HTML.
    pub body: String,
}

impl Content {
    /// Loads content from `path`. Returns `Ok(None)` if the file doesn't
    /// exist, since the content file is optional.
    pub fn from_file(path: &Path) -> Result<Option<Content>> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::annotate(path, Error::Io(e))),
        };
        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| Error::annotate(path, Error::Io(e)))?;
        match Content::parse(&contents) {
            Ok(content) => Ok(Some(content)),
            Err(e) => Err(Error::annotate(path, e)),
        }
    }

    /// Parses content from its source text.
    pub fn parse(input: &str) -> Result<Content> {
        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter =
            match input[yaml_start..yaml_stop].trim().is_empty() {
                true => Frontmatter {
                    title: None,
                    date: None,
                    description: None,
                },
                false => serde_yaml::from_str(&input[yaml_start..yaml_stop])?,
            };

        let date = match &frontmatter.date {
            Some(date) => Some(NaiveDate::parse_from_str(date, DATE_FORMAT)?),
            None => None,
        };

        Ok(Content {
            title: frontmatter.title,
            description: frontmatter.description,
            date,
            body: to_html(&input[body_start..]),
        })
    }
}

// Fences are whole lines: the first line of the input and the next line that
// is exactly `---`. A `---` inside a frontmatter value isn't a fence.
fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
    let mut lines = input.split_inclusive('\n');
    let yaml_start = match lines.next() {
        Some(line) if is_fence(line) => line.len(),
        _ => return Err(Error::FrontmatterMissingStartFence),
    };

    let mut offset = yaml_start;
    for line in lines {
        if is_fence(line) {
            // (yaml_start, yaml_stop, body_start)
            return Ok((yaml_start, offset, offset + line.len()));
        }
        offset += line.len();
    }
    Err(Error::FrontmatterMissingEndFence)
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches(|c: char| c == '\n' || c == '\r') == FENCE
}

fn to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(markdown, options));
    out
}

/// Represents the result of a [`Content`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Content`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when the source is missing its starting frontmatter fence
    /// (`---`).
    FrontmatterMissingStartFence,

    /// Returned when the source is missing its terminal frontmatter fence
    /// (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when `Date` isn't formatted as `YYYY-MM-DD`.
    Date(chrono::ParseError),

    /// Returned for I/O errors reading the source file.
    Io(io::Error),

    /// An error with the path of the source file.
    Annotated(PathBuf, Box<Error>),
}

impl Error {
    fn annotate(path: &Path, err: Error) -> Error {
        Error::Annotated(path.to_owned(), Box::new(err))
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Content must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Date(err) => write!(f, "Parsing `Date`: {}", err),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(path, err) => {
                write!(f, "parsing content `{}`: {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Date(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Error {
        Error::Date(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse() -> Result<()> {
        let content = Content::parse(
            "---\nTitle: Hello\nDate: 2021-04-16\nDescription: About me\n---\n# Hi\n\nI write *software*.\n",
        )?;
        assert_eq!(Some(String::from("Hello")), content.title);
        assert_eq!(Some(String::from("About me")), content.description);
        assert_eq!(NaiveDate::from_ymd_opt(2021, 4, 16), content.date);
        assert_eq!(
            "<h1>Hi</h1>\n<p>I write <em>software</em>.</p>\n",
            content.body
        );
        Ok(())
    }

    #[test]
    fn test_empty_frontmatter() -> Result<()> {
        let content = Content::parse("---\n---\nplain")?;
        assert_eq!(None, content.title);
        assert_eq!(None, content.date);
        assert_eq!("<p>plain</p>\n", content.body);
        Ok(())
    }

    #[test]
    fn test_missing_start_fence() {
        assert!(matches!(
            Content::parse("Title: x\n---\n"),
            Err(Error::FrontmatterMissingStartFence)
        ));
    }

    #[test]
    fn test_fence_inside_value() -> Result<()> {
        let content = Content::parse("---\nTitle: Q&A --- notes\n---\nbody")?;
        assert_eq!(Some(String::from("Q&A --- notes")), content.title);
        assert_eq!("<p>body</p>\n", content.body);
        Ok(())
    }

    #[test]
    fn test_fence_must_be_whole_line() {
        assert!(matches!(
            Content::parse("----\nTitle: x\n----\nbody"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            Content::parse("---\nTitle: x\n--- not a fence\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_crlf_fences() -> Result<()> {
        let content = Content::parse("---\r\nTitle: Hello\r\n---\r\nbody")?;
        assert_eq!(Some(String::from("Hello")), content.title);
        assert_eq!("<p>body</p>\n", content.body);
        Ok(())
    }

    #[test]
    fn test_missing_end_fence() {
        assert!(matches!(
            Content::parse("---\nTitle: x\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_bad_date() {
        assert!(matches!(
            Content::parse("---\nDate: April 16\n---\n"),
            Err(Error::Date(_))
        ));
    }

    #[test]
    fn test_missing_file() -> Result<()> {
        assert_eq!(
            None,
            Content::from_file(Path::new("./testdata/does-not-exist.md"))?
        );
        Ok(())
    }

    #[test]
    fn test_from_file() -> Result<()> {
        let content =
            Content::from_file(Path::new("./testdata/site/content/_index.md"))?;
        assert!(content.is_some());
        Ok(())
    }
}
