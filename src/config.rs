//! Loads the site configuration from a `site.yaml` project file. The project
//! file lives at the root of the site project; every other path in it (the
//! layout, the static directory, the content file, and the output directory)
//! is resolved relative to that root.

use crate::vcard::Contact;
use serde::Deserialize;
use serde_yaml::Value as YamlValue;
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE_NAME: &str = "site.yaml";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    title: String,
    base_url: String,

    #[serde(default = "default_language_code")]
    language_code: String,

    #[serde(default)]
    params: BTreeMap<String, YamlValue>,

    #[serde(default = "default_layout")]
    layout: PathBuf,

    #[serde(default = "default_static_dir")]
    static_dir: PathBuf,

    #[serde(default = "default_content")]
    content: PathBuf,

    #[serde(default = "default_output_dir")]
    output_dir: PathBuf,

    #[serde(default)]
    contact: Option<Contact>,
}

fn default_language_code() -> String {
    String::from("en-us")
}

fn default_layout() -> PathBuf {
    PathBuf::from("layouts/index.html")
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("static")
}

fn default_content() -> PathBuf {
    PathBuf::from("content/_index.md")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("public")
}

/// A single theme toggle from the `params` section of the project file. Only
/// scalars are allowed; the params table is flat.
#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Param::Bool(b) => b.fmt(f),
            Param::Integer(i) => i.fmt(f),
            Param::Float(x) => x.fmt(f),
            Param::String(s) => s.fmt(f),
        }
    }
}

/// The site-wide settings made available to the layout template as `.Site`.
#[derive(Clone, Debug)]
pub struct Site {
    /// The site title. Always present in the rendered page.
    pub title: String,

    /// The absolute URL the site is published under. Always ends in a
    /// trailing slash so that relative references join beneath it.
    pub base_url: Url,

    /// The `lang` of the rendered document.
    pub language_code: String,

    /// Flat theme toggles, ordered by key.
    pub params: BTreeMap<String, Param>,
}

/// The resolved configuration for a build. Paths are absolute or relative to
/// the process working directory, never to the project file.
pub struct Config {
    pub site: Site,

    /// The layout template file.
    pub layout: PathBuf,

    /// The directory of assets copied verbatim into the output. May not exist.
    pub static_directory: PathBuf,

    /// The optional markdown content for the page.
    pub content_file: PathBuf,

    /// The directory the site is published into.
    pub output_directory: PathBuf,

    /// Contact details to publish as a vCard and QR code alongside the page.
    pub contact: Option<Contact>,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a [`PROJECT_FILE_NAME`]
    /// file and loads the first one found. `dir` is canonicalized first, so a
    /// relative `dir` such as `.` still reaches the real ancestors.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let dir = dir.canonicalize().map_err(|err| Error::Open {
            path: dir.to_owned(),
            err,
        })?;
        match find_project_file(&dir) {
            Some(path) => Config::from_project_file(&path),
            None => Err(Error::ProjectFileNotFound),
        }
    }

    /// Loads the configuration from the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project =
            serde_yaml::from_reader(file).map_err(|err| Error::Yaml {
                path: path.to_owned(),
                err,
            })?;
        let project_root = path
            .parent()
            .ok_or_else(|| Error::NoParentDirectory(path.to_owned()))?;
        Config::from_project(project, project_root)
    }

    /// Parses a configuration from YAML `input`, resolving paths against
    /// `project_root`.
    pub fn parse(input: &str, project_root: &Path) -> Result<Config> {
        let project: Project =
            serde_yaml::from_str(input).map_err(|err| Error::Yaml {
                path: project_root.join(PROJECT_FILE_NAME),
                err,
            })?;
        Config::from_project(project, project_root)
    }

    fn from_project(project: Project, project_root: &Path) -> Result<Config> {
        if project.title.trim().is_empty() {
            return Err(Error::EmptyTitle);
        }

        Ok(Config {
            site: Site {
                title: project.title,
                base_url: parse_base_url(&project.base_url)?,
                language_code: project.language_code,
                params: project
                    .params
                    .into_iter()
                    .map(|(key, value)| {
                        let param = to_param(&key, value)?;
                        Ok((key, param))
                    })
                    .collect::<Result<BTreeMap<String, Param>>>()?,
            },
            layout: project_root.join(project.layout),
            static_directory: project_root.join(project.static_dir),
            content_file: project_root.join(project.content),
            output_directory: project_root.join(project.output_dir),
            contact: project.contact,
        })
    }
}

// The base URL must be absolute. A missing trailing slash is added, otherwise
// `Url::join` would treat the last path segment as a file name and drop it.
fn find_project_file(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .map(|ancestor| ancestor.join(PROJECT_FILE_NAME))
        .find(|path| path.exists())
}

fn parse_base_url(input: &str) -> Result<Url> {
    let mut url = Url::parse(input).map_err(|err| Error::BaseUrl {
        url: input.to_owned(),
        err,
    })?;
    match url.scheme() {
        "http" | "https" | "file" => {}
        scheme => return Err(Error::BaseUrlScheme(scheme.to_owned())),
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn to_param(key: &str, value: YamlValue) -> Result<Param> {
    match value {
        YamlValue::Bool(b) => Ok(Param::Bool(b)),
        YamlValue::String(s) => Ok(Param::String(s)),
        YamlValue::Number(n) => match n.as_i64() {
            Some(i) => Ok(Param::Integer(i)),
            None => n
                .as_f64()
                .map(Param::Float)
                .ok_or_else(|| Error::UnsupportedParam(key.to_owned())),
        },
        _ => Err(Error::UnsupportedParam(key.to_owned())),
    }
}

/// The result of loading a configuration.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when no project file exists in the directory or any parent.
    ProjectFileNotFound,

    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid YAML or doesn't match the
    /// expected shape.
    Yaml {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when the project file path has no parent directory.
    NoParentDirectory(PathBuf),

    /// Returned when the title is blank.
    EmptyTitle,

    /// Returned when the base URL isn't an absolute URL.
    BaseUrl { url: String, err: url::ParseError },

    /// Returned when the base URL has a scheme a browser can't load a site
    /// from.
    BaseUrlScheme(String),

    /// Returned when a param is a list, a map, or null.
    UnsupportedParam(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::ProjectFileNotFound => write!(
                f,
                "Could not find `{}` in any parent directory",
                PROJECT_FILE_NAME
            ),
            Error::Open { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::Yaml { path, err } => {
                write!(f, "Parsing project file '{}': {}", path.display(), err)
            }
            Error::NoParentDirectory(path) => write!(
                f,
                "Can't get parent directory for project file '{}'",
                path.display()
            ),
            Error::EmptyTitle => write!(f, "`title` must not be empty"),
            Error::BaseUrl { url, err } => {
                write!(f, "Invalid `base_url` '{}': {}", url, err)
            }
            Error::BaseUrlScheme(scheme) => write!(
                f,
                "`base_url` must use http, https, or file; found '{}'",
                scheme
            ),
            Error::UnsupportedParam(key) => write!(
                f,
                "param `{}` must be a string, number, or boolean",
                key
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Yaml { path: _, err } => Some(err),
            Error::BaseUrl { url: _, err } => Some(err),
            _ => None,
        }
    }
}
