//! Writes a built site to its output directory. Publishing is all-or-nothing:
//! everything is written into a staging directory next to the output
//! directory, and only once that succeeds is the old output directory moved
//! aside and replaced. A failed publish removes the staging directory and
//! leaves the previous output where it was.

use log::{debug, info, warn};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A generated file to publish.
#[derive(Clone, Debug)]
pub struct Artifact {
    /// The file's path relative to the output directory.
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl Artifact {
    pub fn new<P: Into<PathBuf>, C: Into<Vec<u8>>>(path: P, contents: C) -> Artifact {
        Artifact {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Publishes [`Artifact`]s and the static assets into an output directory.
pub struct Publisher<'a> {
    /// The directory to publish into. It's replaced wholesale.
    pub output_directory: &'a Path,

    /// Assets copied verbatim into the output. Skipped if it doesn't exist.
    /// Artifacts win over static files with the same path.
    pub static_directory: &'a Path,
}

impl Publisher<'_> {
    /// Publishes `artifacts` and the static assets.
    pub fn publish(&self, artifacts: &[Artifact]) -> Result<()> {
        let staging = sibling(self.output_directory, "staging")?;
        let aside = sibling(self.output_directory, "old")?;
        rmdir(&staging)?;
        rmdir(&aside)?;
        std::fs::create_dir_all(&staging).map_err(|err| Error::Write {
            path: staging.clone(),
            err,
        })?;

        let result = self
            .fill(&staging, artifacts)
            .and_then(|()| self.swap(&staging, &aside));
        if let Err(e) = result {
            // The first error is the one worth reporting.
            let _ = rmdir(&staging);
            return Err(e);
        }
        info!(
            "published {} file(s) to '{}'",
            artifacts.len(),
            self.output_directory.display()
        );
        Ok(())
    }

    // Moves the old output aside, moves staging into place, and only then
    // deletes the old output. If the second move fails the old output is
    // moved back.
    fn swap(&self, staging: &Path, aside: &Path) -> Result<()> {
        let output = self.output_directory;
        let had_output = match std::fs::metadata(output) {
            Ok(meta) if meta.is_dir() => true,
            Ok(_) => return Err(Error::NotADirectory(output.to_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                return Err(Error::Clean {
                    path: output.to_owned(),
                    err,
                })
            }
        };

        if had_output {
            rename(output, aside)?;
        }
        if let Err(e) = rename(staging, output) {
            if had_output {
                if let Err(restore) = std::fs::rename(aside, output) {
                    warn!(
                        "previous output left at '{}': {}",
                        aside.display(),
                        restore
                    );
                }
            }
            return Err(e);
        }
        if had_output {
            if let Err(e) = rmdir(aside) {
                warn!("{}", e);
            }
        }
        Ok(())
    }

    fn fill(&self, staging: &Path, artifacts: &[Artifact]) -> Result<()> {
        if self.static_directory.is_dir() {
            copy_dir(self.static_directory, staging)?;
        } else {
            debug!(
                "no static directory at '{}'; skipping",
                self.static_directory.display()
            );
        }

        for artifact in artifacts {
            let path = staging.join(&artifact.path);
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).map_err(|err| Error::Write {
                    path: dir.to_owned(),
                    err,
                })?;
            }
            std::fs::write(&path, &artifact.contents).map_err(|err| Error::Write {
                path: path.clone(),
                err,
            })?;
            debug!("wrote '{}'", artifact.path.display());
        }
        Ok(())
    }
}

/// Removes the output directory. A missing directory isn't an error.
pub fn clean(output_directory: &Path) -> Result<()> {
    rmdir(output_directory)?;
    rmdir(&sibling(output_directory, "staging")?)?;
    rmdir(&sibling(output_directory, "old")?)
}

// Staging and the old output live in hidden siblings of the output
// directory (`.<name>.staging`, `.<name>.old`), so that renames stay on one
// file system.
fn sibling(output_directory: &Path, suffix: &str) -> Result<PathBuf> {
    match output_directory.file_name() {
        Some(name) => Ok(output_directory.with_file_name(format!(
            ".{}.{}",
            name.to_string_lossy(),
            suffix
        ))),
        None => Err(Error::InvalidOutputDirectory(output_directory.to_owned())),
    }
}

fn rename(from: &Path, to: &Path) -> Result<()> {
    std::fs::rename(from, to).map_err(|err| Error::Rename {
        from: from.to_owned(),
        to: to.to_owned(),
        err,
    })
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    for result in WalkDir::new(src) {
        let entry = result?;
        // strip_prefix shouldn't fail since `src` is always an ancestor of
        // `entry.path()`
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(|err| Error::Write {
                path: target.clone(),
                err,
            })?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(|err| Error::Copy {
                from: entry.path().to_owned(),
                to: target.clone(),
                err,
            })?;
        }
    }
    Ok(())
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

/// The result of a fallible publishing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error publishing the site.
#[derive(Debug)]
pub enum Error {
    /// Returned when the output directory has no final component (e.g., `/`).
    InvalidOutputDirectory(PathBuf),

    /// Returned when the output path exists but isn't a directory.
    NotADirectory(PathBuf),

    /// Returned for I/O problems while removing a directory.
    Clean { path: PathBuf, err: io::Error },

    /// Returned for I/O problems while creating a directory or writing a file.
    Write { path: PathBuf, err: io::Error },

    /// Returned for I/O problems while copying a static file.
    Copy {
        from: PathBuf,
        to: PathBuf,
        err: io::Error,
    },

    /// Returned when the old output can't be moved aside or the staging
    /// directory can't be moved into place.
    Rename {
        from: PathBuf,
        to: PathBuf,
        err: io::Error,
    },

    /// Returned for errors walking the static directory.
    WalkDir(walkdir::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidOutputDirectory(path) => {
                write!(f, "Invalid output directory '{}'", path.display())
            }
            Error::NotADirectory(path) => write!(
                f,
                "Output path '{}' exists and isn't a directory",
                path.display()
            ),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::Write { path, err } => {
                write!(f, "Writing '{}': {}", path.display(), err)
            }
            Error::Copy { from, to, err } => write!(
                f,
                "Copying '{}' to '{}': {}",
                from.display(),
                to.display(),
                err
            ),
            Error::Rename { from, to, err } => write!(
                f,
                "Moving '{}' to '{}': {}",
                from.display(),
                to.display(),
                err
            ),
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidOutputDirectory(_) => None,
            Error::NotADirectory(_) => None,
            Error::Clean { path: _, err } => Some(err),
            Error::Write { path: _, err } => Some(err),
            Error::Copy { err, .. } => Some(err),
            Error::Rename { err, .. } => Some(err),
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to use the
    /// `?` operator while walking the static directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
