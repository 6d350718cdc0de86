//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the site: loading the layout ([`crate::render`]) and the
//! page content ([`crate::content`]), building the contact card
//! ([`crate::vcard`], [`crate::qr`]), rendering and optionally minifying the
//! page ([`crate::minify`]), and publishing the result ([`crate::publish`]).
//!
//! Everything is rendered in memory before the output directory is touched, so
//! a malformed layout, content file, or contact section fails the build
//! without producing any output.

use crate::config::{Config, Site};
use crate::content::{Content, Error as ContentError};
use crate::minify::minify;
use crate::page::{ContactLinks, Page};
use crate::publish::{Artifact, Error as PublishError, Publisher};
use crate::qr;
use crate::render::{Error as RenderError, Renderer};
use crate::vcard::{Contact, Error as VCardError};
use log::{debug, info};
use qrcode::types::QrError;
use std::fmt;

/// The name of the rendered page in the output directory.
pub const INDEX_FILE_NAME: &str = "index.html";

/// Options that don't come from the project file.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuildOptions {
    /// Minify the rendered HTML.
    pub minify: bool,
}

/// Builds the site from a [`Config`] and publishes it into
/// `config.output_directory`.
pub fn build_site(config: &Config, options: BuildOptions) -> Result<()> {
    let artifacts = render_site(config, options)?;
    Publisher {
        output_directory: &config.output_directory,
        static_directory: &config.static_directory,
    }
    .publish(&artifacts)?;
    Ok(())
}

/// Renders every generated file of the site without touching the file system
/// beyond reading the inputs.
pub fn render_site(config: &Config, options: BuildOptions) -> Result<Vec<Artifact>> {
    let renderer = Renderer::from_file(&config.layout)?;
    debug!("parsed layout '{}'", config.layout.display());

    let content = Content::from_file(&config.content_file)?;
    match &content {
        Some(_) => debug!("loaded content '{}'", config.content_file.display()),
        None => debug!(
            "no content file at '{}'; rendering layout only",
            config.content_file.display()
        ),
    }

    let mut artifacts = Vec::new();
    let links = match &config.contact {
        Some(contact) => {
            let (links, contact_artifacts) = contact_card(contact, &config.site)?;
            artifacts.extend(contact_artifacts);
            Some(links)
        }
        None => None,
    };

    let mut html = renderer.render(&Page {
        site: &config.site,
        content: content.as_ref(),
        contact: links.as_ref(),
    })?;
    if options.minify {
        let before = html.len();
        html = minify(&html);
        debug!("minified page from {} to {} bytes", before, html.len());
    }
    info!("rendered '{}' ({} bytes)", INDEX_FILE_NAME, html.len());

    artifacts.insert(0, Artifact::new(INDEX_FILE_NAME, html));
    Ok(artifacts)
}

/// Builds the vCard and QR code artifacts for `contact`, named after the
/// slugified contact name, and their URLs under the site's base URL.
pub fn contact_card(contact: &Contact, site: &Site) -> Result<(ContactLinks, Vec<Artifact>)> {
    let vcard = contact.to_vcard()?;
    let svg = qr::to_svg(&vcard)?;
    let name = contact.names()?.formatted;

    let mut stem = slug::slugify(&name);
    if stem.is_empty() {
        stem = String::from("contact");
    }
    let vcard_file = format!("{}.vcf", stem);
    let qr_file = format!("{}.svg", stem);

    let links = ContactLinks {
        name,
        vcard: site.base_url.join(&vcard_file)?,
        qr: site.base_url.join(&qr_file)?,
    };
    Ok((
        links,
        vec![Artifact::new(vcard_file, vcard), Artifact::new(qr_file, svg)],
    ))
}

/// The result of building a site.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during rendering,
/// content parsing, contact card generation, and publishing.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading or executing the layout.
    Render(RenderError),

    /// Returned for errors parsing the content file.
    Content(ContentError),

    /// Returned for invalid contact details.
    VCard(VCardError),

    /// Returned when the vCard can't be encoded as a QR code.
    Qr(QrError),

    /// Returned when a contact artifact URL can't be built.
    Url(url::ParseError),

    /// Returned for errors writing the output directory.
    Publish(PublishError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Render(err) => err.fmt(f),
            Error::Content(err) => err.fmt(f),
            Error::VCard(err) => write!(f, "Building contact card: {}", err),
            Error::Qr(err) => write!(f, "Encoding contact QR code: {}", err),
            Error::Url(err) => err.fmt(f),
            Error::Publish(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Render(err) => Some(err),
            Error::Content(err) => Some(err),
            Error::VCard(err) => Some(err),
            Error::Qr(_) => None,
            Error::Url(err) => Some(err),
            Error::Publish(err) => Some(err),
        }
    }
}

impl From<RenderError> for Error {
    /// Converts [`RenderError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl From<ContentError> for Error {
    /// Converts [`ContentError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: ContentError) -> Error {
        Error::Content(err)
    }
}

impl From<VCardError> for Error {
    fn from(err: VCardError) -> Error {
        Error::VCard(err)
    }
}

impl From<QrError> for Error {
    fn from(err: QrError) -> Error {
        Error::Qr(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Error {
        Error::Url(err)
    }
}

impl From<PublishError> for Error {
    /// Converts [`PublishError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: PublishError) -> Error {
        Error::Publish(err)
    }
}
