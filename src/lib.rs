//! The library code for the `landing` static site generator, which builds a
//! single landing page. A build has three steps:
//!
//! 1. Loading the site configuration from `site.yaml` ([`crate::config`])
//! 2. Rendering the layout template with the configuration and the optional
//!    markdown content ([`crate::render`], [`crate::content`]), and minifying
//!    the result on request ([`crate::minify`])
//! 3. Publishing the page and the static assets to the output directory
//!    ([`crate::publish`])
//!
//! The output is a pure function of the layout, the configuration, and the
//! content: nothing else (timestamps, environment, previous builds) leaks into
//! it, so rebuilding from the same inputs produces byte-identical files.
//!
//! Optionally the configuration carries a contact section, which is published
//! next to the page as a vCard ([`crate::vcard`]) and a QR code of that vCard
//! ([`crate::qr`]). The `vcard` command fills in missing contact fields
//! interactively ([`crate::prompt`]).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod content;
pub mod minify;
pub mod page;
pub mod prompt;
pub mod publish;
pub mod qr;
pub mod render;
pub mod value;
pub mod vcard;
