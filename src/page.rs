//! Defines [`Page`], everything the layout template can see, and its
//! conversion into the template context.

use crate::config::Site;
use crate::content::Content;
use crate::value::{text, url_text};
use gtmpl_value::Value;
use std::collections::HashMap;
use url::Url;

/// The format of `.Date` in the template context, e.g., `April 16, 2021`.
const DISPLAY_DATE_FORMAT: &str = "%B %-d, %Y";

/// The published locations of the contact card artefacts.
#[derive(Clone, Debug)]
pub struct ContactLinks {
    /// The contact's formatted name.
    pub name: String,

    /// The URL of the `.vcf` file.
    pub vcard: Url,

    /// The URL of the QR code SVG.
    pub qr: Url,
}

/// The input to the layout template.
pub struct Page<'a> {
    pub site: &'a Site,
    pub content: Option<&'a Content>,
    pub contact: Option<&'a ContactLinks>,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value::Object`] with the fields `Site`,
    /// `Title`, `Description`, `Date`, `ISODate`, `Content`, `Permalink`, and
    /// `Contact`. Optional fields are [`Value::Nil`] when absent so templates
    /// can test them with `{{ if }}`.
    pub fn to_value(&self) -> Value {
        let content = self.content;
        let title = content
            .and_then(|c| c.title.as_deref())
            .unwrap_or(&self.site.title);
        let date = content.and_then(|c| c.date);

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Site".to_owned(), Value::from(self.site));
        m.insert("Title".to_owned(), text(title));
        m.insert(
            "Description".to_owned(),
            match content.and_then(|c| c.description.as_deref()) {
                Some(description) => text(description),
                None => Value::Nil,
            },
        );
        m.insert(
            "Date".to_owned(),
            match date {
                Some(d) => Value::String(d.format(DISPLAY_DATE_FORMAT).to_string()),
                None => Value::Nil,
            },
        );
        m.insert(
            "ISODate".to_owned(),
            match date {
                Some(d) => Value::String(d.format("%Y-%m-%d").to_string()),
                None => Value::Nil,
            },
        );
        // The body is already HTML.
        m.insert(
            "Content".to_owned(),
            match content {
                Some(c) => Value::String(c.body.clone()),
                None => Value::String(String::new()),
            },
        );
        m.insert("Permalink".to_owned(), url_text(&self.site.base_url));
        m.insert(
            "Contact".to_owned(),
            match self.contact {
                Some(contact) => {
                    let mut c: HashMap<String, Value> = HashMap::new();
                    c.insert("Name".to_owned(), text(&contact.name));
                    c.insert("VCard".to_owned(), url_text(&contact.vcard));
                    c.insert("QR".to_owned(), url_text(&contact.qr));
                    Value::Object(c)
                }
                None => Value::Nil,
            },
        );
        Value::Object(m)
    }
}
