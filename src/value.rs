//! Conversions from the site model into template [`Value`]s. Every string
//! that originates in the configuration is HTML-escaped on the way in, so the
//! layout can substitute it into text or attribute positions as-is.

use crate::config::{Param, Site};
use gtmpl_value::Value;
use pulldown_cmark::escape::escape_html;
use std::collections::HashMap;
use url::Url;

/// Escapes `&`, `<`, `>`, `"`, and `'` in `s` for HTML text and quoted
/// attribute values. This isn't escaping for CSS or JavaScript contexts.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    // Writing into a `String` can't fail.
    let _ = escape_html(&mut out, s);
    if out.contains('\'') {
        out = out.replace('\'', "&#39;");
    }
    out
}

/// Converts a configuration string into an escaped [`Value::String`].
pub fn text(s: &str) -> Value {
    Value::String(escape(s))
}

impl From<&Param> for Value {
    fn from(p: &Param) -> Value {
        match p {
            Param::Bool(b) => Value::Bool(*b),
            Param::Integer(i) => Value::from(*i),
            Param::Float(x) => Value::from(*x),
            Param::String(s) => text(s),
        }
    }
}

/// Converts a [`Url`] into an escaped [`Value::String`].
pub fn url_text(url: &Url) -> Value {
    text(url.as_str())
}

impl From<&Site> for Value {
    /// Produces the `.Site` object: `Title`, `BaseURL`, `LanguageCode`,
    /// `Params`, and `ParamList`. `Params` is a map for `.Site.Params.<key>`
    /// lookups; ranging over it has no defined order. `ParamList` holds the
    /// same entries as `{Key, Value}` objects sorted by key.
    fn from(site: &Site) -> Value {
        let params: HashMap<String, Value> = site
            .params
            .iter()
            .map(|(k, v)| (k.clone(), Value::from(v)))
            .collect();
        let param_list: Vec<Value> = site
            .params
            .iter()
            .map(|(k, v)| {
                let mut entry: HashMap<String, Value> = HashMap::new();
                entry.insert("Key".to_owned(), text(k));
                entry.insert("Value".to_owned(), Value::from(v));
                Value::Object(entry)
            })
            .collect();

        let mut m: HashMap<String, Value> = HashMap::new();
        m.insert("Title".to_owned(), text(&site.title));
        m.insert("BaseURL".to_owned(), url_text(&site.base_url));
        m.insert("LanguageCode".to_owned(), text(&site.language_code));
        m.insert("Params".to_owned(), Value::Object(params));
        m.insert("ParamList".to_owned(), Value::Array(param_list));
        Value::Object(m)
    }
}
