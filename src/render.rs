//! The template renderer. Layouts use Go template syntax (via [`gtmpl`]),
//! e.g., `<title>{{ .Title }} | {{ .Site.Title }}</title>`. See
//! [`Page::to_value`] for the fields available to a layout.

use crate::page::Page;
use gtmpl::{Context, Template};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// A parsed layout template.
pub struct Renderer {
    template: Template,
}

impl Renderer {
    /// Parses a layout from its source text.
    pub fn parse(source: &str) -> Result<Renderer> {
        let mut template = Template::default();
        template
            .parse(source)
            .map_err(|e| Error::Parse(e.to_string()))?;
        Ok(Renderer { template })
    }

    /// Reads and parses the layout file at `path`.
    pub fn from_file(path: &Path) -> Result<Renderer> {
        let mut source = String::new();
        File::open(path)
            .and_then(|mut file| file.read_to_string(&mut source))
            .map_err(|err| Error::Open {
                path: path.to_owned(),
                err,
            })?;
        Renderer::parse(&source).map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("{}: {}", path.display(), msg)),
            e => e,
        })
    }

    /// Renders `page` into an HTML string.
    pub fn render(&self, page: &Page) -> Result<String> {
        let context =
            Context::from(page.to_value()).map_err(|e| Error::Execute(e.to_string()))?;
        let mut out: Vec<u8> = Vec::new();
        self.template
            .execute(&mut out, &context)
            .map_err(|e| Error::Execute(e.to_string()))?;
        String::from_utf8(out).map_err(|e| Error::Execute(e.to_string()))
    }
}

/// The result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading or executing a layout.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems while opening the layout file.
    Open { path: PathBuf, err: io::Error },

    /// Returned for errors parsing the layout.
    Parse(String),

    /// Returned for errors executing the layout, e.g., a reference to a field
    /// the page doesn't have.
    Execute(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, err } => {
                write!(f, "Opening layout file '{}': {}", path.display(), err)
            }
            Error::Parse(err) => write!(f, "Parsing layout: {}", err),
            Error::Execute(err) => write!(f, "Rendering layout: {}", err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::Parse(_) => None,
            Error::Execute(_) => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{Param, Site};
    use crate::content::Content;
    use crate::page::ContactLinks;
    use std::collections::BTreeMap;
    use url::Url;

    const LAYOUT: &str = r#"<html lang="{{ .Site.LanguageCode }}"><head><title>{{ .Title }}</title><link rel="canonical" href="{{ .Permalink }}"></head><body><h1>{{ .Site.Title }}</h1>{{ if .Site.Params.dark }}<p class="dark"></p>{{ end }}{{ .Content }}</body></html>"#;

    fn site(base_url: &str) -> Site {
        let mut params = BTreeMap::new();
        params.insert(String::from("dark"), Param::Bool(true));
        Site {
            title: String::from("Jane Doe"),
            base_url: Url::parse(base_url).unwrap(),
            language_code: String::from("en-us"),
            params,
        }
    }

    fn render(site: &Site, content: Option<&Content>) -> Result<String> {
        Renderer::parse(LAYOUT)?.render(&Page {
            site,
            content,
            contact: None,
        })
    }

    #[test]
    fn test_render() -> Result<()> {
        assert_eq!(
            r#"<html lang="en-us"><head><title>Jane Doe</title><link rel="canonical" href="https://example.org/"></head><body><h1>Jane Doe</h1><p class="dark"></p></body></html>"#,
            render(&site("https://example.org/"), None)?
        );
        Ok(())
    }

    #[test]
    fn test_render_content() -> Result<()> {
        let content = Content {
            title: Some(String::from("Hello")),
            description: None,
            date: None,
            body: String::from("<p>hi</p>"),
        };
        let html = render(&site("https://example.org/"), Some(&content))?;
        assert!(html.contains("<title>Hello</title>"));
        assert!(html.contains("<h1>Jane Doe</h1>"));
        assert!(html.contains("<p>hi</p>"));
        Ok(())
    }

    #[test]
    fn test_render_is_deterministic() -> Result<()> {
        let site = site("https://example.org/");
        assert_eq!(render(&site, None)?, render(&site, None)?);
        Ok(())
    }

    #[test]
    fn test_base_url_only_changes_urls() -> Result<()> {
        let a = render(&site("https://example.org/"), None)?;
        let b = render(&site("https://jane.example.net/"), None)?;
        assert_ne!(a, b);
        assert_eq!(a.replace("https://example.org/", "URL"), b.replace("https://jane.example.net/", "URL"));
        Ok(())
    }

    fn many_params() -> Site {
        let mut site = site("https://example.org/");
        for (i, key) in ["kilo", "alpha", "juliet", "echo", "bravo", "india", "delta", "hotel", "charlie"]
            .iter()
            .enumerate()
        {
            site.params.insert(key.to_string(), Param::Integer(i as i64));
        }
        site
    }

    #[test]
    fn test_param_list_sorted() -> Result<()> {
        let layout = Renderer::parse(
            "{{ range .Site.ParamList }}{{ .Key }}={{ .Value }};{{ end }}",
        )?;
        let render = |site: &Site| {
            layout.render(&Page {
                site,
                content: None,
                contact: None,
            })
        };
        let a = render(&many_params())?;
        let b = render(&many_params())?;
        assert_eq!(
            "alpha=1;bravo=4;charlie=8;dark=true;delta=6;echo=3;hotel=7;india=5;juliet=2;kilo=0;",
            a
        );
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn test_param_quote_escaped() -> Result<()> {
        let mut site = site("https://example.org/");
        site.params
            .insert(String::from("motto"), Param::String(String::from("it's <fine>")));
        let layout = Renderer::parse("<p title='{{ .Site.Params.motto }}'></p>")?;
        let html = layout.render(&Page {
            site: &site,
            content: None,
            contact: None,
        })?;
        assert_eq!("<p title='it&#39;s &lt;fine&gt;'></p>", html);
        Ok(())
    }

    #[test]
    fn test_title_escaped() -> Result<()> {
        let mut site = site("https://example.org/");
        site.title = String::from("Jane <Doe>");
        let html = render(&site, None)?;
        assert!(html.contains("<h1>Jane &lt;Doe&gt;</h1>"));
        Ok(())
    }

    #[test]
    fn test_contact() -> Result<()> {
        let site = site("https://example.org/");
        let contact = ContactLinks {
            name: String::from("Jane Doe"),
            vcard: site.base_url.join("jane-doe.vcf").unwrap(),
            qr: site.base_url.join("jane-doe.svg").unwrap(),
        };
        let html = Renderer::parse(r#"{{ with .Contact }}<a href="{{ .VCard }}"><img src="{{ .QR }}" alt="{{ .Name }}"></a>{{ end }}"#)?
            .render(&Page {
                site: &site,
                content: None,
                contact: Some(&contact),
            })?;
        assert_eq!(
            r#"<a href="https://example.org/jane-doe.vcf"><img src="https://example.org/jane-doe.svg" alt="Jane Doe"></a>"#,
            html
        );
        Ok(())
    }

    #[test]
    fn test_malformed_layout() {
        assert!(matches!(
            Renderer::parse("<h1>{{ .Site.Title </h1>"),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_missing_layout() {
        assert!(matches!(
            Renderer::from_file(Path::new("./testdata/no-such-layout.html")),
            Err(Error::Open { .. })
        ));
    }
}
