//! A conservative HTML minifier. It never rewrites markup, it only removes
//! bytes that don't change how a page renders:
//!
//! * comments, except conditional comments (`<!--[if ...]>`),
//! * whitespace between tags when it spans a line break (indentation),
//! * runs of whitespace, which collapse to a single space,
//! * leading and trailing whitespace of the document.
//!
//! The contents of `<pre>`, `<textarea>`, `<script>`, and `<style>` elements
//! and quoted attribute values are copied verbatim.

/// Elements whose contents are whitespace-sensitive or not HTML at all.
const RAW_ELEMENTS: [&str; 4] = ["pre", "textarea", "script", "style"];

/// Minifies `html`. Minifying already-minified output is a no-op.
pub fn minify(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    // Whether the last thing written was markup rather than text. A text `>`
    // doesn't end a tag.
    let mut after_tag = false;

    while let Some(c) = rest.chars().next() {
        if rest.starts_with("<!--") {
            let end = rest.find("-->").map(|i| i + 3).unwrap_or(rest.len());
            if rest.starts_with("<!--[if") {
                out.push_str(&rest[..end]);
                after_tag = true;
            }
            rest = &rest[end..];
        } else if c == '<' && starts_tag(rest) {
            let end = tag_end(rest);
            let tag = &rest[..end];
            push_tag(&mut out, tag);
            rest = &rest[end..];
            after_tag = true;
            if let Some(name) = raw_element(tag) {
                let close = rest
                    .to_ascii_lowercase()
                    .find(&format!("</{}", name))
                    .unwrap_or(rest.len());
                if close > 0 {
                    out.push_str(&rest[..close]);
                    after_tag = false;
                }
                rest = &rest[close..];
            }
        } else if c.is_whitespace() {
            let len = rest
                .find(|c: char| !c.is_whitespace())
                .unwrap_or(rest.len());
            let run = &rest[..len];
            rest = &rest[len..];

            let between_tags = after_tag && rest.starts_with('<');
            if out.is_empty()
                || rest.is_empty()
                || out.ends_with(' ')
                || (between_tags && run.contains('\n'))
            {
                continue;
            }
            out.push(' ');
            after_tag = false;
        } else {
            let len = rest[c.len_utf8()..]
                .find(|c: char| c == '<' || c.is_whitespace())
                .map(|i| i + c.len_utf8())
                .unwrap_or(rest.len());
            out.push_str(&rest[..len]);
            rest = &rest[len..];
            after_tag = false;
        }
    }

    while out.ends_with(' ') {
        out.pop();
    }
    out
}

// A `<` only opens a tag when it's followed by a name, `/`, or `!`.
fn starts_tag(s: &str) -> bool {
    match s[1..].chars().next() {
        Some(c) => c.is_ascii_alphabetic() || c == '/' || c == '!',
        None => false,
    }
}

// Returns the index just past the `>` closing the tag at the start of `s`,
// skipping over quoted attribute values.
fn tag_end(s: &str) -> usize {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return i + 1,
            None => {}
        }
    }
    s.len()
}

// Writes `tag`, collapsing whitespace outside of quoted attribute values and
// dropping whitespace right before the closing `>`.
fn push_tag(out: &mut String, tag: &str) {
    let mut quote: Option<char> = None;
    let mut pending_space = false;
    for c in tag.chars() {
        match quote {
            Some(q) => {
                out.push(c);
                if c == q {
                    quote = None;
                }
            }
            None if c.is_whitespace() => pending_space = true,
            None => {
                if pending_space && c != '>' {
                    out.push(' ');
                }
                pending_space = false;
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                out.push(c);
            }
        }
    }
}

// Returns the lowercase element name if `tag` opens a raw element.
fn raw_element(tag: &str) -> Option<&'static str> {
    let name: String = tag[1..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    if tag.ends_with("/>") {
        return None;
    }
    RAW_ELEMENTS.iter().find(|raw| **raw == name).copied()
}
