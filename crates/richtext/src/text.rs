//! Plain text bridges
//!
//! HTML to plain text drops all markup while keeping line structure. Plain
//! text to HTML escapes the text, links bitcoin URIs and web URLs, and turns
//! line breaks into `<br>`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use richtext_core::OBJECT_REPLACEMENT;

use crate::html::{tokenize, Tag, TagHandler};
use crate::utilities::{collapse_whitespace, heading_level, last_char, paragraph_break};

/// Rule standing in for `<hr>`
const HORIZONTAL_RULE: &str = "_____________________________________________\n";

/// Elements whose content is removed from plain text
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "title"];

const BLOCK_ELEMENTS: &[&str] = &["blockquote", "div", "ol", "p", "ul"];

static BITCOIN_URI: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"bitcoin:[1-9a-km-zA-HJ-NP-Z]{27,34}(\?[a-zA-Z0-9$\-_.+!*'(),%:@&=]*)?").unwrap()
});

/// Characters allowed in internationalized host names and paths
const IRI_CHAR: &str = r"a-zA-Z0-9\x{A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}";

static WEB_URL: Lazy<Regex> = Lazy::new(|| {
    let scheme = concat!(
        r"(?:(?:https?|Https?|rtsp|Rtsp)://",
        r"(?:(?:[a-zA-Z0-9$\-_.+!*'(),;?&=]|%[a-fA-F0-9]{2}){1,64}",
        r"(?::(?:[a-zA-Z0-9$\-_.+!*'(),;?&=]|%[a-fA-F0-9]{2}){1,25})?@)?)?",
    );
    let tld = concat!(
        r"(?:aero|arpa|asia|biz|cat|com|coop|edu|gov|info|int|jobs|mil|mobi|museum",
        r"|name|net|org|pro|tel|travel|[a-zA-Z]{2})",
    );
    let octet = r"(?:25[0-5]|2[0-4][0-9]|[0-1][0-9]{2}|[1-9][0-9]|[0-9])";
    let host = format!(
        r"(?:(?:[{iri}][{iri}\-]{{0,64}}\.)+{tld}|{octet}\.{octet}\.{octet}\.{octet})",
        iri = IRI_CHAR,
        tld = tld,
        octet = octet,
    );
    let path = format!(
        r"(?:/(?:[{iri};/?:@&=#~\-.+!*'(),_]|%[a-fA-F0-9]{{2}})*)?",
        iri = IRI_CHAR,
    );
    Regex::new(&format!(r"{scheme}{host}(?::\d{{1,5}})?{path}(?:\b|$)")).unwrap()
});

/// Convert HTML to plain text
pub fn html_to_text(html: &str) -> String {
    let mut writer = TextWriter::default();
    tokenize(html, &mut writer);

    let text = writer
        .out
        .trim_end_matches('\n')
        .replace([OBJECT_REPLACEMENT, '\u{A0}'], " ");
    tracing::trace!(bytes = text.len(), "Converted HTML to text");
    text
}

/// Convert plain text to HTML, linking URLs
pub fn text_to_html(text: &str) -> String {
    let escaped = html_escape::encode_quoted_attribute(text);
    let linked = link_urls(&escaped);
    linked
        .replace('\n', "<br>\n")
        .replace("&#x27;", "&#39;")
        .replace("&apos;", "&#39;")
}

fn link_urls(text: &str) -> String {
    let prepared = BITCOIN_URI.replace_all(text, "<a href=\"$0\">$0</a>");

    WEB_URL
        .replace_all(&prepared, |caps: &Captures<'_>| {
            let Some(url) = caps.get(0) else {
                return String::new();
            };
            // part of an e-mail address
            if prepared[..url.start()].ends_with('@') {
                return url.as_str().to_string();
            }
            let url = url.as_str();
            if url.contains("://") {
                format!("<a href=\"{url}\">{url}</a>")
            } else {
                format!("<a href=\"http://{url}\">{url}</a>")
            }
        })
        .into_owned()
}

/// Collects the text of an HTML document
#[derive(Debug, Default)]
struct TextWriter {
    out: String,
    /// Start offsets of open hidden elements
    hidden: Vec<usize>,
}

impl TextWriter {
    fn paragraph_break(&mut self) {
        let separator = paragraph_break(&self.out);
        self.out.push_str(separator);
    }
}

impl TagHandler for TextWriter {
    fn start_element(&mut self, tag: &Tag<'_>) {
        let name = tag.name;
        if BLOCK_ELEMENTS.contains(&name) || heading_level(name).is_some() {
            self.paragraph_break();
        } else if name == "hr" {
            self.out.push_str(HORIZONTAL_RULE);
        } else if name == "img" {
            self.out.push(OBJECT_REPLACEMENT);
        } else if HIDDEN_ELEMENTS.contains(&name) {
            self.hidden.push(self.out.len());
        }
    }

    fn end_element(&mut self, name: &str) {
        if BLOCK_ELEMENTS.contains(&name) || heading_level(name).is_some() {
            self.paragraph_break();
        } else if name == "br" || name == "li" {
            self.out.push('\n');
        } else if HIDDEN_ELEMENTS.contains(&name) {
            if let Some(start) = self.hidden.pop() {
                self.out.truncate(start);
            }
        }
    }

    fn characters(&mut self, text: &str) {
        let collapsed = collapse_whitespace(text, last_char(&self.out));
        self.out.push_str(&collapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_html_to_text_blocks() {
        assert_eq!(
            html_to_text("<h1>Title</h1><p>First</p><p>Second<br>line</p>"),
            "Title\n\nFirst\n\nSecond\nline"
        );
    }

    #[test]
    fn test_html_to_text_lists() {
        assert_eq!(
            html_to_text("intro<ul><li>one</li><li>two</li></ul>outro"),
            "intro\n\none\ntwo\n\noutro"
        );
    }

    #[test]
    fn test_html_to_text_rule() {
        assert_eq!(
            html_to_text("above<hr>below"),
            format!("above{}below", HORIZONTAL_RULE)
        );
    }

    #[test]
    fn test_html_to_text_hides_code_and_comments() {
        assert_eq!(
            html_to_text("<style>p { margin: 0 }</style>visible<!-- hidden --><script>x()</script>"),
            "visible"
        );
        assert_eq!(html_to_text("<title>Page</title>body"), "body");
    }

    #[test]
    fn test_html_to_text_replaces_special_spaces() {
        assert_eq!(html_to_text("a&nbsp;b<img src=\"x.png\">c"), "a b c");
    }

    #[test]
    fn test_text_to_html_escapes() {
        assert_eq!(
            text_to_html("<b> & \"quotes\" it's"),
            "&lt;b&gt; &amp; &quot;quotes&quot; it&#39;s"
        );
    }

    #[test]
    fn test_text_to_html_line_breaks() {
        assert_eq!(text_to_html("one\ntwo"), "one<br>\ntwo");
    }

    #[rstest]
    #[case("visit www.example.com now", "visit <a href=\"http://www.example.com\">www.example.com</a> now")]
    #[case("see https://example.org/a?b=c", "see <a href=\"https://example.org/a?b=c\">https://example.org/a?b=c</a>")]
    #[case("host 192.168.1.1:8080/x", "host <a href=\"http://192.168.1.1:8080/x\">192.168.1.1:8080/x</a>")]
    #[case("mail me@example.com", "mail me@example.com")]
    #[case("no link here.", "no link here.")]
    fn test_text_to_html_links(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(text_to_html(text), expected);
    }

    #[test]
    fn test_text_to_html_bitcoin() {
        let uri = "bitcoin:1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa";
        assert_eq!(
            text_to_html(&format!("pay {uri}")),
            format!("pay <a href=\"{uri}\">{uri}</a>")
        );
    }
}
