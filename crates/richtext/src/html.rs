//! HTML tokenizing.
//!
//! Parses an HTML string leniently (html5ever via `scraper`, which closes
//! unbalanced tags and repairs misnested markup) and replays the resulting
//! tree as a flat stream of start tag, end tag, text and comment events.

use indexmap::IndexMap;
use scraper::{ElementRef, Html, Node as ScraperNode};

/// An element start tag: lower-case name plus attributes in document order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub name: &'a str,
    pub attrs: IndexMap<&'a str, &'a str>,
}

impl<'a> Tag<'a> {
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.attrs.get(name).copied()
    }
}

/// Receiver of tokenizer events.
///
/// Every `start_element` is matched by an `end_element` with the same name,
/// void elements included.
pub trait TagHandler {
    fn start_element(&mut self, tag: &Tag<'_>);

    fn end_element(&mut self, name: &str);

    fn characters(&mut self, text: &str);

    fn comment(&mut self, _text: &str) {}
}

/// Tokenize `html`, feeding events to `handler` in document order
pub fn tokenize<H: TagHandler>(html: &str, handler: &mut H) {
    let document = Html::parse_fragment(html);

    // the fragment root is a synthetic <html> element
    walk_children(document.root_element(), handler);
}

fn walk_element<H: TagHandler>(element: ElementRef<'_>, handler: &mut H) {
    let value = element.value();
    let tag = Tag {
        name: value.name(),
        attrs: value.attrs().collect(),
    };

    handler.start_element(&tag);
    walk_children(element, handler);
    handler.end_element(tag.name);
}

fn walk_children<H: TagHandler>(element: ElementRef<'_>, handler: &mut H) {
    for child in element.children() {
        match child.value() {
            ScraperNode::Text(text) => handler.characters(&text.text),
            ScraperNode::Comment(comment) => handler.comment(&comment.comment),
            ScraperNode::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    walk_element(child_element, handler);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Records events as readable strings
    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl TagHandler for Recorder {
        fn start_element(&mut self, tag: &Tag<'_>) {
            let attrs: Vec<String> = tag
                .attrs
                .iter()
                .map(|(name, value)| format!(" {}={}", name, value))
                .collect();
            self.0.push(format!("<{}{}>", tag.name, attrs.concat()));
        }

        fn end_element(&mut self, name: &str) {
            self.0.push(format!("</{}>", name));
        }

        fn characters(&mut self, text: &str) {
            self.0.push(text.to_string());
        }

        fn comment(&mut self, text: &str) {
            self.0.push(format!("<!--{}-->", text));
        }
    }

    fn events(html: &str) -> Vec<String> {
        let mut recorder = Recorder::default();
        tokenize(html, &mut recorder);
        recorder.0
    }

    #[test]
    fn test_simple_events() {
        assert_eq!(
            events("<p>Hello <b>World</b></p>"),
            vec!["<p>", "Hello ", "<b>", "World", "</b>", "</p>"]
        );
    }

    #[test]
    fn test_void_elements_are_closed() {
        assert_eq!(
            events("a<br>b<img src=\"x.png\">"),
            vec!["a", "<br>", "</br>", "b", "<img src=x.png>", "</img>"]
        );
    }

    #[test]
    fn test_attributes_in_order() {
        assert_eq!(
            events("<font face=\"Arial\" style=\"color:#ff0000\">x</font>"),
            vec!["<font face=Arial style=color:#ff0000>", "x", "</font>"]
        );
    }

    #[test]
    fn test_unclosed_tags_are_closed() {
        assert_eq!(
            events("<ul><li>one<li>two</ul>"),
            vec!["<ul>", "<li>", "one", "</li>", "<li>", "two", "</li>", "</ul>"]
        );
    }

    #[test]
    fn test_entities_and_comments() {
        assert_eq!(
            events("a &amp; b<!-- note -->"),
            vec!["a & b", "<!-- note -->"]
        );
    }

    #[test]
    fn test_tag_attr() {
        let tag = Tag {
            name: "div",
            attrs: IndexMap::from([("align", "center")]),
        };
        assert_eq!(tag.attr("align"), Some("center"));
        assert_eq!(tag.attr("style"), None);
    }
}
