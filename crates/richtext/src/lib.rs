//! # richtext
//!
//! Convert between HTML and run-annotated rich text.
//!
//! Rich text is a flat text buffer with possibly overlapping style runs (see
//! [`RichText`]). HTML is nested markup. This crate reads HTML into rich text
//! and, through `richtext-core`, writes rich text back out as HTML. It also
//! provides plain text bridges in both directions.
//!
//! ## Design
//!
//! The HTML reader is driven by tag events from a lenient tokenizer
//! ([`tokenize`]). Open tags leave marks, close tags resolve them into runs,
//! and a [`ParagraphStyleStack`] tracks list nesting. Writing walks the text
//! paragraph by paragraph and emits the minimal list open and close tags
//! between paragraphs, with inline tags nested inside.
//!
//! ## Example
//!
//! ```rust
//! use richtext::{CharacterStyle, NoMediaFactory, RichTextConverter};
//!
//! let converter = RichTextConverter::new();
//! let text = converter
//!     .html_to_rich_text("<ul><li>Hello <b>World</b></li></ul>", &NoMediaFactory)
//!     .unwrap();
//! assert_eq!(text.text(), "Hello World");
//!
//! let html = converter.rich_text_to_html(&text).unwrap();
//! assert_eq!(html.html, "<ul><li>Hello <b>World</b></li></ul>");
//! ```

mod convert;
pub mod html;
mod media;
mod service;
mod text;
mod utilities;

pub use convert::html_to_rich_text;
pub use html::{tokenize, Tag, TagHandler};
pub use media::{MediaFactory, NoMediaFactory};
pub use service::RichTextConverter;
pub use text::{html_to_text, text_to_html};

pub use richtext_core::{
    html_color, serialize, AccumulatedParagraphStyle, Alignment, CharacterStyle, ConvertError,
    Html, Media, MediaFormat, NoMedia, Options, Paragraph, ParagraphStyle, ParagraphStyleStack,
    ParagraphType, Result, RichText, Run, Style, OBJECT_REPLACEMENT,
};
