//! richtext-core - run-annotated text model and HTML serialization
//!
//! This crate provides the flat rich text model shared by both conversion
//! directions, the paragraph style stack used to reconcile nested list and
//! indentation state, and the serializer that writes the model back out as
//! nested HTML. It is used by `richtext` (which adds HTML parsing).
//!
//! # Architecture
//!
//! ```text
//! HTML String ──tag events──▶ ┌───────────────┐
//!                             │               │
//!                             │   RichText    │ ──▶ HTML String
//! Plain text ────────────────▶│ (text + runs) │
//!                             └───────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use richtext_core::{serialize, CharacterStyle, NoMedia, Options, RichText};
//!
//! let mut text: RichText<NoMedia> = RichText::new("Hello World");
//! text.add_run(CharacterStyle::Bold, 6, 11).unwrap();
//!
//! let html = serialize(&text, &Options::default());
//! assert_eq!(html.html, "Hello <b>World</b>");
//! ```

mod color;
mod model;
mod options;
mod paragraph;
mod serialize;

pub use color::{html_color, NAMED_COLORS};
pub use model::{
    Alignment, CharacterStyle, Media, MediaFormat, NoMedia, Paragraph, ParagraphStyle, RichText,
    Run, Style, OBJECT_REPLACEMENT,
};
pub use options::Options;
pub use paragraph::{AccumulatedParagraphStyle, ParagraphStyleStack, ParagraphType};
pub use serialize::{serialize, Html};

/// Error type for rich text operations
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Invalid range {start}..{end} for text of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },

    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

pub type Result<T> = std::result::Result<T, ConvertError>;
