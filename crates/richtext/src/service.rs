//! RichTextConverter - the main entry point for rich text conversion.

use richtext_core::{serialize, Html, Media, Options, RichText};

use crate::convert::html_to_rich_text;
use crate::media::MediaFactory;
use crate::text::{html_to_text, text_to_html};
use crate::Result;

/// Converts between HTML, rich text and plain text.
///
/// The converter holds options only; every call works on fresh state, so a
/// shared converter can serve concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct RichTextConverter {
    options: Options,
}

impl RichTextConverter {
    /// Create a new RichTextConverter with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a RichTextConverter with custom options
    pub fn with_options(options: Options) -> Self {
        Self { options }
    }

    /// Get the current options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Get mutable access to options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Convert HTML to rich text, resolving media through `factory`
    pub fn html_to_rich_text<F: MediaFactory>(
        &self,
        html: &str,
        factory: &F,
    ) -> Result<RichText<F::Media>> {
        self.options.validate()?;
        Ok(html_to_rich_text(html, factory, &self.options))
    }

    /// Convert rich text to HTML
    pub fn rich_text_to_html<M: Media>(&self, text: &RichText<M>) -> Result<Html<M>> {
        self.options.validate()?;
        Ok(serialize(text, &self.options))
    }

    /// Convert HTML to plain text
    pub fn html_to_text(&self, html: &str) -> String {
        html_to_text(html)
    }

    /// Convert plain text to HTML
    pub fn text_to_html(&self, text: &str) -> String {
        text_to_html(text)
    }
}
