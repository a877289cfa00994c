//! Run-annotated text
//!
//! A [`RichText`] is a text buffer plus a flat collection of [`Run`]s. Runs are
//! anchored to byte offsets into the text and may overlap each other freely.
//! Paragraph runs are expected to line up with paragraph boundaries.

use std::fmt;

use crate::{ConvertError, Result};

/// Placeholder character standing in for embedded media (U+FFFC)
pub const OBJECT_REPLACEMENT: char = '\u{FFFC}';

/// Output format a media path is resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFormat {
    /// Path used while the media is embedded in a [`RichText`]
    Spanned,
    /// Path written into `src` attributes of generated HTML
    Html,
}

/// A resolved image, audio or video reference.
///
/// Implementations are supplied by the caller and treated as synchronous,
/// side-effect free lookups.
pub trait Media: Clone + fmt::Debug {
    /// Whether the underlying resource exists
    fn exists(&self) -> bool;

    /// Path of the resource for the given output format
    fn file_path(&self, format: MediaFormat) -> String;

    /// Whether the resource path points at a directory instead of a file
    fn is_directory(&self, format: MediaFormat) -> bool;
}

/// Media type for text that never embeds media
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoMedia {}

impl Media for NoMedia {
    fn exists(&self) -> bool {
        match *self {}
    }

    fn file_path(&self, _format: MediaFormat) -> String {
        match *self {}
    }

    fn is_directory(&self, _format: MediaFormat) -> bool {
        match *self {}
    }
}

/// Paragraph alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    /// Parse an `align` attribute value; anything unknown is left aligned
    pub fn from_attr(value: &str) -> Self {
        if value.eq_ignore_ascii_case("center") {
            Alignment::Center
        } else if value.eq_ignore_ascii_case("right") {
            Alignment::Right
        } else {
            Alignment::Left
        }
    }
}

/// Inline style applied to a character range
#[derive(Debug, Clone, PartialEq)]
pub enum CharacterStyle<M> {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Superscript,
    Subscript,
    Monospace,
    /// Font face name
    Typeface(String),
    /// Font size in scale dependent units
    AbsoluteSize(u32),
    /// Font size relative to the base size
    RelativeSize(f32),
    /// ARGB color
    ForegroundColor(u32),
    /// ARGB color
    BackgroundColor(u32),
    Link(String),
    Image(M),
    Audio(M),
    Video(M),
}

impl<M> CharacterStyle<M> {
    /// Stable name used to order runs covering the same range
    pub fn name(&self) -> &'static str {
        match self {
            CharacterStyle::Bold => "Bold",
            CharacterStyle::Italic => "Italic",
            CharacterStyle::Underline => "Underline",
            CharacterStyle::Strikethrough => "Strikethrough",
            CharacterStyle::Superscript => "Superscript",
            CharacterStyle::Subscript => "Subscript",
            CharacterStyle::Monospace => "Monospace",
            CharacterStyle::Typeface(_) => "Typeface",
            CharacterStyle::AbsoluteSize(_) => "AbsoluteSize",
            CharacterStyle::RelativeSize(_) => "RelativeSize",
            CharacterStyle::ForegroundColor(_) => "ForegroundColor",
            CharacterStyle::BackgroundColor(_) => "BackgroundColor",
            CharacterStyle::Link(_) => "Link",
            CharacterStyle::Image(_) => "Image",
            CharacterStyle::Audio(_) => "Audio",
            CharacterStyle::Video(_) => "Video",
        }
    }

    pub fn is_media(&self) -> bool {
        matches!(
            self,
            CharacterStyle::Image(_) | CharacterStyle::Audio(_) | CharacterStyle::Video(_)
        )
    }
}

/// Style applied to whole paragraphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Alignment(Alignment),
    Bullet,
    Number,
    /// Marker-less indentation by the given number of levels
    Indentation(usize),
    Quote,
}

impl ParagraphStyle {
    /// Number of nesting levels this style contributes to its paragraph
    pub fn indentation(&self) -> usize {
        match self {
            ParagraphStyle::Bullet | ParagraphStyle::Number => 1,
            ParagraphStyle::Indentation(levels) => *levels,
            ParagraphStyle::Alignment(_) | ParagraphStyle::Quote => 0,
        }
    }
}

/// Either kind of style a run can carry
#[derive(Debug, Clone, PartialEq)]
pub enum Style<M> {
    Character(CharacterStyle<M>),
    Paragraph(ParagraphStyle),
}

impl<M> From<CharacterStyle<M>> for Style<M> {
    fn from(style: CharacterStyle<M>) -> Self {
        Style::Character(style)
    }
}

impl<M> From<ParagraphStyle> for Style<M> {
    fn from(style: ParagraphStyle) -> Self {
        Style::Paragraph(style)
    }
}

/// A style anchored to the byte range `start..end` of the text
#[derive(Debug, Clone, PartialEq)]
pub struct Run<M> {
    pub style: Style<M>,
    pub start: usize,
    pub end: usize,
}

impl<M> Run<M> {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether this run intersects `start..end`.
    ///
    /// Two non-empty ranges overlap when they share a character. An empty
    /// range on either side overlaps anything it touches.
    pub fn overlaps(&self, start: usize, end: usize) -> bool {
        if self.start == self.end || start == end {
            self.start <= end && self.end >= start
        } else {
            self.start < end && self.end > start
        }
    }

    pub fn character_style(&self) -> Option<&CharacterStyle<M>> {
        match &self.style {
            Style::Character(style) => Some(style),
            Style::Paragraph(_) => None,
        }
    }

    pub fn paragraph_style(&self) -> Option<&ParagraphStyle> {
        match &self.style {
            Style::Paragraph(style) => Some(style),
            Style::Character(_) => None,
        }
    }
}

/// A paragraph of the text: from after one line break up to and including the
/// next one. Text after the last line break, even when empty, is the last
/// paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paragraph {
    pub start: usize,
    pub end: usize,
    pub is_first: bool,
    pub is_last: bool,
}

impl Paragraph {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Text with style runs
#[derive(Debug, Clone, PartialEq)]
pub struct RichText<M> {
    text: String,
    runs: Vec<Run<M>>,
}

impl<M> Default for RichText<M> {
    fn default() -> Self {
        Self {
            text: String::new(),
            runs: Vec::new(),
        }
    }
}

impl<M> RichText<M> {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            runs: Vec::new(),
        }
    }

    /// Build from text and runs, validating every run range
    pub fn from_parts(text: impl Into<String>, runs: Vec<Run<M>>) -> Result<Self> {
        let mut result = Self::new(text);
        for run in runs {
            result.add_run(run.style, run.start, run.end)?;
        }
        Ok(result)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Runs in insertion order
    pub fn runs(&self) -> &[Run<M>] {
        &self.runs
    }

    /// Length of the text in bytes
    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_parts(self) -> (String, Vec<Run<M>>) {
        (self.text, self.runs)
    }

    pub fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    /// Attach a style to `start..end`
    pub fn add_run(&mut self, style: impl Into<Style<M>>, start: usize, end: usize) -> Result<()> {
        if start > end
            || end > self.text.len()
            || !self.text.is_char_boundary(start)
            || !self.text.is_char_boundary(end)
        {
            return Err(ConvertError::InvalidRange {
                start,
                end,
                len: self.text.len(),
            });
        }
        self.runs.push(Run {
            style: style.into(),
            start,
            end,
        });
        Ok(())
    }

    /// Builder variant of [`RichText::add_run`]
    pub fn with_run(mut self, style: impl Into<Style<M>>, start: usize, end: usize) -> Result<Self> {
        self.add_run(style, start, end)?;
        Ok(self)
    }

    /// Shorten the text to `len` bytes. Runs are clamped to the new length and
    /// dropped when nothing of them remains.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.text.len() {
            return;
        }
        self.text.truncate(len);
        self.runs.retain_mut(|run| {
            run.end = run.end.min(len);
            run.start < run.end
        });
    }

    /// Split the text into paragraphs. `\r\n`, `\r` and `\n` all end a paragraph.
    pub fn paragraphs(&self) -> Vec<Paragraph> {
        let bytes = self.text.as_bytes();
        let mut paragraphs = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < bytes.len() {
            let end = match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => i + 2,
                b'\r' | b'\n' => i + 1,
                _ => {
                    i += 1;
                    continue;
                }
            };
            paragraphs.push(Paragraph {
                start,
                end,
                is_first: paragraphs.is_empty(),
                is_last: false,
            });
            start = end;
            i = end;
        }

        paragraphs.push(Paragraph {
            start,
            end: bytes.len(),
            is_first: paragraphs.is_empty(),
            is_last: true,
        });
        paragraphs
    }

    /// Paragraph runs intersecting `start..end`, with their insertion index
    pub fn paragraph_runs(&self, start: usize, end: usize) -> impl Iterator<Item = (usize, &Run<M>, &ParagraphStyle)> {
        self.runs.iter().enumerate().filter_map(move |(i, run)| {
            let style = run.paragraph_style()?;
            run.overlaps(start, end).then_some((i, run, style))
        })
    }

    /// Character runs intersecting `start..end`, with their insertion index
    pub fn character_runs(&self, start: usize, end: usize) -> impl Iterator<Item = (usize, &Run<M>, &CharacterStyle<M>)> {
        self.runs.iter().enumerate().filter_map(move |(i, run)| {
            let style = run.character_style()?;
            run.overlaps(start, end).then_some((i, run, style))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn para(start: usize, end: usize, is_first: bool, is_last: bool) -> Paragraph {
        Paragraph {
            start,
            end,
            is_first,
            is_last,
        }
    }

    #[test]
    fn test_paragraphs() {
        let text: RichText<NoMedia> = RichText::new("first\nsecond\nthird");
        assert_eq!(
            text.paragraphs(),
            vec![
                para(0, 6, true, false),
                para(6, 13, false, false),
                para(13, 18, false, true),
            ]
        );
    }

    #[test]
    fn test_paragraphs_trailing_break() {
        let text: RichText<NoMedia> = RichText::new("a\r\n");
        assert_eq!(
            text.paragraphs(),
            vec![para(0, 3, true, false), para(3, 3, false, true)]
        );

        let empty: RichText<NoMedia> = RichText::new("");
        assert_eq!(empty.paragraphs(), vec![para(0, 0, true, true)]);
    }

    #[test]
    fn test_add_run_validates_range() {
        let mut text: RichText<NoMedia> = RichText::new("héllo");
        assert!(text.add_run(CharacterStyle::Bold, 0, 3).is_ok());
        assert!(matches!(
            text.add_run(CharacterStyle::Bold, 0, 2),
            Err(ConvertError::InvalidRange { .. })
        ));
        assert!(text.add_run(CharacterStyle::Bold, 4, 3).is_err());
        assert!(text.add_run(CharacterStyle::Bold, 0, 7).is_err());
        assert_eq!(text.runs().len(), 1);
    }

    #[test]
    fn test_truncate_clamps_runs() {
        let mut text: RichText<NoMedia> = RichText::new("abc\n\n")
            .with_run(CharacterStyle::Bold, 0, 5)
            .unwrap()
            .with_run(ParagraphStyle::Bullet, 4, 5)
            .unwrap();
        text.truncate(3);
        assert_eq!(text.text(), "abc");
        assert_eq!(text.runs().len(), 1);
        assert_eq!(text.runs()[0].end, 3);
    }

    #[test]
    fn test_overlaps() {
        let run: Run<NoMedia> = Run {
            style: CharacterStyle::Bold.into(),
            start: 2,
            end: 4,
        };
        assert!(run.overlaps(0, 3));
        assert!(!run.overlaps(4, 6));
        assert!(!run.overlaps(0, 2));
        assert!(run.overlaps(4, 4));

        let mark: Run<NoMedia> = Run {
            style: CharacterStyle::Bold.into(),
            start: 2,
            end: 2,
        };
        assert!(mark.overlaps(0, 2));
        assert!(!mark.overlaps(3, 5));
    }

    #[test]
    fn test_alignment_from_attr() {
        assert_eq!(Alignment::from_attr("CENTER"), Alignment::Center);
        assert_eq!(Alignment::from_attr("right"), Alignment::Right);
        assert_eq!(Alignment::from_attr("justify"), Alignment::Left);
    }
}
