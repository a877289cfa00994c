//! HTML to rich text conversion
//!
//! The reader consumes tokenizer events and appends text to a growing
//! [`RichText`]. Open tags leave a mark at the current end of the text; the
//! matching close tag resolves the most recent mark of its kind into a run
//! over `[mark, end)`. Runs are only created once their end is known, so a
//! style never grows over text appended after its close tag.

use once_cell::sync::Lazy;
use regex::Regex;
use richtext_core::{
    html_color, Alignment, CharacterStyle, Media, MediaFormat, Options, ParagraphStyle,
    ParagraphStyleStack, ParagraphType, RichText, Style, NAMED_COLORS, OBJECT_REPLACEMENT,
};

use crate::html::{tokenize, Tag, TagHandler};
use crate::media::MediaFactory;
use crate::utilities::{collapse_whitespace, heading_level, is_ignored, last_char, paragraph_break};

static FONT_SIZE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());
static FONT_COLOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"#[a-f0-9]+").unwrap());

/// Pixel sizes of `<big>` and `<small>`
const BIG_PX: u32 = 32;
const SMALL_PX: u32 = 14;

/// Convert an HTML fragment to rich text.
///
/// Malformed markup never fails: the tokenizer repairs the tree and list
/// closes that don't match are absorbed by the paragraph style stack. Media
/// that can't be resolved is dropped.
pub fn html_to_rich_text<F: MediaFactory>(
    html: &str,
    factory: &F,
    options: &Options,
) -> RichText<F::Media> {
    let mut reader = HtmlReader::new(factory, options);
    tokenize(html, &mut reader);
    reader.finish()
}

/// Inline tags that map to a single character style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Inline {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Superscript,
    Subscript,
    Monospace,
    Big,
    Small,
}

impl Inline {
    fn from_tag(name: &str) -> Option<Self> {
        let inline = match name {
            "b" | "strong" => Inline::Bold,
            "i" | "em" | "cite" | "dfn" => Inline::Italic,
            "u" => Inline::Underline,
            "strike" | "del" => Inline::Strikethrough,
            "sup" => Inline::Superscript,
            "sub" => Inline::Subscript,
            "tt" => Inline::Monospace,
            "big" => Inline::Big,
            "small" => Inline::Small,
            _ => return None,
        };
        Some(inline)
    }

    fn style<M>(self, options: &Options) -> CharacterStyle<M> {
        match self {
            Inline::Bold => CharacterStyle::Bold,
            Inline::Italic => CharacterStyle::Italic,
            Inline::Underline => CharacterStyle::Underline,
            Inline::Strikethrough => CharacterStyle::Strikethrough,
            Inline::Superscript => CharacterStyle::Superscript,
            Inline::Subscript => CharacterStyle::Subscript,
            Inline::Monospace => CharacterStyle::Monospace,
            Inline::Big => CharacterStyle::AbsoluteSize(options.px_to_sp(BIG_PX)),
            Inline::Small => CharacterStyle::AbsoluteSize(options.px_to_sp(SMALL_PX)),
        }
    }
}

/// Pending attributes of a `<font>` tag
#[derive(Debug, Default, Clone, PartialEq)]
struct Font {
    /// Size in pixels
    size: Option<u32>,
    foreground: Option<String>,
    background: Option<String>,
    face: Option<String>,
}

impl Font {
    /// Read `face` and the `font-size`, `color` and `background-color`
    /// declarations of a `style` attribute
    fn from_tag(tag: &Tag<'_>) -> Self {
        let mut font = Font {
            face: tag
                .attr("face")
                .filter(|face| !face.is_empty())
                .map(String::from),
            ..Font::default()
        };

        if let Some(style) = tag.attr("style") {
            for part in style.to_lowercase().split(';') {
                let part = part.trim();
                if part.starts_with("font-size") {
                    font.size = FONT_SIZE
                        .find(part)
                        .and_then(|size| size.as_str().parse().ok())
                        .filter(|size| *size > 0);
                } else if let Some(value) = part.strip_prefix("background-color") {
                    font.background = color_value(value);
                } else if let Some(value) = part.strip_prefix("color") {
                    font.foreground = color_value(value);
                }
            }
        }

        font
    }
}

/// Color of a declaration value: a `#` hex literal or a color name
fn color_value(declaration: &str) -> Option<String> {
    if let Some(hex) = FONT_COLOR.find(declaration) {
        return Some(hex.as_str().to_string());
    }
    let name = declaration.trim_start().strip_prefix(':')?.trim();
    NAMED_COLORS
        .iter()
        .any(|(known, _)| *known == name)
        .then(|| name.to_string())
}

fn is_indentation(tag: &Tag<'_>) -> bool {
    tag.attr("style")
        .is_some_and(|style| style.to_lowercase().contains("list-style-type:none"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListItemKind {
    Bullet,
    Number,
    Indentation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ListItem {
    kind: ListItemKind,
    /// Nesting depth of the enclosing list
    indent: usize,
    /// A nested list has already ended the item's first paragraph
    split: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum MarkKind {
    Inline(Inline),
    Font(Font),
    Link(Option<String>),
    Div(Alignment),
    ListItem(ListItem),
    Quote,
    Heading(usize),
}

/// An open tag waiting for its close
#[derive(Debug)]
struct Mark {
    kind: MarkKind,
    start: usize,
}

#[derive(Debug, Clone, Copy)]
enum MediaKind {
    Image,
    Audio,
    Video,
}

struct HtmlReader<'a, F: MediaFactory> {
    factory: &'a F,
    options: &'a Options,
    text: RichText<F::Media>,
    marks: Vec<Mark>,
    lists: ParagraphStyleStack,
    /// Depth of elements whose text is dropped
    ignore_depth: usize,
    /// Per open `<video>`: whether it resolved, hiding its fallback content
    videos: Vec<bool>,
}

impl<'a, F: MediaFactory> HtmlReader<'a, F> {
    fn new(factory: &'a F, options: &'a Options) -> Self {
        Self {
            factory,
            options,
            text: RichText::default(),
            marks: Vec::new(),
            lists: ParagraphStyleStack::new(),
            ignore_depth: 0,
            videos: Vec::new(),
        }
    }

    fn finish(mut self) -> RichText<F::Media> {
        let trimmed = self.text.text().trim_end_matches('\n').len();
        self.text.truncate(trimmed);

        if !self.lists.is_empty() {
            tracing::debug!(frames = self.lists.len(), "Unclosed lists at end of document");
        }
        tracing::trace!(
            bytes = self.text.len(),
            runs = self.text.runs().len(),
            "Converted HTML to rich text"
        );
        self.text
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    fn ends_with_newline(&self) -> bool {
        self.text.text().ends_with('\n')
    }

    fn push_newline(&mut self) {
        if !self.ends_with_newline() {
            self.text.push('\n');
        }
    }

    /// Start a new line unless the text is empty or already at a line start
    fn break_line(&mut self) {
        if !self.text.is_empty() {
            self.push_newline();
        }
    }

    fn paragraph_break(&mut self) {
        let separator = paragraph_break(self.text.text());
        self.text.push_str(separator);
    }

    fn start(&mut self, kind: MarkKind) {
        let start = self.len();
        self.marks.push(Mark { kind, start });
    }

    /// Remove and return the most recent open mark accepted by `matches`
    fn take_last(&mut self, matches: impl Fn(&MarkKind) -> bool) -> Option<Mark> {
        let index = self.marks.iter().rposition(|mark| matches(&mark.kind));
        debug_assert!(index.is_some(), "close tag without an open mark");
        index.map(|index| self.marks.remove(index))
    }

    fn add_run(&mut self, style: impl Into<Style<F::Media>>, start: usize, end: usize) {
        if start == end {
            return;
        }
        let result = self.text.add_run(style, start, end);
        debug_assert!(result.is_ok(), "run {}..{} outside of text", start, end);
    }

    fn end_inline(&mut self, inline: Inline) {
        let Some(mark) = self.take_last(|kind| *kind == MarkKind::Inline(inline)) else {
            return;
        };
        let style = inline.style(self.options);
        self.add_run(style, mark.start, self.len());
    }

    fn end_link(&mut self) {
        let Some(mark) = self.take_last(|kind| matches!(kind, MarkKind::Link(_))) else {
            return;
        };
        if let MarkKind::Link(Some(href)) = mark.kind {
            self.add_run(CharacterStyle::Link(href), mark.start, self.len());
        }
    }

    fn end_font(&mut self) {
        let Some(mark) = self.take_last(|kind| matches!(kind, MarkKind::Font(_))) else {
            return;
        };
        let MarkKind::Font(font) = mark.kind else {
            return;
        };
        let (start, end) = (mark.start, self.len());
        if start == end {
            return;
        }

        if let Some(face) = font.face {
            self.add_run(CharacterStyle::Typeface(face), start, end);
        }
        if let Some(px) = font.size {
            let size = self.options.px_to_sp(px);
            self.add_run(CharacterStyle::AbsoluteSize(size), start, end);
        }
        if let Some(color) = font.foreground {
            match html_color(&color) {
                Some(rgb) => self.add_run(CharacterStyle::ForegroundColor(rgb | 0xFF00_0000), start, end),
                None => tracing::debug!(%color, "Dropping unparseable font color"),
            }
        }
        if let Some(color) = font.background {
            match html_color(&color) {
                Some(rgb) => self.add_run(CharacterStyle::BackgroundColor(rgb | 0xFF00_0000), start, end),
                None => tracing::debug!(%color, "Dropping unparseable background color"),
            }
        }
    }

    fn end_div(&mut self) {
        let Some(mark) = self.take_last(|kind| matches!(kind, MarkKind::Div(_))) else {
            return;
        };
        let MarkKind::Div(alignment) = mark.kind else {
            return;
        };
        let (start, end) = (mark.start, self.len());
        if start == end {
            return;
        }

        // an inner div already aligned this paragraph
        let duplicate = self.text.runs().iter().any(|run| {
            run.start == start && matches!(run.paragraph_style(), Some(ParagraphStyle::Alignment(_)))
        });
        if !duplicate {
            self.push_newline();
            self.add_run(ParagraphStyle::Alignment(alignment), start, end);
        }
    }

    fn end_quote(&mut self) {
        let Some(mark) = self.take_last(|kind| *kind == MarkKind::Quote) else {
            return;
        };
        self.add_run(ParagraphStyle::Quote, mark.start, self.len());
    }

    fn end_heading(&mut self) {
        let Some(mark) = self.take_last(|kind| matches!(kind, MarkKind::Heading(_))) else {
            return;
        };
        let MarkKind::Heading(level) = mark.kind else {
            return;
        };

        // the heading covers its text, not the blank line after it
        let text = self.text.text();
        let end = mark.start + text[mark.start..].trim_end_matches('\n').len();

        let scale = self.options.header_size(level);
        self.add_run(CharacterStyle::RelativeSize(scale), mark.start, end);
        self.add_run(CharacterStyle::Bold, mark.start, end);
    }

    fn start_list(&mut self, ordered: bool, tag: &Tag<'_>) {
        self.split_list_item();
        self.break_line();
        let kind = ParagraphType::for_list(ordered, is_indentation(tag));
        self.lists.open_list(kind);
    }

    fn end_list(&mut self, ordered: bool) {
        if !self.lists.close_list(ordered) {
            tracing::debug!(ordered, "List close without an open list");
        }

        // the enclosing item continues after the nested list
        let len = self.len();
        if let Some(mark) = self.last_list_item_mut() {
            if let MarkKind::ListItem(item) = &mark.kind {
                if item.split {
                    mark.start = len;
                }
            }
        }
    }

    fn last_list_item_mut(&mut self) -> Option<&mut Mark> {
        self.marks
            .iter_mut()
            .rev()
            .find(|mark| matches!(mark.kind, MarkKind::ListItem(_)))
    }

    /// A nested list ends the text of its enclosing list item
    fn split_list_item(&mut self) {
        let len = self.len();
        let Some(mark) = self.last_list_item_mut() else {
            return;
        };
        let MarkKind::ListItem(item) = &mut mark.kind else {
            return;
        };
        item.split = true;
        let (item, start) = (*item, mark.start);

        if start != len {
            self.push_newline();
            self.list_item_runs(item, start, self.len());
        }
    }

    fn start_list_item(&mut self, tag: &Tag<'_>) {
        self.break_line();
        let item = match self.lists.peek() {
            None => ListItem {
                kind: ListItemKind::Bullet,
                indent: 0,
                split: false,
            },
            Some(top) => {
                let kind = if top.kind.is_indentation() || is_indentation(tag) {
                    ListItemKind::Indentation
                } else if top.kind.is_numbering() {
                    ListItemKind::Number
                } else {
                    ListItemKind::Bullet
                };
                ListItem {
                    kind,
                    indent: top.absolute_indent,
                    split: false,
                }
            }
        };
        self.start(MarkKind::ListItem(item));
    }

    fn end_list_item(&mut self) {
        let Some(mark) = self.take_last(|kind| matches!(kind, MarkKind::ListItem(_))) else {
            return;
        };
        let MarkKind::ListItem(item) = mark.kind else {
            return;
        };
        if item.split && mark.start == self.len() {
            return;
        }

        self.push_newline();
        self.list_item_runs(item, mark.start, self.len());
    }

    fn list_item_runs(&mut self, item: ListItem, start: usize, end: usize) {
        let mut indents = item.indent;
        match item.kind {
            ListItemKind::Bullet => {
                indents = indents.saturating_sub(1);
                self.add_run(ParagraphStyle::Bullet, start, end);
            }
            ListItemKind::Number => {
                indents = indents.saturating_sub(1);
                self.add_run(ParagraphStyle::Number, start, end);
            }
            ListItemKind::Indentation => {}
        }
        if indents > 0 {
            self.add_run(ParagraphStyle::Indentation(indents), start, end);
        }
    }

    /// Insert a media placeholder; returns whether the media resolved
    fn add_media(&mut self, kind: MediaKind, src: Option<&str>) -> bool {
        let Some(src) = src else {
            tracing::debug!(?kind, "Dropping media without a source");
            return false;
        };
        let media = match kind {
            MediaKind::Image => self.factory.create_image(src),
            MediaKind::Audio => self.factory.create_audio(src),
            MediaKind::Video => self.factory.create_video(src),
        };

        match media {
            Some(media) if media.exists() && !media.is_directory(MediaFormat::Spanned) => {
                let start = self.len();
                self.text.push(OBJECT_REPLACEMENT);
                let style = match kind {
                    MediaKind::Image => CharacterStyle::Image(media),
                    MediaKind::Audio => CharacterStyle::Audio(media),
                    MediaKind::Video => CharacterStyle::Video(media),
                };
                self.add_run(style, start, self.len());
                true
            }
            Some(_) => {
                tracing::debug!(src, ?kind, "Dropping missing media");
                false
            }
            None => {
                tracing::debug!(src, ?kind, "Dropping unresolved media");
                false
            }
        }
    }
}

impl<'a, F: MediaFactory> TagHandler for HtmlReader<'a, F> {
    fn start_element(&mut self, tag: &Tag<'_>) {
        match tag.name {
            "br" => {}
            "p" => self.paragraph_break(),
            "div" => {
                let alignment = Alignment::from_attr(tag.attr("align").unwrap_or("left"));
                self.start(MarkKind::Div(alignment));
            }
            "ul" => self.start_list(false, tag),
            "ol" => self.start_list(true, tag),
            "li" => self.start_list_item(tag),
            "font" => self.start(MarkKind::Font(Font::from_tag(tag))),
            "a" => self.start(MarkKind::Link(tag.attr("href").map(String::from))),
            "blockquote" => {
                self.paragraph_break();
                self.start(MarkKind::Quote);
            }
            "img" => {
                self.add_media(MediaKind::Image, tag.attr("src"));
            }
            "embed" => {
                self.add_media(MediaKind::Audio, tag.attr("src"));
            }
            "video" => {
                let resolved = self.add_media(MediaKind::Video, tag.attr("src"));
                // fallback content stands in for a video that didn't resolve
                if resolved {
                    self.ignore_depth += 1;
                }
                self.videos.push(resolved);
            }
            name => {
                if let Some(level) = heading_level(name) {
                    self.paragraph_break();
                    self.start(MarkKind::Heading(level));
                } else if let Some(inline) = Inline::from_tag(name) {
                    self.start(MarkKind::Inline(inline));
                } else if is_ignored(name) {
                    self.ignore_depth += 1;
                }
            }
        }
    }

    fn end_element(&mut self, name: &str) {
        match name {
            "br" => self.text.push('\n'),
            "p" => self.paragraph_break(),
            "div" => self.end_div(),
            "ul" => self.end_list(false),
            "ol" => self.end_list(true),
            "li" => self.end_list_item(),
            "font" => self.end_font(),
            "a" => self.end_link(),
            "blockquote" => {
                self.paragraph_break();
                self.end_quote();
            }
            "img" | "embed" => {}
            "video" => {
                if self.videos.pop() == Some(true) {
                    self.ignore_depth = self.ignore_depth.saturating_sub(1);
                }
            }
            name => {
                if heading_level(name).is_some() {
                    self.paragraph_break();
                    self.end_heading();
                } else if let Some(inline) = Inline::from_tag(name) {
                    self.end_inline(inline);
                } else if is_ignored(name) {
                    self.ignore_depth = self.ignore_depth.saturating_sub(1);
                }
            }
        }
    }

    fn characters(&mut self, text: &str) {
        if self.ignore_depth > 0 {
            return;
        }
        let collapsed = collapse_whitespace(text, last_char(self.text.text()));
        self.text.push_str(&collapsed);
    }
}
