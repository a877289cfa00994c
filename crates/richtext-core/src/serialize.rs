//! Rich text serialization
//!
//! Writes a [`RichText`] out as nested HTML: paragraph styles become list,
//! indentation and alignment blocks, character styles become inline tags.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use crate::model::{CharacterStyle, Media, MediaFormat, Paragraph, ParagraphStyle, RichText, Run};
use crate::options::Options;
use crate::paragraph::{AccumulatedParagraphStyle, ParagraphStyleStack, ParagraphType};

const BR: &str = "<br/>\n";

/// HTML produced from a [`RichText`], with the media it references
#[derive(Debug, Clone, PartialEq)]
pub struct Html<M> {
    pub html: String,
    /// Referenced media in document order
    pub media: Vec<M>,
}

/// Serialize rich text to HTML
pub fn serialize<M: Media>(text: &RichText<M>, options: &Options) -> Html<M> {
    let mut writer = HtmlWriter::new(text, options);
    let paragraphs = text.paragraphs();

    for paragraph in &paragraphs {
        // a trailing line break doesn't open another (empty) list item
        if paragraph.is_last && paragraph.is_empty() && !paragraph.is_first {
            continue;
        }
        writer.write_paragraph(paragraph);
    }
    writer.stack.pop_all(&mut writer.out);

    tracing::trace!(
        paragraphs = paragraphs.len(),
        media = writer.media.len(),
        bytes = writer.out.len(),
        "Serialized rich text"
    );

    Html {
        html: writer.out,
        media: writer.media,
    }
}

/// Whether the contents of an opened tag are written
enum RenderChildren {
    Yes,
    No,
}

/// A character run waiting to be written, ordered by start ascending, then
/// end descending, then headings first, then style name and insertion index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct PendingRun {
    start: usize,
    end: Reverse<usize>,
    rank: u8,
    name: &'static str,
    index: usize,
}

struct HtmlWriter<'a, M> {
    text: &'a RichText<M>,
    options: &'a Options,
    out: String,
    media: Vec<M>,
    stack: ParagraphStyleStack,
    /// Line breaks after a heading that are written as plain newlines
    heading_breaks: usize,
}

impl<'a, M: Media> HtmlWriter<'a, M> {
    fn new(text: &'a RichText<M>, options: &'a Options) -> Self {
        Self {
            text,
            options,
            out: String::with_capacity(text.len() * 2),
            media: Vec::new(),
            stack: ParagraphStyleStack::new(),
            heading_breaks: 0,
        }
    }

    fn write_paragraph(&mut self, paragraph: &Paragraph) {
        let text = self.text;
        let mut styles: Vec<(usize, &Run<M>, &ParagraphStyle)> = text
            .paragraph_runs(paragraph.start, paragraph.end)
            .collect();
        styles.sort_by_key(|(index, run, _)| (run.start, run.end, *index));

        let alignment = styles
            .iter()
            .filter_map(|(_, _, style)| ParagraphType::for_style(style))
            .find(|kind| kind.is_alignment());

        let mut indent = 0;
        let mut kind = ParagraphType::None;
        for (_, _, style) in &styles {
            indent += style.indentation();
            kind = match ParagraphType::for_style(style) {
                Some(ParagraphType::Bullet) => ParagraphType::Bullet,
                Some(ParagraphType::Numbering) if !kind.is_bullet() => ParagraphType::Numbering,
                Some(t) if t.is_indentation() && kind.is_undefined() => ParagraphType::IndentationUl,
                _ => kind,
            };
        }
        if indent == 0 {
            kind = ParagraphType::None;
        }

        let before = self.out.len();
        self.stack
            .reconcile(AccumulatedParagraphStyle::new(kind, indent, 0), &mut self.out);
        self.out.push_str(kind.list_start_tag());
        if let Some(alignment) = alignment {
            self.out.push_str(alignment.start_tag());
        }
        if self.out.len() != before {
            self.heading_breaks = 0;
        }

        self.write_paragraph_text(paragraph);

        // a blank line keeps its break, or the block would read back empty
        let blank = text.text()[paragraph.start..paragraph.end]
            .trim_end_matches(['\n', '\r'])
            .is_empty();
        if let Some(alignment) = alignment {
            if !blank {
                self.remove_trailing_line_break(alignment);
            }
            self.out.push_str(alignment.end_tag());
        }
        if !blank {
            self.remove_trailing_line_break(kind);
        }
        self.out.push_str(kind.list_end_tag());
    }

    fn remove_trailing_line_break(&mut self, kind: ParagraphType) {
        if kind.end_tag_adds_line_break() && self.out.ends_with(BR) {
            self.out.truncate(self.out.len() - BR.len());
        }
    }

    fn write_paragraph_text(&mut self, paragraph: &Paragraph) {
        let text = self.text;
        let runs: Vec<(usize, &Run<M>, &CharacterStyle<M>)> = text
            .character_runs(paragraph.start, paragraph.end)
            .filter(|(_, run, style)| !run.is_empty() || style.is_media())
            .collect();

        let headings: Vec<(usize, usize)> = runs
            .iter()
            .filter(|(_, run, style)| self.heading_level(paragraph, run, style).is_some())
            .map(|(_, run, _)| (run.start, run.end))
            .collect();

        let mut pending = BTreeSet::new();
        for (index, run, style) in &runs {
            // the heading tag already makes its text bold
            if matches!(style, CharacterStyle::Bold) && headings.contains(&(run.start, run.end)) {
                continue;
            }
            let is_heading = self.heading_level(paragraph, run, style).is_some();
            pending.insert(PendingRun {
                start: run.start,
                end: Reverse(run.end),
                rank: if is_heading { 0 } else { 1 },
                name: style.name(),
                index: *index,
            });
        }

        self.write_text(paragraph, paragraph.start, paragraph.end, &mut pending);
    }

    /// Heading level of a relative size run that covers a whole line from the
    /// start of its paragraph
    fn heading_level(
        &self,
        paragraph: &Paragraph,
        run: &Run<M>,
        style: &CharacterStyle<M>,
    ) -> Option<usize> {
        let CharacterStyle::RelativeSize(scale) = style else {
            return None;
        };
        let rest = &self.text.text()[run.end..];
        if run.start != paragraph.start || !(rest.is_empty() || rest.starts_with(['\n', '\r'])) {
            return None;
        }
        self.options.heading_level(*scale)
    }

    fn write_text(
        &mut self,
        paragraph: &Paragraph,
        mut start: usize,
        end: usize,
        pending: &mut BTreeSet<PendingRun>,
    ) {
        while start < end {
            let Some(next) = pending.first().copied() else {
                self.escape(start, end);
                return;
            };

            if start < next.start {
                self.escape(start, end.min(next.start));
                start = next.start;
                continue;
            }

            pending.pop_first();
            let run_end = next.end.0;
            // cut short by an earlier sibling, nothing left of it to write
            if run_end <= start && next.start < start {
                continue;
            }

            let text = self.text;
            let run = &text.runs()[next.index];
            let Some(style) = run.character_style() else {
                continue;
            };
            let heading = self.heading_level(paragraph, run, style);

            let render = self.open_tag(style, heading);
            if let RenderChildren::Yes = render {
                self.write_text(paragraph, start, run_end.min(end), pending);
            }
            self.close_tag(style, heading);

            // reopen what is left of the run once the enclosing tag is closed
            if run_end > end && matches!(render, RenderChildren::Yes) {
                pending.insert(PendingRun { start: end, ..next });
            }
            start = run_end;
        }
    }

    fn open_tag(&mut self, style: &CharacterStyle<M>, heading: Option<usize>) -> RenderChildren {
        self.heading_breaks = 0;
        match style {
            CharacterStyle::Bold => self.out.push_str("<b>"),
            CharacterStyle::Italic => self.out.push_str("<i>"),
            CharacterStyle::Underline => self.out.push_str("<u>"),
            CharacterStyle::Strikethrough => self.out.push_str("<strike>"),
            CharacterStyle::Superscript => self.out.push_str("<sup>"),
            CharacterStyle::Subscript => self.out.push_str("<sub>"),
            CharacterStyle::Monospace => self.out.push_str("<tt>"),
            CharacterStyle::Typeface(face) => {
                self.out.push_str("<font face=\"");
                self.out
                    .push_str(&html_escape::encode_double_quoted_attribute(face));
                self.out.push_str("\">");
            }
            CharacterStyle::AbsoluteSize(size) => {
                let px = self.options.sp_to_px(*size);
                self.out
                    .push_str(&format!("<font style=\"font-size:{}px\">", px));
            }
            CharacterStyle::RelativeSize(_) => {
                if let Some(level) = heading {
                    self.out.push_str(&format!("<h{}>", level + 1));
                }
            }
            CharacterStyle::ForegroundColor(color) => {
                self.out
                    .push_str(&format!("<font style=\"color:#{:06x}\">", color & 0xFF_FFFF));
            }
            CharacterStyle::BackgroundColor(color) => {
                self.out.push_str(&format!(
                    "<font style=\"background-color:#{:06x}\">",
                    color & 0xFF_FFFF
                ));
            }
            CharacterStyle::Link(href) => {
                self.out.push_str("<a href=\"");
                self.out
                    .push_str(&html_escape::encode_double_quoted_attribute(href));
                self.out.push_str("\">");
            }
            CharacterStyle::Image(image) => {
                self.push_media("<img src=\"", image);
                return RenderChildren::No;
            }
            CharacterStyle::Audio(audio) => {
                self.push_media("<embed src=\"", audio);
                return RenderChildren::No;
            }
            CharacterStyle::Video(video) => {
                self.push_media("<video controls src=\"", video);
                return RenderChildren::No;
            }
        }
        RenderChildren::Yes
    }

    fn close_tag(&mut self, style: &CharacterStyle<M>, heading: Option<usize>) {
        match style {
            CharacterStyle::Bold => self.out.push_str("</b>"),
            CharacterStyle::Italic => self.out.push_str("</i>"),
            CharacterStyle::Underline => self.out.push_str("</u>"),
            CharacterStyle::Strikethrough => self.out.push_str("</strike>"),
            CharacterStyle::Superscript => self.out.push_str("</sup>"),
            CharacterStyle::Subscript => self.out.push_str("</sub>"),
            CharacterStyle::Monospace => self.out.push_str("</tt>"),
            CharacterStyle::Typeface(_)
            | CharacterStyle::AbsoluteSize(_)
            | CharacterStyle::ForegroundColor(_)
            | CharacterStyle::BackgroundColor(_) => self.out.push_str("</font>"),
            CharacterStyle::RelativeSize(_) => {
                if let Some(level) = heading {
                    self.out.push_str(&format!("</h{}>", level + 1));
                    // reading the heading back already ends its paragraph
                    self.heading_breaks = 2;
                }
            }
            CharacterStyle::Link(_) => self.out.push_str("</a>"),
            CharacterStyle::Video(_) => self.out.push_str("</video>"),
            CharacterStyle::Image(_) | CharacterStyle::Audio(_) => {}
        }
    }

    fn push_media(&mut self, tag: &str, media: &M) {
        let path = media.file_path(MediaFormat::Html);
        self.out.push_str(tag);
        self.out
            .push_str(&html_escape::encode_double_quoted_attribute(&path));
        self.out.push_str("\">");
        self.media.push(media.clone());
    }

    /// Write plain text, escaping markup characters, line breaks and runs of
    /// spaces
    fn escape(&mut self, start: usize, end: usize) {
        let source = self.text;
        let text = &source.text()[start..end];
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            // `\r\n` and a lone `\r` end a line just like `\n`
            let c = if c == '\r' {
                chars.next_if_eq(&'\n');
                '\n'
            } else {
                c
            };
            if c != '\n' {
                self.heading_breaks = 0;
            }
            match c {
                '\n' if self.heading_breaks > 0 => {
                    self.heading_breaks -= 1;
                    self.out.push('\n');
                }
                '\n' => self.out.push_str(BR),
                '<' => self.out.push_str("&lt;"),
                '>' => self.out.push_str("&gt;"),
                '&' => self.out.push_str("&amp;"),
                ' ' => {
                    while chars.next_if_eq(&' ').is_some() {
                        self.out.push_str("&nbsp;");
                    }
                    self.out.push(' ');
                }
                c if (c as u32) < 0x20 => {
                    self.out.push_str(&format!("&#{};", c as u32));
                }
                c => self.out.push(c),
            }
        }
    }
}
