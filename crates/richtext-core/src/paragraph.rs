//! Paragraph types and the nested list/indentation style stack
//!
//! Both conversion directions walk forward through paragraphs while tracking
//! how deeply nested the current list or indentation context is. The stack
//! stores one frame per run of same-typed levels instead of one per level.

use crate::model::{Alignment, ParagraphStyle};

/// Tag text and flags driving the HTML emitted for a paragraph type
struct TagSet {
    start: &'static str,
    end: &'static str,
    list_start: &'static str,
    list_end: &'static str,
    is_alignment: bool,
    end_tag_adds_line_break: bool,
}

const NONE: TagSet = TagSet {
    start: "",
    end: "",
    list_start: "",
    list_end: "",
    is_alignment: false,
    end_tag_adds_line_break: false,
};

const ALIGNMENT_LEFT: TagSet = TagSet {
    start: "<div align=\"left\">",
    end: "</div>",
    list_start: "",
    list_end: "",
    is_alignment: true,
    end_tag_adds_line_break: true,
};

const ALIGNMENT_CENTER: TagSet = TagSet {
    start: "<div align=\"center\">",
    ..ALIGNMENT_LEFT
};

const ALIGNMENT_RIGHT: TagSet = TagSet {
    start: "<div align=\"right\">",
    ..ALIGNMENT_LEFT
};

const BULLET: TagSet = TagSet {
    start: "<ul>",
    end: "</ul>",
    list_start: "<li>",
    list_end: "</li>",
    is_alignment: false,
    end_tag_adds_line_break: true,
};

const NUMBERING: TagSet = TagSet {
    start: "<ol>",
    end: "</ol>",
    ..BULLET
};

const INDENTATION_UL: TagSet = TagSet {
    start: "<ul style='list-style-type:none;'>",
    end: "</ul>",
    list_start: "<li style='list-style-type:none;'>",
    list_end: "</li>",
    is_alignment: false,
    end_tag_adds_line_break: true,
};

const INDENTATION_OL: TagSet = TagSet {
    start: "<ol style='list-style-type:none;'>",
    end: "</ol>",
    ..INDENTATION_UL
};

/// Kind of paragraph formatting, with the HTML each kind is written as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParagraphType {
    #[default]
    None,
    AlignmentLeft,
    AlignmentCenter,
    AlignmentRight,
    Bullet,
    Numbering,
    IndentationUl,
    IndentationOl,
}

impl ParagraphType {
    fn tags(self) -> &'static TagSet {
        match self {
            ParagraphType::None => &NONE,
            ParagraphType::AlignmentLeft => &ALIGNMENT_LEFT,
            ParagraphType::AlignmentCenter => &ALIGNMENT_CENTER,
            ParagraphType::AlignmentRight => &ALIGNMENT_RIGHT,
            ParagraphType::Bullet => &BULLET,
            ParagraphType::Numbering => &NUMBERING,
            ParagraphType::IndentationUl => &INDENTATION_UL,
            ParagraphType::IndentationOl => &INDENTATION_OL,
        }
    }

    /// Paragraph type written for a paragraph style. Quotes have none.
    pub fn for_style(style: &ParagraphStyle) -> Option<Self> {
        match style {
            ParagraphStyle::Alignment(Alignment::Left) => Some(ParagraphType::AlignmentLeft),
            ParagraphStyle::Alignment(Alignment::Center) => Some(ParagraphType::AlignmentCenter),
            ParagraphStyle::Alignment(Alignment::Right) => Some(ParagraphType::AlignmentRight),
            ParagraphStyle::Bullet => Some(ParagraphType::Bullet),
            ParagraphStyle::Number => Some(ParagraphType::Numbering),
            ParagraphStyle::Indentation(_) => Some(ParagraphType::IndentationUl),
            ParagraphStyle::Quote => None,
        }
    }

    /// Type of a `<ul>`/`<ol>` element
    pub fn for_list(ordered: bool, indentation: bool) -> Self {
        match (ordered, indentation) {
            (true, true) => ParagraphType::IndentationOl,
            (false, true) => ParagraphType::IndentationUl,
            (true, false) => ParagraphType::Numbering,
            (false, false) => ParagraphType::Bullet,
        }
    }

    pub fn start_tag(self) -> &'static str {
        self.tags().start
    }

    pub fn end_tag(self) -> &'static str {
        self.tags().end
    }

    pub fn list_start_tag(self) -> &'static str {
        self.tags().list_start
    }

    pub fn list_end_tag(self) -> &'static str {
        self.tags().list_end
    }

    pub fn is_alignment(self) -> bool {
        self.tags().is_alignment
    }

    pub fn end_tag_adds_line_break(self) -> bool {
        self.tags().end_tag_adds_line_break
    }

    pub fn is_undefined(self) -> bool {
        self == ParagraphType::None
    }

    pub fn is_bullet(self) -> bool {
        self == ParagraphType::Bullet
    }

    pub fn is_numbering(self) -> bool {
        self == ParagraphType::Numbering
    }

    pub fn is_indentation(self) -> bool {
        matches!(self, ParagraphType::IndentationUl | ParagraphType::IndentationOl)
    }

    /// Whether a `</ol>` (ordered) or `</ul>` closes a frame of this type
    pub fn is_closed_by(self, ordered: bool) -> bool {
        if ordered {
            matches!(self, ParagraphType::Numbering | ParagraphType::IndentationOl)
        } else {
            matches!(self, ParagraphType::Bullet | ParagraphType::IndentationUl)
        }
    }
}

/// One frame of nested list/indentation context.
///
/// `absolute_indent` is the total nesting depth at this frame,
/// `relative_indent` the number of levels the frame itself stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccumulatedParagraphStyle {
    pub kind: ParagraphType,
    pub absolute_indent: usize,
    pub relative_indent: usize,
}

impl AccumulatedParagraphStyle {
    pub fn new(kind: ParagraphType, absolute_indent: usize, relative_indent: usize) -> Self {
        Self {
            kind,
            absolute_indent,
            relative_indent,
        }
    }
}

/// Stack of [`AccumulatedParagraphStyle`] frames, outermost first
#[derive(Debug, Clone, Default)]
pub struct ParagraphStyleStack {
    frames: Vec<AccumulatedParagraphStyle>,
}

impl ParagraphStyleStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn peek(&self) -> Option<&AccumulatedParagraphStyle> {
        self.frames.last()
    }

    pub fn frames(&self) -> &[AccumulatedParagraphStyle] {
        &self.frames
    }

    /// Absolute indentation strictly increases from bottom to top
    pub fn is_well_formed(&self) -> bool {
        self.frames
            .windows(2)
            .all(|pair| pair[0].absolute_indent < pair[1].absolute_indent)
    }

    /// Enter a `<ul>`/`<ol>` of the given type while reading HTML.
    ///
    /// A list of the same type as the top frame deepens that frame, anything
    /// else pushes a new frame one level deeper.
    pub fn open_list(&mut self, kind: ParagraphType) {
        match self.frames.last_mut() {
            None => self.frames.push(AccumulatedParagraphStyle::new(kind, 1, 1)),
            Some(top) if top.kind == kind => {
                top.absolute_indent += 1;
                top.relative_indent += 1;
            }
            Some(top) => {
                let indent = top.absolute_indent + 1;
                self.frames.push(AccumulatedParagraphStyle::new(kind, indent, 1));
            }
        }
        debug_assert!(self.is_well_formed());
    }

    /// Leave a `</ul>` (`ordered == false`) or `</ol>` while reading HTML.
    ///
    /// Frames that don't match the closing tag are discarded until one does
    /// or the stack runs empty. Returns whether a matching frame was found.
    pub fn close_list(&mut self, ordered: bool) -> bool {
        while let Some(top) = self.frames.last_mut() {
            if top.kind.is_closed_by(ordered) {
                if top.relative_indent > 1 {
                    top.relative_indent -= 1;
                    top.absolute_indent -= 1;
                } else {
                    self.frames.pop();
                }
                return true;
            }
            tracing::debug!(
                "Discarding {:?} frame on mismatched list close (ordered: {})",
                top.kind,
                ordered
            );
            self.frames.pop();
        }
        false
    }

    /// Diff the style a paragraph needs against the stack, writing the close
    /// and open tags required to get from one to the other.
    pub fn reconcile(&mut self, mut style: AccumulatedParagraphStyle, out: &mut String) {
        loop {
            let (current_indent, current_kind) = self
                .frames
                .last()
                .map(|top| (top.absolute_indent, top.kind))
                .unwrap_or((0, ParagraphType::None));

            if style.absolute_indent > current_indent {
                style.relative_indent = style.absolute_indent - current_indent;
                self.push(style, out);
            } else if style.absolute_indent < current_indent {
                self.pop(out);
                continue;
            } else if style.kind != current_kind {
                style.relative_indent = self.pop(out);
                self.push(style, out);
            }
            break;
        }
        debug_assert!(self.is_well_formed());
    }

    /// Close every open frame
    pub fn pop_all(&mut self, out: &mut String) {
        while !self.frames.is_empty() {
            self.pop(out);
        }
    }

    fn push(&mut self, style: AccumulatedParagraphStyle, out: &mut String) {
        for _ in 0..style.relative_indent {
            out.push_str(style.kind.start_tag());
        }
        self.frames.push(style);
    }

    /// Pop the top frame, returning how many close tags were written
    fn pop(&mut self, out: &mut String) -> usize {
        match self.frames.pop() {
            Some(style) => {
                for _ in 0..style.relative_indent {
                    out.push_str(style.kind.end_tag());
                }
                style.relative_indent
            }
            None => 0,
        }
    }
}
