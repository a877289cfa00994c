use pretty_assertions::assert_eq;
use richtext::{
    html_color, html_to_rich_text, serialize, CharacterStyle, Media, MediaFactory, MediaFormat,
    NoMedia, NoMediaFactory, Options, ParagraphStyle, RichText,
};
use rstest::rstest;

#[derive(Debug, Clone, PartialEq)]
struct FileMedia {
    path: String,
    exists: bool,
}

impl Media for FileMedia {
    fn exists(&self) -> bool {
        self.exists
    }

    fn file_path(&self, _format: MediaFormat) -> String {
        self.path.clone()
    }

    fn is_directory(&self, _format: MediaFormat) -> bool {
        false
    }
}

/// Resolves every source; sources starting with `missing` don't exist
struct FileFactory;

impl MediaFactory for FileFactory {
    type Media = FileMedia;

    fn create_image(&self, src: &str) -> Option<FileMedia> {
        Some(FileMedia {
            path: src.to_string(),
            exists: !src.starts_with("missing"),
        })
    }
}

fn parse(html: &str) -> RichText<NoMedia> {
    html_to_rich_text(html, &NoMediaFactory, &Options::default())
}

fn write(text: &RichText<NoMedia>) -> String {
    serialize(text, &Options::default()).html
}

/// Text plus runs in a stable order; close tags of nested elements resolve
/// innermost first, so insertion order may differ between equal documents
fn canonical(text: &RichText<NoMedia>) -> (String, Vec<String>) {
    let mut runs: Vec<String> = text.runs().iter().map(|run| format!("{run:?}")).collect();
    runs.sort();
    (text.text().to_string(), runs)
}

#[rstest]
#[case::plain("plain text")]
#[case::inline(
    "<b>bold</b> <i>italic</i> <u>under</u> <strike>strike</strike> \
     <sup>sup</sup> <sub>sub</sub> <tt>mono</tt>"
)]
#[case::aliases("<strong>a</strong> <em>b</em> <del>c</del> <big>d</big> <small>e</small>")]
#[case::link("<a href=\"http://example.com/?a=1&amp;b=2\">link</a>")]
#[case::font_face("<font face=\"Droid Sans\">face</font>")]
#[case::font_size("<font style=\"font-size:20px\">size</font>")]
#[case::font_color("<font style=\"color:#ff0000\">red</font>")]
#[case::font_background("<font style=\"background-color:#00ff00\">green</font>")]
#[case::font_all("<font face=\"Arial\" style=\"font-size:18px;color:#0000ff;background-color:yellow\">all</font>")]
#[case::overlap("<b>ab<i>cd</i></b><i>ef</i>")]
#[case::bullets("<ul><li>one</li><li>two</li></ul>")]
#[case::numbers("<ol><li>one</li><li>two</li></ol>")]
#[case::nested_two("<ul><li>a</li><ul><li>b</li></ul><li>c</li></ul>")]
#[case::nested_three("<ul><li>a</li><ul><li>b</li><ul><li>c</li></ul></ul></ul>")]
#[case::nested_in_item("<ul><li>a<ol><li>b</li></ol></li><li>c</li></ul>")]
#[case::list_after_text("intro<ul><li>one</li></ul>")]
#[case::mixed_types("<ul><li>a</li></ul><ol><li>b</li></ol>")]
#[case::indentation(
    "<ul style=\"list-style-type:none;\"><li style=\"list-style-type:none;\">indented</li></ul>"
)]
#[case::alignment("<div align=\"center\">centered</div><div align=\"right\">right</div>")]
#[case::aligned_item("<ul><li><div align=\"right\">item</div></li></ul>")]
#[case::heading("<h1>Title</h1><p>Body</p>")]
#[case::headings("<h2>A</h2><h3>B</h3><p>text with <b>bold</b></p>")]
#[case::paragraphs("<p>one</p><p>two</p>")]
#[case::line_breaks("a<br>b<br><br>c")]
#[case::escaping("a &lt; b &amp;&amp; c &gt; d")]
fn round_trip_is_stable(#[case] html: &str) {
    let first = parse(html);
    let written = write(&first);
    let second = parse(&written);
    assert_eq!(canonical(&first), canonical(&second), "written as {written:?}");
}

#[test]
fn round_trip_keeps_images() {
    let options = Options::default();
    let first = html_to_rich_text("a<img src=\"pic.png\">b", &FileFactory, &options);
    let written = serialize(&first, &options);
    assert_eq!(written.html, "a<img src=\"pic.png\">b");
    assert_eq!(written.media.len(), 1);

    let second = html_to_rich_text(&written.html, &FileFactory, &options);
    assert_eq!(first, second);
}

#[test]
fn list_after_text_starts_its_own_paragraph() {
    let text = parse("intro<ul><li>one</li></ul>");
    assert_eq!(text.text(), "intro\none");
    assert_eq!(
        text.runs().iter().map(|run| (run.start, run.end)).collect::<Vec<_>>(),
        vec![(6, 9)]
    );
    assert_eq!(write(&text), "intro<br/>\n<ul><li>one</li></ul>");
}

#[test]
fn blank_line_inside_list_item_survives() {
    let first = parse("<ul><li><p>a</p><p>b</p></li></ul>");
    assert_eq!(first.text(), "a\n\nb");

    let written = write(&first);
    assert_eq!(written, "<ul><li>a</li><li><br/>\n</li><li>b</li></ul>");

    let second = parse(&written);
    assert_eq!(second.text(), first.text());
    for paragraph in second.paragraphs() {
        assert!(
            second
                .paragraph_runs(paragraph.start, paragraph.end)
                .any(|(_, _, style)| *style == ParagraphStyle::Bullet),
            "{paragraph:?} lost its bullet"
        );
    }
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(6)]
fn blank_lines_in_text_never_stack_up(#[case] blank_lines: usize) {
    let source = format!("a{}b", "\n".repeat(blank_lines));
    let text = parse(&source);
    assert!(!text.text().contains("\n\n\n"), "{:?}", text.text());

    let source = format!("<p>a</p>{}<p>b</p>", "<p></p>\n".repeat(blank_lines));
    let text = parse(&source);
    assert_eq!(text.text(), "a\n\nb");
}

#[test]
fn list_nesting_is_minimal() {
    let text: RichText<NoMedia> = RichText::new("a\nb\nc")
        .with_run(ParagraphStyle::Bullet, 0, 2)
        .unwrap()
        .with_run(ParagraphStyle::Bullet, 2, 4)
        .unwrap()
        .with_run(ParagraphStyle::Indentation(1), 2, 4)
        .unwrap()
        .with_run(ParagraphStyle::Bullet, 4, 5)
        .unwrap();

    let html = write(&text);
    assert_eq!(html, "<ul><li>a</li><ul><li>b</li></ul><li>c</li></ul>");
    assert_eq!(html.matches("<ul>").count(), 2);
    assert_eq!(html.matches("</ul>").count(), 2);
}

#[rstest]
#[case("<ul><li>a</li><ul><li>b</li><ul><li>c</li></ul></ul><li>d</li></ul>")]
#[case("<ol><li>a<ul><li>b</li></ul></li></ol><ul><li>c</li></ul>")]
#[case("<ul><li>a</li><ul><ul><li>deep</li></ul></ul></ul>")]
fn list_tags_are_balanced(#[case] html: &str) {
    let written = write(&parse(html));
    for tag in ["ul", "ol"] {
        let opens = written.matches(&format!("<{tag}")).count();
        let closes = written.matches(&format!("</{tag}>")).count();
        assert_eq!(opens, closes, "{tag} in {written:?}");
    }
}

#[test]
fn empty_marks_produce_no_runs() {
    let text = parse("a<b></b>b<font style=\"color:#ff0000\"></font><a href=\"x\"></a>");
    assert_eq!(text.text(), "ab");
    assert!(text.runs().is_empty());
}

#[test]
fn overlapping_styles_are_deterministic() {
    let bold_first: RichText<NoMedia> = RichText::new("abcdefg")
        .with_run(CharacterStyle::Bold, 0, 5)
        .unwrap()
        .with_run(CharacterStyle::Italic, 2, 7)
        .unwrap();
    let italic_first: RichText<NoMedia> = RichText::new("abcdefg")
        .with_run(CharacterStyle::Italic, 2, 7)
        .unwrap()
        .with_run(CharacterStyle::Bold, 0, 5)
        .unwrap();

    let expected = write(&bold_first);
    for _ in 0..10 {
        assert_eq!(write(&bold_first), expected);
    }
    assert_eq!(write(&italic_first), expected);
}

#[test]
fn colors_parse_and_bad_colors_are_omitted() {
    assert_eq!(html_color("red"), Some(0xFF0000));
    assert_eq!(html_color("#FF0000"), html_color("red"));
    assert_eq!(html_color("not-a-color"), None);

    let text = parse("<font style=\"color:not-a-color\">x</font>");
    assert_eq!(write(&text), "x");

    let text = parse("<font style=\"color:red\">x</font>");
    assert_eq!(write(&text), "<font style=\"color:#ff0000\">x</font>");
}

#[test]
fn missing_media_is_dropped() {
    let options = Options::default();
    let text = html_to_rich_text("a<img src=\"missing.png\">b", &FileFactory, &options);
    assert_eq!(text.text(), "ab");
    assert!(text.runs().is_empty());

    let html = serialize(&text, &options);
    assert_eq!(html.html, "ab");
    assert!(html.media.is_empty());
}
