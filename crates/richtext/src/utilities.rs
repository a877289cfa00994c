//! Text helpers shared by the HTML readers

/// Ignored-content elements: their text never reaches the output
pub const IGNORED_ELEMENTS: &[&str] = &["header", "meta", "script", "style", "title"];

/// Check if a tag's text content is dropped
pub fn is_ignored(tag: &str) -> bool {
    IGNORED_ELEMENTS.contains(&tag)
}

/// Heading level (0 for `h1`) of a heading tag
pub fn heading_level(tag: &str) -> Option<usize> {
    match tag.as_bytes() {
        [b'h', level @ b'1'..=b'6'] => Some((level - b'1') as usize),
        _ => None,
    }
}

/// Collapse spaces and newlines in a text chunk.
///
/// A run of spaces and newlines becomes a single space, and is dropped
/// entirely when the character before it (`prev`, or the end of the text
/// collected so far) is already a space or newline. Other characters,
/// including tabs, are kept as they are.
pub fn collapse_whitespace(text: &str, prev: char) -> String {
    let mut result = String::with_capacity(text.len());
    let mut prev = prev;

    for c in text.chars() {
        if c == ' ' || c == '\n' {
            if prev != ' ' && prev != '\n' {
                result.push(' ');
                prev = ' ';
            }
        } else {
            result.push(c);
            prev = c;
        }
    }

    result
}

/// Character collapsed text is appended after; the start of the document
/// counts as a newline
pub fn last_char(buffer: &str) -> char {
    buffer.chars().next_back().unwrap_or('\n')
}

/// Line breaks to append so `buffer` ends in exactly one blank line.
///
/// Nothing is appended to an empty buffer.
pub fn paragraph_break(buffer: &str) -> &'static str {
    if buffer.is_empty() || buffer.ends_with("\n\n") {
        ""
    } else if buffer.ends_with('\n') {
        "\n"
    } else {
        "\n\n"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "")]
    #[case("text", "text\n\n")]
    #[case("text\n", "text\n\n")]
    #[case("text\n\n", "text\n\n")]
    #[case("text\n\n\n", "text\n\n\n")]
    fn test_paragraph_break(#[case] buffer: &str, #[case] expected: &str) {
        let mut result = buffer.to_string();
        result.push_str(paragraph_break(buffer));
        assert_eq!(result, expected);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a  b\n\nc", 'x'), "a b c");
        assert_eq!(collapse_whitespace("  leading", 'x'), " leading");
        assert_eq!(collapse_whitespace("  leading", ' '), "leading");
        assert_eq!(collapse_whitespace("\n after break", '\n'), "after break");
        assert_eq!(collapse_whitespace("tab\there", 'x'), "tab\there");
    }

    #[test]
    fn test_last_char() {
        assert_eq!(last_char(""), '\n');
        assert_eq!(last_char("abc"), 'c');
        assert_eq!(last_char("ä"), 'ä');
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), Some(0));
        assert_eq!(heading_level("h6"), Some(5));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("hr"), None);
        assert_eq!(heading_level("header"), None);
    }

    #[test]
    fn test_is_ignored() {
        assert!(is_ignored("style"));
        assert!(is_ignored("header"));
        assert!(!is_ignored("head"));
        assert!(!is_ignored("p"));
    }
}
