//! HTML color parsing

/// The sixteen HTML 4 color names
pub const NAMED_COLORS: &[(&str, u32)] = &[
    ("aqua", 0x00FFFF),
    ("black", 0x000000),
    ("blue", 0x0000FF),
    ("fuchsia", 0xFF00FF),
    ("green", 0x008000),
    ("grey", 0x808080),
    ("lime", 0x00FF00),
    ("maroon", 0x800000),
    ("navy", 0x000080),
    ("olive", 0x808000),
    ("purple", 0x800080),
    ("red", 0xFF0000),
    ("silver", 0xC0C0C0),
    ("teal", 0x008080),
    ("white", 0xFFFFFF),
    ("yellow", 0xFFFF00),
];

/// Convert an HTML color (named or numeric) to an RGB value.
///
/// Numeric values may be `#` or `0x` prefixed hex, `0` prefixed octal or
/// plain decimal, optionally negative. Returns `None` if the string can't be
/// interpreted.
pub fn html_color(color: &str) -> Option<u32> {
    let lower = color.trim().to_ascii_lowercase();
    if let Some((_, rgb)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
        return Some(*rgb);
    }
    // -1 doubles as the "not a color" value of the numeric form
    decode_int(&lower).filter(|value| *value != -1).map(|value| value as u32)
}

/// Decode an integer literal the way `Integer.decode` style parsers do
fn decode_int(s: &str) -> Option<i32> {
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };

    let (radix, digits) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix('#'))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    if digits.is_empty() || digits.starts_with(['-', '+']) {
        return None;
    }

    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    let value = if negative { -magnitude } else { magnitude };
    i32::try_from(value).ok()
}
