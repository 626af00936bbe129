//! Full-width to half-width conversion for Latin letters and digits.
//!
//! Only the alphanumeric part of the Halfwidth and Fullwidth Forms block is
//! touched. Katakana (full-width or half-width) and full-width symbols such
//! as `＃` or `（` pass through unchanged.

/// Converts full-width ASCII letters and digits to their half-width forms.
///
/// # Example
///
/// ```
/// use aozorabunko::normalize::normalize;
///
/// assert_eq!(normalize("ＡＢＣ１２３"), "ABC123");
/// assert_eq!(normalize("カタカナ"), "カタカナ");
/// ```
pub fn normalize(input: &str) -> String {
    input.chars().map(to_halfwidth).collect()
}

/// Maps a single full-width alphanumeric to ASCII, otherwise returns it as is.
#[inline]
fn to_halfwidth(c: char) -> char {
    match c {
        // ０-９, Ａ-Ｚ, ａ-ｚ
        '\u{FF10}'..='\u{FF19}' | '\u{FF21}'..='\u{FF3A}' | '\u{FF41}'..='\u{FF5A}' => {
            char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
        }
        _ => c,
    }
}

/// Returns the value of an ASCII or full-width decimal digit.
pub(crate) fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        '\u{FF10}'..='\u{FF19}' => Some(c as u32 - 0xFF10),
        _ => None,
    }
}
