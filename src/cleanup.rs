//! # Noise Stripper
//!
//! The last pass over a cleaned document body. Aozora Bunko texts are typed
//! by hand, so whitespace conventions vary wildly between files, and markup
//! removal upstream leaves residue behind.
//!
//! ## Stages
//!
//! 1. **Tabs** - any run of `\t` becomes a single space
//! 2. **Wide spaces** - any run of U+3000 / U+00A0 becomes a single space
//! 3. **Stray tokens** - lines holding one bare run of word characters are dropped
//! 4. **Blank lines** - lines made only of spaces are dropped
//!
//! Stages 1 and 2 must run before stage 4, otherwise whitespace-only lines
//! are not recognized as blank.

use regex::Regex;
use std::sync::LazyLock;

static RE_TABS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\t+").unwrap());

static RE_WIDE_SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{3000}\x{00A0}]+").unwrap());

/// Runs all four stages in order.
///
/// The result is a fixed point: `strip_noise(&strip_noise(x)) == strip_noise(x)`.
///
/// # Example
///
/// ```
/// use aozorabunko::cleanup::strip_noise;
///
/// let text = "\t吾輩は猫である。\nABC\n\u{3000}\u{3000}\n名前はまだ無い。\n";
/// assert_eq!(strip_noise(text), " 吾輩は猫である。\n名前はまだ無い。\n");
/// ```
pub fn strip_noise(input: &str) -> String {
    let result = collapse_tabs(input);
    let result = collapse_wide_spaces(&result);
    let result = remove_stray_tokens(&result);
    remove_blank_lines(&result)
}

// ============================================================================
// Stages 1-2: Whitespace collapsing
// ============================================================================

/// Stage 1: collapses tab runs into one space.
pub fn collapse_tabs(input: &str) -> String {
    RE_TABS.replace_all(input, " ").into_owned()
}

/// Stage 2: collapses ideographic and no-break space runs into one space.
pub fn collapse_wide_spaces(input: &str) -> String {
    RE_WIDE_SPACES.replace_all(input, " ").into_owned()
}

// ============================================================================
// Stages 3-4: Line removal
// ============================================================================

/// Stage 3: removes lines consisting of a single run of word characters.
///
/// These are control tokens left over after annotation removal, e.g. a
/// line that only held `［＃改ページ］` next to a page label.
pub fn remove_stray_tokens(input: &str) -> String {
    remove_lines(input, is_stray_token)
}

/// Stage 4: removes lines made only of spaces (including empty lines).
pub fn remove_blank_lines(input: &str) -> String {
    remove_lines(input, |line| line.chars().all(|c| c == ' '))
}

fn is_stray_token(line: &str) -> bool {
    let token = line.trim();
    !token.is_empty() && token.chars().all(is_word_char)
}

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Drops every line for which `should_remove` holds, keeping line breaks of
/// the surviving lines intact.
pub(crate) fn remove_lines(input: &str, mut should_remove: impl FnMut(&str) -> bool) -> String {
    let mut result = String::with_capacity(input.len());

    for line in input.split_inclusive('\n') {
        let content = line.strip_suffix('\n').unwrap_or(line);
        if !should_remove(content) {
            result.push_str(line);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_tab_runs() {
        assert_eq!(collapse_tabs("a\t\t\tb\tc"), "a b c");
    }

    #[test]
    fn test_wide_space_runs() {
        assert_eq!(collapse_wide_spaces("a\u{3000}\u{3000}b\u{00A0}c"), "a b c");
        assert_eq!(collapse_wide_spaces("\u{3000}\u{00A0}\u{3000}x"), " x");
        // ASCII space runs are left alone
        assert_eq!(collapse_wide_spaces("a  b"), "a  b");
    }

    #[test]
    fn test_stray_token_lines() {
        let input = "本文です。\n  abc_12  \n一行\nこれは、文。\n";
        assert_eq!(remove_stray_tokens(input), "本文です。\nこれは、文。\n");
    }

    #[test]
    fn test_stray_token_keeps_multi_token_lines() {
        let input = "two words\nひとつ\n";
        assert_eq!(remove_stray_tokens(input), "two words\n");
    }

    #[test]
    fn test_blank_lines() {
        let input = "a\n\n   \nb\n \n";
        assert_eq!(remove_blank_lines(input), "a\nb\n");
    }

    #[test]
    fn test_blank_line_without_trailing_newline() {
        assert_eq!(remove_blank_lines("a\n  "), "a\n");
    }

    #[test]
    fn test_order_whitespace_lines_become_blank() {
        // Tab-only and ideographic-space-only lines vanish after collapsing
        let input = "一、\n\t\t\n\u{3000}\n二、\n";
        assert_eq!(strip_noise(input), "一、\n二、\n");
    }

    #[test]
    fn test_full_pipeline() {
        let input = "\u{3000}「おい、君」\n\tPAGE1\t\n\n\u{3000}\u{3000}と彼は言った。\n";
        assert_eq!(strip_noise(input), " 「おい、君」\n と彼は言った。\n");
    }

    #[test]
    fn test_idempotent_on_samples() {
        let samples = [
            "",
            "\n\n\n",
            "\t\u{3000}\u{00A0} \n",
            "abc\n def \n\t\tghi。\n",
            "行1、\n\u{3000}\n_\n x y \n",
            "no newline at end",
        ];
        for sample in samples {
            let once = strip_noise(sample);
            assert_eq!(strip_noise(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_idempotent_random() {
        const ALPHABET: &[char] = &[
            'a', 'Z', '7', '_', 'あ', '漢', '、', '。', ' ', '\t', '\u{3000}', '\u{00A0}', '\n',
            '\n', '「', '\r',
        ];
        let mut rng = rand::thread_rng();

        for _ in 0..500 {
            let len = rng.gen_range(0..48);
            let sample: String = (0..len)
                .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
                .collect();
            let once = strip_noise(&sample);
            assert_eq!(strip_noise(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
