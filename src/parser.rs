//! # Aozora Bunko document parser
//!
//! Decomposes a decoded Aozora Bunko text file into title, publication year
//! and cleaned body.
//!
//! ## Layout
//!
//! ```text
//! 吾輩は猫である            <- title (first line)
//! 夏目漱石                  <- preamble, up to the first blank line
//!
//! -------------------------  <- divider block (notation legend), optional
//! 【テキスト中に現れる記号について】
//! ...
//! -------------------------
//! 本文 with ｜ruby《るび》 and ［＃annotations］
//!
//! 底本：「...」筑摩書房      <- colophon
//! 　1987（昭和62）年9月29日第1刷発行
//! ```
//!
//! The format is typed by hand and only loosely followed, so every step is
//! forgiving. The colophon boundary falls back from the `底本：` marker to
//! triple and then double line breaks. Boundary search and date extraction
//! are plain left-to-right / last-occurrence scans, linear in the input.

use crate::cleanup::{remove_lines, strip_noise};
use crate::error::{Error, InvalidYear, Result};
use crate::model::{ColophonBoundary, ParsedDocument, PublicationDate};
use crate::normalize::{digit_value, normalize};
use crate::parse_options::ParseOptions;
use regex::Regex;
use std::sync::LazyLock;

/// Source-edition marker opening the colophon.
pub const SOURCE_MARKER: &str = "底本：";

/// Minimum run of hyphens delimiting a divider block.
const DIVIDER_MIN_HYPHENS: usize = 4;

/// Characters of context quoted in format errors.
const EXCERPT_CHARS: usize = 40;

/// `｜BASE《READING》` -> `BASE`
static RE_RUBY_WITH_BASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"｜(.+?)《.*?》").unwrap());

/// Bare `《READING》`
static RE_RUBY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"《.*?》").unwrap());

/// Editorial annotation `［＃...］`, greedy up to the last `］` on the line
static RE_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"［＃.*］").unwrap());

/// Parses a decoded document with default options.
///
/// # Example
///
/// ```
/// use aozorabunko::parser::parse;
///
/// let raw = "坊っちゃん\n夏目漱石\n\n親譲りの無鉄砲で、小供の時から損ばかりしている。\n\n\
///            底本：「坊っちゃん」新潮文庫\n　1950（昭和25）年1月31日発行\n";
/// let doc = parse(raw)?;
/// assert_eq!(doc.title, "坊っちゃん");
/// assert_eq!(doc.year, 1950);
/// assert_eq!(doc.body, "親譲りの無鉄砲で、小供の時から損ばかりしている。\n");
/// # Ok::<(), aozorabunko::Error>(())
/// ```
pub fn parse(raw: &str) -> Result<ParsedDocument> {
    parse_with_options(raw, &ParseOptions::default())
}

/// Parses a decoded document.
///
/// Fails with [`Error::Format`] when no title line or colophon boundary is
/// found, and with [`Error::InvalidYear`] when the colophon has no usable
/// year or the year is not below [`ParseOptions::year_limit`].
pub fn parse_with_options(raw: &str, options: &ParseOptions) -> Result<ParsedDocument> {
    let text = normalize_line_endings(raw);
    let (title, rest) = split_title(&text)?;
    let rest = strip_preamble(rest);
    let rest = strip_divider_block(rest);

    let split = split_colophon(&rest).ok_or_else(|| {
        Error::Format(format!("no colophon boundary in \"{}\"", excerpt(&rest)))
    })?;

    let date = extract_publication_date(split.colophon).ok_or(InvalidYear::Missing)?;
    if date.year >= options.year_limit {
        return Err(InvalidYear::OutOfRange {
            year: date.year,
            limit: options.year_limit,
        }
        .into());
    }

    Ok(ParsedDocument {
        title: title.to_string(),
        year: date.year,
        body: clean_body(split.body),
        boundary: split.boundary,
    })
}

// ============================================================================
// Structure
// ============================================================================

/// Converts CRLF and lone CR line endings to LF.
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Splits the first line off as the title.
pub fn split_title(text: &str) -> Result<(&str, &str)> {
    text.split_once('\n')
        .ok_or_else(|| Error::Format(format!("no title line in \"{}\"", excerpt(text))))
}

/// Removes the bibliographic header block up to and including the first
/// blank line.
///
/// A blank line is a line break followed by a whitespace run that holds
/// another line break. The whole run up to its last line break is removed,
/// so indentation of the first body line survives. Returns the input
/// unchanged when there is no blank line.
pub fn strip_preamble(body: &str) -> &str {
    for (idx, _) in body.match_indices('\n') {
        let rest = &body[idx + 1..];
        let run_len = rest
            .find(|c: char| !c.is_whitespace())
            .unwrap_or(rest.len());

        if let Some(last_break) = rest[..run_len].rfind('\n') {
            return &rest[last_break + 1..];
        }
    }
    body
}

/// Removes the first region enclosed by two runs of at least four hyphens,
/// hyphens included.
pub fn strip_divider_block(text: &str) -> String {
    let Some((open_start, open_end)) = find_hyphen_run(text, 0) else {
        return text.to_string();
    };
    let Some((_, close_end)) = find_hyphen_run(text, open_end) else {
        return text.to_string();
    };

    let mut result = String::with_capacity(text.len() - (close_end - open_start));
    result.push_str(&text[..open_start]);
    result.push_str(&text[close_end..]);
    result
}

/// Finds the next maximal run of hyphens long enough to be a divider.
fn find_hyphen_run(text: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut pos = from;

    while pos < bytes.len() {
        if bytes[pos] != b'-' {
            pos += 1;
            continue;
        }
        let start = pos;
        while pos < bytes.len() && bytes[pos] == b'-' {
            pos += 1;
        }
        if pos - start >= DIVIDER_MIN_HYPHENS {
            return Some((start, pos));
        }
    }

    None
}

/// Main body and colophon of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColophonSplit<'a> {
    pub body: &'a str,
    pub colophon: &'a str,
    pub boundary: ColophonBoundary,
}

/// Separates the main body from the colophon.
///
/// Tries, in order, the last line holding [`SOURCE_MARKER`], the last triple
/// line break and the last double line break.
pub fn split_colophon(text: &str) -> Option<ColophonSplit<'_>> {
    if let Some((body, colophon)) = split_at_marker(text) {
        return Some(ColophonSplit {
            body,
            colophon,
            boundary: ColophonBoundary::Marker,
        });
    }

    [
        ("\n\n\n", ColophonBoundary::TripleBreak),
        ("\n\n", ColophonBoundary::DoubleBreak),
    ]
    .into_iter()
    .find_map(|(separator, boundary)| {
        text.rsplit_once(separator).map(|(body, colophon)| ColophonSplit {
            body,
            colophon,
            boundary,
        })
    })
}

/// Body ends at the line break before the marker line; colophon starts
/// right after the marker.
fn split_at_marker(text: &str) -> Option<(&str, &str)> {
    let marker = text.rfind(SOURCE_MARKER)?;
    let line_start = text[..marker].rfind('\n')?;
    Some((&text[..line_start], &text[marker + SOURCE_MARKER.len()..]))
}

// ============================================================================
// Publication date
// ============================================================================

/// Finds the publication date in a colophon.
///
/// Looks for `YYYY...年M月D日` on a single line first (the year may be
/// followed by an era annotation such as `（昭和62）`), then for `YYYY...年`.
/// In both cases the leftmost four-digit run wins. ASCII and full-width
/// digits are accepted.
pub fn extract_publication_date(colophon: &str) -> Option<PublicationDate> {
    colophon
        .split('\n')
        .find_map(find_full_date)
        .or_else(|| colophon.split('\n').find_map(find_year_only))
}

fn find_full_date(line: &str) -> Option<PublicationDate> {
    let chars: Vec<char> = line.chars().collect();
    let dates: Vec<(usize, u8, u8)> = chars
        .iter()
        .enumerate()
        .filter(|(_, &c)| c == '年')
        .filter_map(|(pos, _)| month_day_at(&chars, pos + 1).map(|(m, d)| (pos, m, d)))
        .collect();

    let (start, year) = leftmost_year(&chars, dates.last()?.0)?;
    let &(_, month, day) = dates.iter().find(|(pos, _, _)| *pos >= start + 4)?;
    Some(PublicationDate::ymd(year, month, day))
}

fn find_year_only(line: &str) -> Option<PublicationDate> {
    let chars: Vec<char> = line.chars().collect();
    let last_nen = chars.iter().rposition(|&c| c == '年')?;
    let (_, year) = leftmost_year(&chars, last_nen)?;
    Some(PublicationDate::year_only(year))
}

/// Leftmost four-digit run that ends at or before `limit`.
fn leftmost_year(chars: &[char], limit: usize) -> Option<(usize, u16)> {
    (0..=limit.checked_sub(4)?).find_map(|start| {
        chars[start..start + 4]
            .iter()
            .try_fold(0u16, |acc, &c| digit_value(c).map(|d| acc * 10 + d as u16))
            .map(|year| (start, year))
    })
}

/// Matches `M月D日` at `pos`, each number one or two digits.
fn month_day_at(chars: &[char], pos: usize) -> Option<(u8, u8)> {
    let (month, pos) = short_number(chars, pos)?;
    if chars.get(pos) != Some(&'月') {
        return None;
    }
    let (day, pos) = short_number(chars, pos + 1)?;
    (chars.get(pos) == Some(&'日')).then_some((month, day))
}

fn short_number(chars: &[char], pos: usize) -> Option<(u8, usize)> {
    let mut value = 0u8;
    let mut len = 0;

    while len < 2 {
        match chars.get(pos + len).and_then(|&c| digit_value(c)) {
            Some(digit) => {
                value = value * 10 + digit as u8;
                len += 1;
            }
            None => break,
        }
    }

    (len > 0).then_some((value, pos + len))
}

// ============================================================================
// Body cleaning
// ============================================================================

/// Cleans the main body: ruby and annotation markup, `#` escaping, empty
/// lines, full-width alphanumerics and whitespace noise.
pub fn clean_body(body: &str) -> String {
    let text = RE_RUBY_WITH_BASE.replace_all(body, "$1");
    let text = RE_RUBY.replace_all(&text, "");
    let text = RE_ANNOTATION.replace_all(&text, "");
    let text = text.replace('#', "＃");
    let text = remove_lines(&text, |line| line.trim_start().is_empty());
    let text = normalize(&text);
    strip_noise(&text)
}

fn excerpt(text: &str) -> String {
    text.chars().take(EXCERPT_CHARS).collect()
}
