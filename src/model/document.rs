//! Parsed document and colophon metadata.

use serde::Serialize;

/// A document successfully decomposed by the parser.
///
/// Either every field is populated and the year is in range, or the parse
/// failed; there is no partially valid document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    /// First line of the raw text, verbatim
    pub title: String,
    /// Publication year taken from the colophon
    pub year: u16,
    /// Cleaned body, one sentence-ish line per row
    pub body: String,
    /// Which colophon boundary split the document
    pub boundary: ColophonBoundary,
}

impl ParsedDocument {
    /// Returns the number of lines in the body.
    pub fn line_count(&self) -> usize {
        self.body.lines().count()
    }
}

/// How the colophon was separated from the main body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColophonBoundary {
    /// Last line containing the `底本：` source-edition marker
    Marker,
    /// Last run of three line breaks
    TripleBreak,
    /// Last run of two line breaks
    DoubleBreak,
}

impl std::fmt::Display for ColophonBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColophonBoundary::Marker => write!(f, "source marker"),
            ColophonBoundary::TripleBreak => write!(f, "triple line break"),
            ColophonBoundary::DoubleBreak => write!(f, "double line break"),
        }
    }
}

/// Publication date found in a colophon.
///
/// Month and day are only known when the full `年月日` pattern matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PublicationDate {
    pub year: u16,
    pub month: Option<u8>,
    pub day: Option<u8>,
}

impl PublicationDate {
    /// Creates a date with only the year known.
    pub fn year_only(year: u16) -> Self {
        Self {
            year,
            month: None,
            day: None,
        }
    }

    /// Creates a full year/month/day date.
    pub fn ymd(year: u16, month: u8, day: u8) -> Self {
        Self {
            year,
            month: Some(month),
            day: Some(day),
        }
    }
}

impl std::fmt::Display for PublicationDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.month, self.day) {
            (Some(month), Some(day)) => write!(f, "{:04}/{}/{}", self.year, month, day),
            _ => write!(f, "{:04}", self.year),
        }
    }
}
