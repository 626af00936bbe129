//! Output rows and decade buckets.

use serde::{Serialize, Serializer};
use std::fmt;

/// One line of a document body, keyed by the document title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub title: String,
    pub text: String,
}

impl OutputRow {
    /// Creates a new row.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Decade partition key, displayed as the first three year digits plus `x`.
///
/// `1923` and `1929` share the bucket `192x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearBucket {
    decade: u16,
}

impl YearBucket {
    /// Returns the bucket holding `year`.
    pub fn from_year(year: u16) -> Self {
        Self { decade: year / 10 }
    }

    /// Parses a key such as `192x`.
    pub fn parse(key: &str) -> Option<Self> {
        let digits = key.strip_suffix('x')?;
        if digits.len() != 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok().map(|decade| Self { decade })
    }

    /// First year of the decade.
    pub fn first_year(&self) -> u16 {
        self.decade * 10
    }

    /// Returns whether `year` falls into this bucket.
    pub fn contains(&self, year: u16) -> bool {
        year / 10 == self.decade
    }

    /// File name of this bucket's output, e.g. `aozorabunko_192x.parquet`.
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}{}.parquet", prefix, self)
    }
}

impl fmt::Display for YearBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}x", self.decade)
    }
}

impl Serialize for YearBucket {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
