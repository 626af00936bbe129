//! Record emitter: one output row per body line, grouped by decade.

use crate::model::{OutputRow, ParsedDocument, YearBucket};
use std::collections::BTreeMap;

/// Splits the body into rows paired with the title.
///
/// A single trailing empty line (the artifact of a body ending in `\n`) is
/// dropped; empty lines inside the body are kept as empty-text rows.
pub fn emit(document: &ParsedDocument) -> Vec<OutputRow> {
    let mut lines: Vec<&str> = document.body.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }

    lines
        .into_iter()
        .map(|line| OutputRow::new(document.title.as_str(), line))
        .collect()
}

/// Returns the decade bucket a document's rows belong to.
pub fn bucket_of(document: &ParsedDocument) -> YearBucket {
    YearBucket::from_year(document.year)
}

/// Rows grouped by decade bucket, in bucket order.
#[derive(Debug, Default)]
pub struct BucketedRows {
    buckets: BTreeMap<YearBucket, Vec<OutputRow>>,
}

impl BucketedRows {
    /// Creates an empty grouping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits a document and appends its rows to its bucket.
    ///
    /// Returns the bucket and the number of rows added.
    pub fn push(&mut self, document: &ParsedDocument) -> (YearBucket, usize) {
        let bucket = bucket_of(document);
        let rows = emit(document);
        let count = rows.len();
        self.extend(bucket, rows);
        (bucket, count)
    }

    /// Appends rows to a bucket, creating it on first use.
    pub fn extend(&mut self, bucket: YearBucket, rows: impl IntoIterator<Item = OutputRow>) {
        self.buckets.entry(bucket).or_default().extend(rows);
    }

    /// Rows of one bucket.
    pub fn get(&self, bucket: YearBucket) -> Option<&[OutputRow]> {
        self.buckets.get(&bucket).map(Vec::as_slice)
    }

    /// Iterates over buckets and their rows.
    pub fn iter(&self) -> impl Iterator<Item = (YearBucket, &[OutputRow])> {
        self.buckets.iter().map(|(b, rows)| (*b, rows.as_slice()))
    }

    /// Number of buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if no rows were added.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of rows across buckets.
    pub fn row_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Consumes the grouping.
    pub fn into_inner(self) -> BTreeMap<YearBucket, Vec<OutputRow>> {
        self.buckets
    }
}
