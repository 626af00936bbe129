//! Output sinks receiving bucketed rows from the batch driver.
//!
//! A run writes every document's rows into the sink of its decade bucket.
//! Sinks accumulate across the whole run; nothing written earlier in a run
//! is replaced by a later document of the same decade.

mod parquet;

pub use self::parquet::{ParquetSink, DEFAULT_ROW_GROUP_SIZE, SCHEMA};

use crate::emit::BucketedRows;
use crate::error::Result;
use crate::model::{OutputRow, YearBucket};
use serde::Serialize;
use std::path::PathBuf;

/// Destination for output rows, partitioned by decade bucket.
pub trait RowSink {
    /// Appends rows to a bucket's destination, creating it on first use.
    fn write_rows(&mut self, bucket: YearBucket, rows: Vec<OutputRow>) -> Result<()>;

    /// Flushes and closes every destination.
    ///
    /// Must be called once all rows are written.
    fn finish(&mut self) -> Result<Vec<BucketOutput>>;

    /// Discards everything written so far. Called instead of
    /// [`RowSink::finish`] when a run fails.
    fn abort(&mut self) -> Result<()> {
        Ok(())
    }
}

/// What a sink produced for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketOutput {
    pub bucket: YearBucket,
    pub rows: usize,
    /// File written for this bucket, if the sink writes files
    pub path: Option<PathBuf>,
}

/// Keeps all rows in memory. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: BucketedRows,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows received so far.
    pub fn rows(&self) -> &BucketedRows {
        &self.rows
    }

    /// Consumes the sink, returning the rows.
    pub fn into_rows(self) -> BucketedRows {
        self.rows
    }
}

impl RowSink for MemorySink {
    fn write_rows(&mut self, bucket: YearBucket, rows: Vec<OutputRow>) -> Result<()> {
        self.rows.extend(bucket, rows);
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<BucketOutput>> {
        Ok(self
            .rows
            .iter()
            .map(|(bucket, rows)| BucketOutput {
                bucket,
                rows: rows.len(),
                path: None,
            })
            .collect())
    }

    fn abort(&mut self) -> Result<()> {
        self.rows = BucketedRows::new();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_accumulates() {
        let mut sink = MemorySink::new();
        let bucket = YearBucket::from_year(1923);
        sink.write_rows(bucket, vec![OutputRow::new("一", "a")]).unwrap();
        sink.write_rows(bucket, vec![OutputRow::new("二", "b")]).unwrap();

        let outputs = sink.finish().unwrap();
        assert_eq!(
            outputs,
            vec![BucketOutput {
                bucket,
                rows: 2,
                path: None
            }]
        );
        assert_eq!(sink.rows().get(bucket).unwrap()[0].title, "一");
    }

    #[test]
    fn test_memory_sink_abort_discards_rows() {
        let mut sink = MemorySink::new();
        sink.write_rows(YearBucket::from_year(1923), vec![OutputRow::new("一", "a")])
            .unwrap();
        sink.abort().unwrap();
        assert!(sink.rows().is_empty());
        assert!(sink.finish().unwrap().is_empty());
    }
}
