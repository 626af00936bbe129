//! Parquet sink: one `aozorabunko_<bucket>.parquet` file per decade.

use super::{BucketOutput, RowSink};
use crate::error::{Error, Result};
use crate::model::{OutputRow, YearBucket};
use log::{debug, info};
use parquet::basic::Compression;
use parquet::data_type::{ByteArray, ByteArrayType};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Schema shared by every bucket file.
pub const SCHEMA: &str = "
message aozorabunko {
    REQUIRED BYTE_ARRAY title (UTF8);
    REQUIRED BYTE_ARRAY text (UTF8);
}
";

/// Rows buffered per bucket before a row group is written.
pub const DEFAULT_ROW_GROUP_SIZE: usize = 64 * 1024;

/// Writes each bucket to its own Parquet file in an output directory.
///
/// Files are created on the first rows of their bucket and stay open for
/// the whole run. Rows are buffered and written in row groups of
/// `row_group_size` rows; [`RowSink::finish`] writes the remainder and the
/// file footers.
///
/// Until `finish` a bucket is written to `<name>.parquet.tmp` and only
/// renamed to its final name once its footer is written, so the dataset
/// glob never sees a file without a footer. [`RowSink::abort`] removes the
/// temporary files.
pub struct ParquetSink {
    dir: PathBuf,
    prefix: String,
    row_group_size: usize,
    writers: BTreeMap<YearBucket, BucketWriter>,
}

impl ParquetSink {
    /// Creates a sink writing into `dir`, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            writers: BTreeMap::new(),
        })
    }

    /// Sets the number of rows per row group (at least 1).
    pub fn with_row_group_size(mut self, rows: usize) -> Self {
        self.row_group_size = rows.max(1);
        self
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a bucket's file.
    pub fn path_for(&self, bucket: YearBucket) -> PathBuf {
        self.dir.join(bucket.file_name(&self.prefix))
    }
}

impl RowSink for ParquetSink {
    fn write_rows(&mut self, bucket: YearBucket, rows: Vec<OutputRow>) -> Result<()> {
        if !self.writers.contains_key(&bucket) {
            let path = self.path_for(bucket);
            debug!("opening bucket file {}", path.display());
            self.writers.insert(bucket, BucketWriter::create(path)?);
        }

        let writer = self
            .writers
            .get_mut(&bucket)
            .ok_or_else(|| Error::Parquet(format!("no writer for bucket {}", bucket)))?;

        writer.pending.extend(rows);
        if writer.pending.len() >= self.row_group_size {
            writer.flush()?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<Vec<BucketOutput>> {
        let mut outputs = Vec::with_capacity(self.writers.len());

        for (bucket, writer) in std::mem::take(&mut self.writers) {
            let (path, rows) = writer.close()?;
            info!("wrote {} rows to {}", rows, path.display());
            outputs.push(BucketOutput {
                bucket,
                rows,
                path: Some(path),
            });
        }

        Ok(outputs)
    }

    fn abort(&mut self) -> Result<()> {
        let mut result = Ok(());

        for (bucket, writer) in std::mem::take(&mut self.writers) {
            debug!("discarding partial output of bucket {}", bucket);
            if let Err(e) = writer.discard() {
                result = result.and(Err(e));
            }
        }

        result
    }
}

/// An open bucket file and its pending rows.
struct BucketWriter {
    path: PathBuf,
    tmp_path: PathBuf,
    writer: SerializedFileWriter<File>,
    pending: Vec<OutputRow>,
    rows_written: usize,
}

impl BucketWriter {
    fn create(path: PathBuf) -> Result<Self> {
        let schema = Arc::new(parse_message_type(SCHEMA)?);
        let props = Arc::new(
            WriterProperties::builder()
                .set_compression(Compression::SNAPPY)
                .build(),
        );
        let tmp_path = path.with_extension("parquet.tmp");
        let file = File::create(&tmp_path)?;
        let writer = SerializedFileWriter::new(file, schema, props)?;

        Ok(Self {
            path,
            tmp_path,
            writer,
            pending: Vec::new(),
            rows_written: 0,
        })
    }

    /// Writes pending rows as one row group.
    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let titles: Vec<ByteArray> = self
            .pending
            .iter()
            .map(|row| ByteArray::from(row.title.as_str()))
            .collect();
        let texts: Vec<ByteArray> = self
            .pending
            .iter()
            .map(|row| ByteArray::from(row.text.as_str()))
            .collect();

        let mut row_group = self.writer.next_row_group()?;
        for values in [titles, texts] {
            let mut column = row_group
                .next_column()?
                .ok_or_else(|| Error::Parquet("schema has fewer than two columns".into()))?;
            column
                .typed::<ByteArrayType>()
                .write_batch(&values, None, None)?;
            column.close()?;
        }
        row_group.close()?;

        self.rows_written += self.pending.len();
        self.pending.clear();
        Ok(())
    }

    /// Flushes remaining rows, writes the footer and moves the file to its
    /// final name.
    fn close(mut self) -> Result<(PathBuf, usize)> {
        self.flush()?;
        self.writer.close()?;
        std::fs::rename(&self.tmp_path, &self.path)?;
        Ok((self.path, self.rows_written))
    }

    /// Drops pending rows and removes the temporary file.
    fn discard(self) -> Result<()> {
        drop(self.writer);
        std::fs::remove_file(&self.tmp_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;

    fn rows(title: &str, texts: &[&str]) -> Vec<OutputRow> {
        texts.iter().map(|t| OutputRow::new(title, *t)).collect()
    }

    #[test]
    fn test_writes_one_file_per_bucket() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ParquetSink::new(dir.path(), "aozorabunko_").unwrap();

        sink.write_rows(YearBucket::from_year(1923), rows("羅生門", &["一行目。", "二行目。"]))
            .unwrap();
        sink.write_rows(YearBucket::from_year(1987), rows("別の話", &["本文。"]))
            .unwrap();
        let outputs = sink.finish().unwrap();

        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].bucket.to_string(), "192x");
        assert_eq!(outputs[0].rows, 2);
        assert!(dir.path().join("aozorabunko_192x.parquet").exists());
        assert!(dir.path().join("aozorabunko_198x.parquet").exists());
    }

    #[test]
    fn test_bucket_accumulates_across_documents() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ParquetSink::new(dir.path(), "aozorabunko_")
            .unwrap()
            .with_row_group_size(2);
        let bucket = YearBucket::from_year(1921);

        sink.write_rows(bucket, rows("一", &["a", "b", "c"])).unwrap();
        sink.write_rows(bucket, rows("二", &["d"])).unwrap();
        sink.write_rows(YearBucket::from_year(1929), rows("三", &["e", ""]))
            .unwrap();
        sink.finish().unwrap();

        let read = Dataset::read_file(dir.path().join("aozorabunko_192x.parquet")).unwrap();
        let texts: Vec<&str> = read.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "b", "c", "d", "e", ""]);
        assert_eq!(read[3].title, "二");
        assert_eq!(read[4].title, "三");
    }

    #[test]
    fn test_bucket_file_appears_on_finish() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ParquetSink::new(dir.path(), "aozorabunko_").unwrap();
        let bucket = YearBucket::from_year(1923);

        sink.write_rows(bucket, rows("一", &["a"])).unwrap();
        assert!(!dir.path().join("aozorabunko_192x.parquet").exists());
        assert!(dir.path().join("aozorabunko_192x.parquet.tmp").exists());

        sink.finish().unwrap();
        assert!(dir.path().join("aozorabunko_192x.parquet").exists());
        assert!(!dir.path().join("aozorabunko_192x.parquet.tmp").exists());
    }

    #[test]
    fn test_abort_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ParquetSink::new(dir.path(), "aozorabunko_")
            .unwrap()
            .with_row_group_size(1);

        sink.write_rows(YearBucket::from_year(1923), rows("一", &["a", "b"]))
            .unwrap();
        sink.write_rows(YearBucket::from_year(1951), rows("二", &["c"]))
            .unwrap();
        sink.abort().unwrap();

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert!(Dataset::discover(dir.path()).unwrap().files().is_empty());
        assert!(sink.finish().unwrap().is_empty());
    }

    #[test]
    fn test_finish_without_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = ParquetSink::new(dir.path().join("out"), "aozorabunko_").unwrap();
        assert!(sink.finish().unwrap().is_empty());
        assert!(dir.path().join("out").is_dir());
    }
}
