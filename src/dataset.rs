//! Reading a built dataset back.
//!
//! Output files are discovered by glob pattern and exposed as one
//! two-column table, the same contract a dataset loader consumes.

use crate::error::{Error, Result};
use crate::model::{OutputRow, YearBucket};
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::record::RowAccessor;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Default output file prefix.
pub const DEFAULT_PREFIX: &str = "aozorabunko_";

/// The set of bucket files making up a dataset.
#[derive(Debug, Clone)]
pub struct Dataset {
    files: Vec<PathBuf>,
}

impl Dataset {
    /// Discovers `aozorabunko_*.parquet` files in `dir`.
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self> {
        Self::discover_with_prefix(dir, DEFAULT_PREFIX)
    }

    /// Discovers `<prefix>*.parquet` files in `dir`, sorted by name.
    pub fn discover_with_prefix(dir: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(Error::SourceNotFound(dir.to_path_buf()));
        }

        let pattern = dir.join(format!("{}*.parquet", glob::Pattern::escape(prefix)));
        let pattern = pattern
            .to_str()
            .ok_or_else(|| Error::Glob(format!("non UTF-8 path: {}", dir.display())))?;

        let mut files = glob::glob(pattern)?.collect::<std::result::Result<Vec<_>, _>>()?;
        files.sort();
        Ok(Self { files })
    }

    /// Files in the dataset.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Bucket of a file, recovered from its name.
    pub fn bucket_of(path: &Path, prefix: &str) -> Option<YearBucket> {
        let stem = path.file_stem()?.to_str()?;
        YearBucket::parse(stem.strip_prefix(prefix)?)
    }

    /// Reads every row of one file.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<OutputRow>> {
        let reader = SerializedFileReader::new(File::open(path)?)?;
        let mut rows = Vec::new();

        for row in reader.get_row_iter(None)? {
            let row = row?;
            rows.push(OutputRow::new(
                row.get_string(0)?.as_str(),
                row.get_string(1)?.as_str(),
            ));
        }

        Ok(rows)
    }

    /// Number of rows in one file, read from its footer.
    pub fn file_row_count(path: impl AsRef<Path>) -> Result<usize> {
        let reader = SerializedFileReader::new(File::open(path)?)?;
        let rows = reader.metadata().file_metadata().num_rows();
        Ok(usize::try_from(rows).unwrap_or(0))
    }

    /// Total number of rows across files.
    pub fn row_count(&self) -> Result<usize> {
        self.files.iter().map(Self::file_row_count).sum()
    }

    /// Iterates over all rows, file by file.
    pub fn rows(&self) -> impl Iterator<Item = Result<OutputRow>> + '_ {
        self.files.iter().flat_map(|path| match Self::read_file(path) {
            Ok(rows) => rows.into_iter().map(Ok).collect::<Vec<_>>(),
            Err(e) => vec![Err(e)],
        })
    }
}
