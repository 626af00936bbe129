//! Error types for the aozorabunko library.

use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for aozorabunko operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the aozorabunko library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The ZIP archive or one of its entries could not be read.
    #[error("ZIP archive error: {0}")]
    Archive(String),

    /// The document could not be split into title, body and colophon.
    #[error("Invalid format: {0}")]
    Format(String),

    /// The publication year is missing or out of range.
    #[error("Invalid year: {0}")]
    InvalidYear(InvalidYear),

    /// The source directory does not exist.
    #[error("Source directory '{}' does not exist", .0.display())]
    SourceNotFound(PathBuf),

    /// Bad glob pattern or unreadable path while discovering files.
    #[error("Glob error: {0}")]
    Glob(String),

    /// Parquet writing or reading error.
    #[error("Parquet error: {0}")]
    Parquet(String),
}

/// Why a document's publication year was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidYear {
    /// No date pattern matched in the colophon.
    #[error("no publication year found in colophon")]
    Missing,

    /// The year is not strictly below the configured limit.
    #[error("{year} is not before {limit}")]
    OutOfRange { year: u16, limit: u16 },
}

/// Flat classification of [`Error`], used for run diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Io,
    Archive,
    Format,
    InvalidYear,
    Source,
    Output,
}

impl Error {
    /// Returns the diagnostic category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io(_) => ErrorKind::Io,
            Error::Archive(_) => ErrorKind::Archive,
            Error::Format(_) => ErrorKind::Format,
            Error::InvalidYear(_) => ErrorKind::InvalidYear,
            Error::SourceNotFound(_) | Error::Glob(_) => ErrorKind::Source,
            Error::Parquet(_) => ErrorKind::Output,
        }
    }
}

impl From<InvalidYear> for Error {
    fn from(err: InvalidYear) -> Self {
        Error::InvalidYear(err)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Archive(err.to_string())
    }
}

impl From<parquet::errors::ParquetError> for Error {
    fn from(err: parquet::errors::ParquetError) -> Self {
        Error::Parquet(err.to_string())
    }
}

impl From<glob::PatternError> for Error {
    fn from(err: glob::PatternError) -> Self {
        Error::Glob(err.to_string())
    }
}

impl From<glob::GlobError> for Error {
    fn from(err: glob::GlobError) -> Self {
        Error::Glob(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_year_display() {
        let err: Error = InvalidYear::OutOfRange {
            year: 2031,
            limit: 2030,
        }
        .into();
        assert_eq!(err.to_string(), "Invalid year: 2031 is not before 2030");
        assert_eq!(err.kind(), ErrorKind::InvalidYear);

        let missing: Error = InvalidYear::Missing.into();
        assert!(missing.to_string().contains("no publication year"));
    }

    #[test]
    fn test_source_not_found_display() {
        let err = Error::SourceNotFound(PathBuf::from("cards"));
        assert_eq!(err.to_string(), "Source directory 'cards' does not exist");
        assert_eq!(err.kind(), ErrorKind::Source);
    }
}
