//! # aozorabunko
//!
//! Builds a sentence-level text dataset from the Aozora Bunko collection of
//! public-domain Japanese literature.
//!
//! Each zipped card is opened, its Shift_JIS text entries decoded, and every
//! document split into title, publication year and body. The body is cleaned
//! of ruby readings, editorial annotations and whitespace noise, then emitted
//! line by line into one Parquet file per publication decade.
//!
//! ## Quick Start
//!
//! ```no_run
//! use aozorabunko::{ConvertOptions, Converter};
//!
//! fn main() -> aozorabunko::Result<()> {
//!     let options = ConvertOptions::new("../aozorabunko/cards/", "data/");
//!     let report = Converter::new(options).convert()?;
//!
//!     println!("{} rows in {} files", report.rows, report.outputs.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Output
//!
//! `data/aozorabunko_192x.parquet`, `data/aozorabunko_193x.parquet`, ...
//! each with two UTF-8 columns, `title` and `text`. Use [`Dataset`] to read
//! them back.

pub mod archive;
pub mod cleanup;
pub mod dataset;
pub mod detect;
pub mod emit;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parse_options;
pub mod parser;
pub mod pipeline;
pub mod sink;

// Re-exports
pub use archive::{decode_shift_jis, find_archives, AozoraArchive};
pub use cleanup::strip_noise;
pub use dataset::{Dataset, DEFAULT_PREFIX};
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use emit::{bucket_of, emit, BucketedRows};
pub use error::{Error, ErrorKind, InvalidYear, Result};
pub use model::{ColophonBoundary, OutputRow, ParsedDocument, PublicationDate, YearBucket};
pub use normalize::normalize;
pub use parse_options::{ErrorMode, ParseOptions};
pub use parser::{parse, parse_with_options};
pub use pipeline::{ConvertOptions, Converter, Diagnostic, RunContext, RunReport};
pub use sink::{BucketOutput, MemorySink, ParquetSink, RowSink};

use std::path::Path;

/// Parses a Shift_JIS encoded document.
pub fn parse_bytes(data: &[u8]) -> Result<ParsedDocument> {
    parse(&decode_shift_jis(data))
}

/// Parses every document in a file.
///
/// A ZIP archive yields one result per text entry; any other file is read
/// as a single Shift_JIS document named after the file.
///
/// # Example
///
/// ```no_run
/// use aozorabunko::parse_file;
///
/// for (entry, result) in parse_file("cards/000879/files/127_ruby_150.zip")? {
///     match result {
///         Ok(doc) => println!("{}: {} ({})", entry, doc.title, doc.year),
///         Err(e) => eprintln!("{}: {}", entry, e),
///     }
/// }
/// # Ok::<(), aozorabunko::Error>(())
/// ```
pub fn parse_file(path: impl AsRef<Path>) -> Result<Vec<(String, Result<ParsedDocument>)>> {
    let path = path.as_ref();

    match detect_format_from_path(path)? {
        FormatType::Zip => {
            let mut archive = AozoraArchive::open(path)?;
            Ok(pipeline::parse_archive(&mut archive, &ParseOptions::default()))
        }
        FormatType::Text => {
            let data = std::fs::read(path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(vec![(name, parse_bytes(&data))])
        }
    }
}

/// Converts every archive below `src` into bucket files in `dst` with
/// default options.
///
/// # Example
///
/// ```no_run
/// let report = aozorabunko::convert("../aozorabunko/cards/", "data/")?;
/// println!("{} documents skipped", report.skipped);
/// # Ok::<(), aozorabunko::Error>(())
/// ```
pub fn convert(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<RunReport> {
    let options = ConvertOptions::new(src.as_ref(), dst.as_ref());
    Converter::new(options).convert()
}
