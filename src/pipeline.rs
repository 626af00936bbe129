//! Batch driver: archives in, bucketed rows out.
//!
//! # Processing
//! 1. Every `*.zip` below the source directory is opened in path order.
//! 1. Each `.txt` entry is decoded from Shift_JIS and parsed.
//! 1. The parsed body is emitted as rows and written to the sink of its
//!    decade bucket.
//! 1. Once all archives are done the sink is finished and a [`RunReport`]
//!    is returned. A run stopped by an error aborts the sink instead, so no
//!    bucket file of a failed run is left behind.
//!
//! Per-document and per-archive failures are logged with the archive path
//! and entry name, recorded in the run's diagnostics and skipped (unless
//! [`ErrorMode::Strict`] is set). Processing is sequential: one entry is
//! decoded, parsed and written before the next is read.

use crate::archive::{find_archives, AozoraArchive, TEXT_EXTENSION};
use crate::dataset::DEFAULT_PREFIX;
use crate::emit::{bucket_of, emit};
use crate::error::{Error, ErrorKind, Result};
use crate::model::{ColophonBoundary, ParsedDocument, YearBucket};
use crate::parse_options::{ErrorMode, ParseOptions};
use crate::parser::parse_with_options;
use crate::sink::{BucketOutput, ParquetSink, RowSink, DEFAULT_ROW_GROUP_SIZE};
use log::{debug, error, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

/// Default source directory (the `cards/` folder of an aozorabunko checkout).
pub const DEFAULT_SRC: &str = "../aozorabunko/cards/";

/// Default output directory.
pub const DEFAULT_DST: &str = "data/";

/// Documents between two progress log lines.
pub const DEFAULT_PROGRESS_INTERVAL: usize = 100;

/// Options for a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Directory searched recursively for `*.zip`
    pub src: PathBuf,
    /// Directory receiving the bucket files
    pub dst: PathBuf,
    /// Options passed to the document parser
    pub parse: ParseOptions,
    /// What to do when a document or archive fails
    pub error_mode: ErrorMode,
    /// Suffix of archive entries treated as documents
    pub extension: String,
    /// Output file name prefix
    pub prefix: String,
    /// Rows per Parquet row group
    pub row_group_size: usize,
    /// Documents between progress log lines (0 disables them)
    pub progress_interval: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            src: PathBuf::from(DEFAULT_SRC),
            dst: PathBuf::from(DEFAULT_DST),
            parse: ParseOptions::default(),
            error_mode: ErrorMode::default(),
            extension: TEXT_EXTENSION.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }
}

impl ConvertOptions {
    /// Creates options reading from `src` and writing to `dst`.
    pub fn new(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            ..Self::default()
        }
    }

    /// Sets the exclusive publication year limit.
    pub fn with_year_limit(mut self, limit: u16) -> Self {
        self.parse = self.parse.with_year_limit(limit);
        self
    }

    /// Aborts the run on the first failing document or archive.
    pub fn strict(mut self) -> Self {
        self.error_mode = ErrorMode::Strict;
        self
    }

    /// Sets the suffix of entries treated as documents.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Sets the output file prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Sets the number of rows per row group.
    pub fn with_row_group_size(mut self, rows: usize) -> Self {
        self.row_group_size = rows;
        self
    }

    /// Sets how often progress is logged.
    pub fn with_progress_interval(mut self, documents: usize) -> Self {
        self.progress_interval = documents;
        self
    }
}

/// One skipped document or archive.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub archive: PathBuf,
    /// Entry name inside the archive; `None` for archive-level failures
    pub entry: Option<String>,
    pub kind: ErrorKind,
    pub message: String,
}

/// Counters and diagnostics of a single run.
///
/// Owned by the batch driver and turned into a [`RunReport`] at the end.
#[derive(Debug, Default)]
pub struct RunContext {
    progress_interval: usize,
    archives: usize,
    failed_archives: usize,
    documents: usize,
    parsed: usize,
    rows: usize,
    boundaries: BTreeMap<ColophonBoundary, usize>,
    bucket_documents: BTreeMap<YearBucket, usize>,
    diagnostics: Vec<Diagnostic>,
}

impl RunContext {
    /// Creates an empty context logging progress every `progress_interval` documents.
    pub fn new(progress_interval: usize) -> Self {
        Self {
            progress_interval,
            ..Self::default()
        }
    }

    fn archive_opened(&mut self) {
        self.archives += 1;
    }

    fn archive_failed(&mut self, path: &Path, err: &Error) {
        self.archives += 1;
        self.failed_archives += 1;
        self.push_diagnostic(path, None, err);
    }

    fn document_seen(&mut self) {
        self.documents += 1;
        if self.progress_interval > 0 && self.documents % self.progress_interval == 0 {
            info!("{} documents processed.", self.documents);
        }
    }

    fn document_parsed(&mut self, document: &ParsedDocument, rows: usize) {
        self.parsed += 1;
        self.rows += rows;
        *self.boundaries.entry(document.boundary).or_default() += 1;
        *self.bucket_documents.entry(bucket_of(document)).or_default() += 1;
    }

    fn document_failed(&mut self, path: &Path, entry: &str, err: &Error) {
        self.push_diagnostic(path, Some(entry.to_string()), err);
    }

    fn push_diagnostic(&mut self, path: &Path, entry: Option<String>, err: &Error) {
        self.diagnostics.push(Diagnostic {
            archive: path.to_path_buf(),
            entry,
            kind: err.kind(),
            message: err.to_string(),
        });
    }

    /// Documents seen so far, including skipped ones.
    pub fn documents(&self) -> usize {
        self.documents
    }

    /// Diagnostics collected so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Finalizes the context into a report.
    pub fn into_report(self, outputs: Vec<BucketOutput>) -> RunReport {
        let skipped = self.documents - self.parsed;
        RunReport {
            archives: self.archives,
            failed_archives: self.failed_archives,
            documents: self.documents,
            parsed: self.parsed,
            skipped,
            rows: self.rows,
            boundaries: self.boundaries,
            bucket_documents: self.bucket_documents,
            outputs,
            diagnostics: self.diagnostics,
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub archives: usize,
    pub failed_archives: usize,
    /// Text entries seen
    pub documents: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub rows: usize,
    /// Parsed documents per colophon boundary tier
    pub boundaries: BTreeMap<ColophonBoundary, usize>,
    /// Parsed documents per decade bucket
    pub bucket_documents: BTreeMap<YearBucket, usize>,
    pub outputs: Vec<BucketOutput>,
    pub diagnostics: Vec<Diagnostic>,
}

impl RunReport {
    /// Number of diagnostics of a given kind.
    pub fn count_kind(&self, kind: ErrorKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }
}

/// Runs conversions with a fixed set of options.
///
/// # Example
///
/// ```no_run
/// use aozorabunko::{ConvertOptions, Converter};
///
/// let report = Converter::new(ConvertOptions::new("../aozorabunko/cards/", "data/")).convert()?;
/// println!("{} rows from {} documents", report.rows, report.parsed);
/// # Ok::<(), aozorabunko::Error>(())
/// ```
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    /// Creates a converter.
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Returns the options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Runs the conversion into Parquet files in the output directory.
    pub fn convert(&self) -> Result<RunReport> {
        let mut sink = ParquetSink::new(&self.options.dst, self.options.prefix.as_str())?
            .with_row_group_size(self.options.row_group_size);
        self.run(&mut sink)
    }

    /// Runs the conversion into a sink.
    ///
    /// Only a missing source directory, output failures and (in strict mode)
    /// the first document or archive failure abort the run. An aborted run
    /// calls [`RowSink::abort`] and returns the error that stopped it.
    pub fn run<S: RowSink>(&self, sink: &mut S) -> Result<RunReport> {
        let archives = find_archives(&self.options.src)?;
        info!(
            "found {} archives in {}",
            archives.len(),
            self.options.src.display()
        );

        let mut ctx = RunContext::new(self.options.progress_interval);
        let outputs = self
            .process_all(&archives, sink, &mut ctx)
            .and_then(|()| sink.finish());
        let outputs = match outputs {
            Ok(outputs) => outputs,
            Err(e) => {
                error!("run aborted: {}", e);
                if let Err(cleanup) = sink.abort() {
                    warn!("could not discard partial output: {}", cleanup);
                }
                return Err(e);
            }
        };

        let report = ctx.into_report(outputs);
        info!(
            "done: {} documents parsed, {} skipped, {} rows",
            report.parsed, report.skipped, report.rows
        );
        Ok(report)
    }

    fn process_all<S: RowSink>(
        &self,
        archives: &[PathBuf],
        sink: &mut S,
        ctx: &mut RunContext,
    ) -> Result<()> {
        for path in archives {
            self.process_archive(path, sink, ctx)?;
        }
        Ok(())
    }

    fn process_archive<S: RowSink>(
        &self,
        path: &Path,
        sink: &mut S,
        ctx: &mut RunContext,
    ) -> Result<()> {
        debug!("working on archive: {}", path.display());

        let mut archive = match AozoraArchive::open(path) {
            Ok(archive) => archive,
            Err(e) => {
                error!("bad zip file: {} -> {}", path.display(), e);
                ctx.archive_failed(path, &e);
                return self.recover(e);
            }
        };
        ctx.archive_opened();

        for entry in archive.entries_with_extension(&self.options.extension) {
            ctx.document_seen();

            match read_and_parse(&mut archive, &entry, &self.options.parse) {
                Ok(document) => {
                    let rows = emit(&document);
                    ctx.document_parsed(&document, rows.len());
                    sink.write_rows(bucket_of(&document), rows)?;
                }
                Err(e) => {
                    warn!("exception: {} {} -> {}", path.display(), entry, e);
                    ctx.document_failed(path, &entry, &e);
                    self.recover(e)?;
                }
            }
        }

        Ok(())
    }

    fn recover(&self, err: Error) -> Result<()> {
        match self.options.error_mode {
            ErrorMode::Lenient => Ok(()),
            ErrorMode::Strict => Err(err),
        }
    }
}

fn read_and_parse<R: Read + Seek>(
    archive: &mut AozoraArchive<R>,
    entry: &str,
    options: &ParseOptions,
) -> Result<ParsedDocument> {
    let raw = archive.read_text(entry)?;
    parse_with_options(&raw, options)
}

/// Parses every text entry of an archive, keeping per-entry results.
pub fn parse_archive<R: Read + Seek>(
    archive: &mut AozoraArchive<R>,
    options: &ParseOptions,
) -> Vec<(String, Result<ParsedDocument>)> {
    archive
        .text_entries()
        .into_iter()
        .map(|entry| {
            let result = read_and_parse(archive, &entry, options);
            (entry, result)
        })
        .collect()
}
