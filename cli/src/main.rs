//! aozorabunko CLI - Aozora Bunko sentence dataset builder
//!
//! Converts the zipped cards of an Aozora Bunko checkout into decade
//! partitioned Parquet files and inspects the result.

use aozorabunko::{
    parse_file, ConvertOptions, Converter, Dataset, ErrorKind, RunReport, DEFAULT_PREFIX,
};
use clap::{Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Aozora Bunko to sentence dataset conversion
#[derive(Parser)]
#[command(
    name = "aozorabunko",
    version,
    about = "Build a sentence dataset from Aozora Bunko archives",
    long_about = "aozorabunko - Aozora Bunko sentence dataset builder.\n\n\
                  Parses every zipped text under a cards directory and writes one\n\
                  Parquet file of (title, text) rows per publication decade.\n\n\
                  Usage:\n  \
                  aozorabunko                     Convert ../aozorabunko/cards/ into data/\n  \
                  aozorabunko <src> <dst>         Convert src into dst\n  \
                  aozorabunko parse <file>        Print a parsed document as JSON"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Source directory (for default conversion)
    #[arg(global = false)]
    src: Option<PathBuf>,

    /// Output directory (for default conversion)
    #[arg(global = false)]
    dst: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert every archive below SRC into bucket files in DST
    Convert {
        /// Directory searched recursively for *.zip
        #[arg(default_value = aozorabunko::pipeline::DEFAULT_SRC)]
        src: PathBuf,

        /// Output directory
        #[arg(default_value = aozorabunko::pipeline::DEFAULT_DST)]
        dst: PathBuf,

        /// Reject documents published in or after this year
        #[arg(long, default_value_t = aozorabunko::parse_options::DEFAULT_YEAR_LIMIT)]
        year_limit: u16,

        /// Output file name prefix
        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,

        /// Rows per Parquet row group
        #[arg(long, default_value_t = aozorabunko::sink::DEFAULT_ROW_GROUP_SIZE)]
        row_group_size: usize,

        /// Abort on the first failing document or archive
        #[arg(long)]
        strict: bool,

        /// Write the run report as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Parse a .txt entry or every .txt entry of a .zip and print JSON
    Parse {
        /// Input file path
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,
    },

    /// Print the first rows of a dataset
    Head {
        /// Dataset directory
        dir: PathBuf,

        /// Number of rows
        #[arg(short = 'n', long, default_value = "10")]
        rows: usize,

        /// Output file name prefix
        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,
    },

    /// Show rows per bucket file of a dataset
    Stats {
        /// Dataset directory
        dir: PathBuf,

        /// Output file name prefix
        #[arg(long, default_value = DEFAULT_PREFIX)]
        prefix: String,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let Some(command) = cli.command else {
        // Default command (aozorabunko [src] [dst])
        let options = ConvertOptions::new(
            cli.src.unwrap_or_else(|| aozorabunko::pipeline::DEFAULT_SRC.into()),
            cli.dst.unwrap_or_else(|| aozorabunko::pipeline::DEFAULT_DST.into()),
        );
        return run_convert(options, None);
    };

    match command {
        Commands::Convert {
            src,
            dst,
            year_limit,
            prefix,
            row_group_size,
            strict,
            report,
        } => {
            let mut options = ConvertOptions::new(src, dst)
                .with_year_limit(year_limit)
                .with_prefix(prefix)
                .with_row_group_size(row_group_size);
            if strict {
                options = options.strict();
            }
            run_convert(options, report.as_deref())?;
        }

        Commands::Parse {
            input,
            output,
            compact,
        } => {
            let pb = create_spinner("Parsing document...");
            let results = parse_file(&input)?;
            pb.finish_and_clear();

            let mut documents = Vec::new();
            for (entry, result) in results {
                match result {
                    Ok(doc) => documents.push(serde_json::json!({
                        "entry": entry,
                        "title": doc.title,
                        "year": doc.year,
                        "bucket": aozorabunko::bucket_of(&doc).to_string(),
                        "boundary": doc.boundary,
                        "lines": doc.line_count(),
                        "body": doc.body,
                    })),
                    Err(e) => {
                        eprintln!("{} {}: {}", "!".yellow().bold(), entry, e);
                    }
                }
            }

            let json = if compact {
                serde_json::to_string(&documents)?
            } else {
                serde_json::to_string_pretty(&documents)?
            };
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!(
                    "{} Parsed {} documents: {}",
                    "✓".green().bold(),
                    documents.len(),
                    path.display()
                );
            }
        }

        Commands::Head { dir, rows, prefix } => {
            let dataset = Dataset::discover_with_prefix(&dir, &prefix)?;

            let stdout = io::stdout();
            let mut handle = stdout.lock();
            for row in dataset.rows().take(rows) {
                let row = row?;
                writeln!(handle, "{}\t{}", row.title.cyan(), row.text)?;
            }
        }

        Commands::Stats { dir, prefix } => {
            let dataset = Dataset::discover_with_prefix(&dir, &prefix)?;
            if dataset.files().is_empty() {
                println!("{} No dataset files in {}", "!".yellow().bold(), dir.display());
                return Ok(());
            }

            println!("{}", "Dataset Statistics".cyan().bold());
            println!("{}", "─".repeat(40));

            let mut total = 0;
            for path in dataset.files() {
                let rows = Dataset::file_row_count(path)?;
                total += rows;
                let bucket = Dataset::bucket_of(path, &prefix)
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "?".to_string());
                println!(
                    "{}: {} rows ({})",
                    bucket.bold(),
                    rows,
                    path.file_name().unwrap_or_default().to_string_lossy()
                );
            }
            println!("{}", "─".repeat(40));
            println!("{}: {}", "Total".bold(), total);
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Runs a full conversion and prints the summary.
fn run_convert(
    options: ConvertOptions,
    report_path: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_spinner(&format!("Converting {}...", options.src.display()));

    let dst = options.dst.clone();
    let report = Converter::new(options).convert()?;

    pb.finish_and_clear();

    if let Some(path) = report_path {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
    }

    print_summary(&report, &dst);
    Ok(())
}

fn print_summary(report: &RunReport, dst: &Path) {
    println!("{}", "Conversion Complete".green().bold());
    println!("{}", "─".repeat(40));
    println!("{}: {}", "Output".bold(), dst.display());
    for output in &report.outputs {
        let name = output
            .path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| output.bucket.to_string());
        println!("  {} {} ({} rows)", "✓".green(), name, output.rows);
    }

    println!("\n{}", "Statistics".cyan().bold());
    println!("{}", "─".repeat(40));
    println!(
        "{}: {} ({} failed)",
        "Archives".bold(),
        report.archives,
        report.failed_archives
    );
    println!("{}: {}", "Documents".bold(), report.documents);
    println!("{}: {}", "Parsed".bold(), report.parsed);
    println!("{}: {}", "Rows".bold(), report.rows);

    if report.skipped > 0 || report.failed_archives > 0 {
        let (format, year, archive) = skipped_counts(report);
        println!(
            "{}: {} format, {} year, {} archive",
            "Skipped".yellow().bold(),
            format,
            year,
            archive
        );
    }
}

/// Skipped items as (format, year, archive) counts. Unreadable files count
/// as archive failures.
fn skipped_counts(report: &RunReport) -> (usize, usize, usize) {
    (
        report.count_kind(ErrorKind::Format),
        report.count_kind(ErrorKind::InvalidYear),
        report.count_kind(ErrorKind::Archive) + report.count_kind(ErrorKind::Io),
    )
}

fn print_version() {
    println!(
        "{} {}",
        "aozorabunko".green().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Aozora Bunko sentence dataset builder");
    println!();
    println!("Input: zipped Shift_JIS cards (cards/**/*.zip)");
    println!("Output: {}<decade>.parquet (title, text)", DEFAULT_PREFIX);
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
