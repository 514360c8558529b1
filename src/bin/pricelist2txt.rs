use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use price_list_to_txt::{
    ColumnMap, ConversionReport, ConvertOptions, DEFAULT_INPUT, DEFAULT_OUTPUT,
    DEFAULT_PREVIEW_ROWS, LineEnding, PageSelection, ShortRowPolicy,
    convert_pdf_to_txt_with_progress, format_preview_row, preview_table,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "pricelist2txt",
    version,
    about = "Convert a PDF price list into pipe-delimited text"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract every page's table and write the price list records.
    Convert(ConvertArgs),
    /// Print the first rows of one page's extracted table.
    Preview(PreviewArgs),
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input PDF path.
    #[arg(short, long, env = "PRICELIST_INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// Output text path.
    #[arg(short, long, env = "PRICELIST_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,

    /// JSON file overriding source column positions.
    #[arg(long)]
    columns: Option<PathBuf>,

    /// Minimum cells for a line to count as a table row.
    #[arg(long, default_value_t = 3)]
    min_cols: usize,

    /// Rows shorter than the column map: reject, pad or fail.
    #[arg(long, default_value = "reject")]
    short_rows: ShortRowPolicy,

    /// Terminate lines with CRLF instead of LF.
    #[arg(long)]
    crlf: bool,

    /// Print every warning instead of a summary.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct PreviewArgs {
    /// Input PDF path.
    #[arg(short, long, env = "PRICELIST_INPUT", default_value = DEFAULT_INPUT)]
    input: PathBuf,

    /// 1-based page to preview.
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Number of rows to print.
    #[arg(long, default_value_t = DEFAULT_PREVIEW_ROWS)]
    rows: usize,

    /// Minimum cells for a line to count as a table row.
    #[arg(long, default_value_t = 3)]
    min_cols: usize,
}

fn parse_options(args: &ConvertArgs) -> Result<ConvertOptions> {
    let pages = args
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid page selection: {error}"))
        .context("failed to parse --pages")?;

    let columns = args
        .columns
        .as_deref()
        .map(ColumnMap::from_path)
        .transpose()
        .context("failed to load --columns")?
        .unwrap_or_default();

    Ok(ConvertOptions {
        pages,
        columns,
        min_cols: args.min_cols,
        short_rows: args.short_rows,
        line_ending: if args.crlf {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        },
        ..ConvertOptions::default()
    })
}

fn log_report(report: &ConversionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} page={:?} row={:?} confidence={:?}: {}",
                warning.code, warning.page, warning.row, warning.confidence, warning.message
            );
        }
    }
}

fn run_convert(args: &ConvertArgs) -> Result<ConversionReport> {
    let options = parse_options(args)?;
    convert_pdf_to_txt_with_progress(&args.input, &args.output, &options, |step| {
        println!("Processing page {}/{}...", step.index, step.total);
    })
    .with_context(|| format!("failed to convert '{}'", args.input.display()))
}

fn run_preview(args: &PreviewArgs) -> Result<()> {
    let table = preview_table(&args.input, args.page, args.rows, args.min_cols)
        .with_context(|| format!("failed to read '{}'", args.input.display()))?;

    match table {
        Some(table) => {
            for row in &table.rows {
                println!("{}", format_preview_row(row));
            }
        }
        None => println!("No table found"),
    }
    Ok(())
}

fn main() -> ExitCode {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("price_list_to_txt=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => match run_convert(&args) {
            Ok(report) => {
                log_report(&report, args.verbose);
                println!("Done!");
                if report.record_count > 0 {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::from(2)
                }
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
        Commands::Preview(args) => match run_preview(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
