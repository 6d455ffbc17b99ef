use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand};
use dxf_table_extract::{
    DEFAULT_X_THRESHOLD, DEFAULT_Y_THRESHOLD, ExtractOptions, ExtractionReport, LayerSelection,
    OutputFormat, Strategy, extract_dxf_to_file,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "dxf2xlsx",
    version,
    about = "Recover tables drawn in DXF files as spreadsheets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract tables and write them to a workbook, CSV or JSON file.
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Input DXF path.
    #[arg(short, long)]
    input: PathBuf,

    /// Output path.
    #[arg(short, long)]
    output: PathBuf,

    /// Reconstruction strategy: grid (drawn lines) or cluster (text positions).
    #[arg(long, default_value = "grid")]
    strategy: String,

    /// Maximum vertical distance for texts sharing a row (cluster strategy).
    #[arg(long, default_value_t = DEFAULT_Y_THRESHOLD)]
    y_threshold: f64,

    /// Horizontal gap, beyond the row's column pitch, that marks an empty cell (cluster strategy).
    #[arg(long, default_value_t = DEFAULT_X_THRESHOLD)]
    x_threshold: f64,

    /// Only read entities on these layers, comma separated.
    #[arg(long)]
    layers: Option<String>,

    /// Also read paper-space entities.
    #[arg(long)]
    include_paper_space: bool,

    /// Pad every row to its table's widest row.
    #[arg(long)]
    pad: bool,

    /// Output format (xlsx, csv, json). Defaults to the output file extension.
    #[arg(long)]
    format: Option<String>,

    /// CSV delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Enable verbose warning output.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let strategy = Strategy::from_str(&args.strategy)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --strategy")?;

    let layers = args
        .layers
        .as_deref()
        .map(LayerSelection::from_str)
        .transpose()
        .map_err(|error| anyhow!("invalid layer selection: {error}"))
        .context("failed to parse --layers")?;

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    Ok(ExtractOptions {
        strategy,
        y_threshold: args.y_threshold,
        x_threshold: args.x_threshold,
        layers,
        include_paper_space: args.include_paper_space,
        pad_rows: args.pad,
        delimiter: args.delimiter as u8,
    })
}

fn parse_format(args: &ExtractArgs) -> Result<OutputFormat> {
    match args.format.as_deref() {
        Some(value) => OutputFormat::from_str(value)
            .map_err(|error| anyhow!(error))
            .context("failed to parse --format"),
        None => Ok(OutputFormat::from_path(&args.output).unwrap_or_default()),
    }
}

const EXIT_WRITTEN: u8 = 0;
const EXIT_FAILED: u8 = 1;
const EXIT_NO_TABLE: u8 = 2;

/// Prints the run summary and picks the exit status.
fn finish(report: &ExtractionReport, verbose: bool) -> u8 {
    if report.is_empty() {
        eprintln!("warning: no table recognized in the drawing; nothing written");
    } else {
        eprintln!(
            "extracted {} table(s), {} row(s)",
            report.table_count, report.row_count
        );
    }

    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} count={:?} table_id={:?}: {}",
                warning.code, warning.count, warning.table_id, warning.message
            );
        }
    }

    if report.is_empty() {
        EXIT_NO_TABLE
    } else {
        EXIT_WRITTEN
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ExtractionReport> {
    let options = parse_options(args)?;
    let format = parse_format(args)?;
    extract_dxf_to_file(&args.input, &args.output, format, &options)
        .with_context(|| format!("failed to extract tables from '{}'", args.input.display()))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dxf_table_extract=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let Commands::Extract(args) = Cli::parse().command;
    let status = run_extract(&args).map_or_else(
        |error| {
            eprintln!("error: {error:#}");
            EXIT_FAILED
        },
        |report| finish(&report, args.verbose),
    );
    ExitCode::from(status)
}

#[cfg(test)]
mod tests {
    use dxf_table_extract::ExtractionReport;

    use super::{EXIT_NO_TABLE, EXIT_WRITTEN, finish};

    fn report(table_count: usize) -> ExtractionReport {
        ExtractionReport {
            table_count,
            row_count: table_count * 2,
            text_count: 4,
            line_count: 0,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn exit_status_follows_table_count() {
        assert_eq!(finish(&report(1), false), EXIT_WRITTEN);
        assert_eq!(finish(&report(0), true), EXIT_NO_TABLE);
    }
}
