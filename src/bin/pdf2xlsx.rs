use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use persian_pdf_to_excel::{
    ConversionReport, ConvertError, ConvertOptions, PageSelection, SelectionThresholds,
    SheetLayout, convert_pdf_to_csv, convert_pdf_to_xlsx, extract_raw_tables,
};
use tracing_subscriber::EnvFilter;

const EXIT_NO_TABLE: u8 = 2;

#[derive(Debug, Parser)]
#[command(
    name = "pdf2xlsx",
    version,
    about = "Convert Persian/Arabic PDF tables to right-to-left spreadsheets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract tables and write them to an XLSX or CSV file.
    Convert(ConvertArgs),
    /// List candidate tables and whether they pass the size thresholds.
    Inspect(InspectArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    const fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

#[derive(Debug, Args)]
struct SelectionArgs {
    /// Minimum rows (header included) a table needs to be kept.
    #[arg(long, default_value_t = persian_pdf_to_excel::DEFAULT_MIN_ROWS)]
    min_rows: usize,

    /// Minimum columns a table needs to be kept.
    #[arg(long, default_value_t = persian_pdf_to_excel::DEFAULT_MIN_COLS)]
    min_cols: usize,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,
}

#[derive(Debug, Args)]
struct ConvertArgs {
    /// Input PDF path.
    input: PathBuf,

    /// Output path (optional; defaults to <input>_converted.<format>).
    #[arg(value_name = "OUTPUT")]
    output_positional: Option<PathBuf>,

    /// Output path; takes precedence over the positional output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Worksheet name.
    #[arg(short, long, default_value = persian_pdf_to_excel::DEFAULT_SHEET_NAME)]
    sheet: String,

    /// Font used for every cell (for example "B Nazanin").
    #[arg(short, long, default_value = persian_pdf_to_excel::DEFAULT_FONT_NAME)]
    font: String,

    #[command(flatten)]
    selection: SelectionArgs,

    /// Reverse the column order of every row.
    #[arg(long)]
    mirror_columns: bool,

    /// Write one worksheet per table instead of a single merged sheet.
    #[arg(long)]
    per_table: bool,

    /// Output format; inferred from the output extension when omitted.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// CSV delimiter character.
    #[arg(long, default_value = ",")]
    delimiter: char,

    /// Print the conversion report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable verbose logging and warning details.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Input PDF path.
    input: PathBuf,

    #[command(flatten)]
    selection: SelectionArgs,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("persian_pdf_to_excel={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn validate_input(input: &Path) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("PDF file not found: {}", input.display());
    }
    let is_pdf = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        anyhow::bail!("input file must be a PDF: {}", input.display());
    }
    Ok(())
}

fn resolve_format(args: &ConvertArgs) -> OutputFormat {
    if let Some(format) = args.format {
        return format;
    }
    let explicit = args.output.as_ref().or(args.output_positional.as_ref());
    let is_csv = explicit
        .and_then(|path| path.extension())
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        OutputFormat::Csv
    } else {
        OutputFormat::Xlsx
    }
}

fn resolve_output(args: &ConvertArgs, format: OutputFormat) -> PathBuf {
    if let Some(path) = args.output.as_ref().or(args.output_positional.as_ref()) {
        return path.clone();
    }
    let stem = args
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    args.input
        .with_file_name(format!("{stem}_converted.{}", format.extension()))
}

fn parse_thresholds_and_pages(
    selection: &SelectionArgs,
) -> Result<(SelectionThresholds, Option<PageSelection>)> {
    let pages = selection
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .context("failed to parse --pages")?;
    let thresholds = SelectionThresholds::new(selection.min_rows, selection.min_cols);
    Ok((thresholds, pages))
}

fn parse_options(args: &ConvertArgs) -> Result<ConvertOptions> {
    let (thresholds, pages) = parse_thresholds_and_pages(&args.selection)?;

    if !args.delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character");
    }

    let layout = if args.per_table {
        SheetLayout::PerTable
    } else {
        SheetLayout::Merged
    };

    Ok(ConvertOptions {
        pages,
        thresholds,
        sheet_name: args.sheet.clone(),
        font_name: args.font.clone(),
        layout,
        mirror_columns: args.mirror_columns,
        delimiter: u8::try_from(args.delimiter)?,
    })
}

fn log_report(report: &ConversionReport, output: &Path, verbose: bool) {
    eprintln!(
        "wrote {}: {} table(s), {} row(s), {} column(s)",
        output.display(),
        report.table_count,
        report.row_count,
        report.column_count
    );

    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} page={:?} table={:?}: {}",
                warning.code, warning.page, warning.table_index, warning.message
            );
        }
    }
}

fn run_convert(args: &ConvertArgs) -> Result<(ConversionReport, PathBuf)> {
    validate_input(&args.input)?;
    let options = parse_options(args)?;
    let format = resolve_format(args);
    let output = resolve_output(args, format);

    let report = match format {
        OutputFormat::Xlsx => convert_pdf_to_xlsx(&args.input, &output, &options),
        OutputFormat::Csv => convert_pdf_to_csv(&args.input, &output, &options),
    }
    .with_context(|| format!("failed to convert tables from '{}'", args.input.display()))?;

    Ok((report, output))
}

fn run_inspect(args: &InspectArgs) -> Result<()> {
    validate_input(&args.input)?;
    let (thresholds, pages) = parse_thresholds_and_pages(&args.selection)?;
    let options = ConvertOptions {
        pages,
        thresholds,
        ..ConvertOptions::default()
    };

    let (tables, _) = extract_raw_tables(&args.input, &options)
        .with_context(|| format!("failed to read tables from '{}'", args.input.display()))?;

    if tables.is_empty() {
        println!("no candidate tables found");
        return Ok(());
    }

    for (index, table) in tables.iter().enumerate() {
        let status = if thresholds.accepts(table.row_count(), table.column_count()) {
            "accepted"
        } else {
            "rejected"
        };
        println!(
            "#{index} page={} rows={} cols={} {status}",
            table.page,
            table.row_count(),
            table.column_count()
        );
    }
    Ok(())
}

fn is_no_table(error: &anyhow::Error) -> bool {
    error
        .chain()
        .filter_map(|cause| cause.downcast_ref::<ConvertError>())
        .any(|cause| matches!(cause, ConvertError::NoTableFound { .. }))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Commands::Convert(args) => {
            init_tracing(args.verbose);
            match run_convert(&args) {
                Ok((report, output)) => {
                    if args.json {
                        match serde_json::to_string_pretty(&report) {
                            Ok(json) => println!("{json}"),
                            Err(error) => {
                                eprintln!("error: failed to render report: {error}");
                                return ExitCode::from(1);
                            }
                        }
                    }
                    log_report(&report, &output, args.verbose);
                    ExitCode::SUCCESS
                }
                Err(error) if is_no_table(&error) => {
                    eprintln!("error: {error:#}");
                    eprintln!("hint: lower --min-rows/--min-cols or check --pages");
                    ExitCode::from(EXIT_NO_TABLE)
                }
                Err(error) => {
                    eprintln!("error: {error:#}");
                    ExitCode::from(1)
                }
            }
        }
        Commands::Inspect(args) => {
            init_tracing(args.verbose);
            match run_inspect(&args) {
                Ok(()) => ExitCode::SUCCESS,
                Err(error) => {
                    eprintln!("error: {error:#}");
                    ExitCode::from(1)
                }
            }
        }
    }
}
