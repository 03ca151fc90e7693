use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use timetable_grid::{
    ExtractOptions, ExtractionReport, LabMergePolicy, PageSelection, classify_pages,
    decode_document, extract_schedules, write_schedules_csv_to_string,
};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "timetable",
    version,
    about = "Rebuild weekly class timetables from positioned PDF text"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract merged schedule records and the rooms they belong to.
    Extract(ExtractArgs),
    /// Label every page with its batch, section and semester.
    Labels(LabelArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Decoded page fragments (pdf2json output).
    #[arg(short, long)]
    input: PathBuf,

    /// Output path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Page selection like 1-3,5.
    #[arg(long)]
    pages: Option<String>,

    /// Lab rooms: `double-slot` or `evidence`.
    #[arg(long, default_value = "double-slot")]
    lab_policy: String,

    /// Maximum vertical distance between a fragment and its day label.
    #[arg(long)]
    y_tolerance: Option<f64>,

    /// Fragments further than this from every slot header are ignored.
    #[arg(long)]
    noise_threshold: Option<f64>,

    /// Print page-level warnings in detail.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Args)]
struct LabelArgs {
    /// Decoded page fragments (pdf2json output).
    #[arg(short, long)]
    input: PathBuf,

    /// Output path; stdout when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn parse_options(args: &ExtractArgs) -> Result<ExtractOptions> {
    let pages = args
        .pages
        .as_deref()
        .map(PageSelection::from_str)
        .transpose()
        .context("failed to parse --pages")?;

    let lab_policy = LabMergePolicy::from_str(&args.lab_policy)
        .map_err(|error| anyhow!(error))
        .context("failed to parse --lab-policy")?;

    let defaults = ExtractOptions::default();
    Ok(ExtractOptions {
        pages,
        lab_policy,
        y_tolerance: args.y_tolerance.unwrap_or(defaults.y_tolerance),
        slot_noise_threshold: args.noise_threshold.unwrap_or(defaults.slot_noise_threshold),
        ..defaults
    })
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read '{}'", path.display()))
}

fn write_output(path: Option<&Path>, body: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, body)
            .with_context(|| format!("failed to write '{}'", path.display())),
        None => {
            println!("{body}");
            Ok(())
        }
    }
}

fn log_report(report: &ExtractionReport, verbose: bool) {
    if report.warnings.is_empty() {
        return;
    }

    eprintln!("warning: {} issue(s) detected", report.warnings.len());
    if verbose {
        for warning in &report.warnings {
            eprintln!(
                "  - {:?} page={:?} dropped={:?}: {}",
                warning.code, warning.page, warning.dropped_tokens, warning.message
            );
        }
    }
}

fn run_extract(args: &ExtractArgs) -> Result<ExtractionReport> {
    let options = parse_options(args)?;
    let json = read_input(&args.input)?;
    let pages = decode_document(&json)
        .with_context(|| format!("failed to decode '{}'", args.input.display()))?;
    let (extraction, report) = extract_schedules(&pages, &options)
        .with_context(|| format!("failed to extract schedules from '{}'", args.input.display()))?;

    let body = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&extraction)?,
        OutputFormat::Csv => write_schedules_csv_to_string(&extraction.schedules, b',')?,
    };
    write_output(args.output.as_deref(), &body)?;
    Ok(report)
}

fn run_labels(args: &LabelArgs) -> Result<()> {
    let json = read_input(&args.input)?;
    let pages = decode_document(&json)
        .with_context(|| format!("failed to decode '{}'", args.input.display()))?;
    let mapping = classify_pages(&pages);
    write_output(args.output.as_deref(), &serde_json::to_string_pretty(&mapping)?)
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("timetable_grid=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Extract(args) => match run_extract(&args) {
            Ok(report) => {
                log_report(&report, args.verbose);
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
        Commands::Labels(args) => match run_labels(&args) {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::from(1)
            }
        },
    }
}
