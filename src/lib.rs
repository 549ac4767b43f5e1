//! idskit: reader, writer and converter for IDS applicability specifications.
//!
//! An IDS (Information Delivery Specification) describes which IFC building
//! elements a set of requirements applies to. idskit keeps a flat internal
//! model of such a specification and converts it to and from the two
//! external shapes an editor exchanges: IDS XML and a namespaced JSON tree
//! that mirrors the XML.
//!
//! # Modules
//!
//! - [`ir`]: Internal representation (Document, Rule, RuleKind) and codecs
//! - [`conversion`]: Import sniffing, export routing and lossiness reports
//! - [`inspect`]: Human-readable document summaries
//! - [`error`]: Error types for idskit operations

pub mod conversion;
pub mod error;
pub mod inspect;
pub mod ir;

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use conversion::Format;
pub use error::IdsError;

/// The idskit CLI application.
#[derive(Parser)]
#[command(name = "idskit")]
#[command(version, author, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level used when RUST_LOG is not set.
    #[arg(long, global = true, env = "IDSKIT_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert a specification between JSON, namespaced JSON and IDS XML.
    Convert(ConvertArgs),
    /// Summarize a specification file.
    Inspect(InspectArgs),
    /// Write a fresh, empty specification.
    New(NewArgs),
}

/// Arguments for the convert subcommand.
#[derive(clap::Args)]
struct ConvertArgs {
    /// Input file.
    input: PathBuf,

    /// Output file.
    #[arg(short, long)]
    output: PathBuf,

    /// Input format ('auto', 'json', 'namespaced-json', or 'xml').
    #[arg(long, default_value = "auto")]
    from: String,

    /// Output format; inferred from the output file name when omitted.
    #[arg(long)]
    to: Option<String>,

    /// Write the output even if the conversion loses information.
    #[arg(long)]
    allow_lossy: bool,

    /// Output format for the conversion report ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,
}

/// Arguments for the inspect subcommand.
#[derive(clap::Args)]
struct InspectArgs {
    /// Input file to inspect.
    input: PathBuf,

    /// Input format ('auto', 'json', 'namespaced-json', or 'xml').
    #[arg(long, default_value = "auto")]
    from: String,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the new subcommand.
#[derive(clap::Args)]
struct NewArgs {
    /// Output file.
    #[arg(short, long)]
    output: PathBuf,

    /// Specification title.
    #[arg(long)]
    title: Option<String>,

    /// Output format; inferred from the output file name when omitted.
    #[arg(long)]
    to: Option<String>,
}

/// Run the idskit CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), IdsError> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command {
        Some(Commands::Convert(args)) => run_convert(args),
        Some(Commands::Inspect(args)) => run_inspect(args),
        Some(Commands::New(args)) => run_new(args),
        None => {
            println!("idskit {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("Reader, writer and converter for IDS applicability specifications.");
            println!();
            println!("Run 'idskit --help' for usage information.");
            Ok(())
        }
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `--log-level`.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("idskit={level}")));

    // A second initialization (tests calling run twice) keeps the first one.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Execute the convert subcommand.
fn run_convert(args: ConvertArgs) -> Result<(), IdsError> {
    let json_report = parse_report_format(&args.report)?;
    let to = resolve_target(args.to.as_deref(), &args.output)?;
    let (from, doc) = read_document(&args.input, &args.from, true)?;

    let report = conversion::build_conversion_report(&doc, from, to);
    tracing::debug!(
        from = from.name(),
        to = to.name(),
        warnings = report.warning_count(),
        "conversion analysed"
    );

    if report.is_lossy() && !args.allow_lossy {
        return Err(IdsError::LossyConversion {
            report: Box::new(report),
        });
    }

    conversion::write_export(&args.output, &doc, to)?;

    if json_report {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|source| IdsError::JsonSerialize { source })?;
        println!("{}", json);
    } else {
        println!(
            "Converted {} ({}) -> {} ({})",
            args.input.display(),
            from,
            args.output.display(),
            to
        );
        print!("{}", report);
    }

    Ok(())
}

/// Execute the inspect subcommand.
fn run_inspect(args: InspectArgs) -> Result<(), IdsError> {
    let json_output = parse_report_format(&args.output)?;
    let (format, doc) = read_document(&args.input, &args.from, false)?;

    let report = inspect::inspect_document(&doc, format, &inspect::InspectOptions::default());

    if json_output {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|source| IdsError::JsonSerialize { source })?;
        println!("{}", json);
    } else {
        print!("{}", report);
    }

    Ok(())
}

/// Execute the new subcommand.
fn run_new(args: NewArgs) -> Result<(), IdsError> {
    let to = resolve_target(args.to.as_deref(), &args.output)?;

    let mut doc = ir::Document::new_default();
    if let Some(title) = args.title {
        doc.spec.title = Some(title);
    }

    conversion::write_export(&args.output, &doc, to)?;
    println!("Wrote {} ({})", args.output.display(), to);
    Ok(())
}

/// Read and decode `path`. `from` is a format name or `auto`; `normalize`
/// applies the import normalization.
fn read_document(
    path: &Path,
    from: &str,
    normalize: bool,
) -> Result<(Format, ir::Document), IdsError> {
    let text = fs::read_to_string(path)?;

    let (format, doc) = if from == "auto" {
        conversion::decode_text(&text)?
    } else {
        let format = parse_format(from)?;
        (format, conversion::decode_as(&text, format)?)
    };

    if normalize {
        Ok((format, conversion::normalize_import(doc)))
    } else {
        Ok((format, doc))
    }
}

fn parse_format(name: &str) -> Result<Format, IdsError> {
    match name {
        "json" | "ids-json" => Ok(Format::Json),
        "namespaced-json" | "namespaced" => Ok(Format::NamespacedJson),
        "xml" | "ids-xml" | "ids" => Ok(Format::Xml),
        other => Err(IdsError::UnsupportedFormat(format!(
            "'{}' (supported: json, namespaced-json, xml)",
            other
        ))),
    }
}

fn resolve_target(to: Option<&str>, output: &Path) -> Result<Format, IdsError> {
    match to {
        Some(name) => parse_format(name),
        None => Format::from_path(output).ok_or_else(|| {
            IdsError::UnsupportedFormat(format!(
                "cannot infer a format from '{}'; pass --to",
                output.display()
            ))
        }),
    }
}

/// Returns true for `json`, false for `text`.
fn parse_report_format(name: &str) -> Result<bool, IdsError> {
    match name {
        "text" => Ok(false),
        "json" => Ok(true),
        other => Err(IdsError::UnsupportedFormat(format!(
            "report format '{}' (supported: text, json)",
            other
        ))),
    }
}
