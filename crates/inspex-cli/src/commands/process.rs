//! Process command - extract fields from a single report.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use inspex_core::models::record::Record;
use inspex_core::pdf::TextExtractor;
use inspex_core::report::{ReportParser, RuleReportParser};
use inspex_core::RuleSet;

use super::{is_text_file, load_config, FileTextExtractor};
use crate::export::{record_to_text, records_to_csv};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF, or a .txt dump of the first page)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print extraction warnings
    #[arg(long)]
    warnings: bool,

    /// Print the first-page text the rules were applied to
    #[arg(long)]
    dump_text: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let name = args
        .input
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string();

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if extension != "pdf" && !is_text_file(&name) {
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Reading first page...");
    pb.set_position(20);

    let data = fs::read(&args.input)?;
    let text = FileTextExtractor::new(config.pdf.clone()).first_page_text(&name, &data)?;
    debug!("First page has {} characters", text.len());

    pb.set_message("Extracting fields...");
    pb.set_position(70);

    let parser = RuleReportParser::from_config(&config.extraction);
    let result = parser.parse(&text);

    pb.finish_and_clear();

    if args.dump_text {
        eprintln!("{}", style("First page text:").dim());
        eprintln!("{}", text);
        eprintln!();
    }

    let Some(result) = result else {
        println!(
            "{} {} is not a recognized report (no \"Document No.\" or \"Store ID and Name\" marker)",
            style("ℹ").blue(),
            name
        );
        return Ok(());
    };

    if args.warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Extraction warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let record = result.record.with_source_file(name);
    let output = format_record(&record, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn format_record(record: &Record, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Csv => {
            let columns = RuleSet::for_type(record.document_type()).columns();
            records_to_csv(&columns, std::slice::from_ref(record))
        }
        OutputFormat::Text => Ok(record_to_text(record)),
    }
}
