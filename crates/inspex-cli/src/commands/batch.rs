//! Batch processing command for archives and sets of report files.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use inspex_core::models::config::{BatchConfig, InspexConfig};
use inspex_core::models::record::{DocumentType, Record};
use inspex_core::report::RuleReportParser;
use inspex_core::{BatchAggregator, BatchResult, RuleSet, SourceDocument};

use super::{load_config, FileTextExtractor};
use crate::export::{records_to_csv, records_to_json, records_to_xlsx};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// ZIP archive or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Output format of the per-type tables
    #[arg(short, long, value_enum, default_value = "xlsx")]
    format: BatchFormat,

    /// Number of parallel workers (default from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Abort on the first document whose text cannot be read
    #[arg(long)]
    fail_fast: bool,

    /// Print extraction warnings
    #[arg(long)]
    warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum BatchFormat {
    /// One spreadsheet per report type
    Xlsx,
    /// One CSV table per report type
    Csv,
    /// One JSON array per report type
    Json,
}

impl BatchFormat {
    fn extension(&self) -> &'static str {
        match self {
            BatchFormat::Xlsx => "xlsx",
            BatchFormat::Csv => "csv",
            BatchFormat::Json => "json",
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;

    let documents = if args.input.to_lowercase().ends_with(".zip") {
        read_zip(Path::new(&args.input), &config.batch)?
    } else {
        read_glob(&args.input, &config.batch)?
    };

    if documents.is_empty() {
        anyhow::bail!("No matching documents found in: {}", args.input);
    }

    println!(
        "{} Found {} documents to process",
        style("ℹ").blue(),
        documents.len()
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message("Extracting fields...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let aggregator = build_aggregator(&args, &config);
    let result = tokio::task::spawn_blocking(move || aggregator.run(&documents)).await?;

    pb.finish_and_clear();
    let result = result?;

    info!(
        "Extracted {} records, skipped {} documents",
        result.total_records(),
        result.skipped.len()
    );

    if result.is_empty() {
        println!("{} No data extracted", style("⚠").yellow());
        print_skipped(&result);
        return Ok(());
    }

    fs::create_dir_all(&args.output_dir)?;

    for document_type in DocumentType::KNOWN {
        let records = result.records(document_type);
        if records.is_empty() {
            debug!("No {} records, skipping output", document_type);
            continue;
        }

        let output_path = args.output_dir.join(format!(
            "{}.{}",
            output_stem(&config, document_type),
            args.format.extension()
        ));
        fs::write(&output_path, format_records(document_type, records, args.format)?)?;

        println!(
            "{} {} {} records written to {}",
            style("✓").green(),
            records.len(),
            document_type.description(),
            output_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} documents in {:?}",
        style("✓").green(),
        result.total_records() + result.skipped.len(),
        start.elapsed()
    );
    println!(
        "   {} store inspections, {} audits, {} skipped",
        style(result.store_inspections.len()).green(),
        style(result.audits.len()).green(),
        style(result.skipped.len()).yellow()
    );

    print_skipped(&result);

    if args.warnings && !result.warnings.is_empty() {
        println!();
        println!("{}", style("Extraction warnings:").yellow());
        for warning in &result.warnings {
            println!("  - {}: {}", warning.name, warning.message);
        }
    }

    Ok(())
}

fn build_aggregator(
    args: &BatchArgs,
    config: &InspexConfig,
) -> BatchAggregator<FileTextExtractor, RuleReportParser> {
    BatchAggregator::new(
        FileTextExtractor::new(config.pdf.clone()),
        RuleReportParser::from_config(&config.extraction),
    )
    .with_jobs(args.jobs.unwrap_or(config.batch.jobs))
    .with_fail_fast(args.fail_fast || !config.batch.continue_on_error)
}

/// Read every accepted entry of a ZIP archive, in archive order.
fn read_zip(path: &Path, batch: &BatchConfig) -> anyhow::Result<Vec<SourceDocument>> {
    let file = fs::File::open(path)
        .map_err(|e| anyhow::anyhow!("Cannot open archive {}: {}", path.display(), e))?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut documents = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        if !batch.accepts(&name) {
            debug!("Ignoring archive entry {}", name);
            continue;
        }

        // declared sizes come from the archive and are not trusted
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        documents.push(SourceDocument::new(name, data));
    }

    debug!("Read {} documents from {}", documents.len(), path.display());
    Ok(documents)
}

/// Read every accepted file matching a glob pattern.
fn read_glob(pattern: &str, batch: &BatchConfig) -> anyhow::Result<Vec<SourceDocument>> {
    let mut documents = Vec::new();

    for entry in glob(pattern)? {
        let path = match entry {
            Ok(path) => path,
            Err(e) => {
                warn!("Cannot read {}: {}", e.path().display(), e);
                continue;
            }
        };

        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if !path.is_file() || !batch.accepts(name) {
            continue;
        }

        documents.push(SourceDocument::new(name, fs::read(&path)?));
    }

    Ok(documents)
}

fn output_stem(config: &InspexConfig, document_type: DocumentType) -> &str {
    match document_type {
        DocumentType::StoreInspection => &config.batch.type_a_output,
        DocumentType::Audit | DocumentType::Unknown => &config.batch.type_b_output,
    }
}

fn format_records(
    document_type: DocumentType,
    records: &[Record],
    format: BatchFormat,
) -> anyhow::Result<Vec<u8>> {
    let columns = RuleSet::for_type(document_type).columns();
    match format {
        BatchFormat::Xlsx => records_to_xlsx(document_type.as_str(), &columns, records),
        BatchFormat::Csv => records_to_csv(&columns, records).map(String::into_bytes),
        BatchFormat::Json => records_to_json(records).map(String::into_bytes),
    }
}

fn print_skipped(result: &BatchResult) {
    if result.skipped.is_empty() {
        return;
    }

    println!();
    println!("{}", style("Skipped documents:").yellow());
    for skipped in &result.skipped {
        println!("  - {}: {}", skipped.name, skipped.reason);
    }
}
