//! Batch aggregation of report documents.
//!
//! Each document is turned into first-page text, classified, extracted and
//! put into the bucket of its type. Unrecognized documents produce no
//! record. Bucket order always follows input order, also when documents
//! are processed in parallel.

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::{InspexError, PdfError, Result};
use crate::models::record::{DocumentType, Record};
use crate::pdf::TextExtractor;
use crate::report::{ExtractionResult, ReportParser};

/// A raw document handed to the aggregator.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Identifier written into the "Source File" column.
    pub name: String,
    /// Raw file contents.
    pub data: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// First-page text that was already extracted by the caller.
#[derive(Debug, Clone)]
pub struct PageText {
    pub name: String,
    pub text: String,
}

impl PageText {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Why a document produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Neither layout marker was found.
    Unrecognized,
    /// First-page text could not be obtained.
    Unreadable(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unrecognized => f.write_str("unrecognized document type"),
            SkipReason::Unreadable(reason) => write!(f, "unreadable: {}", reason),
        }
    }
}

/// A document that was left out of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub name: String,
    pub reason: SkipReason,
}

/// An extraction warning tied to its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentWarning {
    pub name: String,
    pub message: String,
}

/// Records partitioned by document type.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Store inspection records, in input order.
    pub store_inspections: Vec<Record>,
    /// Audit records, in input order.
    pub audits: Vec<Record>,
    /// Documents that produced no record.
    pub skipped: Vec<SkippedDocument>,
    /// Extraction warnings of the records above.
    pub warnings: Vec<DocumentWarning>,
}

impl BatchResult {
    /// Records of one type. Always empty for `Unknown`.
    pub fn records(&self, document_type: DocumentType) -> &[Record] {
        match document_type {
            DocumentType::StoreInspection => &self.store_inspections,
            DocumentType::Audit => &self.audits,
            DocumentType::Unknown => &[],
        }
    }

    pub fn total_records(&self) -> usize {
        self.store_inspections.len() + self.audits.len()
    }

    /// True when no document produced a record.
    pub fn is_empty(&self) -> bool {
        self.total_records() == 0
    }

    fn push(&mut self, name: String, result: ExtractionResult) {
        self.warnings
            .extend(result.warnings.into_iter().map(|message| DocumentWarning {
                name: name.clone(),
                message,
            }));

        let record = result.record.with_source_file(name);
        match record.document_type() {
            DocumentType::StoreInspection => self.store_inspections.push(record),
            DocumentType::Audit => self.audits.push(record),
            // parsers never return unknown records
            DocumentType::Unknown => {}
        }
    }
}

enum Outcome {
    Extracted(ExtractionResult),
    Unrecognized,
    Failed(PdfError),
    /// Not attempted because another document already failed in fail-fast
    /// mode.
    #[cfg_attr(not(feature = "parallel"), allow(dead_code))]
    Cancelled,
}

/// Runs text extraction, classification and field extraction over a
/// collection of documents.
pub struct BatchAggregator<E, P> {
    extractor: E,
    parser: P,
    jobs: usize,
    fail_fast: bool,
}

impl<E, P> BatchAggregator<E, P>
where
    E: TextExtractor,
    P: ReportParser + Sync,
{
    /// Create a sequential aggregator that records unreadable documents as
    /// skipped.
    pub fn new(extractor: E, parser: P) -> Self {
        Self {
            extractor,
            parser,
            jobs: 1,
            fail_fast: false,
        }
    }

    /// Set the number of parallel workers.
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Abort the batch on the first unreadable document.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Process raw documents.
    pub fn run(&self, documents: &[SourceDocument]) -> Result<BatchResult> {
        let outcomes = self.map_ordered(documents, |doc| {
            debug!("Processing {}", doc.name);
            match self.extractor.first_page_text(&doc.name, &doc.data) {
                Ok(text) => self.parse(&text),
                Err(e) => Outcome::Failed(e),
            }
        })?;

        let names = documents.iter().map(|doc| doc.name.clone());
        self.collect(names.zip(outcomes))
    }

    /// Process pages whose text was extracted by the caller. Only fails
    /// when the worker pool cannot be started.
    pub fn run_pages(&self, pages: &[PageText]) -> Result<BatchResult> {
        let outcomes = self.map_ordered(pages, |page| self.parse(&page.text))?;
        let names = pages.iter().map(|page| page.name.clone());
        self.collect(names.zip(outcomes))
    }

    fn parse(&self, text: &str) -> Outcome {
        match self.parser.parse(text) {
            Some(result) => Outcome::Extracted(result),
            None => Outcome::Unrecognized,
        }
    }

    fn collect(&self, outcomes: impl Iterator<Item = (String, Outcome)>) -> Result<BatchResult> {
        let mut batch = BatchResult::default();

        for (name, outcome) in outcomes {
            match outcome {
                Outcome::Extracted(result) => {
                    debug!("{}: {}", name, result.record.document_type().description());
                    batch.push(name, result);
                }
                Outcome::Unrecognized => {
                    warn!("{}: no layout marker found, skipping", name);
                    batch.skipped.push(SkippedDocument {
                        name,
                        reason: SkipReason::Unrecognized,
                    });
                }
                Outcome::Failed(e) if self.fail_fast => {
                    return Err(InspexError::Pdf(e));
                }
                // only produced after a failure, which aborts the batch
                Outcome::Cancelled => {}
                Outcome::Failed(e) => {
                    warn!("{}: {}", name, e);
                    batch.skipped.push(SkippedDocument {
                        name,
                        reason: SkipReason::Unreadable(e.to_string()),
                    });
                }
            }
        }

        info!(
            "Batch complete: {} store inspections, {} audits, {} skipped",
            batch.store_inspections.len(),
            batch.audits.len(),
            batch.skipped.len()
        );

        Ok(batch)
    }

    #[cfg(feature = "parallel")]
    fn map_ordered<T, F>(&self, items: &[T], f: F) -> Result<Vec<Outcome>>
    where
        T: Sync,
        F: Fn(&T) -> Outcome + Sync + Send,
    {
        use rayon::prelude::*;
        use std::sync::atomic::{AtomicBool, Ordering};

        if self.jobs <= 1 || items.len() <= 1 {
            return Ok(self.map_sequential(items, f));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()
            .map_err(|e| {
                InspexError::Config(format!("failed to start {} workers: {}", self.jobs, e))
            })?;

        let fail_fast = self.fail_fast;
        let stop = AtomicBool::new(false);

        // collect() on an indexed parallel iterator keeps input order
        Ok(pool.install(|| {
            items
                .par_iter()
                .map(|item| {
                    if stop.load(Ordering::Relaxed) {
                        return Outcome::Cancelled;
                    }
                    let outcome = f(item);
                    if fail_fast && matches!(outcome, Outcome::Failed(_)) {
                        stop.store(true, Ordering::Relaxed);
                    }
                    outcome
                })
                .collect()
        }))
    }

    #[cfg(not(feature = "parallel"))]
    fn map_ordered<T, F>(&self, items: &[T], f: F) -> Result<Vec<Outcome>>
    where
        F: Fn(&T) -> Outcome,
    {
        Ok(self.map_sequential(items, f))
    }

    /// Map in input order, stopping after the first failure when fail-fast
    /// is set.
    fn map_sequential<T, F>(&self, items: &[T], f: F) -> Vec<Outcome>
    where
        F: Fn(&T) -> Outcome,
    {
        let mut outcomes = Vec::with_capacity(items.len());
        for item in items {
            let outcome = f(item);
            let stop = self.fail_fast && matches!(outcome, Outcome::Failed(_));
            outcomes.push(outcome);
            if stop {
                break;
            }
        }
        outcomes
    }
}
