//! Core library for inspection and audit report extraction.
//!
//! This crate provides:
//! - First-page PDF text extraction
//! - Layout classification (store inspection vs. audit reports)
//! - Rule-table driven field extraction into flat records
//! - Batch aggregation of documents into per-type record lists

pub mod batch;
pub mod error;
pub mod models;
pub mod pdf;
pub mod report;

pub use batch::{
    BatchAggregator, BatchResult, DocumentWarning, PageText, SkipReason, SkippedDocument,
    SourceDocument,
};
pub use error::{InspexError, PdfError, Result};
pub use models::config::InspexConfig;
pub use models::record::{DocumentType, FieldValue, Record};
pub use pdf::{PdfDocument, PdfExtractor, PlainTextExtractor, TextExtractor};
pub use report::rules::{CaptureKind, FieldRule, RuleSet};
pub use report::{classify, extract, ExtractionResult, ReportParser, RuleReportParser};
