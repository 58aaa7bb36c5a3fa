//! Report classification and field extraction.

mod classifier;
mod parser;
pub mod rules;

pub use classifier::classify;
pub use parser::{extract, ExtractionResult, ReportParser, RuleReportParser};
