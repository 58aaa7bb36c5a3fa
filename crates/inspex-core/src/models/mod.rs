//! Data models shared by the extraction pipeline.

pub mod config;
pub mod record;

pub use config::{BatchConfig, ExtractionConfig, InspexConfig, PdfConfig};
pub use record::{DocumentType, FieldValue, Record, DOCUMENT_TYPE_COLUMN, SOURCE_FILE_COLUMN};
