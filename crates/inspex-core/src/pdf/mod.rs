//! First-page text extraction.
//!
//! Rule tables assume they only ever see the first page of a report, so
//! every extractor here stops at the first page break.

mod extractor;

pub use extractor::{PdfDocument, PdfExtractor};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Form feed, the page separator in plain-text page dumps.
pub const PAGE_BREAK: char = '\u{c}';

/// Source of first-page text for a document.
pub trait TextExtractor: Send + Sync {
    /// Return the text of the first page of the document `name` whose raw
    /// bytes are `data`.
    fn first_page_text(&self, name: &str, data: &[u8]) -> Result<String>;
}

/// Extractor for documents that already are plain text, such as page
/// dumps written by other tools. Invalid UTF-8 is replaced, never rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn first_page_text(&self, _name: &str, data: &[u8]) -> Result<String> {
        let text = String::from_utf8_lossy(data);
        let first_page = text.split(PAGE_BREAK).next().unwrap_or_default();
        Ok(first_page.to_string())
    }
}
