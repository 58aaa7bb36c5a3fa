//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, warn};

use super::{Result, TextExtractor};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// A loaded PDF document.
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
}

impl PdfDocument {
    /// Parse a PDF from memory, decrypting empty-password files when the
    /// configuration allows it.
    pub fn load(data: &[u8], config: &PdfConfig) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if !config.decrypt_empty_password || document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes as well
            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if document.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", document.get_pages().len());
        Ok(Self { document, raw_data })
    }

    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Number of the first page in document order.
    fn first_page_number(&self) -> Result<u32> {
        self.document
            .get_pages()
            .keys()
            .next()
            .copied()
            .ok_or(PdfError::NoPages)
    }

    /// Extract text from a single page (1-indexed) with lopdf.
    pub fn page_text(&self, page: u32) -> Result<String> {
        self.document
            .extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Extract text from the first page only.
    ///
    /// lopdf is tried first; when it fails or yields only whitespace and
    /// `fallback` is set, the first page of pdf-extract's per-page output
    /// is used instead.
    pub fn first_page_text(&self, fallback: bool) -> Result<String> {
        let page = self.first_page_number()?;

        match self.page_text(page) {
            Ok(text) if !fallback || !text.trim().is_empty() => return Ok(text),
            Ok(_) => debug!("lopdf found no text on page {}, trying pdf-extract", page),
            Err(e) if fallback => {
                warn!("lopdf could not read page {}: {}, trying pdf-extract", page, e)
            }
            Err(e) => return Err(e),
        }

        let pages = pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        Ok(pages.into_iter().next().unwrap_or_default())
    }
}

/// Text extractor for PDF files.
#[derive(Debug, Clone, Default)]
pub struct PdfExtractor {
    config: PdfConfig,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new(config: PdfConfig) -> Self {
        Self { config }
    }

    /// Whether `text` is below the configured minimum, counted in
    /// characters.
    fn is_sparse(&self, text: &str) -> bool {
        text.trim().chars().count() < self.config.min_text_length
    }
}

impl TextExtractor for PdfExtractor {
    fn first_page_text(&self, name: &str, data: &[u8]) -> Result<String> {
        let document = PdfDocument::load(data, &self.config)?;
        let text = document.first_page_text(self.config.fallback_to_pdf_extract)?;

        if self.is_sparse(&text) {
            warn!(
                "{}: first page has only {} characters of text, the page may be a scan without a text layer",
                name,
                text.trim().chars().count()
            );
        }

        Ok(text)
    }
}
