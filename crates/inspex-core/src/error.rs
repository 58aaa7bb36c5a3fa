//! Error types for the inspex-core library.
//!
//! Classification and field extraction never fail: an unrecognized document
//! is [`DocumentType::Unknown`](crate::DocumentType::Unknown) and a missing
//! field is an absent value. Errors only come from the I/O side of the
//! pipeline.

use thiserror::Error;

/// Main error type for the inspex library.
#[derive(Error, Debug)]
pub enum InspexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Result type for the inspex library.
pub type Result<T> = std::result::Result<T, InspexError>;
