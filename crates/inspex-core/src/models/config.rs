//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};

/// Main configuration for the inspex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InspexConfig {
    /// PDF text extraction configuration.
    pub pdf: PdfConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Batch processing and export configuration.
    pub batch: BatchConfig,
}

/// PDF text extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Try to open encrypted PDFs with an empty password.
    pub decrypt_empty_password: bool,

    /// Use pdf-extract when lopdf yields no text for the first page.
    pub fallback_to_pdf_extract: bool,

    /// First-page text with fewer characters than this is logged as a
    /// likely scan without a text layer.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            decrypt_empty_password: true,
            fallback_to_pdf_extract: true,
            min_text_length: 20,
        }
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Report a warning for every field whose rule did not match.
    pub warn_missing_fields: bool,

    /// Report a warning when a label occurs more than once on the page.
    /// Only the first occurrence is ever used.
    pub warn_repeated_labels: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            warn_missing_fields: true,
            warn_repeated_labels: false,
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of parallel workers (1 = sequential).
    pub jobs: usize,

    /// File extensions picked up from archives and glob patterns.
    pub extensions: Vec<String>,

    /// Record unreadable documents as skipped instead of aborting.
    pub continue_on_error: bool,

    /// Output file stem for store inspection records.
    pub type_a_output: String,

    /// Output file stem for audit records.
    pub type_b_output: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jobs: 4,
            extensions: vec!["pdf".to_string()],
            continue_on_error: true,
            type_a_output: "inspection_summary_type_1".to_string(),
            type_b_output: "inspection_summary_type_2".to_string(),
        }
    }
}

impl BatchConfig {
    /// Whether a file name carries one of the configured extensions.
    pub fn accepts(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.ends_with(&format!(".{}", ext.trim_start_matches('.').to_lowercase())))
    }
}

impl InspexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
