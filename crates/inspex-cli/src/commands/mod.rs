//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;
pub mod rules;

use std::path::Path;

use tracing::debug;

use inspex_core::models::config::{InspexConfig, PdfConfig};
use inspex_core::pdf::{self, PdfExtractor, PlainTextExtractor, TextExtractor};

/// Load the configuration named on the command line, else the user's
/// config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InspexConfig> {
    if let Some(path) = config_path {
        return Ok(InspexConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        debug!("Using configuration from {}", default_path.display());
        Ok(InspexConfig::from_file(&default_path)?)
    } else {
        Ok(InspexConfig::default())
    }
}

/// Whether a document name is a plain-text page dump.
pub fn is_text_file(name: &str) -> bool {
    name.to_lowercase().ends_with(".txt")
}

/// Text extractor choosing the PDF or plain-text path by file name.
pub struct FileTextExtractor {
    pdf: PdfExtractor,
}

impl FileTextExtractor {
    pub fn new(config: PdfConfig) -> Self {
        Self {
            pdf: PdfExtractor::new(config),
        }
    }
}

impl TextExtractor for FileTextExtractor {
    fn first_page_text(&self, name: &str, data: &[u8]) -> pdf::Result<String> {
        if is_text_file(name) {
            PlainTextExtractor.first_page_text(name, data)
        } else {
            self.pdf.first_page_text(name, data)
        }
    }
}
