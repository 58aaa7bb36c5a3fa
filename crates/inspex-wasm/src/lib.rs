//! WASM bindings for inspection and audit report extraction.
//!
//! Text extraction from PDFs happens on the JavaScript side (e.g. pdf.js);
//! these bindings take the first-page text and return flat records.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use inspex_core::models::config::ExtractionConfig;
use inspex_core::report::{ReportParser, RuleReportParser};
use inspex_core::{classify as classify_text, DocumentType, RuleSet};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Classify first-page text: "type_1", "type_2" or "unknown".
#[wasm_bindgen]
pub fn classify(text: &str) -> String {
    classify_text(text).to_string()
}

/// Classify and extract first-page text.
///
/// Returns a plain object keyed by field name (absent fields are `null`),
/// or `null` when the text is not a recognized report.
#[wasm_bindgen]
pub fn extract_report(text: &str) -> Result<JsValue, JsValue> {
    match RuleReportParser::new().parse(text) {
        Some(result) => to_js(&result.record),
        None => Ok(JsValue::NULL),
    }
}

/// Export columns of a report type, metadata columns last.
#[wasm_bindgen]
pub fn field_names(document_type: &str) -> Result<Vec<String>, JsValue> {
    let document_type: DocumentType = document_type.parse().map_err(|e: String| js_error(&e))?;

    Ok(RuleSet::for_type(document_type)
        .columns()
        .into_iter()
        .map(String::from)
        .collect())
}

/// Report extractor class for browser use.
#[wasm_bindgen]
pub struct ReportExtractor {
    parser: RuleReportParser,
}

#[wasm_bindgen]
impl ReportExtractor {
    /// Create an extractor. `options` may carry `warn_missing_fields` and
    /// `warn_repeated_labels`; omitted keys keep their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<ReportExtractor, JsValue> {
        let config: ExtractionConfig = if options.is_undefined() || options.is_null() {
            ExtractionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(options).map_err(|e| js_error(&e.to_string()))?
        };

        Ok(Self {
            parser: RuleReportParser::from_config(&config),
        })
    }

    /// Extract a record, or `null` for unrecognized text.
    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        match self.parser.parse(text) {
            Some(result) => to_js(&result.record),
            None => Ok(JsValue::NULL),
        }
    }

    /// Extract a record together with warnings and timing.
    #[wasm_bindgen]
    pub fn extract_with_warnings(&self, text: &str) -> Result<JsValue, JsValue> {
        #[derive(Serialize)]
        struct ExtractResult {
            document_type: DocumentType,
            record: Option<inspex_core::Record>,
            warnings: Vec<String>,
            processing_time_ms: u64,
        }

        let output = match self.parser.parse(text) {
            Some(result) => ExtractResult {
                document_type: result.record.document_type(),
                record: Some(result.record),
                warnings: result.warnings,
                processing_time_ms: result.processing_time_ms,
            },
            None => ExtractResult {
                document_type: DocumentType::Unknown,
                record: None,
                warnings: Vec::new(),
                processing_time_ms: 0,
            },
        };

        to_js(&output)
    }
}

// Plain objects and `null` instead of Maps and `undefined`
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| js_error(&e.to_string()))
}

fn js_error(message: &str) -> JsValue {
    js_sys::Error::new(message).into()
}
