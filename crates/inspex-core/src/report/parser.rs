//! Rule-driven report parser.

use std::time::Instant;

use tracing::{debug, trace};

use crate::models::config::ExtractionConfig;
use crate::models::record::{DocumentType, FieldValue, Record};

use super::classifier::classify;
use super::rules::{CaptureKind, FieldExtractor, RuleSet};

/// Result of report extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted record.
    pub record: Record,
    /// Extraction warnings.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for report parsing.
pub trait ReportParser {
    /// Classify and extract a page. `None` when the layout is not
    /// recognized.
    fn parse(&self, text: &str) -> Option<ExtractionResult>;

    /// Extract a page whose layout is already known.
    fn parse_as(&self, text: &str, document_type: DocumentType) -> ExtractionResult;
}

/// Apply the rule table of `document_type` to a page.
///
/// Every rule is searched independently and only its first match is used.
/// A rule that does not match leaves its field absent without affecting the
/// others. The function is pure: equal inputs give equal records.
pub fn extract(text: &str, document_type: DocumentType) -> Record {
    let rule_set = RuleSet::for_type(document_type);

    let fields = rule_set
        .rules()
        .iter()
        .map(|rule| {
            let value = rule.extract(text).map(|m| m.value);
            trace!(field = rule.field(), found = value.is_some(), "applied field rule");
            FieldValue::new(rule.field(), value)
        })
        .collect();

    Record::new(document_type, fields)
}

// Instant::now panics on wasm32-unknown-unknown
#[cfg(not(target_arch = "wasm32"))]
fn start_timer() -> Option<Instant> {
    Some(Instant::now())
}

#[cfg(target_arch = "wasm32")]
fn start_timer() -> Option<Instant> {
    None
}

/// Report parser backed by the fixed rule tables.
#[derive(Debug, Clone)]
pub struct RuleReportParser {
    /// Warn about fields whose rules did not match.
    warn_missing_fields: bool,
    /// Warn about single-line labels that occur more than once.
    warn_repeated_labels: bool,
}

impl RuleReportParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            warn_missing_fields: true,
            warn_repeated_labels: false,
        }
    }

    /// Create a parser from the extraction section of the configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_missing_field_warnings(config.warn_missing_fields)
            .with_repeated_label_warnings(config.warn_repeated_labels)
    }

    /// Set missing-field warnings.
    pub fn with_missing_field_warnings(mut self, warn: bool) -> Self {
        self.warn_missing_fields = warn;
        self
    }

    /// Set repeated-label warnings.
    pub fn with_repeated_label_warnings(mut self, warn: bool) -> Self {
        self.warn_repeated_labels = warn;
        self
    }

    fn repeated_label_warnings(&self, text: &str, document_type: DocumentType) -> Vec<String> {
        RuleSet::for_type(document_type)
            .rules()
            .iter()
            .filter(|rule| rule.kind() == CaptureKind::Line)
            .filter_map(|rule| {
                let count = rule.extract_all(text).len();
                (count > 1).then(|| {
                    format!(
                        "Label \"{}\" occurs {} times, using the first",
                        rule.field(),
                        count
                    )
                })
            })
            .collect()
    }
}

impl Default for RuleReportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportParser for RuleReportParser {
    fn parse(&self, text: &str) -> Option<ExtractionResult> {
        let document_type = classify(text);
        if !document_type.is_known() {
            debug!("No layout marker found in {} characters of text", text.len());
            return None;
        }
        Some(self.parse_as(text, document_type))
    }

    fn parse_as(&self, text: &str, document_type: DocumentType) -> ExtractionResult {
        let start = start_timer();
        let mut warnings = Vec::new();

        debug!(
            "Extracting {} from {} characters of text",
            document_type.description(),
            text.len()
        );

        let record = extract(text, document_type);

        if self.warn_missing_fields {
            warnings.extend(
                record
                    .missing_fields()
                    .into_iter()
                    .map(|field| format!("Could not extract {}", field)),
            );
        }

        if self.warn_repeated_labels {
            warnings.extend(self.repeated_label_warnings(text, document_type));
        }

        debug!(
            "Extracted {} of {} fields",
            record.fields().len() - record.missing_fields().len(),
            record.fields().len()
        );

        ExtractionResult {
            record,
            warnings,
            processing_time_ms: start.map_or(0, |t| t.elapsed().as_millis() as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STORE_PAGE: &str =
        "Jane Doe\nStore ID and Name\n001 - Main St\nTracker\nINS-2024\nInspector\nJohn Smith";

    const FULL_STORE_PAGE: &str = r#"ACME RETAIL
Pre-Opening Inspection
Store ID and Name
0042 - Harbour
City Mall
Tracker
TRK-77
Inspector
Mary Tan
Project Team PIC
Alan Lim
Project Team Present
Yes
Contractor PIC
Ben Koh
Contractor Present
No
Issue Date
02/03/2024
Inspection Date
01/03/2024
Report Date
03/03/2024
Handover Date
15/03/2024
"#;

    const AUDIT_PAGE: &str = r#"Document No.
DOC-55
Audit Title
Q1 Review
Site Name
North Depot
Location
12 Harbour Road
Block C
Contractor Present
Yes
Name
Acme Co
Project PIC Present
No
Name
Lee Wong
Inspected by
R. Singh
Inspection Date
10 Jan 2024
Prepared by
K. Ong
"#;

    #[test]
    fn test_extract_store_inspection_scenario() {
        let record = extract(STORE_PAGE, DocumentType::StoreInspection);

        assert_eq!(record.document_type(), DocumentType::StoreInspection);
        assert_eq!(record.get("Inspection"), Some("Jane Doe"));
        assert_eq!(record.get("Store ID and Name"), Some("001 - Main St"));
        assert_eq!(record.get("Tracker"), Some("INS-2024"));
        assert_eq!(record.get("Inspector"), Some("John Smith"));
        assert_eq!(
            record.missing_fields(),
            vec![
                "Project Team PIC",
                "Project Team Present",
                "Contractor PIC",
                "Contractor Present",
                "Issue Date",
                "Inspection Date",
                "Report Date",
                "Handover Date",
            ]
        );
    }

    #[test]
    fn test_extract_full_store_inspection() {
        let record = extract(FULL_STORE_PAGE, DocumentType::StoreInspection);

        assert_eq!(record.get("Inspection"), Some("Pre-Opening Inspection"));
        assert_eq!(record.get("Store ID and Name"), Some("0042 - Harbour City Mall"));
        assert_eq!(record.get("Tracker"), Some("TRK-77"));
        assert_eq!(record.get("Project Team PIC"), Some("Alan Lim"));
        assert_eq!(record.get("Project Team Present"), Some("Yes"));
        assert_eq!(record.get("Contractor PIC"), Some("Ben Koh"));
        assert_eq!(record.get("Contractor Present"), Some("No"));
        assert_eq!(record.get("Issue Date"), Some("02/03/2024"));
        assert_eq!(record.get("Inspection Date"), Some("01/03/2024"));
        assert_eq!(record.get("Report Date"), Some("03/03/2024"));
        assert_eq!(record.get("Handover Date"), Some("15/03/2024"));
        assert!(record.missing_fields().is_empty());
    }

    #[test]
    fn test_extract_audit() {
        let record = extract(AUDIT_PAGE, DocumentType::Audit);

        assert_eq!(record.get("Document No."), Some("DOC-55"));
        assert_eq!(record.get("Audit Title"), Some("Q1 Review"));
        assert_eq!(record.get("Site Name"), Some("North Depot"));
        assert_eq!(record.get("Location"), Some("12 Harbour Road Block C"));
        assert_eq!(record.get("Contractor Present"), Some("Yes"));
        assert_eq!(record.get("Contractor Name"), Some("Acme Co"));
        assert_eq!(record.get("Project PIC Present"), Some("No"));
        assert_eq!(record.get("Project PIC Name"), Some("Lee Wong"));
        assert_eq!(record.get("Inspected by"), Some("R. Singh"));
        assert_eq!(record.get("Inspection Date"), Some("10 Jan 2024"));
        assert_eq!(record.get("Prepared by"), Some("K. Ong"));
    }

    #[test]
    fn test_extract_audit_contractor_scenario() {
        let text = "Document No.\nDOC-55\nAudit Title\nQ1 Review\nContractor Present\nYes\nName\nAcme Co";
        let record = extract(text, DocumentType::Audit);

        assert_eq!(record.get("Contractor Present"), Some("Yes"));
        assert_eq!(record.get("Contractor Name"), Some("Acme Co"));
        assert_eq!(record.get("Project PIC Name"), None);
    }

    #[test]
    fn test_field_set_matches_rule_table() {
        let record = extract(AUDIT_PAGE, DocumentType::Audit);
        assert_eq!(
            record.columns(),
            RuleSet::for_type(DocumentType::Audit).columns()
        );
    }

    #[test]
    fn test_extract_is_deterministic() {
        let first = extract(FULL_STORE_PAGE, DocumentType::StoreInspection);
        let second = extract(FULL_STORE_PAGE, DocumentType::StoreInspection);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_and_garbage_text_yield_absent_fields() {
        for text in ["", "\u{0}\u{1}\u{fffd}\u{fffd}", "   \n\t  "] {
            let record = extract(text, DocumentType::Audit);
            assert_eq!(record.fields().len(), 11);
            assert!(record.fields().iter().all(|f| f.value.is_none()));
        }
    }

    #[test]
    fn test_unknown_type_has_no_fields() {
        let record = extract(AUDIT_PAGE, DocumentType::Unknown);
        assert!(record.fields().is_empty());
        assert_eq!(record.columns(), vec!["Document Type", "Source File"]);
    }

    #[test]
    fn test_parse_classifies_first() {
        let parser = RuleReportParser::new();

        let result = parser.parse(STORE_PAGE).unwrap();
        assert_eq!(result.record.document_type(), DocumentType::StoreInspection);
        assert_eq!(result.warnings.len(), 8);
        assert_eq!(result.warnings[0], "Could not extract Project Team PIC");

        assert!(parser.parse("nothing to see here").is_none());
    }

    #[test]
    fn test_parse_without_missing_field_warnings() {
        let parser = RuleReportParser::new().with_missing_field_warnings(false);
        let result = parser.parse(STORE_PAGE).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_repeated_label_warning() {
        let parser = RuleReportParser::from_config(&ExtractionConfig {
            warn_missing_fields: false,
            warn_repeated_labels: true,
        });
        let text = format!("{}\nInspector\nSomeone Else\n", STORE_PAGE);
        let result = parser.parse(&text).unwrap();

        assert_eq!(result.record.get("Inspector"), Some("John Smith"));
        assert_eq!(
            result.warnings,
            vec!["Label \"Inspector\" occurs 2 times, using the first".to_string()]
        );
    }
}
