//! Declarative field rules for report pages.
//!
//! Every field is described by a name and a [`CaptureKind`]; the kind is
//! compiled into a single regex with exactly one capture group, and all
//! rules are evaluated by the same [`FieldExtractor`] implementation.

pub mod patterns;

pub use patterns::{AUDIT_MARKER, STORE_INSPECTION_MARKER};

use regex::Regex;

use crate::models::record::{DocumentType, DOCUMENT_TYPE_COLUMN, SOURCE_FILE_COLUMN};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence of the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched field value with its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Position of the capture in source text.
    pub position: Option<(usize, usize)>,
    /// Raw captured text, before normalization.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }
}

/// Whitespace run between labels and values. The ASCII information
/// separators U+001C..U+001F count as whitespace, as they do for
/// [`collapse_whitespace`].
const WS: &str = r"[\s\x1C-\x1F]+";

/// How a field value is located relative to its labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    /// Remainder of the line after the field's own label.
    Line,
    /// Everything between the field's label and `until`, possibly over
    /// several lines. The shortest such span wins.
    Bounded { until: &'static str },
    /// The line right before `anchor`.
    Preceding { anchor: &'static str },
    /// The line after `sub_label`, where `sub_label` follows the line after
    /// `section`. Lets one sub-label appear under several sections.
    Compound {
        section: &'static str,
        sub_label: &'static str,
    },
}

impl CaptureKind {
    /// Regex source for a field with the given label.
    pub fn pattern(&self, label: &str) -> String {
        match *self {
            CaptureKind::Line => format!(r"{}{WS}([^\n]+)", regex::escape(label)),
            CaptureKind::Bounded { until } => format!(
                r"{}{WS}([\s\S]+?){WS}{}",
                regex::escape(label),
                regex::escape(until)
            ),
            CaptureKind::Preceding { anchor } => {
                format!(r"([^\n]+){WS}{}", regex::escape(anchor))
            }
            CaptureKind::Compound { section, sub_label } => format!(
                r"{}{WS}[^\n]+{WS}{}{WS}([^\n]+)",
                regex::escape(section),
                regex::escape(sub_label)
            ),
        }
    }

    /// Short name used in listings.
    pub fn name(&self) -> &'static str {
        match self {
            CaptureKind::Line => "line",
            CaptureKind::Bounded { .. } => "bounded",
            CaptureKind::Preceding { .. } => "preceding",
            CaptureKind::Compound { .. } => "compound",
        }
    }

    /// Whether the captured value may legitimately span several lines.
    pub fn is_multiline(&self) -> bool {
        matches!(self, CaptureKind::Bounded { .. })
    }
}

/// A compiled extraction rule for one field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    field: &'static str,
    kind: CaptureKind,
    pattern: Regex,
}

impl FieldRule {
    /// Compile a rule. The field name doubles as its label.
    pub fn new(field: &'static str, kind: CaptureKind) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&kind.pattern(field))?;
        Ok(Self {
            field,
            kind,
            pattern,
        })
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn kind(&self) -> CaptureKind {
        self.kind
    }

    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// Labels that must be present for this rule to match, in order.
    pub fn anchors(&self) -> Vec<&'static str> {
        match self.kind {
            CaptureKind::Line => vec![self.field],
            CaptureKind::Bounded { until } => vec![self.field, until],
            CaptureKind::Preceding { anchor } => vec![anchor],
            CaptureKind::Compound { section, sub_label } => vec![section, sub_label],
        }
    }

    fn to_match(&self, caps: &regex::Captures<'_>) -> Option<ExtractionMatch<String>> {
        let capture = caps.get(1)?;
        Some(
            ExtractionMatch::new(collapse_whitespace(capture.as_str()), capture.as_str())
                .with_position(capture.start(), capture.end()),
        )
    }
}

impl FieldExtractor for FieldRule {
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.pattern
            .captures(text)
            .and_then(|caps| self.to_match(&caps))
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| self.to_match(&caps))
            .collect()
    }
}

/// Trim and collapse every whitespace run (line breaks and the ASCII
/// information separators included) into a single ASCII space.
pub fn collapse_whitespace(value: &str) -> String {
    value
        .split(is_separator)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// The fixed, ordered rule table of one document type.
#[derive(Debug)]
pub struct RuleSet {
    document_type: DocumentType,
    rules: Vec<FieldRule>,
}

impl RuleSet {
    pub(crate) fn new(document_type: DocumentType, rules: Vec<FieldRule>) -> Self {
        Self {
            document_type,
            rules,
        }
    }

    /// Rule table for a document type. `Unknown` has an empty table.
    pub fn for_type(document_type: DocumentType) -> &'static RuleSet {
        match document_type {
            DocumentType::StoreInspection => &patterns::STORE_INSPECTION_RULES,
            DocumentType::Audit => &patterns::AUDIT_RULES,
            DocumentType::Unknown => &patterns::UNKNOWN_RULES,
        }
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&FieldRule> {
        self.rules.iter().find(|r| r.field == field)
    }

    /// Field names in rule order.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.field).collect()
    }

    /// Export columns: field names, then the metadata columns.
    pub fn columns(&self) -> Vec<&'static str> {
        self.rules
            .iter()
            .map(|r| r.field)
            .chain([DOCUMENT_TYPE_COLUMN, SOURCE_FILE_COLUMN])
            .collect()
    }
}
