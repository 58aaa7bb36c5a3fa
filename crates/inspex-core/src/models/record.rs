//! Extracted report records.

use std::fmt;
use std::str::FromStr;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;

/// Export column holding the resolved document type.
pub const DOCUMENT_TYPE_COLUMN: &str = "Document Type";

/// Export column holding the collaborator-supplied document identifier.
pub const SOURCE_FILE_COLUMN: &str = "Source File";

/// Layout family of a report page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
pub enum DocumentType {
    /// Store inspection report, marked by "Store ID and Name".
    #[serde(rename = "type_1")]
    StoreInspection,
    /// Audit report, marked by "Document No.".
    #[serde(rename = "type_2")]
    Audit,
    /// Neither marker present. Never exported.
    #[serde(rename = "unknown")]
    Unknown,
}

impl DocumentType {
    /// Both recognized layouts, in export order.
    pub const KNOWN: [DocumentType; 2] = [DocumentType::StoreInspection, DocumentType::Audit];

    /// Label written into the "Document Type" column.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::StoreInspection => "type_1",
            DocumentType::Audit => "type_2",
            DocumentType::Unknown => "unknown",
        }
    }

    /// Human readable name.
    pub fn description(&self) -> &'static str {
        match self {
            DocumentType::StoreInspection => "store inspection report",
            DocumentType::Audit => "audit report",
            DocumentType::Unknown => "unrecognized document",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, DocumentType::Unknown)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "type_1" | "type1" | "a" | "inspection" | "store_inspection" => {
                Ok(DocumentType::StoreInspection)
            }
            "type_2" | "type2" | "b" | "audit" => Ok(DocumentType::Audit),
            "unknown" => Ok(DocumentType::Unknown),
            other => Err(format!("unknown document type: {}", other)),
        }
    }
}

/// A single extracted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    /// Field name from the rule table.
    pub name: &'static str,
    /// Normalized value, `None` when the rule did not match.
    pub value: Option<String>,
}

impl FieldValue {
    pub fn new(name: &'static str, value: Option<String>) -> Self {
        Self { name, value }
    }
}

/// Flat record extracted from one report page.
///
/// The field set is exactly the rule set of `document_type`, in rule order,
/// followed by the two metadata columns. Records are built once by the
/// extraction engine and only read afterwards; the source identifier is
/// attached by the batch layer through [`Record::with_source_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    document_type: DocumentType,
    fields: Vec<FieldValue>,
    source_file: Option<String>,
}

impl Record {
    pub(crate) fn new(document_type: DocumentType, fields: Vec<FieldValue>) -> Self {
        Self {
            document_type,
            fields,
            source_file: None,
        }
    }

    /// Attach the identifier of the document this record came from.
    pub fn with_source_file(mut self, source_file: impl Into<String>) -> Self {
        self.source_file = Some(source_file.into());
        self
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// Extracted fields in rule order.
    pub fn fields(&self) -> &[FieldValue] {
        &self.fields
    }

    /// Look up a field by name. `None` if the name is not part of this
    /// record's rule set.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Value of a field, `None` when absent or not part of the rule set.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(|f| f.value.as_deref())
    }

    /// Names of the fields whose rules did not match.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.value.is_none())
            .map(|f| f.name)
            .collect()
    }

    /// Export header: field names followed by the metadata columns.
    pub fn columns(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .map(|f| f.name)
            .chain([DOCUMENT_TYPE_COLUMN, SOURCE_FILE_COLUMN])
            .collect()
    }

    /// Export row aligned with [`Record::columns`]. Absent values become
    /// empty cells.
    pub fn row(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.value.clone().unwrap_or_default())
            .chain([
                self.document_type.as_str().to_string(),
                self.source_file.clone().unwrap_or_default(),
            ])
            .collect()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 2))?;
        for field in &self.fields {
            map.serialize_entry(field.name, &field.value)?;
        }
        map.serialize_entry(DOCUMENT_TYPE_COLUMN, &self.document_type)?;
        map.serialize_entry(SOURCE_FILE_COLUMN, &self.source_file)?;
        map.end()
    }
}
