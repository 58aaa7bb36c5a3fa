//! Rule tables for the two known report layouts.

use lazy_static::lazy_static;

use super::CaptureKind::{Bounded, Compound, Line, Preceding};
use super::{CaptureKind, FieldRule, RuleSet};
use crate::models::record::DocumentType;

/// Marker phrase of store inspection reports.
pub const STORE_INSPECTION_MARKER: &str = "Store ID and Name";

/// Marker phrase of audit reports.
pub const AUDIT_MARKER: &str = "Document No.";

const STORE_INSPECTION_FIELDS: [(&str, CaptureKind); 12] = [
    ("Inspection", Preceding { anchor: STORE_INSPECTION_MARKER }),
    ("Store ID and Name", Bounded { until: "Tracker" }),
    ("Tracker", Bounded { until: "Inspector" }),
    ("Inspector", Line),
    ("Project Team PIC", Line),
    ("Project Team Present", Line),
    ("Contractor PIC", Line),
    ("Contractor Present", Line),
    ("Issue Date", Line),
    ("Inspection Date", Line),
    ("Report Date", Line),
    ("Handover Date", Line),
];

const AUDIT_FIELDS: [(&str, CaptureKind); 11] = [
    ("Document No.", Line),
    ("Audit Title", Line),
    ("Site Name", Line),
    ("Location", Bounded { until: "Contractor Present" }),
    ("Contractor Present", Line),
    ("Contractor Name", Compound { section: "Contractor Present", sub_label: "Name" }),
    ("Project PIC Present", Line),
    ("Project PIC Name", Compound { section: "Project PIC Present", sub_label: "Name" }),
    ("Inspected by", Line),
    ("Inspection Date", Line),
    ("Prepared by", Line),
];

fn compile(document_type: DocumentType, fields: &[(&'static str, CaptureKind)]) -> RuleSet {
    let rules = fields
        .iter()
        .map(|&(field, kind)| FieldRule::new(field, kind).unwrap())
        .collect();
    RuleSet::new(document_type, rules)
}

lazy_static! {
    pub static ref STORE_INSPECTION_RULES: RuleSet =
        compile(DocumentType::StoreInspection, &STORE_INSPECTION_FIELDS);

    pub static ref AUDIT_RULES: RuleSet = compile(DocumentType::Audit, &AUDIT_FIELDS);

    pub static ref UNKNOWN_RULES: RuleSet = RuleSet::new(DocumentType::Unknown, Vec::new());
}
