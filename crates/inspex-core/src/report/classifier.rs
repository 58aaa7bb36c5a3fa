use crate::models::record::DocumentType;

use super::rules::{AUDIT_MARKER, STORE_INSPECTION_MARKER};

/// Decide which layout a page belongs to.
///
/// The audit marker is checked first, so a page carrying both markers is an
/// audit report. A page with neither marker is `Unknown`; that is an
/// ordinary outcome, not an error.
pub fn classify(text: &str) -> DocumentType {
    if text.contains(AUDIT_MARKER) {
        DocumentType::Audit
    } else if text.contains(STORE_INSPECTION_MARKER) {
        DocumentType::StoreInspection
    } else {
        DocumentType::Unknown
    }
}
