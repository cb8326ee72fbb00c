//! Facet extraction.
//!
//! Facets are always derived from the full record set, never from the
//! filtered view, so picking a model does not shrink the model list.

use std::collections::HashSet;

use crate::models::DtcRecord;

/// Distinct model identifiers across `records`, in first-seen order.
pub fn extract_models(records: &[DtcRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut models = Vec::new();
    for code in records.iter().flat_map(|r| r.model_codes.iter()) {
        if seen.insert(code.as_str()) {
            models.push(code.clone());
        }
    }
    models
}
