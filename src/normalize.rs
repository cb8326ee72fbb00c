//! Record and text normalization.
//!
//! Raw records arrive as loosely-typed JSON: fields may be missing, numbers
//! may be strings, and `model_code` may be a scalar or an array. The record
//! normalizer coerces every item into a canonical [`DtcRecord`] and drops the
//! ones that have no usable code. Everything downstream works only on the
//! canonical shape.
//!
//! The text normalizer produces the comparison form used by query matching:
//! compatibility-decomposed (NFKD), combining marks removed, lower-cased.
//! `"Café"` and `"cafe"` normalize to the same string.

use serde_json::{Map, Value};
use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::DtcRecord;

/// Output of [`normalize_records`].
#[derive(Debug, Clone, Default)]
pub struct Normalized {
    /// Valid records in input order.
    pub records: Vec<DtcRecord>,
    /// Items dropped for lacking a usable code or repeating an earlier one.
    pub dropped: usize,
}

/// Comparison-safe form of `s`. Idempotent.
pub fn normalize_text(s: &str) -> String {
    s.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Like [`normalize_text`], treating an absent value as empty.
pub fn normalize_opt(s: Option<&str>) -> String {
    s.map(normalize_text).unwrap_or_default()
}

/// Coerce a sequence of raw items into canonical records.
///
/// Items that are not objects, have no code, or repeat a code already seen
/// are skipped and counted in [`Normalized::dropped`].
pub fn normalize_records(raw: &[Value]) -> Normalized {
    let mut out = Normalized::default();
    let mut seen: HashSet<String> = HashSet::new();

    for item in raw {
        let record = match item.as_object().and_then(normalize_record) {
            Some(r) => r,
            None => {
                out.dropped += 1;
                continue;
            }
        };
        if !seen.insert(record.code.clone()) {
            out.dropped += 1;
            continue;
        }
        out.records.push(record);
    }

    out
}

fn normalize_record(obj: &Map<String, Value>) -> Option<DtcRecord> {
    let code = field(obj, &["dtc", "code"]).and_then(scalar_string)?;

    Some(DtcRecord {
        code,
        title: field(obj, &["title"]).and_then(scalar_string),
        system: field(obj, &["system"]).and_then(scalar_string),
        severity: field(obj, &["severity"]).and_then(coerce_severity),
        model_codes: field(obj, &["model_code", "model_codes"])
            .map(widen_models)
            .unwrap_or_default(),
        criteria_activation: field(obj, &["criteria_activation"]).and_then(scalar_string),
        fault_criteria: field(obj, &["fault_criteria"]).and_then(scalar_string),
        system_reaction: field(obj, &["system_reaction"]).and_then(scalar_string),
        harness_checks: field(obj, &["harness_checks"]).and_then(scalar_string),
        diag_help: field(obj, &["diag_help"]).and_then(scalar_string),
        procedure_url: field(obj, &["oem_procedure_url", "procedure_url"])
            .and_then(scalar_string),
    })
}

/// First non-null value among the given key aliases.
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// Strings are trimmed, numbers stringified. Empty or non-scalar is `None`.
fn scalar_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Widen a scalar-or-array model field to a sequence, preserving order and
/// dropping empty or falsy entries (including numeric zero) and duplicates.
fn widen_models(value: &Value) -> Vec<String> {
    let items: Vec<&Value> = match value {
        Value::Array(arr) => arr.iter().collect(),
        other => vec![other],
    };

    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|v| !is_zero(v))
        .filter_map(scalar_string)
        .filter(|m| seen.insert(m.clone()))
        .collect()
}

fn is_zero(value: &Value) -> bool {
    value.as_f64().is_some_and(|n| n == 0.0)
}

/// Numbers round to the nearest integer; numeric strings are parsed first.
/// Anything else is unspecified.
fn coerce_severity(value: &Value) -> Option<i64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.is_finite() {
        Some(n.round() as i64)
    } else {
        None
    }
}
