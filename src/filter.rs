//! Multi-criteria filter engine.
//!
//! A record is visible when it satisfies every active dimension:
//!
//! | Dimension | Inactive when | Matches when |
//! |-----------|---------------|--------------|
//! | query     | empty         | normalized `code`, `title` or `system` contains the normalized query |
//! | model     | `Any`         | `model_codes` contains the exact model string |
//! | severity  | `Any`         | record severity is that level |
//!
//! Query matching is case- and diacritic-insensitive. Model codes are opaque
//! identifiers and compare exactly. Matching is total: a missing field never
//! matches an active dimension, it never errors.

use serde::{Serialize, Serializer};
use std::cmp::Ordering;

use crate::models::{DtcRecord, SeverityLevel};
use crate::normalize::{normalize_opt, normalize_text};

/// Model dimension of [`FilterCriteria`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ModelFilter {
    #[default]
    Any,
    Exact(String),
}

impl ModelFilter {
    /// `None`, an empty string, or `"any"` mean no constraint.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("") | Some("any") => Self::Any,
            Some(m) => Self::Exact(m.to_string()),
        }
    }
}

/// Severity dimension of [`FilterCriteria`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeverityFilter {
    #[default]
    Any,
    Level(SeverityLevel),
}

impl SeverityFilter {
    /// `0` is "no constraint"; `1..=3` select a level; anything else is `None`.
    pub fn from_number(n: i64) -> Option<Self> {
        if n == 0 {
            Some(Self::Any)
        } else {
            SeverityLevel::from_number(n).map(Self::Level)
        }
    }

    pub fn as_number(self) -> u8 {
        match self {
            Self::Any => 0,
            Self::Level(l) => l.as_number(),
        }
    }
}

// Serialized the way the presentation layer expects: `"any"` / model string,
// `0` / level number.
impl Serialize for ModelFilter {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Any => s.serialize_str("any"),
            Self::Exact(m) => s.serialize_str(m),
        }
    }
}

impl Serialize for SeverityFilter {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u8(self.as_number())
    }
}

/// The active filter state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub query: String,
    pub model: ModelFilter,
    pub severity: SeverityFilter,
}

impl FilterCriteria {
    /// True when no dimension constrains the result.
    pub fn is_unconstrained(&self) -> bool {
        normalize_text(&self.query).is_empty()
            && self.model == ModelFilter::Any
            && self.severity == SeverityFilter::Any
    }
}

/// Criteria with the query already normalized, for evaluating many records.
struct Matcher<'a> {
    query: String,
    model: &'a ModelFilter,
    severity: SeverityFilter,
}

impl<'a> Matcher<'a> {
    fn new(criteria: &'a FilterCriteria) -> Self {
        Self {
            query: normalize_text(&criteria.query),
            model: &criteria.model,
            severity: criteria.severity,
        }
    }

    fn matches(&self, record: &DtcRecord) -> bool {
        self.matches_query(record) && self.matches_model(record) && self.matches_severity(record)
    }

    fn matches_query(&self, record: &DtcRecord) -> bool {
        if self.query.is_empty() {
            return true;
        }
        [
            Some(record.code.as_str()),
            record.title.as_deref(),
            record.system.as_deref(),
        ]
        .into_iter()
        .any(|field| normalize_opt(field).contains(&self.query))
    }

    fn matches_model(&self, record: &DtcRecord) -> bool {
        match self.model {
            ModelFilter::Any => true,
            ModelFilter::Exact(m) => record.model_codes.iter().any(|c| c == m),
        }
    }

    fn matches_severity(&self, record: &DtcRecord) -> bool {
        match self.severity {
            SeverityFilter::Any => true,
            SeverityFilter::Level(level) => record.severity_level() == Some(level),
        }
    }
}

/// Does `record` satisfy every active dimension of `criteria`?
pub fn matches(record: &DtcRecord, criteria: &FilterCriteria) -> bool {
    Matcher::new(criteria).matches(record)
}

/// Collation key for a record code.
///
/// Codes compare first with accents and case folded away, then by
/// lowercase form (unaccented before accented), then by raw text, so
/// `Éa1 < Ea2 < p0100 < P0200` and distinct codes never tie.
struct CodeKey<'a> {
    folded: String,
    lower: String,
    raw: &'a str,
}

impl<'a> CodeKey<'a> {
    fn new(code: &'a str) -> Self {
        Self {
            folded: normalize_text(code),
            lower: code.to_lowercase(),
            raw: code,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.folded
            .cmp(&other.folded)
            .then_with(|| self.lower.cmp(&other.lower))
            .then_with(|| self.raw.cmp(other.raw))
    }
}

/// Ordering of the visible view: ascending by code, case- and
/// accent-aware.
pub fn compare_codes(a: &DtcRecord, b: &DtcRecord) -> Ordering {
    CodeKey::new(&a.code).compare(&CodeKey::new(&b.code))
}

/// Indices of the records matching `criteria`, sorted by code.
///
/// The sort is stable, so equal codes keep catalog order.
pub fn filter_sorted(records: &[DtcRecord], criteria: &FilterCriteria) -> Vec<usize> {
    let matcher = Matcher::new(criteria);
    let mut hits: Vec<(CodeKey<'_>, usize)> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| matcher.matches(r))
        .map(|(i, r)| (CodeKey::new(&r.code), i))
        .collect();
    hits.sort_by(|(a, _), (b, _)| a.compare(b));
    hits.into_iter().map(|(_, i)| i).collect()
}
