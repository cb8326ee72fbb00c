//! Core data models used throughout DTC Explorer.
//!
//! These types represent the canonical trouble-code records and the severity
//! levels that flow from the record normalizer through the filter engine and
//! out to the CLI and HTTP frontends.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three ordinal severity levels. Lower number = more severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SeverityLevel {
    High = 1,
    Medium = 2,
    Low = 3,
}

impl SeverityLevel {
    /// All levels, most severe first.
    pub const ALL: [SeverityLevel; 3] = [Self::High, Self::Medium, Self::Low];

    /// Maps a raw number onto a level. Anything outside `1..=3` is `None`.
    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Self::High),
            2 => Some(Self::Medium),
            3 => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_number(self) -> u8 {
        self as u8
    }

    /// Human-readable label, e.g. `"1 – High"`.
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "1 – High",
            Self::Medium => "2 – Medium",
            Self::Low => "3 – Low",
        }
    }
}

impl From<SeverityLevel> for u8 {
    fn from(level: SeverityLevel) -> u8 {
        level.as_number()
    }
}

impl TryFrom<u8> for SeverityLevel {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_number(i64::from(n)).ok_or_else(|| format!("invalid severity level: {}", n))
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_number())
    }
}

/// Canonical trouble-code record produced by the normalizer.
///
/// `code` is the primary key: unique within a catalog and never empty.
/// `severity` keeps the source number verbatim for display; use
/// [`DtcRecord::severity_level`] for filtering, which ignores values
/// outside the three known levels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DtcRecord {
    pub code: String,
    pub title: Option<String>,
    pub system: Option<String>,
    pub severity: Option<i64>,
    pub model_codes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria_activation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault_criteria: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_reaction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub harness_checks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diag_help: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub procedure_url: Option<String>,
}

impl DtcRecord {
    /// A record with only a code set. Mostly useful for tests.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: None,
            system: None,
            severity: None,
            model_codes: Vec::new(),
            criteria_activation: None,
            fault_criteria: None,
            system_reaction: None,
            harness_checks: None,
            diag_help: None,
            procedure_url: None,
        }
    }

    pub fn severity_level(&self) -> Option<SeverityLevel> {
        self.severity.and_then(SeverityLevel::from_number)
    }

    /// Short badge text: `G1`..`G3`, the verbatim number for unknown levels,
    /// or `G?` when absent.
    pub fn severity_badge(&self) -> String {
        match self.severity {
            Some(n) => format!("G{}", n),
            None => "G?".to_string(),
        }
    }

    /// Labeled detail fields that are present, in display order.
    pub fn details(&self) -> Vec<(&'static str, &str)> {
        [
            ("Activation criteria", &self.criteria_activation),
            ("Fault criteria", &self.fault_criteria),
            ("System reaction", &self.system_reaction),
            ("Harness checks", &self.harness_checks),
            ("Diagnostic help", &self.diag_help),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }
}
