//! Analysis records returned for one uploaded legal document.
//!
//! Field names on the wire are camelCase to match the response-shape
//! contract in [`crate::schema`].

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Shown wherever an execution date was not found in the document.
pub const NOT_DETECTED: &str = "Not Detected";

/// Shared severity/priority scale: `LOW < MEDIUM < HIGH < CRITICAL`.
///
/// Values outside the scale are kept verbatim in [`RiskLevel::Unrecognized`]
/// so they can still be displayed as given.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
    Unrecognized(String),
}

/// Wire names of the known levels, in ascending order.
pub const LEVELS: &[&str] = &["LOW", "MEDIUM", "HIGH", "CRITICAL"];

impl RiskLevel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
            Self::Unrecognized(s) => s,
        }
    }

    /// Position on the scale, `None` for unrecognized values.
    pub fn rank(&self) -> Option<u8> {
        match self {
            Self::Low => Some(0),
            Self::Medium => Some(1),
            Self::High => Some(2),
            Self::Critical => Some(3),
            Self::Unrecognized(_) => None,
        }
    }

    /// HIGH or CRITICAL.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }

    pub fn is_recognized(&self) -> bool {
        self.rank().is_some()
    }
}

impl From<&str> for RiskLevel {
    fn from(s: &str) -> Self {
        match s {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            "CRITICAL" => Self::Critical,
            other => Self::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for RiskLevel {
    fn from(s: String) -> Self {
        match Self::from(s.as_str()) {
            Self::Unrecognized(_) => Self::Unrecognized(s),
            known => known,
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Unrecognized(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialOrd for RiskLevel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.rank(), other.rank()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ if self == other => Some(Ordering::Equal),
            _ => None,
        }
    }
}

/// One flagged clause with severity and remediation advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFinding {
    /// Quoted source text.
    pub clause: String,
    pub issue: String,
    pub severity: RiskLevel,
    pub recommendation: String,
}

/// One actionable follow-up task derived from the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Unique within one analysis only.
    pub id: String,
    pub action: String,
    pub description: String,
    pub priority: RiskLevel,
    /// Free-text actor label, e.g. "Attorney".
    pub role: String,
    pub is_completed: bool,
}

/// Structured result of one analysis call. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub document_type: String,
    pub summary: String,
    pub extracted_text: String,
    pub parties_involved: Vec<String>,
    #[serde(default)]
    pub execution_date: Option<String>,
    pub risks: Vec<RiskFinding>,
    pub checklist: Vec<ChecklistItem>,
}

impl DocumentAnalysis {
    /// Two-level reduction over the risk list: HIGH if any risk is HIGH or
    /// CRITICAL, otherwise LOW.
    pub fn overall_risk(&self) -> RiskLevel {
        if self.risks.iter().any(|r| r.severity.is_elevated()) {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    /// The execution date exactly as extracted, or [`NOT_DETECTED`].
    pub fn execution_date_label(&self) -> &str {
        match self.execution_date.as_deref() {
            Some(date) if !date.trim().is_empty() => date,
            _ => NOT_DETECTED,
        }
    }
}
