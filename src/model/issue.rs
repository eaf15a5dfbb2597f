use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::{BaselineInfo, BaselineStatus};

/// One detected use of a candidate web API in source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureOccurrence {
    /// Canonical feature key, e.g. `fetch`, `navigator-clipboard`, `css-property-gap`.
    pub identifier: String,
    /// 1-based line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    /// 1-based column.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl FeatureOccurrence {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            line: None,
            column: None,
            context: None,
        }
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Severity of a reported status. `Unknown` carries none.
    pub fn for_status(status: BaselineStatus) -> Option<Self> {
        match status {
            BaselineStatus::Limited => Some(Severity::High),
            BaselineStatus::NewlyAvailable => Some(Severity::Medium),
            BaselineStatus::WidelyAvailable => Some(Severity::Low),
            BaselineStatus::Unknown => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A feature occurrence joined with its resolved baseline status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub feature: String,
    pub status: BaselineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polyfill_available: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternative_api: Option<String>,
}

impl Issue {
    pub fn new(occurrence: FeatureOccurrence, info: &BaselineInfo) -> Self {
        Self {
            feature: occurrence.identifier,
            status: info.status,
            line: occurrence.line,
            column: occurrence.column,
            context: occurrence.context,
            severity: None,
            polyfill_available: None,
            alternative_api: None,
        }
    }

    pub fn with_severity(mut self, severity: Option<Severity>) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_hints(mut self, polyfill_available: bool, alternative_api: Option<String>) -> Self {
        self.polyfill_available = Some(polyfill_available);
        self.alternative_api = alternative_api;
        self
    }

    /// `line:column`, or `-` when the position is unknown.
    pub fn location(&self) -> String {
        match (self.line, self.column) {
            (Some(line), Some(column)) => format!("{}:{}", line, column),
            (Some(line), None) => line.to_string(),
            _ => "-".to_string(),
        }
    }
}

/// Issues reported for a single file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub file_path: PathBuf,
    pub issues: Vec<Issue>,
}

impl ScanResult {
    pub fn new(file_path: impl Into<PathBuf>, issues: Vec<Issue>) -> Self {
        Self {
            file_path: file_path.into(),
            issues,
        }
    }
}
