use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Baseline availability of a web platform feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BaselineStatus {
    #[serde(rename = "Widely available")]
    WidelyAvailable,
    #[serde(rename = "Newly available")]
    NewlyAvailable,
    #[serde(rename = "Limited")]
    Limited,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl BaselineStatus {
    /// Maps a data source's tri-state baseline value onto a status.
    ///
    /// Every resolver source goes through this function, so `high`/`low`/`false`
    /// from the bundled dataset, computed browser data, and the remote service
    /// all classify identically. Missing data is `Unknown`.
    pub fn from_tier(tier: Option<BaselineTier>) -> Self {
        match tier {
            Some(BaselineTier::High) => BaselineStatus::WidelyAvailable,
            Some(BaselineTier::Low) => BaselineStatus::NewlyAvailable,
            Some(BaselineTier::NotBaseline) => BaselineStatus::Limited,
            None => BaselineStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineStatus::WidelyAvailable => "Widely available",
            BaselineStatus::NewlyAvailable => "Newly available",
            BaselineStatus::Limited => "Limited",
            BaselineStatus::Unknown => "Unknown",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            BaselineStatus::WidelyAvailable => "✅",
            BaselineStatus::NewlyAvailable => "⚠️",
            BaselineStatus::Limited => "❌",
            BaselineStatus::Unknown => "❓",
        }
    }

    /// Risk rank, lowest first. `Unknown` has no rank.
    pub fn risk(&self) -> Option<u8> {
        match self {
            BaselineStatus::WidelyAvailable => Some(0),
            BaselineStatus::NewlyAvailable => Some(1),
            BaselineStatus::Limited => Some(2),
            BaselineStatus::Unknown => None,
        }
    }

    /// True for every status except `Unknown`.
    pub fn is_definite(&self) -> bool {
        *self != BaselineStatus::Unknown
    }
}

impl std::fmt::Display for BaselineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Tri-state baseline value as reported by a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaselineTier {
    /// Interoperable for long enough to be widely available.
    High,
    /// Recently became interoperable.
    Low,
    /// Not supported by every core browser.
    NotBaseline,
}

/// Resolved baseline data for one feature identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaselineInfo {
    pub status: BaselineStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high_date: Option<String>,
    /// Browser id to first supporting version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<String>,
}

impl BaselineInfo {
    pub fn new(status: BaselineStatus) -> Self {
        Self {
            status,
            low_date: None,
            high_date: None,
            support: None,
            description: None,
            spec: None,
        }
    }

    /// The fallback answer when no source knows the identifier.
    pub fn unknown(identifier: &str) -> Self {
        Self::new(BaselineStatus::Unknown)
            .with_description(format!("No baseline information found for {}", identifier))
    }

    pub fn with_dates(mut self, low_date: Option<String>, high_date: Option<String>) -> Self {
        self.low_date = low_date;
        self.high_date = high_date;
        self
    }

    pub fn with_support(mut self, support: BTreeMap<String, String>) -> Self {
        self.support = Some(support);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_spec(mut self, spec: impl Into<String>) -> Self {
        self.spec = Some(spec.into());
        self
    }
}
