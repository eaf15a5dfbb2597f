use super::{BaselineSource, Lookup};
use crate::model::{BaselineInfo, BaselineStatus, BaselineTier};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;

const BUNDLED_FEATURES: &str = include_str!("../../data/web-features.json");

/// Prefixes stripped (at most one) before fuzzy comparison.
const NAMESPACE_PREFIXES: &[&str] = &["css-", "html-", "js-", "navigator-", "window."];

/// Maximum edit distance accepted by the fuzzy match.
const MAX_DISTANCE: usize = 2;

#[derive(Debug, Deserialize)]
struct Dataset {
    features: BTreeMap<String, FeatureEntry>,
}

#[derive(Debug, Deserialize)]
struct FeatureEntry {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    spec: Option<String>,
    #[serde(default)]
    compat_features: Vec<String>,
    #[serde(default)]
    status: Option<EntryStatus>,
}

#[derive(Debug, Deserialize)]
struct EntryStatus {
    baseline: BaselineValue,
    #[serde(default)]
    baseline_low_date: Option<String>,
    #[serde(default)]
    baseline_high_date: Option<String>,
    #[serde(default)]
    support: BTreeMap<String, String>,
}

/// `"high"`, `"low"` or `false`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BaselineValue {
    Tier(String),
    Flag(bool),
}

impl BaselineValue {
    fn tier(&self) -> Option<BaselineTier> {
        match self {
            BaselineValue::Tier(t) if t == "high" => Some(BaselineTier::High),
            BaselineValue::Tier(t) if t == "low" => Some(BaselineTier::Low),
            BaselineValue::Flag(false) => Some(BaselineTier::NotBaseline),
            _ => None,
        }
    }
}

impl FeatureEntry {
    /// `None` when the entry carries no usable baseline value.
    fn baseline_info(&self) -> Option<BaselineInfo> {
        let status = self.status.as_ref()?;
        let tier = status.baseline.tier()?;

        let mut info = BaselineInfo::new(BaselineStatus::from_tier(Some(tier)))
            .with_dates(
                status.baseline_low_date.clone(),
                status.baseline_high_date.clone(),
            )
            .with_support(status.support.clone());
        if let Some(description) = &self.description {
            info = info.with_description(description.clone());
        }
        if let Some(spec) = &self.spec {
            info = info.with_spec(spec.clone());
        }
        Some(info)
    }

    fn terms<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> {
        std::iter::once(key)
            .chain(std::iter::once(self.name.as_str()))
            .chain(self.compat_features.iter().map(String::as_str))
    }
}

/// Looks identifiers up in the bundled web-features subset.
pub struct LocalSource {
    features: BTreeMap<String, FeatureEntry>,
}

impl LocalSource {
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_FEATURES).context("Failed to load bundled feature dataset")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        Ok(Self {
            features: dataset.features,
        })
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Exact key match, then the first fuzzy match in key order.
    pub fn lookup(&self, identifier: &str) -> Option<BaselineInfo> {
        if let Some(info) = self
            .features
            .get(identifier)
            .and_then(FeatureEntry::baseline_info)
        {
            return Some(info);
        }

        let wanted = normalize(identifier);
        if wanted.is_empty() {
            return None;
        }

        self.features
            .iter()
            .filter(|(key, entry)| {
                entry
                    .terms(key)
                    .map(normalize)
                    .any(|term| is_close(&wanted, &term))
            })
            .find_map(|(_, entry)| entry.baseline_info())
    }
}

#[async_trait]
impl BaselineSource for LocalSource {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn attempt(&self, identifier: &str) -> Lookup {
        match self.lookup(identifier) {
            Some(info) => Lookup::Found(info),
            None => Lookup::NoResult,
        }
    }
}

/// Lower-cases, strips one namespace prefix, removes `-`/`_` and a
/// trailing `()`.
pub(crate) fn normalize(identifier: &str) -> String {
    let lower = identifier.to_lowercase();
    let stripped = NAMESPACE_PREFIXES
        .iter()
        .find_map(|p| lower.strip_prefix(p))
        .unwrap_or(&lower);
    let stripped = stripped.strip_suffix("()").unwrap_or(stripped);

    stripped.chars().filter(|c| *c != '-' && *c != '_').collect()
}

fn is_close(wanted: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    term.contains(wanted)
        || wanted.contains(term)
        || strsim::levenshtein(wanted, term) <= MAX_DISTANCE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundled() -> LocalSource {
        LocalSource::bundled().unwrap()
    }

    #[test]
    fn test_bundled_dataset_loads() {
        let source = bundled();
        assert!(!source.is_empty());
        assert_eq!(source.len(), 43);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("css-property-gap"), "propertygap");
        assert_eq!(normalize("navigator-clipboard"), "clipboard");
        assert_eq!(normalize("window.requestAnimationFrame"), "requestanimationframe");
        assert_eq!(normalize("structuredClone()"), "structuredclone");
        assert_eq!(normalize("Web_Share"), "webshare");
    }

    #[test]
    fn test_exact_match() {
        let info = bundled().lookup("fetch").unwrap();
        assert_eq!(info.status, BaselineStatus::WidelyAvailable);
        assert!(info.low_date.is_some());
        assert!(info.support.as_ref().unwrap().contains_key("safari"));
    }

    #[test]
    fn test_fuzzy_match_by_substring() {
        let info = bundled().lookup("css-property-gap").unwrap();
        assert_eq!(info.status, BaselineStatus::NewlyAvailable);

        let info = bundled().lookup("navigator-clipboard").unwrap();
        assert_eq!(info.status, BaselineStatus::NewlyAvailable);
    }

    #[test]
    fn test_fuzzy_match_by_edit_distance() {
        let exact = bundled().lookup("fetch").unwrap();
        let typo = bundled().lookup("fecth").unwrap();
        assert_eq!(typo, exact);
    }

    #[test]
    fn test_limited_entries() {
        let info = bundled().lookup("request-idle-callback").unwrap();
        assert_eq!(info.status, BaselineStatus::Limited);
    }

    #[test]
    fn test_unknown_identifiers() {
        let source = bundled();
        assert!(source.lookup("totally-fake-api-that-does-not-exist").is_none());
        assert!(source.lookup("non-existent-feature").is_none());
        assert!(source.lookup("").is_none());
    }

    #[test]
    fn test_first_match_in_key_order_wins() {
        let json = r#"{ "features": {
            "b-widget": { "name": "Widget", "status": { "baseline": false } },
            "a-widget": { "name": "Widget", "status": { "baseline": "low" } }
        } }"#;
        let source = LocalSource::from_json(json).unwrap();
        let info = source.lookup("widgets").unwrap();
        assert_eq!(info.status, BaselineStatus::NewlyAvailable);
    }

    #[test]
    fn test_entries_without_baseline_are_skipped() {
        let json = r#"{ "features": {
            "a-widget": { "name": "Widget" },
            "b-widget": { "name": "Widget", "status": { "baseline": "high" } }
        } }"#;
        let source = LocalSource::from_json(json).unwrap();
        assert_eq!(
            source.lookup("a-widget").unwrap().status,
            BaselineStatus::WidelyAvailable
        );
    }

    #[tokio::test]
    async fn test_attempt_reports_no_result() {
        let source = bundled();
        assert_eq!(source.attempt("zzzz-qqqq-xxxx").await, Lookup::NoResult);
        assert!(matches!(source.attempt("fetch").await, Lookup::Found(_)));
    }
}
