use super::{BaselineSource, Lookup};
use crate::model::{BaselineInfo, BaselineStatus, BaselineTier};
use crate::tables;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Months, NaiveDate, Utc};
use serde::de::IgnoredAny;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

const BUNDLED_COMPAT: &str = include_str!("../../data/browser-compat.json");

/// Months a feature must be interoperable before it is widely available.
const WIDELY_AFTER_MONTHS: u32 = 30;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct CompatData {
    browsers: HashMap<String, BrowserData>,
    features: HashMap<String, CompatFeature>,
}

#[derive(Debug, Deserialize)]
struct BrowserData {
    releases: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CompatFeature {
    version_added: HashMap<String, VersionAdded>,
}

/// A version string, `"preview"`, or `false`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VersionAdded {
    Version(String),
    Flag(IgnoredAny),
}

impl VersionAdded {
    fn released_version(&self) -> Option<&str> {
        match self {
            VersionAdded::Version(v) if v != "preview" => Some(v.trim_start_matches('≤')),
            _ => None,
        }
    }
}

/// Derives a baseline status from per-browser support facts for identifiers
/// with a known compat key.
pub struct ComputedSource {
    data: CompatData,
    today: Option<NaiveDate>,
}

impl ComputedSource {
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_COMPAT).context("Failed to load bundled browser data")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            data: serde_json::from_str(json)?,
            today: None,
        })
    }

    /// Fixes the date used to decide between newly and widely available.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    fn release_date(&self, browser: &str, version: &str) -> Option<NaiveDate> {
        let date = self.data.browsers.get(browser)?.releases.get(version)?;
        NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
    }

    /// Computes the status for a compat key. `None` when the key or a
    /// release date is missing from the data.
    pub fn compute(&self, compat_key: &str) -> Option<BaselineInfo> {
        let feature = self.data.features.get(compat_key)?;

        let mut support = BTreeMap::new();
        let mut latest: Option<NaiveDate> = None;
        let mut all_supported = true;

        for browser in tables::CORE_BROWSERS {
            let Some(version) = feature
                .version_added
                .get(*browser)
                .and_then(VersionAdded::released_version)
            else {
                all_supported = false;
                continue;
            };
            support.insert(browser.to_string(), version.to_string());

            if all_supported {
                let released = self.release_date(browser, version)?;
                latest = Some(latest.map_or(released, |d| d.max(released)));
            }
        }

        let info = match (all_supported, latest) {
            (true, Some(low)) => {
                let high = low.checked_add_months(Months::new(WIDELY_AFTER_MONTHS))?;
                if high <= self.today() {
                    BaselineInfo::new(BaselineStatus::from_tier(Some(BaselineTier::High)))
                        .with_dates(Some(format_date(low)), Some(format_date(high)))
                } else {
                    BaselineInfo::new(BaselineStatus::from_tier(Some(BaselineTier::Low)))
                        .with_dates(Some(format_date(low)), None)
                }
            }
            _ => BaselineInfo::new(BaselineStatus::from_tier(Some(BaselineTier::NotBaseline))),
        };

        Some(
            info.with_support(support)
                .with_description(format!("Computed from browser support for {}", compat_key)),
        )
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[async_trait]
impl BaselineSource for ComputedSource {
    fn name(&self) -> &'static str {
        "computed"
    }

    async fn attempt(&self, identifier: &str) -> Lookup {
        let Some(key) = tables::compat_key(identifier) else {
            return Lookup::NoResult;
        };
        match self.compute(key) {
            Some(info) => Lookup::Found(info),
            None => Lookup::NoResult,
        }
    }
}
