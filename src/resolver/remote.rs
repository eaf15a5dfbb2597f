use super::{BaselineSource, Lookup};
use crate::cache::Cache;
use crate::model::{BaselineInfo, BaselineStatus, BaselineTier};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Public feature-search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.webstatus.dev/v1/features";

/// Hard limit on a single search request, body included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<RemoteFeature>,
}

#[derive(Deserialize)]
struct RemoteFeature {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    baseline: Option<RemoteBaseline>,
    #[serde(default)]
    spec: Option<RemoteSpec>,
}

#[derive(Deserialize)]
struct RemoteBaseline {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    low_date: Option<String>,
    #[serde(default)]
    high_date: Option<String>,
}

#[derive(Deserialize)]
struct RemoteSpec {
    #[serde(default)]
    links: Vec<RemoteLink>,
}

#[derive(Deserialize)]
struct RemoteLink {
    #[serde(default, alias = "link")]
    url: Option<String>,
}

impl RemoteFeature {
    fn into_info(self) -> BaselineInfo {
        let (tier, low_date, high_date) = match self.baseline {
            Some(b) => (
                b.status.as_deref().and_then(tier_for_status),
                b.low_date,
                b.high_date,
            ),
            None => (None, None, None),
        };

        let mut info =
            BaselineInfo::new(BaselineStatus::from_tier(tier)).with_dates(low_date, high_date);
        if let Some(name) = self.name {
            info = info.with_description(name);
        }
        if let Some(url) = self
            .spec
            .and_then(|s| s.links.into_iter().find_map(|link| link.url))
        {
            info = info.with_spec(url);
        }
        info
    }
}

fn tier_for_status(status: &str) -> Option<BaselineTier> {
    match status {
        "widely" => Some(BaselineTier::High),
        "newly" => Some(BaselineTier::Low),
        "limited" => Some(BaselineTier::NotBaseline),
        _ => None,
    }
}

/// Search queries tried in order until one returns features.
fn query_variants(identifier: &str) -> [String; 3] {
    [
        format!("id:{}", identifier),
        format!("name:{}", identifier),
        identifier.replace(['-', '_'], " "),
    ]
}

/// Best-effort lookup against the feature-search web service.
pub struct RemoteSource {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    cache: Option<Cache>,
}

impl RemoteSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            cache: None,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache(mut self, cache: Cache) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn search(&self, query: &str) -> Lookup {
        let request = async {
            let response = self
                .client
                .get(&self.endpoint)
                .query(&[("q", query)])
                .header("Accept", "application/json")
                .send()
                .await?
                .error_for_status()?;
            response.json::<SearchResponse>().await
        };

        match tokio::time::timeout(self.timeout, request).await {
            Err(_) => Lookup::TimedOut,
            Ok(Err(e)) => Lookup::Failed(e.to_string()),
            Ok(Ok(body)) => match body.data.into_iter().next() {
                Some(feature) => Lookup::Found(feature.into_info()),
                None => Lookup::NoResult,
            },
        }
    }
}

impl Default for RemoteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaselineSource for RemoteSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn attempt(&self, identifier: &str) -> Lookup {
        let cache_key = format!("webstatus_{}", identifier);

        if let Some(info) = self
            .cache
            .as_ref()
            .and_then(|c| c.get::<BaselineInfo>(&cache_key))
        {
            return Lookup::Found(info);
        }

        let mut outcome = Lookup::NoResult;

        for query in query_variants(identifier) {
            match self.search(&query).await {
                Lookup::Found(info) => {
                    if info.status.is_definite() {
                        if let Some(cache) = &self.cache {
                            let _ = cache.set(&cache_key, &info);
                        }
                    }
                    return Lookup::Found(info);
                }
                Lookup::NoResult => {}
                soft => {
                    debug!(identifier, query = %query, outcome = ?soft.kind(), "Feature search failed");
                    outcome = soft;
                }
            }
        }

        outcome
    }
}
