//! Baseline resolution.
//!
//! A [`Resolver`] answers "what is the Baseline status of this feature
//! identifier?" by asking an ordered chain of [`BaselineSource`]s:
//!
//! | Source | Data | Scope |
//! |--------|------|-------|
//! | [`LocalSource`] | bundled web-features subset | exact key, then fuzzy match |
//! | [`ComputedSource`] | bundled browser support facts | identifiers with a compat key |
//! | [`RemoteSource`] | feature-search web service | anything, best effort |
//!
//! The first definite answer wins and is cached for the lifetime of the
//! resolver. Resolution never fails: identifiers nobody knows resolve to
//! [`BaselineStatus::Unknown`].
//!
//! # Example
//!
//! ```
//! use codesense::resolver::Resolver;
//! use codesense::model::BaselineStatus;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let resolver = Resolver::offline().unwrap();
//! let info = resolver.resolve("fetch").await;
//! assert_eq!(info.status, BaselineStatus::WidelyAvailable);
//! # });
//! ```

mod computed;
mod local;
mod remote;

pub use computed::ComputedSource;
pub use local::LocalSource;
pub use remote::RemoteSource;

use crate::cache::Cache;
use crate::config::Config;
use crate::model::{BaselineInfo, BaselineStatus};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Outcome of asking one source about one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(BaselineInfo),
    /// The source has no opinion on this identifier.
    NoResult,
    TimedOut,
    Failed(String),
}

impl Lookup {
    pub fn kind(&self) -> LookupKind {
        match self {
            Lookup::Found(_) => LookupKind::Found,
            Lookup::NoResult => LookupKind::NoResult,
            Lookup::TimedOut => LookupKind::TimedOut,
            Lookup::Failed(_) => LookupKind::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Found,
    NoResult,
    TimedOut,
    Failed,
}

/// A source of baseline data. Implementations report errors as
/// [`Lookup::Failed`] or [`Lookup::TimedOut`] and never panic or raise.
#[async_trait]
pub trait BaselineSource: Send + Sync {
    fn name(&self) -> &'static str;
    async fn attempt(&self, identifier: &str) -> Lookup;
}

/// Process-lifetime memo of resolved identifiers, owned by one resolver.
#[derive(Default)]
pub struct ResolverCache {
    entries: RwLock<HashMap<String, BaselineInfo>>,
}

impl ResolverCache {
    pub async fn get(&self, identifier: &str) -> Option<BaselineInfo> {
        self.entries.read().await.get(identifier).cloned()
    }

    pub async fn insert(&self, identifier: &str, info: BaselineInfo) {
        self.entries
            .write()
            .await
            .insert(identifier.to_string(), info);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// One source consulted during a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub source: &'static str,
    pub outcome: LookupKind,
}

/// A resolved identifier together with how it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub info: BaselineInfo,
    /// Source that produced a definite answer, if any.
    pub source: Option<&'static str>,
    pub cached: bool,
    pub attempts: Vec<Attempt>,
}

impl Resolution {
    /// True when some source could not answer because of a timeout or error,
    /// so an `Unknown` here means "could not determine" rather than
    /// "nobody knows this identifier".
    pub fn had_transient_failure(&self) -> bool {
        self.attempts
            .iter()
            .any(|a| matches!(a.outcome, LookupKind::TimedOut | LookupKind::Failed))
    }
}

pub struct Resolver {
    sources: Vec<Box<dyn BaselineSource>>,
    cache: ResolverCache,
}

impl Resolver {
    pub fn new(sources: Vec<Box<dyn BaselineSource>>) -> Self {
        Self {
            sources,
            cache: ResolverCache::default(),
        }
    }

    /// Local dataset followed by computed browser data. Never touches the
    /// network.
    pub fn offline() -> Result<Self> {
        Ok(Self::new(vec![
            Box::new(LocalSource::bundled()?),
            Box::new(ComputedSource::bundled()?),
        ]))
    }

    /// The offline chain, plus the remote source when the config enables it.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut sources: Vec<Box<dyn BaselineSource>> = vec![
            Box::new(LocalSource::bundled()?),
            Box::new(ComputedSource::bundled()?),
        ];

        if config.remote_lookup {
            let remote = RemoteSource::new()
                .with_timeout(Duration::from_secs(config.remote_timeout_secs))
                .with_cache(Cache::with_ttl_hours(config.cache_ttl_hours));
            sources.push(Box::new(remote));
        }

        Ok(Self::new(sources))
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    pub fn cache(&self) -> &ResolverCache {
        &self.cache
    }

    pub async fn resolve(&self, identifier: &str) -> BaselineInfo {
        self.resolve_detailed(identifier).await.info
    }

    pub async fn resolve_detailed(&self, identifier: &str) -> Resolution {
        if let Some(info) = self.cache.get(identifier).await {
            return Resolution {
                info,
                source: None,
                cached: true,
                attempts: Vec::new(),
            };
        }

        let mut attempts = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let lookup = source.attempt(identifier).await;
            attempts.push(Attempt {
                source: source.name(),
                outcome: lookup.kind(),
            });

            match lookup {
                Lookup::Found(info) if info.status.is_definite() => {
                    debug!(identifier, source = source.name(), status = %info.status, "Resolved");
                    self.cache.insert(identifier, info.clone()).await;
                    return Resolution {
                        info,
                        source: Some(source.name()),
                        cached: false,
                        attempts,
                    };
                }
                Lookup::Found(_) | Lookup::NoResult => {}
                Lookup::TimedOut => {
                    debug!(identifier, source = source.name(), "Lookup timed out");
                }
                Lookup::Failed(reason) => {
                    warn!(identifier, source = source.name(), %reason, "Lookup failed");
                }
            }
        }

        let info = BaselineInfo::unknown(identifier);
        let resolution = Resolution {
            info,
            source: None,
            cached: false,
            attempts,
        };

        if resolution
            .attempts
            .iter()
            .all(|a| a.outcome == LookupKind::NoResult)
        {
            self.cache.insert(identifier, resolution.info.clone()).await;
        }

        debug!(identifier, status = %BaselineStatus::Unknown, "No source knows identifier");
        resolution
    }
}
