//! On-disk cache for remote feature lookups.
//!
//! Entries are JSON files that expire after a TTL, so repeated scans do not
//! hit the feature-search service for identifiers it has already answered.
//! Only definite answers are written.
//!
//! # Cache Location
//!
//! - Linux: `~/.cache/codesense/`
//! - macOS: `~/Library/Caches/codesense/`
//! - Windows: `%LOCALAPPDATA%\codesense\`
//!
//! # Example
//!
//! ```
//! use codesense::Cache;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let cache = Cache::in_dir(dir.path());
//!
//! cache.set("webstatus_fetch", &"Widely available".to_string()).unwrap();
//! let value: Option<String> = cache.get("webstatus_fetch");
//! assert_eq!(value.as_deref(), Some("Widely available"));
//! ```

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Default cache TTL in hours.
pub const CACHE_TTL_HOURS: u64 = 24;

/// Returns the platform cache directory for codesense.
///
/// Falls back to `/tmp/codesense/` if no cache directory can be determined.
pub fn cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("codesense")
}

/// A file-based cache with TTL support.
pub struct Cache {
    dir: PathBuf,
    ttl: Duration,
}

impl Cache {
    /// Creates a cache in the platform directory with the default 24-hour TTL.
    pub fn new() -> Self {
        Self::with_ttl_hours(CACHE_TTL_HOURS)
    }

    /// Creates a cache in the platform directory with a custom TTL.
    pub fn with_ttl_hours(hours: u64) -> Self {
        Self {
            dir: cache_dir(),
            ttl: Duration::from_secs(hours * 3600),
        }
    }

    /// Creates a cache rooted at `dir` with the default TTL.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ttl: Duration::from_secs(CACHE_TTL_HOURS * 3600),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }

    /// Converts a cache key to a safe filename.
    fn cache_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe_key))
    }

    /// Returns `None` if the key doesn't exist, has expired, or no longer
    /// deserializes into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.cache_path(key);

        let modified = fs::metadata(&path).ok()?.modified().ok()?;
        if let Ok(elapsed) = SystemTime::now().duration_since(modified) {
            if elapsed > self.ttl {
                let _ = fs::remove_file(&path);
                return None;
            }
        }

        let content = fs::read_to_string(&path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let path = self.cache_path(key);
        let content = serde_json::to_string(value)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Removes every cached entry. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let mut removed = 0;
        if self.dir.exists() {
            for entry in fs::read_dir(&self.dir)?.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "json").unwrap_or(false)
                    && fs::remove_file(&path).is_ok()
                {
                    removed += 1;
                }
            }
        }
        Ok(removed)
    }
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}
