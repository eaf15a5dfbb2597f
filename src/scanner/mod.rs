//! Project scanning.
//!
//! The [`Scanner`] walks a project, runs the matching extractor over each
//! file, resolves every occurrence through a shared [`Resolver`], and keeps
//! the issues the configured [`BaselineLevel`] asks for.
//!
//! # Example
//!
//! ```no_run
//! use codesense::resolver::Resolver;
//! use codesense::scanner::{ScanOptions, Scanner};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let resolver = Arc::new(Resolver::offline()?);
//!     let scanner = Scanner::new(ScanOptions::default(), resolver);
//!
//!     for result in scanner.scan_project(Path::new("./web")).await? {
//!         println!("{}: {} issues", result.file_path.display(), result.issues.len());
//!     }
//!     Ok(())
//! }
//! ```

mod walk;

use crate::error::ScanError;
use crate::extractor::{extractor_for, FeatureExtractor};
use crate::model::{BaselineStatus, Issue, ScanResult, Severity};
use crate::resolver::Resolver;
use crate::tables;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walk::PathFilter;

const DEFAULT_EXTENSIONS: &[&str] = &[
    "js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts", "css", "scss", "less", "html", "htm",
];

const DEFAULT_EXCLUDES: &[&str] = &[
    "**/node_modules/**",
    "**/dist/**",
    "**/build/**",
    "**/.git/**",
];

/// Reporting threshold: which statuses end up in scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineLevel {
    /// Report only features that are not Baseline yet.
    Widely,
    /// Report everything that is not widely available.
    Newly,
    /// Report everything.
    All,
}

impl BaselineLevel {
    pub fn reports(&self, status: BaselineStatus) -> bool {
        match self {
            BaselineLevel::All => true,
            BaselineLevel::Newly => status != BaselineStatus::WidelyAvailable,
            BaselineLevel::Widely => status == BaselineStatus::Limited,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BaselineLevel::Widely => "widely",
            BaselineLevel::Newly => "newly",
            BaselineLevel::All => "all",
        }
    }
}

impl std::fmt::Display for BaselineLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BaselineLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "widely" => Ok(BaselineLevel::Widely),
            "newly" => Ok(BaselineLevel::Newly),
            "all" => Ok(BaselineLevel::All),
            _ => Err(format!(
                "Unknown baseline level: {}. Use: widely, newly, all",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    /// `None` reports every resolved occurrence.
    pub baseline_level: Option<BaselineLevel>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_patterns: DEFAULT_EXTENSIONS
                .iter()
                .map(|ext| format!("**/*.{}", ext))
                .collect(),
            exclude_patterns: DEFAULT_EXCLUDES.iter().map(|p| p.to_string()).collect(),
            baseline_level: None,
        }
    }
}

/// Cooperative cancellation flag, checked between files.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }
}

pub struct Scanner {
    options: ScanOptions,
    resolver: Arc<Resolver>,
}

impl Scanner {
    pub fn new(options: ScanOptions, resolver: Arc<Resolver>) -> Self {
        Self { options, resolver }
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    pub async fn scan_project(&self, root: &Path) -> Result<Vec<ScanResult>, ScanError> {
        self.scan_project_with_cancel(root, &CancellationToken::new())
            .await
    }

    /// Scans every matching file under `root`, one result per file.
    ///
    /// A missing root is an error. Files that cannot be read are logged and
    /// left out; they never abort the scan.
    pub async fn scan_project_with_cancel(
        &self,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<Vec<ScanResult>, ScanError> {
        if !root.exists() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }
        if root.is_file() {
            return Ok(vec![self.scan_file(root).await?]);
        }

        let files = self.enumerate_files(root)?;
        info!(root = %root.display(), files = files.len(), "Scanning project");

        let mut results = Vec::with_capacity(files.len());
        for file in &files {
            if cancel.is_cancelled() {
                info!(scanned = results.len(), "Scan cancelled");
                break;
            }
            match self.scan_file(file).await {
                Ok(result) => results.push(result),
                Err(e) => warn!(path = %file.display(), error = %e, "Skipping file"),
            }
        }

        info!(
            files = results.len(),
            issues = results.iter().map(|r| r.issues.len()).sum::<usize>(),
            "Scan finished"
        );
        Ok(results)
    }

    pub async fn scan_file(&self, path: &Path) -> Result<ScanResult, ScanError> {
        let extractor =
            extractor_for(path).ok_or_else(|| ScanError::UnsupportedFile(path.to_path_buf()))?;
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ScanError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let issues = self.analyze(&content, path, extractor.as_ref()).await;
        Ok(ScanResult::new(path, issues))
    }

    /// Files a project scan of `root` would visit, sorted.
    pub fn enumerate_files(&self, root: &Path) -> Result<Vec<PathBuf>, ScanError> {
        let filter = PathFilter::new(
            &self.options.include_patterns,
            &self.options.exclude_patterns,
        )?;
        walk::enumerate(root, &filter)
    }

    async fn analyze(
        &self,
        content: &str,
        path: &Path,
        extractor: &dyn FeatureExtractor,
    ) -> Vec<Issue> {
        let occurrences = extractor.extract(content, path);
        debug!(
            path = %path.display(),
            extractor = extractor.name(),
            occurrences = occurrences.len(),
            "Extracted"
        );

        let mut issues = Vec::new();
        for occurrence in occurrences {
            let info = self.resolver.resolve(&occurrence.identifier).await;
            if !self.reports(info.status) {
                continue;
            }
            issues.push(enrich(Issue::new(occurrence, &info)));
        }
        issues
    }

    fn reports(&self, status: BaselineStatus) -> bool {
        self.options
            .baseline_level
            .map_or(true, |level| level.reports(status))
    }
}

fn enrich(issue: Issue) -> Issue {
    let severity = Severity::for_status(issue.status);
    let polyfill = tables::has_polyfill(&issue.feature);
    let alternative = tables::alternative_for(&issue.feature).map(str::to_string);
    issue.with_severity(severity).with_hints(polyfill, alternative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn scanner(level: Option<BaselineLevel>) -> Scanner {
        let options = ScanOptions {
            baseline_level: level,
            ..ScanOptions::default()
        };
        Scanner::new(options, Arc::new(Resolver::offline().unwrap()))
    }

    #[test]
    fn test_threshold_policy() {
        use BaselineStatus::*;

        assert!(BaselineLevel::All.reports(WidelyAvailable));
        assert!(BaselineLevel::Newly.reports(NewlyAvailable));
        assert!(BaselineLevel::Newly.reports(Unknown));
        assert!(!BaselineLevel::Newly.reports(WidelyAvailable));
        assert!(BaselineLevel::Widely.reports(Limited));
        assert!(!BaselineLevel::Widely.reports(NewlyAvailable));
        assert!(!BaselineLevel::Widely.reports(Unknown));
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("Newly".parse::<BaselineLevel>(), Ok(BaselineLevel::Newly));
        assert!("sometimes".parse::<BaselineLevel>().is_err());
        assert_eq!(BaselineLevel::All.to_string(), "all");
    }

    #[test]
    fn test_cancellation_token_is_shared() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!token.is_cancelled());
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_fetch_is_widely_available() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("app.js"),
            "fetch('https://api.example.com/data');\n",
        )
        .unwrap();

        let results = scanner(None).scan_project(dir.path()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].issues.len(), 1);

        let issue = &results[0].issues[0];
        assert_eq!(issue.feature, "fetch");
        assert_eq!(issue.status, BaselineStatus::WidelyAvailable);
        assert_eq!((issue.line, issue.column), (Some(1), Some(1)));
        assert_eq!(issue.severity, Some(Severity::Low));
        assert_eq!(issue.polyfill_available, Some(true));
    }

    #[tokio::test]
    async fn test_gap_is_newly_available() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("style.css"), ".foo { gap: 1rem; }").unwrap();

        let results = scanner(None).scan_project(dir.path()).await.unwrap();
        let issues = &results[0].issues;
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].feature, "css-property-gap");
        assert_eq!(issues[0].status, BaselineStatus::NewlyAvailable);
        assert_eq!(issues[0].severity, Some(Severity::Medium));
        assert_eq!(issues[0].polyfill_available, Some(false));
        assert_eq!(
            issues[0].alternative_api.as_deref(),
            Some("margins on child elements")
        );
    }

    #[tokio::test]
    async fn test_threshold_filters_but_keeps_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("style.css"), ".foo { gap: 1rem; }").unwrap();

        let results = scanner(Some(BaselineLevel::Widely))
            .scan_project(dir.path())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].issues.is_empty());

        let results = scanner(Some(BaselineLevel::All))
            .scan_project(dir.path())
            .await
            .unwrap();
        assert_eq!(results[0].issues.len(), 1);
    }

    #[tokio::test]
    async fn test_newly_threshold_drops_widely_features() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("page.html"),
            "<dialog open>\n  <img loading=\"lazy\" data-role=\"hero\">\n</dialog>\n",
        )
        .unwrap();

        let results = scanner(Some(BaselineLevel::Newly))
            .scan_project(dir.path())
            .await
            .unwrap();
        let features: Vec<&str> = results[0]
            .issues
            .iter()
            .map(|i| i.feature.as_str())
            .collect();
        assert!(!features.contains(&"html-element-dialog"));
        assert!(results[0]
            .issues
            .iter()
            .all(|i| i.status != BaselineStatus::WidelyAvailable));
    }

    #[tokio::test]
    async fn test_unknown_features_have_no_severity() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.css"), ".a { color: red; }").unwrap();

        let results = scanner(None).scan_project(dir.path()).await.unwrap();
        let issue = &results[0].issues[0];
        assert_eq!(issue.feature, "css-property-color");
        assert_eq!(issue.status, BaselineStatus::Unknown);
        assert_eq!(issue.severity, None);
    }

    #[tokio::test]
    async fn test_dependency_directories_are_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/lib")).unwrap();
        fs::create_dir_all(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("node_modules/lib/index.js"), "fetch('/');").unwrap();
        fs::write(dir.path().join("src/app.js"), "fetch('/');").unwrap();

        let results = scanner(None).scan_project(dir.path()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].file_path.ends_with("src/app.js"));
    }

    #[tokio::test]
    async fn test_every_file_gets_a_result_in_path_order() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b")).unwrap();
        fs::write(dir.path().join("b/c.css"), "").unwrap();
        fs::write(dir.path().join("a.js"), "const x = 1;").unwrap();

        let results = scanner(None).scan_project(dir.path()).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].file_path.ends_with("a.js"));
        assert!(results[1].file_path.ends_with("c.css"));
        assert!(results.iter().all(|r| r.issues.is_empty()));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_skipped() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("bad.js"), b"\xff\xfe\x00\x9f").unwrap();
        fs::write(dir.path().join("good.js"), "fetch('/');").unwrap();

        let results = scanner(None).scan_project(dir.path()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].file_path.ends_with("good.js"));
    }

    #[tokio::test]
    async fn test_missing_root_is_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope");

        let err = scanner(None).scan_project(&missing).await.unwrap_err();
        assert!(matches!(err, ScanError::RootNotFound(_)));
    }

    #[tokio::test]
    async fn test_file_root_is_scanned_alone() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("one.ts");
        fs::write(&file, "new AbortController();").unwrap();

        let results = scanner(None).scan_project(&file).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].issues[0].feature, "abortcontroller");
    }

    #[tokio::test]
    async fn test_unsupported_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("notes.md");
        fs::write(&file, "fetch").unwrap();

        let err = scanner(None).scan_file(&file).await.unwrap_err();
        assert!(matches!(err, ScanError::UnsupportedFile(_)));
    }

    #[tokio::test]
    async fn test_cancelled_scan_stops_between_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "fetch('/');").unwrap();
        fs::write(dir.path().join("b.js"), "fetch('/');").unwrap();

        let token = CancellationToken::new();
        token.cancel();
        let results = scanner(None)
            .scan_project_with_cancel(dir.path(), &token)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_repeated_scans_are_identical() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("app.js"),
            "navigator.clipboard.writeText('x');\nnew ResizeObserver(cb);",
        )
        .unwrap();

        let scanner = scanner(None);
        let first = scanner.scan_project(dir.path()).await.unwrap();
        let second = scanner.scan_project(dir.path()).await.unwrap();
        assert_eq!(first, second);
    }
}
