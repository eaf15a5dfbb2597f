//! Project-level aggregation of scan results.

use crate::model::{BaselineStatus, ScanResult, Severity};
use crate::tables::TABLES_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Weight of a newly available issue in the compatibility score.
const NEWLY_WEIGHT: f64 = 0.7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub widely_available: usize,
    pub newly_available: usize,
    pub limited: usize,
    pub unknown: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub files_scanned: usize,
    pub files_with_issues: usize,
    pub total_issues: usize,
    pub by_status: StatusCounts,
    pub by_severity: SeverityCounts,
    /// 0-100, higher is more compatible.
    pub compatibility_score: u8,
}

impl Summary {
    pub fn from_results(results: &[ScanResult]) -> Self {
        let mut by_status = StatusCounts::default();
        let mut by_severity = SeverityCounts::default();

        for issue in results.iter().flat_map(|r| &r.issues) {
            match issue.status {
                BaselineStatus::WidelyAvailable => by_status.widely_available += 1,
                BaselineStatus::NewlyAvailable => by_status.newly_available += 1,
                BaselineStatus::Limited => by_status.limited += 1,
                BaselineStatus::Unknown => by_status.unknown += 1,
            }
            match issue.severity {
                Some(Severity::High) => by_severity.high += 1,
                Some(Severity::Medium) => by_severity.medium += 1,
                Some(Severity::Low) => by_severity.low += 1,
                None => {}
            }
        }

        let total_issues = results.iter().map(|r| r.issues.len()).sum();

        Self {
            files_scanned: results.len(),
            files_with_issues: results.iter().filter(|r| !r.issues.is_empty()).count(),
            total_issues,
            compatibility_score: compatibility_score(&by_status, total_issues),
            by_status,
            by_severity,
        }
    }

    /// Highest severity present, if any issue carries one.
    pub fn worst_severity(&self) -> Option<Severity> {
        if self.by_severity.high > 0 {
            Some(Severity::High)
        } else if self.by_severity.medium > 0 {
            Some(Severity::Medium)
        } else if self.by_severity.low > 0 {
            Some(Severity::Low)
        } else {
            None
        }
    }
}

fn compatibility_score(counts: &StatusCounts, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let weighted = counts.widely_available as f64 + NEWLY_WEIGHT * counts.newly_available as f64;
    (weighted / total as f64 * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Re-sorts each file's issues high, medium, low, then those without a
/// severity. Order within a severity is kept.
pub fn sort_by_severity(results: &mut [ScanResult]) {
    for result in results {
        result.issues.sort_by_key(|issue| match issue.severity {
            Some(Severity::High) => 0,
            Some(Severity::Medium) => 1,
            Some(Severity::Low) => 2,
            None => 3,
        });
    }
}

/// Everything a renderer needs about one project scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub scan_time: DateTime<Utc>,
    pub root: PathBuf,
    pub results: Vec<ScanResult>,
    pub summary: Summary,
    pub tables_version: u32,
}

impl ScanReport {
    pub fn new(root: impl Into<PathBuf>, results: Vec<ScanResult>) -> Self {
        let summary = Summary::from_results(&results);
        Self {
            scan_time: Utc::now(),
            root: root.into(),
            results,
            summary,
            tables_version: TABLES_VERSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BaselineInfo, FeatureOccurrence, Issue};

    fn issue(feature: &str, status: BaselineStatus) -> Issue {
        Issue::new(FeatureOccurrence::new(feature), &BaselineInfo::new(status))
            .with_severity(Severity::for_status(status))
    }

    #[test]
    fn test_empty_scan_scores_100() {
        let summary = Summary::from_results(&[]);
        assert_eq!(summary.files_scanned, 0);
        assert_eq!(summary.total_issues, 0);
        assert_eq!(summary.compatibility_score, 100);
        assert_eq!(summary.worst_severity(), None);
    }

    #[test]
    fn test_counts_and_score() {
        let results = vec![
            ScanResult::new(
                "a.js",
                vec![
                    issue("fetch", BaselineStatus::WidelyAvailable),
                    issue("css-property-gap", BaselineStatus::NewlyAvailable),
                ],
            ),
            ScanResult::new("b.js", Vec::new()),
            ScanResult::new(
                "c.css",
                vec![
                    issue("request-idle-callback", BaselineStatus::Limited),
                    issue("css-property-color", BaselineStatus::Unknown),
                ],
            ),
        ];

        let summary = Summary::from_results(&results);
        assert_eq!(summary.files_scanned, 3);
        assert_eq!(summary.files_with_issues, 2);
        assert_eq!(summary.total_issues, 4);
        assert_eq!(summary.by_status.widely_available, 1);
        assert_eq!(summary.by_status.unknown, 1);
        assert_eq!(summary.by_severity.high, 1);
        assert_eq!(summary.by_severity.medium, 1);
        assert_eq!(summary.by_severity.low, 1);
        // (1 + 0.7) / 4 = 42.5%
        assert_eq!(summary.compatibility_score, 43);
        assert_eq!(summary.worst_severity(), Some(Severity::High));
    }

    #[test]
    fn test_all_widely_scores_100() {
        let results = vec![ScanResult::new(
            "a.js",
            vec![issue("fetch", BaselineStatus::WidelyAvailable)],
        )];
        assert_eq!(Summary::from_results(&results).compatibility_score, 100);
    }

    #[test]
    fn test_sort_by_severity_is_stable() {
        let mut results = vec![ScanResult::new(
            "a.js",
            vec![
                issue("x", BaselineStatus::Unknown),
                issue("fetch", BaselineStatus::WidelyAvailable),
                issue("gap", BaselineStatus::NewlyAvailable),
                issue("first-limited", BaselineStatus::Limited),
                issue("second-limited", BaselineStatus::Limited),
            ],
        )];

        sort_by_severity(&mut results);
        let order: Vec<&str> = results[0].issues.iter().map(|i| i.feature.as_str()).collect();
        assert_eq!(
            order,
            vec!["first-limited", "second-limited", "gap", "fetch", "x"]
        );
    }

    #[test]
    fn test_report_json_shape() {
        let report = ScanReport::new("web", vec![ScanResult::new("web/a.js", Vec::new())]);
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("scanTime").is_some());
        assert_eq!(json["root"], "web");
        assert_eq!(json["summary"]["filesScanned"], 1);
        assert_eq!(json["summary"]["compatibilityScore"], 100);
        assert_eq!(json["tablesVersion"], TABLES_VERSION);
    }
}
