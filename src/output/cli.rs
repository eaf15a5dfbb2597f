use crate::model::{BaselineInfo, BaselineStatus, Issue, Severity};
use crate::report::{ScanReport, Summary};
use anyhow::Result;
use std::fmt::Write;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Line")]
    location: String,
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Hint")]
    hint: String,
}

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Since")]
    since: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn print_cli_table(report: &ScanReport) -> Result<()> {
    print!("{}", render_table(report));
    Ok(())
}

pub fn render_table(report: &ScanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Scan completed at: {}",
        report.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out);

    let total = report.summary.total_issues;
    if total == 0 {
        let _ = writeln!(
            out,
            "No reportable features found in {} files.",
            report.summary.files_scanned
        );
    } else {
        let _ = writeln!(out, "Found {} features:", total);
        let _ = writeln!(out);

        let rows: Vec<IssueRow> = report
            .results
            .iter()
            .flat_map(|r| {
                let file = display_path(&r.file_path, &report.root);
                r.issues.iter().map(move |issue| issue_row(&file, issue))
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        let _ = writeln!(out, "{}", table);
    }

    let _ = writeln!(out);
    write_summary(&mut out, &report.summary);
    out
}

fn issue_row(file: &str, issue: &Issue) -> IssueRow {
    IssueRow {
        severity: format_severity(issue.severity),
        file: truncate(file, 40),
        location: issue.location(),
        feature: truncate(&issue.feature, 40),
        status: format!("{} {}", issue.status.icon(), issue.status),
        hint: hint(issue),
    }
}

fn hint(issue: &Issue) -> String {
    match (&issue.alternative_api, issue.polyfill_available) {
        (Some(alt), Some(true)) => truncate(&format!("polyfill, or {}", alt), 40),
        (Some(alt), _) => truncate(&format!("use {}", alt), 40),
        (None, Some(true)) => "polyfill available".to_string(),
        _ => "-".to_string(),
    }
}

pub fn print_feature_table(features: &[(String, BaselineInfo)]) -> Result<()> {
    print!("{}", render_feature_table(features));
    Ok(())
}

pub fn render_feature_table(features: &[(String, BaselineInfo)]) -> String {
    let rows: Vec<FeatureRow> = features
        .iter()
        .map(|(feature, info)| FeatureRow {
            feature: feature.clone(),
            status: format!("{} {}", info.status.icon(), info.status),
            since: since(info),
            description: info
                .description
                .as_deref()
                .map(|d| truncate(d, 50))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    format!("{}\n", Table::new(rows).with(Style::rounded()))
}

fn since(info: &BaselineInfo) -> String {
    match info.status {
        BaselineStatus::WidelyAvailable => info.high_date.clone(),
        BaselineStatus::NewlyAvailable => info.low_date.clone(),
        _ => None,
    }
    .unwrap_or_else(|| "-".to_string())
}

fn display_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .ok()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(path)
        .display()
        .to_string()
}

fn format_severity(severity: Option<Severity>) -> String {
    match severity {
        Some(Severity::High) => "\x1b[91mHIGH\x1b[0m".to_string(),
        Some(Severity::Medium) => "\x1b[33mMEDIUM\x1b[0m".to_string(),
        Some(Severity::Low) => "\x1b[32mLOW\x1b[0m".to_string(),
        None => "-".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn score_indicator(score: u8) -> &'static str {
    match score {
        90..=100 => "[Excellent]",
        70..=89 => "[Good]",
        50..=69 => "[Fair]",
        25..=49 => "[Poor]",
        _ => "[Critical]",
    }
}

fn write_summary(out: &mut String, summary: &Summary) {
    let _ = writeln!(out, "Summary:");
    let _ = writeln!(
        out,
        "  Files scanned: {} ({} with findings)",
        summary.files_scanned, summary.files_with_issues
    );

    if summary.total_issues > 0 {
        let counts = &summary.by_status;
        let _ = writeln!(
            out,
            "  By status: {} widely, {} newly, {} limited, {} unknown",
            counts.widely_available, counts.newly_available, counts.limited, counts.unknown
        );
        let severity = &summary.by_severity;
        let _ = writeln!(
            out,
            "  By severity: {} high, {} medium, {} low",
            severity.high, severity.medium, severity.low
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Compatibility Score: {}/100 {}",
        summary.compatibility_score,
        score_indicator(summary.compatibility_score)
    );
}
