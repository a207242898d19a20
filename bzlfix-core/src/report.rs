//! Run report (`report.json`) and its markdown rendering (`summary.md`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const REPORT_SCHEMA: &str = "bzlfix.report.v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ToolInfo {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInfo {
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl RunInfo {
    pub fn between(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Self {
        let duration_ms = (ended_at - started_at).num_milliseconds().max(0) as u64;
        Self {
            started_at,
            ended_at,
            duration_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunMode {
    Write,
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Unchanged,
    Fixed,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCounts {
    pub unchanged: u64,
    pub fixed: u64,
    pub failed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVerdict {
    pub status: ReportStatus,
    pub counts: ReportCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// Location of the serialized tree.
    pub path: String,
    /// The build file the tree describes, when it could be read.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_file: Option<String>,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applied: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixReport {
    pub schema: String,
    pub tool: ToolInfo,
    pub run: RunInfo,
    pub mode: RunMode,
    pub fixers: Vec<String>,
    pub verdict: ReportVerdict,
    pub files: Vec<FileReport>,
}

impl FixReport {
    /// Builds the report, deriving counts and verdict from the per-file entries.
    ///
    /// Any failed input fails the run. In check mode a tree that would change is a warning.
    pub fn new(
        tool: ToolInfo,
        run: RunInfo,
        mode: RunMode,
        fixers: Vec<String>,
        files: Vec<FileReport>,
    ) -> Self {
        let mut counts = ReportCounts::default();
        for f in &files {
            match f.status {
                FileStatus::Unchanged => counts.unchanged += 1,
                FileStatus::Fixed => counts.fixed += 1,
                FileStatus::Failed => counts.failed += 1,
            }
        }

        let status = if counts.failed > 0 {
            ReportStatus::Fail
        } else if mode == RunMode::Check && counts.fixed > 0 {
            ReportStatus::Warn
        } else {
            ReportStatus::Pass
        };

        Self {
            schema: REPORT_SCHEMA.to_string(),
            tool,
            run,
            mode,
            fixers,
            verdict: ReportVerdict { status, counts },
            files,
        }
    }
}

pub fn render_summary_md(report: &FixReport) -> String {
    let counts = &report.verdict.counts;
    let mut out = String::new();
    out.push_str("# bzlfix summary\n\n");
    out.push_str(&format!("- Mode: `{}`\n", mode_label(report.mode)));
    out.push_str(&format!(
        "- Status: `{}`\n",
        status_label(report.verdict.status)
    ));
    out.push_str(&format!(
        "- Files: {} (fixed {}, unchanged {}, failed {})\n",
        report.files.len(),
        counts.fixed,
        counts.unchanged,
        counts.failed
    ));
    if report.fixers.is_empty() {
        out.push_str("- Fixers: _none enabled_\n\n");
    } else {
        out.push_str(&format!("- Fixers: {}\n\n", report.fixers.join(", ")));
    }

    out.push_str("## Files\n\n");
    if report.files.is_empty() {
        out.push_str("_No inputs._\n");
        return out;
    }

    for f in &report.files {
        out.push_str(&format!(
            "- `{}` `{}`",
            f.path,
            file_status_label(f.status)
        ));
        if !f.applied.is_empty() {
            out.push_str(&format!(" ({})", f.applied.join(", ")));
        }
        if let Some(err) = &f.error {
            out.push_str(&format!(": {}", err));
        }
        out.push('\n');
    }

    out
}

fn mode_label(mode: RunMode) -> &'static str {
    match mode {
        RunMode::Write => "write",
        RunMode::Check => "check",
    }
}

fn status_label(status: ReportStatus) -> &'static str {
    match status {
        ReportStatus::Pass => "pass",
        ReportStatus::Warn => "warn",
        ReportStatus::Fail => "fail",
    }
}

fn file_status_label(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Unchanged => "unchanged",
        FileStatus::Fixed => "fixed",
        FileStatus::Failed => "failed",
    }
}
