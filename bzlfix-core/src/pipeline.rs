//! Core fix pipeline, extracted from the CLI.
//!
//! These entry points are I/O-agnostic: trees come in through a [`TreeSource`] and everything
//! written goes out through a [`WritePort`].

use crate::ports::{LoadedTree, TreeLoadError, TreeSource, WritePort};
use crate::report::{FileReport, FileStatus, FixReport, RunInfo, RunMode, ToolInfo};
use crate::settings::FixSettings;
use anyhow::Context;
use bzlfix_domain::{FixEngine, FixResult, builtin_fixer_metas};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Error type for pipeline results. Exit code 2 = check found changes, 1 = tool error.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("{0} file(s) would be changed")]
    CheckFailed(u64),
    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ToolError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::CheckFailed(_) => 2,
            ToolError::Internal(_) => 1,
        }
    }
}

/// What happened to one input tree.
#[derive(Debug, Clone)]
pub struct TreeOutcome {
    pub path: Utf8PathBuf,
    pub rel_path: Utf8PathBuf,
    pub result: Result<FixResult, TreeLoadError>,
}

impl TreeOutcome {
    pub fn status(&self) -> FileStatus {
        match &self.result {
            Ok(r) if r.changed() => FileStatus::Fixed,
            Ok(_) => FileStatus::Unchanged,
            Err(_) => FileStatus::Failed,
        }
    }

    /// The rewritten tree, if any fixer changed it.
    pub fn fixed(&self) -> Option<&FixResult> {
        self.result.as_ref().ok().filter(|r| r.changed())
    }
}

/// Outcome of `run_fix`.
#[derive(Debug, Clone)]
pub struct FixOutcome {
    pub trees: Vec<TreeOutcome>,
    pub report: FixReport,
}

impl FixOutcome {
    pub fn would_change(&self) -> bool {
        self.report.verdict.counts.fixed > 0
    }

    /// In check mode, turns pending changes into [`ToolError::CheckFailed`].
    pub fn check(&self, settings: &FixSettings) -> Result<(), ToolError> {
        if settings.check && self.would_change() {
            return Err(ToolError::CheckFailed(self.report.verdict.counts.fixed));
        }
        Ok(())
    }
}

/// Run every enabled fixer over every tree the source yields.
///
/// A tree that fails to load is recorded as failed and the run goes on. The caller is responsible
/// for writing results (via `WritePort`) or the convenience `write_fix_artifacts` helper.
pub fn run_fix(
    settings: &FixSettings,
    source: &dyn TreeSource,
    tool: ToolInfo,
) -> Result<FixOutcome, ToolError> {
    let started_at = Utc::now();

    let known: Vec<&str> = builtin_fixer_metas().iter().map(|m| m.key).collect();
    if let Some(unknown) = settings
        .disabled
        .iter()
        .find(|k| !known.contains(&k.as_str()))
    {
        return Err(anyhow::anyhow!(
            "unknown fixer key `{}` (known: {})",
            unknown,
            known.join(", ")
        )
        .into());
    }

    let engine = FixEngine::new(&settings.config).without(&settings.disabled);
    let fixers: Vec<String> = engine.fixer_keys().iter().map(|k| k.to_string()).collect();
    debug!(fixers = ?fixers, check = settings.check, "running fixers");

    let loaded = source.load_trees().context("load trees")?;
    let trees: Vec<TreeOutcome> = loaded
        .into_iter()
        .map(|tree| fix_tree(&engine, tree))
        .collect();

    let mode = if settings.check {
        RunMode::Check
    } else {
        RunMode::Write
    };
    let files = trees.iter().map(file_report).collect();
    let report = FixReport::new(
        tool,
        RunInfo::between(started_at, Utc::now()),
        mode,
        fixers,
        files,
    );

    Ok(FixOutcome { trees, report })
}

fn fix_tree(engine: &FixEngine, loaded: LoadedTree) -> TreeOutcome {
    let result = match loaded.tree {
        Ok(file) => {
            let fixed = engine.fix(&file);
            if fixed.changed() {
                debug!(path = %loaded.path, applied = ?fixed.applied, "tree fixed");
            } else {
                debug!(path = %loaded.path, "tree unchanged");
            }
            Ok(fixed)
        }
        Err(err) => {
            warn!(path = %loaded.path, error = %err, "failed to load tree");
            Err(err)
        }
    };
    TreeOutcome {
        path: loaded.path,
        rel_path: loaded.rel_path,
        result,
    }
}

fn file_report(tree: &TreeOutcome) -> FileReport {
    let (build_file, applied, error) = match &tree.result {
        Ok(r) => (
            Some(r.file.path.clone()),
            r.applied.iter().map(|k| k.to_string()).collect(),
            None,
        ),
        Err(e) => (None, Vec::new(), Some(e.to_string())),
    };
    FileReport {
        path: tree.path.to_string(),
        build_file,
        status: tree.status(),
        applied,
        error,
    }
}

/// Where a fixed tree is written: under `<out_dir>/trees/` when an output directory is set,
/// otherwise back over its input.
pub fn tree_target(tree: &TreeOutcome, out_dir: Option<&Utf8Path>) -> Utf8PathBuf {
    match out_dir {
        Some(dir) => dir.join("trees").join(&tree.rel_path),
        None => tree.path.clone(),
    }
}

/// Write fixed trees (skipped in check mode), then `report.json` and `summary.md` when an output
/// directory is set.
pub fn write_fix_artifacts(
    outcome: &FixOutcome,
    settings: &FixSettings,
    writer: &dyn WritePort,
) -> anyhow::Result<()> {
    let out_dir = settings.out_dir.as_deref();

    if !settings.check {
        for tree in &outcome.trees {
            let Some(fixed) = tree.fixed() else {
                continue;
            };
            let target = tree_target(tree, out_dir);
            let mut json = serde_json::to_string_pretty(&fixed.file)
                .with_context(|| format!("serialize tree {}", tree.path))?;
            json.push('\n');
            writer.write_file(&target, json.as_bytes())?;
            debug!(path = %target, "wrote fixed tree");
        }
    }

    if let Some(out_dir) = out_dir {
        writer.create_dir_all(out_dir)?;

        let mut report_json =
            serde_json::to_string_pretty(&outcome.report).context("serialize report")?;
        report_json.push('\n');
        writer.write_file(&out_dir.join("report.json"), report_json.as_bytes())?;

        let summary = crate::report::render_summary_md(&outcome.report);
        writer.write_file(&out_dir.join("summary.md"), summary.as_bytes())?;

        info!("wrote report to {}", out_dir);
    }

    Ok(())
}
