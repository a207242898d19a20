use anyhow::Context;
use bzlfix_cli::config::{self, ConfigMerger};
use bzlfix_cli::explain;
use bzlfix_core::adapters::{FsTreeSource, FsWritePort};
use bzlfix_core::pipeline::{ToolError, run_fix, write_fix_artifacts};
use bzlfix_core::report::{FileStatus, ToolInfo};
use bzlfix_core::settings::FixSettings;
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "bzlfix",
    version,
    about = "Upgrades previously generated Bazel build files and keeps their loads in sync."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fix parsed build file trees (JSON), in place or into an output directory.
    Fix(FixArgs),
    /// Explain what a fixer does and how to make the change by hand.
    Explain(ExplainArgs),
    /// List all available fixers.
    ListFixes(ListFixesArgs),
}

#[derive(Debug, Parser)]
struct FixArgs {
    /// Tree files, or directories searched recursively for `*.json` trees.
    #[arg(required = true)]
    inputs: Vec<Utf8PathBuf>,

    /// Config file (default: ./bzlfix.toml when present).
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Write fixed trees, report.json and summary.md here instead of rewriting inputs.
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Report what would change without writing trees. Exits 2 if anything would change.
    #[arg(long, default_value_t = false)]
    check: bool,

    /// Fixer key to skip; may be repeated.
    #[arg(long)]
    disable: Vec<String>,
}

#[derive(Debug, Parser)]
struct ExplainArgs {
    /// Fixer key to explain (e.g., "cgo-library", "loads").
    fix_key: String,
}

#[derive(Debug, Parser)]
struct ListFixesArgs {
    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.cmd {
        Command::Fix(args) => cmd_fix(args),
        Command::Explain(args) => cmd_explain(args).map_err(ToolError::from),
        Command::ListFixes(args) => cmd_list_fixes(args).map_err(ToolError::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e @ ToolError::CheckFailed(_)) => {
            eprintln!("bzlfix: {}", e);
            ExitCode::from(e.exit_code())
        }
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn cmd_fix(args: FixArgs) -> Result<(), ToolError> {
    // Load config file and merge with CLI arguments
    let file_config = config::load_or_default(args.config.as_deref(), Utf8Path::new("."))
        .context("load bzlfix.toml config")?;
    let merged = ConfigMerger::new(file_config)
        .merge_fix_args(&args.disable)
        .context("merge config")?;

    debug!(
        "merged config: library={}, cgo_library={}, keep={}, disabled={:?}",
        merged.fix.library_name,
        merged.fix.cgo_library_name,
        merged.fix.keep_directive,
        merged.disabled
    );

    let settings = FixSettings {
        out_dir: args.out_dir.clone(),
        check: args.check,
        disabled: merged.disabled,
        config: merged.fix,
    };

    let mut source = FsTreeSource::new(args.inputs);
    if let Some(out_dir) = args.out_dir {
        source = source.excluding(out_dir);
    }

    let outcome = run_fix(&settings, &source, tool_info())?;
    write_fix_artifacts(&outcome, &settings, &FsWritePort).context("write artifacts")?;

    for file in &outcome.report.files {
        let label = match file.status {
            FileStatus::Unchanged => "unchanged",
            FileStatus::Fixed if settings.check => "would fix",
            FileStatus::Fixed => "fixed",
            FileStatus::Failed => "failed",
        };
        if file.applied.is_empty() {
            println!("{:<10} {}", label, file.path);
        } else {
            println!("{:<10} {} ({})", label, file.path, file.applied.join(", "));
        }
    }

    let failed = outcome.report.verdict.counts.failed;
    if failed > 0 {
        return Err(anyhow::anyhow!("{} input(s) could not be loaded", failed).into());
    }

    outcome.check(&settings)
}

fn cmd_explain(args: ExplainArgs) -> anyhow::Result<()> {
    let Some(fix) = explain::lookup_fix(&args.fix_key) else {
        let available = explain::list_fix_keys().join(", ");
        anyhow::bail!(
            "Unknown fix key: '{}'\n\nAvailable fixes: {}",
            args.fix_key,
            available
        );
    };

    println!("================================================================================");
    println!("FIX: {}", fix.meta.title);
    println!("================================================================================");
    println!();
    println!("Key:     {}", fix.meta.key);
    println!();

    println!("DESCRIPTION");
    println!("--------------------------------------------------------------------------------");
    println!("{}", fix.meta.description);
    println!();

    println!("TRIGGERS");
    println!("--------------------------------------------------------------------------------");
    for trigger in fix.meta.triggers {
        println!("  - {}", trigger);
    }
    println!();

    println!("REMEDIATION GUIDANCE");
    println!("--------------------------------------------------------------------------------");
    println!("{}", fix.remediation);
    println!();

    Ok(())
}

fn cmd_list_fixes(args: ListFixesArgs) -> anyhow::Result<()> {
    let fixes = explain::explanations();

    match args.format {
        OutputFormat::Text => {
            println!("Available fixes:\n");
            println!("  {:<16} TITLE", "KEY");
            println!("  {:<16} -----", "---");
            for fix in &fixes {
                println!("  {:<16} {}", fix.meta.key, fix.meta.title);
            }
            println!();
            println!("Use 'bzlfix explain <key>' for details.");
        }
        OutputFormat::Json => {
            let fixes: Vec<_> = fixes
                .iter()
                .map(|f| {
                    serde_json::json!({
                        "key": f.meta.key,
                        "title": f.meta.title,
                        "description": f.meta.description,
                        "triggers": f.meta.triggers,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&fixes)?);
        }
    }
    Ok(())
}

fn tool_info() -> ToolInfo {
    ToolInfo::new("bzlfix", Some(env!("CARGO_PKG_VERSION").to_string()))
}
