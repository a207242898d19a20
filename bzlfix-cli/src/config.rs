//! Configuration file loading for bzlfix.
//!
//! Discovers and loads `bzlfix.toml` from the working directory, or reads the file given with
//! `--config`. Merges config file settings with CLI arguments (CLI takes precedence).

use anyhow::Context;
use bzlfix_domain::{FixConfig, KnownLoad, KnownLoads};
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use serde::Deserialize;
use tracing::debug;

/// The config file name to search for.
pub const CONFIG_FILE_NAME: &str = "bzlfix.toml";

/// Top-level configuration from bzlfix.toml.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BzlfixConfig {
    /// Rule names and the keep directive the generator uses.
    pub names: NamesConfig,

    /// Known-load registry. When present it replaces the built-in rules_go table.
    pub loads: Vec<KnownLoad>,

    pub fixers: FixersConfig,
}

/// Names section of the config. Unset fields keep the generator defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    pub library: Option<String>,
    pub cgo_library: Option<String>,
    pub keep_directive: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FixersConfig {
    /// Fixer keys that never run.
    pub disable: Vec<String>,
}

/// Discover the bzlfix.toml config file in `dir`.
///
/// Returns `None` if no config file is found.
pub fn discover_config(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        debug!("found config file at {}", config_path);
        Some(config_path)
    } else {
        debug!("no config file found at {}", config_path);
        None
    }
}

/// Load and parse a bzlfix.toml config file.
pub fn load_config(path: &Utf8Path) -> anyhow::Result<BzlfixConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read config file {}", path))?;
    parse_config(&contents).with_context(|| format!("parse config file {}", path))
}

/// Parse a config file from a string.
pub fn parse_config(contents: &str) -> anyhow::Result<BzlfixConfig> {
    let config: BzlfixConfig = toml::from_str(contents).context("invalid TOML")?;
    Ok(config)
}

/// Load the explicitly given config file, or the one discovered in `dir`, or the defaults.
///
/// An explicit path that does not exist is an error; a missing discovered file is not.
pub fn load_or_default(explicit: Option<&Utf8Path>, dir: &Utf8Path) -> anyhow::Result<BzlfixConfig> {
    if let Some(path) = explicit {
        return load_config(path);
    }
    match discover_config(dir) {
        Some(path) => load_config(&path),
        None => Ok(BzlfixConfig::default()),
    }
}

/// Merged configuration combining config file and CLI arguments.
#[derive(Debug, Clone, Default)]
pub struct MergedConfig {
    pub fix: FixConfig,

    /// Disabled fixer keys (from config file, extended by CLI).
    pub disabled: Vec<String>,
}

/// Builder for merging config file with CLI arguments.
pub struct ConfigMerger {
    config: BzlfixConfig,
}

impl ConfigMerger {
    pub fn new(config: BzlfixConfig) -> Self {
        Self { config }
    }

    /// Merge with `fix` command CLI arguments.
    ///
    /// CLI `--disable` keys extend the config file list.
    pub fn merge_fix_args(self, cli_disable: &[String]) -> anyhow::Result<MergedConfig> {
        let defaults = FixConfig::default();
        let names = self.config.names;

        let library_name = non_empty("names.library", names.library)?
            .unwrap_or(defaults.library_name);
        let cgo_library_name = non_empty("names.cgo_library", names.cgo_library)?
            .unwrap_or(defaults.cgo_library_name);
        let keep_directive = non_empty("names.keep_directive", names.keep_directive)?
            .unwrap_or(defaults.keep_directive);

        let known_loads = if self.config.loads.is_empty() {
            defaults.known_loads
        } else {
            KnownLoads::new(self.config.loads).context("invalid [[loads]] table")?
        };

        let mut disabled = self.config.fixers.disable;
        for key in cli_disable {
            if !disabled.contains(key) {
                disabled.push(key.clone());
            }
        }

        Ok(MergedConfig {
            fix: FixConfig {
                library_name,
                cgo_library_name,
                keep_directive,
                known_loads,
            },
            disabled,
        })
    }
}

fn non_empty(field: &str, value: Option<String>) -> anyhow::Result<Option<String>> {
    match value {
        Some(v) if v.trim().is_empty() => anyhow::bail!("{} must not be empty", field),
        other => Ok(other),
    }
}
