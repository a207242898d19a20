//! Clap-free settings for the fix pipeline.

use bzlfix_domain::FixConfig;
use camino::Utf8PathBuf;

/// Settings for [`run_fix`](crate::pipeline::run_fix) and
/// [`write_fix_artifacts`](crate::pipeline::write_fix_artifacts).
#[derive(Debug, Clone, Default)]
pub struct FixSettings {
    /// Where fixed trees, `report.json` and `summary.md` go. Without it, fixed trees are written
    /// back in place and no report is written.
    pub out_dir: Option<Utf8PathBuf>,

    /// Report what would change without writing any tree.
    pub check: bool,

    /// Fixer keys to skip.
    pub disabled: Vec<String>,

    pub config: FixConfig,
}
