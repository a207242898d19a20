//! Port traits abstracting all I/O away from the pipeline.

use bzlfix_syntax::File;
use camino::{Utf8Path, Utf8PathBuf};

/// A build file tree as handed over by the external parser, or why it could not be read.
#[derive(Debug, Clone)]
pub struct LoadedTree {
    /// Location of the serialized tree.
    pub path: Utf8PathBuf,
    /// Path of the tree relative to the input it was found under. Used to place the fixed tree
    /// inside an output directory.
    pub rel_path: Utf8PathBuf,
    pub tree: Result<File, TreeLoadError>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeLoadError {
    #[error("io error: {message}")]
    Io { message: String },

    #[error("invalid tree json: {message}")]
    Json { message: String },
}

/// Source of parsed build file trees.
pub trait TreeSource {
    fn load_trees(&self) -> anyhow::Result<Vec<LoadedTree>>;
}

/// File-system write operations.
pub trait WritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()>;
    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()>;
}
