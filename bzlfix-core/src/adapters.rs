//! Default filesystem-backed port implementations.

use crate::ports::{LoadedTree, TreeLoadError, TreeSource, WritePort};
use anyhow::Context;
use bzlfix_syntax::File;
use camino::{Utf8Path, Utf8PathBuf};
use fs_err as fs;
use std::collections::BTreeMap;
use tracing::debug;

/// Extension of serialized trees picked up when an input is a directory.
pub const TREE_EXTENSION: &str = "json";

/// Reads JSON trees from files and directories.
///
/// A file input is read as-is. A directory input is searched recursively for `*.json` files.
/// Anything under `exclude` (normally the output directory) is skipped so a run never ingests
/// its own artifacts.
#[derive(Debug, Clone)]
pub struct FsTreeSource {
    pub inputs: Vec<Utf8PathBuf>,
    pub exclude: Option<Utf8PathBuf>,
}

impl FsTreeSource {
    pub fn new(inputs: Vec<Utf8PathBuf>) -> Self {
        Self {
            inputs,
            exclude: None,
        }
    }

    pub fn excluding(mut self, dir: Utf8PathBuf) -> Self {
        self.exclude = Some(dir);
        self
    }

    /// The excluded directory resolved to its canonical form. A directory that does not exist
    /// yet has nothing to skip.
    fn resolved_exclude(&self) -> Option<Utf8PathBuf> {
        let dir = self.exclude.as_deref()?;
        let canonical = fs::canonicalize(dir).ok()?;
        Utf8PathBuf::try_from(canonical).ok()
    }

    fn collect_dir(
        &self,
        root: &Utf8Path,
        dir: &Utf8Path,
        exclude: Option<&Utf8Path>,
        found: &mut BTreeMap<Utf8PathBuf, Utf8PathBuf>,
    ) -> anyhow::Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry.with_context(|| format!("read entry of {}", dir))?;
            let path = Utf8PathBuf::try_from(entry.path())
                .with_context(|| format!("non-utf8 path under {}", dir))?;
            let file_type = entry
                .file_type()
                .with_context(|| format!("file type of {}", path))?;
            if file_type.is_dir() {
                if is_under(&path, exclude) {
                    debug!(path = %path, "skipping excluded directory");
                    continue;
                }
                self.collect_dir(root, &path, exclude, found)?;
            } else if path.extension() == Some(TREE_EXTENSION) {
                let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                found.insert(path, rel);
            }
        }
        Ok(())
    }
}

/// Compares canonical paths, so `./out`, `out` and `pkg/../out` all match the same directory.
fn is_under(path: &Utf8Path, exclude: Option<&Utf8Path>) -> bool {
    let Some(exclude) = exclude else {
        return false;
    };
    fs::canonicalize(path)
        .ok()
        .and_then(|p| Utf8PathBuf::try_from(p).ok())
        .is_some_and(|p| p.starts_with(exclude))
}

impl TreeSource for FsTreeSource {
    fn load_trees(&self) -> anyhow::Result<Vec<LoadedTree>> {
        let exclude = self.resolved_exclude();
        let mut found: BTreeMap<Utf8PathBuf, Utf8PathBuf> = BTreeMap::new();
        for input in &self.inputs {
            let meta = fs::metadata(input).with_context(|| format!("read input {}", input))?;
            if meta.is_dir() {
                self.collect_dir(input, input, exclude.as_deref(), &mut found)?;
            } else {
                let rel = input
                    .file_name()
                    .map(Utf8PathBuf::from)
                    .unwrap_or_else(|| input.clone());
                found.insert(input.clone(), rel);
            }
        }

        Ok(found
            .into_iter()
            .map(|(path, rel_path)| {
                let tree = read_tree(&path);
                LoadedTree {
                    path,
                    rel_path,
                    tree,
                }
            })
            .collect())
    }
}

fn read_tree(path: &Utf8Path) -> Result<File, TreeLoadError> {
    let text = fs::read_to_string(path).map_err(|e| TreeLoadError::Io {
        message: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| TreeLoadError::Json {
        message: e.to_string(),
    })
}

/// In-memory tree source for embedding and testing.
///
/// Sorts by path on construction to match `FsTreeSource`'s deterministic ordering.
#[derive(Debug, Clone)]
pub struct InMemoryTreeSource {
    trees: Vec<LoadedTree>,
}

impl InMemoryTreeSource {
    pub fn new(mut trees: Vec<LoadedTree>) -> Self {
        trees.sort_by(|a, b| a.path.cmp(&b.path));
        Self { trees }
    }

    /// Wraps already parsed files; each is keyed by its own `path` plus `.json`.
    pub fn from_files(files: Vec<File>) -> Self {
        Self::new(
            files
                .into_iter()
                .map(|file| {
                    let path = Utf8PathBuf::from(format!("{}.{}", file.path, TREE_EXTENSION));
                    LoadedTree {
                        rel_path: path.clone(),
                        path,
                        tree: Ok(file),
                    }
                })
                .collect(),
        )
    }
}

impl TreeSource for InMemoryTreeSource {
    fn load_trees(&self) -> anyhow::Result<Vec<LoadedTree>> {
        Ok(self.trees.clone())
    }
}

/// Filesystem write operations.
#[derive(Debug, Clone, Default)]
pub struct FsWritePort;

impl WritePort for FsWritePort {
    fn write_file(&self, path: &Utf8Path, contents: &[u8]) -> anyhow::Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create parent dir for {}", path))?;
        }
        fs::write(path, contents).with_context(|| format!("write {}", path))
    }

    fn create_dir_all(&self, path: &Utf8Path) -> anyhow::Result<()> {
        fs::create_dir_all(path).with_context(|| format!("create_dir_all {}", path))
    }
}
