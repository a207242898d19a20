use crate::expr::Expr;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A build file: an ordered list of top-level statements.
///
/// Statements are shared through `Arc`, so a rewritten file references every statement it did not
/// change instead of copying it.
///
/// Deserialization requires `stmts` and rejects unknown fields, so an unrelated JSON document is
/// never mistaken for an empty file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct File {
    /// Provenance, used for diagnostics only.
    #[serde(default)]
    pub path: String,

    pub stmts: Vec<Arc<Expr>>,
}

impl File {
    pub fn new(path: impl Into<String>, stmts: Vec<Expr>) -> Self {
        Self {
            path: path.into(),
            stmts: stmts.into_iter().map(Arc::new).collect(),
        }
    }

    /// A file with the same provenance and a different statement list.
    pub fn with_stmts(&self, stmts: Vec<Arc<Expr>>) -> Self {
        Self {
            path: self.path.clone(),
            stmts,
        }
    }

    /// Top-level calls with their statement index.
    pub fn calls(&self) -> impl Iterator<Item = (usize, &Expr)> {
        self.stmts
            .iter()
            .enumerate()
            .filter(|(_, s)| s.call_args().is_some())
            .map(|(i, s)| (i, s.as_ref()))
    }
}
