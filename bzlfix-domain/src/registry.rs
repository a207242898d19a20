//! Registry of `.bzl` files the generator loads symbols from.
//!
//! Entry order is significant: it is the order in which new `load` statements are emitted. Every
//! symbol the generator ever loaded is listed, including ones it no longer emits (`cgo_library`),
//! so stale loads of them can be pruned. Symbols users load by hand are deliberately absent.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const RULES_GO_DEF_BZL: &str = "@io_bazel_rules_go//go:def.bzl";
pub const RULES_GO_PROTO_BZL: &str = "@io_bazel_rules_go//proto:def.bzl";

const RULES_GO_TABLE: &[(&str, &[&str])] = &[
    (
        RULES_GO_DEF_BZL,
        &[
            "cgo_library",
            "go_binary",
            "go_library",
            "go_prefix",
            "go_test",
        ],
    ),
    (RULES_GO_PROTO_BZL, &["go_grpc_library", "go_proto_library"]),
];

/// One registry entry: a file label and the symbols it exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownLoad {
    pub file: String,
    pub symbols: Vec<String>,
}

/// Immutable registry of known load files, indexed by file and by symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownLoads {
    entries: Vec<KnownLoad>,
    files: HashMap<String, usize>,
    owners: HashMap<String, usize>,
}

impl Default for KnownLoads {
    fn default() -> Self {
        Self::rules_go()
    }
}

impl KnownLoads {
    /// Builds a registry, sorting each entry's symbols.
    pub fn new(entries: Vec<KnownLoad>) -> Result<Self, RegistryError> {
        let mut files: HashMap<String, usize> = HashMap::new();
        let mut owners: HashMap<String, usize> = HashMap::new();
        let mut sorted = Vec::with_capacity(entries.len());

        for (idx, mut entry) in entries.into_iter().enumerate() {
            if entry.file.is_empty() {
                return Err(RegistryError::EmptyFile);
            }
            if files.insert(entry.file.clone(), idx).is_some() {
                return Err(RegistryError::DuplicateFile(entry.file));
            }
            entry.symbols.sort();
            entry.symbols.dedup();
            for sym in &entry.symbols {
                if let Some(prev) = owners.insert(sym.clone(), idx) {
                    let first: &KnownLoad = &sorted[prev];
                    return Err(RegistryError::DuplicateSymbol {
                        symbol: sym.clone(),
                        first: first.file.clone(),
                        second: entry.file.clone(),
                    });
                }
            }
            sorted.push(entry);
        }

        Ok(Self {
            entries: sorted,
            files,
            owners,
        })
    }

    /// The rules_go table: `go:def.bzl` followed by `proto:def.bzl`.
    pub fn rules_go() -> Self {
        let mut entries = Vec::with_capacity(RULES_GO_TABLE.len());
        let mut files = HashMap::new();
        let mut owners = HashMap::new();
        for (idx, (file, symbols)) in RULES_GO_TABLE.iter().enumerate() {
            files.insert(file.to_string(), idx);
            for sym in symbols.iter() {
                owners.insert(sym.to_string(), idx);
            }
            entries.push(KnownLoad {
                file: file.to_string(),
                symbols: symbols.iter().map(|s| s.to_string()).collect(),
            });
        }
        Self {
            entries,
            files,
            owners,
        }
    }

    pub fn entries(&self) -> &[KnownLoad] {
        &self.entries
    }

    /// Registry position of `file`, if it is a known file.
    pub fn file_index(&self, file: &str) -> Option<usize> {
        self.files.get(file).copied()
    }

    /// Registry position of the file that owns `symbol`.
    pub fn owner_index(&self, symbol: &str) -> Option<usize> {
        self.owners.get(symbol).copied()
    }

    pub fn owner(&self, symbol: &str) -> Option<&str> {
        self.owner_index(symbol)
            .map(|idx| self.entries[idx].file.as_str())
    }

    pub fn is_known_symbol(&self, symbol: &str) -> bool {
        self.owners.contains_key(symbol)
    }
}
