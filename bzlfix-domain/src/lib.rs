//! Domain logic: upgrade rules written by older generators and keep `load` statements in sync.
//!
//! This crate owns *what* is rewritten in a build file tree. It does not parse or print files, and
//! it does not touch the file system; that's `bzlfix-core`.
//!
//! Fixers take a [`File`](bzlfix_syntax::File) and return either the same file (borrowed) or a
//! rewritten one that shares every untouched statement with its input.

mod config;
mod engine;
mod error;
mod fixers;
mod registry;
mod squash;

pub use config::{DEFAULT_CGO_LIB_NAME, DEFAULT_LIB_NAME, FixConfig, KEEP_DIRECTIVE};
pub use engine::{FixEngine, FixResult};
pub use error::{Anomaly, RegistryError, ShapeIssue, SquashError};
pub use fixers::{
    CgoLibraryFixer, Fixer, FixerMeta, LoadFix, LoadFixer, builtin_fixer_metas, builtin_fixers,
};
pub use registry::{KnownLoad, KnownLoads, RULES_GO_DEF_BZL, RULES_GO_PROTO_BZL};
pub use squash::{ListPart, SelectPart, Shape, squash_expr, squash_list, squash_select};
