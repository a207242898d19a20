//! Syntax tree for Starlark-like build files (schemas-as-code) shared by the bzlfix workspace.
//!
//! # Design constraints
//! - Trees are produced by an external parser and consumed by an external printer; this crate
//!   neither parses nor prints Starlark text.
//! - The serde form is the hand-off format, so be conservative with breaking changes.
//! - Every node owns its comment groups. Rewrites must carry them along, never drop them.

pub mod comments;
pub mod expr;
pub mod file;
pub mod rule;

pub use comments::{Comment, Comments};
pub use expr::{Expr, ExprKind};
pub use file::File;
pub use rule::{Rule, RuleMut};
