use crate::config::FixConfig;
use bzlfix_syntax::File;
use std::borrow::Cow;

mod cgo_library;
mod loads;

pub use cgo_library::CgoLibraryFixer;
pub use loads::{LoadFix, LoadFixer};

/// Static description of a fixer, used by `list-fixes` and `explain`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixerMeta {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub triggers: &'static [&'static str],
}

/// A whole-file rewrite.
///
/// Implementations return `Cow::Borrowed` when the file needs no change, so callers can tell a
/// no-op apart from a rewrite without comparing trees.
pub trait Fixer {
    fn meta(&self) -> FixerMeta;

    fn fix<'f>(&self, file: &'f File) -> Cow<'f, File>;
}

/// Built-in fixers in the order they must run: rule fixes first, since they change which
/// symbols are used, then load reconciliation.
pub fn builtin_fixers(config: &FixConfig) -> Vec<Box<dyn Fixer>> {
    vec![
        Box::new(CgoLibraryFixer::new(config)),
        Box::new(LoadFixer::new(config.known_loads.clone())),
    ]
}

pub fn builtin_fixer_metas() -> Vec<FixerMeta> {
    vec![CgoLibraryFixer::META, LoadFixer::META]
}
