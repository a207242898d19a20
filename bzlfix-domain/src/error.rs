//! Error types for bzlfix-domain.
//!
//! None of these are fatal to a file-level fixer:
//! - [`SquashError`] is recovered per attribute (the attribute is left unmerged)
//! - [`Anomaly`] is logged and processing continues with the first match
//! - [`RegistryError`] can only occur while building a custom load registry

use thiserror::Error;

/// Failure to squash two attribute values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SquashError {
    /// The value is not one of: absent, list, `select(dict)`, `list + select(dict)`.
    #[error("unrecognized shape: {0}")]
    UnrecognizedShape(ShapeIssue),
}

/// Why a value was not recognized as a squashable shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeIssue {
    #[error("call to `{0}` is not select")]
    NotSelect(String),

    #[error("select must take exactly one dict argument")]
    SelectArgument,

    #[error("select dict has a non-string key")]
    NonStringKey,

    #[error("operator `{0}` is not `+`")]
    Operator(String),

    #[error("left operand of `+` is not a list")]
    LeftNotList,

    #[error("right operand of `+` is not a select")]
    RightNotSelect,

    #[error("{0} expression")]
    Unsupported(&'static str),
}

impl From<ShapeIssue> for SquashError {
    fn from(issue: ShapeIssue) -> Self {
        SquashError::UnrecognizedShape(issue)
    }
}

/// Non-fatal oddities found while scanning a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Anomaly {
    #[error("multiple {kind} rules named {name:?} found; keeping the first")]
    DuplicateDefaultRule { kind: String, name: String },
}

/// Invalid known-load registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("known load entry has an empty file label")]
    EmptyFile,

    #[error("file {0:?} is listed more than once")]
    DuplicateFile(String),

    #[error("symbol {symbol:?} is loaded from both {first:?} and {second:?}")]
    DuplicateSymbol {
        symbol: String,
        first: String,
        second: String,
    },
}
