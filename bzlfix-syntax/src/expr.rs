use crate::comments::Comments;
use serde::{Deserialize, Serialize};

/// A node of the build file syntax tree together with its comment groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expr {
    #[serde(flatten)]
    pub kind: ExprKind,

    #[serde(default, skip_serializing_if = "Comments::is_empty")]
    pub comments: Comments,
}

/// Node shapes understood by the fixers.
///
/// Keyword arguments of a call (`name = "x"`) are `KeyValue` nodes whose key is a bare
/// `Literal` identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExprKind {
    /// Identifiers, numbers, `True`/`False`.
    Literal { token: String },
    #[serde(rename = "string")]
    Str { value: String },
    List {
        #[serde(default)]
        elements: Vec<Expr>,
    },
    Dict {
        #[serde(default)]
        entries: Vec<Expr>,
    },
    KeyValue { key: Box<Expr>, value: Box<Expr> },
    Binary {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        force_compact: bool,
    },
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Self {
            kind,
            comments: Comments::default(),
        }
    }
}

impl Expr {
    pub fn literal(token: impl Into<String>) -> Self {
        ExprKind::Literal {
            token: token.into(),
        }
        .into()
    }

    pub fn string(value: impl Into<String>) -> Self {
        ExprKind::Str {
            value: value.into(),
        }
        .into()
    }

    pub fn list(elements: Vec<Expr>) -> Self {
        ExprKind::List { elements }.into()
    }

    pub fn dict(entries: Vec<Expr>) -> Self {
        ExprKind::Dict { entries }.into()
    }

    pub fn key_value(key: Expr, value: Expr) -> Self {
        ExprKind::KeyValue {
            key: Box::new(key),
            value: Box::new(value),
        }
        .into()
    }

    /// `name = value` keyword argument.
    pub fn keyword(name: impl Into<String>, value: Expr) -> Self {
        Self::key_value(Self::literal(name), value)
    }

    pub fn binary(left: Expr, op: impl Into<String>, right: Expr) -> Self {
        ExprKind::Binary {
            left: Box::new(left),
            op: op.into(),
            right: Box::new(right),
        }
        .into()
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        ExprKind::Call {
            callee: Box::new(callee),
            args,
            force_compact: false,
        }
        .into()
    }

    pub fn with_comments(mut self, comments: Comments) -> Self {
        self.comments = comments;
        self
    }

    pub fn as_literal(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Literal { token } => Some(token),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Str { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Expr]> {
        match &self.kind {
            ExprKind::List { elements } => Some(elements),
            _ => None,
        }
    }

    /// Callee identifier of a call whose callee is a bare identifier.
    pub fn call_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Call { callee, .. } => callee.as_literal(),
            _ => None,
        }
    }

    pub fn call_args(&self) -> Option<&[Expr]> {
        match &self.kind {
            ExprKind::Call { args, .. } => Some(args),
            _ => None,
        }
    }

    pub fn call_args_mut(&mut self) -> Option<&mut Vec<Expr>> {
        match &mut self.kind {
            ExprKind::Call { args, .. } => Some(args),
            _ => None,
        }
    }

    /// Name and value of a `name = value` keyword argument.
    pub fn as_keyword(&self) -> Option<(&str, &Expr)> {
        match &self.kind {
            ExprKind::KeyValue { key, value } => key.as_literal().map(|k| (k, value.as_ref())),
            _ => None,
        }
    }
}
