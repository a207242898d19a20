//! A rule is a call whose callee is a bare identifier, e.g. `go_library(name = "x", ...)`.
//!
//! [`Rule`] and [`RuleMut`] are views over such a call. They never own the node; attribute values
//! are opaque expressions to them.

use crate::expr::{Expr, ExprKind};

/// Read-only view over a rule call.
#[derive(Debug, Clone, Copy)]
pub struct Rule<'a> {
    call: &'a Expr,
}

impl<'a> Rule<'a> {
    /// Returns `None` if `expr` is not a call with a bare identifier callee.
    pub fn from_expr(expr: &'a Expr) -> Option<Self> {
        expr.call_name()?;
        Some(Self { call: expr })
    }

    /// An empty owned call of the given kind.
    pub fn new_call(kind: &str) -> Expr {
        Expr::call(Expr::literal(kind), vec![])
    }

    pub fn expr(&self) -> &'a Expr {
        self.call
    }

    pub fn kind(&self) -> &'a str {
        self.call.call_name().unwrap_or_default()
    }

    /// String value of the `name` attribute. Anonymous calls such as `load` have none.
    pub fn name(&self) -> Option<&'a str> {
        self.attr("name").and_then(Expr::as_str)
    }

    pub fn attr(&self, key: &str) -> Option<&'a Expr> {
        self.attrs().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Attributes in argument order.
    pub fn attrs(&self) -> impl Iterator<Item = (&'a str, &'a Expr)> + use<'a> {
        self.call
            .call_args()
            .unwrap_or_default()
            .iter()
            .filter_map(Expr::as_keyword)
    }

    /// True if the directive (e.g. `keep`) appears in the call's own comments.
    pub fn has_directive(&self, word: &str) -> bool {
        self.call.comments.has_directive(word)
    }
}

/// Mutable view over a rule call.
#[derive(Debug)]
pub struct RuleMut<'a> {
    call: &'a mut Expr,
}

impl<'a> RuleMut<'a> {
    pub fn from_expr(expr: &'a mut Expr) -> Option<Self> {
        expr.call_name()?;
        Some(Self { call: expr })
    }

    pub fn as_rule(&self) -> Rule<'_> {
        Rule { call: self.call }
    }

    /// Updates an existing attribute in place, or appends a new one.
    pub fn set_attr(&mut self, key: &str, value: Expr) {
        let Some(args) = self.call.call_args_mut() else {
            return;
        };
        for arg in args.iter_mut() {
            if let ExprKind::KeyValue { key: k, value: v } = &mut arg.kind
                && k.as_literal() == Some(key)
            {
                **v = value;
                return;
            }
        }
        args.push(Expr::keyword(key, value));
    }

    /// Removes an attribute, returning its value. No-op if absent.
    pub fn del_attr(&mut self, key: &str) -> Option<Expr> {
        let args = self.call.call_args_mut()?;
        let pos = args
            .iter()
            .position(|a| a.as_keyword().is_some_and(|(k, _)| k == key))?;
        match args.remove(pos).kind {
            ExprKind::KeyValue { value, .. } => Some(*value),
            _ => None,
        }
    }
}
