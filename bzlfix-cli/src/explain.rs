//! Fix explanation module for the `bzlfix explain` command.
//!
//! Titles, descriptions and triggers come from the fixers themselves; this module adds the
//! remediation guidance shown to users who want to make the change by hand.

use bzlfix_domain::{FixerMeta, builtin_fixer_metas};

/// Information about a bzlfix fixer.
#[derive(Debug, Clone)]
pub struct FixExplanation {
    pub meta: FixerMeta,
    /// Guidance for applying the change manually, or for keeping a rule out of it.
    pub remediation: &'static str,
}

const REMEDIATION: &[(&str, &str)] = &[
    (
        "cgo-library",
        r#"To apply this fix manually, move the srcs, deps, data, copts, clinkopts, cdeps and
gc_goopts of the cgo_library into the go_library of the same package, delete the
`library = ":cgo_default_library"` attribute, and add `cgo = True`:

    go_library(
        name = "go_default_library",
        srcs = ["pure.go", "cgo.go"],
        cgo = True,
    )

To keep a hand-written go_library untouched, put a `# keep` comment on it. The
cgo_library is still deleted."#,
    ),
    (
        "loads",
        r#"To apply this fix manually, make every rule kind called in the file appear in a load
of the file that defines it, and drop symbols nobody calls:

    load("@io_bazel_rules_go//go:def.bzl", "go_library", "go_test")

Symbols loaded from files the registry does not know are left alone, and a kind
loaded from such a file is never loaded again from a registry file."#,
    ),
];

/// All fixer explanations, in run order.
pub fn explanations() -> Vec<FixExplanation> {
    builtin_fixer_metas()
        .into_iter()
        .map(|meta| FixExplanation {
            meta,
            remediation: REMEDIATION
                .iter()
                .find(|(key, _)| *key == meta.key)
                .map(|(_, text)| *text)
                .unwrap_or(""),
        })
        .collect()
}

/// Look up a fixer by key. Case and `_` versus `-` are ignored.
pub fn lookup_fix(query: &str) -> Option<FixExplanation> {
    let normalized = query.to_lowercase().replace('_', "-");
    explanations()
        .into_iter()
        .find(|fix| fix.meta.key == normalized)
}

/// List all available fixer keys.
pub fn list_fix_keys() -> Vec<&'static str> {
    builtin_fixer_metas().iter().map(|m| m.key).collect()
}
