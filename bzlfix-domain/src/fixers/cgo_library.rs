use crate::config::FixConfig;
use crate::error::Anomaly;
use crate::fixers::{Fixer, FixerMeta};
use crate::squash::squash_expr;
use bzlfix_syntax::{Expr, File, Rule, RuleMut};
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, warn};

/// Folds the legacy default `cgo_library` into the default `go_library`.
///
/// The `library` attribute is disregarded, so the two rules are squashed even if the
/// `cgo_library` was never linked into the `go_library`. A later merge drops whatever ends up
/// unused.
pub struct CgoLibraryFixer {
    library_name: String,
    cgo_library_name: String,
    keep_directive: String,
}

impl CgoLibraryFixer {
    pub const META: FixerMeta = FixerMeta {
        key: "cgo-library",
        title: "Fold cgo_library into go_library",
        description: "Removes the default-named cgo_library rule and squashes its sources, \
                      dependencies and compiler options into the default go_library, which is \
                      marked cgo = True. A go_library is created if none exists. If the \
                      go_library carries a keep comment, the cgo_library is only deleted.",
        triggers: &["cgo_library(name = <default cgo library name>) without a keep comment"],
    };

    const CGO_KIND: &'static str = "cgo_library";
    const GO_KIND: &'static str = "go_library";

    /// Attributes whose values are squashed from `cgo_library` into `go_library`.
    const SQUASHED_ATTRS: &'static [&'static str] = &[
        "cdeps",
        "clinkopts",
        "copts",
        "data",
        "deps",
        "gc_goopts",
        "srcs",
    ];

    pub fn new(config: &FixConfig) -> Self {
        Self {
            library_name: config.library_name.clone(),
            cgo_library_name: config.cgo_library_name.clone(),
            keep_directive: config.keep_directive.clone(),
        }
    }

    pub fn squash_cgo_library<'f>(&self, file: &'f File) -> Cow<'f, File> {
        let mut cgo: Option<(usize, Rule<'f>)> = None;
        let mut lib: Option<(usize, Rule<'f>)> = None;

        for (i, stmt) in file.stmts.iter().enumerate() {
            let Some(rule) = Rule::from_expr(stmt) else {
                continue;
            };
            if rule.kind() == Self::CGO_KIND
                && rule.name() == Some(self.cgo_library_name.as_str())
                && !rule.has_directive(&self.keep_directive)
            {
                if cgo.is_some() {
                    self.report_duplicate(file, Self::CGO_KIND, &self.cgo_library_name);
                    continue;
                }
                cgo = Some((i, rule));
                continue;
            }
            if rule.kind() == Self::GO_KIND && rule.name() == Some(self.library_name.as_str()) {
                if lib.is_some() {
                    self.report_duplicate(file, Self::GO_KIND, &self.library_name);
                    continue;
                }
                lib = Some((i, rule));
            }
        }

        let Some((cgo_index, cgo)) = cgo else {
            return Cow::Borrowed(file);
        };

        if let Some((_, lib)) = &lib
            && lib.has_directive(&self.keep_directive)
        {
            debug!(path = %file.path, "go_library is kept; deleting cgo_library");
            let mut stmts = file.stmts.clone();
            stmts.remove(cgo_index);
            return Cow::Owned(file.with_stmts(stmts));
        }

        let Some(fixed) = self.squashed_library(cgo, lib.as_ref().map(|(_, r)| *r)) else {
            return Cow::Borrowed(file);
        };
        let fixed = Arc::new(fixed);

        // The go_library keeps its position; if it did not exist, the new one takes the
        // cgo_library's.
        let mut stmts = file.stmts.clone();
        match lib {
            None => stmts[cgo_index] = fixed,
            Some((lib_index, _)) => {
                stmts.remove(cgo_index);
                let lib_index = if lib_index > cgo_index {
                    lib_index - 1
                } else {
                    lib_index
                };
                stmts[lib_index] = fixed;
            }
        }
        debug!(path = %file.path, "squashed cgo_library into go_library");
        Cow::Owned(file.with_stmts(stmts))
    }

    /// Builds the replacement `go_library` from a copy of `lib` (or a fresh rule) and `cgo`.
    fn squashed_library(&self, cgo: Rule<'_>, lib: Option<Rule<'_>>) -> Option<Expr> {
        let mut fixed = match lib {
            Some(lib) => lib.expr().clone(),
            None => Rule::new_call(Self::GO_KIND),
        };
        fixed.comments.append(&cgo.expr().comments);

        let mut rule = RuleMut::from_expr(&mut fixed)?;
        if lib.is_none() {
            rule.set_attr("name", Expr::string(&self.library_name));
            if let Some(vis) = cgo.attr("visibility") {
                rule.set_attr("visibility", vis.clone());
            }
        }
        rule.del_attr("library");
        rule.set_attr("cgo", Expr::literal("True"));

        for &key in Self::SQUASHED_ATTRS {
            let Some(cgo_attr) = cgo.attr(key) else {
                continue;
            };
            let squashed = squash_expr(rule.as_rule().attr(key), Some(cgo_attr));
            match squashed {
                Ok(Some(squashed)) => rule.set_attr(key, squashed),
                Ok(None) => {}
                Err(err) => {
                    debug!(attr = key, error = %err, "leaving attribute unmerged");
                }
            }
        }
        Some(fixed)
    }

    fn report_duplicate(&self, file: &File, kind: &str, name: &str) {
        let anomaly = Anomaly::DuplicateDefaultRule {
            kind: kind.to_string(),
            name: name.to_string(),
        };
        warn!(path = %file.path, "when fixing existing file, {}", anomaly);
    }
}

impl Fixer for CgoLibraryFixer {
    fn meta(&self) -> FixerMeta {
        Self::META
    }

    fn fix<'f>(&self, file: &'f File) -> Cow<'f, File> {
        self.squash_cgo_library(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzlfix_syntax::{Comment, Comments};
    use pretty_assertions::assert_eq;

    fn fixer() -> CgoLibraryFixer {
        CgoLibraryFixer::new(&FixConfig::default())
    }

    fn strs(values: &[&str]) -> Expr {
        Expr::list(values.iter().map(|v| Expr::string(*v)).collect())
    }

    fn rule(kind: &str, attrs: Vec<(&str, Expr)>) -> Expr {
        Expr::call(
            Expr::literal(kind),
            attrs
                .into_iter()
                .map(|(k, v)| Expr::keyword(k, v))
                .collect(),
        )
    }

    fn keep() -> Comments {
        Comments {
            suffix: vec![Comment::new("# keep")],
            ..Comments::default()
        }
    }

    #[test]
    fn no_cgo_library_is_a_noop() {
        let file = File::new(
            "BUILD",
            vec![rule(
                "go_library",
                vec![("name", Expr::string("go_default_library"))],
            )],
        );
        assert!(matches!(fixer().fix(&file), Cow::Borrowed(_)));
    }

    #[test]
    fn cgo_library_without_go_library_becomes_go_library_in_place() {
        let file = File::new(
            "BUILD",
            vec![
                Expr::call(Expr::literal("load"), vec![Expr::string("//:x.bzl")]),
                rule(
                    "cgo_library",
                    vec![
                        ("name", Expr::string("cgo_default_library")),
                        ("srcs", strs(&["a.go"])),
                        ("visibility", strs(&["//visibility:private"])),
                    ],
                ),
                rule("go_test", vec![("name", Expr::string("go_default_test"))]),
            ],
        );
        let fixed = fixer().fix(&file).into_owned();
        assert_eq!(fixed.stmts.len(), 3);
        assert!(Arc::ptr_eq(&fixed.stmts[0], &file.stmts[0]));
        assert!(Arc::ptr_eq(&fixed.stmts[2], &file.stmts[2]));
        assert_eq!(
            *fixed.stmts[1],
            rule(
                "go_library",
                vec![
                    ("name", Expr::string("go_default_library")),
                    ("visibility", strs(&["//visibility:private"])),
                    ("cgo", Expr::literal("True")),
                    ("srcs", strs(&["a.go"])),
                ],
            )
        );
    }

    #[test]
    fn attributes_squash_into_existing_go_library() {
        let file = File::new(
            "BUILD",
            vec![
                rule(
                    "go_library",
                    vec![
                        ("name", Expr::string("go_default_library")),
                        ("srcs", strs(&["pure.go"])),
                        ("library", Expr::string(":cgo_default_library")),
                        ("deps", strs(&["//y"])),
                    ],
                ),
                rule(
                    "cgo_library",
                    vec![
                        ("name", Expr::string("cgo_default_library")),
                        ("srcs", strs(&["cgo.go"])),
                        ("deps", strs(&["//x"])),
                        ("clinkopts", strs(&["-lm"])),
                    ],
                ),
            ],
        );
        let fixed = fixer().fix(&file).into_owned();
        assert_eq!(fixed.stmts.len(), 1);
        assert_eq!(
            *fixed.stmts[0],
            rule(
                "go_library",
                vec![
                    ("name", Expr::string("go_default_library")),
                    ("srcs", strs(&["pure.go", "cgo.go"])),
                    ("deps", strs(&["//y", "//x"])),
                    ("cgo", Expr::literal("True")),
                    ("clinkopts", strs(&["-lm"])),
                ],
            )
        );
    }

    #[test]
    fn go_library_after_cgo_library_keeps_its_slot() {
        let file = File::new(
            "BUILD",
            vec![
                rule(
                    "cgo_library",
                    vec![("name", Expr::string("cgo_default_library"))],
                ),
                Expr::literal("MIDDLE"),
                rule(
                    "go_library",
                    vec![("name", Expr::string("go_default_library"))],
                ),
            ],
        );
        let fixed = fixer().fix(&file).into_owned();
        assert_eq!(fixed.stmts.len(), 2);
        assert_eq!(*fixed.stmts[0], Expr::literal("MIDDLE"));
        assert_eq!(fixed.stmts[1].call_name(), Some("go_library"));
    }

    #[test]
    fn kept_go_library_only_deletes_cgo_library() {
        let go_library = rule(
            "go_library",
            vec![("name", Expr::string("go_default_library"))],
        )
        .with_comments(keep());
        let file = File::new(
            "BUILD",
            vec![
                go_library.clone(),
                rule(
                    "cgo_library",
                    vec![
                        ("name", Expr::string("cgo_default_library")),
                        ("srcs", strs(&["a.go"])),
                    ],
                ),
            ],
        );
        let fixed = fixer().fix(&file).into_owned();
        assert_eq!(fixed.stmts.len(), 1);
        assert!(Arc::ptr_eq(&fixed.stmts[0], &file.stmts[0]));
    }

    #[test]
    fn kept_cgo_library_is_left_alone() {
        let file = File::new(
            "BUILD",
            vec![
                rule(
                    "cgo_library",
                    vec![("name", Expr::string("cgo_default_library"))],
                )
                .with_comments(keep()),
            ],
        );
        assert!(matches!(fixer().fix(&file), Cow::Borrowed(_)));
    }

    #[test]
    fn prose_starting_with_keep_does_not_block_squash() {
        let note = Comments {
            before: vec![Comment::new("# keep in sync with //foo")],
            ..Comments::default()
        };
        let file = File::new(
            "BUILD",
            vec![
                rule(
                    "go_library",
                    vec![("name", Expr::string("go_default_library"))],
                )
                .with_comments(note.clone()),
                rule(
                    "cgo_library",
                    vec![
                        ("name", Expr::string("cgo_default_library")),
                        ("srcs", strs(&["a.go"])),
                    ],
                ),
            ],
        );
        let fixed = fixer().fix(&file).into_owned();
        assert_eq!(fixed.stmts.len(), 1);
        assert_eq!(
            *fixed.stmts[0],
            rule(
                "go_library",
                vec![
                    ("name", Expr::string("go_default_library")),
                    ("cgo", Expr::literal("True")),
                    ("srcs", strs(&["a.go"])),
                ],
            )
            .with_comments(note)
        );
    }

    #[test]
    fn unrecognized_attribute_is_left_unmerged() {
        let file = File::new(
            "BUILD",
            vec![
                rule(
                    "go_library",
                    vec![
                        ("name", Expr::string("go_default_library")),
                        ("srcs", Expr::literal("SRCS")),
                        ("deps", strs(&["//y"])),
                    ],
                ),
                rule(
                    "cgo_library",
                    vec![
                        ("name", Expr::string("cgo_default_library")),
                        ("srcs", strs(&["a.go"])),
                        ("deps", strs(&["//x"])),
                    ],
                ),
            ],
        );
        let fixed = fixer().fix(&file).into_owned();
        let lib = Rule::from_expr(&fixed.stmts[0]).unwrap();
        assert_eq!(lib.attr("srcs"), Some(&Expr::literal("SRCS")));
        assert_eq!(lib.attr("deps"), Some(&strs(&["//y", "//x"])));
    }

    #[test]
    fn comments_from_cgo_library_follow_go_library_comments() {
        let go_comments = Comments {
            before: vec![Comment::new("# go")],
            ..Comments::default()
        };
        let cgo_comments = Comments {
            before: vec![Comment::new("# cgo")],
            after: vec![Comment::new("# cgo after")],
            ..Comments::default()
        };
        let file = File::new(
            "BUILD",
            vec![
                rule(
                    "go_library",
                    vec![("name", Expr::string("go_default_library"))],
                )
                .with_comments(go_comments),
                rule(
                    "cgo_library",
                    vec![("name", Expr::string("cgo_default_library"))],
                )
                .with_comments(cgo_comments),
            ],
        );
        let fixed = fixer().fix(&file).into_owned();
        assert_eq!(
            fixed.stmts[0].comments,
            Comments {
                before: vec![Comment::new("# go"), Comment::new("# cgo")],
                suffix: vec![],
                after: vec![Comment::new("# cgo after")],
            }
        );
    }

    #[test]
    fn duplicate_default_rules_keep_first_match() {
        let file = File::new(
            "BUILD",
            vec![
                rule(
                    "cgo_library",
                    vec![
                        ("name", Expr::string("cgo_default_library")),
                        ("srcs", strs(&["first.go"])),
                    ],
                ),
                rule(
                    "cgo_library",
                    vec![
                        ("name", Expr::string("cgo_default_library")),
                        ("srcs", strs(&["second.go"])),
                    ],
                ),
            ],
        );
        let fixed = fixer().fix(&file).into_owned();
        assert_eq!(fixed.stmts.len(), 2);
        let lib = Rule::from_expr(&fixed.stmts[0]).unwrap();
        assert_eq!(lib.kind(), "go_library");
        assert_eq!(lib.attr("srcs"), Some(&strs(&["first.go"])));
        assert!(Arc::ptr_eq(&fixed.stmts[1], &file.stmts[1]));
    }

    #[test]
    fn original_tree_is_not_mutated() {
        let file = File::new(
            "BUILD",
            vec![
                rule(
                    "go_library",
                    vec![
                        ("name", Expr::string("go_default_library")),
                        ("srcs", strs(&["a.go"])),
                    ],
                ),
                rule(
                    "cgo_library",
                    vec![
                        ("name", Expr::string("cgo_default_library")),
                        ("srcs", strs(&["b.go"])),
                    ],
                ),
            ],
        );
        let snapshot = file.clone();
        let _ = fixer().fix(&file);
        assert_eq!(file, snapshot);
    }
}
