use crate::fixers::{Fixer, FixerMeta};
use crate::registry::KnownLoads;
use bzlfix_syntax::{Expr, ExprKind, File};
use std::borrow::Cow;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Outcome of reconciling one `load` statement.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadFix {
    Unchanged,
    Replaced(Expr),
    Deleted,
}

/// Reconciles `load` statements of known files with the symbols a file actually uses.
///
/// Runs after rule fixes, which may introduce or remove symbol usages.
pub struct LoadFixer {
    known: KnownLoads,
}

/// A `load` of a known file found in the input.
struct ManagedLoad<'f> {
    index: usize,
    entry: usize,
    old: &'f Expr,
    fixed: LoadFix,
}

impl LoadFixer {
    pub const META: FixerMeta = FixerMeta {
        key: "loads",
        title: "Reconcile load statements",
        description: "Adds loads for known rule symbols that are used but not loaded, removes \
                      known symbols that are no longer used, and deletes loads left without \
                      symbols. Symbols and arguments the generator does not manage are kept. New \
                      loads go at the top of the file in registry order; managed symbols are \
                      sorted.",
        triggers: &[
            "a known rule kind is called but not loaded",
            "a known symbol is loaded but not called",
            "a load statement with no symbols",
        ],
    };

    const LOAD: &'static str = "load";

    pub fn new(known: KnownLoads) -> Self {
        Self { known }
    }

    pub fn fix_loads<'f>(&self, file: &'f File) -> Cow<'f, File> {
        let entries = self.known.entries();

        // Loads of known files may be rewritten. Symbols loaded from other files are the
        // user's choice; never add a known load for them.
        let mut loads: Vec<ManagedLoad<'f>> = Vec::new();
        let mut externally_loaded: HashSet<&'f str> = HashSet::new();
        for (index, stmt) in file.calls() {
            if stmt.call_name() != Some(Self::LOAD) {
                continue;
            }
            let Some((label, symbols)) = stmt.call_args().and_then(<[Expr]>::split_first) else {
                continue;
            };
            let Some(label) = label.as_str() else {
                continue;
            };
            if let Some(entry) = self.known.file_index(label) {
                loads.push(ManagedLoad {
                    index,
                    entry,
                    old: stmt,
                    fixed: LoadFix::Unchanged,
                });
                continue;
            }
            for sym in symbols {
                if let Some(name) = sym.as_str() {
                    externally_loaded.insert(name);
                } else if let Some((name, _)) = sym.as_keyword() {
                    externally_loaded.insert(name);
                }
            }
        }

        let mut used: Vec<BTreeSet<&'f str>> = vec![BTreeSet::new(); entries.len()];
        for (_, stmt) in file.calls() {
            let Some(kind) = stmt.call_name() else {
                continue;
            };
            if externally_loaded.contains(kind) {
                continue;
            }
            if let Some(entry) = self.known.owner_index(kind) {
                used[entry].insert(kind);
            }
        }

        // Registry order decides the order of new loads.
        let mut changed = false;
        let mut new_loads: Vec<Arc<Expr>> = Vec::new();
        let nothing = BTreeSet::new();
        for (entry, known_load) in entries.iter().enumerate() {
            let mut first = true;
            for load in loads.iter_mut().filter(|l| l.entry == entry) {
                // Only the first load of a file receives new symbols; later ones are pruned.
                let wanted = if first { &used[entry] } else { &nothing };
                load.fixed = self.fix_load(load.old, wanted);
                changed |= load.fixed != LoadFix::Unchanged;
                first = false;
            }
            if first && !used[entry].is_empty() {
                new_loads.push(Arc::new(new_load(&known_load.file, &used[entry])));
                changed = true;
            }
        }

        if !changed {
            return Cow::Borrowed(file);
        }
        debug!(
            path = %file.path,
            added = new_loads.len(),
            "reconciled load statements"
        );

        let mut stmts = Vec::with_capacity(file.stmts.len() + new_loads.len());
        stmts.extend(new_loads);
        let mut fixes = loads.into_iter().peekable();
        for (i, stmt) in file.stmts.iter().enumerate() {
            let Some(load) = fixes.next_if(|l| l.index == i) else {
                stmts.push(Arc::clone(stmt));
                continue;
            };
            match load.fixed {
                LoadFix::Unchanged => stmts.push(Arc::clone(stmt)),
                LoadFix::Replaced(expr) => stmts.push(Arc::new(expr)),
                LoadFix::Deleted => {}
            }
        }
        Cow::Owned(file.with_stmts(stmts))
    }

    /// Reconciles one load of a known file against the symbols it should provide.
    ///
    /// Known symbols not in `wanted` are dropped and missing ones are added. Other arguments
    /// (keyword loads, unknown symbols) are kept after the managed symbols, in their order.
    pub fn fix_load(&self, load: &Expr, wanted: &BTreeSet<&str>) -> LoadFix {
        let ExprKind::Call {
            callee,
            args,
            force_compact,
        } = &load.kind
        else {
            return LoadFix::Unchanged;
        };
        let Some((label, rest)) = args.split_first() else {
            return LoadFix::Unchanged;
        };

        let mut symbols: Vec<Expr> = Vec::new();
        let mut others: Vec<Expr> = Vec::new();
        let mut loaded: HashSet<&str> = HashSet::new();
        let mut removed = 0usize;
        for arg in rest {
            match arg.as_str() {
                Some(sym) if self.known.is_known_symbol(sym) => {
                    if wanted.contains(sym) {
                        loaded.insert(sym);
                        symbols.push(arg.clone());
                    } else {
                        removed += 1;
                    }
                }
                _ => others.push(arg.clone()),
            }
        }

        let mut added = 0usize;
        for sym in wanted {
            if !loaded.contains(sym) {
                symbols.push(Expr::string(*sym));
                added += 1;
            }
        }

        if added == 0 && removed == 0 {
            if rest.is_empty() {
                return LoadFix::Deleted;
            }
            return LoadFix::Unchanged;
        }

        symbols.sort_by(|a, b| a.as_str().cmp(&b.as_str()));
        let mut fixed_args = Vec::with_capacity(1 + symbols.len() + others.len());
        fixed_args.push(label.clone());
        fixed_args.extend(symbols);
        fixed_args.extend(others);
        if fixed_args.len() == 1 {
            return LoadFix::Deleted;
        }

        LoadFix::Replaced(Expr {
            kind: ExprKind::Call {
                callee: callee.clone(),
                args: fixed_args,
                force_compact: *force_compact,
            },
            comments: load.comments.clone(),
        })
    }
}

fn new_load(file: &str, symbols: &BTreeSet<&str>) -> Expr {
    let mut args = Vec::with_capacity(1 + symbols.len());
    args.push(Expr::string(file));
    args.extend(symbols.iter().map(|s| Expr::string(*s)));
    Expr::from(ExprKind::Call {
        callee: Box::new(Expr::literal(LoadFixer::LOAD)),
        args,
        force_compact: true,
    })
}

impl Fixer for LoadFixer {
    fn meta(&self) -> FixerMeta {
        Self::META
    }

    fn fix<'f>(&self, file: &'f File) -> Cow<'f, File> {
        self.fix_loads(file)
    }
}
