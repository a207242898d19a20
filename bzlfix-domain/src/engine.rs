use crate::config::FixConfig;
use crate::fixers::{self, Fixer};
use bzlfix_syntax::File;
use std::borrow::Cow;
use tracing::debug;

/// Result of running every enabled fixer over one file.
#[derive(Debug, Clone, PartialEq)]
pub struct FixResult {
    pub file: File,
    /// Keys of the fixers that rewrote the file, in run order.
    pub applied: Vec<&'static str>,
}

impl FixResult {
    pub fn changed(&self) -> bool {
        !self.applied.is_empty()
    }
}

/// Runs fixers in order, each on the previous one's output.
pub struct FixEngine {
    fixers: Vec<Box<dyn Fixer>>,
}

impl Default for FixEngine {
    fn default() -> Self {
        Self::new(&FixConfig::default())
    }
}

impl FixEngine {
    pub fn new(config: &FixConfig) -> Self {
        Self {
            fixers: fixers::builtin_fixers(config),
        }
    }

    pub fn with_fixers(fixers: Vec<Box<dyn Fixer>>) -> Self {
        Self { fixers }
    }

    /// Drops the fixers whose key is listed.
    pub fn without(mut self, keys: &[String]) -> Self {
        self.fixers
            .retain(|f| !keys.iter().any(|k| k == f.meta().key));
        self
    }

    pub fn fixer_keys(&self) -> Vec<&'static str> {
        self.fixers.iter().map(|f| f.meta().key).collect()
    }

    pub fn fix(&self, file: &File) -> FixResult {
        let mut current = Cow::Borrowed(file);
        let mut applied = Vec::new();
        for fixer in &self.fixers {
            let rewritten = match fixer.fix(&current) {
                Cow::Owned(f) => Some(f),
                Cow::Borrowed(_) => None,
            };
            if let Some(f) = rewritten {
                let key = fixer.meta().key;
                debug!(path = %file.path, fixer = key, "fixer rewrote file");
                applied.push(key);
                current = Cow::Owned(f);
            }
        }
        FixResult {
            file: current.into_owned(),
            applied,
        }
    }
}
