use serde::{Deserialize, Serialize};

/// A single comment line, including its leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub token: String,
}

impl Comment {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Returns true if this comment is exactly the directive `word`, or `word:` followed by a
    /// reason, e.g. `# keep` or `# keep: generated by hand`. Prose that merely starts with the
    /// word (`# keep in sync with //foo`) is not a directive.
    pub fn is_directive(&self, word: &str) -> bool {
        let body = self.token.trim_start_matches('#').trim();
        match body.strip_prefix(word) {
            Some(rest) => rest.is_empty() || rest.starts_with(':'),
            None => false,
        }
    }
}

/// The three comment groups attached to a node.
///
/// - before: full-line comments above the node
/// - suffix: a trailing comment on the node's last line
/// - after: full-line comments below the node, before the next sibling
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comments {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<Comment>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suffix: Vec<Comment>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<Comment>,
}

impl Comments {
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.suffix.is_empty() && self.after.is_empty()
    }

    /// Appends `other`'s groups after this node's own, group by group.
    pub fn append(&mut self, other: &Comments) {
        self.before.extend(other.before.iter().cloned());
        self.suffix.extend(other.suffix.iter().cloned());
        self.after.extend(other.after.iter().cloned());
    }

    /// Concatenation of `self` followed by `other`.
    pub fn concat(&self, other: &Comments) -> Comments {
        let mut out = self.clone();
        out.append(other);
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &Comment> {
        self.before
            .iter()
            .chain(self.suffix.iter())
            .chain(self.after.iter())
    }

    /// Returns true if any comment in any group is the directive `word`.
    pub fn has_directive(&self, word: &str) -> bool {
        self.iter().any(|c| c.is_directive(word))
    }
}
