//! The in-memory output of a generation run.

use std::collections::BTreeMap;

use serde::Serialize;

/// A mapping from relative output path to generated source text.
///
/// Generators never touch the filesystem; they fill a `SourceTree` and hand
/// it to whichever collaborator writes, diffs, or inspects the files.
/// Iteration order is sorted by path, so two identical runs serialize
/// byte-for-byte identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceTree {
    files: BTreeMap<String, String>,
}

impl SourceTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file, replacing any previous content at the same path.
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Get the content of a file, if present.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Check whether a path is present.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Iterate over `(path, content)` pairs in sorted path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, c)| (p.as_str(), c.as_str()))
    }

    /// All paths in sorted order.
    pub fn paths(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// Merge another tree into this one; the other tree wins on conflicts.
    pub fn merge(&mut self, other: SourceTree) {
        self.files.extend(other.files);
    }

    /// Number of files in the tree.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check whether the tree is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
