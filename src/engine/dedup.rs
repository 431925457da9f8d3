//! The set of identifiers already ingested.

use std::collections::HashSet;

/// Every `guid` the engine has ingested so far.
///
/// Grows monotonically for the lifetime of the engine; there is no removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupIndex {
    seen: HashSet<String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, guid: &str) -> bool {
        self.seen.contains(guid)
    }

    /// Record `guid`.  Returns `false` if it was already present.
    pub(crate) fn insert(&mut self, guid: &str) -> bool {
        if self.seen.contains(guid) {
            return false;
        }
        self.seen.insert(guid.to_owned())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.seen.iter().map(String::as_str)
    }
}
