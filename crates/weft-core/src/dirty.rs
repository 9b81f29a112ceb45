//! DirtyTracker - which fields changed since load or last save
//!
//! Every write through an instance's field-access surface marks the
//! written leaf here. SAVE reads exactly this set, partitions it by
//! owning store, and only issues updates to stores owning at least one
//! dirty field. Fields whose store confirmed persistence are cleared;
//! fields whose store failed stay dirty so a retried save resubmits
//! only what failed.

use std::collections::BTreeSet;

use crate::path::FieldPath;

/// Set of leaf paths mutated since the instance was loaded or last saved
///
/// Freshly loaded or freshly created instances start empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyTracker {
    dirty: BTreeSet<FieldPath>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mutation of `path`
    pub fn mark(&mut self, path: FieldPath) {
        self.dirty.insert(path);
    }

    /// The current dirty set, in path order
    pub fn dirty_set(&self) -> &BTreeSet<FieldPath> {
        &self.dirty
    }

    /// Clear paths whose persistence was confirmed
    pub fn clear<'a, I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = &'a FieldPath>,
    {
        for path in paths {
            self.dirty.remove(path);
        }
    }

    /// Clear everything (fresh load)
    pub fn clear_all(&mut self) {
        self.dirty.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dirty.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let tracker = DirtyTracker::new();
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_mark_is_idempotent() {
        let mut tracker = DirtyTracker::new();
        tracker.mark("name".into());
        tracker.mark("name".into());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_clear_removes_only_confirmed_paths() {
        let mut tracker = DirtyTracker::new();
        tracker.mark("name".into());
        tracker.mark("penName".into());
        tracker.mark("twitter.userName".into());

        let confirmed = vec![FieldPath::from("name"), FieldPath::from("penName")];
        tracker.clear(&confirmed);

        assert_eq!(tracker.len(), 1);
        assert!(tracker.dirty_set().contains(&"twitter.userName".into()));
    }

    #[test]
    fn test_dirty_set_is_path_ordered() {
        let mut tracker = DirtyTracker::new();
        tracker.mark("twitter.userName".into());
        tracker.mark("name".into());
        let ordered: Vec<&str> = tracker.dirty_set().iter().map(|p| p.as_str()).collect();
        assert_eq!(ordered, vec!["name", "twitter.userName"]);
    }
}
