// ABOUTME: Recency-ordered stack of previously active sessions backing "back"
// Holds no consecutive duplicates; stale ids are pruned lazily against the live set

use crate::models::{LiveSessions, SessionId};

/// Previously active sessions, oldest first and most recent last.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStack {
    entries: Vec<SessionId>,
}

impl HistoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a stack from stored entries (oldest first), collapsing any
    /// consecutive repeats a hand-edited or older file might contain.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SessionId>,
    {
        let mut entries: Vec<SessionId> = entries.into_iter().map(Into::into).collect();
        entries.dedup();
        Self { entries }
    }

    pub fn entries(&self) -> &[SessionId] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent entry.
    pub fn top(&self) -> Option<&SessionId> {
        self.entries.last()
    }

    /// Entries from most recent to oldest, with their stack positions.
    pub fn iter_recent(&self) -> impl Iterator<Item = (usize, &SessionId)> {
        self.entries.iter().enumerate().rev()
    }

    /// Pushes `id` unless it already sits on top, then drops the oldest
    /// entries until at most `max_depth` remain.
    pub fn push(&mut self, id: SessionId, max_depth: usize) {
        if self.top() != Some(&id) {
            self.entries.push(id);
        }
        if self.entries.len() > max_depth {
            let excess = self.entries.len() - max_depth;
            self.entries.drain(..excess);
        }
    }

    /// Keeps the entries below `index`, discarding it and everything above.
    pub fn truncate(&mut self, index: usize) {
        self.entries.truncate(index);
    }

    /// Removes every reference to `id`. Returns whether anything was removed.
    pub fn remove_all(&mut self, id: &SessionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry != id);
        if self.entries.len() == before {
            return false;
        }
        self.entries.dedup();
        true
    }

    /// Drops ids that are no longer live. Removing an entry can bring two
    /// equal neighbours together, so those are collapsed as well.
    pub fn prune(&mut self, live: &LiveSessions) -> bool {
        let before = self.entries.clone();
        self.entries.retain(|entry| live.contains(entry));
        self.entries.dedup();
        self.entries != before
    }

    /// Returns a pruned copy without touching `self`.
    pub fn pruned(&self, live: &LiveSessions) -> Self {
        let mut copy = self.clone();
        copy.prune(live);
        copy
    }

    pub fn has_consecutive_duplicates(&self) -> bool {
        self.entries.windows(2).any(|pair| pair[0] == pair[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(stack: &HistoryStack) -> Vec<&str> {
        stack.entries().iter().map(SessionId::as_str).collect()
    }

    #[test]
    fn test_push_skips_repeat_of_top() {
        let mut stack = HistoryStack::new();
        stack.push("a".into(), 10);
        stack.push("a".into(), 10);
        stack.push("b".into(), 10);
        assert_eq!(ids(&stack), vec!["a", "b"]);
    }

    #[test]
    fn test_push_drops_oldest_over_cap() {
        let mut stack = HistoryStack::from_entries(["a", "b", "c"]);
        stack.push("d".into(), 3);
        assert_eq!(ids(&stack), vec!["b", "c", "d"]);
    }

    #[test]
    fn test_push_shrinks_to_lowered_cap() {
        let mut stack = HistoryStack::from_entries(["a", "b", "c", "d", "e"]);
        stack.push("f".into(), 2);
        assert_eq!(ids(&stack), vec!["e", "f"]);
    }

    #[test]
    fn test_from_entries_collapses_repeats() {
        let stack = HistoryStack::from_entries(["a", "a", "b", "b", "a"]);
        assert_eq!(ids(&stack), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_prune_collapses_exposed_neighbours() {
        let mut stack = HistoryStack::from_entries(["a", "dead", "a", "b"]);
        let live = LiveSessions::from_ids(["a", "b"]);
        assert!(stack.prune(&live));
        assert_eq!(ids(&stack), vec!["a", "b"]);
    }

    #[test]
    fn test_prune_reports_unchanged() {
        let mut stack = HistoryStack::from_entries(["a", "b"]);
        let live = LiveSessions::from_ids(["a", "b", "c"]);
        assert!(!stack.prune(&live));
    }

    #[test]
    fn test_remove_all() {
        let mut stack = HistoryStack::from_entries(["a", "x", "a", "x"]);
        assert!(stack.remove_all(&"x".into()));
        assert_eq!(ids(&stack), vec!["a"]);
        assert!(!stack.remove_all(&"x".into()));
    }

    #[test]
    fn test_truncate_discards_entry_and_above() {
        let mut stack = HistoryStack::from_entries(["a", "b", "c"]);
        stack.truncate(1);
        assert_eq!(ids(&stack), vec!["a"]);
    }

    fn name() -> impl Strategy<Value = String> {
        prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(String::from)
    }

    proptest! {
        #[test]
        fn push_respects_cap_and_adjacency(
            names in proptest::collection::vec(name(), 0..64),
            cap in 1usize..8,
        ) {
            let mut stack = HistoryStack::new();
            for n in names {
                stack.push(n.into(), cap);
                prop_assert!(stack.len() <= cap);
                prop_assert!(!stack.has_consecutive_duplicates());
            }
        }

        #[test]
        fn prune_leaves_only_live_without_repeats(
            entries in proptest::collection::vec(name(), 0..32),
            live in proptest::collection::vec(name(), 0..4),
        ) {
            let live = LiveSessions::from_ids(live);
            let mut stack = HistoryStack::from_entries(entries);
            stack.prune(&live);
            prop_assert!(stack.entries().iter().all(|e| live.contains(e)));
            prop_assert!(!stack.has_consecutive_duplicates());
        }
    }
}
