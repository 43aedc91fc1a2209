//! Bounded, deduplicated, order-significant history cache.

use std::collections::VecDeque;

use crate::types::{HistoryConfig, HistoryRecord};

/// Ordered sequence of history records, most-recent-first, bounded by a
/// fixed capacity.
///
/// Invariants:
/// - `len() <= capacity()` at all times.
/// - no two records share the same `(equation, result)` pair.
/// - order encodes recency: a re-committed record moves to the front.
///
/// Deduplication is the caller's protocol, not a property of a single
/// operation: always try [`promote`](Self::promote) first and call
/// [`insert_front`](Self::insert_front) only when it returned `false`.
#[derive(Debug, Clone)]
pub struct HistoryCache {
    records: VecDeque<HistoryRecord>,
    capacity: usize,
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryCache {
    /// Create an empty cache with the default capacity.
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    /// Create an empty cache with a custom configuration.
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            records: VecDeque::new(),
            capacity: config.capacity,
        }
    }

    /// Move an existing record with the same `(equation, result)` to the
    /// front. Returns `false` (cache unchanged) when no match exists.
    ///
    /// The passed record replaces the matched one, so a caller-supplied
    /// icon travels with the re-insertion.
    pub fn promote(&mut self, record: &HistoryRecord) -> bool {
        let Some(idx) = self.records.iter().position(|r| r.same_entry(record)) else {
            return false;
        };
        self.records.remove(idx);
        self.records.push_front(record.clone());
        true
    }

    /// Unshift a record; evicts the oldest (tail) record past capacity.
    ///
    /// No deduplication check happens here; callers must `promote` first.
    pub fn insert_front(&mut self, record: HistoryRecord) {
        self.records.push_front(record);
        if self.records.len() > self.capacity {
            self.records.pop_back();
        }
    }

    /// Empty the sequence.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Ordered copy of the records (most-recent-first) for persistence or
    /// display.
    pub fn snapshot(&self) -> Vec<HistoryRecord> {
        self.records.iter().cloned().collect()
    }

    /// Iterate the records, most-recent-first.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    /// Get a record by position (0 = most recent).
    pub fn get(&self, idx: usize) -> Option<&HistoryRecord> {
        self.records.get(idx)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Icon;

    fn rec(equation: &str, result: &str) -> HistoryRecord {
        HistoryRecord::new(equation, result, Icon::Calculate)
    }

    #[test]
    fn test_insert_front_orders_most_recent_first() {
        let mut cache = HistoryCache::new();
        cache.insert_front(rec("1+1", "2"));
        cache.insert_front(rec("2+2", "4"));

        let snap = cache.snapshot();
        assert_eq!(snap[0].equation, "2+2");
        assert_eq!(snap[1].equation, "1+1");
    }

    #[test]
    fn test_insert_front_evicts_tail_past_capacity() {
        let mut cache = HistoryCache::with_config(HistoryConfig { capacity: 3 });
        for i in 0..5 {
            cache.insert_front(rec(&format!("{i}"), &format!("{i}")));
        }
        assert_eq!(cache.len(), 3);
        // Oldest two were evicted
        let equations: Vec<_> = cache.iter().map(|r| r.equation.as_str()).collect();
        assert_eq!(equations, vec!["4", "3", "2"]);
    }

    #[test]
    fn test_promote_moves_match_to_front() {
        let mut cache = HistoryCache::new();
        cache.insert_front(rec("a", "1"));
        cache.insert_front(rec("b", "2"));
        cache.insert_front(rec("c", "3"));

        assert!(cache.promote(&rec("a", "1")));
        let equations: Vec<_> = cache.iter().map(|r| r.equation.as_str()).collect();
        assert_eq!(equations, vec!["a", "c", "b"]);
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_promote_misses_leave_cache_unchanged() {
        let mut cache = HistoryCache::new();
        cache.insert_front(rec("a", "1"));

        // Same equation, different result: not the same entry
        assert!(!cache.promote(&rec("a", "2")));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(0).unwrap().result, "1");
    }

    #[test]
    fn test_promote_carries_new_icon() {
        let mut cache = HistoryCache::new();
        cache.insert_front(rec("a", "1"));

        let selected = HistoryRecord::new("a", "1", Icon::Function);
        assert!(cache.promote(&selected));
        assert_eq!(cache.get(0).unwrap().icon, Icon::Function);
    }

    #[test]
    fn test_commit_protocol_never_duplicates() {
        let mut cache = HistoryCache::new();
        for _ in 0..3 {
            let r = rec("2+2", "4");
            if !cache.promote(&r) {
                cache.insert_front(r);
            }
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cache = HistoryCache::new();
        cache.insert_front(rec("a", "1"));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.snapshot().is_empty());
    }
}
