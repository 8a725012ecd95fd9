//! Attempt history: a bounded most-recent-first buffer, persisted under a
//! versioned key.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::error::Result;
use crate::storage::KeyValueStore;

pub const HISTORY_KEY: &str = "trainer_history_v1";
pub const HISTORY_CAP: usize = 5;

/// Fixed-capacity, most-recent-first buffer. Inserting into a full buffer
/// evicts the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundedHistory<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> BoundedHistory<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        BoundedHistory {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build from items already ordered most-recent-first; extras beyond
    /// the capacity are dropped from the old end.
    pub fn from_recent_first(items: impl IntoIterator<Item = T>, capacity: usize) -> Self {
        let mut history = Self::with_capacity(capacity);
        for item in items.into_iter().take(history.capacity) {
            history.items.push_back(item);
        }
        history
    }

    /// Insert at the front and return the evicted entry, if any.
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_front(item);
        if self.items.len() > self.capacity {
            self.items.pop_back()
        } else {
            None
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }
}

impl<T: Clone> BoundedHistory<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

/// One evaluated attempt, as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub ts: u64,
    pub score: f64,
    pub level: String,
    pub scenario: String,
    pub response: String,
    pub feedback_html: String,
}

/// Current time in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// History persisted in a [`KeyValueStore`]. Every mutation writes through.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    store: KeyValueStore,
    entries: BoundedHistory<HistoryEntry>,
}

impl HistoryStore {
    /// Load whatever is stored; an unreadable value starts empty.
    pub fn load(store: KeyValueStore) -> Self {
        let stored: Vec<HistoryEntry> = store.get(HISTORY_KEY).unwrap_or_default();
        let entries = BoundedHistory::from_recent_first(stored, HISTORY_CAP);
        debug!(count = entries.len(), "history loaded");
        HistoryStore { store, entries }
    }

    /// Memory only changes once the new list is on disk.
    pub fn append(&mut self, entry: HistoryEntry) -> Result<()> {
        let mut next = self.entries.clone();
        next.push(entry);
        self.store.set(HISTORY_KEY, &next.to_vec())?;
        self.entries = next;
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        self.store.remove(HISTORY_KEY)
    }

    pub fn entries(&self) -> &BoundedHistory<HistoryEntry> {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn entry(ts: u64) -> HistoryEntry {
        HistoryEntry {
            ts,
            score: 70.0,
            level: "Strong".to_string(),
            scenario: format!("scenario {ts}"),
            response: format!("response {ts}"),
            feedback_html: String::new(),
        }
    }

    #[test]
    fn test_push_inserts_at_front() {
        let mut h = BoundedHistory::with_capacity(3);
        h.push(1);
        h.push(2);
        assert_eq!(h.to_vec(), vec![2, 1]);
    }

    #[test]
    fn test_push_evicts_oldest_when_full() {
        let mut h = BoundedHistory::with_capacity(2);
        assert_eq!(h.push('a'), None);
        assert_eq!(h.push('b'), None);
        assert_eq!(h.push('c'), Some('a'));
        assert_eq!(h.to_vec(), vec!['c', 'b']);
    }

    #[test]
    fn test_from_recent_first_truncates_old_end() {
        let h = BoundedHistory::from_recent_first(vec![9, 8, 7, 6, 5, 4, 3], 5);
        assert_eq!(h.to_vec(), vec![9, 8, 7, 6, 5]);
    }

    #[test]
    fn test_zero_capacity_is_bumped_to_one() {
        let mut h = BoundedHistory::with_capacity(0);
        h.push(1);
        h.push(2);
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.to_vec(), vec![2]);
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let json = serde_json::to_string(&entry(1)).unwrap();
        assert!(json.contains("\"feedbackHtml\""));
        assert!(json.contains("\"ts\":1"));
    }

    #[test]
    fn test_store_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let kv = KeyValueStore::new(dir.path().join("store.json"));
        let mut store = HistoryStore::load(kv.clone());
        store.append(entry(1)).unwrap();
        store.append(entry(2)).unwrap();

        let reloaded = HistoryStore::load(kv);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.get(0).unwrap().ts, 2);
        assert_eq!(reloaded.get(1).unwrap().ts, 1);
    }

    #[test]
    fn test_store_caps_at_five() {
        let dir = tempdir().unwrap();
        let kv = KeyValueStore::new(dir.path().join("store.json"));
        let mut store = HistoryStore::load(kv.clone());
        for ts in 0..8 {
            store.append(entry(ts)).unwrap();
        }
        let stored: Vec<HistoryEntry> = kv.get(HISTORY_KEY).unwrap();
        let ts: Vec<u64> = stored.iter().map(|e| e.ts).collect();
        assert_eq!(ts, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn test_failed_write_leaves_history_unchanged() {
        let dir = tempdir().unwrap();
        // a directory cannot be replaced by the store file
        let kv = KeyValueStore::new(dir.path());
        let mut store = HistoryStore::load(kv.clone());
        assert!(store.append(entry(1)).is_err());
        assert_eq!(store.len(), 0);
        assert!(store.get(0).is_none());
        assert_eq!(kv.get::<Vec<HistoryEntry>>(HISTORY_KEY), None);
    }

    #[test]
    fn test_clear_removes_key() {
        let dir = tempdir().unwrap();
        let kv = KeyValueStore::new(dir.path().join("store.json"));
        let mut store = HistoryStore::load(kv.clone());
        store.append(entry(1)).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        assert_eq!(kv.get::<Vec<HistoryEntry>>(HISTORY_KEY), None);
    }

    #[test]
    fn test_now_ms_is_reasonable() {
        assert!(now_ms() > 1_700_000_000_000);
    }

    proptest! {
        #[test]
        fn prop_length_capped_and_recent_first(n in 0usize..40) {
            let mut h = BoundedHistory::with_capacity(HISTORY_CAP);
            for i in 0..n {
                h.push(i);
            }
            prop_assert!(h.len() <= HISTORY_CAP);
            let items = h.to_vec();
            prop_assert!(items.windows(2).all(|w| w[0] > w[1]));
            if n > 0 {
                prop_assert_eq!(items[0], n - 1);
            }
        }
    }
}
