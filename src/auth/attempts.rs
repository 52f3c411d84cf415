//! Failed-attempt bookkeeping keyed by presented username.
//!
//! The table is process memory only and starts empty on every restart.

use std::time::Instant;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Consecutive failures recorded for one presented username.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedAttemptRecord {
    pub attempt_count: u32,
    pub last_attempt_at: Instant,
}

/// Storage for failed-attempt records.
///
/// `update` must run the closure with every other access to the same key
/// excluded, so a read-check-write sequence cannot interleave with another
/// one for that key. Different keys may proceed in parallel.
pub trait AttemptStore: Send + Sync + 'static {
    /// Hands `f` the current record for `key` (`None` if there is none).
    /// Whatever `f` leaves in the slot is stored; leaving `None` deletes it.
    fn update<R>(&self, key: &str, f: impl FnOnce(&mut Option<FailedAttemptRecord>) -> R) -> R;

    /// Drops every record for which `keep` returns false.
    fn retain(&self, keep: &mut dyn FnMut(&FailedAttemptRecord) -> bool);
}

/// Sharded in-memory table. Each key's entry lock is held for the duration
/// of an `update`.
#[derive(Debug, Default)]
pub struct InMemoryAttemptStore {
    records: DashMap<String, FailedAttemptRecord>,
}

impl InMemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &str) -> Option<FailedAttemptRecord> {
        self.records.get(key).map(|r| *r)
    }
}

impl AttemptStore for InMemoryAttemptStore {
    fn update<R>(&self, key: &str, f: impl FnOnce(&mut Option<FailedAttemptRecord>) -> R) -> R {
        match self.records.entry(key.to_owned()) {
            Entry::Occupied(mut entry) => {
                let mut slot = Some(*entry.get());
                let out = f(&mut slot);
                match slot {
                    Some(record) => {
                        entry.insert(record);
                    }
                    None => {
                        entry.remove();
                    }
                }
                out
            }
            Entry::Vacant(entry) => {
                let mut slot = None;
                let out = f(&mut slot);
                if let Some(record) = slot {
                    entry.insert(record);
                }
                out
            }
        }
    }

    fn retain(&self, keep: &mut dyn FnMut(&FailedAttemptRecord) -> bool) {
        self.records.retain(|_, record| keep(record));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(count: u32) -> FailedAttemptRecord {
        FailedAttemptRecord {
            attempt_count: count,
            last_attempt_at: Instant::now(),
        }
    }

    #[test]
    fn test_update_creates_and_deletes() {
        let store = InMemoryAttemptStore::new();
        store.update("alice", |slot| {
            assert!(slot.is_none());
            *slot = Some(record(1));
        });
        assert_eq!(store.get("alice").map(|r| r.attempt_count), Some(1));

        store.update("alice", |slot| *slot = None);
        assert!(store.get("alice").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_vacant_entry_left_empty_is_not_stored() {
        let store = InMemoryAttemptStore::new();
        let seen = store.update("ghost", |slot| slot.is_some());
        assert!(!seen);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_retain_filters_records() {
        let store = InMemoryAttemptStore::new();
        store.update("a", |slot| *slot = Some(record(1)));
        store.update("b", |slot| *slot = Some(record(5)));
        store.retain(&mut |r| r.attempt_count < 5);
        assert!(store.get("a").is_some());
        assert!(store.get("b").is_none());
    }
}
