//! Bookkeeping for optimistic updates.
//!
//! A change is applied to local state first and confirmed remotely
//! afterwards. Several changes to the same `(actor, target)` key may be in
//! flight at once; each gets a [`Ticket`] with a sequence number, and only
//! the newest ticket for a key may reconcile local state when its
//! confirmation fails. Older failures are superseded by the newer value.

use std::collections::HashMap;
use std::hash::Hash;
use std::str::FromStr;
use std::sync::Mutex;

/// What happens to an optimistic change whose confirmation fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// Restore the pre-apply value and notify the user.
    #[default]
    Rollback,
    /// Keep the optimistic value regardless of the outcome.
    FireAndForget,
}

impl FromStr for ReconcilePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rollback" => Ok(Self::Rollback),
            "fire-and-forget" | "fire_and_forget" | "none" => Ok(Self::FireAndForget),
            other => Err(format!("unknown reconcile policy '{other}'")),
        }
    }
}

/// Handle for one in-flight mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    key: K,
    seq: u64,
}

impl<K> Ticket<K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

#[derive(Debug)]
struct Entry {
    latest: u64,
    outstanding: usize,
}

#[derive(Debug)]
struct Inner<K> {
    next_seq: u64,
    entries: HashMap<K, Entry>,
}

/// Tracks in-flight optimistic mutations per key.
#[derive(Debug)]
pub struct PendingMutations<K> {
    inner: Mutex<Inner<K>>,
}

impl<K: Eq + Hash + Clone> PendingMutations<K> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_seq: 0,
                entries: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner<K>> {
        // The map only holds counters, so a poisoned lock is still usable.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Register a new mutation for `key`. Call this in the same critical
    /// section that applies the local change.
    pub fn begin(&self, key: K) -> Ticket<K> {
        let mut inner = self.lock();
        inner.next_seq += 1;
        let seq = inner.next_seq;
        let entry = inner.entries.entry(key.clone()).or_insert(Entry {
            latest: seq,
            outstanding: 0,
        });
        entry.latest = seq;
        entry.outstanding += 1;
        Ticket { key, seq }
    }

    /// Mark `ticket` as settled. Returns `true` when it was still the
    /// newest mutation for its key, i.e. when it may reconcile local state.
    pub fn finish(&self, ticket: &Ticket<K>) -> bool {
        let mut inner = self.lock();
        let Some(entry) = inner.entries.get_mut(&ticket.key) else {
            return false;
        };
        let is_latest = entry.latest == ticket.seq;
        entry.outstanding = entry.outstanding.saturating_sub(1);
        if entry.outstanding == 0 {
            inner.entries.remove(&ticket.key);
        }
        is_latest
    }

    /// Number of unsettled mutations for `key`.
    pub fn outstanding(&self, key: &K) -> usize {
        self.lock()
            .entries
            .get(key)
            .map(|e| e.outstanding)
            .unwrap_or(0)
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.outstanding(key) > 0
    }
}

impl<K: Eq + Hash + Clone> Default for PendingMutations<K> {
    fn default() -> Self {
        Self::new()
    }
}
