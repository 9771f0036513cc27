//! Shared backlog of alerted-but-unresolved document identifiers.
//!
//! The detector admits identifiers, the resolver drains and removes them.
//! Membership is split into two disjoint sets behind one mutex:
//! - `pending`: admitted since the resolver's last drain
//! - `tracked`: handed over to the resolver's working view
//!
//! An identifier lives in at most one of them, so the backlog as a whole is a
//! set and every operation is applied under a single lock acquisition.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct BacklogState {
    pending: HashSet<String>,
    tracked: HashSet<String>,
}

/// Concurrency-safe deduplicated set of document identifiers.
#[derive(Debug, Default)]
pub struct Backlog {
    state: Mutex<BacklogState>,
}

impl Backlog {
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation leaves both sets consistent before the guard drops, so a
    // panic elsewhere while holding the lock cannot leave a half-applied change.
    fn lock(&self) -> MutexGuard<'_, BacklogState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Admit an identifier. Returns `false` if it was already present.
    pub fn add(&self, id: &str) -> bool {
        let mut state = self.lock();
        if state.tracked.contains(id) || state.pending.contains(id) {
            return false;
        }
        state.pending.insert(id.to_string())
    }

    /// Move everything admitted since the last drain into the working view.
    ///
    /// Returns the identifiers that were moved.
    pub fn drain_all_pending(&self) -> HashSet<String> {
        let mut state = self.lock();
        let drained = std::mem::take(&mut state.pending);
        state.tracked.extend(drained.iter().cloned());
        drained
    }

    /// Remove an identifier. Returns `false` if it was not present.
    pub fn remove(&self, id: &str) -> bool {
        let mut state = self.lock();
        state.tracked.remove(id) || state.pending.remove(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        let state = self.lock();
        state.tracked.contains(id) || state.pending.contains(id)
    }

    /// Total outstanding identifiers, pending and tracked.
    pub fn len(&self) -> usize {
        let state = self.lock();
        state.pending.len() + state.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Identifiers waiting for the next drain.
    pub fn pending_len(&self) -> usize {
        self.lock().pending.len()
    }

    /// Stable copy of the resolver's working view, sorted for deterministic
    /// iteration.
    pub fn tracked_snapshot(&self) -> Vec<String> {
        let state = self.lock();
        let mut ids: Vec<String> = state.tracked.iter().cloned().collect();
        ids.sort();
        ids
    }
}
