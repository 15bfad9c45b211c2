// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process store.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::StoreError;
use crate::snapshot::Snapshot;

use super::Store;

/// Keeps the persisted snapshot in memory.
///
/// Saves can be made to fail on demand, which lets callers exercise their
/// error paths without touching the filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<Option<Snapshot>>,
    fail_saves: AtomicBool,
    save_count: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `snapshot`.
    #[must_use]
    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
            ..Self::default()
        }
    }

    /// Makes subsequent saves fail with an I/O error while `fail` is `true`.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Returns a copy of the persisted snapshot.
    #[must_use]
    pub fn persisted(&self) -> Option<Snapshot> {
        self.snapshot.lock().clone()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        Ok(self.snapshot.lock().clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(io::Error::other("simulated write failure").into());
        }
        *self.snapshot.lock() = Some(snapshot.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::User;

    #[test]
    fn new_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn save_replaces_snapshot() {
        let store = MemoryStore::new();
        let snapshot = Snapshot::seed(User::new("a", "b", "admin"));

        store.save(&snapshot).unwrap();

        assert_eq!(store.persisted(), Some(snapshot));
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn failing_saves_keep_previous_snapshot() {
        let original = Snapshot::seed(User::new("a", "b", "admin"));
        let store = MemoryStore::with_snapshot(original.clone());
        store.set_fail_saves(true);

        let err = store.save(&Snapshot::default()).unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
        assert_eq!(store.persisted(), Some(original));
    }
}
