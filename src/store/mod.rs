// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Durable storage for the system [`Snapshot`].
//!
//! The store has no partial-update primitive: every mutation writes the
//! whole snapshot. Callers serialize access through the
//! [`SyncEngine`](crate::engine::SyncEngine), so a store is never written by
//! two mutations at once.
//!
//! # Implementations
//!
//! - [`JsonFileStore`]: a single pretty-printed JSON document on disk
//! - [`MemoryStore`]: an in-process store for tests and embedding

mod file_store;
mod memory_store;

pub use file_store::JsonFileStore;
pub use memory_store::MemoryStore;

use crate::error::StoreError;
use crate::snapshot::Snapshot;

/// Trait for snapshot persistence backends.
pub trait Store: Send + Sync {
    /// Loads the persisted snapshot.
    ///
    /// Returns `Ok(None)` if nothing has been persisted yet.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::CorruptState` if the persisted document cannot
    /// be parsed, or `StoreError::Io` if it cannot be read.
    fn load(&self) -> Result<Option<Snapshot>, StoreError>;

    /// Persists `snapshot`, replacing the previous document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if the document cannot be written. The
    /// previously persisted document is left intact.
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// Loads the persisted snapshot, persisting `seed` first if nothing has
    /// been persisted yet.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`load`](Self::load) and [`save`](Self::save).
    /// A corrupt document is never replaced by the seed.
    fn load_or_init(&self, seed: impl FnOnce() -> Snapshot) -> Result<Snapshot, StoreError>
    where
        Self: Sized,
    {
        if let Some(snapshot) = self.load()? {
            return Ok(snapshot);
        }

        let snapshot = seed();
        self.save(&snapshot)?;
        tracing::info!("Initialized state with default snapshot");
        Ok(snapshot)
    }
}

impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        (**self).save(snapshot)
    }
}
