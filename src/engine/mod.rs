// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command routing and state ownership.
//!
//! The [`SyncEngine`] owns the current [`Snapshot`](crate::snapshot::Snapshot),
//! applies heartbeats and dashboard commands to it one at a time, persists the
//! result and fans it out through the [`BroadcastHub`](crate::event::BroadcastHub).
//!
//! # Examples
//!
//! ```
//! use smartboard_sync::engine::SyncEngine;
//! use smartboard_sync::store::MemoryStore;
//! use smartboard_sync::types::PowerState;
//! use smartboard_sync::{Snapshot, User};
//!
//! # fn main() -> smartboard_sync::Result<()> {
//! let engine = SyncEngine::open(MemoryStore::new(), || {
//!     Snapshot::seed(User::new("admin", "admin", "admin"))
//! })?;
//!
//! let mut sub = engine.subscribe();
//! assert!(sub.try_recv().unwrap().is_sync());
//!
//! engine.control("dev1", PowerState::On)?;
//! assert_eq!(engine.device("dev1")?.power, PowerState::On);
//! # Ok(())
//! # }
//! ```

mod sync_engine;

pub use sync_engine::SyncEngine;
