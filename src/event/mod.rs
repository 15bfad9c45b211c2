// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan-out of state changes to connected clients.
//!
//! The [`BroadcastHub`] delivers every committed [`Snapshot`] to all
//! subscribers, preceded by a narrow [`ControlNotice`] when the change was a
//! power command. A new subscriber always starts with the latest snapshot.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use smartboard_sync::event::BroadcastHub;
//! use smartboard_sync::Snapshot;
//!
//! let hub = BroadcastHub::new(Arc::new(Snapshot::default()));
//!
//! // The first message is always the current state
//! let mut sub = hub.subscribe();
//! assert!(sub.try_recv().unwrap().is_sync());
//! ```
//!
//! [`Snapshot`]: crate::snapshot::Snapshot

mod hub;
mod message;

pub use hub::{BroadcastHub, DEFAULT_CHANNEL_CAPACITY, Subscription};
pub use message::{ControlNotice, SyncEvent};
