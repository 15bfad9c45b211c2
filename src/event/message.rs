// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound message types.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;
use crate::types::PowerState;

/// Messages fanned out to every subscriber.
///
/// On the wire each message is a frame `{"event": <name>, "data": <payload>}`.
/// The full [`Sync`](Self::Sync) snapshot is authoritative; the narrow
/// [`Control`](Self::Control) notice is a fast-path hint that is always
/// published before the sync that reflects it.
///
/// # Examples
///
/// ```
/// use smartboard_sync::event::{ControlNotice, SyncEvent};
/// use smartboard_sync::types::PowerState;
///
/// let event = SyncEvent::Control(ControlNotice::new("dev1", PowerState::On));
/// let json = serde_json::to_value(&event).unwrap();
///
/// assert_eq!(json["event"], "control");
/// assert_eq!(json["data"]["cmd"], "ON");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum SyncEvent {
    /// The complete system state after a mutation, or on join.
    Sync(Arc<Snapshot>),

    /// A device's power state was changed by an operator.
    Control(ControlNotice),
}

impl SyncEvent {
    /// Returns the snapshot carried by a sync message.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            Self::Sync(snapshot) => Some(snapshot),
            Self::Control(_) => None,
        }
    }

    /// Returns `true` if this is a full snapshot.
    #[must_use]
    pub fn is_sync(&self) -> bool {
        matches!(self, Self::Sync(_))
    }

    /// Returns the event name used on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sync(_) => "sync",
            Self::Control(_) => "control",
        }
    }
}

/// Narrow acknowledgment of a power command, naming only the device and
/// the requested state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlNotice {
    /// Target device.
    pub id: String,
    /// Requested power state.
    pub cmd: PowerState,
}

impl ControlNotice {
    /// Creates a control notice.
    #[must_use]
    pub fn new(id: impl Into<String>, cmd: PowerState) -> Self {
        Self { id: id.into(), cmd }
    }
}
