// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! History entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::registry::Device;
use crate::types::PowerState;

/// One immutable record in the activity history.
///
/// The `type` tag distinguishes plain system messages from power control
/// records. Control records carry the device metadata at the time of the
/// command so reports stay accurate after the device is renamed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HistoryEntry {
    /// A system message.
    System {
        /// When the event happened.
        time: DateTime<Utc>,
        /// Human-readable description.
        event: String,
    },

    /// An operator changed the power state of a device.
    Control {
        /// When the command was applied.
        time: DateTime<Utc>,
        /// Human-readable description.
        event: String,
        /// Device name at the time of the command.
        name: String,
        /// Device location at the time of the command.
        location: String,
        /// Device class label at the time of the command.
        #[serde(rename = "classNo")]
        class_label: String,
        /// The power state that was requested.
        action: PowerState,
    },
}

impl HistoryEntry {
    /// Creates a system entry.
    #[must_use]
    pub fn system(time: DateTime<Utc>, event: impl Into<String>) -> Self {
        Self::System {
            time,
            event: event.into(),
        }
    }

    /// Creates a control entry describing `action` applied to `device`.
    #[must_use]
    pub fn control(time: DateTime<Utc>, device: &Device, action: PowerState) -> Self {
        Self::Control {
            time,
            event: format!("{} ({}) turned {action}", device.name, device.class_label),
            name: device.name.clone(),
            location: device.location.clone(),
            class_label: device.class_label.clone(),
            action,
        }
    }

    /// Returns when the event happened.
    #[must_use]
    pub fn time(&self) -> DateTime<Utc> {
        match self {
            Self::System { time, .. } | Self::Control { time, .. } => *time,
        }
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn event(&self) -> &str {
        match self {
            Self::System { event, .. } | Self::Control { event, .. } => event,
        }
    }

    /// Returns `true` for power control records.
    #[must_use]
    pub fn is_control(&self) -> bool {
        matches!(self, Self::Control { .. })
    }

    /// Returns the requested power state of a control record.
    #[must_use]
    pub fn action(&self) -> Option<PowerState> {
        match self {
            Self::Control { action, .. } => Some(*action),
            Self::System { .. } => None,
        }
    }
}
