// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Operator commands.

use std::fmt;

use serde::de::IgnoredAny;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;
use crate::registry::{DeviceEdit, NewDevice};
use crate::snapshot::User;

/// A command issued from an operator dashboard.
///
/// Power states and schedule times are carried as the text the client sent;
/// the engine validates them when the command is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum Command {
    /// Switch a device on or off.
    Control {
        /// Target device.
        id: String,
        /// Requested state, `ON` or `OFF`.
        cmd: String,
    },

    /// Change device settings.
    SaveEdit(DeviceEdit),

    /// Register a device by hand.
    AddDevice(NewDevice),

    /// Replace the operating schedule.
    UpdateSchedule {
        /// Start time, `HH:MM`.
        start: String,
        /// End time, `HH:MM`.
        end: String,
    },

    /// Enable or disable a device's alarm.
    AlarmToggle {
        /// Target device.
        id: String,
        /// New alarm setting.
        state: bool,
    },

    /// Create a dashboard account.
    AddNewUser(User),

    /// Empty the history log.
    ClearLogs(EmptyPayload),
}

impl Command {
    /// Parses a command frame.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Json` if `text` is not a well-formed command.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Returns the event name used on the wire.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Control { .. } => "control",
            Self::SaveEdit(_) => "saveEdit",
            Self::AddDevice(_) => "addDevice",
            Self::UpdateSchedule { .. } => "updateSchedule",
            Self::AlarmToggle { .. } => "alarmToggle",
            Self::AddNewUser(_) => "addNewUser",
            Self::ClearLogs(_) => "clearLogs",
        }
    }

    /// Returns the id of the device this command targets, if any.
    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        match self {
            Self::Control { id, .. } | Self::AlarmToggle { id, .. } => Some(id),
            Self::SaveEdit(edit) => Some(&edit.id),
            Self::AddDevice(spec) => spec.id.as_deref(),
            Self::UpdateSchedule { .. } | Self::AddNewUser(_) | Self::ClearLogs(_) => None,
        }
    }
}

/// Payload of a command that carries no data.
///
/// Accepts a missing `data` field, `null` or any other value, and
/// serializes as `{}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmptyPayload;

impl Serialize for EmptyPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_map(Some(0))?.end()
    }
}

impl<'de> Deserialize<'de> for EmptyPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Going through `Option` lets a missing field read as `None`.
        Option::<IgnoredAny>::deserialize(deserializer)?;
        Ok(Self)
    }
}

/// What a handler did with a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The state changed, was persisted and broadcast.
    Applied,
    /// The command referred to nothing that exists; nothing changed.
    Ignored,
}

impl Outcome {
    /// Returns `true` if the command changed the state.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Applied => f.write_str("Applied"),
            Self::Ignored => f.write_str("Ignored"),
        }
    }
}
