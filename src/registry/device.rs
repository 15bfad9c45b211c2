// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device records and the operator-supplied shapes that create or edit them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::PowerState;

/// Location assigned to devices that registered themselves by heartbeat.
pub const AUTO_DETECTED_LOCATION: &str = "Auto Detected";

/// Department assigned to new devices.
pub const DEFAULT_DEPARTMENT: &str = "General";

/// Placeholder for unknown location or class labels.
pub const NOT_AVAILABLE: &str = "N/A";

/// A display device tracked by the registry.
///
/// Field names on the wire follow the dashboard protocol (`sn`, `classNo`,
/// `dept`, `alarmOn`, `lastSeen`). A device that has never reported has a
/// `lastSeen` of `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Unique identifier, reported by the device firmware or synthesized.
    pub id: String,
    /// Serial number, assigned in insertion order starting at 1.
    #[serde(rename = "sn", default)]
    pub serial: u32,
    /// Display name.
    pub name: String,
    /// Physical location.
    #[serde(default)]
    pub location: String,
    /// Class the board is assigned to.
    #[serde(rename = "classNo", default)]
    pub class_label: String,
    /// Owning department.
    #[serde(rename = "dept", default)]
    pub department: String,
    /// Usage hours entered by an operator.
    #[serde(default)]
    pub hours: i64,
    /// Power state last requested by an operator.
    #[serde(default)]
    pub power: PowerState,
    /// Last current reading reported by the device, in Amperes.
    #[serde(default)]
    pub current: f64,
    /// Whether the schedule alarm is enabled for this board.
    #[serde(rename = "alarmOn", default = "alarm_default")]
    pub alarm_enabled: bool,
    /// Time of the last heartbeat.
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
}

fn alarm_default() -> bool {
    true
}

impl Device {
    /// Creates a device with default metadata for the given id.
    ///
    /// The name is derived from the id; the device starts powered off with
    /// its alarm enabled and has never been seen.
    #[must_use]
    pub fn new(id: impl Into<String>, serial: u32) -> Self {
        let id = id.into();
        Self {
            name: default_name(&id),
            id,
            serial,
            location: NOT_AVAILABLE.to_string(),
            class_label: NOT_AVAILABLE.to_string(),
            department: DEFAULT_DEPARTMENT.to_string(),
            hours: 0,
            power: PowerState::Off,
            current: 0.0,
            alarm_enabled: true,
            last_seen: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the location.
    #[must_use]
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = location.into();
        self
    }

    /// Sets the class label.
    #[must_use]
    pub fn with_class_label(mut self, class_label: impl Into<String>) -> Self {
        self.class_label = class_label.into();
        self
    }

    /// Returns `true` if the device has reported at least once.
    #[must_use]
    pub fn has_been_seen(&self) -> bool {
        self.last_seen.is_some()
    }
}

/// Derives the display name of a device from its id.
#[must_use]
pub fn default_name(id: &str) -> String {
    format!("Smart Board {id}")
}

/// Operator request to register a device by hand.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDevice {
    /// Requested id; synthesized when absent or empty.
    #[serde(default)]
    pub id: Option<String>,
    /// Display name; derived from the id when absent or empty.
    #[serde(default)]
    pub name: Option<String>,
    /// Physical location.
    #[serde(default)]
    pub location: Option<String>,
    /// Class label.
    #[serde(rename = "classNo", default)]
    pub class_label: Option<String>,
}

/// Operator request to change the settings of an existing device.
///
/// Every field is optional. A supplied, non-empty value replaces the stored
/// one; an absent or empty value leaves it unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEdit {
    /// Target device.
    pub id: String,
    /// New display name.
    #[serde(default)]
    pub name: Option<String>,
    /// New location.
    #[serde(default)]
    pub location: Option<String>,
    /// New class label.
    #[serde(rename = "classNo", default)]
    pub class_label: Option<String>,
    /// New department.
    #[serde(rename = "dept", default)]
    pub department: Option<String>,
    /// New usage hours, see [`HoursInput::to_hours`].
    #[serde(default)]
    pub hours: Option<HoursInput>,
    /// New alarm setting.
    #[serde(rename = "alarmOn", default)]
    pub alarm_enabled: Option<bool>,
}

impl DeviceEdit {
    /// Creates an edit for `id` that changes nothing.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Applies this edit to `device`.
    ///
    /// Empty strings and unreadable hours leave the field as it was.
    pub fn apply_to(&self, device: &mut Device) {
        replace_if_present(&mut device.name, self.name.as_deref());
        replace_if_present(&mut device.location, self.location.as_deref());
        replace_if_present(&mut device.class_label, self.class_label.as_deref());
        replace_if_present(&mut device.department, self.department.as_deref());

        if let Some(hours) = self.hours.as_ref().and_then(HoursInput::to_hours) {
            device.hours = hours;
        }
        if let Some(alarm) = self.alarm_enabled {
            device.alarm_enabled = alarm;
        }
    }
}

fn replace_if_present(field: &mut String, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        *field = value.to_string();
    }
}

/// Usage hours as sent by a dashboard: either a JSON number or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HoursInput {
    /// A JSON number.
    Number(f64),
    /// A string typed into a form field.
    Text(String),
}

impl HoursInput {
    /// Resolves the input to whole hours.
    ///
    /// Returns `None` when the input counts as absent (an empty or
    /// whitespace-only string). Numbers are truncated. Text is read up to
    /// the first non-digit after an optional sign; text that does not start
    /// with a digit resolves to `0` instead of failing.
    #[must_use]
    pub fn to_hours(&self) -> Option<i64> {
        match self {
            Self::Number(n) if n.is_finite() => {
                // Saturating float-to-int cast is the intended clamp
                #[allow(clippy::cast_possible_truncation)]
                Some(n.trunc() as i64)
            }
            Self::Number(_) => Some(0),
            Self::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    None
                } else {
                    Some(leading_integer(text).unwrap_or(0))
                }
            }
        }
    }
}

fn leading_integer(text: &str) -> Option<i64> {
    let digits_start = usize::from(text.starts_with(['-', '+']));
    let digits_len = text[digits_start..]
        .bytes()
        .take_while(u8::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    text[..digits_start + digits_len].parse().ok()
}
