// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device registry keyed by device id.
//!
//! The [`Registry`] owns the ordered list of [`Device`] records. Devices are
//! created by their first heartbeat or by an operator and are never deleted.
//! Every operation keeps exactly one record per id.
//!
//! # Examples
//!
//! ```
//! use chrono::Utc;
//! use smartboard_sync::registry::Registry;
//!
//! let mut registry = Registry::default();
//!
//! let first = registry.upsert_by_heartbeat("esp-7", 1.2, Utc::now());
//! assert!(first.discovered);
//!
//! let second = registry.upsert_by_heartbeat("esp-7", 0.8, Utc::now());
//! assert!(!second.discovered);
//! assert_eq!(registry.len(), 1);
//! ```

mod device;

pub use device::{
    AUTO_DETECTED_LOCATION, DEFAULT_DEPARTMENT, Device, DeviceEdit, HoursInput, NOT_AVAILABLE,
    NewDevice, default_name,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::types::PowerState;

/// Prefix of ids synthesized for manually added devices.
const MANUAL_ID_PREFIX: &str = "manual-";

/// Result of applying a heartbeat to the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct HeartbeatResult {
    /// The device after the update.
    pub device: Device,
    /// `true` if this heartbeat created the device.
    pub discovered: bool,
}

/// Ordered collection of devices, unique by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    devices: Vec<Device>,
}

impl Registry {
    /// Creates a registry from existing records.
    ///
    /// Later records with an id already seen are dropped.
    #[must_use]
    pub fn from_devices(devices: impl IntoIterator<Item = Device>) -> Self {
        let mut registry = Self::default();
        for device in devices {
            if registry.contains(&device.id) {
                tracing::warn!(device_id = %device.id, "Dropping duplicate device record");
            } else {
                registry.devices.push(device);
            }
        }
        registry
    }

    /// Returns the number of devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if no device is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Iterates over devices in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter()
    }

    /// Returns `true` if a device with `id` exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Looks up a device by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Looks up a device by id for modification.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Device> {
        self.devices.iter_mut().find(|d| d.id == id)
    }

    /// Records a heartbeat from device `id`.
    ///
    /// An unknown id creates a device with default metadata: derived name,
    /// location "Auto Detected", powered off, alarm enabled. A known id only
    /// has its `last_seen` and `current` updated; operator-set fields are
    /// left untouched.
    pub fn upsert_by_heartbeat(
        &mut self,
        id: &str,
        current: f64,
        now: DateTime<Utc>,
    ) -> HeartbeatResult {
        if let Some(device) = self.find_mut(id) {
            device.last_seen = Some(now);
            device.current = current;
            return HeartbeatResult {
                device: device.clone(),
                discovered: false,
            };
        }

        let mut device = Device::new(id, self.next_serial()).with_location(AUTO_DETECTED_LOCATION);
        device.current = current;
        device.last_seen = Some(now);
        self.devices.push(device.clone());

        HeartbeatResult {
            device,
            discovered: true,
        }
    }

    /// Registers a device on behalf of an operator.
    ///
    /// A missing or empty id is replaced by a synthesized `manual-<millis>` id
    /// that is unique at insertion time. Returns `None` without changing
    /// anything if the supplied id is already registered.
    pub fn add_manual(&mut self, spec: &NewDevice, now: DateTime<Utc>) -> Option<&Device> {
        let id = match non_empty(spec.id.as_deref()) {
            Some(id) if self.contains(id) => return None,
            Some(id) => id.to_string(),
            None => self.synthesize_id(now),
        };

        let mut device = Device::new(id, self.next_serial());
        if let Some(name) = non_empty(spec.name.as_deref()) {
            device.name = name.to_string();
        }
        if let Some(location) = non_empty(spec.location.as_deref()) {
            device.location = location.to_string();
        }
        if let Some(class_label) = non_empty(spec.class_label.as_deref()) {
            device.class_label = class_label.to_string();
        }
        self.devices.push(device);
        self.devices.last()
    }

    /// Applies a partial settings update. Returns `None` for an unknown id.
    pub fn apply_edit(&mut self, edit: &DeviceEdit) -> Option<&Device> {
        let device = self.find_mut(&edit.id)?;
        edit.apply_to(device);
        Some(&*device)
    }

    /// Sets the power state of a device. Returns `None` for an unknown id.
    pub fn set_power(&mut self, id: &str, power: PowerState) -> Option<&Device> {
        let device = self.find_mut(id)?;
        device.power = power;
        Some(&*device)
    }

    /// Enables or disables the alarm of a device. Returns `None` for an
    /// unknown id.
    pub fn set_alarm(&mut self, id: &str, enabled: bool) -> Option<&Device> {
        let device = self.find_mut(id)?;
        device.alarm_enabled = enabled;
        Some(&*device)
    }

    fn next_serial(&self) -> u32 {
        self.devices.iter().map(|d| d.serial).max().unwrap_or(0) + 1
    }

    fn synthesize_id(&self, now: DateTime<Utc>) -> String {
        let base = format!("{MANUAL_ID_PREFIX}{}", now.timestamp_millis());
        let mut candidate = base.clone();
        let mut suffix = 0u32;
        while self.contains(&candidate) {
            suffix += 1;
            candidate = format!("{base}-{suffix}");
        }
        candidate
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Serialize for Registry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.devices.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Registry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Device>::deserialize(deserializer).map(Self::from_devices)
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Device;
    type IntoIter = std::slice::Iter<'a, Device>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}
