// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The aggregate system state.
//!
//! A [`Snapshot`] is both the unit of persistence and the unit of broadcast:
//! the store writes it whole and every subscriber receives it whole.

use serde::{Deserialize, Serialize};

use crate::history::HistoryLog;
use crate::registry::{Device, Registry};
use crate::types::ScheduleTime;

/// Daily operating window of the boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    /// Start of the window.
    pub start: ScheduleTime,
    /// End of the window.
    pub end: ScheduleTime,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            start: ScheduleTime::DEFAULT_START,
            end: ScheduleTime::DEFAULT_END,
        }
    }
}

/// A dashboard account.
///
/// Credentials are stored as given. There is no uniqueness check and no
/// hashing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Login id.
    pub id: String,
    /// Password.
    pub pass: String,
    /// Role name, e.g. `admin`.
    #[serde(default)]
    pub role: String,
}

impl User {
    /// Creates a user record.
    #[must_use]
    pub fn new(id: impl Into<String>, pass: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pass: pass.into(),
            role: role.into(),
        }
    }
}

/// Complete system state: schedule, devices, history and users.
///
/// Missing collections deserialize as empty so older documents keep loading
/// when fields are added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Operating schedule.
    #[serde(default)]
    pub schedule: Schedule,
    /// Registered devices.
    #[serde(default)]
    pub devices: Registry,
    /// Activity history, newest first.
    #[serde(default)]
    pub history: HistoryLog,
    /// Dashboard accounts.
    #[serde(default)]
    pub users: Vec<User>,
}

impl Snapshot {
    /// Builds the snapshot written on first-ever startup.
    ///
    /// It contains the default schedule, one powered-off board `dev1` that
    /// has never reported, an empty history and a single admin account.
    #[must_use]
    pub fn seed(admin: User) -> Self {
        let board = Device::new("dev1", 1)
            .with_name("Smart Board 01")
            .with_location("Main Hall")
            .with_class_label("10-A");

        Self {
            schedule: Schedule::default(),
            devices: Registry::from_devices([board]),
            history: HistoryLog::new(),
            users: vec![admin],
        }
    }
}
