// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall-clock time values used by the operating schedule.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValueError;

/// A time of day with minute precision, written as `HH:MM`.
///
/// Parsing accepts `H:MM`, `HH:MM` and `HH:MM:SS`; seconds are dropped.
///
/// # Examples
///
/// ```
/// use smartboard_sync::types::ScheduleTime;
///
/// let start: ScheduleTime = "7:30".parse().unwrap();
/// assert_eq!(start.to_string(), "07:30");
/// assert!("25:00".parse::<ScheduleTime>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ScheduleTime(NaiveTime);

impl ScheduleTime {
    /// Start of the default operating window (07:30).
    pub const DEFAULT_START: Self = Self::from_hm(7, 30);

    /// End of the default operating window (13:30).
    pub const DEFAULT_END: Self = Self::from_hm(13, 30);

    const fn from_hm(hour: u32, minute: u32) -> Self {
        match NaiveTime::from_hms_opt(hour, minute, 0) {
            Some(time) => Self(time),
            None => panic!("schedule time constant out of range"),
        }
    }

    /// Creates a schedule time from an hour and minute.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidTime` if the hour or minute is out of range.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ValueError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| ValueError::InvalidTime(format!("{hour}:{minute}")))
    }

    /// Returns the hour (0-23).
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns the minute (0-59).
    #[must_use]
    pub fn minute(&self) -> u32 {
        self.0.minute()
    }
}

impl fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ScheduleTime {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveTime::parse_from_str(trimmed, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
            .map_err(|_| ValueError::InvalidTime(s.to_string()))
            .and_then(|t| Self::new(t.hour(), t.minute()))
    }
}

impl Serialize for ScheduleTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScheduleTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
