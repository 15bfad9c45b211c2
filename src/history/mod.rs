// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bounded activity history.
//!
//! The [`HistoryLog`] keeps the most recent [`MAX_ENTRIES`] entries, newest
//! first. Appending past the bound drops the oldest entry.
//!
//! # Examples
//!
//! ```
//! use chrono::Utc;
//! use smartboard_sync::history::{HistoryEntry, HistoryLog};
//!
//! let mut log = HistoryLog::new();
//! log.append(HistoryEntry::system(Utc::now(), "first"));
//! log.append(HistoryEntry::system(Utc::now(), "second"));
//!
//! assert_eq!(log.latest().unwrap().event(), "second");
//! ```

mod entry;

pub use entry::HistoryEntry;

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Maximum number of entries retained.
pub const MAX_ENTRIES: usize = 1000;

/// Event recorded when an operator clears the history.
pub const LOGS_CLEARED_EVENT: &str = "All system logs cleared by admin.";

/// Newest-first, bounded list of history entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLog {
    entries: VecDeque<HistoryEntry>,
}

impl HistoryLog {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry` at the front, dropping the oldest entries past
    /// [`MAX_ENTRIES`].
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(MAX_ENTRIES);
    }

    /// Empties the history, then records that it was cleared.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        self.entries.clear();
        self.append(HistoryEntry::system(now, LOGS_CLEARED_EVENT));
    }

    /// Returns the most recent entry.
    #[must_use]
    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    /// Returns the entry at `index`, where 0 is the most recent.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}

impl FromIterator<HistoryEntry> for HistoryLog {
    /// Collects entries already ordered newest-first, keeping the newest
    /// [`MAX_ENTRIES`].
    fn from_iter<I: IntoIterator<Item = HistoryEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().take(MAX_ENTRIES).collect(),
        }
    }
}

impl Serialize for HistoryLog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for HistoryLog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<HistoryEntry>::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry::system(Utc::now(), format!("event {n}"))
    }

    #[test]
    fn append_puts_newest_first() {
        let mut log = HistoryLog::new();
        log.append(entry(1));
        log.append(entry(2));

        assert_eq!(log.get(0).unwrap().event(), "event 2");
        assert_eq!(log.get(1).unwrap().event(), "event 1");
    }

    #[test]
    fn append_past_bound_drops_oldest() {
        let mut log = HistoryLog::new();
        for n in 1..=MAX_ENTRIES {
            log.append(entry(n));
        }
        assert_eq!(log.len(), MAX_ENTRIES);

        log.append(entry(MAX_ENTRIES + 1));

        assert_eq!(log.len(), MAX_ENTRIES);
        assert_eq!(log.latest().unwrap().event(), "event 1001");
        assert_eq!(log.get(MAX_ENTRIES - 1).unwrap().event(), "event 2");
        assert!(log.iter().all(|e| e.event() != "event 1"));
    }

    #[test]
    fn clear_leaves_single_marker_entry() {
        let mut log = HistoryLog::new();
        log.append(entry(1));
        log.append(entry(2));

        log.clear(Utc::now());

        assert_eq!(log.len(), 1);
        let marker = log.latest().unwrap();
        assert_eq!(marker.event(), LOGS_CLEARED_EVENT);
        assert!(!marker.is_control());
    }

    #[test]
    fn deserialize_truncates_oversized_history() {
        let entries: Vec<_> = (0..MAX_ENTRIES + 5).map(entry).collect();
        let json = serde_json::to_string(&entries).unwrap();

        let log: HistoryLog = serde_json::from_str(&json).unwrap();

        assert_eq!(log.len(), MAX_ENTRIES);
        assert_eq!(log.latest().unwrap().event(), "event 0");
    }

    #[test]
    fn serializes_as_array() {
        let mut log = HistoryLog::new();
        log.append(entry(1));
        let json = serde_json::to_value(&log).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
    }
}
