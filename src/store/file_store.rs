// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON document store.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::snapshot::Snapshot;

use super::Store;

/// Stores the snapshot as a single pretty-printed JSON file.
///
/// Writes go to a sibling temporary file that is renamed over the target,
/// so a failed write never leaves a truncated document behind.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store backed by the file at `path`.
    ///
    /// The file is not touched until the first load or save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let snapshot =
            serde_json::from_str(&contents).map_err(|source| StoreError::CorruptState {
                path: self.path.clone(),
                source,
            })?;

        tracing::debug!(path = %self.path.display(), "Loaded snapshot");
        Ok(Some(snapshot))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(snapshot).map_err(StoreError::Encode)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let temp = self.temp_path();
        fs::write(&temp, contents)?;
        if let Err(e) = fs::rename(&temp, &self.path) {
            let _ = fs::remove_file(&temp);
            return Err(e.into());
        }

        tracing::trace!(path = %self.path.display(), "Saved snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::User;

    fn seed() -> Snapshot {
        Snapshot::seed(User::new("admin", "admin", "admin"))
    }

    #[test]
    fn load_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("database.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_returns_same_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("database.json"));

        store.save(&seed()).unwrap();

        assert_eq!(store.load().unwrap(), Some(seed()));
        assert!(!store.temp_path().exists());
    }

    #[test]
    fn load_or_init_persists_seed_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        let store = JsonFileStore::new(&path);

        let first = store.load_or_init(seed).unwrap();
        assert!(path.exists());

        let second = store
            .load_or_init(|| panic!("seed must not be used twice"))
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn corrupt_file_is_reported_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.load_or_init(seed).unwrap_err();

        assert!(matches!(err, StoreError::CorruptState { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn never_seen_text_timestamp_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        let legacy = r#"{
            "devices": [{
                "id": "dev1", "sn": 1, "name": "Smart Board 1",
                "location": "Main Hall", "classNo": "10-A", "dept": "Science",
                "power": "OFF", "current": 0, "hours": 0,
                "alarmOn": true, "lastSeen": "Never"
            }],
            "schedule": {"start": "07:30", "end": "13:30"},
            "history": [],
            "users": [{"id": "admin", "pass": "admin", "role": "admin"}]
        }"#;
        fs::write(&path, legacy).unwrap();
        let store = JsonFileStore::new(&path);

        let err = store.load_or_init(seed).unwrap_err();

        assert!(matches!(err, StoreError::CorruptState { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), legacy);
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/state/database.json"));

        store.save(&seed()).unwrap();

        assert!(store.path().exists());
    }

    #[test]
    fn save_into_unwritable_location_fails_with_io() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let store = JsonFileStore::new(blocker.join("database.json"));

        let err = store.save(&seed()).unwrap_err();

        assert!(matches!(err, StoreError::Io(_)));
    }
}
