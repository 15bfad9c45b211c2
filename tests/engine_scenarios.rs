// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end scenarios against the JSON file store.

use std::fs;
use std::path::Path;

use smartboard_sync::engine::SyncEngine;
use smartboard_sync::event::SyncEvent;
use smartboard_sync::store::{JsonFileStore, Store};
use smartboard_sync::types::PowerState;
use smartboard_sync::{Command, Error, Outcome, Snapshot, StoreError, User};

fn seed() -> Snapshot {
    Snapshot::seed(User::new("admin", "admin", "admin"))
}

fn open(path: &Path) -> SyncEngine {
    SyncEngine::open(JsonFileStore::new(path), seed).unwrap()
}

fn persisted(path: &Path) -> Snapshot {
    JsonFileStore::new(path).load().unwrap().unwrap()
}

// ============================================================================
// Dashboard scenarios
// ============================================================================

mod dashboard {
    use super::*;

    #[test]
    fn seed_control_then_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        let engine = open(&path);

        engine.control("dev1", PowerState::On).unwrap();

        let state = persisted(&path);
        let board = state.devices.find("dev1").unwrap();
        assert_eq!(board.power, PowerState::On);
        assert_eq!(state.history.len(), 1);
        let entry = state.history.latest().unwrap();
        assert!(entry.is_control());
        assert_eq!(entry.action(), Some(PowerState::On));
        assert_eq!(entry.event(), "Smart Board 01 (10-A) turned ON");

        engine.clear_logs().unwrap();

        let state = persisted(&path);
        assert_eq!(state.history.len(), 1);
        assert_eq!(
            state.history.latest().unwrap().event(),
            "All system logs cleared by admin."
        );
    }

    #[test]
    fn commands_from_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        let engine = open(&path);

        let frames = [
            r#"{"event":"addDevice","data":{"id":"lab-1","name":"Lab Board","location":"Lab","classNo":"11-B"}}"#,
            r#"{"event":"saveEdit","data":{"id":"lab-1","dept":"Science","hours":"12h","alarmOn":false}}"#,
            r#"{"event":"updateSchedule","data":{"start":"08:00","end":"14:00"}}"#,
            r#"{"event":"addNewUser","data":{"id":"op","pass":"pw","role":"operator"}}"#,
        ];
        for frame in frames {
            let outcome = engine.dispatch(Command::parse(frame).unwrap()).unwrap();
            assert_eq!(outcome, Outcome::Applied, "{frame}");
        }

        let state = persisted(&path);
        let board = state.devices.find("lab-1").unwrap();
        assert_eq!(board.department, "Science");
        assert_eq!(board.hours, 12);
        assert!(!board.alarm_enabled);
        assert_eq!(state.schedule.start.to_string(), "08:00");
        assert_eq!(state.users.len(), 2);

        let events: Vec<_> = state.history.iter().map(|e| e.event().to_string()).collect();
        assert_eq!(
            events,
            [
                "New user added: op",
                "Schedule updated: 07:30 - 13:30 -> 08:00 - 14:00",
                "Settings updated for Lab Board (11-B)",
                "Device added manually: Lab Board",
            ]
        );
    }

    #[test]
    fn unknown_device_commands_leave_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        let engine = open(&path);
        let before = fs::read_to_string(&path).unwrap();

        for frame in [
            r#"{"event":"control","data":{"id":"ghost","cmd":"ON"}}"#,
            r#"{"event":"saveEdit","data":{"id":"ghost","name":"X"}}"#,
            r#"{"event":"alarmToggle","data":{"id":"ghost","state":false}}"#,
        ] {
            let outcome = engine.dispatch(Command::parse(frame).unwrap()).unwrap();
            assert_eq!(outcome, Outcome::Ignored, "{frame}");
        }

        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }
}

// ============================================================================
// Device scenarios
// ============================================================================

mod devices {
    use super::*;

    #[test]
    fn auto_discovery() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        let engine = open(&path);
        let mut dashboard = engine.subscribe();
        dashboard.try_recv().unwrap();

        let power = engine.heartbeat("esp-42", 0.8).unwrap();

        assert_eq!(power, PowerState::Off);
        let state = persisted(&path);
        let board = state.devices.find("esp-42").unwrap();
        assert_eq!(board.name, "Smart Board esp-42");
        assert_eq!(board.location, "Auto Detected");
        assert_eq!(board.class_label, "N/A");
        assert_eq!(board.department, "General");
        assert_eq!(board.serial, 2);
        assert!(board.last_seen.is_some());
        assert_eq!(
            state.history.latest().unwrap().event(),
            "New device auto-discovered: esp-42"
        );

        let Some(SyncEvent::Sync(pushed)) = dashboard.try_recv() else {
            panic!("expected sync");
        };
        assert_eq!(*pushed, state);
    }

    #[test]
    fn repeated_heartbeats_log_discovery_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        let engine = open(&path);

        for current in [0.1, 0.2, 0.3] {
            engine.heartbeat("esp-42", current).unwrap();
        }

        let state = persisted(&path);
        assert_eq!(state.devices.len(), 2);
        assert_eq!(state.history.len(), 1);
    }

    #[test]
    fn board_learns_operator_power_on_next_heartbeat() {
        let dir = tempfile::tempdir().unwrap();
        let engine = open(&dir.path().join("database.json"));
        engine.heartbeat("esp-42", 0.0).unwrap();

        engine.control("esp-42", PowerState::On).unwrap();

        assert_eq!(engine.heartbeat("esp-42", 1.5).unwrap(), PowerState::On);
    }
}

// ============================================================================
// Persistence
// ============================================================================

mod persistence {
    use super::*;

    #[test]
    fn state_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");

        {
            let engine = open(&path);
            engine.heartbeat("esp-42", 0.8).unwrap();
            engine.control("dev1", PowerState::On).unwrap();
        }

        let engine = SyncEngine::open(JsonFileStore::new(&path), || {
            panic!("existing state must be loaded")
        })
        .unwrap();
        let state = engine.snapshot();
        assert_eq!(state.devices.len(), 2);
        assert_eq!(state.history.len(), 2);
        assert_eq!(engine.device("dev1").unwrap().power, PowerState::On);
    }

    #[test]
    fn corrupt_file_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        fs::write(&path, "{\"devices\": [").unwrap();

        let err = SyncEngine::open(JsonFileStore::new(&path), seed).unwrap_err();

        assert!(matches!(err, Error::Store(StoreError::CorruptState { .. })));
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"devices\": [");
    }

    #[test]
    fn older_documents_without_collections_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.json");
        fs::write(
            &path,
            r#"{"devices":[{"id":"dev1","name":"Board","power":"ON"}],"extra":true}"#,
        )
        .unwrap();

        let engine = open(&path);

        let state = engine.snapshot();
        assert!(state.history.is_empty());
        assert!(state.users.is_empty());
        assert_eq!(engine.device("dev1").unwrap().power, PowerState::On);
    }

    #[test]
    fn failed_write_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let path = data_dir.join("database.json");
        let engine = open(&path);
        let before = engine.snapshot();

        // Replace the data directory with a file so the next write fails
        fs::remove_dir_all(&data_dir).unwrap();
        fs::write(&data_dir, "not a directory").unwrap();

        let err = engine.control("dev1", PowerState::On).unwrap_err();

        assert!(matches!(err, Error::Store(StoreError::Io(_))));
        assert_eq!(*engine.snapshot(), *before);
    }
}
