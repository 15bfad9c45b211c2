// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The single-writer sync engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::command::{Command, Outcome};
use crate::error::{Error, Result, ValueError};
use crate::event::{BroadcastHub, ControlNotice, DEFAULT_CHANNEL_CAPACITY, Subscription};
use crate::history::HistoryEntry;
use crate::registry::{Device, DeviceEdit, NewDevice};
use crate::snapshot::{Schedule, Snapshot, User};
use crate::store::Store;
use crate::types::{PowerState, ScheduleTime};

/// Owns the system state and applies every change to it.
///
/// Each change runs as one step under a single lock: the current snapshot is
/// cloned, the clone is modified and persisted, and only then does it become
/// current and get broadcast. If persisting fails, the engine keeps the
/// previous snapshot and nothing is broadcast.
///
/// Handlers are synchronous and never hold the lock across an `.await`.
///
/// # Examples
///
/// ```
/// use smartboard_sync::engine::SyncEngine;
/// use smartboard_sync::store::MemoryStore;
/// use smartboard_sync::{Outcome, Snapshot, User};
///
/// # fn main() -> smartboard_sync::Result<()> {
/// let engine = SyncEngine::open(MemoryStore::new(), || {
///     Snapshot::seed(User::new("admin", "admin", "admin"))
/// })?;
///
/// // A heartbeat from an unknown board registers it
/// engine.heartbeat("esp-42", 0.8)?;
/// assert!(engine.device("esp-42").is_ok());
///
/// // Commands for unknown boards change nothing
/// assert_eq!(engine.alarm_toggle("ghost", false)?, Outcome::Ignored);
/// # Ok(())
/// # }
/// ```
pub struct SyncEngine {
    store: Arc<dyn Store>,
    current: Mutex<Arc<Snapshot>>,
    hub: BroadcastHub,
}

impl std::fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncEngine")
            .field("subscribers", &self.hub.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl SyncEngine {
    /// Opens the engine on `store`.
    ///
    /// If the store holds no snapshot yet, `seed` is called once and its
    /// result is persisted before the engine starts.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the persisted snapshot cannot be read or
    /// the seed cannot be written. A corrupt document is reported as
    /// `StoreError::CorruptState` and left untouched.
    pub fn open<S>(store: S, seed: impl FnOnce() -> Snapshot) -> Result<Self>
    where
        S: Store + 'static,
    {
        Self::open_with_capacity(store, seed, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Opens the engine with a custom broadcast buffer size.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn open_with_capacity<S>(
        store: S,
        seed: impl FnOnce() -> Snapshot,
        capacity: usize,
    ) -> Result<Self>
    where
        S: Store + 'static,
    {
        let snapshot = Arc::new(store.load_or_init(seed)?);
        tracing::info!(
            devices = snapshot.devices.len(),
            history = snapshot.history.len(),
            users = snapshot.users.len(),
            "Sync engine ready"
        );

        Ok(Self {
            store: Arc::new(store),
            hub: BroadcastHub::with_capacity(Arc::clone(&snapshot), capacity),
            current: Mutex::new(snapshot),
        })
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.lock())
    }

    /// Returns a copy of the device with `id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownDevice` if no such device is registered.
    pub fn device(&self, id: &str) -> Result<Device> {
        self.current
            .lock()
            .devices
            .find(id)
            .cloned()
            .ok_or_else(|| Error::UnknownDevice(id.to_string()))
    }

    /// Subscribes to state changes.
    ///
    /// The first message is the current snapshot. No change can be committed
    /// between that snapshot and the first live message.
    #[must_use]
    pub fn subscribe(&self) -> Subscription {
        let _guard = self.current.lock();
        self.hub.subscribe()
    }

    /// Returns the number of connected subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.hub.subscriber_count()
    }

    // =========================================================================
    // Device input
    // =========================================================================

    /// Records a heartbeat from board `id` reporting `current`.
    ///
    /// An unknown board is registered and a discovery entry is logged. A
    /// known board only has its last-seen time and current updated.
    ///
    /// Returns the power state the board should apply.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::EmptyDeviceId` for an empty id, or
    /// `Error::Store` if the change cannot be persisted.
    pub fn heartbeat(&self, id: &str, current: f64) -> Result<PowerState> {
        if id.trim().is_empty() {
            return Err(ValueError::EmptyDeviceId.into());
        }

        let mut power = PowerState::default();
        self.commit(None, |snapshot, now| {
            let result = snapshot.devices.upsert_by_heartbeat(id, current, now);
            if result.discovered {
                tracing::info!(device_id = %id, "New device discovered");
                snapshot.history.append(HistoryEntry::system(
                    now,
                    format!("New device auto-discovered: {id}"),
                ));
            } else {
                tracing::debug!(device_id = %id, current, "Heartbeat");
            }
            power = result.device.power;
            Ok(true)
        })?;
        Ok(power)
    }

    // =========================================================================
    // Dashboard commands
    // =========================================================================

    /// Applies a parsed dashboard command.
    ///
    /// # Errors
    ///
    /// Returns `Error::Value` if the command carries an invalid power state
    /// or schedule time, or `Error::Store` if the change cannot be persisted.
    pub fn dispatch(&self, command: Command) -> Result<Outcome> {
        tracing::debug!(command = command.name(), "Dispatching command");
        match command {
            Command::Control { id, cmd } => self.control(&id, cmd.parse()?),
            Command::SaveEdit(edit) => self.save_edit(&edit),
            Command::AddDevice(spec) => self.add_device(&spec),
            Command::UpdateSchedule { start, end } => self.update_schedule(Schedule {
                start: start.parse::<ScheduleTime>()?,
                end: end.parse::<ScheduleTime>()?,
            }),
            Command::AlarmToggle { id, state } => self.alarm_toggle(&id, state),
            Command::AddNewUser(user) => self.add_user(user),
            Command::ClearLogs(_) => self.clear_logs(),
        }
    }

    /// Switches board `id` on or off.
    ///
    /// A control entry is logged and the narrow control notice is published
    /// ahead of the full snapshot. An unknown id changes nothing and
    /// publishes nothing.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the change cannot be persisted.
    pub fn control(&self, id: &str, cmd: PowerState) -> Result<Outcome> {
        let outcome = self.commit(Some(ControlNotice::new(id, cmd)), |snapshot, now| {
            let Some(device) = snapshot.devices.set_power(id, cmd) else {
                return Ok(false);
            };
            let entry = HistoryEntry::control(now, device, cmd);
            snapshot.history.append(entry);
            Ok(true)
        })?;

        if outcome.is_applied() {
            tracing::info!(device_id = %id, power = %cmd, "Power changed");
        } else {
            tracing::warn!(device_id = %id, "Ignoring control for unknown device");
        }
        Ok(outcome)
    }

    /// Changes the settings of an existing board.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the change cannot be persisted.
    pub fn save_edit(&self, edit: &DeviceEdit) -> Result<Outcome> {
        let outcome = self.commit(None, |snapshot, now| {
            let Some(device) = snapshot.devices.apply_edit(edit) else {
                return Ok(false);
            };
            let event = format!(
                "Settings updated for {} ({})",
                device.name, device.class_label
            );
            snapshot.history.append(HistoryEntry::system(now, event));
            Ok(true)
        })?;

        if !outcome.is_applied() {
            tracing::warn!(device_id = %edit.id, "Ignoring edit for unknown device");
        }
        Ok(outcome)
    }

    /// Registers a board on behalf of an operator.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the change cannot be persisted.
    pub fn add_device(&self, spec: &NewDevice) -> Result<Outcome> {
        let outcome = self.commit(None, |snapshot, now| {
            let Some(device) = snapshot.devices.add_manual(spec, now) else {
                return Ok(false);
            };
            tracing::info!(device_id = %device.id, "Device added manually");
            let event = format!("Device added manually: {}", device.name);
            snapshot.history.append(HistoryEntry::system(now, event));
            Ok(true)
        })?;

        if !outcome.is_applied() {
            tracing::warn!(device_id = ?spec.id, "Ignoring add for already registered id");
        }
        Ok(outcome)
    }

    /// Replaces the operating schedule.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the change cannot be persisted.
    pub fn update_schedule(&self, schedule: Schedule) -> Result<Outcome> {
        self.commit(None, |snapshot, now| {
            let old = std::mem::replace(&mut snapshot.schedule, schedule);
            let event = format!(
                "Schedule updated: {} - {} -> {} - {}",
                old.start, old.end, schedule.start, schedule.end
            );
            snapshot.history.append(HistoryEntry::system(now, event));
            Ok(true)
        })
    }

    /// Enables or disables the alarm of board `id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the change cannot be persisted.
    pub fn alarm_toggle(&self, id: &str, enabled: bool) -> Result<Outcome> {
        let outcome = self.commit(None, |snapshot, _| {
            Ok(snapshot.devices.set_alarm(id, enabled).is_some())
        })?;

        if !outcome.is_applied() {
            tracing::warn!(device_id = %id, "Ignoring alarm toggle for unknown device");
        }
        Ok(outcome)
    }

    /// Adds a dashboard account.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the change cannot be persisted.
    pub fn add_user(&self, user: User) -> Result<Outcome> {
        self.commit(None, |snapshot, now| {
            tracing::info!(user_id = %user.id, role = %user.role, "User added");
            let event = format!("New user added: {}", user.id);
            snapshot.users.push(user);
            snapshot.history.append(HistoryEntry::system(now, event));
            Ok(true)
        })
    }

    /// Empties the history, leaving only the clear marker.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the change cannot be persisted.
    pub fn clear_logs(&self) -> Result<Outcome> {
        self.commit(None, |snapshot, now| {
            snapshot.history.clear(now);
            Ok(true)
        })
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Runs `mutate` on a copy of the current snapshot and commits it.
    ///
    /// `mutate` returns `false` to leave the state untouched. On success the
    /// optional `notice` is published before the new snapshot.
    fn commit<F>(&self, notice: Option<ControlNotice>, mutate: F) -> Result<Outcome>
    where
        F: FnOnce(&mut Snapshot, DateTime<Utc>) -> Result<bool>,
    {
        let mut current = self.current.lock();
        let mut next = Snapshot::clone(&current);

        if !mutate(&mut next, Utc::now())? {
            return Ok(Outcome::Ignored);
        }

        self.store.save(&next).inspect_err(|e| {
            tracing::error!(error = %e, "Failed to persist snapshot, change discarded");
        })?;

        let next = Arc::new(next);
        *current = Arc::clone(&next);

        if let Some(notice) = notice {
            self.hub.publish_event(notice);
        }
        let delivered = self.hub.publish_sync(next);
        tracing::trace!(delivered, "Snapshot broadcast");

        Ok(Outcome::Applied)
    }
}
