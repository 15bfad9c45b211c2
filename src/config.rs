// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Server configuration.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::engine::SyncEngine;
use crate::error::Result;
use crate::event::DEFAULT_CHANNEL_CAPACITY;
use crate::snapshot::{Snapshot, User};
use crate::store::JsonFileStore;

/// Configuration for a sync server.
///
/// # Examples
///
/// ```
/// use smartboard_sync::config::ServerConfig;
///
/// // Defaults
/// let config = ServerConfig::new();
/// assert_eq!(config.bind().port(), 3000);
///
/// // With all options
/// let config = ServerConfig::new()
///     .with_bind(([127, 0, 0, 1], 8080).into())
///     .with_data_file("/var/lib/smartboard/database.json")
///     .with_broadcast_capacity(64)
///     .with_admin("root", "changeme");
/// assert_eq!(config.admin_id(), "root");
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    bind: SocketAddr,
    data_file: PathBuf,
    broadcast_capacity: usize,
    admin_id: String,
    admin_pass: String,
}

impl ServerConfig {
    /// Default listen port.
    pub const DEFAULT_PORT: u16 = 3000;
    /// Default location of the persisted snapshot.
    pub const DEFAULT_DATA_FILE: &'static str = "./database.json";
    /// Default id and password of the seed admin account.
    pub const DEFAULT_ADMIN: &'static str = "admin";

    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], Self::DEFAULT_PORT)),
            data_file: PathBuf::from(Self::DEFAULT_DATA_FILE),
            broadcast_capacity: DEFAULT_CHANNEL_CAPACITY,
            admin_id: Self::DEFAULT_ADMIN.to_string(),
            admin_pass: Self::DEFAULT_ADMIN.to_string(),
        }
    }

    /// Sets the listen address.
    #[must_use]
    pub fn with_bind(mut self, bind: SocketAddr) -> Self {
        self.bind = bind;
        self
    }

    /// Sets the file the snapshot is persisted to.
    #[must_use]
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = path.into();
        self
    }

    /// Sets how many messages a slow subscriber may fall behind before it
    /// is resynchronized.
    #[must_use]
    pub fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity.max(1);
        self
    }

    /// Sets the account written into a fresh data file.
    ///
    /// Has no effect once the data file exists.
    #[must_use]
    pub fn with_admin(mut self, id: impl Into<String>, pass: impl Into<String>) -> Self {
        self.admin_id = id.into();
        self.admin_pass = pass.into();
        self
    }

    /// Returns the listen address.
    #[must_use]
    pub fn bind(&self) -> SocketAddr {
        self.bind
    }

    /// Returns the data file path.
    #[must_use]
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Returns the broadcast capacity.
    #[must_use]
    pub fn broadcast_capacity(&self) -> usize {
        self.broadcast_capacity
    }

    /// Returns the seed admin id.
    #[must_use]
    pub fn admin_id(&self) -> &str {
        &self.admin_id
    }

    /// Builds the snapshot used when no data file exists yet.
    #[must_use]
    pub fn seed_snapshot(&self) -> Snapshot {
        Snapshot::seed(User::new(&self.admin_id, &self.admin_pass, "admin"))
    }

    /// Opens a [`SyncEngine`] on the configured data file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the data file is corrupt or cannot be
    /// created.
    pub fn open_engine(&self) -> Result<SyncEngine> {
        SyncEngine::open_with_capacity(
            JsonFileStore::new(&self.data_file),
            || self.seed_snapshot(),
            self.broadcast_capacity,
        )
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}
