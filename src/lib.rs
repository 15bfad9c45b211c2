// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `smartboard_sync` - device-state synchronization for a fleet of smart
//! boards.
//!
//! Boards report in with periodic heartbeats; operators change their state
//! from web dashboards. This crate keeps one authoritative [`Snapshot`] of
//! the whole system, persists it after every change and pushes it to every
//! connected dashboard.
//!
//! # Architecture
//!
//! - [`store`]: durable storage of the snapshot as a single JSON document
//! - [`registry`]: the set of known boards and how they are created
//! - [`history`]: a bounded, newest-first activity log
//! - [`engine`]: applies heartbeats and commands one at a time
//! - [`event`]: fans committed snapshots out to subscribers
//! - `server` (feature `server`): HTTP and WebSocket front end
//!
//! # Quick Start
//!
//! ```
//! use smartboard_sync::engine::SyncEngine;
//! use smartboard_sync::store::MemoryStore;
//! use smartboard_sync::{Command, Outcome, Snapshot, User};
//!
//! # fn main() -> smartboard_sync::Result<()> {
//! let engine = SyncEngine::open(MemoryStore::new(), || {
//!     Snapshot::seed(User::new("admin", "admin", "admin"))
//! })?;
//!
//! // Every subscriber starts with the full state
//! let mut dashboard = engine.subscribe();
//! assert!(dashboard.try_recv().unwrap().is_sync());
//!
//! // A board reports in
//! let power = engine.heartbeat("esp-01", 0.4)?;
//! assert!(!power.is_on());
//!
//! // An operator switches it on
//! let cmd = Command::parse(r#"{"event":"control","data":{"id":"esp-01","cmd":"ON"}}"#)?;
//! assert_eq!(engine.dispatch(cmd)?, Outcome::Applied);
//! # Ok(())
//! # }
//! ```
//!
//! ## Running the server
//!
//! ```no_run
//! use std::sync::Arc;
//! use smartboard_sync::config::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::new().with_data_file("./database.json");
//!     let engine = Arc::new(config.open_engine()?);
//!
//!     smartboard_sync::server::serve(engine, config.bind(), async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod history;
pub mod registry;
#[cfg(feature = "server")]
pub mod server;
pub mod snapshot;
pub mod store;
pub mod types;

pub use command::{Command, EmptyPayload, Heartbeat, Outcome};
pub use config::ServerConfig;
pub use engine::SyncEngine;
pub use error::{Error, ParseError, Result, StoreError, ValueError};
pub use event::{BroadcastHub, ControlNotice, Subscription, SyncEvent};
pub use history::{HistoryEntry, HistoryLog};
pub use registry::{Device, DeviceEdit, NewDevice, Registry};
pub use snapshot::{Schedule, Snapshot, User};
pub use store::{JsonFileStore, MemoryStore, Store};
pub use types::{PowerState, ScheduleTime};
