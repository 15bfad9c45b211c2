// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Inbound messages.
//!
//! Two kinds of input reach the engine:
//!
//! | Source | Type | Transport |
//! |--------|------|-----------|
//! | Smart board | [`Heartbeat`] | `POST /api/register` |
//! | Dashboard | [`Command`] | WebSocket frame or `POST /api/command` |
//!
//! Dashboard commands share the outbound frame shape
//! `{"event": <name>, "data": <payload>}`.
//!
//! # Examples
//!
//! ```
//! use smartboard_sync::command::Command;
//!
//! let cmd = Command::parse(r#"{"event":"control","data":{"id":"dev1","cmd":"ON"}}"#).unwrap();
//! assert_eq!(cmd.name(), "control");
//! assert_eq!(cmd.device_id(), Some("dev1"));
//!
//! let cmd = Command::parse(r#"{"event":"clearLogs","data":{}}"#).unwrap();
//! assert_eq!(cmd.name(), "clearLogs");
//! ```

mod dashboard;
mod heartbeat;

pub use dashboard::{Command, EmptyPayload, Outcome};
pub use heartbeat::Heartbeat;
