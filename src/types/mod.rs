// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types shared by the registry, the history log and the protocol.
//!
//! Each type validates its input at construction time, so a value that made
//! it into a [`Snapshot`](crate::Snapshot) is always well-formed.
//!
//! # Types
//!
//! - [`PowerState`] - `ON`/`OFF` power state of a device
//! - [`ScheduleTime`] - `HH:MM` time of day used by the operating schedule

mod power;
mod time;

pub use power::PowerState;
pub use time::ScheduleTime;
