// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the synchronization engine.
//!
//! This module provides the error hierarchy for the engine: value
//! validation, persistence, inbound message parsing, and device lookups.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while loading or saving the snapshot.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Error occurred while parsing an inbound message.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The referenced device id is not registered.
    ///
    /// Command handlers never surface this to dashboard clients; an unknown
    /// id turns the command into a no-op.
    #[error("unknown device: {0}")]
    UnknownDevice(String),
}

impl Error {
    /// Returns `true` if this error was caused by invalid client input
    /// rather than by the engine or its storage.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Value(_) | Self::Parse(_) | Self::UnknownDevice(_))
    }
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// An invalid power state string was provided.
    #[error("invalid power state: {0}")]
    InvalidPowerState(String),

    /// A schedule time is not a valid `HH:MM` wall-clock time.
    #[error("invalid schedule time: {0}")]
    InvalidTime(String),

    /// A device id was empty.
    #[error("device id must not be empty")]
    EmptyDeviceId,
}

/// Errors related to persisting the snapshot.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the persisted document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted document exists but cannot be parsed.
    #[error("corrupt state in {}: {source}", path.display())]
    CorruptState {
        /// Location of the unparsable document.
        path: PathBuf,
        /// The underlying decoding failure.
        source: serde_json::Error,
    },

    /// The snapshot could not be encoded.
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Errors related to parsing inbound messages.
#[derive(Debug, Error)]
pub enum ParseError {
    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::InvalidPowerState("TOGGLE".to_string());
        assert_eq!(err.to_string(), "invalid power state: TOGGLE");
    }

    #[test]
    fn error_from_value_error() {
        let err: Error = ValueError::EmptyDeviceId.into();
        assert!(matches!(err, Error::Value(ValueError::EmptyDeviceId)));
        assert!(err.is_client_error());
    }

    #[test]
    fn corrupt_state_display_names_path() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = StoreError::CorruptState {
            path: PathBuf::from("/tmp/database.json"),
            source,
        };
        assert!(err.to_string().starts_with("corrupt state in /tmp/database.json"));
    }

    #[test]
    fn store_error_is_not_client_error() {
        let io = std::io::Error::other("disk full");
        let err: Error = StoreError::from(io).into();
        assert!(!err.is_client_error());
        assert_eq!(err.to_string(), "store error: I/O error: disk full");
    }

    #[test]
    fn unknown_device_display() {
        let err = Error::UnknownDevice("esp-7".to_string());
        assert_eq!(err.to_string(), "unknown device: esp-7");
    }
}
