// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device self-report.

use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// Periodic report sent by a smart board.
///
/// A board that is not yet registered is discovered by its first heartbeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heartbeat {
    /// Device id chosen by the board firmware.
    pub id: String,
    /// Measured current draw.
    ///
    /// Numbers and numeric strings are read as-is. Anything else, including
    /// a missing field, reads as zero.
    #[serde(default, deserialize_with = "lenient_current")]
    pub current: f64,
}

impl Heartbeat {
    /// Creates a heartbeat.
    #[must_use]
    pub fn new(id: impl Into<String>, current: f64) -> Self {
        Self {
            id: id.into(),
            current,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CurrentReading {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

fn lenient_current<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = match CurrentReading::deserialize(deserializer)? {
        CurrentReading::Number(n) => n,
        CurrentReading::Text(text) => text.trim().parse().unwrap_or(0.0),
        CurrentReading::Other(_) => 0.0,
    };
    Ok(if value.is_finite() { value } else { 0.0 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Heartbeat {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn current_defaults_to_zero() {
        assert_eq!(parse(r#"{"id":"esp-7"}"#).current, 0.0);
        assert_eq!(parse(r#"{"id":"esp-7","current":null}"#).current, 0.0);
    }

    #[test]
    fn current_is_read() {
        assert_eq!(
            parse(r#"{"id":"esp-7","current":1.25}"#),
            Heartbeat::new("esp-7", 1.25)
        );
    }

    #[test]
    fn current_accepts_numeric_text() {
        assert_eq!(parse(r#"{"id":"esp-7","current":"1.2"}"#).current, 1.2);
        assert_eq!(parse(r#"{"id":"esp-7","current":" 3 "}"#).current, 3.0);
    }

    #[test]
    fn unreadable_current_reads_as_zero() {
        assert_eq!(parse(r#"{"id":"esp-7","current":"n/a"}"#).current, 0.0);
        assert_eq!(parse(r#"{"id":"esp-7","current":"NaN"}"#).current, 0.0);
        assert_eq!(parse(r#"{"id":"esp-7","current":true}"#).current, 0.0);
    }

    #[test]
    fn missing_id_is_rejected() {
        assert!(serde_json::from_str::<Heartbeat>(r#"{"current":1}"#).is_err());
    }
}
