// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Millisecond-precision UTC timestamps for the wire protocol.
//!
//! Wire format: `YYYY-MM-DDTHH:MM:SS.mmmZ`. Parsing accepts any timezone
//! offset and normalizes to UTC (§6).

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(3))
    }

    pub fn from_epoch_ms(ms: u64) -> Self {
        let dt = DateTime::<Utc>::from_timestamp_millis(ms as i64).unwrap_or_else(|| Utc::now());
        Self(dt.trunc_subsecs(3))
    }

    pub fn epoch_ms(&self) -> i64 {
        self.0.timestamp_millis()
    }

    pub fn inner(&self) -> DateTime<Utc> {
        self.0
    }

    /// Parse any RFC3339-ish timestamp (any offset) and normalize to UTC,
    /// truncating to millisecond precision.
    pub fn parse(s: &str) -> Result<Self, TimestampParseError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| TimestampParseError(e.to_string()))?;
        Ok(Self(dt.with_timezone(&Utc).trunc_subsecs(3)))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S%.3fZ"))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Timestamp::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("invalid timestamp: {0}")]
pub struct TimestampParseError(String);

#[cfg(test)]
#[path = "timestamp_tests.rs"]
mod tests;
