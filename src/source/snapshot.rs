//! Wire types for the `/api/state` document.
//!
//! These types match the JSON served by the Butaman backend. Decoding is
//! strict: a sample that is neither a non-negative integer nor the `-1`
//! sentinel, or a field of the wrong type, rejects the whole document.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// A complete snapshot of every monitored target.
///
/// Keys are target addresses. `BTreeMap` keeps iteration ordered by address,
/// which gives the table its stable row order.
pub type Snapshot = BTreeMap<String, TargetState>;

/// Raw value the backend uses for a failed check.
pub const UNREACHABLE_SENTINEL: i64 = -1;

/// Epoch values above this are taken as milliseconds rather than seconds.
const EPOCH_MILLIS_CUTOFF: f64 = 100_000_000_000.0;

/// State of a single target as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetState {
    /// Human-readable name from the backend's host list.
    pub name: String,

    /// When the last successful check happened, if ever.
    #[serde(default)]
    pub last_success: Option<Timestamp>,

    /// RTT samples, oldest first.
    pub history: Vec<Rtt>,

    /// When the target was last checked, successful or not.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<Timestamp>,
}

impl TargetState {
    /// The most recent sample, if any.
    pub fn latest(&self) -> Option<Rtt> {
        self.history.last().copied()
    }
}

/// A single round-trip-time sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rtt {
    /// Successful check, in whole milliseconds.
    Millis(u64),
    /// The check failed or timed out.
    Unreachable,
}

impl Rtt {
    /// Interpret a raw wire value. Returns `None` for values that are
    /// neither the sentinel nor a representable millisecond count.
    pub fn from_raw(raw: i64) -> Option<Self> {
        if raw == UNREACHABLE_SENTINEL {
            return Some(Rtt::Unreachable);
        }
        u64::try_from(raw).ok().map(Rtt::Millis)
    }

    pub fn millis(self) -> Option<u64> {
        match self {
            Rtt::Millis(ms) => Some(ms),
            Rtt::Unreachable => None,
        }
    }

    pub fn is_unreachable(self) -> bool {
        matches!(self, Rtt::Unreachable)
    }
}

impl fmt::Display for Rtt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rtt::Millis(ms) => write!(f, "{}ms", ms),
            Rtt::Unreachable => f.write_str("×"),
        }
    }
}

impl Serialize for Rtt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Rtt::Millis(ms) => serializer.serialize_u64(*ms),
            Rtt::Unreachable => serializer.serialize_i64(UNREACHABLE_SENTINEL),
        }
    }
}

struct RttVisitor;

impl<'de> de::Visitor<'de> for RttVisitor {
    type Value = Rtt;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative RTT in milliseconds or -1")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Rtt, E> {
        Ok(Rtt::Millis(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Rtt, E> {
        Rtt::from_raw(v).ok_or_else(|| E::invalid_value(de::Unexpected::Signed(v), &self))
    }
}

impl<'de> Deserialize<'de> for Rtt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_i64(RttVisitor)
    }
}

/// A timestamp as the backend reports it.
///
/// The backend formats timestamps as local-time strings; numeric values
/// are accepted as Unix epoch seconds (or milliseconds when large).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Text(String),
    Epoch(serde_json::Number),
}

impl Timestamp {
    /// Format for display. Text is shown verbatim, epoch values as UTC.
    pub fn display(&self) -> String {
        match self {
            Timestamp::Text(text) => text.clone(),
            Timestamp::Epoch(number) => epoch_to_datetime(number)
                .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| number.to_string()),
        }
    }
}

fn epoch_to_datetime(number: &serde_json::Number) -> Option<DateTime<Utc>> {
    let value = number.as_f64().filter(|v| v.is_finite())?;
    let secs = if value.abs() >= EPOCH_MILLIS_CUTOFF {
        value / 1000.0
    } else {
        value
    };
    let whole = secs.floor();
    let nanos = ((secs - whole) * 1_000_000_000.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

/// Decode a snapshot from the raw response body.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Snapshot, serde_json::Error> {
    serde_json::from_slice(bytes)
}
