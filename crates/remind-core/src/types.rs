//! Core type definitions with validation.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for incoming events.
///
/// These are caller mistakes, never system faults: they are reported back to
/// the client once and are not retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent.
    #[error("{field} is required")]
    Missing { field: &'static str },

    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// The time string could not be parsed.
    #[error("invalid time: {value} (expected ISO 8601, e.g. 2026-01-15T10:30:00Z)")]
    InvalidTime { value: String },

    /// The event would start at or before the current instant.
    #[error("time must be in the future, got {}", .time.to_rfc3339_opts(SecondsFormat::Secs, true))]
    NotInFuture { time: DateTime<Utc> },
}

/// A unique, generated event identifier.
///
/// Assigned once at insertion. The store removes and updates events by ID so
/// that concurrent sweeps never rely on list positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    /// Generates a fresh random ID.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EventId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Naive formats accepted when the input carries no offset; interpreted as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses an event start time.
///
/// Supports:
/// - RFC 3339 / ISO 8601 with an offset: "2026-01-15T10:30:00Z", "2026-01-15T12:30:00+02:00"
/// - Naive date-times without an offset, taken as UTC: "2026-01-15T10:30:00", "2026-01-15 10:30"
pub fn parse_event_time(s: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::InvalidTime {
            value: s.to_string(),
        })
}
