//! Scheduled events and their lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::EventId;

/// Where an event is in its lifecycle.
///
/// `Archived` is transient: an event reaching it is removed from the live
/// store in the same sweep and handed to the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventState {
    /// Registered, no alert sent yet.
    Pending,
    /// The pre-start alert has been broadcast.
    Notified,
    /// The start time has passed and the event left the live store.
    Archived,
}

/// An upcoming event registered by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier assigned at insertion.
    pub id: EventId,
    /// Short, non-empty title.
    pub title: String,
    /// Non-empty description.
    pub description: String,
    /// When the event starts.
    #[serde(rename = "time")]
    pub start_time: DateTime<Utc>,
    /// Current lifecycle state.
    pub state: EventState,
    /// Whether another live event shared this exact start time when this one
    /// was added. Never recomputed afterwards.
    pub overlaps: bool,
}

impl Event {
    /// Returns true once the pre-start alert went out.
    pub fn is_notified(&self) -> bool {
        self.state == EventState::Notified
    }

    /// Returns true if the event starts strictly after `now`.
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    fn sample() -> Event {
        Event {
            id: EventId::generate(),
            title: "Standup".into(),
            description: "Daily sync".into(),
            start_time: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            state: EventState::Pending,
            overlaps: false,
        }
    }

    #[test]
    fn serializes_start_time_as_time() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["time"], "2026-03-02T09:00:00Z");
        assert_eq!(json["state"], "pending");
        assert!(json.get("start_time").is_none());
    }

    #[test]
    fn upcoming_is_strict() {
        let event = sample();
        assert!(event.is_upcoming(event.start_time - chrono::Duration::seconds(1)));
        assert!(!event.is_upcoming(event.start_time));
    }
}
