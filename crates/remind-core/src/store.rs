//! In-memory store of live events.
//!
//! # Thread Safety
//!
//! [`EventStore`] is `Send + Sync` and meant to be shared behind an `Arc`.
//! All mutations (`add`, `sweep`) take a single write lock; `list_upcoming`
//! and the other readers share a read lock, so they may run concurrently with
//! each other but never with a mutation.
//!
//! # Sweep
//!
//! [`EventStore::sweep`] first decides every transition from a read-only pass
//! over the events, then applies them by [`EventId`] in one mutation pass.
//! Removing an event therefore never shifts or skips a neighbour.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Duration, Utc};

use crate::event::{Event, EventState};
use crate::overlap::has_overlap;
use crate::types::{EventId, ValidationError};

/// Events whose state changed during one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Events that entered the pre-alert window, now marked `Notified`.
    pub notified: Vec<Event>,
    /// Events whose start time passed, now `Archived` and out of the store.
    pub archived: Vec<Event>,
}

impl SweepOutcome {
    /// Returns true if the sweep changed nothing.
    pub fn is_empty(&self) -> bool {
        self.notified.is_empty() && self.archived.is_empty()
    }
}

enum Transition {
    Notify,
    Archive,
}

/// The live event set.
#[derive(Debug, Default)]
pub struct EventStore {
    events: RwLock<Vec<Event>>,
}

impl EventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // Every mutation completes before its guard drops, so a poisoned lock
    // still holds a consistent list.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Event>> {
        self.events.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Event>> {
        self.events.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validates and inserts a new event.
    ///
    /// `overlaps` is computed against the live events at this instant. Earlier
    /// events sharing the same start time are left untouched.
    pub fn add(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        start_time: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Event, ValidationError> {
        let title = title.into();
        let description = description.into();

        if title.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        if description.is_empty() {
            return Err(ValidationError::Empty {
                field: "description",
            });
        }
        if start_time <= now {
            return Err(ValidationError::NotInFuture { time: start_time });
        }

        let mut events = self.write();
        let event = Event {
            id: EventId::generate(),
            title,
            description,
            start_time,
            state: EventState::Pending,
            overlaps: has_overlap(start_time, events.iter()),
        };
        events.push(event.clone());

        tracing::info!(
            event_id = %event.id,
            title = %event.title,
            start_time = %event.start_time,
            overlaps = event.overlaps,
            "event added"
        );
        Ok(event)
    }

    /// Returns live events starting strictly after `now`, in insertion order.
    pub fn list_upcoming(&self, now: DateTime<Utc>) -> Vec<Event> {
        self.read()
            .iter()
            .filter(|event| event.is_upcoming(now))
            .cloned()
            .collect()
    }

    /// Looks up a live event by ID.
    pub fn get(&self, id: EventId) -> Option<Event> {
        self.read().iter().find(|event| event.id == id).cloned()
    }

    /// Number of live events.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns true if no events are live.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drives state transitions for `now`.
    ///
    /// An event not yet notified whose start lies in `(now, now + lead]` is
    /// marked `Notified`. Any event whose start is at or before `now` is
    /// removed and returned as `Archived`, whether or not it was notified.
    /// Repeating a sweep at the same `now` yields an empty outcome.
    pub fn sweep(&self, now: DateTime<Utc>, lead: Duration) -> SweepOutcome {
        let mut events = self.write();

        let decisions: Vec<(EventId, Transition)> = events
            .iter()
            .filter_map(|event| {
                let until_start = event.start_time - now;
                if until_start <= Duration::zero() {
                    Some((event.id, Transition::Archive))
                } else if until_start <= lead && event.state == EventState::Pending {
                    Some((event.id, Transition::Notify))
                } else {
                    None
                }
            })
            .collect();

        if decisions.is_empty() {
            return SweepOutcome::default();
        }

        let mut outcome = SweepOutcome::default();
        let mut to_remove = HashSet::new();
        for (id, transition) in decisions {
            let Some(event) = events.iter_mut().find(|event| event.id == id) else {
                continue;
            };
            match transition {
                Transition::Notify => {
                    event.state = EventState::Notified;
                    outcome.notified.push(event.clone());
                }
                Transition::Archive => {
                    let mut archived = event.clone();
                    archived.state = EventState::Archived;
                    outcome.archived.push(archived);
                    to_remove.insert(id);
                }
            }
        }
        events.retain(|event| !to_remove.contains(&event.id));

        tracing::debug!(
            notified = outcome.notified.len(),
            archived = outcome.archived.len(),
            remaining = events.len(),
            "sweep applied"
        );
        outcome
    }
}
