//! Core domain logic for the reminder service.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: what clients register and how they move through their lifecycle
//! - Overlap detection: exact start-time collisions between live events
//! - The event store: validated insertion, listing and the periodic sweep
//! - Alerts: the text pushed to subscribers shortly before an event starts

mod alert;
pub mod event;
mod overlap;
pub mod store;
pub mod types;

pub use alert::{OVERLAP_NOTICE, alert_message};
pub use event::{Event, EventState};
pub use overlap::has_overlap;
pub use store::{EventStore, SweepOutcome};
pub use types::{EventId, ValidationError, parse_event_time};
