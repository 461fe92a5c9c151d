//! Alert text pushed to subscribers before an event starts.

use crate::event::Event;

/// Appended to the alert when the event collided with another at creation.
pub const OVERLAP_NOTICE: &str = "This event overlaps with another event.";

/// Formats the pre-start alert for `event`.
pub fn alert_message(event: &Event, lead_minutes: u32) -> String {
    let mut message = format!(
        "Event \"{}\" is about to start in {lead_minutes} minutes.",
        event.title
    );
    if event.overlaps {
        message.push(' ');
        message.push_str(OVERLAP_NOTICE);
    }
    message
}
