//! Start-time collision detection.

use chrono::{DateTime, Utc};

use crate::event::Event;

/// Returns true if any of `live` starts at exactly `candidate`.
///
/// Comparison is exact at the timestamp's own precision; there is no
/// tolerance window.
pub fn has_overlap<'a>(candidate: DateTime<Utc>, live: impl IntoIterator<Item = &'a Event>) -> bool {
    live.into_iter().any(|event| event.start_time == candidate)
}
