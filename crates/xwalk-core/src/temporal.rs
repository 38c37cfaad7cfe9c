//! # Temporal Helpers
//!
//! Deadline arithmetic shared by drift records and read models. All
//! timestamps in the stack are `chrono::DateTime<Utc>`; local timezones
//! never enter the engine.

use chrono::{DateTime, Utc};

/// Days remaining until `deadline`, computed as `ceil((deadline - now) / 1 day)`.
///
/// Negative when the deadline has passed. This is always derived at read
/// time — drift records never cache it, so a record read today and the
/// same record read tomorrow disagree by exactly one.
pub fn days_remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let delta = deadline - now;
    let secs = delta.num_seconds();
    const DAY: i64 = 86_400;
    // Ceiling division that works for negative remainders too.
    if secs >= 0 {
        (secs + DAY - 1) / DAY
    } else {
        -((-secs) / DAY)
    }
}
