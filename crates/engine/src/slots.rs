//! Candidate slot generation.
//!
//! [`SlotGenerator`] walks a working window from its start in steps of the
//! professional's interval and yields `[t, t + duration)` while the slot still
//! ends inside the window. It knows nothing about existing bookings.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::WorkingDay;

/// A candidate `[start, end)` interval of exactly one service duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Iterator over the candidate slots of a working day.
///
/// The sequence is a pure function of the working day and the duration, so
/// building a new generator from the same inputs restarts it.
#[derive(Clone, Debug)]
pub struct SlotGenerator {
    cursor: DateTime<Utc>,
    window_end: DateTime<Utc>,
    step: Duration,
    duration: Duration,
}

impl SlotGenerator {
    /// A duration that does not fit a `Duration` yields no slots.
    pub fn new(day: &WorkingDay, duration_minutes: i64) -> Self {
        let duration = Duration::try_minutes(duration_minutes).unwrap_or_else(Duration::zero);
        match *day {
            WorkingDay::Working {
                start,
                end,
                interval,
            } => Self {
                cursor: start,
                window_end: end,
                step: Duration::minutes(interval.minutes()),
                duration,
            },
            // Zero-length window: no positive duration fits.
            WorkingDay::Off => Self {
                cursor: DateTime::<Utc>::MIN_UTC,
                window_end: DateTime::<Utc>::MIN_UTC,
                step: Duration::minutes(1),
                duration,
            },
        }
    }
}

impl Iterator for SlotGenerator {
    type Item = Slot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.duration <= Duration::zero() {
            return None;
        }
        let end = self.cursor.checked_add_signed(self.duration)?;
        if end > self.window_end {
            return None;
        }
        let slot = Slot {
            start: self.cursor,
            end,
        };
        match self.cursor.checked_add_signed(self.step) {
            Some(cursor) => self.cursor = cursor,
            None => self.duration = Duration::zero(),
        }
        Some(slot)
    }
}
