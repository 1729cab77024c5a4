//! Working calendar resolution.
//!
//! A professional works on a date if the weekday of that date is in the
//! configured working-day set. There are no holidays or per-date exceptions.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::{Professional, ResultEngine, SlotInterval, util::local_to_utc};

/// Result of resolving the calendar of a professional for one date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkingDay {
    Off,
    Working {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: SlotInterval,
    },
}

impl WorkingDay {
    pub fn is_working(&self) -> bool {
        matches!(self, Self::Working { .. })
    }

    /// Return `true` if `[start, end)` lies inside the working window.
    pub fn covers(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        match self {
            Self::Off => false,
            Self::Working {
                start: day_start,
                end: day_end,
                ..
            } => *day_start <= start && end <= *day_end,
        }
    }
}

/// Resolve the working window of `professional` on the business date `date`.
///
/// Working hours are wall clock times in `tz`; the returned window is in UTC.
/// A bound skipped by a DST jump starts at the end of the jump.
pub fn working_day(professional: &Professional, date: NaiveDate, tz: Tz) -> ResultEngine<WorkingDay> {
    if !professional.working_days.contains(date.weekday()) {
        return Ok(WorkingDay::Off);
    }
    Ok(WorkingDay::Working {
        start: local_to_utc(tz, date, professional.work_start)?,
        end: local_to_utc(tz, date, professional.work_end)?,
        interval: professional.slot_interval,
    })
}
