//! Overlap detection between candidate slots and existing bookings.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::Slot;

/// An existing appointment that blocks the agenda of a professional.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Booking {
    pub appointment_id: Uuid,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Half-open intervals `[a_start, a_end)` and `[b_start, b_end)` overlap.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

/// Return the first booking overlapping `[start, end)`, ignoring `exclude`.
pub fn first_conflict(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    bookings: &[Booking],
    exclude: Option<Uuid>,
) -> Option<&Booking> {
    bookings
        .iter()
        .filter(|booking| Some(booking.appointment_id) != exclude)
        .find(|booking| overlaps(start, end, booking.start, booking.end))
}

/// Keep the candidates that overlap none of `bookings`.
///
/// `exclude` is the appointment being rescheduled: it never blocks itself.
pub fn available_slots<I>(candidates: I, bookings: &[Booking], exclude: Option<Uuid>) -> Vec<Slot>
where
    I: IntoIterator<Item = Slot>,
{
    candidates
        .into_iter()
        .filter(|slot| first_conflict(slot.start, slot.end, bookings, exclude).is_none())
        .collect()
}
