//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so the engine enforces consistent invariants.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use sea_orm::{DbErr, SqlErr};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Instant of a wall clock time in `tz`.
///
/// An ambiguous time resolves to the earliest instant. A time skipped by a
/// DST jump moves forward to the first minute that exists.
pub(crate) fn local_to_utc(
    tz: Tz,
    date: NaiveDate,
    time: NaiveTime,
) -> ResultEngine<DateTime<Utc>> {
    let requested = date.and_time(time);
    (0..=MINUTES_PER_DAY)
        .filter_map(|minutes| requested.checked_add_signed(Duration::minutes(minutes)))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            EngineError::InvalidSchedule(format!("{date} {time} does not exist in {tz}"))
        })
}

/// Business date of an instant in the configured timezone.
pub(crate) fn local_date(tz: Tz, instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_to_utc_applies_the_offset() {
        let date = NaiveDate::from_ymd_opt(2099, 1, 5).unwrap();
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let utc = local_to_utc(chrono_tz::America::Argentina::Buenos_Aires, date, nine).unwrap();
        assert_eq!(utc, Utc.with_ymd_and_hms(2099, 1, 5, 12, 0, 0).unwrap());
    }

    #[test]
    fn times_in_a_dst_gap_move_past_the_jump() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let half_past_two = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
        // 03:00 CEST
        assert_eq!(
            local_to_utc(chrono_tz::Europe::Rome, date, half_past_two).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 31, 1, 0, 0).unwrap()
        );
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        assert_eq!(
            local_to_utc(chrono_tz::Europe::Rome, date, nine).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 31, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn local_date_uses_business_timezone() {
        let late_utc = Utc.with_ymd_and_hms(2099, 1, 6, 1, 0, 0).unwrap();
        assert_eq!(
            local_date(chrono_tz::America::Argentina::Buenos_Aires, late_utc),
            NaiveDate::from_ymd_opt(2099, 1, 5).unwrap()
        );
        assert_eq!(
            local_date(chrono_tz::UTC, late_utc),
            NaiveDate::from_ymd_opt(2099, 1, 6).unwrap()
        );
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(normalize_required_name("   ", "machine").is_err());
        assert_eq!(normalize_required_name(" Laser ", "machine").unwrap(), "Laser");
    }
}
