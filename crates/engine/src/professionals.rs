//! Professionals and their working calendar configuration.
//!
//! Professionals are master data owned by an external CRUD; the engine only
//! reads them (plus a bootstrap insert used by the admin CLI).

use chrono::{NaiveTime, Weekday};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "mon",
        Weekday::Tue => "tue",
        Weekday::Wed => "wed",
        Weekday::Thu => "thu",
        Weekday::Fri => "fri",
        Weekday::Sat => "sat",
        Weekday::Sun => "sun",
    }
}

fn parse_weekday(code: &str) -> ResultEngine<Weekday> {
    ALL_WEEKDAYS
        .into_iter()
        .find(|day| weekday_code(*day) == code)
        .ok_or_else(|| EngineError::InvalidSchedule(format!("invalid weekday: {code}")))
}

/// Set of weekdays a professional works on.
///
/// Stored as a comma separated list of three-letter codes (`"mon,tue"`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WorkingDays(u8);

impl WorkingDays {
    pub const NONE: WorkingDays = WorkingDays(0);

    /// Monday to Friday.
    pub const WEEKDAYS: WorkingDays = WorkingDays(0b0001_1111);

    #[must_use]
    pub fn with(self, day: Weekday) -> Self {
        Self(self.0 | 1 << day.num_days_from_monday())
    }

    pub fn contains(self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        ALL_WEEKDAYS.into_iter().filter(move |day| self.contains(*day))
    }

    pub fn to_codes(self) -> String {
        self.iter().map(weekday_code).collect::<Vec<_>>().join(",")
    }
}

impl FromIterator<Weekday> for WorkingDays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

impl TryFrom<&str> for WorkingDays {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(|code| parse_weekday(&code.to_ascii_lowercase()))
            .collect()
    }
}

/// Granularity of the agenda of a professional.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotInterval {
    Minutes15,
    Minutes30,
    Minutes45,
    Minutes60,
}

impl SlotInterval {
    pub fn minutes(self) -> i64 {
        match self {
            Self::Minutes15 => 15,
            Self::Minutes30 => 30,
            Self::Minutes45 => 45,
            Self::Minutes60 => 60,
        }
    }
}

impl TryFrom<i64> for SlotInterval {
    type Error = EngineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            15 => Ok(Self::Minutes15),
            30 => Ok(Self::Minutes30),
            45 => Ok(Self::Minutes45),
            60 => Ok(Self::Minutes60),
            other => Err(EngineError::InvalidSchedule(format!(
                "slot interval must be one of 15, 30, 45, 60 minutes, got {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Professional {
    pub id: Uuid,
    pub name: String,
    pub working_days: WorkingDays,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    pub slot_interval: SlotInterval,
}

impl Professional {
    pub fn new(
        name: String,
        working_days: WorkingDays,
        work_start: NaiveTime,
        work_end: NaiveTime,
        slot_interval: SlotInterval,
    ) -> ResultEngine<Self> {
        if work_end <= work_start {
            return Err(EngineError::InvalidSchedule(
                "work_end must be after work_start".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            working_days,
            work_start,
            work_end,
            slot_interval,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "professionals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub working_days: String,
    pub work_start: Time,
    pub work_end: Time,
    pub slot_interval_minutes: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::appointments::Entity")]
    Appointments,
}

impl Related<super::appointments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Appointments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Professional> for ActiveModel {
    fn from(professional: &Professional) -> Self {
        Self {
            id: ActiveValue::Set(professional.id.to_string()),
            name: ActiveValue::Set(professional.name.clone()),
            working_days: ActiveValue::Set(professional.working_days.to_codes()),
            work_start: ActiveValue::Set(professional.work_start),
            work_end: ActiveValue::Set(professional.work_end),
            slot_interval_minutes: ActiveValue::Set(professional.slot_interval.minutes()),
        }
    }
}

impl TryFrom<Model> for Professional {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        // Rows are written by an external CRUD too, so re-check the invariants.
        if model.work_end <= model.work_start {
            return Err(EngineError::InvalidSchedule(format!(
                "professional {} has work_end before work_start",
                model.id
            )));
        }
        Ok(Self {
            id: parse_uuid(&model.id, "professional")?,
            name: model.name,
            working_days: WorkingDays::try_from(model.working_days.as_str())?,
            work_start: model.work_start,
            work_end: model.work_end,
            slot_interval: SlotInterval::try_from(model.slot_interval_minutes)?,
        })
    }
}
