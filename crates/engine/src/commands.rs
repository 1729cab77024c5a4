//! Command structs for engine operations.
//!
//! These types group parameters for write operations (booking, rescheduling,
//! rental scheduling, master data bootstrap), keeping call sites readable and
//! avoiding long argument lists.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::{AppointmentStatus, SlotInterval, WorkingDays};

/// Book a new appointment.
#[derive(Clone, Debug)]
pub struct CreateAppointmentCmd {
    /// `None` books an unassigned appointment.
    pub professional_id: Option<Uuid>,
    pub client_id: String,
    pub service_id: Uuid,
    pub start_at: DateTime<Utc>,
    /// Overrides the configured default status.
    pub status: Option<AppointmentStatus>,
    pub deposit_minor: Option<i64>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

impl CreateAppointmentCmd {
    #[must_use]
    pub fn new(client_id: impl Into<String>, service_id: Uuid, start_at: DateTime<Utc>) -> Self {
        Self {
            professional_id: None,
            client_id: client_id.into(),
            service_id,
            start_at,
            status: None,
            deposit_minor: None,
            notes: None,
            created_by: None,
        }
    }

    #[must_use]
    pub fn professional_id(mut self, professional_id: Uuid) -> Self {
        self.professional_id = Some(professional_id);
        self
    }

    #[must_use]
    pub fn status(mut self, status: AppointmentStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn deposit_minor(mut self, deposit_minor: i64) -> Self {
        self.deposit_minor = Some(deposit_minor);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    #[must_use]
    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = Some(created_by.into());
        self
    }
}

/// Move an appointment to a new start, optionally to another professional.
#[derive(Clone, Debug)]
pub struct RescheduleCmd {
    pub appointment_id: Uuid,
    pub start_at: DateTime<Utc>,
    pub professional_id: Option<Uuid>,
}

impl RescheduleCmd {
    #[must_use]
    pub fn new(appointment_id: Uuid, start_at: DateTime<Utc>) -> Self {
        Self {
            appointment_id,
            start_at,
            professional_id: None,
        }
    }

    #[must_use]
    pub fn professional_id(mut self, professional_id: Uuid) -> Self {
        self.professional_id = Some(professional_id);
        self
    }
}

/// Reserve a machine for a business date.
#[derive(Clone, Debug)]
pub struct ScheduleRentalCmd {
    pub machine_id: Uuid,
    pub date: NaiveDate,
    /// Defaults to the daily cost of the machine.
    pub cost_minor: Option<i64>,
    pub notes: Option<String>,
}

impl ScheduleRentalCmd {
    #[must_use]
    pub fn new(machine_id: Uuid, date: NaiveDate) -> Self {
        Self {
            machine_id,
            date,
            cost_minor: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn cost_minor(mut self, cost_minor: i64) -> Self {
        self.cost_minor = Some(cost_minor);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Edit a live rental. `None` fields are left untouched; `notes:
/// Some(None)` clears the notes.
#[derive(Clone, Debug, Default)]
pub struct UpdateRentalCmd {
    pub cost_minor: Option<i64>,
    pub notes: Option<Option<String>>,
}

#[derive(Clone, Debug)]
pub struct NewProfessionalCmd {
    pub name: String,
    pub working_days: WorkingDays,
    pub work_start: NaiveTime,
    pub work_end: NaiveTime,
    pub slot_interval: SlotInterval,
}

#[derive(Clone, Debug)]
pub struct NewServiceCmd {
    pub name: String,
    pub duration_minutes: i64,
    pub price_minor: i64,
    pub machine_id: Option<Uuid>,
    pub commission_bps: Option<i64>,
}

impl NewServiceCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, duration_minutes: i64, price_minor: i64) -> Self {
        Self {
            name: name.into(),
            duration_minutes,
            price_minor,
            machine_id: None,
            commission_bps: None,
        }
    }

    #[must_use]
    pub fn machine_id(mut self, machine_id: Uuid) -> Self {
        self.machine_id = Some(machine_id);
        self
    }

    #[must_use]
    pub fn commission_bps(mut self, commission_bps: i64) -> Self {
        self.commission_bps = Some(commission_bps);
        self
    }
}
