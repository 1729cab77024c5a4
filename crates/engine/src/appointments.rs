//! Appointment primitives and their state machines.
//!
//! An `Appointment` has two coupled state machines:
//!
//! - [`AppointmentStatus`]: `Pending -> Confirmed -> Completed`, with
//!   `Cancelled` reachable from both live states and `NoShow` from `Confirmed`.
//!   `Completed`, `Cancelled` and `NoShow` are terminal.
//! - [`PaymentStatus`]: `Pending -> Deposit -> Paid` (or `Pending -> Paid`).
//!   `Paid` requires the appointment to be `Confirmed` or `Completed`.
//!
//! Every mutating method validates first and only then applies the change, so
//! a returned error leaves the value untouched.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Booking, EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Completed,
        Self::Cancelled,
        Self::NoShow,
    ];

    /// Statuses that occupy the agenda of a professional.
    pub const BLOCKING: [AppointmentStatus; 2] = [Self::Pending, Self::Confirmed];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Transition table: the statuses reachable from `self`.
    pub fn allowed_targets(self) -> &'static [AppointmentStatus] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::Completed, Self::Cancelled, Self::NoShow],
            Self::Completed | Self::Cancelled | Self::NoShow => &[],
        }
    }

    pub fn can_transition_to(self, to: AppointmentStatus) -> bool {
        self.allowed_targets().contains(&to)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    pub fn blocks_agenda(self) -> bool {
        Self::BLOCKING.contains(&self)
    }
}

impl TryFrom<&str> for AppointmentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "no_show" => Ok(Self::NoShow),
            other => Err(EngineError::InvalidTransition(format!(
                "invalid appointment status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Deposit,
    Paid,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Deposit => "deposit",
            Self::Paid => "paid",
        }
    }

    pub fn allowed_targets(self) -> &'static [PaymentStatus] {
        match self {
            Self::Pending => &[Self::Deposit, Self::Paid],
            Self::Deposit => &[Self::Paid],
            Self::Paid => &[],
        }
    }

    pub fn can_transition_to(self, to: PaymentStatus) -> bool {
        self.allowed_targets().contains(&to)
    }
}

impl TryFrom<&str> for PaymentStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "deposit" => Ok(Self::Deposit),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::InvalidTransition(format!(
                "invalid payment status: {other}"
            ))),
        }
    }
}

/// Reminder gates tracked per appointment. Delivery happens elsewhere.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    #[serde(rename = "24h")]
    DayBefore,
    #[serde(rename = "2h")]
    HoursBefore,
}

impl ReminderKind {
    /// How far ahead of `start_at` an appointment becomes due.
    pub fn lead(self) -> Duration {
        match self {
            Self::DayBefore => Duration::hours(25),
            Self::HoursBefore => Duration::minutes(150),
        }
    }
}

impl TryFrom<&str> for ReminderKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "24h" => Ok(Self::DayBefore),
            "2h" => Ok(Self::HoursBefore),
            other => Err(EngineError::InvalidSchedule(format!(
                "invalid reminder kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// `None` means unassigned.
    pub professional_id: Option<Uuid>,
    pub client_id: String,
    pub service_id: Uuid,
    /// Business date of `start_at` in the configured timezone.
    pub date: NaiveDate,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub payment_status: PaymentStatus,
    pub deposit_minor: Option<i64>,
    pub total_minor: i64,
    pub notes: Option<String>,
    pub reminder_24h_sent: bool,
    pub reminder_2h_sent: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        professional_id: Option<Uuid>,
        client_id: String,
        service_id: Uuid,
        date: NaiveDate,
        start_at: DateTime<Utc>,
        duration_minutes: i64,
        total_minor: i64,
        status: AppointmentStatus,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !status.blocks_agenda() {
            return Err(EngineError::InvalidTransition(format!(
                "an appointment cannot be created as {}",
                status.as_str()
            )));
        }
        if duration_minutes <= 0 {
            return Err(EngineError::InvalidSchedule(
                "duration_minutes must be > 0".to_string(),
            ));
        }
        let end_at = Duration::try_minutes(duration_minutes)
            .and_then(|length| start_at.checked_add_signed(length))
            .ok_or_else(|| {
                EngineError::InvalidSchedule(format!(
                    "{duration_minutes} minutes from {start_at} is out of range"
                ))
            })?;
        if total_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "total_minor must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            professional_id,
            client_id,
            service_id,
            date,
            start_at,
            end_at,
            status,
            payment_status: PaymentStatus::Pending,
            deposit_minor: None,
            total_minor,
            notes: None,
            reminder_24h_sent: false,
            reminder_2h_sent: false,
            created_by: None,
            created_at,
        })
    }

    /// Stored length. Fixed at creation, even if the service changes later.
    pub fn length(&self) -> Duration {
        self.end_at - self.start_at
    }

    pub fn booking(&self) -> Booking {
        Booking {
            appointment_id: self.id,
            start: self.start_at,
            end: self.end_at,
        }
    }

    /// Apply a status transition.
    ///
    /// Reaching `Completed` settles the payment.
    pub fn transition(&mut self, to: AppointmentStatus) -> ResultEngine<()> {
        if !self.status.can_transition_to(to) {
            return Err(EngineError::InvalidTransition(format!(
                "appointment {}: {} -> {}",
                self.id,
                self.status.as_str(),
                to.as_str()
            )));
        }
        self.status = to;
        if to == AppointmentStatus::Completed {
            self.payment_status = PaymentStatus::Paid;
        }
        Ok(())
    }

    /// Record a deposit. The payment status becomes `Deposit`.
    pub fn capture_deposit(&mut self, amount_minor: i64) -> ResultEngine<()> {
        if self.status.is_terminal() {
            return Err(EngineError::InvalidTransition(format!(
                "appointment {} is {}",
                self.id,
                self.status.as_str()
            )));
        }
        if !self.payment_status.can_transition_to(PaymentStatus::Deposit) {
            return Err(EngineError::InvalidTransition(format!(
                "payment {} -> deposit",
                self.payment_status.as_str()
            )));
        }
        if amount_minor <= 0 || amount_minor > self.total_minor {
            return Err(EngineError::InvalidAmount(format!(
                "deposit must be > 0 and <= {}",
                self.total_minor
            )));
        }
        self.deposit_minor = Some(amount_minor);
        self.payment_status = PaymentStatus::Deposit;
        Ok(())
    }

    pub fn mark_paid(&mut self) -> ResultEngine<()> {
        if !matches!(
            self.status,
            AppointmentStatus::Confirmed | AppointmentStatus::Completed
        ) {
            return Err(EngineError::InvalidTransition(format!(
                "payment can be settled only when confirmed or completed, appointment is {}",
                self.status.as_str()
            )));
        }
        if !self.payment_status.can_transition_to(PaymentStatus::Paid) {
            return Err(EngineError::InvalidTransition(format!(
                "payment {} -> paid",
                self.payment_status.as_str()
            )));
        }
        self.payment_status = PaymentStatus::Paid;
        Ok(())
    }

    /// Amount still owed at completion: the total minus any deposit.
    pub fn remainder_minor(&self) -> i64 {
        self.total_minor - self.deposit_minor.unwrap_or(0)
    }

    pub fn reminder_sent(&self, kind: ReminderKind) -> bool {
        match kind {
            ReminderKind::DayBefore => self.reminder_24h_sent,
            ReminderKind::HoursBefore => self.reminder_2h_sent,
        }
    }

    pub fn needs_reminder(&self, kind: ReminderKind, now: DateTime<Utc>) -> bool {
        self.status.blocks_agenda()
            && !self.reminder_sent(kind)
            && self.start_at > now
            && self.start_at <= now + kind.lead()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub professional_id: Option<String>,
    pub client_id: String,
    pub service_id: String,
    pub date: Date,
    pub start_at: DateTimeUtc,
    pub end_at: DateTimeUtc,
    pub status: String,
    pub payment_status: String,
    pub deposit_minor: Option<i64>,
    pub total_minor: i64,
    pub notes: Option<String>,
    #[sea_orm(column_name = "reminder_24h_sent")]
    pub reminder_24h_sent: bool,
    #[sea_orm(column_name = "reminder_2h_sent")]
    pub reminder_2h_sent: bool,
    pub created_by: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::professionals::Entity",
        from = "Column::ProfessionalId",
        to = "super::professionals::Column::Id"
    )]
    Professional,
    #[sea_orm(
        belongs_to = "super::services::Entity",
        from = "Column::ServiceId",
        to = "super::services::Column::Id"
    )]
    Service,
}

impl Related<super::professionals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Professional.def()
    }
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Service.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Appointment> for ActiveModel {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: ActiveValue::Set(appointment.id.to_string()),
            professional_id: ActiveValue::Set(appointment.professional_id.map(|id| id.to_string())),
            client_id: ActiveValue::Set(appointment.client_id.clone()),
            service_id: ActiveValue::Set(appointment.service_id.to_string()),
            date: ActiveValue::Set(appointment.date),
            start_at: ActiveValue::Set(appointment.start_at),
            end_at: ActiveValue::Set(appointment.end_at),
            status: ActiveValue::Set(appointment.status.as_str().to_string()),
            payment_status: ActiveValue::Set(appointment.payment_status.as_str().to_string()),
            deposit_minor: ActiveValue::Set(appointment.deposit_minor),
            total_minor: ActiveValue::Set(appointment.total_minor),
            notes: ActiveValue::Set(appointment.notes.clone()),
            reminder_24h_sent: ActiveValue::Set(appointment.reminder_24h_sent),
            reminder_2h_sent: ActiveValue::Set(appointment.reminder_2h_sent),
            created_by: ActiveValue::Set(appointment.created_by.clone()),
            created_at: ActiveValue::Set(appointment.created_at),
        }
    }
}

impl TryFrom<Model> for Appointment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "appointment")?,
            professional_id: model
                .professional_id
                .as_deref()
                .map(|id| parse_uuid(id, "professional"))
                .transpose()?,
            client_id: model.client_id,
            service_id: parse_uuid(&model.service_id, "service")?,
            date: model.date,
            start_at: model.start_at,
            end_at: model.end_at,
            status: AppointmentStatus::try_from(model.status.as_str())?,
            payment_status: PaymentStatus::try_from(model.payment_status.as_str())?,
            deposit_minor: model.deposit_minor,
            total_minor: model.total_minor,
            notes: model.notes,
            reminder_24h_sent: model.reminder_24h_sent,
            reminder_2h_sent: model.reminder_2h_sent,
            created_by: model.created_by,
            created_at: model.created_at,
        })
    }
}
