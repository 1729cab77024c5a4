use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Response body for endpoints that create a resource.
#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: Uuid,
}

pub mod slot {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SlotsQuery {
        pub professional_id: Uuid,
        pub date: NaiveDate,
        pub service_id: Uuid,
        /// Appointment being rescheduled; it does not block its own slots.
        pub exclude_appointment_id: Option<Uuid>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct SlotView {
        pub start: DateTime<Utc>,
        pub end: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SlotsResponse {
        pub slots: Vec<SlotView>,
    }
}

pub mod appointment {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum AppointmentStatus {
        Pending,
        Confirmed,
        Completed,
        Cancelled,
        NoShow,
    }

    impl AppointmentStatus {
        /// Returns the canonical status string used by the engine/database.
        pub fn as_str(self) -> &'static str {
            match self {
                Self::Pending => "pending",
                Self::Confirmed => "confirmed",
                Self::Completed => "completed",
                Self::Cancelled => "cancelled",
                Self::NoShow => "no_show",
            }
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum PaymentStatus {
        Pending,
        Deposit,
        Paid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppointmentNew {
        pub professional_id: Option<Uuid>,
        pub client_id: String,
        pub service_id: Uuid,
        /// RFC3339 timestamp, including timezone offset.
        pub start_at: DateTime<FixedOffset>,
        /// Defaults to the configured initial status.
        pub status: Option<AppointmentStatus>,
        pub deposit_minor: Option<i64>,
        pub notes: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AppointmentList {
        pub professional_id: Option<Uuid>,
        /// Inclusive business date.
        pub from: Option<NaiveDate>,
        /// Inclusive business date.
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppointmentTransition {
        pub to: AppointmentStatus,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppointmentReschedule {
        pub start_at: DateTime<FixedOffset>,
        /// Moves the appointment to another professional.
        pub professional_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DepositNew {
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppointmentView {
        pub id: Uuid,
        pub professional_id: Option<Uuid>,
        pub client_id: String,
        pub service_id: Uuid,
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
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AppointmentListResponse {
        pub appointments: Vec<AppointmentView>,
    }

    /// The appointment completed but its machine has no confirmed rental.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingRentalWarning {
        pub machine_id: Uuid,
        pub date: NaiveDate,
        pub rental_id: Option<Uuid>,
        pub rental_status: Option<super::rental::RentalStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransitionResponse {
        pub appointment: AppointmentView,
        pub ledger_entry_ids: Vec<Uuid>,
        pub billed_rental_id: Option<Uuid>,
        pub pending_rental: Option<PendingRentalWarning>,
    }
}

pub mod rental {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum RentalStatus {
        Scheduled,
        Confirmed,
        Billed,
        Cancelled,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RentalNew {
        pub machine_id: Uuid,
        pub date: NaiveDate,
        /// Defaults to the daily cost of the machine.
        pub cost_minor: Option<i64>,
        pub notes: Option<String>,
    }

    /// Partial update. `notes: null` clears the notes, a missing field keeps them.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RentalUpdate {
        pub cost_minor: Option<i64>,
        #[serde(default, with = "double_option")]
        pub notes: Option<Option<String>>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct RentalList {
        pub machine_id: Option<Uuid>,
        pub from: Option<NaiveDate>,
        pub to: Option<NaiveDate>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PendingRentalList {
        pub from: Option<NaiveDate>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RentalView {
        pub id: Uuid,
        pub machine_id: Uuid,
        pub date: NaiveDate,
        pub status: RentalStatus,
        pub cost_minor: i64,
        pub notes: Option<String>,
        pub expense_transaction_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RentalListResponse {
        pub rentals: Vec<RentalView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingRentalView {
        pub machine_id: Uuid,
        pub machine_name: String,
        pub date: NaiveDate,
        pub appointment_count: u64,
        pub daily_cost_minor: i64,
        pub rental_id: Option<Uuid>,
        pub rental_status: Option<RentalStatus>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PendingRentalsResponse {
        pub pending: Vec<PendingRentalView>,
    }

    mod double_option {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
            T: Serialize,
        {
            match value {
                Some(inner) => inner.serialize(serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
        where
            D: Deserializer<'de>,
            T: Deserialize<'de>,
        {
            Option::<T>::deserialize(deserializer).map(Some)
        }
    }
}

pub mod ledger {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum EntryKind {
        Income,
        Expense,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerQuery {
        /// Appointment or rental id.
        pub source_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryView {
        pub id: Uuid,
        pub kind: EntryKind,
        pub amount_minor: i64,
        pub category: String,
        pub description: String,
        pub source_id: Uuid,
        /// `deposit`, `completed`, `commission` or `rental_billed`.
        pub effect_kind: String,
        pub occurred_at: DateTime<Utc>,
        pub created_by: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerResponse {
        pub entries: Vec<LedgerEntryView>,
    }
}

pub mod catalog {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfessionalView {
        pub id: Uuid,
        pub name: String,
        /// Comma separated weekday codes, e.g. `mon,tue,wed`.
        pub working_days: String,
        pub work_start: NaiveTime,
        pub work_end: NaiveTime,
        pub slot_interval_minutes: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ServiceView {
        pub id: Uuid,
        pub name: String,
        pub duration_minutes: i64,
        pub price_minor: i64,
        pub machine_id: Option<Uuid>,
        pub commission_bps: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MachineView {
        pub id: Uuid,
        pub name: String,
        pub daily_cost_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ProfessionalsResponse {
        pub professionals: Vec<ProfessionalView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ServicesResponse {
        pub services: Vec<ServiceView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MachinesResponse {
        pub machines: Vec<MachineView>,
    }
}

#[cfg(test)]
mod tests {
    use super::rental::RentalUpdate;

    #[test]
    fn rental_update_distinguishes_missing_and_null_notes() {
        let missing: RentalUpdate = serde_json::from_str(r#"{"cost_minor": 5}"#).unwrap();
        assert_eq!(missing.cost_minor, Some(5));
        assert_eq!(missing.notes, None);

        let cleared: RentalUpdate = serde_json::from_str(r#"{"notes": null}"#).unwrap();
        assert_eq!(cleared.notes, Some(None));

        let set: RentalUpdate = serde_json::from_str(r#"{"notes": "x"}"#).unwrap();
        assert_eq!(set.notes, Some(Some("x".to_string())));
    }
}
