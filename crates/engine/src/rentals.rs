//! Machine rentals.
//!
//! A `MachineRental` reserves one machine for one business date. Its status
//! machine is `Scheduled -> Confirmed -> Billed`, with `Cancelled` reachable
//! from `Scheduled` and `Confirmed`. `Billed` is only entered by completing an
//! appointment that uses the machine; a billed rental is locked.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    Scheduled,
    Confirmed,
    Cancelled,
    Billed,
}

impl RentalStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Billed => "billed",
        }
    }

    pub fn allowed_targets(self) -> &'static [RentalStatus] {
        match self {
            Self::Scheduled => &[Self::Confirmed, Self::Cancelled],
            Self::Confirmed => &[Self::Billed, Self::Cancelled],
            Self::Cancelled | Self::Billed => &[],
        }
    }

    pub fn can_transition_to(self, to: RentalStatus) -> bool {
        self.allowed_targets().contains(&to)
    }

    /// A group of appointments still needs a rental confirmation.
    pub fn needs_confirmation(status: Option<RentalStatus>) -> bool {
        !matches!(status, Some(Self::Confirmed | Self::Billed))
    }
}

impl TryFrom<&str> for RentalStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "scheduled" => Ok(Self::Scheduled),
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "billed" => Ok(Self::Billed),
            other => Err(EngineError::InvalidTransition(format!(
                "invalid rental status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineRental {
    pub id: Uuid,
    pub machine_id: Uuid,
    pub date: NaiveDate,
    pub status: RentalStatus,
    pub cost_minor: i64,
    pub notes: Option<String>,
    /// Ledger entry emitted when the rental was billed.
    pub expense_transaction_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl MachineRental {
    pub fn new(
        machine_id: Uuid,
        date: NaiveDate,
        cost_minor: i64,
        notes: Option<String>,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        validate_cost(cost_minor)?;
        Ok(Self {
            id: Uuid::new_v4(),
            machine_id,
            date,
            status: RentalStatus::Scheduled,
            cost_minor,
            notes,
            expense_transaction_id: None,
            created_at,
        })
    }

    fn ensure_unlocked(&self) -> ResultEngine<()> {
        if self.status == RentalStatus::Billed {
            return Err(EngineError::RentalLocked(format!(
                "rental {} is billed",
                self.id
            )));
        }
        Ok(())
    }

    fn move_to(&mut self, to: RentalStatus) -> ResultEngine<()> {
        self.ensure_unlocked()?;
        if !self.status.can_transition_to(to) {
            return Err(EngineError::InvalidTransition(format!(
                "rental {}: {} -> {}",
                self.id,
                self.status.as_str(),
                to.as_str()
            )));
        }
        self.status = to;
        Ok(())
    }

    pub fn confirm(&mut self) -> ResultEngine<()> {
        self.move_to(RentalStatus::Confirmed)
    }

    pub fn cancel(&mut self) -> ResultEngine<()> {
        self.move_to(RentalStatus::Cancelled)
    }

    /// Edit cost and notes of a live rental.
    pub fn update(&mut self, cost_minor: Option<i64>, notes: Option<Option<String>>) -> ResultEngine<()> {
        self.ensure_unlocked()?;
        if self.status == RentalStatus::Cancelled {
            return Err(EngineError::InvalidTransition(format!(
                "rental {} is cancelled",
                self.id
            )));
        }
        if let Some(cost_minor) = cost_minor {
            validate_cost(cost_minor)?;
            self.cost_minor = cost_minor;
        }
        if let Some(notes) = notes {
            self.notes = notes;
        }
        Ok(())
    }

    /// Billing is the completion trigger; no user action reaches it.
    ///
    /// A free rental is billed without an expense entry.
    pub(crate) fn bill(&mut self, expense_transaction_id: Option<Uuid>) -> ResultEngine<()> {
        self.move_to(RentalStatus::Billed)?;
        self.expense_transaction_id = expense_transaction_id;
        Ok(())
    }
}

fn validate_cost(cost_minor: i64) -> ResultEngine<()> {
    if cost_minor < 0 {
        return Err(EngineError::InvalidAmount(
            "cost_minor must be >= 0".to_string(),
        ));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "machine_rentals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub machine_id: String,
    pub date: Date,
    pub status: String,
    pub cost_minor: i64,
    pub notes: Option<String>,
    pub expense_transaction_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::machines::Entity",
        from = "Column::MachineId",
        to = "super::machines::Column::Id"
    )]
    Machine,
}

impl Related<super::machines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Machine.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&MachineRental> for ActiveModel {
    fn from(rental: &MachineRental) -> Self {
        Self {
            id: ActiveValue::Set(rental.id.to_string()),
            machine_id: ActiveValue::Set(rental.machine_id.to_string()),
            date: ActiveValue::Set(rental.date),
            status: ActiveValue::Set(rental.status.as_str().to_string()),
            cost_minor: ActiveValue::Set(rental.cost_minor),
            notes: ActiveValue::Set(rental.notes.clone()),
            expense_transaction_id: ActiveValue::Set(
                rental.expense_transaction_id.map(|id| id.to_string()),
            ),
            created_at: ActiveValue::Set(rental.created_at),
        }
    }
}

impl TryFrom<Model> for MachineRental {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "rental")?,
            machine_id: parse_uuid(&model.machine_id, "machine")?,
            date: model.date,
            status: RentalStatus::try_from(model.status.as_str())?,
            cost_minor: model.cost_minor,
            notes: model.notes,
            expense_transaction_id: model
                .expense_transaction_id
                .as_deref()
                .map(|id| parse_uuid(id, "ledger transaction"))
                .transpose()?,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rental() -> MachineRental {
        MachineRental::new(
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2099, 1, 5).unwrap(),
            30_000,
            None,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn billed_rental_rejects_every_mutation() {
        let mut rental = rental();
        rental.confirm().unwrap();
        rental.bill(Some(Uuid::new_v4())).unwrap();

        assert!(matches!(rental.confirm(), Err(EngineError::RentalLocked(_))));
        assert!(matches!(rental.cancel(), Err(EngineError::RentalLocked(_))));
        assert!(matches!(
            rental.update(Some(1), None),
            Err(EngineError::RentalLocked(_))
        ));
        assert!(matches!(
            rental.bill(Some(Uuid::new_v4())),
            Err(EngineError::RentalLocked(_))
        ));
        assert_eq!(rental.cost_minor, 30_000);
    }

    #[test]
    fn scheduled_rental_cannot_be_billed() {
        let mut rental = rental();
        assert!(matches!(
            rental.bill(Some(Uuid::new_v4())),
            Err(EngineError::InvalidTransition(_))
        ));
        assert_eq!(rental.expense_transaction_id, None);
    }

    #[test]
    fn cancelled_is_terminal() {
        let mut rental = rental();
        rental.cancel().unwrap();
        assert!(matches!(
            rental.confirm(),
            Err(EngineError::InvalidTransition(_))
        ));
        assert!(rental.update(None, Some(Some("x".to_string()))).is_err());
    }

    #[test]
    fn update_validates_cost() {
        let mut rental = rental();
        assert!(matches!(
            rental.update(Some(-5), None),
            Err(EngineError::InvalidAmount(_))
        ));
        rental
            .update(Some(12_000), Some(Some("morning only".to_string())))
            .unwrap();
        assert_eq!(rental.cost_minor, 12_000);
        assert_eq!(rental.notes.as_deref(), Some("morning only"));
    }

    #[test]
    fn only_confirmed_or_billed_groups_are_covered() {
        assert!(RentalStatus::needs_confirmation(None));
        assert!(RentalStatus::needs_confirmation(Some(RentalStatus::Scheduled)));
        assert!(RentalStatus::needs_confirmation(Some(RentalStatus::Cancelled)));
        assert!(!RentalStatus::needs_confirmation(Some(RentalStatus::Confirmed)));
        assert!(!RentalStatus::needs_confirmation(Some(RentalStatus::Billed)));
    }
}
