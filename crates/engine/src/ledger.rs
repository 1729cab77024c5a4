//! Ledger entries emitted by lifecycle transitions.
//!
//! The finance system owns the ledger; the engine only appends to it. Each
//! entry is linked to its source (an appointment or a rental) and carries the
//! effect that produced it. `(source_id, effect_kind)` is unique.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for EntryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid entry kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Appointment,
    Rental,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Appointment => "appointment",
            Self::Rental => "rental",
        }
    }
}

impl TryFrom<&str> for SourceKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "appointment" => Ok(Self::Appointment),
            "rental" => Ok(Self::Rental),
            other => Err(EngineError::InvalidId(format!(
                "invalid source kind: {other}"
            ))),
        }
    }
}

/// What produced an entry. Together with the source id it is the
/// idempotency key of the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Deposit,
    Completed,
    Commission,
    RentalBilled,
}

impl EffectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Completed => "completed",
            Self::Commission => "commission",
            Self::RentalBilled => "rental_billed",
        }
    }

    pub fn entry_kind(self) -> EntryKind {
        match self {
            Self::Deposit | Self::Completed => EntryKind::Income,
            Self::Commission | Self::RentalBilled => EntryKind::Expense,
        }
    }

    /// Finance category the entry is booked under.
    pub fn category(self) -> &'static str {
        match self {
            Self::Deposit | Self::Completed => "Servicios",
            Self::Commission => "Salarios",
            Self::RentalBilled => "Alquileres de Equipos",
        }
    }
}

impl TryFrom<&str> for EffectKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "deposit" => Ok(Self::Deposit),
            "completed" => Ok(Self::Completed),
            "commission" => Ok(Self::Commission),
            "rental_billed" => Ok(Self::RentalBilled),
            other => Err(EngineError::InvalidAmount(format!(
                "invalid effect kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub amount_minor: i64,
    pub category: String,
    pub description: String,
    pub source_kind: SourceKind,
    pub source_id: Uuid,
    pub effect_kind: EffectKind,
    pub occurred_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

impl LedgerEntry {
    pub fn new(
        effect_kind: EffectKind,
        source_kind: SourceKind,
        source_id: Uuid,
        amount_minor: i64,
        description: String,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount_minor must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            kind: effect_kind.entry_kind(),
            amount_minor,
            category: effect_kind.category().to_string(),
            description,
            source_kind,
            source_id,
            effect_kind,
            occurred_at,
            created_by: None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "ledger_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub category: String,
    pub description: String,
    pub source_kind: String,
    pub source_id: String,
    pub effect_kind: String,
    pub occurred_at: DateTimeUtc,
    pub created_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(entry.amount_minor),
            category: ActiveValue::Set(entry.category.clone()),
            description: ActiveValue::Set(entry.description.clone()),
            source_kind: ActiveValue::Set(entry.source_kind.as_str().to_string()),
            source_id: ActiveValue::Set(entry.source_id.to_string()),
            effect_kind: ActiveValue::Set(entry.effect_kind.as_str().to_string()),
            occurred_at: ActiveValue::Set(entry.occurred_at),
            created_by: ActiveValue::Set(entry.created_by.clone()),
        }
    }
}

impl TryFrom<Model> for LedgerEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "ledger transaction")?,
            kind: EntryKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            category: model.category,
            description: model.description,
            source_kind: SourceKind::try_from(model.source_kind.as_str())?,
            source_id: parse_uuid(&model.source_id, "source")?,
            effect_kind: EffectKind::try_from(model.effect_kind.as_str())?,
            occurred_at: model.occurred_at,
            created_by: model.created_by,
        })
    }
}
