//! Services offered by the salon.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

/// Basis points in 100%.
pub const FULL_COMMISSION_BPS: i64 = 10_000;

/// A service must fit inside one day.
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// Upper bound for a price, in minor units.
pub const MAX_PRICE_MINOR: i64 = 1_000_000_000_000;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub duration_minutes: i64,
    pub price_minor: i64,
    pub machine_id: Option<Uuid>,
    /// Commission owed to the professional, in basis points of the price.
    pub commission_bps: Option<i64>,
}

impl Service {
    pub fn new(
        name: String,
        duration_minutes: i64,
        price_minor: i64,
        machine_id: Option<Uuid>,
        commission_bps: Option<i64>,
    ) -> ResultEngine<Self> {
        validate(duration_minutes, price_minor, commission_bps)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            duration_minutes,
            price_minor,
            machine_id,
            commission_bps,
        })
    }

    /// Commission on `total_minor`, rounded down. `None` when nothing is owed.
    pub fn commission_on(&self, total_minor: i64) -> ResultEngine<Option<i64>> {
        let Some(bps) = self.commission_bps.filter(|bps| *bps > 0) else {
            return Ok(None);
        };
        let amount = i128::from(total_minor) * i128::from(bps) / i128::from(FULL_COMMISSION_BPS);
        let amount = i64::try_from(amount).map_err(|_| {
            EngineError::InvalidAmount(format!("commission on {total_minor} overflows"))
        })?;
        Ok((amount > 0).then_some(amount))
    }
}

fn validate(
    duration_minutes: i64,
    price_minor: i64,
    commission_bps: Option<i64>,
) -> ResultEngine<()> {
    if !(1..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(EngineError::InvalidSchedule(format!(
            "duration_minutes must be between 1 and {MAX_DURATION_MINUTES}"
        )));
    }
    if !(0..=MAX_PRICE_MINOR).contains(&price_minor) {
        return Err(EngineError::InvalidAmount(format!(
            "price_minor must be between 0 and {MAX_PRICE_MINOR}"
        )));
    }
    if let Some(bps) = commission_bps
        && !(0..=FULL_COMMISSION_BPS).contains(&bps)
    {
        return Err(EngineError::InvalidAmount(format!(
            "commission_bps must be between 0 and {FULL_COMMISSION_BPS}"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub duration_minutes: i64,
    pub price_minor: i64,
    pub machine_id: Option<String>,
    pub commission_bps: Option<i64>,
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

impl From<&Service> for ActiveModel {
    fn from(service: &Service) -> Self {
        Self {
            id: ActiveValue::Set(service.id.to_string()),
            name: ActiveValue::Set(service.name.clone()),
            duration_minutes: ActiveValue::Set(service.duration_minutes),
            price_minor: ActiveValue::Set(service.price_minor),
            machine_id: ActiveValue::Set(service.machine_id.map(|id| id.to_string())),
            commission_bps: ActiveValue::Set(service.commission_bps),
        }
    }
}

impl TryFrom<Model> for Service {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        validate(model.duration_minutes, model.price_minor, model.commission_bps)?;
        Ok(Self {
            id: parse_uuid(&model.id, "service")?,
            name: model.name,
            duration_minutes: model.duration_minutes,
            price_minor: model.price_minor,
            machine_id: model
                .machine_id
                .as_deref()
                .map(|id| parse_uuid(id, "machine"))
                .transpose()?,
            commission_bps: model.commission_bps,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commission_is_rounded_down() {
        let service = Service::new("Color".to_string(), 60, 0, None, Some(1_250)).unwrap();
        assert_eq!(service.commission_on(10_001), Ok(Some(1_250)));
        assert_eq!(service.commission_on(5), Ok(None));
    }

    #[test]
    fn zero_or_missing_commission_owes_nothing() {
        let none = Service::new("Cut".to_string(), 30, 1_000, None, None).unwrap();
        let zero = Service::new("Cut".to_string(), 30, 1_000, None, Some(0)).unwrap();
        assert_eq!(none.commission_on(1_000), Ok(None));
        assert_eq!(zero.commission_on(1_000), Ok(None));
    }

    #[test]
    fn commission_on_large_totals_does_not_overflow() {
        let service = Service::new("Color".to_string(), 60, 0, None, Some(5_000)).unwrap();
        assert_eq!(service.commission_on(i64::MAX / 100), Ok(Some(i64::MAX / 200)));
        assert_eq!(service.commission_on(i64::MAX), Ok(Some(i64::MAX / 2)));
    }

    #[test]
    fn duration_and_price_are_bounded() {
        assert!(Service::new("Cut".to_string(), MAX_DURATION_MINUTES, 1_000, None, None).is_ok());
        assert!(matches!(
            Service::new("Forever".to_string(), 1_000_000_000_000, 1_000, None, None),
            Err(EngineError::InvalidSchedule(_))
        ));
        assert!(matches!(
            Service::new("Cut".to_string(), 30, MAX_PRICE_MINOR + 1, None, None),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn stored_rows_out_of_bounds_are_rejected() {
        let model = Model {
            id: Uuid::new_v4().to_string(),
            name: "Forever".to_string(),
            duration_minutes: 1_000_000_000_000,
            price_minor: 1_000,
            machine_id: None,
            commission_bps: None,
        };
        assert!(matches!(
            Service::try_from(model),
            Err(EngineError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn invalid_services_are_rejected() {
        assert!(Service::new("Cut".to_string(), 0, 1_000, None, None).is_err());
        assert!(Service::new("Cut".to_string(), 30, -1, None, None).is_err());
        assert!(Service::new("Cut".to_string(), 30, 1_000, None, Some(10_001)).is_err());
    }
}
