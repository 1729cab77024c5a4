//! Rentable machines required by some services.

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Machine {
    pub id: Uuid,
    pub name: String,
    pub daily_cost_minor: i64,
}

impl Machine {
    pub fn new(name: String, daily_cost_minor: i64) -> ResultEngine<Self> {
        if daily_cost_minor < 0 {
            return Err(EngineError::InvalidAmount(
                "daily_cost_minor must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            daily_cost_minor,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "machines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub daily_cost_minor: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::rentals::Entity")]
    Rentals,
    #[sea_orm(has_many = "super::services::Entity")]
    Services,
}

impl Related<super::rentals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rentals.def()
    }
}

impl Related<super::services::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Services.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Machine> for ActiveModel {
    fn from(machine: &Machine) -> Self {
        Self {
            id: ActiveValue::Set(machine.id.to_string()),
            name: ActiveValue::Set(machine.name.clone()),
            daily_cost_minor: ActiveValue::Set(machine.daily_cost_minor),
        }
    }
}

impl TryFrom<Model> for Machine {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "machine")?,
            name: model.name,
            daily_cost_minor: model.daily_cost_minor,
        })
    }
}
