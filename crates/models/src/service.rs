use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;

use crate::errors::FieldErrors;
use crate::{service_type, validation, zone};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub zone_id: Uuid,
    pub service_type_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub cost: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Zone,
    ServiceType,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Zone => Entity::belongs_to(zone::Entity)
                .from(Column::ZoneId)
                .to(zone::Column::Id)
                .into(),
            Relation::ServiceType => Entity::belongs_to(service_type::Entity)
                .from(Column::ServiceTypeId)
                .to(service_type::Column::Id)
                .into(),
        }
    }
}

impl Related<zone::Entity> for Entity {
    fn to() -> RelationDef { Relation::Zone.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Field checks for a service payload. On success the cost comes back with
/// exactly two decimal places.
pub fn validate_fields(name: &str, cost: Decimal) -> Result<Decimal, FieldErrors> {
    let mut errors = FieldErrors::new();
    validation::check_text(&mut errors, "name", name, validation::NAME_MAX_LEN);
    let cost = validation::check_cost(&mut errors, "cost", cost);
    match cost {
        Some(c) if errors.is_empty() => Ok(c),
        _ => Err(errors),
    }
}
