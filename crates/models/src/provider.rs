use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors::FieldErrors;
use crate::{validation, zone};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "provider")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub manager_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Zones,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Zones => Entity::has_many(zone::Entity).into() }
    }
}

impl Related<zone::Entity> for Entity {
    fn to() -> RelationDef { Relation::Zones.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Field checks for a provider payload; all problems are reported together.
pub fn validate_fields(name: &str, email: &str, phone: &str, address: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    validation::check_text(&mut errors, "name", name, validation::NAME_MAX_LEN);
    validation::check_email(&mut errors, "email", email);
    validation::check_text(&mut errors, "phone", phone, validation::PHONE_MAX_LEN);
    validation::check_text(&mut errors, "address", address, validation::ADDRESS_MAX_LEN);
    errors
}
