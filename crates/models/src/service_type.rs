use sea_orm::{entity::prelude::*, ColumnTrait, DatabaseConnection, QueryFilter, Set};
use uuid::Uuid;
use serde::{Deserialize, Serialize};

use crate::errors::{self, FieldErrors};
use crate::validation;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service_type")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { match *self {} }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    let mut errors = FieldErrors::new();
    validation::check_text(&mut errors, "name", name, validation::NAME_MAX_LEN);
    errors.into_result()
}

/// Return the service type called `name`, inserting it when absent.
pub async fn find_or_create(db: &DatabaseConnection, name: &str) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    if let Some(existing) = Entity::find().filter(Column::Name.eq(name.trim())).one(db).await? {
        return Ok(existing);
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.trim().to_string()),
    };
    Ok(am.insert(db).await?)
}
