use sea_orm::entity::prelude::*;
use uuid::Uuid;
use serde::{Deserialize, Serialize};
use geo::MultiPolygon;

use crate::errors::FieldErrors;
use crate::{provider, service, validation};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "zone")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    /// WKT text; see [`crate::geometry`].
    #[sea_orm(column_type = "Text")]
    pub mpoly: String,
    pub provider_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Provider,
    Services,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Provider => Entity::belongs_to(provider::Entity)
                .from(Column::ProviderId)
                .to(provider::Column::Id)
                .into(),
            Relation::Services => Entity::has_many(service::Entity).into(),
        }
    }
}

impl Related<provider::Entity> for Entity {
    fn to() -> RelationDef { Relation::Provider.def() }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Services.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_fields(name: &str, mpoly: &MultiPolygon<f64>) -> FieldErrors {
    let mut errors = FieldErrors::new();
    validation::check_text(&mut errors, "name", name, validation::NAME_MAX_LEN);
    validation::check_mpoly(&mut errors, "mpoly", mpoly);
    errors
}
