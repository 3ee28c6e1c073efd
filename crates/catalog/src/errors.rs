use models::errors::{FieldErrors, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("validation error: {0}")]
    Validation(FieldErrors),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(FieldErrors::single(field, message))
    }

    /// Validation error for a reference that points at nothing.
    pub fn missing_reference(field: &str, id: uuid::Uuid) -> Self {
        Self::field(field, format!("object with id {id} does not exist"))
    }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::PermissionDenied => 2001,
            ServiceError::Validation(_) => 2002,
            ServiceError::NotFound(_) => 2003,
            ServiceError::Db(_) => 2100,
        }
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ServiceError::Validation(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(fields) => ServiceError::Validation(fields),
            ModelError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

impl From<FieldErrors> for ServiceError {
    fn from(e: FieldErrors) -> Self { ServiceError::Validation(e) }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { ServiceError::Db(e.to_string()) }
}
