//! Catalog operations: resolve references, authorize, then validate and persist.

pub mod catalog_service;
pub mod pipeline;

pub use catalog_service::CatalogService;
pub use pipeline::{Draft, WriteMode};
