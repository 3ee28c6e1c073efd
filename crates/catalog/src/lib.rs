//! Business layer for the zone catalog.
//! - Capability-based access control over the Provider -> Zone -> Service chain.
//! - Geometric consistency: one provider never offers a service type twice in
//!   intersecting zones.
//! - Repository traits with SeaORM/PostGIS and in-memory implementations.

pub mod errors;
pub mod domain;
pub mod access;
pub mod repo;
pub mod consistency;
pub mod locks;
pub mod services;
#[cfg(test)]
pub mod test_support;

pub use access::{authorize, Action, Claim, Decision, DenyReason, EntityKind, Target};
pub use consistency::{ConsistencyValidator, Verdict};
pub use errors::ServiceError;
pub use services::{CatalogService, Draft, WriteMode};
