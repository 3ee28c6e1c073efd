//! Capability-based access control over the ownership chain.
//!
//! `ownership` loads chains and answers `is_manager`; `authorizer` turns
//! (user, action, target, claim) into a [`Decision`].

pub mod ownership;
pub mod authorizer;

pub use authorizer::{authorize, Action, Authorizable, Claim, Decision, DenyReason, EntityKind, Target};
pub use ownership::{is_manager, resolve_service, resolve_zone, Managed, OwnedService, OwnedZone};
