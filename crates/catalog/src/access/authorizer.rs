use serde::Serialize;
use uuid::Uuid;

use super::ownership::{Managed, OwnedService, OwnedZone};
use crate::domain::Provider;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    ServiceType,
    Provider,
    Zone,
    Service,
}

/// Why a request was refused. Logged, never returned to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    /// The user does not manage the addressed entity.
    NotManager,
    /// The parent named in the payload belongs to someone else.
    ParentNotManaged,
    /// A create without the parent it must hang from.
    MissingParent,
    /// The claimed parent has the wrong kind for the target.
    ClaimMismatch,
    /// Update/delete addressed a kind instead of an instance.
    InstanceRequired,
    /// Create addressed an instance instead of a kind.
    KindRequired,
    /// Service types are reference data.
    ReadOnly,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::NotManager => "not_manager",
            DenyReason::ParentNotManaged => "parent_not_managed",
            DenyReason::MissingParent => "missing_parent",
            DenyReason::ClaimMismatch => "claim_mismatch",
            DenyReason::InstanceRequired => "instance_required",
            DenyReason::KindRequired => "kind_required",
            DenyReason::ReadOnly => "read_only",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool { matches!(self, Decision::Allow) }

    fn manager_only(entity: &impl Managed, user: Uuid) -> Self {
        if entity.is_manager(user) { Decision::Allow } else { Decision::Deny(DenyReason::NotManager) }
    }

    fn parent_managed(parent: Option<&impl Managed>, user: Uuid) -> Self {
        match parent {
            None => Decision::Deny(DenyReason::MissingParent),
            Some(p) if p.is_manager(user) => Decision::Allow,
            Some(_) => Decision::Deny(DenyReason::ParentNotManaged),
        }
    }

    /// Collapse to the boundary error; the reason is dropped.
    pub fn into_result(self) -> Result<(), ServiceError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(_) => Err(ServiceError::PermissionDenied),
        }
    }
}

/// Per-variant capabilities. `Parent` is what a payload may point at when
/// creating or re-parenting the entity.
pub trait Authorizable: Managed + Sized {
    const KIND: EntityKind;
    type Parent;

    fn can_create(user: Uuid, parent: Option<&Self::Parent>) -> Decision;

    fn can_read(&self, _user: Uuid) -> Decision { Decision::Allow }

    fn can_update(&self, user: Uuid, new_parent: Option<&Self::Parent>) -> Decision {
        match Decision::manager_only(self, user) {
            Decision::Allow => match new_parent {
                Some(parent) => Self::can_create(user, Some(parent)),
                None => Decision::Allow,
            },
            deny => deny,
        }
    }

    fn can_delete(&self, user: Uuid) -> Decision { Decision::manager_only(self, user) }
}

impl Authorizable for Provider {
    const KIND: EntityKind = EntityKind::Provider;
    type Parent = ();

    fn can_create(_user: Uuid, _parent: Option<&()>) -> Decision { Decision::Allow }

    // provider detail is scoped to its manager
    fn can_read(&self, user: Uuid) -> Decision { Decision::manager_only(self, user) }
}

impl Authorizable for OwnedZone {
    const KIND: EntityKind = EntityKind::Zone;
    type Parent = Provider;

    fn can_create(user: Uuid, parent: Option<&Provider>) -> Decision {
        Decision::parent_managed(parent, user)
    }
}

impl Authorizable for OwnedService {
    const KIND: EntityKind = EntityKind::Service;
    type Parent = OwnedZone;

    fn can_create(user: Uuid, parent: Option<&OwnedZone>) -> Decision {
        Decision::parent_managed(parent, user)
    }
}

/// What a request addresses: a kind (create, list) or a loaded instance.
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Kind(EntityKind),
    Provider(&'a Provider),
    Zone(&'a OwnedZone),
    Service(&'a OwnedService),
}

impl Target<'_> {
    pub fn kind(&self) -> EntityKind {
        match self {
            Target::Kind(k) => *k,
            Target::Provider(_) => Provider::KIND,
            Target::Zone(_) => OwnedZone::KIND,
            Target::Service(_) => OwnedService::KIND,
        }
    }
}

/// The parent a payload points at, already resolved.
#[derive(Debug, Clone, Copy)]
pub enum Claim<'a> {
    None,
    Provider(&'a Provider),
    Zone(&'a OwnedZone),
}

fn claimed_provider<'a>(claim: Claim<'a>) -> Result<Option<&'a Provider>, DenyReason> {
    match claim {
        Claim::None => Ok(None),
        Claim::Provider(p) => Ok(Some(p)),
        Claim::Zone(_) => Err(DenyReason::ClaimMismatch),
    }
}

fn claimed_zone<'a>(claim: Claim<'a>) -> Result<Option<&'a OwnedZone>, DenyReason> {
    match claim {
        Claim::None => Ok(None),
        Claim::Zone(z) => Ok(Some(z)),
        Claim::Provider(_) => Err(DenyReason::ClaimMismatch),
    }
}

fn create_kind(user: Uuid, kind: EntityKind, claim: Claim<'_>) -> Result<Decision, DenyReason> {
    Ok(match kind {
        EntityKind::ServiceType => Decision::Deny(DenyReason::ReadOnly),
        EntityKind::Provider => Provider::can_create(user, None),
        EntityKind::Zone => OwnedZone::can_create(user, claimed_provider(claim)?),
        EntityKind::Service => OwnedService::can_create(user, claimed_zone(claim)?),
    })
}

fn update_instance(user: Uuid, target: Target<'_>, claim: Claim<'_>) -> Result<Decision, DenyReason> {
    Ok(match target {
        Target::Kind(_) => Decision::Deny(DenyReason::InstanceRequired),
        Target::Provider(p) => {
            // a provider has no parent to move to
            if !matches!(claim, Claim::None) {
                return Err(DenyReason::ClaimMismatch);
            }
            p.can_update(user, None)
        }
        Target::Zone(z) => z.can_update(user, claimed_provider(claim)?),
        Target::Service(s) => s.can_update(user, claimed_zone(claim)?),
    })
}

/// Decide whether `user` may perform `action` on `target`.
///
/// `claim` is the parent named by the payload: the provider of a zone being
/// created or moved, or the zone of a service. Total over all inputs.
pub fn authorize(user: Uuid, action: Action, target: Target<'_>, claim: Claim<'_>) -> Decision {
    let decided = match (action, target) {
        (Action::Create, Target::Kind(kind)) => create_kind(user, kind, claim),
        (Action::Create, _) => Ok(Decision::Deny(DenyReason::KindRequired)),
        (Action::Read, Target::Kind(_)) => Ok(Decision::Allow),
        (Action::Read, Target::Provider(p)) => Ok(p.can_read(user)),
        (Action::Read, Target::Zone(z)) => Ok(z.can_read(user)),
        (Action::Read, Target::Service(s)) => Ok(s.can_read(user)),
        (Action::Update, t) => update_instance(user, t, claim),
        (Action::Delete, Target::Kind(_)) => Ok(Decision::Deny(DenyReason::InstanceRequired)),
        (Action::Delete, Target::Provider(p)) => Ok(p.can_delete(user)),
        (Action::Delete, Target::Zone(z)) => Ok(z.can_delete(user)),
        (Action::Delete, Target::Service(s)) => Ok(s.can_delete(user)),
    };
    decided.unwrap_or_else(Decision::Deny)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Service;
    use crate::test_support::{provider_for, square, zone_for};
    use rust_decimal::Decimal;

    struct Fixture {
        u1: Uuid,
        u2: Uuid,
        acme: Provider,
        other: Provider,
        north: OwnedZone,
        install: OwnedService,
        foreign_zone: OwnedZone,
    }

    fn fixture() -> Fixture {
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        let acme = provider_for(u1, "Acme");
        let other = provider_for(u2, "Other");
        let north = OwnedZone { zone: zone_for(acme.id, "North", square(0.0, 0.0, 10.0)), provider: acme.clone() };
        let foreign_zone = OwnedZone { zone: zone_for(other.id, "Far", square(50.0, 50.0, 1.0)), provider: other.clone() };
        let install = OwnedService {
            service: Service {
                id: Uuid::new_v4(),
                name: "Install".into(),
                zone_id: north.zone.id,
                service_type_id: Uuid::new_v4(),
                cost: Decimal::new(5000, 2),
            },
            zone: north.clone(),
        };
        Fixture { u1, u2, acme, other, north, install, foreign_zone }
    }

    #[test]
    fn anyone_may_create_a_provider() {
        let f = fixture();
        for user in [f.u1, f.u2, Uuid::new_v4()] {
            assert!(authorize(user, Action::Create, Target::Kind(EntityKind::Provider), Claim::None).is_allowed());
        }
    }

    #[test]
    fn update_and_delete_are_manager_only() {
        let f = fixture();
        let targets = [Target::Provider(&f.acme), Target::Zone(&f.north), Target::Service(&f.install)];
        for target in targets {
            assert!(authorize(f.u1, Action::Update, target, Claim::None).is_allowed());
            assert!(authorize(f.u1, Action::Delete, target, Claim::None).is_allowed());
            assert_eq!(authorize(f.u2, Action::Update, target, Claim::None), Decision::Deny(DenyReason::NotManager));
            assert_eq!(authorize(f.u2, Action::Delete, target, Claim::None), Decision::Deny(DenyReason::NotManager));
        }
    }

    #[test]
    fn zone_create_requires_own_provider() {
        let f = fixture();
        let kind = Target::Kind(EntityKind::Zone);
        assert!(authorize(f.u1, Action::Create, kind, Claim::Provider(&f.acme)).is_allowed());
        assert_eq!(authorize(f.u1, Action::Create, kind, Claim::Provider(&f.other)), Decision::Deny(DenyReason::ParentNotManaged));
        assert_eq!(authorize(f.u1, Action::Create, kind, Claim::None), Decision::Deny(DenyReason::MissingParent));
        assert_eq!(authorize(f.u1, Action::Create, kind, Claim::Zone(&f.north)), Decision::Deny(DenyReason::ClaimMismatch));
    }

    #[test]
    fn service_create_requires_own_zone() {
        let f = fixture();
        let kind = Target::Kind(EntityKind::Service);
        assert!(authorize(f.u1, Action::Create, kind, Claim::Zone(&f.north)).is_allowed());
        assert_eq!(authorize(f.u1, Action::Create, kind, Claim::Zone(&f.foreign_zone)), Decision::Deny(DenyReason::ParentNotManaged));
        assert!(authorize(f.u2, Action::Create, kind, Claim::Zone(&f.foreign_zone)).is_allowed());
    }

    #[test]
    fn moving_requires_the_new_parent_too() {
        let f = fixture();
        // manager of the zone, but the target provider is foreign
        assert_eq!(
            authorize(f.u1, Action::Update, Target::Zone(&f.north), Claim::Provider(&f.other)),
            Decision::Deny(DenyReason::ParentNotManaged)
        );
        assert_eq!(
            authorize(f.u1, Action::Update, Target::Service(&f.install), Claim::Zone(&f.foreign_zone)),
            Decision::Deny(DenyReason::ParentNotManaged)
        );
        // owner of the target parent, but not of the entity
        assert_eq!(
            authorize(f.u2, Action::Update, Target::Service(&f.install), Claim::Zone(&f.foreign_zone)),
            Decision::Deny(DenyReason::NotManager)
        );
        assert!(authorize(f.u1, Action::Update, Target::Zone(&f.north), Claim::Provider(&f.acme)).is_allowed());
    }

    #[test]
    fn reads_are_open_except_provider_detail() {
        let f = fixture();
        assert!(authorize(f.u2, Action::Read, Target::Zone(&f.north), Claim::None).is_allowed());
        assert!(authorize(f.u2, Action::Read, Target::Service(&f.install), Claim::None).is_allowed());
        assert!(authorize(f.u2, Action::Read, Target::Kind(EntityKind::ServiceType), Claim::None).is_allowed());
        assert!(authorize(f.u1, Action::Read, Target::Provider(&f.acme), Claim::None).is_allowed());
        assert_eq!(authorize(f.u2, Action::Read, Target::Provider(&f.acme), Claim::None), Decision::Deny(DenyReason::NotManager));
    }

    #[test]
    fn malformed_requests_are_denied_not_panicking() {
        let f = fixture();
        assert_eq!(authorize(f.u1, Action::Update, Target::Kind(EntityKind::Zone), Claim::None), Decision::Deny(DenyReason::InstanceRequired));
        assert_eq!(authorize(f.u1, Action::Delete, Target::Kind(EntityKind::Provider), Claim::None), Decision::Deny(DenyReason::InstanceRequired));
        assert_eq!(authorize(f.u1, Action::Create, Target::Zone(&f.north), Claim::None), Decision::Deny(DenyReason::KindRequired));
        assert_eq!(authorize(f.u1, Action::Update, Target::Provider(&f.acme), Claim::Provider(&f.acme)), Decision::Deny(DenyReason::ClaimMismatch));
        assert_eq!(authorize(f.u1, Action::Create, Target::Kind(EntityKind::ServiceType), Claim::None), Decision::Deny(DenyReason::ReadOnly));
    }

    #[test]
    fn denial_hides_the_reason() {
        let err = Decision::Deny(DenyReason::NotManager).into_result().unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied));
        assert_eq!(err.to_string(), "permission denied");
    }
}
