use uuid::Uuid;

use crate::domain::{Provider, Service, Zone};
use crate::errors::ServiceError;
use crate::repo::CatalogRepository;

/// Anything with a manager somewhere up its ownership chain.
pub trait Managed {
    fn manager_id(&self) -> Uuid;

    fn is_manager(&self, user: Uuid) -> bool { self.manager_id() == user }
}

impl Managed for Provider {
    fn manager_id(&self) -> Uuid { self.manager_id }
}

/// A zone together with its owning provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedZone {
    pub zone: Zone,
    pub provider: Provider,
}

impl Managed for OwnedZone {
    fn manager_id(&self) -> Uuid { self.provider.manager_id }
}

/// A service together with its zone chain.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedService {
    pub service: Service,
    pub zone: OwnedZone,
}

impl Managed for OwnedService {
    fn manager_id(&self) -> Uuid { self.zone.manager_id() }
}

pub fn is_manager<E: Managed + ?Sized>(entity: &E, user: Uuid) -> bool {
    entity.is_manager(user)
}

/// Load a zone and its provider. `Ok(None)` when the zone does not exist.
pub async fn resolve_zone<R>(repo: &R, zone_id: Uuid) -> Result<Option<OwnedZone>, ServiceError>
where
    R: CatalogRepository + ?Sized,
{
    let Some(zone) = repo.get_zone(zone_id).await? else {
        return Ok(None);
    };
    Ok(Some(attach_provider(repo, zone).await?))
}

/// Load the provider of an already-loaded zone.
pub async fn attach_provider<R>(repo: &R, zone: Zone) -> Result<OwnedZone, ServiceError>
where
    R: CatalogRepository + ?Sized,
{
    let provider = repo
        .get_provider(zone.provider_id)
        .await?
        .ok_or_else(|| ServiceError::Db(format!("zone {} references missing provider {}", zone.id, zone.provider_id)))?;
    Ok(OwnedZone { zone, provider })
}

/// Load a service with its zone and provider. `Ok(None)` when the service does not exist.
pub async fn resolve_service<R>(repo: &R, service_id: Uuid) -> Result<Option<OwnedService>, ServiceError>
where
    R: CatalogRepository + ?Sized,
{
    let Some(service) = repo.get_service(service_id).await? else {
        return Ok(None);
    };
    let zone = resolve_zone(repo, service.zone_id)
        .await?
        .ok_or_else(|| ServiceError::Db(format!("service {} references missing zone {}", service.id, service.zone_id)))?;
    Ok(Some(OwnedService { service, zone }))
}
