use std::sync::Arc;

use common::types::{CoordinateError, GeoPoint};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use models::errors::FieldErrors;

use super::pipeline::WriteMode;
use crate::access::{authorize, resolve_service, resolve_zone, Action, Claim, Decision, EntityKind, OwnedZone, Target};
use crate::domain::{
    Provider, ProviderInput, ProviderPatch, Service, ServiceFilter, ServiceInput, ServicePatch, ServiceType, Zone,
    ZoneFilter, ZoneInput, ZonePatch,
};
use crate::errors::ServiceError;
use crate::locks::ProviderLocks;
use crate::repo::CatalogRepository;

const REQUIRED: &str = "this field is required";

/// Catalog business service, independent of any transport.
///
/// Every mutating call resolves the payload's references, authorizes the
/// acting user and then runs [`CatalogService::validate_and_persist`].
pub struct CatalogService<R: CatalogRepository> {
    pub(crate) repo: Arc<R>,
    pub(crate) locks: ProviderLocks,
}

impl<R: CatalogRepository> CatalogService<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo, locks: ProviderLocks::new() } }

    /// Share a lock table between services backed by the same store.
    pub fn with_locks(repo: Arc<R>, locks: ProviderLocks) -> Self { Self { repo, locks } }

    pub fn repo(&self) -> &R { &self.repo }

    fn enforce(&self, user: Uuid, action: Action, target: Target<'_>, claim: Claim<'_>) -> Result<(), ServiceError> {
        match authorize(user, action, target, claim) {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => {
                warn!(user_id = %user, ?action, kind = ?target.kind(), reason = reason.as_str(), "access_denied");
                Err(ServiceError::PermissionDenied)
            }
        }
    }

    async fn load_provider(&self, id: Uuid) -> Result<Provider, ServiceError> {
        self.repo.get_provider(id).await?.ok_or_else(|| ServiceError::not_found("provider"))
    }

    /// Provider named by a payload; absence is a field error, not `NotFound`.
    async fn referenced_provider(&self, id: Uuid) -> Result<Provider, ServiceError> {
        self.repo.get_provider(id).await?.ok_or_else(|| ServiceError::missing_reference("provider", id))
    }

    async fn referenced_zone(&self, id: Uuid) -> Result<OwnedZone, ServiceError> {
        resolve_zone(self.repo.as_ref(), id).await?.ok_or_else(|| ServiceError::missing_reference("zone", id))
    }

    // ---- providers ----

    /// Create a provider managed by `user`.
    ///
    /// Any manager in the payload is ignored.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use catalog::CatalogService;
    /// use catalog::domain::ProviderInput;
    /// use catalog::repo::InMemoryCatalog;
    ///
    /// let svc = CatalogService::new(Arc::new(InMemoryCatalog::new()));
    /// let user = uuid::Uuid::new_v4();
    /// let input = ProviderInput {
    ///     name: "Acme".into(),
    ///     email: "ops@example.com".into(),
    ///     phone: "5550100".into(),
    ///     address: "1 Main St".into(),
    ///     manager: Some(uuid::Uuid::new_v4()),
    /// };
    /// let provider = tokio_test::block_on(svc.create_provider(user, input)).unwrap();
    /// assert_eq!(provider.manager_id, user);
    /// ```
    #[instrument(skip(self, input), fields(user_id = %user, name = %input.name))]
    pub async fn create_provider(&self, user: Uuid, input: ProviderInput) -> Result<Provider, ServiceError> {
        self.enforce(user, Action::Create, Target::Kind(EntityKind::Provider), Claim::None)?;
        if input.manager.is_some_and(|m| m != user) {
            debug!("payload manager ignored");
        }
        let draft = Provider {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            phone: input.phone,
            address: input.address,
            manager_id: user,
        };
        let provider = self.persist_provider(draft, WriteMode::Insert).await?;
        info!(provider_id = %provider.id, "provider_created");
        Ok(provider)
    }

    #[instrument(skip(self, patch), fields(user_id = %user, provider_id = %id))]
    pub async fn update_provider(&self, user: Uuid, id: Uuid, patch: ProviderPatch) -> Result<Provider, ServiceError> {
        let mut provider = self.load_provider(id).await?;
        self.enforce(user, Action::Update, Target::Provider(&provider), Claim::None)?;
        if patch.manager.is_some() {
            debug!("payload manager ignored");
        }
        provider.apply(patch);
        let provider = self.persist_provider(provider, WriteMode::Update).await?;
        info!("provider_updated");
        Ok(provider)
    }

    /// Delete a provider with all its zones and services.
    #[instrument(skip(self), fields(user_id = %user, provider_id = %id))]
    pub async fn delete_provider(&self, user: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let provider = self.load_provider(id).await?;
        self.enforce(user, Action::Delete, Target::Provider(&provider), Claim::None)?;
        {
            let _guard = self.locks.acquire(&[id]).await;
            self.repo.delete_provider(id).await?;
        }
        self.locks.forget(id);
        info!("provider_deleted");
        Ok(())
    }

    /// Provider detail, visible to its manager only. Others get `NotFound`.
    pub async fn get_provider(&self, user: Uuid, id: Uuid) -> Result<Provider, ServiceError> {
        let provider = self.load_provider(id).await?;
        match authorize(user, Action::Read, Target::Provider(&provider), Claim::None) {
            Decision::Allow => Ok(provider),
            Decision::Deny(_) => Err(ServiceError::not_found("provider")),
        }
    }

    pub async fn list_providers_for_user(&self, user: Uuid) -> Result<Vec<Provider>, ServiceError> {
        self.repo.list_providers_by_manager(user).await
    }

    // ---- zones ----

    #[instrument(skip(self, input), fields(user_id = %user, name = %input.name))]
    pub async fn create_zone(&self, user: Uuid, input: ZoneInput) -> Result<Zone, ServiceError> {
        let provider_id = input.provider.ok_or_else(|| ServiceError::field("provider", REQUIRED))?;
        let provider = self.referenced_provider(provider_id).await?;
        self.enforce(user, Action::Create, Target::Kind(EntityKind::Zone), Claim::Provider(&provider))?;

        let draft = Zone { id: Uuid::new_v4(), name: input.name, mpoly: input.mpoly, provider_id };
        let zone = self.persist_zone(draft, WriteMode::Insert).await?;
        info!(zone_id = %zone.id, provider_id = %provider_id, "zone_created");
        Ok(zone)
    }

    #[instrument(skip(self, patch), fields(user_id = %user, zone_id = %id))]
    pub async fn update_zone(&self, user: Uuid, id: Uuid, patch: ZonePatch) -> Result<Zone, ServiceError> {
        let owned = resolve_zone(self.repo.as_ref(), id).await?.ok_or_else(|| ServiceError::not_found("zone"))?;
        let new_provider = match patch.provider {
            Some(pid) => Some(self.referenced_provider(pid).await?),
            None => None,
        };
        let claim = new_provider.as_ref().map_or(Claim::None, Claim::Provider);
        self.enforce(user, Action::Update, Target::Zone(&owned), claim)?;

        let mut zone = owned.zone;
        zone.apply(patch);
        let zone = self.persist_zone(zone, WriteMode::Update).await?;
        info!("zone_updated");
        Ok(zone)
    }

    #[instrument(skip(self), fields(user_id = %user, zone_id = %id))]
    pub async fn delete_zone(&self, user: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let owned = resolve_zone(self.repo.as_ref(), id).await?.ok_or_else(|| ServiceError::not_found("zone"))?;
        self.enforce(user, Action::Delete, Target::Zone(&owned), Claim::None)?;
        let _guard = self.locks.acquire(&[owned.provider.id]).await;
        self.repo.delete_zone(id).await?;
        info!("zone_deleted");
        Ok(())
    }

    pub async fn get_zone(&self, user: Uuid, id: Uuid) -> Result<Zone, ServiceError> {
        let owned = resolve_zone(self.repo.as_ref(), id).await?.ok_or_else(|| ServiceError::not_found("zone"))?;
        self.enforce(user, Action::Read, Target::Zone(&owned), Claim::None)?;
        Ok(owned.zone)
    }

    /// Zones are visible to everyone; narrow with `filter`.
    pub async fn list_zones(&self, filter: &ZoneFilter) -> Result<Vec<Zone>, ServiceError> {
        self.repo.list_zones(filter).await
    }

    /// Public point lookup. Omitted coordinates fall back to the north pole
    /// (longitude 0, latitude 90).
    #[instrument(skip(self))]
    pub async fn zones_containing_point(&self, longitude: Option<f64>, latitude: Option<f64>) -> Result<Vec<Zone>, ServiceError> {
        let point = GeoPoint::or_north_pole(longitude, latitude).map_err(|e| {
            let field = match &e {
                CoordinateError::Longitude(_) => "longitude",
                CoordinateError::Latitude(_) => "latitude",
            };
            ServiceError::field(field, e.to_string())
        })?;
        let zones = self.repo.zones_containing_point(point).await?;
        debug!(hits = zones.len(), "point_lookup");
        Ok(zones)
    }

    // ---- services ----

    #[instrument(skip(self, input), fields(user_id = %user, name = %input.name))]
    pub async fn create_service(&self, user: Uuid, input: ServiceInput) -> Result<Service, ServiceError> {
        let mut missing = FieldErrors::new();
        if input.zone.is_none() { missing.add("zone", REQUIRED); }
        if input.service_type.is_none() { missing.add("service_type", REQUIRED); }
        if input.cost.is_none() { missing.add("cost", REQUIRED); }
        let (Some(zone_id), Some(service_type_id), Some(cost)) = (input.zone, input.service_type, input.cost) else {
            return Err(ServiceError::Validation(missing));
        };

        let zone = self.referenced_zone(zone_id).await?;
        self.enforce(user, Action::Create, Target::Kind(EntityKind::Service), Claim::Zone(&zone))?;

        let draft = Service { id: Uuid::new_v4(), name: input.name, zone_id, service_type_id, cost };
        let service = self.persist_service(draft, WriteMode::Insert).await?;
        info!(service_id = %service.id, zone_id = %zone_id, "service_created");
        Ok(service)
    }

    #[instrument(skip(self, patch), fields(user_id = %user, service_id = %id))]
    pub async fn update_service(&self, user: Uuid, id: Uuid, patch: ServicePatch) -> Result<Service, ServiceError> {
        let owned = resolve_service(self.repo.as_ref(), id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
        let new_zone = match patch.zone {
            Some(zid) => Some(self.referenced_zone(zid).await?),
            None => None,
        };
        let claim = new_zone.as_ref().map_or(Claim::None, Claim::Zone);
        self.enforce(user, Action::Update, Target::Service(&owned), claim)?;

        let mut service = owned.service;
        service.apply(patch);
        let service = self.persist_service(service, WriteMode::Update).await?;
        info!("service_updated");
        Ok(service)
    }

    #[instrument(skip(self), fields(user_id = %user, service_id = %id))]
    pub async fn delete_service(&self, user: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let owned = resolve_service(self.repo.as_ref(), id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
        self.enforce(user, Action::Delete, Target::Service(&owned), Claim::None)?;
        self.repo.delete_service(id).await?;
        info!("service_deleted");
        Ok(())
    }

    pub async fn get_service(&self, user: Uuid, id: Uuid) -> Result<Service, ServiceError> {
        let owned = resolve_service(self.repo.as_ref(), id).await?.ok_or_else(|| ServiceError::not_found("service"))?;
        self.enforce(user, Action::Read, Target::Service(&owned), Claim::None)?;
        Ok(owned.service)
    }

    /// Services are visible to everyone; narrow with `filter`.
    pub async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, ServiceError> {
        self.repo.list_services(filter).await
    }

    // ---- service types ----

    pub async fn list_service_types(&self) -> Result<Vec<ServiceType>, ServiceError> {
        self.repo.list_service_types().await
    }

    pub async fn get_service_type(&self, id: Uuid) -> Result<ServiceType, ServiceError> {
        self.repo.get_service_type(id).await?.ok_or_else(|| ServiceError::not_found("service type"))
    }
}
