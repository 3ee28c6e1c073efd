//! Validate-then-persist stage.
//!
//! Callers authorize first and then hand the finished entity to
//! [`CatalogService::validate_and_persist`]. Field checks, reference checks
//! and the geometric consistency check all run here, under the locks of every
//! provider the write touches. A rejected draft writes nothing.

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use models::errors::FieldErrors;

use super::CatalogService;
use crate::access::{resolve_zone, OwnedZone};
use crate::consistency::{ConsistencyValidator, ServiceCandidate, Verdict};
use crate::domain::{Provider, Service, Zone};
use crate::errors::ServiceError;
use crate::locks::ProviderGuard;
use crate::repo::CatalogRepository;

/// An entity ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub enum Draft {
    Provider(Provider),
    Zone(Zone),
    Service(Service),
}

impl Draft {
    pub fn id(&self) -> Uuid {
        match self {
            Draft::Provider(p) => p.id,
            Draft::Zone(z) => z.id,
            Draft::Service(s) => s.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Insert,
    Update,
}

impl<R: CatalogRepository> CatalogService<R> {
    /// Validate `draft` and write it. Returns the stored entity.
    ///
    /// Authorization is not part of this stage.
    pub async fn validate_and_persist(&self, draft: Draft, mode: WriteMode) -> Result<Draft, ServiceError> {
        match draft {
            Draft::Provider(p) => self.persist_provider(p, mode).await.map(Draft::Provider),
            Draft::Zone(z) => self.persist_zone(z, mode).await.map(Draft::Zone),
            Draft::Service(s) => self.persist_service(s, mode).await.map(Draft::Service),
        }
    }

    pub(crate) async fn persist_provider(&self, mut provider: Provider, mode: WriteMode) -> Result<Provider, ServiceError> {
        provider.name = provider.name.trim().to_string();
        models::provider::validate_fields(&provider.name, &provider.email, &provider.phone, &provider.address).into_result()?;
        match mode {
            WriteMode::Insert => self.repo.insert_provider(provider).await,
            WriteMode::Update => {
                // the manager column is write-once
                let stored = self.repo.get_provider(provider.id).await?.ok_or_else(|| ServiceError::not_found("provider"))?;
                provider.manager_id = stored.manager_id;
                self.repo.update_provider(provider).await
            }
        }
    }

    #[instrument(skip(self, zone), fields(zone_id = %zone.id, provider_id = %zone.provider_id))]
    pub(crate) async fn persist_zone(&self, mut zone: Zone, mode: WriteMode) -> Result<Zone, ServiceError> {
        zone.name = zone.name.trim().to_string();
        let mut errors = models::zone::validate_fields(&zone.name, &zone.mpoly);
        if self.repo.get_provider(zone.provider_id).await?.is_none() {
            errors.merge(FieldErrors::single("provider", format!("object with id {} does not exist", zone.provider_id)));
        }
        errors.into_result()?;

        let (_guard, previous) = loop {
            let previous = self.stored_zone(zone.id, mode).await?;
            let guard = self.locks.acquire(&zone_providers(&zone, previous.as_ref())).await;
            // re-read under the lock; a concurrent move may have re-parented it
            let previous = self.stored_zone(zone.id, mode).await?;
            if covers(&guard, &zone_providers(&zone, previous.as_ref())) {
                break (guard, previous);
            }
            debug!("zone owner changed while waiting for locks, retrying");
        };

        if let Some(previous) = &previous {
            let reshaped = previous.mpoly != zone.mpoly;
            if reshaped || previous.provider_id != zone.provider_id {
                let verdict = ConsistencyValidator::new(self.repo.as_ref()).check_zone_reshape(&zone).await?;
                if let Verdict::Conflict { zone_id, zone_name } = &verdict {
                    warn!(conflicting_zone = %zone_id, conflicting_name = %zone_name, "zone_reshape_conflict");
                }
                verdict.into_result(if reshaped { "mpoly" } else { "provider" })?;
            }
        }

        let stored = match mode {
            WriteMode::Insert => self.repo.insert_zone(zone).await?,
            WriteMode::Update => self.repo.update_zone(zone).await?,
        };
        debug!("zone_persisted");
        Ok(stored)
    }

    #[instrument(skip(self, service), fields(service_id = %service.id, zone_id = %service.zone_id))]
    pub(crate) async fn persist_service(&self, mut service: Service, mode: WriteMode) -> Result<Service, ServiceError> {
        service.name = service.name.trim().to_string();
        let mut errors = FieldErrors::new();
        match models::service::validate_fields(&service.name, service.cost) {
            Ok(cost) => service.cost = cost,
            Err(e) => errors.merge(e),
        }
        if self.repo.get_service_type(service.service_type_id).await?.is_none() {
            errors.add("service_type", format!("object with id {} does not exist", service.service_type_id));
        }
        let zone = resolve_zone(self.repo.as_ref(), service.zone_id).await?;
        if zone.is_none() {
            errors.add("zone", format!("object with id {} does not exist", service.zone_id));
        }
        errors.into_result()?;

        let (_guard, zone, previous) = loop {
            let (zone, _, touched) = self.service_chain(&service, mode).await?;
            let guard = self.locks.acquire(&touched).await;
            // the zone may have moved or vanished while we waited
            let (zone_now, previous_now, touched_now) = self.service_chain(&service, mode).await?;
            if covers(&guard, &touched_now) {
                break (guard, zone_now, previous_now);
            }
            debug!(from = %zone.provider.id, to = %zone_now.provider.id, "zone owner changed while waiting for locks, retrying");
        };

        let relocated = previous
            .as_ref()
            .map_or(true, |p| p.zone_id != service.zone_id || p.service_type_id != service.service_type_id);
        if relocated {
            let candidate = ServiceCandidate {
                zone: &zone,
                service_type_id: service.service_type_id,
                existing_id: previous.as_ref().map(|p| p.id),
            };
            let verdict = ConsistencyValidator::new(self.repo.as_ref()).check_service(&candidate).await?;
            if let Verdict::Conflict { zone_id, zone_name } = &verdict {
                warn!(
                    provider_id = %zone.provider.id,
                    service_type_id = %service.service_type_id,
                    conflicting_zone = %zone_id,
                    conflicting_name = %zone_name,
                    "service_conflict"
                );
            }
            verdict.into_result("zone")?;
        }

        let stored = match mode {
            WriteMode::Insert => self.repo.insert_service(service).await?,
            WriteMode::Update => self.repo.update_service(service).await?,
        };
        info!(service_id = %stored.id, provider_id = %zone.provider.id, "service_persisted");
        Ok(stored)
    }

    async fn stored_zone(&self, id: Uuid, mode: WriteMode) -> Result<Option<Zone>, ServiceError> {
        match mode {
            WriteMode::Insert => Ok(None),
            WriteMode::Update => self.repo.get_zone(id).await?.map(Some).ok_or_else(|| ServiceError::not_found("zone")),
        }
    }

    /// Target zone chain, stored record and every provider the write touches.
    async fn service_chain(
        &self,
        service: &Service,
        mode: WriteMode,
    ) -> Result<(OwnedZone, Option<Service>, Vec<Uuid>), ServiceError> {
        let zone = resolve_zone(self.repo.as_ref(), service.zone_id)
            .await?
            .ok_or_else(|| ServiceError::missing_reference("zone", service.zone_id))?;
        let previous = match mode {
            WriteMode::Insert => None,
            WriteMode::Update => Some(self.repo.get_service(service.id).await?.ok_or_else(|| ServiceError::not_found("service"))?),
        };
        let mut touched = vec![zone.provider.id];
        if let Some(previous) = &previous {
            if let Some(old_zone) = self.repo.get_zone(previous.zone_id).await? {
                touched.push(old_zone.provider_id);
            }
        }
        Ok((zone, previous, touched))
    }
}

fn zone_providers(zone: &Zone, previous: Option<&Zone>) -> Vec<Uuid> {
    let mut ids = vec![zone.provider_id];
    ids.extend(previous.map(|p| p.provider_id));
    ids
}

fn covers(guard: &ProviderGuard, providers: &[Uuid]) -> bool {
    providers.iter().all(|id| guard.providers().contains(id))
}
