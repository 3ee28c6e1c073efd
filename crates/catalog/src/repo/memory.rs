//! In-memory repository for tests, benches and embedding callers.
//!
//! Spatial predicates are evaluated with `geo`; semantics match the PostGIS
//! store (`ST_Intersects` / `ST_Covers`).

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use common::types::GeoPoint;
use geo::{Intersects, MultiPolygon, Point};
use uuid::Uuid;

use super::{CatalogRepository, GeometryStore};
use crate::domain::{Provider, Service, ServiceFilter, ServiceType, Zone, ZoneFilter};
use crate::errors::ServiceError;

#[derive(Default)]
struct State {
    service_types: HashMap<Uuid, ServiceType>,
    providers: HashMap<Uuid, Provider>,
    zones: HashMap<Uuid, Zone>,
    services: HashMap<Uuid, Service>,
}

#[derive(Default)]
pub struct InMemoryCatalog {
    state: Mutex<State>,
}

impl InMemoryCatalog {
    pub fn new() -> Self { Self::default() }

    fn state(&self) -> Result<MutexGuard<'_, State>, ServiceError> {
        self.state.lock().map_err(|_| ServiceError::Db("in-memory catalog lock poisoned".into()))
    }
}

fn mpoly_intersects(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    a.0.iter().any(|p| b.0.iter().any(|q| p.intersects(q)))
}

fn sorted_by_name<T>(mut items: Vec<T>, key: impl Fn(&T) -> (&str, Uuid)) -> Vec<T> {
    items.sort_by(|a, b| key(a).cmp(&key(b)));
    items
}

fn fk_violation(what: &str, id: Uuid) -> ServiceError {
    ServiceError::Db(format!("foreign key violation: {what} {id} does not exist"))
}

#[async_trait]
impl GeometryStore for InMemoryCatalog {
    async fn intersecting_zone_ids(&self, provider_id: Uuid, mpoly: &MultiPolygon<f64>) -> Result<Vec<Uuid>, ServiceError> {
        let st = self.state()?;
        Ok(st
            .zones
            .values()
            .filter(|z| z.provider_id == provider_id && mpoly_intersects(&z.mpoly, mpoly))
            .map(|z| z.id)
            .collect())
    }

    async fn zones_containing_point(&self, point: GeoPoint) -> Result<Vec<Zone>, ServiceError> {
        let st = self.state()?;
        let p = Point::new(point.longitude, point.latitude);
        let hits = st
            .zones
            .values()
            .filter(|z| z.mpoly.0.iter().any(|poly| poly.intersects(&p)))
            .cloned()
            .collect();
        Ok(sorted_by_name(hits, |z: &Zone| (z.name.as_str(), z.id)))
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn list_service_types(&self) -> Result<Vec<ServiceType>, ServiceError> {
        let st = self.state()?;
        let all = st.service_types.values().cloned().collect();
        Ok(sorted_by_name(all, |t: &ServiceType| (t.name.as_str(), t.id)))
    }

    async fn get_service_type(&self, id: Uuid) -> Result<Option<ServiceType>, ServiceError> {
        Ok(self.state()?.service_types.get(&id).cloned())
    }

    async fn insert_service_type(&self, service_type: ServiceType) -> Result<ServiceType, ServiceError> {
        let mut st = self.state()?;
        if st.service_types.values().any(|t| t.name == service_type.name) {
            return Err(ServiceError::Db(format!("duplicate service type name {}", service_type.name)));
        }
        st.service_types.insert(service_type.id, service_type.clone());
        Ok(service_type)
    }

    async fn get_provider(&self, id: Uuid) -> Result<Option<Provider>, ServiceError> {
        Ok(self.state()?.providers.get(&id).cloned())
    }

    async fn list_providers_by_manager(&self, manager_id: Uuid) -> Result<Vec<Provider>, ServiceError> {
        let st = self.state()?;
        let mine = st.providers.values().filter(|p| p.manager_id == manager_id).cloned().collect();
        Ok(sorted_by_name(mine, |p: &Provider| (p.name.as_str(), p.id)))
    }

    async fn insert_provider(&self, provider: Provider) -> Result<Provider, ServiceError> {
        self.state()?.providers.insert(provider.id, provider.clone());
        Ok(provider)
    }

    async fn update_provider(&self, provider: Provider) -> Result<Provider, ServiceError> {
        let mut st = self.state()?;
        let slot = st.providers.get_mut(&provider.id).ok_or_else(|| ServiceError::not_found("provider"))?;
        *slot = provider.clone();
        Ok(provider)
    }

    async fn delete_provider(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut st = self.state()?;
        if st.providers.remove(&id).is_none() {
            return Ok(false);
        }
        let zone_ids: Vec<Uuid> = st.zones.values().filter(|z| z.provider_id == id).map(|z| z.id).collect();
        st.services.retain(|_, s| !zone_ids.contains(&s.zone_id));
        st.zones.retain(|_, z| z.provider_id != id);
        Ok(true)
    }

    async fn get_zone(&self, id: Uuid) -> Result<Option<Zone>, ServiceError> {
        Ok(self.state()?.zones.get(&id).cloned())
    }

    async fn list_zones(&self, filter: &ZoneFilter) -> Result<Vec<Zone>, ServiceError> {
        let st = self.state()?;
        let zones = st
            .zones
            .values()
            .filter(|z| filter.provider.map_or(true, |p| z.provider_id == p))
            .filter(|z| {
                filter.service_type.map_or(true, |t| {
                    st.services.values().any(|s| s.zone_id == z.id && s.service_type_id == t)
                })
            })
            .cloned()
            .collect();
        Ok(sorted_by_name(zones, |z: &Zone| (z.name.as_str(), z.id)))
    }

    async fn insert_zone(&self, zone: Zone) -> Result<Zone, ServiceError> {
        let mut st = self.state()?;
        if !st.providers.contains_key(&zone.provider_id) {
            return Err(fk_violation("provider", zone.provider_id));
        }
        st.zones.insert(zone.id, zone.clone());
        Ok(zone)
    }

    async fn update_zone(&self, zone: Zone) -> Result<Zone, ServiceError> {
        let mut st = self.state()?;
        if !st.providers.contains_key(&zone.provider_id) {
            return Err(fk_violation("provider", zone.provider_id));
        }
        let slot = st.zones.get_mut(&zone.id).ok_or_else(|| ServiceError::not_found("zone"))?;
        *slot = zone.clone();
        Ok(zone)
    }

    async fn delete_zone(&self, id: Uuid) -> Result<bool, ServiceError> {
        let mut st = self.state()?;
        if st.zones.remove(&id).is_none() {
            return Ok(false);
        }
        st.services.retain(|_, s| s.zone_id != id);
        Ok(true)
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>, ServiceError> {
        Ok(self.state()?.services.get(&id).cloned())
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, ServiceError> {
        let st = self.state()?;
        let services = st
            .services
            .values()
            .filter(|s| filter.zone.map_or(true, |z| s.zone_id == z))
            .filter(|s| filter.service_type.map_or(true, |t| s.service_type_id == t))
            .filter(|s| {
                filter.provider.map_or(true, |p| st.zones.get(&s.zone_id).is_some_and(|z| z.provider_id == p))
            })
            .cloned()
            .collect();
        Ok(sorted_by_name(services, |s: &Service| (s.name.as_str(), s.id)))
    }

    async fn find_service_of_type(
        &self,
        zone_ids: &[Uuid],
        service_type_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Option<Service>, ServiceError> {
        let st = self.state()?;
        Ok(st
            .services
            .values()
            .find(|s| {
                s.service_type_id == service_type_id && zone_ids.contains(&s.zone_id) && Some(s.id) != exclude
            })
            .cloned())
    }

    async fn insert_service(&self, service: Service) -> Result<Service, ServiceError> {
        let mut st = self.state()?;
        if !st.zones.contains_key(&service.zone_id) {
            return Err(fk_violation("zone", service.zone_id));
        }
        if !st.service_types.contains_key(&service.service_type_id) {
            return Err(fk_violation("service_type", service.service_type_id));
        }
        st.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn update_service(&self, service: Service) -> Result<Service, ServiceError> {
        let mut st = self.state()?;
        if !st.zones.contains_key(&service.zone_id) {
            return Err(fk_violation("zone", service.zone_id));
        }
        if !st.service_types.contains_key(&service.service_type_id) {
            return Err(fk_violation("service_type", service.service_type_id));
        }
        let slot = st.services.get_mut(&service.id).ok_or_else(|| ServiceError::not_found("service"))?;
        *slot = service.clone();
        Ok(service)
    }

    async fn delete_service(&self, id: Uuid) -> Result<bool, ServiceError> {
        Ok(self.state()?.services.remove(&id).is_some())
    }
}
