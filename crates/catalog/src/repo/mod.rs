//! Persistence abstractions for the catalog.
//!
//! [`GeometryStore`] is the spatial half (intersection and point queries);
//! [`CatalogRepository`] adds entity CRUD on top of it.

pub mod memory;
pub mod seaorm;

use async_trait::async_trait;
use common::types::GeoPoint;
use geo::MultiPolygon;
use uuid::Uuid;

use crate::domain::{Provider, Service, ServiceFilter, ServiceType, Zone, ZoneFilter};
use crate::errors::ServiceError;

pub use memory::InMemoryCatalog;
pub use seaorm::SeaOrmCatalog;

#[async_trait]
pub trait GeometryStore: Send + Sync {
    /// Ids of `provider_id`'s zones whose polygon intersects `mpoly`.
    /// Boundary contact counts.
    async fn intersecting_zone_ids(&self, provider_id: Uuid, mpoly: &MultiPolygon<f64>) -> Result<Vec<Uuid>, ServiceError>;

    /// Zones whose polygon covers `point` (boundary included), ordered by name.
    async fn zones_containing_point(&self, point: GeoPoint) -> Result<Vec<Zone>, ServiceError>;
}

#[async_trait]
pub trait CatalogRepository: GeometryStore {
    async fn list_service_types(&self) -> Result<Vec<ServiceType>, ServiceError>;
    async fn get_service_type(&self, id: Uuid) -> Result<Option<ServiceType>, ServiceError>;
    async fn insert_service_type(&self, service_type: ServiceType) -> Result<ServiceType, ServiceError>;

    async fn get_provider(&self, id: Uuid) -> Result<Option<Provider>, ServiceError>;
    async fn list_providers_by_manager(&self, manager_id: Uuid) -> Result<Vec<Provider>, ServiceError>;
    async fn insert_provider(&self, provider: Provider) -> Result<Provider, ServiceError>;
    async fn update_provider(&self, provider: Provider) -> Result<Provider, ServiceError>;
    /// Cascades to the provider's zones and their services.
    async fn delete_provider(&self, id: Uuid) -> Result<bool, ServiceError>;

    async fn get_zone(&self, id: Uuid) -> Result<Option<Zone>, ServiceError>;
    async fn list_zones(&self, filter: &ZoneFilter) -> Result<Vec<Zone>, ServiceError>;
    async fn insert_zone(&self, zone: Zone) -> Result<Zone, ServiceError>;
    async fn update_zone(&self, zone: Zone) -> Result<Zone, ServiceError>;
    /// Cascades to the zone's services.
    async fn delete_zone(&self, id: Uuid) -> Result<bool, ServiceError>;

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>, ServiceError>;
    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, ServiceError>;
    /// Any service of `service_type_id` located in one of `zone_ids`, other than `exclude`.
    async fn find_service_of_type(
        &self,
        zone_ids: &[Uuid],
        service_type_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Option<Service>, ServiceError>;
    async fn insert_service(&self, service: Service) -> Result<Service, ServiceError>;
    async fn update_service(&self, service: Service) -> Result<Service, ServiceError>;
    async fn delete_service(&self, id: Uuid) -> Result<bool, ServiceError>;
}
