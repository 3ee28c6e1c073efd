//! Fixtures shared by unit tests.

use geo::MultiPolygon;
use uuid::Uuid;

use crate::domain::{Provider, ServiceType, Zone};
use crate::repo::CatalogRepository;

pub fn provider_for(manager_id: Uuid, name: &str) -> Provider {
    Provider {
        id: Uuid::new_v4(),
        name: name.into(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "5550100".into(),
        address: "1 Main St".into(),
        manager_id,
    }
}

pub fn zone_for(provider_id: Uuid, name: &str, mpoly: MultiPolygon<f64>) -> Zone {
    Zone { id: Uuid::new_v4(), name: name.into(), mpoly, provider_id }
}

/// Axis-aligned square with its south-west corner at (`lon`, `lat`).
pub fn square(lon: f64, lat: f64, size: f64) -> MultiPolygon<f64> {
    models::geometry::rectangle(lon, lat, lon + size, lat + size)
}

pub async fn seed_service_type<R: CatalogRepository + ?Sized>(repo: &R, name: &str) -> ServiceType {
    repo.insert_service_type(ServiceType { id: Uuid::new_v4(), name: name.into() })
        .await
        .expect("seed service type")
}
