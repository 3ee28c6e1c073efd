//! Zone/service geometric consistency.
//!
//! A provider may not offer the same service type in two zones whose polygons
//! intersect. Boundary contact counts as intersecting, and every zone
//! intersects itself, so a zone holds at most one service per type.

use std::collections::BTreeSet;

use uuid::Uuid;

use crate::access::OwnedZone;
use crate::domain::{ServiceFilter, Zone};
use crate::errors::ServiceError;
use crate::repo::CatalogRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Admissible,
    /// An intersecting zone already hosts a service of the same type.
    Conflict { zone_id: Uuid, zone_name: String },
}

impl Verdict {
    pub fn is_admissible(&self) -> bool { matches!(self, Verdict::Admissible) }

    /// Turn a conflict into a validation error on `field`, naming the zone.
    pub fn into_result(self, field: &str) -> Result<(), ServiceError> {
        match self {
            Verdict::Admissible => Ok(()),
            Verdict::Conflict { zone_id, zone_name } => Err(ServiceError::field(
                field,
                format!("this service type is already offered in intersecting zone \"{zone_name}\" ({zone_id})"),
            )),
        }
    }
}

/// A service about to be written: its target zone chain and type.
#[derive(Debug, Clone, Copy)]
pub struct ServiceCandidate<'a> {
    pub zone: &'a OwnedZone,
    pub service_type_id: Uuid,
    /// Set on update so the record does not collide with itself.
    pub existing_id: Option<Uuid>,
}

pub struct ConsistencyValidator<'a, R: ?Sized> {
    repo: &'a R,
}

impl<'a, R> ConsistencyValidator<'a, R>
where
    R: CatalogRepository + ?Sized,
{
    pub fn new(repo: &'a R) -> Self { Self { repo } }

    pub async fn check_service(&self, candidate: &ServiceCandidate<'_>) -> Result<Verdict, ServiceError> {
        let zone = &candidate.zone.zone;
        let mut zone_ids = self.repo.intersecting_zone_ids(zone.provider_id, &zone.mpoly).await?;
        if !zone_ids.contains(&zone.id) {
            zone_ids.push(zone.id);
        }
        let hit = self
            .repo
            .find_service_of_type(&zone_ids, candidate.service_type_id, candidate.existing_id)
            .await?;
        match hit {
            None => Ok(Verdict::Admissible),
            Some(existing) if existing.zone_id == zone.id => {
                Ok(Verdict::Conflict { zone_id: zone.id, zone_name: zone.name.clone() })
            }
            Some(existing) => self.conflict_in(existing.zone_id).await,
        }
    }

    /// Re-check every service hosted by `zone` against its new polygon and
    /// provider before the zone itself is rewritten.
    pub async fn check_zone_reshape(&self, zone: &Zone) -> Result<Verdict, ServiceError> {
        let hosted = self
            .repo
            .list_services(&ServiceFilter { zone: Some(zone.id), ..Default::default() })
            .await?;
        if hosted.is_empty() {
            return Ok(Verdict::Admissible);
        }
        let neighbours: Vec<Uuid> = self
            .repo
            .intersecting_zone_ids(zone.provider_id, &zone.mpoly)
            .await?
            .into_iter()
            .filter(|id| *id != zone.id)
            .collect();
        if neighbours.is_empty() {
            return Ok(Verdict::Admissible);
        }
        let types: BTreeSet<Uuid> = hosted.iter().map(|s| s.service_type_id).collect();
        for service_type_id in types {
            if let Some(existing) = self.repo.find_service_of_type(&neighbours, service_type_id, None).await? {
                return self.conflict_in(existing.zone_id).await;
            }
        }
        Ok(Verdict::Admissible)
    }

    async fn conflict_in(&self, zone_id: Uuid) -> Result<Verdict, ServiceError> {
        let zone_name = self
            .repo
            .get_zone(zone_id)
            .await?
            .map(|z| z.name)
            .unwrap_or_else(|| zone_id.to_string());
        Ok(Verdict::Conflict { zone_id, zone_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::resolve_zone;
    use crate::domain::{Provider, Service, ServiceType};
    use crate::repo::InMemoryCatalog;
    use crate::test_support::{provider_for, seed_service_type, square, zone_for};
    use geo::MultiPolygon;
    use rust_decimal::Decimal;

    struct World {
        repo: InMemoryCatalog,
        acme: Provider,
        repair: ServiceType,
        cleaning: ServiceType,
    }

    async fn world() -> World {
        let repo = InMemoryCatalog::new();
        let acme = repo.insert_provider(provider_for(Uuid::new_v4(), "Acme")).await.unwrap();
        let repair = seed_service_type(&repo, "Repair").await;
        let cleaning = seed_service_type(&repo, "Cleaning").await;
        World { repo, acme, repair, cleaning }
    }

    async fn add_zone(w: &World, provider: &Provider, name: &str, mpoly: MultiPolygon<f64>) -> OwnedZone {
        let z = w.repo.insert_zone(zone_for(provider.id, name, mpoly)).await.unwrap();
        resolve_zone(&w.repo, z.id).await.unwrap().unwrap()
    }

    async fn add_service(w: &World, zone: &OwnedZone, st: &ServiceType) -> Service {
        w.repo
            .insert_service(Service {
                id: Uuid::new_v4(),
                name: format!("{} in {}", st.name, zone.zone.name),
                zone_id: zone.zone.id,
                service_type_id: st.id,
                cost: Decimal::new(100, 0),
            })
            .await
            .unwrap()
    }

    fn candidate<'a>(zone: &'a OwnedZone, st: &ServiceType) -> ServiceCandidate<'a> {
        ServiceCandidate { zone, service_type_id: st.id, existing_id: None }
    }

    #[tokio::test]
    async fn same_type_in_overlapping_zone_conflicts() {
        let w = world().await;
        let north = add_zone(&w, &w.acme, "North", square(0.0, 0.0, 10.0)).await;
        let south = add_zone(&w, &w.acme, "South", square(5.0, 5.0, 10.0)).await;
        add_service(&w, &north, &w.repair).await;

        let v = ConsistencyValidator::new(&w.repo);
        match v.check_service(&candidate(&south, &w.repair)).await.unwrap() {
            Verdict::Conflict { zone_id, zone_name } => {
                assert_eq!(zone_id, north.zone.id);
                assert_eq!(zone_name, "North");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert!(v.check_service(&candidate(&south, &w.cleaning)).await.unwrap().is_admissible());
    }

    #[tokio::test]
    async fn disjoint_zones_may_share_a_type() {
        let w = world().await;
        let north = add_zone(&w, &w.acme, "North", square(0.0, 0.0, 10.0)).await;
        let east = add_zone(&w, &w.acme, "East", square(20.0, 0.0, 10.0)).await;
        add_service(&w, &north, &w.repair).await;

        let v = ConsistencyValidator::new(&w.repo);
        assert!(v.check_service(&candidate(&east, &w.repair)).await.unwrap().is_admissible());
    }

    #[tokio::test]
    async fn touching_zones_count_as_intersecting() {
        let w = world().await;
        let west = add_zone(&w, &w.acme, "West", square(0.0, 0.0, 10.0)).await;
        let east = add_zone(&w, &w.acme, "East", square(10.0, 0.0, 10.0)).await;
        add_service(&w, &west, &w.repair).await;

        let v = ConsistencyValidator::new(&w.repo);
        assert!(!v.check_service(&candidate(&east, &w.repair)).await.unwrap().is_admissible());
    }

    #[tokio::test]
    async fn other_providers_do_not_conflict() {
        let w = world().await;
        let rival = w.repo.insert_provider(provider_for(Uuid::new_v4(), "Rival")).await.unwrap();
        let north = add_zone(&w, &w.acme, "North", square(0.0, 0.0, 10.0)).await;
        let theirs = add_zone(&w, &rival, "Overlap", square(0.0, 0.0, 10.0)).await;
        add_service(&w, &north, &w.repair).await;

        let v = ConsistencyValidator::new(&w.repo);
        assert!(v.check_service(&candidate(&theirs, &w.repair)).await.unwrap().is_admissible());
    }

    #[tokio::test]
    async fn a_zone_holds_one_service_per_type() {
        let w = world().await;
        let north = add_zone(&w, &w.acme, "North", square(0.0, 0.0, 10.0)).await;
        let existing = add_service(&w, &north, &w.repair).await;

        let v = ConsistencyValidator::new(&w.repo);
        assert!(!v.check_service(&candidate(&north, &w.repair)).await.unwrap().is_admissible());

        // re-validating the stored record against itself is fine
        let again = ServiceCandidate { existing_id: Some(existing.id), ..candidate(&north, &w.repair) };
        assert!(v.check_service(&again).await.unwrap().is_admissible());
    }

    #[tokio::test]
    async fn reshaping_a_zone_onto_a_same_type_neighbour_conflicts() {
        let w = world().await;
        let north = add_zone(&w, &w.acme, "North", square(0.0, 0.0, 10.0)).await;
        let east = add_zone(&w, &w.acme, "East", square(20.0, 0.0, 10.0)).await;
        add_service(&w, &north, &w.repair).await;
        add_service(&w, &east, &w.repair).await;

        let v = ConsistencyValidator::new(&w.repo);
        let mut grown = east.zone.clone();
        grown.mpoly = square(5.0, 0.0, 30.0);
        match v.check_zone_reshape(&grown).await.unwrap() {
            Verdict::Conflict { zone_name, .. } => assert_eq!(zone_name, "North"),
            other => panic!("expected conflict, got {other:?}"),
        }

        // an empty zone can go anywhere
        let empty = add_zone(&w, &w.acme, "Empty", square(40.0, 0.0, 1.0)).await;
        let mut moved = empty.zone.clone();
        moved.mpoly = square(0.0, 0.0, 10.0);
        assert!(v.check_zone_reshape(&moved).await.unwrap().is_admissible());
    }

    #[test]
    fn conflict_becomes_zone_field_error() {
        let err = Verdict::Conflict { zone_id: Uuid::nil(), zone_name: "North".into() }
            .into_result("zone")
            .unwrap_err();
        let fields = err.field_errors().unwrap();
        assert!(fields.get("zone").unwrap()[0].contains("\"North\""));
        assert!(Verdict::Admissible.into_result("zone").is_ok());
    }
}
