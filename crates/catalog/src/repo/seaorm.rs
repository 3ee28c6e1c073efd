//! SeaORM/PostGIS-backed repository.
//!
//! Spatial predicates run in the database against the generated `zone.geom`
//! column; see the zone migration.

use async_trait::async_trait;
use chrono::Utc;
use common::types::GeoPoint;
use geo::MultiPolygon;
use sea_orm::sea_query::Query;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, Statement,
};
use uuid::Uuid;

use models::{geometry, provider, service, service_type, zone};

use super::{CatalogRepository, GeometryStore};
use crate::domain::{Provider, Service, ServiceFilter, ServiceType, Zone, ZoneFilter};
use crate::errors::ServiceError;

pub struct SeaOrmCatalog {
    pub db: DatabaseConnection,
    /// SRID of `zone.geom`; must match the migration.
    pub srid: i32,
}

impl SeaOrmCatalog {
    pub fn new(db: DatabaseConnection, srid: i32) -> Self { Self { db, srid } }
}

fn to_provider(m: provider::Model) -> Provider {
    Provider { id: m.id, name: m.name, email: m.email, phone: m.phone, address: m.address, manager_id: m.manager_id }
}

fn to_zone(m: zone::Model) -> Result<Zone, ServiceError> {
    let mpoly = geometry::from_wkt(&m.mpoly)?;
    Ok(Zone { id: m.id, name: m.name, mpoly, provider_id: m.provider_id })
}

fn to_zones(rows: Vec<zone::Model>) -> Result<Vec<Zone>, ServiceError> {
    rows.into_iter().map(to_zone).collect()
}

fn to_service(m: service::Model) -> Service {
    Service { id: m.id, name: m.name, zone_id: m.zone_id, service_type_id: m.service_type_id, cost: m.cost }
}

fn to_service_type(m: service_type::Model) -> ServiceType {
    ServiceType { id: m.id, name: m.name }
}

#[async_trait]
impl GeometryStore for SeaOrmCatalog {
    async fn intersecting_zone_ids(&self, provider_id: Uuid, mpoly: &MultiPolygon<f64>) -> Result<Vec<Uuid>, ServiceError> {
        let sql = format!(
            "SELECT id FROM zone WHERE provider_id = $1 AND ST_Intersects(geom, ST_GeomFromText($2, {}))",
            self.srid
        );
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            sql,
            [provider_id.into(), geometry::to_wkt(mpoly).into()],
        );
        let rows = self.db.query_all(stmt).await?;
        rows.iter()
            .map(|row| row.try_get::<Uuid>("", "id").map_err(ServiceError::from))
            .collect()
    }

    async fn zones_containing_point(&self, point: GeoPoint) -> Result<Vec<Zone>, ServiceError> {
        let sql = format!(
            "SELECT id, name, mpoly, provider_id, created_at, updated_at FROM zone \
             WHERE ST_Covers(geom, ST_SetSRID(ST_MakePoint($1, $2), {})) ORDER BY name, id",
            self.srid
        );
        let stmt = Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            sql,
            [point.longitude.into(), point.latitude.into()],
        );
        let rows = zone::Entity::find().from_raw_sql(stmt).all(&self.db).await?;
        to_zones(rows)
    }
}

#[async_trait]
impl CatalogRepository for SeaOrmCatalog {
    async fn list_service_types(&self) -> Result<Vec<ServiceType>, ServiceError> {
        let rows = service_type::Entity::find()
            .order_by_asc(service_type::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(to_service_type).collect())
    }

    async fn get_service_type(&self, id: Uuid) -> Result<Option<ServiceType>, ServiceError> {
        Ok(service_type::Entity::find_by_id(id).one(&self.db).await?.map(to_service_type))
    }

    async fn insert_service_type(&self, st: ServiceType) -> Result<ServiceType, ServiceError> {
        let am = service_type::ActiveModel { id: Set(st.id), name: Set(st.name) };
        Ok(to_service_type(am.insert(&self.db).await?))
    }

    async fn get_provider(&self, id: Uuid) -> Result<Option<Provider>, ServiceError> {
        Ok(provider::Entity::find_by_id(id).one(&self.db).await?.map(to_provider))
    }

    async fn list_providers_by_manager(&self, manager_id: Uuid) -> Result<Vec<Provider>, ServiceError> {
        let rows = provider::Entity::find()
            .filter(provider::Column::ManagerId.eq(manager_id))
            .order_by_asc(provider::Column::Name)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(to_provider).collect())
    }

    async fn insert_provider(&self, p: Provider) -> Result<Provider, ServiceError> {
        let now = Utc::now().into();
        let am = provider::ActiveModel {
            id: Set(p.id),
            name: Set(p.name),
            email: Set(p.email),
            phone: Set(p.phone),
            address: Set(p.address),
            manager_id: Set(p.manager_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(to_provider(am.insert(&self.db).await?))
    }

    async fn update_provider(&self, p: Provider) -> Result<Provider, ServiceError> {
        let mut am: provider::ActiveModel = provider::Entity::find_by_id(p.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("provider"))?
            .into();
        am.name = Set(p.name);
        am.email = Set(p.email);
        am.phone = Set(p.phone);
        am.address = Set(p.address);
        am.updated_at = Set(Utc::now().into());
        Ok(to_provider(am.update(&self.db).await?))
    }

    async fn delete_provider(&self, id: Uuid) -> Result<bool, ServiceError> {
        // zone and service rows go with it through ON DELETE CASCADE
        let res = provider::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn get_zone(&self, id: Uuid) -> Result<Option<Zone>, ServiceError> {
        zone::Entity::find_by_id(id).one(&self.db).await?.map(to_zone).transpose()
    }

    async fn list_zones(&self, filter: &ZoneFilter) -> Result<Vec<Zone>, ServiceError> {
        let mut finder = zone::Entity::find();
        if let Some(pid) = filter.provider {
            finder = finder.filter(zone::Column::ProviderId.eq(pid));
        }
        if let Some(tid) = filter.service_type {
            finder = finder.filter(
                zone::Column::Id.in_subquery(
                    Query::select()
                        .column(service::Column::ZoneId)
                        .from(service::Entity)
                        .and_where(service::Column::ServiceTypeId.eq(tid))
                        .to_owned(),
                ),
            );
        }
        let rows = finder
            .order_by_asc(zone::Column::Name)
            .order_by_asc(zone::Column::Id)
            .all(&self.db)
            .await?;
        to_zones(rows)
    }

    async fn insert_zone(&self, z: Zone) -> Result<Zone, ServiceError> {
        let now = Utc::now().into();
        let am = zone::ActiveModel {
            id: Set(z.id),
            name: Set(z.name),
            mpoly: Set(geometry::to_wkt(&z.mpoly)),
            provider_id: Set(z.provider_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        to_zone(am.insert(&self.db).await?)
    }

    async fn update_zone(&self, z: Zone) -> Result<Zone, ServiceError> {
        let mut am: zone::ActiveModel = zone::Entity::find_by_id(z.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("zone"))?
            .into();
        am.name = Set(z.name);
        am.mpoly = Set(geometry::to_wkt(&z.mpoly));
        am.provider_id = Set(z.provider_id);
        am.updated_at = Set(Utc::now().into());
        to_zone(am.update(&self.db).await?)
    }

    async fn delete_zone(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = zone::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>, ServiceError> {
        Ok(service::Entity::find_by_id(id).one(&self.db).await?.map(to_service))
    }

    async fn list_services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, ServiceError> {
        let mut finder = service::Entity::find();
        if let Some(zid) = filter.zone {
            finder = finder.filter(service::Column::ZoneId.eq(zid));
        }
        if let Some(tid) = filter.service_type {
            finder = finder.filter(service::Column::ServiceTypeId.eq(tid));
        }
        if let Some(pid) = filter.provider {
            finder = finder.filter(
                service::Column::ZoneId.in_subquery(
                    Query::select()
                        .column(zone::Column::Id)
                        .from(zone::Entity)
                        .and_where(zone::Column::ProviderId.eq(pid))
                        .to_owned(),
                ),
            );
        }
        let rows = finder
            .order_by_asc(service::Column::Name)
            .order_by_asc(service::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(to_service).collect())
    }

    async fn find_service_of_type(
        &self,
        zone_ids: &[Uuid],
        service_type_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Option<Service>, ServiceError> {
        if zone_ids.is_empty() {
            return Ok(None);
        }
        let mut finder = service::Entity::find()
            .filter(service::Column::ServiceTypeId.eq(service_type_id))
            .filter(service::Column::ZoneId.is_in(zone_ids.iter().copied()));
        if let Some(id) = exclude {
            finder = finder.filter(service::Column::Id.ne(id));
        }
        Ok(finder.one(&self.db).await?.map(to_service))
    }

    async fn insert_service(&self, s: Service) -> Result<Service, ServiceError> {
        let now = Utc::now().into();
        let am = service::ActiveModel {
            id: Set(s.id),
            name: Set(s.name),
            zone_id: Set(s.zone_id),
            service_type_id: Set(s.service_type_id),
            cost: Set(s.cost),
            created_at: Set(now),
            updated_at: Set(now),
        };
        Ok(to_service(am.insert(&self.db).await?))
    }

    async fn update_service(&self, s: Service) -> Result<Service, ServiceError> {
        let mut am: service::ActiveModel = service::Entity::find_by_id(s.id)
            .one(&self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("service"))?
            .into();
        am.name = Set(s.name);
        am.zone_id = Set(s.zone_id);
        am.service_type_id = Set(s.service_type_id);
        am.cost = Set(s.cost);
        am.updated_at = Set(Utc::now().into());
        Ok(to_service(am.update(&self.db).await?))
    }

    async fn delete_service(&self, id: Uuid) -> Result<bool, ServiceError> {
        let res = service::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(res.rows_affected > 0)
    }
}
