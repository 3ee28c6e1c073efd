//! Create `zone` table.
//!
//! The polygon is written as WKT text (`mpoly`); PostGIS derives a stored
//! `geom` column from it so spatial predicates can use a GIST index.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let conn = manager.get_connection();
        conn.execute_unprepared("CREATE EXTENSION IF NOT EXISTS postgis").await?;

        manager
            .create_table(
                Table::create()
                    .table(Zone::Table)
                    .if_not_exists()
                    .col(uuid(Zone::Id).primary_key())
                    .col(string_len(Zone::Name, 250).not_null())
                    .col(text(Zone::Mpoly).not_null())
                    .col(uuid(Zone::ProviderId).not_null())
                    .col(timestamp_with_time_zone(Zone::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Zone::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_zone_provider")
                            .from(Zone::Table, Zone::ProviderId)
                            .to(Provider::Table, Provider::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        conn.execute_unprepared(
            "ALTER TABLE zone ADD COLUMN IF NOT EXISTS geom geometry(MultiPolygon, 4326) \
             GENERATED ALWAYS AS (ST_Multi(ST_GeomFromText(mpoly, 4326))) STORED",
        )
        .await?;
        conn.execute_unprepared("CREATE INDEX IF NOT EXISTS idx_zone_geom ON zone USING GIST (geom)")
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Zone::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Zone {
    Table,
    Id,
    Name,
    Mpoly,
    ProviderId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Provider { Table, Id }
