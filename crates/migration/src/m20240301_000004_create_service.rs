//! Create `service` table.
//!
//! Cost is NUMERIC(10,2) and never negative.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Service::Table)
                    .if_not_exists()
                    .col(uuid(Service::Id).primary_key())
                    .col(string_len(Service::Name, 250).not_null())
                    .col(uuid(Service::ZoneId).not_null())
                    .col(uuid(Service::ServiceTypeId).not_null())
                    .col(
                        decimal_len(Service::Cost, 10, 2)
                            .not_null()
                            .check(Expr::col(Service::Cost).gte(0)),
                    )
                    .col(timestamp_with_time_zone(Service::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Service::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_zone")
                            .from(Service::Table, Service::ZoneId)
                            .to(Zone::Table, Zone::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_service_service_type")
                            .from(Service::Table, Service::ServiceTypeId)
                            .to(ServiceType::Table, ServiceType::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Service::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Service {
    Table,
    Id,
    Name,
    ZoneId,
    ServiceTypeId,
    Cost,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Zone { Table, Id }

#[derive(DeriveIden)]
enum ServiceType { Table, Id }
