use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Provider: "my providers" lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_provider_manager")
                    .table(Provider::Table)
                    .col(Provider::ManagerId)
                    .to_owned(),
            )
            .await?;

        // Zone: intersect queries are always scoped by provider
        manager
            .create_index(
                Index::create()
                    .name("idx_zone_provider")
                    .table(Zone::Table)
                    .col(Zone::ProviderId)
                    .to_owned(),
            )
            .await?;

        // Service: conflict lookup is (zone_id IN .., service_type_id = ..)
        manager
            .create_index(
                Index::create()
                    .name("idx_service_type_zone")
                    .table(Service::Table)
                    .col(Service::ServiceTypeId)
                    .col(Service::ZoneId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_service_zone")
                    .table(Service::Table)
                    .col(Service::ZoneId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_index(Index::drop().name("idx_service_zone").table(Service::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_service_type_zone").table(Service::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_zone_provider").table(Zone::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_provider_manager").table(Provider::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Provider { Table, ManagerId }

#[derive(DeriveIden)]
enum Zone { Table, ProviderId }

#[derive(DeriveIden)]
enum Service { Table, ZoneId, ServiceTypeId }
