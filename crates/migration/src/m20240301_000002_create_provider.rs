//! Create `provider` table.
//!
//! Root of the ownership chain. `manager_id` is the external user id of the
//! creator; users live in the identity system, so there is no FK for it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Provider::Table)
                    .if_not_exists()
                    .col(uuid(Provider::Id).primary_key())
                    .col(string_len(Provider::Name, 250).not_null())
                    .col(string_len(Provider::Email, 254).not_null())
                    .col(string_len(Provider::Phone, 10).not_null())
                    .col(string_len(Provider::Address, 250).not_null())
                    .col(uuid(Provider::ManagerId).not_null())
                    .col(timestamp_with_time_zone(Provider::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Provider::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Provider::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Provider {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Address,
    ManagerId,
    CreatedAt,
    UpdatedAt,
}
