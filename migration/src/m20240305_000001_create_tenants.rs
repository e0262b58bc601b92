use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tenant::Table)
                    .if_not_exists()
                    .col(uuid(Tenant::Id).primary_key())
                    .col(string_len(Tenant::Name, 150).not_null())
                    .col(string_len(Tenant::Code, 30).not_null().unique_key())
                    .col(string_len(Tenant::TenantType, 20).not_null())
                    .col(string_len_null(Tenant::ContactPerson, 150))
                    .col(string_len_null(Tenant::Email, 255))
                    .col(string_len_null(Tenant::Phone, 30))
                    .col(string_len_null(Tenant::Address, 255))
                    .col(boolean(Tenant::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Tenant::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Tenant::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Tenant {
    Table,
    Id,
    Name,
    Code,
    TenantType,
    ContactPerson,
    Email,
    Phone,
    Address,
    IsActive,
    CreatedAt,
}
