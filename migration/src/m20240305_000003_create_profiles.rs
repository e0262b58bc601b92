use sea_orm_migration::{prelude::*, schema::*};

use super::m20240305_000002_create_users::User;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Every profile table hangs off exactly one user and goes with it.
fn user_fk(name: &str, table: impl IntoIden + 'static, column: impl IntoIden + 'static) -> ForeignKeyCreateStatement {
    ForeignKey::create()
        .name(name)
        .from(table, column)
        .to(User::Table, User::Id)
        .on_delete(ForeignKeyAction::Cascade)
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OwnerProfile::Table)
                    .if_not_exists()
                    .col(uuid(OwnerProfile::Id).primary_key())
                    .col(uuid(OwnerProfile::UserId).not_null().unique_key())
                    .col(string_len_null(OwnerProfile::CompanyName, 150))
                    .col(string_len_null(OwnerProfile::IdNumber, 30))
                    .col(string_len_null(OwnerProfile::Address, 255))
                    .col(
                        timestamp_with_time_zone(OwnerProfile::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_owner_profile_user",
                        OwnerProfile::Table,
                        OwnerProfile::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DriverProfile::Table)
                    .if_not_exists()
                    .col(uuid(DriverProfile::Id).primary_key())
                    .col(uuid(DriverProfile::UserId).not_null().unique_key())
                    .col(string_len(DriverProfile::LicenseNumber, 50).not_null())
                    .col(date_null(DriverProfile::LicenseExpiry))
                    .col(date_null(DriverProfile::PdpExpiry))
                    .col(boolean(DriverProfile::IsAvailable).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(DriverProfile::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_driver_profile_user",
                        DriverProfile::Table,
                        DriverProfile::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StaffProfile::Table)
                    .if_not_exists()
                    .col(uuid(StaffProfile::Id).primary_key())
                    .col(uuid(StaffProfile::UserId).not_null().unique_key())
                    .col(string_len_null(StaffProfile::Position, 100))
                    .col(
                        timestamp_with_time_zone(StaffProfile::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_staff_profile_user",
                        StaffProfile::Table,
                        StaffProfile::UserId,
                    ))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ServiceProviderProfile::Table)
                    .if_not_exists()
                    .col(uuid(ServiceProviderProfile::Id).primary_key())
                    .col(uuid(ServiceProviderProfile::UserId).not_null().unique_key())
                    .col(string_len(ServiceProviderProfile::BusinessName, 150).not_null())
                    .col(string_len_null(ServiceProviderProfile::ServiceTypes, 255))
                    .col(string_len_null(ServiceProviderProfile::Address, 255))
                    .col(
                        timestamp_with_time_zone(ServiceProviderProfile::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(&mut user_fk(
                        "fk_service_provider_profile_user",
                        ServiceProviderProfile::Table,
                        ServiceProviderProfile::UserId,
                    ))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServiceProviderProfile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(StaffProfile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DriverProfile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OwnerProfile::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum OwnerProfile {
    Table,
    Id,
    UserId,
    CompanyName,
    IdNumber,
    Address,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum DriverProfile {
    Table,
    Id,
    UserId,
    LicenseNumber,
    LicenseExpiry,
    PdpExpiry,
    IsAvailable,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum StaffProfile {
    Table,
    Id,
    UserId,
    Position,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum ServiceProviderProfile {
    Table,
    Id,
    UserId,
    BusinessName,
    ServiceTypes,
    Address,
    CreatedAt,
}
