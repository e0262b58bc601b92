use sea_orm_migration::{prelude::*, schema::*};

use super::m20240305_000001_create_tenants::Tenant;
use super::m20240305_000003_create_profiles::OwnerProfile;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vehicle::Table)
                    .if_not_exists()
                    .col(uuid(Vehicle::Id).primary_key())
                    .col(uuid(Vehicle::OwnerProfileId).not_null())
                    .col(uuid(Vehicle::TenantId).not_null())
                    .col(string_len(Vehicle::RegistrationNumber, 20).not_null().unique_key())
                    .col(string_len(Vehicle::Make, 50).not_null())
                    .col(string_len(Vehicle::Model, 50).not_null())
                    .col(integer_null(Vehicle::Year))
                    .col(string_len_null(Vehicle::Vin, 32))
                    .col(string_len_null(Vehicle::Colour, 30))
                    .col(integer(Vehicle::SeatingCapacity).not_null())
                    .col(json_binary(Vehicle::Photos).not_null().default("[]"))
                    .col(string_len(Vehicle::Status, 20).not_null().default("active"))
                    .col(
                        timestamp_with_time_zone(Vehicle::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_owner_profile")
                            .from(Vehicle::Table, Vehicle::OwnerProfileId)
                            .to(OwnerProfile::Table, OwnerProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_tenant")
                            .from(Vehicle::Table, Vehicle::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleDocument::Table)
                    .if_not_exists()
                    .col(uuid(VehicleDocument::Id).primary_key())
                    .col(uuid(VehicleDocument::VehicleId).not_null())
                    .col(string_len(VehicleDocument::DocumentType, 50).not_null())
                    .col(string_len(VehicleDocument::Url, 500).not_null())
                    .col(date_null(VehicleDocument::ExpiresOn))
                    .col(
                        timestamp_with_time_zone(VehicleDocument::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_document_vehicle")
                            .from(VehicleDocument::Table, VehicleDocument::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleEarning::Table)
                    .if_not_exists()
                    .col(uuid(VehicleEarning::Id).primary_key())
                    .col(uuid(VehicleEarning::VehicleId).not_null())
                    .col(decimal_len(VehicleEarning::Amount, 12, 2).not_null())
                    .col(date(VehicleEarning::EarnedOn).not_null())
                    .col(string_len_null(VehicleEarning::Description, 255))
                    .col(
                        timestamp_with_time_zone(VehicleEarning::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_earning_vehicle")
                            .from(VehicleEarning::Table, VehicleEarning::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleExpense::Table)
                    .if_not_exists()
                    .col(uuid(VehicleExpense::Id).primary_key())
                    .col(uuid(VehicleExpense::VehicleId).not_null())
                    .col(decimal_len(VehicleExpense::Amount, 12, 2).not_null())
                    .col(date(VehicleExpense::SpentOn).not_null())
                    .col(string_len(VehicleExpense::Category, 50).not_null())
                    .col(string_len_null(VehicleExpense::Description, 255))
                    .col(
                        timestamp_with_time_zone(VehicleExpense::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_expense_vehicle")
                            .from(VehicleExpense::Table, VehicleExpense::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehicleExpense::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleEarning::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleDocument::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vehicle::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Vehicle {
    Table,
    Id,
    OwnerProfileId,
    TenantId,
    RegistrationNumber,
    Make,
    Model,
    Year,
    Vin,
    Colour,
    SeatingCapacity,
    Photos,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VehicleDocument {
    Table,
    Id,
    VehicleId,
    DocumentType,
    Url,
    ExpiresOn,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VehicleEarning {
    Table,
    Id,
    VehicleId,
    Amount,
    EarnedOn,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VehicleExpense {
    Table,
    Id,
    VehicleId,
    Amount,
    SpentOn,
    Category,
    Description,
    CreatedAt,
}
