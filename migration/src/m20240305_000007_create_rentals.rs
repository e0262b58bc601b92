use sea_orm_migration::{prelude::*, schema::*};

use super::m20240305_000001_create_tenants::Tenant;
use super::m20240305_000002_create_users::User;
use super::m20240305_000003_create_profiles::OwnerProfile;
use super::m20240305_000004_create_vehicles::Vehicle;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VehicleRentalRequest::Table)
                    .if_not_exists()
                    .col(uuid(VehicleRentalRequest::Id).primary_key())
                    .col(uuid(VehicleRentalRequest::RenterId).not_null())
                    .col(uuid_null(VehicleRentalRequest::TenantId))
                    .col(string_len(VehicleRentalRequest::VehicleType, 50).not_null())
                    .col(string_len(VehicleRentalRequest::PickupLocation, 255).not_null())
                    .col(date(VehicleRentalRequest::StartDate).not_null())
                    .col(date(VehicleRentalRequest::EndDate).not_null())
                    .col(decimal_len_null(VehicleRentalRequest::Budget, 12, 2))
                    .col(text_null(VehicleRentalRequest::Notes))
                    .col(string_len(VehicleRentalRequest::Status, 20).not_null().default("open"))
                    .col(
                        timestamp_with_time_zone(VehicleRentalRequest::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_request_renter")
                            .from(VehicleRentalRequest::Table, VehicleRentalRequest::RenterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_request_tenant")
                            .from(VehicleRentalRequest::Table, VehicleRentalRequest::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RentalOffer::Table)
                    .if_not_exists()
                    .col(uuid(RentalOffer::Id).primary_key())
                    .col(uuid(RentalOffer::RequestId).not_null())
                    .col(uuid(RentalOffer::OwnerProfileId).not_null())
                    .col(uuid(RentalOffer::VehicleId).not_null())
                    .col(decimal_len(RentalOffer::PricePerDay, 12, 2).not_null())
                    .col(text_null(RentalOffer::Notes))
                    .col(string_len(RentalOffer::Status, 20).not_null().default("pending"))
                    .col(
                        timestamp_with_time_zone(RentalOffer::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_offer_request")
                            .from(RentalOffer::Table, RentalOffer::RequestId)
                            .to(VehicleRentalRequest::Table, VehicleRentalRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_offer_owner_profile")
                            .from(RentalOffer::Table, RentalOffer::OwnerProfileId)
                            .to(OwnerProfile::Table, OwnerProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_offer_vehicle")
                            .from(RentalOffer::Table, RentalOffer::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleRentalBooking::Table)
                    .if_not_exists()
                    .col(uuid(VehicleRentalBooking::Id).primary_key())
                    .col(uuid(VehicleRentalBooking::RequestId).not_null())
                    .col(uuid(VehicleRentalBooking::OfferId).not_null().unique_key())
                    .col(uuid(VehicleRentalBooking::RenterId).not_null())
                    .col(uuid(VehicleRentalBooking::VehicleId).not_null())
                    .col(date(VehicleRentalBooking::StartDate).not_null())
                    .col(date(VehicleRentalBooking::EndDate).not_null())
                    .col(decimal_len(VehicleRentalBooking::TotalPrice, 12, 2).not_null())
                    .col(string_len(VehicleRentalBooking::Status, 20).not_null().default("active"))
                    .col(
                        timestamp_with_time_zone(VehicleRentalBooking::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_booking_request")
                            .from(VehicleRentalBooking::Table, VehicleRentalBooking::RequestId)
                            .to(VehicleRentalRequest::Table, VehicleRentalRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_booking_offer")
                            .from(VehicleRentalBooking::Table, VehicleRentalBooking::OfferId)
                            .to(RentalOffer::Table, RentalOffer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_booking_renter")
                            .from(VehicleRentalBooking::Table, VehicleRentalBooking::RenterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rental_booking_vehicle")
                            .from(VehicleRentalBooking::Table, VehicleRentalBooking::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehicleRentalBooking::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RentalOffer::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleRentalRequest::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum VehicleRentalRequest {
    Table,
    Id,
    RenterId,
    TenantId,
    VehicleType,
    PickupLocation,
    StartDate,
    EndDate,
    Budget,
    Notes,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RentalOffer {
    Table,
    Id,
    RequestId,
    OwnerProfileId,
    VehicleId,
    PricePerDay,
    Notes,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VehicleRentalBooking {
    Table,
    Id,
    RequestId,
    OfferId,
    RenterId,
    VehicleId,
    StartDate,
    EndDate,
    TotalPrice,
    Status,
    CreatedAt,
}
