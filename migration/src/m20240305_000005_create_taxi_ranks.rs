use sea_orm_migration::{prelude::*, schema::*};

use super::m20240305_000001_create_tenants::Tenant;
use super::m20240305_000002_create_users::User;
use super::m20240305_000004_create_vehicles::Vehicle;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TaxiRank::Table)
                    .if_not_exists()
                    .col(uuid(TaxiRank::Id).primary_key())
                    .col(uuid(TaxiRank::TenantId).not_null())
                    .col(string_len(TaxiRank::Name, 150).not_null())
                    .col(string_len(TaxiRank::Code, 30).not_null())
                    .col(string_len(TaxiRank::Address, 255).not_null())
                    .col(string_len(TaxiRank::City, 100).not_null())
                    .col(double_null(TaxiRank::Latitude))
                    .col(double_null(TaxiRank::Longitude))
                    .col(integer(TaxiRank::Capacity).not_null().default(0))
                    .col(boolean(TaxiRank::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(TaxiRank::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_taxi_rank_tenant")
                            .from(TaxiRank::Table, TaxiRank::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MarshalProfile::Table)
                    .if_not_exists()
                    .col(uuid(MarshalProfile::Id).primary_key())
                    .col(uuid(MarshalProfile::UserId).not_null().unique_key())
                    .col(uuid_null(MarshalProfile::TaxiRankId))
                    .col(string_len(MarshalProfile::MarshalCode, 40).not_null().unique_key())
                    .col(
                        timestamp_with_time_zone(MarshalProfile::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_marshal_profile_user")
                            .from(MarshalProfile::Table, MarshalProfile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_marshal_profile_taxi_rank")
                            .from(MarshalProfile::Table, MarshalProfile::TaxiRankId)
                            .to(TaxiRank::Table, TaxiRank::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleTaxiRank::Table)
                    .if_not_exists()
                    .col(uuid(VehicleTaxiRank::Id).primary_key())
                    .col(uuid(VehicleTaxiRank::VehicleId).not_null())
                    .col(uuid(VehicleTaxiRank::TaxiRankId).not_null())
                    .col(
                        timestamp_with_time_zone(VehicleTaxiRank::AssignedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_taxi_rank_vehicle")
                            .from(VehicleTaxiRank::Table, VehicleTaxiRank::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_taxi_rank_taxi_rank")
                            .from(VehicleTaxiRank::Table, VehicleTaxiRank::TaxiRankId)
                            .to(TaxiRank::Table, TaxiRank::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicle_taxi_rank_pair")
                    .table(VehicleTaxiRank::Table)
                    .col(VehicleTaxiRank::VehicleId)
                    .col(VehicleTaxiRank::TaxiRankId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Route::Table)
                    .if_not_exists()
                    .col(uuid(Route::Id).primary_key())
                    .col(uuid(Route::TenantId).not_null())
                    .col(uuid(Route::TaxiRankId).not_null())
                    .col(string_len(Route::Name, 150).not_null())
                    .col(string_len(Route::Origin, 150).not_null())
                    .col(string_len(Route::Destination, 150).not_null())
                    .col(double_null(Route::DistanceKm))
                    .col(decimal_len(Route::StandardFare, 12, 2).not_null())
                    .col(integer_null(Route::EstimatedMinutes))
                    .col(boolean(Route::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(Route::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_route_tenant")
                            .from(Route::Table, Route::TenantId)
                            .to(Tenant::Table, Tenant::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_route_taxi_rank")
                            .from(Route::Table, Route::TaxiRankId)
                            .to(TaxiRank::Table, TaxiRank::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleRouteAssignment::Table)
                    .if_not_exists()
                    .col(uuid(VehicleRouteAssignment::Id).primary_key())
                    .col(uuid(VehicleRouteAssignment::VehicleId).not_null())
                    .col(uuid(VehicleRouteAssignment::RouteId).not_null())
                    .col(boolean(VehicleRouteAssignment::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(VehicleRouteAssignment::AssignedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_route_assignment_vehicle")
                            .from(VehicleRouteAssignment::Table, VehicleRouteAssignment::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vehicle_route_assignment_route")
                            .from(VehicleRouteAssignment::Table, VehicleRouteAssignment::RouteId)
                            .to(Route::Table, Route::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vehicle_route_assignment_pair")
                    .table(VehicleRouteAssignment::Table)
                    .col(VehicleRouteAssignment::VehicleId)
                    .col(VehicleRouteAssignment::RouteId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VehicleRouteAssignment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Route::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleTaxiRank::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MarshalProfile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaxiRank::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum TaxiRank {
    Table,
    Id,
    TenantId,
    Name,
    Code,
    Address,
    City,
    Latitude,
    Longitude,
    Capacity,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MarshalProfile {
    Table,
    Id,
    UserId,
    TaxiRankId,
    MarshalCode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VehicleTaxiRank {
    Table,
    Id,
    VehicleId,
    TaxiRankId,
    AssignedAt,
}

#[derive(DeriveIden)]
pub enum Route {
    Table,
    Id,
    TenantId,
    TaxiRankId,
    Name,
    Origin,
    Destination,
    DistanceKm,
    StandardFare,
    EstimatedMinutes,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VehicleRouteAssignment {
    Table,
    Id,
    VehicleId,
    RouteId,
    IsActive,
    AssignedAt,
}
