use sea_orm_migration::{prelude::*, schema::*};

use super::m20240305_000002_create_users::User;
use super::m20240305_000004_create_vehicles::Vehicle;
use super::m20240305_000005_create_taxi_ranks::{Route, TaxiRank};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TripSchedule::Table)
                    .if_not_exists()
                    .col(uuid(TripSchedule::Id).primary_key())
                    .col(uuid(TripSchedule::RouteId).not_null())
                    .col(uuid_null(TripSchedule::VehicleId))
                    .col(integer(TripSchedule::DayOfWeek).not_null())
                    .col(time(TripSchedule::DepartureTime).not_null())
                    .col(boolean(TripSchedule::IsActive).not_null().default(true))
                    .col(
                        timestamp_with_time_zone(TripSchedule::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_schedule_route")
                            .from(TripSchedule::Table, TripSchedule::RouteId)
                            .to(Route::Table, Route::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_schedule_vehicle")
                            .from(TripSchedule::Table, TripSchedule::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TaxiRankTrip::Table)
                    .if_not_exists()
                    .col(uuid(TaxiRankTrip::Id).primary_key())
                    .col(uuid(TaxiRankTrip::TaxiRankId).not_null())
                    .col(uuid(TaxiRankTrip::RouteId).not_null())
                    .col(uuid(TaxiRankTrip::VehicleId).not_null())
                    .col(uuid_null(TaxiRankTrip::DriverId))
                    .col(uuid_null(TaxiRankTrip::MarshalId))
                    .col(uuid_null(TaxiRankTrip::ScheduleId))
                    .col(timestamp_with_time_zone(TaxiRankTrip::DepartureAt).not_null())
                    .col(timestamp_with_time_zone_null(TaxiRankTrip::ArrivedAt))
                    .col(string_len(TaxiRankTrip::Status, 20).not_null().default("scheduled"))
                    .col(integer(TaxiRankTrip::PassengerCount).not_null().default(0))
                    .col(decimal_len(TaxiRankTrip::TotalFare, 12, 2).not_null().default(0))
                    .col(text_null(TaxiRankTrip::Notes))
                    .col(
                        timestamp_with_time_zone(TaxiRankTrip::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_taxi_rank_trip_taxi_rank")
                            .from(TaxiRankTrip::Table, TaxiRankTrip::TaxiRankId)
                            .to(TaxiRank::Table, TaxiRank::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_taxi_rank_trip_route")
                            .from(TaxiRankTrip::Table, TaxiRankTrip::RouteId)
                            .to(Route::Table, Route::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_taxi_rank_trip_vehicle")
                            .from(TaxiRankTrip::Table, TaxiRankTrip::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_taxi_rank_trip_driver")
                            .from(TaxiRankTrip::Table, TaxiRankTrip::DriverId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_taxi_rank_trip_marshal")
                            .from(TaxiRankTrip::Table, TaxiRankTrip::MarshalId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_taxi_rank_trip_schedule")
                            .from(TaxiRankTrip::Table, TaxiRankTrip::ScheduleId)
                            .to(TripSchedule::Table, TripSchedule::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TripPassenger::Table)
                    .if_not_exists()
                    .col(uuid(TripPassenger::Id).primary_key())
                    .col(uuid(TripPassenger::TripId).not_null())
                    .col(uuid_null(TripPassenger::PassengerUserId))
                    .col(string_len(TripPassenger::Name, 150).not_null())
                    .col(string_len_null(TripPassenger::Phone, 30))
                    .col(integer_null(TripPassenger::SeatNumber))
                    .col(decimal_len(TripPassenger::FareAmount, 12, 2).not_null())
                    .col(
                        timestamp_with_time_zone(TripPassenger::BoardedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_passenger_trip")
                            .from(TripPassenger::Table, TripPassenger::TripId)
                            .to(TaxiRankTrip::Table, TaxiRankTrip::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_trip_passenger_user")
                            .from(TripPassenger::Table, TripPassenger::PassengerUserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // NULL seats never collide, so walk-ins without a seat are unaffected
        manager
            .create_index(
                Index::create()
                    .name("idx_trip_passenger_seat")
                    .table(TripPassenger::Table)
                    .col(TripPassenger::TripId)
                    .col(TripPassenger::SeatNumber)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TripPassenger::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TaxiRankTrip::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TripSchedule::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TripSchedule {
    Table,
    Id,
    RouteId,
    VehicleId,
    DayOfWeek,
    DepartureTime,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TaxiRankTrip {
    Table,
    Id,
    TaxiRankId,
    RouteId,
    VehicleId,
    DriverId,
    MarshalId,
    ScheduleId,
    DepartureAt,
    ArrivedAt,
    Status,
    PassengerCount,
    TotalFare,
    Notes,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TripPassenger {
    Table,
    Id,
    TripId,
    PassengerUserId,
    Name,
    Phone,
    SeatNumber,
    FareAmount,
    BoardedAt,
}
