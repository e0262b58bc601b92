use sea_orm_migration::{prelude::*, schema::*};

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
                    .table(TrackingDeviceRequest::Table)
                    .if_not_exists()
                    .col(uuid(TrackingDeviceRequest::Id).primary_key())
                    .col(uuid(TrackingDeviceRequest::RequesterId).not_null())
                    .col(uuid(TrackingDeviceRequest::VehicleId).not_null())
                    .col(string_len(TrackingDeviceRequest::DeviceType, 50).not_null())
                    .col(text_null(TrackingDeviceRequest::Notes))
                    .col(string_len(TrackingDeviceRequest::Status, 20).not_null().default("open"))
                    .col(
                        timestamp_with_time_zone(TrackingDeviceRequest::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracking_device_request_requester")
                            .from(TrackingDeviceRequest::Table, TrackingDeviceRequest::RequesterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracking_device_request_vehicle")
                            .from(TrackingDeviceRequest::Table, TrackingDeviceRequest::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TrackingDeviceOffer::Table)
                    .if_not_exists()
                    .col(uuid(TrackingDeviceOffer::Id).primary_key())
                    .col(uuid(TrackingDeviceOffer::RequestId).not_null())
                    .col(uuid(TrackingDeviceOffer::ProviderId).not_null())
                    .col(decimal_len(TrackingDeviceOffer::DevicePrice, 12, 2).not_null())
                    .col(decimal_len(TrackingDeviceOffer::InstallationFee, 12, 2).not_null().default(0))
                    .col(text_null(TrackingDeviceOffer::Description))
                    .col(string_len(TrackingDeviceOffer::Status, 20).not_null().default("pending"))
                    .col(
                        timestamp_with_time_zone(TrackingDeviceOffer::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracking_device_offer_request")
                            .from(TrackingDeviceOffer::Table, TrackingDeviceOffer::RequestId)
                            .to(TrackingDeviceRequest::Table, TrackingDeviceRequest::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tracking_device_offer_provider")
                            .from(TrackingDeviceOffer::Table, TrackingDeviceOffer::ProviderId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoadsideAssistanceRequest::Table)
                    .if_not_exists()
                    .col(uuid(RoadsideAssistanceRequest::Id).primary_key())
                    .col(uuid(RoadsideAssistanceRequest::RequesterId).not_null())
                    .col(uuid_null(RoadsideAssistanceRequest::VehicleId))
                    .col(string_len(RoadsideAssistanceRequest::AssistanceType, 50).not_null())
                    .col(string_len(RoadsideAssistanceRequest::Location, 255).not_null())
                    .col(double_null(RoadsideAssistanceRequest::Latitude))
                    .col(double_null(RoadsideAssistanceRequest::Longitude))
                    .col(text_null(RoadsideAssistanceRequest::Description))
                    .col(string_len(RoadsideAssistanceRequest::Status, 20).not_null().default("pending"))
                    .col(uuid_null(RoadsideAssistanceRequest::AssignedProviderId))
                    .col(
                        timestamp_with_time_zone(RoadsideAssistanceRequest::CreatedAt)
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_roadside_requester")
                            .from(RoadsideAssistanceRequest::Table, RoadsideAssistanceRequest::RequesterId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_roadside_vehicle")
                            .from(RoadsideAssistanceRequest::Table, RoadsideAssistanceRequest::VehicleId)
                            .to(Vehicle::Table, Vehicle::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_roadside_assigned_provider")
                            .from(
                                RoadsideAssistanceRequest::Table,
                                RoadsideAssistanceRequest::AssignedProviderId,
                            )
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoadsideAssistanceRequest::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TrackingDeviceOffer::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TrackingDeviceRequest::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TrackingDeviceRequest {
    Table,
    Id,
    RequesterId,
    VehicleId,
    DeviceType,
    Notes,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TrackingDeviceOffer {
    Table,
    Id,
    RequestId,
    ProviderId,
    DevicePrice,
    InstallationFee,
    Description,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RoadsideAssistanceRequest {
    Table,
    Id,
    RequesterId,
    VehicleId,
    AssistanceType,
    Location,
    Latitude,
    Longitude,
    Description,
    Status,
    AssignedProviderId,
    CreatedAt,
}
