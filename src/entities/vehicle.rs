use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum VehicleStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "inactive")]
    Inactive,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vehicle")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_profile_id: Uuid,
    pub tenant_id: Uuid,
    #[sea_orm(unique)]
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub colour: Option<String>,
    pub seating_capacity: i32,
    /// JSON array of photo URLs
    pub photos: Json,
    pub status: VehicleStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::owner_profile::Entity",
        from = "Column::OwnerProfileId",
        to = "super::owner_profile::Column::Id",
        on_delete = "Cascade"
    )]
    OwnerProfile,
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_delete = "Cascade"
    )]
    Tenant,
    #[sea_orm(has_many = "super::vehicle_document::Entity")]
    Documents,
    #[sea_orm(has_many = "super::vehicle_earning::Entity")]
    Earnings,
    #[sea_orm(has_many = "super::vehicle_expense::Entity")]
    Expenses,
    #[sea_orm(has_many = "super::vehicle_taxi_rank::Entity")]
    TaxiRanks,
    #[sea_orm(has_many = "super::vehicle_route_assignment::Entity")]
    RouteAssignments,
}

impl Related<super::owner_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OwnerProfile.def()
    }
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::vehicle_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Documents.def()
    }
}

impl Related<super::vehicle_earning::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Earnings.def()
    }
}

impl Related<super::vehicle_expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::vehicle_taxi_rank::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaxiRanks.def()
    }
}

impl Related<super::vehicle_route_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RouteAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
