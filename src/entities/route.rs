use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "route")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub taxi_rank_id: Uuid,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub distance_km: Option<f64>,
    pub standard_fare: Decimal,
    pub estimated_minutes: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tenant::Entity",
        from = "Column::TenantId",
        to = "super::tenant::Column::Id",
        on_delete = "Cascade"
    )]
    Tenant,
    #[sea_orm(
        belongs_to = "super::taxi_rank::Entity",
        from = "Column::TaxiRankId",
        to = "super::taxi_rank::Column::Id",
        on_delete = "Cascade"
    )]
    TaxiRank,
    #[sea_orm(has_many = "super::trip_schedule::Entity")]
    Schedules,
    #[sea_orm(has_many = "super::vehicle_route_assignment::Entity")]
    VehicleAssignments,
}

impl Related<super::tenant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tenant.def()
    }
}

impl Related<super::taxi_rank::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaxiRank.def()
    }
}

impl Related<super::trip_schedule::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Schedules.def()
    }
}

impl Related<super::vehicle_route_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
