use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trip_passenger")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub trip_id: Uuid,
    pub passenger_user_id: Option<Uuid>,
    pub name: String,
    pub phone: Option<String>,
    pub seat_number: Option<i32>,
    pub fare_amount: Decimal,
    pub boarded_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::taxi_rank_trip::Entity",
        from = "Column::TripId",
        to = "super::taxi_rank_trip::Column::Id",
        on_delete = "Cascade"
    )]
    Trip,
}

impl Related<super::taxi_rank_trip::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Trip.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
