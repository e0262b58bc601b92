use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "marshal_profile")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub taxi_rank_id: Option<Uuid>,
    #[sea_orm(unique)]
    pub marshal_code: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::taxi_rank::Entity",
        from = "Column::TaxiRankId",
        to = "super::taxi_rank::Column::Id",
        on_delete = "SetNull"
    )]
    TaxiRank,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::taxi_rank::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TaxiRank.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
