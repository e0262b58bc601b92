use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::rental_offer::OfferStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tracking_device_offer")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub request_id: Uuid,
    pub provider_id: Uuid,
    pub device_price: Decimal,
    pub installation_fee: Decimal,
    pub description: Option<String>,
    pub status: OfferStatus,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tracking_device_request::Entity",
        from = "Column::RequestId",
        to = "super::tracking_device_request::Column::Id",
        on_delete = "Cascade"
    )]
    Request,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ProviderId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Provider,
}

impl Related<super::tracking_device_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Request.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
