use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::message;
use crate::error::AppResult;

pub async fn inbox<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<Vec<message::Model>> {
    Ok(message::Entity::find()
        .filter(message::Column::ReceiverId.eq(user_id))
        .filter(message::Column::DeletedByReceiver.eq(false))
        .order_by_desc(message::Column::SentAt)
        .all(db)
        .await?)
}

pub async fn outbox<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<Vec<message::Model>> {
    Ok(message::Entity::find()
        .filter(message::Column::SenderId.eq(user_id))
        .filter(message::Column::DeletedBySender.eq(false))
        .order_by_desc(message::Column::SentAt)
        .all(db)
        .await?)
}

pub async fn unread_count<C: ConnectionTrait>(db: &C, user_id: Uuid) -> AppResult<u64> {
    Ok(message::Entity::find()
        .filter(message::Column::ReceiverId.eq(user_id))
        .filter(message::Column::DeletedByReceiver.eq(false))
        .filter(message::Column::IsRead.eq(false))
        .count(db)
        .await?)
}

/// Set one side's deleted flag in place
pub async fn mark_deleted<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    column: message::Column,
) -> AppResult<u64> {
    let result = message::Entity::update_many()
        .col_expr(column, Expr::value(true))
        .filter(message::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

pub async fn purge_if_deleted_by_both<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<u64> {
    let result = message::Entity::delete_many()
        .filter(message::Column::Id.eq(id))
        .filter(message::Column::DeletedBySender.eq(true))
        .filter(message::Column::DeletedByReceiver.eq(true))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
