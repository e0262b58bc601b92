use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

use crate::entities::taxi_rank_association;
use crate::error::AppResult;

pub async fn find_pair<C: ConnectionTrait>(
    db: &C,
    taxi_rank_id: Uuid,
    tenant_id: Uuid,
) -> AppResult<Option<taxi_rank_association::Model>> {
    Ok(taxi_rank_association::Entity::find()
        .filter(taxi_rank_association::Column::TaxiRankId.eq(taxi_rank_id))
        .filter(taxi_rank_association::Column::TenantId.eq(tenant_id))
        .one(db)
        .await?)
}

/// Any association of the rank, used to tell whether a new one is the first
pub async fn find_any_for_rank<C: ConnectionTrait>(
    db: &C,
    taxi_rank_id: Uuid,
) -> AppResult<Option<taxi_rank_association::Model>> {
    Ok(taxi_rank_association::Entity::find()
        .filter(taxi_rank_association::Column::TaxiRankId.eq(taxi_rank_id))
        .one(db)
        .await?)
}

pub async fn list_for_rank<C: ConnectionTrait>(
    db: &C,
    taxi_rank_id: Uuid,
) -> AppResult<Vec<taxi_rank_association::Model>> {
    Ok(taxi_rank_association::Entity::find()
        .filter(taxi_rank_association::Column::TaxiRankId.eq(taxi_rank_id))
        .order_by_desc(taxi_rank_association::Column::IsPrimary)
        .order_by_asc(taxi_rank_association::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn list_for_tenant<C: ConnectionTrait>(
    db: &C,
    tenant_id: Uuid,
) -> AppResult<Vec<taxi_rank_association::Model>> {
    Ok(taxi_rank_association::Entity::find()
        .filter(taxi_rank_association::Column::TenantId.eq(tenant_id))
        .all(db)
        .await?)
}

/// `INSERT .. ON CONFLICT (taxi_rank_id, tenant_id) DO NOTHING`.
/// Returns the number of rows written, 0 when the pair already existed.
pub async fn insert_if_absent<C: ConnectionTrait>(
    db: &C,
    association: taxi_rank_association::ActiveModel,
) -> AppResult<u64> {
    let rows = taxi_rank_association::Entity::insert(association)
        .on_conflict(
            OnConflict::columns([
                taxi_rank_association::Column::TaxiRankId,
                taxi_rank_association::Column::TenantId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    Ok(rows)
}

/// Drop the primary flag from every other association of the rank
pub async fn clear_other_primaries<C: ConnectionTrait>(
    db: &C,
    taxi_rank_id: Uuid,
    keep_tenant_id: Uuid,
) -> AppResult<u64> {
    let result = taxi_rank_association::Entity::update_many()
        .col_expr(taxi_rank_association::Column::IsPrimary, Expr::value(false))
        .filter(taxi_rank_association::Column::TaxiRankId.eq(taxi_rank_id))
        .filter(taxi_rank_association::Column::TenantId.ne(keep_tenant_id))
        .filter(taxi_rank_association::Column::IsPrimary.eq(true))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

pub async fn delete_pair<C: ConnectionTrait>(
    db: &C,
    taxi_rank_id: Uuid,
    tenant_id: Uuid,
) -> AppResult<u64> {
    let result = taxi_rank_association::Entity::delete_many()
        .filter(taxi_rank_association::Column::TaxiRankId.eq(taxi_rank_id))
        .filter(taxi_rank_association::Column::TenantId.eq(tenant_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}
