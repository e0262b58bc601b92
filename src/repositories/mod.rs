//! Data access shared by every command/query handler.
//!
//! The generic functions cover the get/list/delete shape all UUID keyed
//! entities have in common; the submodules hold the queries that are specific
//! to one table.

pub mod message;
pub mod taxi_rank_association;
pub mod trip;

use sea_orm::{ConnectionTrait, EntityTrait, PrimaryKeyTrait};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub async fn find_by_id<E, C>(db: &C, id: Uuid) -> AppResult<Option<E::Model>>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    Ok(E::find_by_id(id).one(db).await?)
}

/// Like [`find_by_id`] but a missing row is a 404 naming `what`
pub async fn require<E, C>(db: &C, id: Uuid, what: &str) -> AppResult<E::Model>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    find_by_id::<E, C>(db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", what)))
}

pub async fn list_all<E, C>(db: &C) -> AppResult<Vec<E::Model>>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    Ok(E::find().all(db).await?)
}

/// Delete by primary key; a missing row is a 404 naming `what`
pub async fn delete_by_id<E, C>(db: &C, id: Uuid, what: &str) -> AppResult<()>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    let result = E::delete_by_id(id).exec(db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("{} not found", what)));
    }

    Ok(())
}
