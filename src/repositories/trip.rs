use chrono::{DateTime, FixedOffset};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::entities::{taxi_rank_trip, trip_passenger};
use crate::error::AppResult;

pub async fn passengers_for_trip<C: ConnectionTrait>(
    db: &C,
    trip_id: Uuid,
) -> AppResult<Vec<trip_passenger::Model>> {
    Ok(trip_passenger::Entity::find()
        .filter(trip_passenger::Column::TripId.eq(trip_id))
        .order_by_asc(trip_passenger::Column::BoardedAt)
        .all(db)
        .await?)
}

/// Trips of a rank departing in `[from, to)`
pub async fn trips_for_rank_between<C: ConnectionTrait>(
    db: &C,
    taxi_rank_id: Uuid,
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
) -> AppResult<Vec<taxi_rank_trip::Model>> {
    Ok(taxi_rank_trip::Entity::find()
        .filter(taxi_rank_trip::Column::TaxiRankId.eq(taxi_rank_id))
        .filter(taxi_rank_trip::Column::DepartureAt.gte(from))
        .filter(taxi_rank_trip::Column::DepartureAt.lt(to))
        .order_by_asc(taxi_rank_trip::Column::DepartureAt)
        .all(db)
        .await?)
}

pub async fn trips_for_rank<C: ConnectionTrait>(
    db: &C,
    taxi_rank_id: Uuid,
) -> AppResult<Vec<taxi_rank_trip::Model>> {
    Ok(taxi_rank_trip::Entity::find()
        .filter(taxi_rank_trip::Column::TaxiRankId.eq(taxi_rank_id))
        .order_by_desc(taxi_rank_trip::Column::DepartureAt)
        .all(db)
        .await?)
}
