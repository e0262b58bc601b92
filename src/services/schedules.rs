use chrono::NaiveTime;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::trip_schedule;
use crate::error::{AppError, AppResult};
use crate::repositories;
use crate::services::routes::get_route;
use crate::services::vehicles::load_vehicle;
use crate::services::ensure_manager;
use crate::utils::jwt::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleRequest {
    pub route_id: Uuid,
    pub vehicle_id: Option<Uuid>,
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: i32,
    pub departure_time: NaiveTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleRequest {
    pub vehicle_id: Option<Uuid>,
    pub day_of_week: Option<i32>,
    pub departure_time: Option<NaiveTime>,
    pub is_active: Option<bool>,
}

fn check_day(day_of_week: i32) -> AppResult<i32> {
    if !(0..=6).contains(&day_of_week) {
        return Err(AppError::BadRequest(
            "Day of week must be between 0 (Monday) and 6 (Sunday)".to_string(),
        ));
    }
    Ok(day_of_week)
}

pub async fn create_schedule(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: CreateScheduleRequest,
) -> AppResult<trip_schedule::Model> {
    let route = get_route(db, payload.route_id).await?;
    ensure_manager(claims, route.tenant_id)?;
    let day_of_week = check_day(payload.day_of_week)?;

    if let Some(vehicle_id) = payload.vehicle_id {
        load_vehicle(db, claims, vehicle_id).await?;
    }

    let schedule = trip_schedule::ActiveModel {
        id: Set(Uuid::new_v4()),
        route_id: Set(route.id),
        vehicle_id: Set(payload.vehicle_id),
        day_of_week: Set(day_of_week),
        departure_time: Set(payload.departure_time),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(schedule)
}

pub async fn list_for_route(db: &DatabaseConnection, route_id: Uuid) -> AppResult<Vec<trip_schedule::Model>> {
    get_route(db, route_id).await?;
    Ok(trip_schedule::Entity::find()
        .filter(trip_schedule::Column::RouteId.eq(route_id))
        .order_by_asc(trip_schedule::Column::DayOfWeek)
        .order_by_asc(trip_schedule::Column::DepartureTime)
        .all(db)
        .await?)
}

async fn load_managed(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<trip_schedule::Model> {
    let schedule = repositories::require::<trip_schedule::Entity, _>(db, id, "Schedule").await?;
    let route = get_route(db, schedule.route_id).await?;
    ensure_manager(claims, route.tenant_id)?;
    Ok(schedule)
}

pub async fn update_schedule(
    db: &DatabaseConnection,
    claims: &Claims,
    id: Uuid,
    payload: UpdateScheduleRequest,
) -> AppResult<trip_schedule::Model> {
    let schedule = load_managed(db, claims, id).await?;

    if let Some(vehicle_id) = payload.vehicle_id {
        load_vehicle(db, claims, vehicle_id).await?;
    }

    let mut active: trip_schedule::ActiveModel = schedule.into();
    if payload.vehicle_id.is_some() {
        active.vehicle_id = Set(payload.vehicle_id);
    }
    if let Some(day) = payload.day_of_week {
        active.day_of_week = Set(check_day(day)?);
    }
    if let Some(time) = payload.departure_time {
        active.departure_time = Set(time);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    Ok(active.update(db).await?)
}

pub async fn delete_schedule(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<()> {
    load_managed(db, claims, id).await?;
    repositories::delete_by_id::<trip_schedule::Entity, _>(db, id, "Schedule").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_of_week_range() {
        assert_eq!(check_day(0).unwrap(), 0);
        assert_eq!(check_day(6).unwrap(), 6);
        assert!(check_day(7).is_err());
        assert!(check_day(-1).is_err());
    }
}
