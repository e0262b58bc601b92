use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::trip_schedule;
use crate::error::AppResult;
use crate::handlers::deleted;
use crate::services::schedules::{self, CreateScheduleRequest, UpdateScheduleRequest};
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn create_schedule(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateScheduleRequest>,
) -> AppResult<Json<trip_schedule::Model>> {
    Ok(Json(schedules::create_schedule(&state.db, &claims, payload).await?))
}

pub async fn list_for_route(
    State(state): State<AppState>,
    Path(route_id): Path<Uuid>,
) -> AppResult<Json<Vec<trip_schedule::Model>>> {
    Ok(Json(schedules::list_for_route(&state.db, route_id).await?))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateScheduleRequest>,
) -> AppResult<Json<trip_schedule::Model>> {
    Ok(Json(schedules::update_schedule(&state.db, &claims, id, payload).await?))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    schedules::delete_schedule(&state.db, &claims, id).await?;
    Ok(deleted("Schedule"))
}
