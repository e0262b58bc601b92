use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::{taxi_rank_trip, trip_passenger};
use crate::error::AppResult;
use crate::handlers::deleted;
use crate::services::trips::{
    self, AddPassengerRequest, CreateTripRequest, TripListQuery, TripSummary,
    UpdateTripStatusRequest,
};
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn create_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTripRequest>,
) -> AppResult<Json<taxi_rank_trip::Model>> {
    Ok(Json(trips::create_trip(&state.db, &claims, payload).await?))
}

/// `GET /taxi-ranks/{id}/trips?date=2024-06-11`
pub async fn list_for_rank(
    State(state): State<AppState>,
    Path(rank_id): Path<Uuid>,
    Query(query): Query<TripListQuery>,
) -> AppResult<Json<Vec<taxi_rank_trip::Model>>> {
    Ok(Json(trips::list_trips(&state.db, rank_id, query).await?))
}

pub async fn get_trip(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<taxi_rank_trip::Model>> {
    Ok(Json(trips::get_trip(&state.db, id).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTripStatusRequest>,
) -> AppResult<Json<taxi_rank_trip::Model>> {
    Ok(Json(trips::update_status(&state.db, &claims, id, payload).await?))
}

pub async fn delete_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    trips::delete_trip(&state.db, &claims, id).await?;
    Ok(deleted("Trip"))
}

pub async fn add_passenger(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddPassengerRequest>,
) -> AppResult<Json<trip_passenger::Model>> {
    Ok(Json(trips::add_passenger(&state.db, &claims, id, payload).await?))
}

pub async fn list_passengers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<trip_passenger::Model>>> {
    Ok(Json(trips::list_passengers(&state.db, id).await?))
}

pub async fn remove_passenger(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, passenger_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Value>> {
    trips::remove_passenger(&state.db, &claims, id, passenger_id).await?;
    Ok(deleted("Passenger"))
}

pub async fn summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TripSummary>> {
    Ok(Json(trips::trip_summary(&state.db, id).await?))
}
