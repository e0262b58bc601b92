use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::{route, vehicle_route_assignment};
use crate::error::AppResult;
use crate::handlers::deleted;
use crate::services::routes::{self, CreateRouteRequest, RouteVehicleRequest, UpdateRouteRequest};
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn create_route(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRouteRequest>,
) -> AppResult<Json<route::Model>> {
    Ok(Json(routes::create_route(&state.db, &claims, payload).await?))
}

pub async fn list_for_rank(
    State(state): State<AppState>,
    Path(rank_id): Path<Uuid>,
) -> AppResult<Json<Vec<route::Model>>> {
    Ok(Json(routes::list_routes_for_rank(&state.db, rank_id).await?))
}

pub async fn get_route(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<route::Model>> {
    Ok(Json(routes::get_route(&state.db, id).await?))
}

pub async fn update_route(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRouteRequest>,
) -> AppResult<Json<route::Model>> {
    Ok(Json(routes::update_route(&state.db, &claims, id, payload).await?))
}

pub async fn delete_route(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    routes::delete_route(&state.db, &claims, id).await?;
    Ok(deleted("Route"))
}

pub async fn list_assignments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<vehicle_route_assignment::Model>>> {
    Ok(Json(routes::list_assignments(&state.db, id).await?))
}

pub async fn assign_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RouteVehicleRequest>,
) -> AppResult<Json<vehicle_route_assignment::Model>> {
    Ok(Json(routes::assign_vehicle(&state.db, &claims, id, payload).await?))
}

pub async fn unassign_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, vehicle_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Value>> {
    routes::unassign_vehicle(&state.db, &claims, id, vehicle_id).await?;
    Ok(Json(serde_json::json!({ "message": "Vehicle released from route" })))
}
