use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::{taxi_rank, taxi_rank_association, vehicle, vehicle_taxi_rank};
use crate::error::AppResult;
use crate::handlers::deleted;
use crate::services::taxi_ranks::{
    self, AssignVehicleRequest, AssociateRequest, CreateTaxiRankRequest, NearbyQuery,
    NearbyTaxiRank, TaxiRankFilter, UpdateTaxiRankRequest,
};
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn create_taxi_rank(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTaxiRankRequest>,
) -> AppResult<Json<taxi_rank::Model>> {
    Ok(Json(taxi_ranks::create_taxi_rank(&state.db, &claims, payload).await?))
}

pub async fn list_taxi_ranks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<TaxiRankFilter>,
) -> AppResult<Json<Vec<taxi_rank::Model>>> {
    Ok(Json(taxi_ranks::list_taxi_ranks(&state.db, &claims, filter).await?))
}

/// `?latitude=&longitude=&radiusKm=`
pub async fn nearby(
    State(state): State<AppState>,
    Query(query): Query<NearbyQuery>,
) -> AppResult<Json<Vec<NearbyTaxiRank>>> {
    Ok(Json(taxi_ranks::find_nearby(&state.db, query).await?))
}

pub async fn get_taxi_rank(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<taxi_rank::Model>> {
    Ok(Json(taxi_ranks::get_taxi_rank(&state.db, id).await?))
}

pub async fn update_taxi_rank(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTaxiRankRequest>,
) -> AppResult<Json<taxi_rank::Model>> {
    Ok(Json(taxi_ranks::update_taxi_rank(&state.db, &claims, id, payload).await?))
}

pub async fn delete_taxi_rank(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    taxi_ranks::delete_taxi_rank(&state.db, &claims, id).await?;
    Ok(deleted("Taxi rank"))
}

// ============ Tenant associations ============

pub async fn list_associations(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<taxi_rank_association::Model>>> {
    Ok(Json(taxi_ranks::list_associations(&state.db, id).await?))
}

pub async fn associate_tenant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssociateRequest>,
) -> AppResult<Json<taxi_rank_association::Model>> {
    Ok(Json(taxi_ranks::associate_tenant(&state.db, &claims, id, payload).await?))
}

pub async fn set_primary_tenant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, tenant_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<taxi_rank_association::Model>> {
    Ok(Json(taxi_ranks::set_primary_tenant(&state.db, &claims, id, tenant_id).await?))
}

pub async fn dissociate_tenant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, tenant_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Value>> {
    taxi_ranks::dissociate_tenant(&state.db, &claims, id, tenant_id).await?;
    Ok(deleted("Association"))
}

pub async fn list_tenant_ranks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(tenant_id): Path<Uuid>,
) -> AppResult<Json<Vec<taxi_rank_association::Model>>> {
    Ok(Json(taxi_ranks::list_tenant_associations(&state.db, &claims, tenant_id).await?))
}

// ============ Vehicles at the rank ============

pub async fn list_vehicles(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<vehicle::Model>>> {
    Ok(Json(taxi_ranks::list_rank_vehicles(&state.db, id).await?))
}

pub async fn assign_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignVehicleRequest>,
) -> AppResult<Json<vehicle_taxi_rank::Model>> {
    Ok(Json(taxi_ranks::assign_vehicle(&state.db, &claims, id, payload).await?))
}

pub async fn unassign_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, vehicle_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Value>> {
    taxi_ranks::unassign_vehicle(&state.db, &claims, id, vehicle_id).await?;
    Ok(deleted("Vehicle assignment"))
}
