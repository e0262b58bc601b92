use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::{vehicle, vehicle_document, vehicle_earning, vehicle_expense};
use crate::error::AppResult;
use crate::handlers::deleted;
use crate::services::vehicles::{
    self, CreateDocumentRequest, CreateEarningRequest, CreateExpenseRequest, CreateVehicleRequest,
    FinancialSummary, PeriodQuery, UpdateVehicleRequest, VehicleFilter,
};
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn create_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateVehicleRequest>,
) -> AppResult<Json<vehicle::Model>> {
    Ok(Json(vehicles::create_vehicle(&state.db, &claims, payload).await?))
}

/// `?tenantId=` / `?ownerProfileId=`
pub async fn list_vehicles(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<VehicleFilter>,
) -> AppResult<Json<Vec<vehicle::Model>>> {
    Ok(Json(vehicles::list_vehicles(&state.db, &claims, filter).await?))
}

pub async fn get_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<vehicle::Model>> {
    Ok(Json(vehicles::load_vehicle(&state.db, &claims, id).await?))
}

pub async fn update_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> AppResult<Json<vehicle::Model>> {
    Ok(Json(vehicles::update_vehicle(&state.db, &claims, id, payload).await?))
}

pub async fn delete_vehicle(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    vehicles::delete_vehicle(&state.db, &claims, id).await?;
    Ok(deleted("Vehicle"))
}

// ============ Documents ============

pub async fn add_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateDocumentRequest>,
) -> AppResult<Json<vehicle_document::Model>> {
    Ok(Json(vehicles::add_document(&state.db, &claims, id, payload).await?))
}

pub async fn list_documents(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<vehicle_document::Model>>> {
    Ok(Json(vehicles::list_documents(&state.db, &claims, id).await?))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((id, document_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<Value>> {
    vehicles::delete_document(&state.db, &claims, id, document_id).await?;
    Ok(deleted("Document"))
}

// ============ Finances ============

pub async fn add_earning(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateEarningRequest>,
) -> AppResult<Json<vehicle_earning::Model>> {
    Ok(Json(vehicles::add_earning(&state.db, &claims, id, payload).await?))
}

pub async fn list_earnings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<Vec<vehicle_earning::Model>>> {
    Ok(Json(vehicles::list_earnings(&state.db, &claims, id, &period).await?))
}

pub async fn add_expense(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateExpenseRequest>,
) -> AppResult<Json<vehicle_expense::Model>> {
    Ok(Json(vehicles::add_expense(&state.db, &claims, id, payload).await?))
}

pub async fn list_expenses(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<Vec<vehicle_expense::Model>>> {
    Ok(Json(vehicles::list_expenses(&state.db, &claims, id, &period).await?))
}

pub async fn financial_summary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Query(period): Query<PeriodQuery>,
) -> AppResult<Json<FinancialSummary>> {
    Ok(Json(vehicles::financial_summary(&state.db, &claims, id, &period).await?))
}
