use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::entities::{tender, tender_application};
use crate::error::AppResult;
use crate::services::tenders::{
    self, ApplyRequest, CreateTenderRequest, DecideApplicationRequest, TenderFilter,
    UpdateTenderStatusRequest,
};
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn create_tender(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateTenderRequest>,
) -> AppResult<Json<tender::Model>> {
    Ok(Json(tenders::create_tender(&state.db, &claims, payload).await?))
}

pub async fn list_tenders(
    State(state): State<AppState>,
    Query(filter): Query<TenderFilter>,
) -> AppResult<Json<Vec<tender::Model>>> {
    Ok(Json(tenders::list_tenders(&state.db, filter).await?))
}

pub async fn get_tender(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<tender::Model>> {
    Ok(Json(tenders::get_tender(&state.db, id).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTenderStatusRequest>,
) -> AppResult<Json<tender::Model>> {
    Ok(Json(tenders::update_status(&state.db, &claims, id, payload).await?))
}

pub async fn apply(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApplyRequest>,
) -> AppResult<Json<tender_application::Model>> {
    Ok(Json(tenders::apply(&state.db, &claims, id, payload).await?))
}

pub async fn list_applications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<tender_application::Model>>> {
    Ok(Json(tenders::list_applications(&state.db, &claims, id).await?))
}

/// Body `{ "status": "accepted" | "rejected" }`
pub async fn decide_application(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(application_id): Path<Uuid>,
    Json(payload): Json<DecideApplicationRequest>,
) -> AppResult<Json<tender_application::Model>> {
    Ok(Json(tenders::decide_application(&state.db, &claims, application_id, payload).await?))
}
