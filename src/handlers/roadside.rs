use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::entities::roadside_assistance_request;
use crate::error::AppResult;
use crate::services::roadside::{
    self, AssignProviderRequest, CreateAssistanceRequest, UpdateAssistanceStatusRequest,
};
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn create_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateAssistanceRequest>,
) -> AppResult<Json<roadside_assistance_request::Model>> {
    Ok(Json(roadside::create_request(&state.db, &claims, payload).await?))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<roadside_assistance_request::Model>>> {
    Ok(Json(roadside::list_mine(&state.db, &claims).await?))
}

pub async fn list_open(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<roadside_assistance_request::Model>>> {
    Ok(Json(roadside::list_open(&state.db, &claims).await?))
}

pub async fn assign_provider(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignProviderRequest>,
) -> AppResult<Json<roadside_assistance_request::Model>> {
    Ok(Json(roadside::assign_provider(&state.db, &claims, id, payload).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssistanceStatusRequest>,
) -> AppResult<Json<roadside_assistance_request::Model>> {
    Ok(Json(roadside::update_status(&state.db, &claims, id, payload).await?))
}
