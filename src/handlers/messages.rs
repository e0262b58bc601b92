use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::message;
use crate::error::AppResult;
use crate::handlers::deleted;
use crate::services::messages::{self, SendMessageRequest, UnreadCount};
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn send(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendMessageRequest>,
) -> AppResult<Json<message::Model>> {
    Ok(Json(messages::send_message(&state.db, &claims, payload).await?))
}

pub async fn inbox(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<message::Model>>> {
    Ok(Json(messages::inbox(&state.db, &claims).await?))
}

pub async fn outbox(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<message::Model>>> {
    Ok(Json(messages::outbox(&state.db, &claims).await?))
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<UnreadCount>> {
    Ok(Json(messages::unread_count(&state.db, &claims).await?))
}

pub async fn get_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<message::Model>> {
    Ok(Json(messages::get_message(&state.db, &claims, id).await?))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<message::Model>> {
    Ok(Json(messages::mark_read(&state.db, &claims, id).await?))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    messages::delete_message(&state.db, &claims, id).await?;
    Ok(deleted("Message"))
}
