use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::user;
use crate::error::AppResult;
use crate::handlers::deleted;
use crate::services::profiles::{self, Profile};
use crate::services::users::{self, CreateUserRequest, UpdateUserRequest, UserFilter};
use crate::utils::jwt::Claims;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: user::Model,
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// Current user with their role profile
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<MeResponse>> {
    let user = users::get_user(&state.db, &claims, claims.sub).await?;
    let profile = profiles::get_profile(&state.db, &claims, claims.sub).await?;
    Ok(Json(MeResponse { user, profile }))
}

pub async fn create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<Json<user::Model>> {
    Ok(Json(users::create_user(&state.db, &claims, payload).await?))
}

pub async fn list_users(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(filter): Query<UserFilter>,
) -> AppResult<Json<Vec<user::Model>>> {
    Ok(Json(users::list_users(&state.db, &claims, filter).await?))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<user::Model>> {
    Ok(Json(users::get_user(&state.db, &claims, id).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<user::Model>> {
    Ok(Json(users::update_user(&state.db, &claims, id, payload).await?))
}

pub async fn set_active(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> AppResult<Json<user::Model>> {
    Ok(Json(users::set_active(&state.db, &claims, id, payload.is_active).await?))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    users::delete_user(&state.db, &claims, id).await?;
    Ok(deleted("User"))
}
