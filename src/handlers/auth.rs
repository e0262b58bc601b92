use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::auth::{self, AuthResponse, LoginRequest, RegisterRequest};
use crate::AppState;

/// Register a new account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(auth::register(&state.db, &state.config, payload).await?))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    Ok(Json(auth::login(&state.db, &state.config, payload).await?))
}
