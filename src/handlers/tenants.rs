use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::entities::tenant;
use crate::error::AppResult;
use crate::handlers::deleted;
use crate::services::tenants::{self, CreateTenantRequest, UpdateTenantRequest};
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn create_tenant(
    State(state): State<AppState>,
    Json(payload): Json<CreateTenantRequest>,
) -> AppResult<Json<tenant::Model>> {
    Ok(Json(tenants::create_tenant(&state.db, payload).await?))
}

pub async fn list_tenants(State(state): State<AppState>) -> AppResult<Json<Vec<tenant::Model>>> {
    Ok(Json(tenants::list_tenants(&state.db).await?))
}

/// Members may read their own tenant, admins any
pub async fn get_tenant(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<tenant::Model>> {
    claims.ensure_tenant(id)?;
    Ok(Json(tenants::get_tenant(&state.db, id).await?))
}

pub async fn update_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTenantRequest>,
) -> AppResult<Json<tenant::Model>> {
    Ok(Json(tenants::update_tenant(&state.db, id, payload).await?))
}

pub async fn delete_tenant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Value>> {
    tenants::delete_tenant(&state.db, id).await?;
    Ok(deleted("Tenant"))
}
