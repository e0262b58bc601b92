use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::entities::{
    driver_profile, marshal_profile, owner_profile, service_provider_profile, staff_profile,
};
use crate::error::AppResult;
use crate::services::profiles::{
    self, DriverProfileRequest, MarshalProfileRequest, OwnerProfileRequest, Profile,
    ServiceProviderProfileRequest, StaffProfileRequest,
};
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Profile>> {
    Ok(Json(profiles::get_profile(&state.db, &claims, user_id).await?))
}

pub async fn upsert_owner(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<OwnerProfileRequest>,
) -> AppResult<Json<owner_profile::Model>> {
    Ok(Json(profiles::upsert_owner_profile(&state.db, &claims, user_id, payload).await?))
}

pub async fn upsert_driver(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<DriverProfileRequest>,
) -> AppResult<Json<driver_profile::Model>> {
    Ok(Json(profiles::upsert_driver_profile(&state.db, &claims, user_id, payload).await?))
}

pub async fn upsert_staff(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<StaffProfileRequest>,
) -> AppResult<Json<staff_profile::Model>> {
    Ok(Json(profiles::upsert_staff_profile(&state.db, &claims, user_id, payload).await?))
}

pub async fn upsert_marshal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<MarshalProfileRequest>,
) -> AppResult<Json<marshal_profile::Model>> {
    Ok(Json(profiles::upsert_marshal_profile(&state.db, &claims, user_id, payload).await?))
}

pub async fn upsert_service_provider(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ServiceProviderProfileRequest>,
) -> AppResult<Json<service_provider_profile::Model>> {
    Ok(Json(
        profiles::upsert_service_provider_profile(&state.db, &claims, user_id, payload).await?,
    ))
}
