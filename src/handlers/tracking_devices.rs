use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::entities::{tracking_device_offer, tracking_device_request};
use crate::error::AppResult;
use crate::services::tracking_devices::{self, CreateDeviceRequest, SubmitDeviceOfferRequest};
use crate::utils::jwt::Claims;
use crate::AppState;

pub async fn create_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateDeviceRequest>,
) -> AppResult<Json<tracking_device_request::Model>> {
    Ok(Json(tracking_devices::create_request(&state.db, &claims, payload).await?))
}

pub async fn list_requests(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<tracking_device_request::Model>>> {
    Ok(Json(tracking_devices::list_requests(&state.db, &claims).await?))
}

pub async fn submit_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitDeviceOfferRequest>,
) -> AppResult<Json<tracking_device_offer::Model>> {
    Ok(Json(tracking_devices::submit_offer(&state.db, &claims, id, payload).await?))
}

pub async fn list_offers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<tracking_device_offer::Model>>> {
    Ok(Json(tracking_devices::list_offers(&state.db, &claims, id).await?))
}

pub async fn accept_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(offer_id): Path<Uuid>,
) -> AppResult<Json<tracking_device_offer::Model>> {
    Ok(Json(tracking_devices::accept_offer(&state.db, &claims, offer_id).await?))
}
