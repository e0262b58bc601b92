use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::entities::{rental_offer, vehicle_rental_booking, vehicle_rental_request};
use crate::error::AppResult;
use crate::services::rentals::{self, CreateRentalRequest, SubmitOfferRequest, UpdateBookingStatusRequest};
use crate::utils::jwt::Claims;
use crate::AppState;

// ============ Requests ============

pub async fn create_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateRentalRequest>,
) -> AppResult<Json<vehicle_rental_request::Model>> {
    Ok(Json(rentals::create_request(&state.db, &claims, payload).await?))
}

pub async fn list_open_requests(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<vehicle_rental_request::Model>>> {
    Ok(Json(rentals::list_open_requests(&state.db).await?))
}

pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<vehicle_rental_request::Model>> {
    Ok(Json(rentals::get_request(&state.db, id).await?))
}

pub async fn close_request(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<vehicle_rental_request::Model>> {
    Ok(Json(rentals::close_request(&state.db, &claims, id).await?))
}

// ============ Offers ============

pub async fn submit_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SubmitOfferRequest>,
) -> AppResult<Json<rental_offer::Model>> {
    Ok(Json(rentals::submit_offer(&state.db, &claims, id, payload).await?))
}

pub async fn list_offers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<rental_offer::Model>>> {
    Ok(Json(rentals::list_offers(&state.db, &claims, id).await?))
}

pub async fn accept_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(offer_id): Path<Uuid>,
) -> AppResult<Json<vehicle_rental_booking::Model>> {
    Ok(Json(rentals::accept_offer(&state.db, &claims, offer_id).await?))
}

pub async fn reject_offer(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(offer_id): Path<Uuid>,
) -> AppResult<Json<rental_offer::Model>> {
    Ok(Json(rentals::reject_offer(&state.db, &claims, offer_id).await?))
}

// ============ Bookings ============

pub async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<vehicle_rental_booking::Model>>> {
    Ok(Json(rentals::list_bookings(&state.db, &claims).await?))
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> AppResult<Json<vehicle_rental_booking::Model>> {
    Ok(Json(rentals::update_booking_status(&state.db, &claims, id, payload).await?))
}
