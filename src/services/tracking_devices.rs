use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{
    rental_offer::OfferStatus,
    tracking_device_offer,
    tracking_device_request,
    user::UserRole,
    vehicle_rental_request::RequestStatus,
};
use crate::error::{AppError, AppResult};
use crate::repositories;
use crate::services::vehicles::{ensure_vehicle_writer, load_vehicle};
use crate::services::{non_negative, optional, required};
use crate::utils::jwt::Claims;
use crate::utils::transitions::ensure_transition;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceRequest {
    pub vehicle_id: Uuid,
    pub device_type: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDeviceOfferRequest {
    pub device_price: Decimal,
    pub installation_fee: Decimal,
    pub description: Option<String>,
}

fn is_provider(role: UserRole) -> bool {
    matches!(role, UserRole::ServiceProvider | UserRole::Mechanic | UserRole::Shop)
}

pub async fn create_request(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: CreateDeviceRequest,
) -> AppResult<tracking_device_request::Model> {
    let vehicle = load_vehicle(db, claims, payload.vehicle_id).await?;
    ensure_vehicle_writer(db, claims, &vehicle).await?;

    let request = tracking_device_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        requester_id: Set(claims.sub),
        vehicle_id: Set(vehicle.id),
        device_type: Set(required(&payload.device_type, "Device type")?),
        notes: Set(optional(payload.notes)),
        status: Set(RequestStatus::Open),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(request_id = %request.id, vehicle_id = %vehicle.id, "Tracking device requested");
    Ok(request)
}

/// Providers browse open requests; everyone else sees their own
pub async fn list_requests(
    db: &DatabaseConnection,
    claims: &Claims,
) -> AppResult<Vec<tracking_device_request::Model>> {
    let mut visible = Condition::any().add(tracking_device_request::Column::RequesterId.eq(claims.sub));
    if is_provider(claims.role) {
        visible = visible.add(tracking_device_request::Column::Status.eq(RequestStatus::Open));
    }

    let mut query = tracking_device_request::Entity::find()
        .order_by_desc(tracking_device_request::Column::CreatedAt);
    if !claims.is_admin() {
        query = query.filter(visible);
    }

    Ok(query.all(db).await?)
}

pub async fn submit_offer(
    db: &DatabaseConnection,
    claims: &Claims,
    request_id: Uuid,
    payload: SubmitDeviceOfferRequest,
) -> AppResult<tracking_device_offer::Model> {
    if !is_provider(claims.role) {
        return Err(AppError::Forbidden("Only service providers can submit offers".to_string()));
    }
    let request =
        repositories::require::<tracking_device_request::Entity, _>(db, request_id, "Tracking device request").await?;
    if request.status != RequestStatus::Open {
        return Err(AppError::Conflict("Tracking device request is closed".to_string()));
    }

    let offer = tracking_device_offer::ActiveModel {
        id: Set(Uuid::new_v4()),
        request_id: Set(request.id),
        provider_id: Set(claims.sub),
        device_price: Set(non_negative(payload.device_price, "Device price")?),
        installation_fee: Set(non_negative(payload.installation_fee, "Installation fee")?),
        description: Set(optional(payload.description)),
        status: Set(OfferStatus::Pending),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(offer)
}

pub async fn list_offers(
    db: &DatabaseConnection,
    claims: &Claims,
    request_id: Uuid,
) -> AppResult<Vec<tracking_device_offer::Model>> {
    let request =
        repositories::require::<tracking_device_request::Entity, _>(db, request_id, "Tracking device request").await?;

    let mut query = tracking_device_offer::Entity::find()
        .filter(tracking_device_offer::Column::RequestId.eq(request.id))
        .order_by_asc(tracking_device_offer::Column::DevicePrice);
    if request.requester_id != claims.sub && !claims.is_admin() {
        query = query.filter(tracking_device_offer::Column::ProviderId.eq(claims.sub));
    }

    Ok(query.all(db).await?)
}

pub async fn accept_offer(
    db: &DatabaseConnection,
    claims: &Claims,
    offer_id: Uuid,
) -> AppResult<tracking_device_offer::Model> {
    let txn = db.begin().await?;

    let offer =
        repositories::require::<tracking_device_offer::Entity, _>(&txn, offer_id, "Offer").await?;
    let request = tracking_device_request::Entity::find_by_id(offer.request_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Tracking device request not found".to_string()))?;

    if request.requester_id != claims.sub && !claims.is_admin() {
        return Err(AppError::Forbidden("Only the requester can accept offers".to_string()));
    }
    ensure_transition("Tracking device request", request.status, RequestStatus::Closed)?;
    ensure_transition("Offer", offer.status, OfferStatus::Accepted)?;

    tracking_device_offer::Entity::update_many()
        .col_expr(tracking_device_offer::Column::Status, Expr::value(OfferStatus::Rejected))
        .filter(tracking_device_offer::Column::RequestId.eq(request.id))
        .filter(tracking_device_offer::Column::Id.ne(offer.id))
        .filter(tracking_device_offer::Column::Status.eq(OfferStatus::Pending))
        .exec(&txn)
        .await?;

    let mut closed: tracking_device_request::ActiveModel = request.into();
    closed.status = Set(RequestStatus::Closed);
    closed.update(&txn).await?;

    let mut accepted: tracking_device_offer::ActiveModel = offer.into();
    accepted.status = Set(OfferStatus::Accepted);
    let offer = accepted.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(offer_id = %offer.id, provider_id = %offer.provider_id, "Tracking device offer accepted");
    Ok(offer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_roles() {
        assert!(is_provider(UserRole::ServiceProvider));
        assert!(is_provider(UserRole::Mechanic));
        assert!(!is_provider(UserRole::Owner));
    }
}
