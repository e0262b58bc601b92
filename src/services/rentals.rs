//! Vehicle rental marketplace: renters post requests, owners answer with
//! offers, and accepting an offer books the vehicle.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{
    owner_profile,
    rental_offer::{self, OfferStatus},
    vehicle,
    vehicle_rental_booking::{self, BookingStatus},
    vehicle_rental_request::{self, RequestStatus},
};
use crate::error::{AppError, AppResult};
use crate::repositories;
use crate::services::{non_negative, optional, required};
use crate::utils::jwt::Claims;
use crate::utils::transitions::ensure_transition;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRentalRequest {
    pub vehicle_type: String,
    pub pickup_location: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOfferRequest {
    pub vehicle_id: Uuid,
    pub price_per_day: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

/// Inclusive day count of a rental, never less than one
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(1)
}

pub fn rental_total(price_per_day: Decimal, start: NaiveDate, end: NaiveDate) -> Decimal {
    price_per_day * Decimal::from(rental_days(start, end))
}

async fn caller_owner_profile(db: &DatabaseConnection, claims: &Claims) -> AppResult<Option<owner_profile::Model>> {
    Ok(owner_profile::Entity::find()
        .filter(owner_profile::Column::UserId.eq(claims.sub))
        .one(db)
        .await?)
}

fn ensure_renter(claims: &Claims, request: &vehicle_rental_request::Model) -> AppResult<()> {
    if request.renter_id == claims.sub || claims.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Only the renter can do this".to_string()))
    }
}

pub async fn create_request(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: CreateRentalRequest,
) -> AppResult<vehicle_rental_request::Model> {
    if payload.end_date < payload.start_date {
        return Err(AppError::BadRequest("End date cannot be before start date".to_string()));
    }
    let budget = payload.budget.map(|b| non_negative(b, "Budget")).transpose()?;

    let request = vehicle_rental_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        renter_id: Set(claims.sub),
        tenant_id: Set(claims.tenant_id),
        vehicle_type: Set(required(&payload.vehicle_type, "Vehicle type")?),
        pickup_location: Set(required(&payload.pickup_location, "Pickup location")?),
        start_date: Set(payload.start_date),
        end_date: Set(payload.end_date),
        budget: Set(budget),
        notes: Set(optional(payload.notes)),
        status: Set(RequestStatus::Open),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(request_id = %request.id, renter_id = %claims.sub, "Rental request opened");
    Ok(request)
}

pub async fn list_open_requests(db: &DatabaseConnection) -> AppResult<Vec<vehicle_rental_request::Model>> {
    Ok(vehicle_rental_request::Entity::find()
        .filter(vehicle_rental_request::Column::Status.eq(RequestStatus::Open))
        .order_by_asc(vehicle_rental_request::Column::StartDate)
        .all(db)
        .await?)
}

pub async fn get_request(db: &DatabaseConnection, id: Uuid) -> AppResult<vehicle_rental_request::Model> {
    repositories::require::<vehicle_rental_request::Entity, _>(db, id, "Rental request").await
}

pub async fn close_request(
    db: &DatabaseConnection,
    claims: &Claims,
    id: Uuid,
) -> AppResult<vehicle_rental_request::Model> {
    let request = get_request(db, id).await?;
    ensure_renter(claims, &request)?;
    ensure_transition("Rental request", request.status, RequestStatus::Closed)?;

    let mut active: vehicle_rental_request::ActiveModel = request.into();
    active.status = Set(RequestStatus::Closed);
    Ok(active.update(db).await?)
}

/// Owners offer one of their own vehicles against an open request
pub async fn submit_offer(
    db: &DatabaseConnection,
    claims: &Claims,
    request_id: Uuid,
    payload: SubmitOfferRequest,
) -> AppResult<rental_offer::Model> {
    let request = get_request(db, request_id).await?;
    if request.status != RequestStatus::Open {
        return Err(AppError::Conflict("Rental request is closed".to_string()));
    }
    if request.renter_id == claims.sub {
        return Err(AppError::BadRequest("Cannot offer on your own request".to_string()));
    }

    let owner = caller_owner_profile(db, claims)
        .await?
        .ok_or_else(|| AppError::Forbidden("Only vehicle owners can submit offers".to_string()))?;
    let vehicle = repositories::require::<vehicle::Entity, _>(db, payload.vehicle_id, "Vehicle").await?;
    if vehicle.owner_profile_id != owner.id {
        return Err(AppError::Forbidden("Vehicle belongs to another owner".to_string()));
    }

    let offer = rental_offer::ActiveModel {
        id: Set(Uuid::new_v4()),
        request_id: Set(request.id),
        owner_profile_id: Set(owner.id),
        vehicle_id: Set(vehicle.id),
        price_per_day: Set(non_negative(payload.price_per_day, "Price per day")?),
        notes: Set(optional(payload.notes)),
        status: Set(OfferStatus::Pending),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(offer_id = %offer.id, request_id = %request.id, "Rental offer submitted");
    Ok(offer)
}

/// The renter sees every offer; an owner only their own
pub async fn list_offers(
    db: &DatabaseConnection,
    claims: &Claims,
    request_id: Uuid,
) -> AppResult<Vec<rental_offer::Model>> {
    let request = get_request(db, request_id).await?;

    let mut query = rental_offer::Entity::find()
        .filter(rental_offer::Column::RequestId.eq(request.id))
        .order_by_asc(rental_offer::Column::PricePerDay);

    if ensure_renter(claims, &request).is_err() {
        let owner = caller_owner_profile(db, claims)
            .await?
            .ok_or_else(|| AppError::Forbidden("Cannot view offers of this request".to_string()))?;
        query = query.filter(rental_offer::Column::OwnerProfileId.eq(owner.id));
    }

    Ok(query.all(db).await?)
}

/// Accept one offer: it wins, its siblings lose, the request closes and a
/// booking is created, all or nothing.
pub async fn accept_offer(
    db: &DatabaseConnection,
    claims: &Claims,
    offer_id: Uuid,
) -> AppResult<vehicle_rental_booking::Model> {
    let txn = db.begin().await?;

    let offer = repositories::require::<rental_offer::Entity, _>(&txn, offer_id, "Offer").await?;
    let request = vehicle_rental_request::Entity::find_by_id(offer.request_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Rental request not found".to_string()))?;

    ensure_renter(claims, &request)?;
    if request.status != RequestStatus::Open {
        return Err(AppError::Conflict("Rental request is closed".to_string()));
    }
    ensure_transition("Offer", offer.status, OfferStatus::Accepted)?;

    let total_price = rental_total(offer.price_per_day, request.start_date, request.end_date);

    let mut accepted: rental_offer::ActiveModel = offer.clone().into();
    accepted.status = Set(OfferStatus::Accepted);
    accepted.update(&txn).await?;

    rental_offer::Entity::update_many()
        .col_expr(rental_offer::Column::Status, Expr::value(OfferStatus::Rejected))
        .filter(rental_offer::Column::RequestId.eq(request.id))
        .filter(rental_offer::Column::Id.ne(offer.id))
        .filter(rental_offer::Column::Status.eq(OfferStatus::Pending))
        .exec(&txn)
        .await?;

    let mut closed: vehicle_rental_request::ActiveModel = request.clone().into();
    closed.status = Set(RequestStatus::Closed);
    closed.update(&txn).await?;

    let booking = vehicle_rental_booking::ActiveModel {
        id: Set(Uuid::new_v4()),
        request_id: Set(request.id),
        offer_id: Set(offer.id),
        renter_id: Set(request.renter_id),
        vehicle_id: Set(offer.vehicle_id),
        start_date: Set(request.start_date),
        end_date: Set(request.end_date),
        total_price: Set(total_price),
        status: Set(BookingStatus::Active),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(
        booking_id = %booking.id,
        offer_id = %offer.id,
        total_price = %booking.total_price,
        "Rental offer accepted"
    );
    Ok(booking)
}

pub async fn reject_offer(
    db: &DatabaseConnection,
    claims: &Claims,
    offer_id: Uuid,
) -> AppResult<rental_offer::Model> {
    let offer = repositories::require::<rental_offer::Entity, _>(db, offer_id, "Offer").await?;
    let request = get_request(db, offer.request_id).await?;
    ensure_renter(claims, &request)?;
    ensure_transition("Offer", offer.status, OfferStatus::Rejected)?;

    let mut active: rental_offer::ActiveModel = offer.into();
    active.status = Set(OfferStatus::Rejected);
    Ok(active.update(db).await?)
}

/// Bookings where the caller is the renter or owns the vehicle
pub async fn list_bookings(
    db: &DatabaseConnection,
    claims: &Claims,
) -> AppResult<Vec<vehicle_rental_booking::Model>> {
    let mut visible = Condition::any().add(vehicle_rental_booking::Column::RenterId.eq(claims.sub));

    if let Some(owner) = caller_owner_profile(db, claims).await? {
        let vehicle_ids: Vec<Uuid> = vehicle::Entity::find()
            .select_only()
            .column(vehicle::Column::Id)
            .filter(vehicle::Column::OwnerProfileId.eq(owner.id))
            .into_tuple()
            .all(db)
            .await?;
        if !vehicle_ids.is_empty() {
            visible = visible.add(vehicle_rental_booking::Column::VehicleId.is_in(vehicle_ids));
        }
    }

    let mut query = vehicle_rental_booking::Entity::find().order_by_desc(vehicle_rental_booking::Column::StartDate);
    if !claims.is_admin() {
        query = query.filter(visible);
    }

    Ok(query.all(db).await?)
}

pub async fn update_booking_status(
    db: &DatabaseConnection,
    claims: &Claims,
    booking_id: Uuid,
    payload: UpdateBookingStatusRequest,
) -> AppResult<vehicle_rental_booking::Model> {
    let booking =
        repositories::require::<vehicle_rental_booking::Entity, _>(db, booking_id, "Booking").await?;

    if booking.renter_id != claims.sub && !claims.is_admin() {
        let vehicle = repositories::require::<vehicle::Entity, _>(db, booking.vehicle_id, "Vehicle").await?;
        let owns_vehicle = caller_owner_profile(db, claims)
            .await?
            .is_some_and(|owner| owner.id == vehicle.owner_profile_id);
        if !owns_vehicle {
            return Err(AppError::Forbidden("Not a party to this booking".to_string()));
        }
    }

    ensure_transition("Booking", booking.status, payload.status)?;

    let mut active: vehicle_rental_booking::ActiveModel = booking.into();
    active.status = Set(payload.status);
    let booking = active.update(db).await?;

    tracing::info!(booking_id = %booking.id, status = ?booking.status, "Booking status changed");
    Ok(booking)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, d).unwrap()
    }

    #[test]
    fn test_rental_days_inclusive() {
        assert_eq!(rental_days(date(1), date(1)), 1);
        assert_eq!(rental_days(date(1), date(3)), 3);
    }

    #[test]
    fn test_rental_days_never_below_one() {
        assert_eq!(rental_days(date(5), date(2)), 1);
    }

    #[test]
    fn test_rental_total() {
        assert_eq!(rental_total(Decimal::new(45000, 2), date(1), date(4)), Decimal::new(180000, 2));
    }

    #[tokio::test]
    async fn test_accept_offer_creates_booking() {
        let renter_id = Uuid::new_v4();
        let request = vehicle_rental_request::Model {
            id: Uuid::new_v4(),
            renter_id,
            tenant_id: None,
            vehicle_type: "minibus".into(),
            pickup_location: "Bree Rank".into(),
            start_date: date(1),
            end_date: date(3),
            budget: None,
            notes: None,
            status: RequestStatus::Open,
            created_at: Utc::now().into(),
        };
        let offer = rental_offer::Model {
            id: Uuid::new_v4(),
            request_id: request.id,
            owner_profile_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            price_per_day: Decimal::new(50000, 2),
            notes: None,
            status: OfferStatus::Pending,
            created_at: Utc::now().into(),
        };
        let booking = vehicle_rental_booking::Model {
            id: Uuid::new_v4(),
            request_id: request.id,
            offer_id: offer.id,
            renter_id,
            vehicle_id: offer.vehicle_id,
            start_date: date(1),
            end_date: date(3),
            total_price: Decimal::new(150000, 2),
            status: BookingStatus::Active,
            created_at: Utc::now().into(),
        };
        let accepted = rental_offer::Model { status: OfferStatus::Accepted, ..offer.clone() };
        let closed = vehicle_rental_request::Model { status: RequestStatus::Closed, ..request.clone() };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![offer.clone()]])
            .append_query_results([vec![request.clone()]])
            .append_query_results([vec![accepted]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 2 }])
            .append_query_results([vec![closed]])
            .append_query_results([vec![booking.clone()]])
            .into_connection();

        let claims = Claims {
            sub: renter_id,
            email: "renter@example.com".into(),
            role: UserRole::Passenger,
            tenant_id: None,
            exp: 0,
            iat: 0,
        };

        let result = accept_offer(&db, &claims, offer.id).await.unwrap();
        assert_eq!(result.total_price, Decimal::new(150000, 2));
        assert_eq!(result.status, BookingStatus::Active);
    }

    #[tokio::test]
    async fn test_accept_offer_on_closed_request_conflicts() {
        let renter_id = Uuid::new_v4();
        let request = vehicle_rental_request::Model {
            id: Uuid::new_v4(),
            renter_id,
            tenant_id: None,
            vehicle_type: "sedan".into(),
            pickup_location: "Bloed Street".into(),
            start_date: date(1),
            end_date: date(2),
            budget: None,
            notes: None,
            status: RequestStatus::Closed,
            created_at: Utc::now().into(),
        };
        let offer = rental_offer::Model {
            id: Uuid::new_v4(),
            request_id: request.id,
            owner_profile_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            price_per_day: Decimal::new(30000, 2),
            notes: None,
            status: OfferStatus::Pending,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![offer.clone()]])
            .append_query_results([vec![request]])
            .into_connection();

        let claims = Claims {
            sub: renter_id,
            email: "renter@example.com".into(),
            role: UserRole::Passenger,
            tenant_id: None,
            exp: 0,
            iat: 0,
        };

        let result = accept_offer(&db, &claims, offer.id).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
