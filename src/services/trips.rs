//! Realized trips leaving a rank and the passengers a marshal captures on
//! them.
//!
//! Boarding runs in one transaction with the trip row locked, so two
//! marshals cannot sell the same seat. After every add or remove the
//! denormalized `passenger_count` and `total_fare` are recomputed from the
//! passenger rows.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    route,
    taxi_rank_trip::{self, TripStatus},
    trip_passenger,
    trip_schedule,
    user::{self, UserRole},
    vehicle,
};
use crate::error::{AppError, AppResult};
use crate::repositories::{self, taxi_rank_association as associations, trip as trips};
use crate::services::vehicles::load_vehicle;
use crate::services::{non_negative, optional, required};
use crate::utils::jwt::Claims;
use crate::utils::transitions::ensure_transition;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    pub taxi_rank_id: Uuid,
    pub route_id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Option<Uuid>,
    pub schedule_id: Option<Uuid>,
    pub departure_at: DateTime<FixedOffset>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TripListQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTripStatusRequest {
    pub status: TripStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPassengerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub passenger_user_id: Option<Uuid>,
    pub seat_number: Option<i32>,
    /// Falls back to the route's standard fare
    pub fare_amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub passenger_count: usize,
    pub total_fare: Decimal,
    pub average_fare: Decimal,
}

pub fn summarize_trip(passengers: &[trip_passenger::Model]) -> TripSummary {
    let total_fare: Decimal = passengers.iter().map(|p| p.fare_amount).sum();
    let average_fare = if passengers.is_empty() {
        Decimal::ZERO
    } else {
        (total_fare / Decimal::from(passengers.len())).round_dp(2)
    };

    TripSummary {
        passenger_count: passengers.len(),
        total_fare,
        average_fare,
    }
}

/// Whether one more passenger, optionally in `seat`, fits on the trip
pub fn check_boarding(
    status: TripStatus,
    capacity: i32,
    passengers: &[trip_passenger::Model],
    seat: Option<i32>,
) -> AppResult<()> {
    if !status.accepts_passengers() {
        return Err(AppError::Conflict(format!("Trip is {:?}, boarding is closed", status)));
    }
    if passengers.len() >= capacity.max(0) as usize {
        return Err(AppError::Conflict("Trip is full".to_string()));
    }
    if let Some(seat) = seat {
        if !(1..=capacity).contains(&seat) {
            return Err(AppError::BadRequest(format!(
                "Seat number must be between 1 and {}",
                capacity
            )));
        }
        if passengers.iter().any(|p| p.seat_number == Some(seat)) {
            return Err(AppError::Conflict(format!("Seat {} is already taken", seat)));
        }
    }
    Ok(())
}

/// UTC day window `[date 00:00, date+1 00:00)`
pub(crate) fn day_window(date: NaiveDate) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc().fixed_offset();
    (start, start + Duration::days(1))
}

/// Admins, or managers and marshals of a tenant operating at the rank
async fn ensure_rank_operator<C: ConnectionTrait>(
    db: &C,
    claims: &Claims,
    taxi_rank_id: Uuid,
) -> AppResult<()> {
    if claims.is_admin() {
        return Ok(());
    }
    if !claims.role.is_tenant_manager() && claims.role != UserRole::TaxiMarshal {
        return Err(AppError::Forbidden("Marshal or manager role required".to_string()));
    }
    let tenant_id = claims.require_tenant()?;
    if associations::find_pair(db, taxi_rank_id, tenant_id).await?.is_none() {
        return Err(AppError::Forbidden(
            "Your tenant is not associated with this taxi rank".to_string(),
        ));
    }
    Ok(())
}

async fn recompute_totals<C: ConnectionTrait>(db: &C, trip: taxi_rank_trip::Model) -> AppResult<taxi_rank_trip::Model> {
    let passengers = trips::passengers_for_trip(db, trip.id).await?;
    let summary = summarize_trip(&passengers);

    let mut active: taxi_rank_trip::ActiveModel = trip.into();
    active.passenger_count = Set(summary.passenger_count as i32);
    active.total_fare = Set(summary.total_fare);
    Ok(active.update(db).await?)
}

pub async fn create_trip(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: CreateTripRequest,
) -> AppResult<taxi_rank_trip::Model> {
    ensure_rank_operator(db, claims, payload.taxi_rank_id).await?;

    let route = repositories::require::<route::Entity, _>(db, payload.route_id, "Route").await?;
    if route.taxi_rank_id != payload.taxi_rank_id {
        return Err(AppError::BadRequest("Route does not leave from this taxi rank".to_string()));
    }
    let vehicle = load_vehicle(db, claims, payload.vehicle_id).await?;

    if let Some(driver_id) = payload.driver_id {
        let driver = repositories::require::<user::Entity, _>(db, driver_id, "Driver").await?;
        if driver.role != UserRole::Driver {
            return Err(AppError::BadRequest("Assigned user is not a driver".to_string()));
        }
    }
    if let Some(schedule_id) = payload.schedule_id {
        let schedule = repositories::require::<trip_schedule::Entity, _>(db, schedule_id, "Schedule").await?;
        if schedule.route_id != route.id {
            return Err(AppError::BadRequest("Schedule belongs to another route".to_string()));
        }
    }

    let marshal_id = (claims.role == UserRole::TaxiMarshal).then_some(claims.sub);

    let trip = taxi_rank_trip::ActiveModel {
        id: Set(Uuid::new_v4()),
        taxi_rank_id: Set(payload.taxi_rank_id),
        route_id: Set(route.id),
        vehicle_id: Set(vehicle.id),
        driver_id: Set(payload.driver_id),
        marshal_id: Set(marshal_id),
        schedule_id: Set(payload.schedule_id),
        departure_at: Set(payload.departure_at),
        arrived_at: Set(None),
        status: Set(TripStatus::Scheduled),
        passenger_count: Set(0),
        total_fare: Set(Decimal::ZERO),
        notes: Set(optional(payload.notes)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(trip_id = %trip.id, taxi_rank_id = %trip.taxi_rank_id, "Trip created");
    Ok(trip)
}

pub async fn get_trip(db: &DatabaseConnection, id: Uuid) -> AppResult<taxi_rank_trip::Model> {
    repositories::require::<taxi_rank_trip::Entity, _>(db, id, "Trip").await
}

pub async fn list_trips(
    db: &DatabaseConnection,
    taxi_rank_id: Uuid,
    query: TripListQuery,
) -> AppResult<Vec<taxi_rank_trip::Model>> {
    match query.date {
        Some(date) => {
            let (from, to) = day_window(date);
            trips::trips_for_rank_between(db, taxi_rank_id, from, to).await
        }
        None => trips::trips_for_rank(db, taxi_rank_id).await,
    }
}

pub async fn update_status(
    db: &DatabaseConnection,
    claims: &Claims,
    id: Uuid,
    payload: UpdateTripStatusRequest,
) -> AppResult<taxi_rank_trip::Model> {
    let trip = get_trip(db, id).await?;
    ensure_rank_operator(db, claims, trip.taxi_rank_id).await?;
    ensure_transition("Trip", trip.status, payload.status)?;

    let mut active: taxi_rank_trip::ActiveModel = trip.into();
    active.status = Set(payload.status);
    if payload.status == TripStatus::Completed {
        active.arrived_at = Set(Some(Utc::now().fixed_offset()));
    }
    let trip = active.update(db).await?;

    tracing::info!(trip_id = %trip.id, status = ?trip.status, "Trip status changed");
    Ok(trip)
}

pub async fn delete_trip(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<()> {
    let trip = get_trip(db, id).await?;
    ensure_rank_operator(db, claims, trip.taxi_rank_id).await?;
    repositories::delete_by_id::<taxi_rank_trip::Entity, _>(db, id, "Trip").await
}

pub async fn add_passenger(
    db: &DatabaseConnection,
    claims: &Claims,
    trip_id: Uuid,
    payload: AddPassengerRequest,
) -> AppResult<trip_passenger::Model> {
    let name = required(&payload.name, "Passenger name")?;

    let txn = db.begin().await?;

    let trip = taxi_rank_trip::Entity::find_by_id(trip_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;
    ensure_rank_operator(&txn, claims, trip.taxi_rank_id).await?;

    let route = repositories::require::<route::Entity, _>(&txn, trip.route_id, "Route").await?;
    let vehicle = repositories::require::<vehicle::Entity, _>(&txn, trip.vehicle_id, "Vehicle").await?;
    let passengers = trips::passengers_for_trip(&txn, trip.id).await?;

    check_boarding(trip.status, vehicle.seating_capacity, &passengers, payload.seat_number)?;
    let fare = non_negative(payload.fare_amount.unwrap_or(route.standard_fare), "Fare")?;

    let passenger = trip_passenger::ActiveModel {
        id: Set(Uuid::new_v4()),
        trip_id: Set(trip.id),
        passenger_user_id: Set(payload.passenger_user_id),
        name: Set(name),
        phone: Set(optional(payload.phone)),
        seat_number: Set(payload.seat_number),
        fare_amount: Set(fare),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let trip = recompute_totals(&txn, trip).await?;
    txn.commit().await?;

    tracing::debug!(
        trip_id = %trip.id,
        passenger_count = trip.passenger_count,
        total_fare = %trip.total_fare,
        "Passenger boarded"
    );
    Ok(passenger)
}

pub async fn list_passengers(db: &DatabaseConnection, trip_id: Uuid) -> AppResult<Vec<trip_passenger::Model>> {
    get_trip(db, trip_id).await?;
    trips::passengers_for_trip(db, trip_id).await
}

pub async fn remove_passenger(
    db: &DatabaseConnection,
    claims: &Claims,
    trip_id: Uuid,
    passenger_id: Uuid,
) -> AppResult<()> {
    let txn = db.begin().await?;

    let trip = taxi_rank_trip::Entity::find_by_id(trip_id)
        .lock_exclusive()
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Trip not found".to_string()))?;
    ensure_rank_operator(&txn, claims, trip.taxi_rank_id).await?;
    if !trip.status.accepts_passengers() {
        return Err(AppError::Conflict(format!(
            "Trip is {:?}, passengers can no longer be removed",
            trip.status
        )));
    }

    let result = trip_passenger::Entity::delete_many()
        .filter(trip_passenger::Column::Id.eq(passenger_id))
        .filter(trip_passenger::Column::TripId.eq(trip.id))
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Passenger not found on this trip".to_string()));
    }

    recompute_totals(&txn, trip).await?;
    txn.commit().await?;
    Ok(())
}

pub async fn trip_summary(db: &DatabaseConnection, trip_id: Uuid) -> AppResult<TripSummary> {
    let passengers = list_passengers(db, trip_id).await?;
    Ok(summarize_trip(&passengers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn passenger(seat: Option<i32>, fare: i64) -> trip_passenger::Model {
        trip_passenger::Model {
            id: Uuid::new_v4(),
            trip_id: Uuid::nil(),
            passenger_user_id: None,
            name: "Thabo".into(),
            phone: None,
            seat_number: seat,
            fare_amount: Decimal::new(fare, 2),
            boarded_at: Utc::now().into(),
        }
    }

    fn admin() -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            email: "admin@example.com".into(),
            role: UserRole::Admin,
            tenant_id: None,
            exp: 0,
            iat: 0,
        }
    }

    fn trip(status: TripStatus, passenger_count: i32, total_fare: Decimal) -> taxi_rank_trip::Model {
        taxi_rank_trip::Model {
            id: Uuid::new_v4(),
            taxi_rank_id: Uuid::new_v4(),
            route_id: Uuid::new_v4(),
            vehicle_id: Uuid::new_v4(),
            driver_id: None,
            marshal_id: None,
            schedule_id: None,
            departure_at: Utc::now().into(),
            arrived_at: None,
            status,
            passenger_count,
            total_fare,
            notes: None,
            created_at: Utc::now().into(),
        }
    }

    fn route_for(trip: &taxi_rank_trip::Model) -> route::Model {
        route::Model {
            id: trip.route_id,
            tenant_id: Uuid::new_v4(),
            taxi_rank_id: trip.taxi_rank_id,
            name: "Bree to Soweto".into(),
            origin: "Bree".into(),
            destination: "Soweto".into(),
            distance_km: Some(24.0),
            standard_fare: Decimal::new(2500, 2),
            estimated_minutes: Some(40),
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    fn vehicle_for(trip: &taxi_rank_trip::Model) -> vehicle::Model {
        vehicle::Model {
            id: trip.vehicle_id,
            owner_profile_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            registration_number: "GP 123-456".into(),
            make: "Toyota".into(),
            model: "Quantum".into(),
            year: Some(2019),
            vin: None,
            colour: Some("White".into()),
            seating_capacity: 15,
            photos: serde_json::json!([]),
            status: vehicle::VehicleStatus::Active,
            created_at: Utc::now().into(),
        }
    }

    fn on_trip(mut p: trip_passenger::Model, trip: &taxi_rank_trip::Model) -> trip_passenger::Model {
        p.trip_id = trip.id;
        p
    }

    #[test]
    fn test_summary_of_empty_trip() {
        let summary = summarize_trip(&[]);
        assert_eq!(summary.passenger_count, 0);
        assert_eq!(summary.total_fare, Decimal::ZERO);
        assert_eq!(summary.average_fare, Decimal::ZERO);
    }

    #[test]
    fn test_summary_totals_and_average() {
        let summary = summarize_trip(&[passenger(Some(1), 2500), passenger(Some(2), 2500), passenger(None, 3000)]);
        assert_eq!(summary.passenger_count, 3);
        assert_eq!(summary.total_fare, Decimal::new(8000, 2));
        assert_eq!(summary.average_fare, Decimal::new(2667, 2));
    }

    #[test]
    fn test_seat_out_of_range() {
        let result = check_boarding(TripStatus::Boarding, 15, &[], Some(16));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
        let result = check_boarding(TripStatus::Boarding, 15, &[], Some(0));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_seat_taken() {
        let result = check_boarding(TripStatus::Scheduled, 15, &[passenger(Some(3), 2500)], Some(3));
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert!(check_boarding(TripStatus::Scheduled, 15, &[passenger(Some(3), 2500)], Some(4)).is_ok());
    }

    #[test]
    fn test_full_trip_rejected() {
        let aboard = vec![passenger(None, 2500), passenger(None, 2500)];
        let result = check_boarding(TripStatus::Boarding, 2, &aboard, None);
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_no_boarding_after_departure() {
        for status in [TripStatus::Departed, TripStatus::Completed, TripStatus::Cancelled] {
            assert!(check_boarding(status, 15, &[], None).is_err());
        }
    }

    #[test]
    fn test_day_window_is_one_day() {
        let (from, to) = day_window(NaiveDate::from_ymd_opt(2024, 6, 11).unwrap());
        assert_eq!(to - from, Duration::days(1));
        assert_eq!(from.to_rfc3339(), "2024-06-11T00:00:00+00:00");
    }

    #[tokio::test]
    async fn test_boarding_recomputes_trip_totals() {
        let current = trip(TripStatus::Boarding, 1, Decimal::new(2500, 2));
        let aboard = on_trip(passenger(Some(1), 2500), &current);
        let boarded = on_trip(passenger(Some(2), 2500), &current);
        let recounted = taxi_rank_trip::Model {
            passenger_count: 2,
            total_fare: Decimal::new(5000, 2),
            ..current.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![current.clone()]])
            .append_query_results([vec![route_for(&current)]])
            .append_query_results([vec![vehicle_for(&current)]])
            .append_query_results([vec![aboard.clone()]])
            .append_query_results([vec![boarded.clone()]])
            .append_query_results([vec![aboard, boarded.clone()]])
            .append_query_results([vec![recounted]])
            .into_connection();

        let result = add_passenger(
            &db,
            &admin(),
            current.id,
            AddPassengerRequest {
                name: "Thabo".into(),
                phone: None,
                passenger_user_id: None,
                seat_number: Some(2),
                fare_amount: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(result.id, boarded.id);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("FOR UPDATE"));
        assert!(log.contains("Int(Some(2))"));
        assert!(log.contains("50.00"));
    }

    #[tokio::test]
    async fn test_removing_passenger_recomputes_trip_totals() {
        let current = trip(TripStatus::Scheduled, 2, Decimal::new(5500, 2));
        let staying = on_trip(passenger(Some(1), 2500), &current);
        let leaving_id = Uuid::new_v4();
        let recounted = taxi_rank_trip::Model {
            passenger_count: 1,
            total_fare: Decimal::new(2500, 2),
            ..current.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![current.clone()]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
            .append_query_results([vec![staying]])
            .append_query_results([vec![recounted]])
            .into_connection();

        remove_passenger(&db, &admin(), current.id, leaving_id).await.unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("DELETE FROM"));
        assert!(log.contains("Int(Some(1))"));
        assert!(log.contains("25.00"));
    }

    #[tokio::test]
    async fn test_no_removal_after_departure() {
        let departed = trip(TripStatus::Departed, 1, Decimal::new(2500, 2));
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![departed.clone()]])
            .into_connection();

        let result = remove_passenger(&db, &admin(), departed.id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
