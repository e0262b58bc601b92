use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    roadside_assistance_request::{self, AssistanceStatus},
    route, taxi_rank,
    taxi_rank_trip::{self, TripStatus},
    tenant, user, vehicle,
    vehicle_rental_request::{self, RequestStatus},
};
use crate::error::AppResult;
use crate::repositories::{self, trip as trips};
use crate::services::trips::day_window;
use crate::utils::jwt::Claims;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub tenants: u64,
    pub users: u64,
    pub active_users: u64,
    pub vehicles: u64,
    pub taxi_ranks: u64,
    pub trips: u64,
    pub open_rental_requests: u64,
    pub pending_roadside_requests: u64,
}

#[derive(Debug, Deserialize)]
pub struct DailySummaryQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteDailySummary {
    pub route_id: Uuid,
    pub route_name: String,
    /// Trips that ran or are still running
    pub trip_count: u32,
    pub cancelled_trip_count: u32,
    pub passenger_count: i64,
    pub total_fare: Decimal,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankDailySummary {
    pub taxi_rank_id: Uuid,
    pub date: NaiveDate,
    pub trip_count: u32,
    pub cancelled_trip_count: u32,
    pub passenger_count: i64,
    pub total_fare: Decimal,
    pub routes: Vec<RouteDailySummary>,
}

pub async fn admin_overview(db: &DatabaseConnection) -> AppResult<AdminOverview> {
    Ok(AdminOverview {
        tenants: tenant::Entity::find().count(db).await?,
        users: user::Entity::find().count(db).await?,
        active_users: user::Entity::find()
            .filter(user::Column::IsActive.eq(true))
            .count(db)
            .await?,
        vehicles: vehicle::Entity::find().count(db).await?,
        taxi_ranks: taxi_rank::Entity::find().count(db).await?,
        trips: taxi_rank_trip::Entity::find().count(db).await?,
        open_rental_requests: vehicle_rental_request::Entity::find()
            .filter(vehicle_rental_request::Column::Status.eq(RequestStatus::Open))
            .count(db)
            .await?,
        pending_roadside_requests: roadside_assistance_request::Entity::find()
            .filter(roadside_assistance_request::Column::Status.eq(AssistanceStatus::Pending))
            .count(db)
            .await?,
    })
}

/// Per-route totals of the given trips, ordered by route name. Routes
/// missing from `routes` are reported by id only. Cancelled trips are only
/// counted, their passengers and fares stay out of the totals.
pub fn summarize_by_route(
    day_trips: &[taxi_rank_trip::Model],
    routes: &[route::Model],
) -> Vec<RouteDailySummary> {
    let mut by_route: BTreeMap<Uuid, RouteDailySummary> = BTreeMap::new();

    for trip in day_trips {
        let entry = by_route.entry(trip.route_id).or_insert_with(|| RouteDailySummary {
            route_id: trip.route_id,
            route_name: routes
                .iter()
                .find(|r| r.id == trip.route_id)
                .map(|r| r.name.clone())
                .unwrap_or_else(|| trip.route_id.to_string()),
            trip_count: 0,
            cancelled_trip_count: 0,
            passenger_count: 0,
            total_fare: Decimal::ZERO,
        });
        if trip.status == TripStatus::Cancelled {
            entry.cancelled_trip_count += 1;
            continue;
        }
        entry.trip_count += 1;
        entry.passenger_count += i64::from(trip.passenger_count);
        entry.total_fare += trip.total_fare;
    }

    let mut summaries: Vec<_> = by_route.into_values().collect();
    summaries.sort_by(|a, b| a.route_name.cmp(&b.route_name));
    summaries
}

pub async fn rank_daily_summary(
    db: &DatabaseConnection,
    claims: &Claims,
    taxi_rank_id: Uuid,
    query: DailySummaryQuery,
) -> AppResult<RankDailySummary> {
    repositories::require::<taxi_rank::Entity, _>(db, taxi_rank_id, "Taxi rank").await?;
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let (start, end) = day_window(date);
    let day_trips = trips::trips_for_rank_between(db, taxi_rank_id, start, end).await?;

    let routes = route::Entity::find()
        .filter(route::Column::TaxiRankId.eq(taxi_rank_id))
        .all(db)
        .await?;
    let per_route = summarize_by_route(&day_trips, &routes);

    tracing::debug!(
        taxi_rank_id = %taxi_rank_id,
        %date,
        requested_by = %claims.sub,
        trips = day_trips.len(),
        "Rank daily summary"
    );

    Ok(RankDailySummary {
        taxi_rank_id,
        date,
        trip_count: per_route.iter().map(|r| r.trip_count).sum(),
        cancelled_trip_count: per_route.iter().map(|r| r.cancelled_trip_count).sum(),
        passenger_count: per_route.iter().map(|r| r.passenger_count).sum(),
        total_fare: per_route.iter().map(|r| r.total_fare).sum(),
        routes: per_route,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(name: &str) -> route::Model {
        route::Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            taxi_rank_id: Uuid::nil(),
            name: name.into(),
            origin: "Bree".into(),
            destination: "Soweto".into(),
            distance_km: Some(22.0),
            standard_fare: Decimal::new(2200, 2),
            estimated_minutes: Some(40),
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    fn trip(route_id: Uuid, passengers: i32, fare: i64) -> taxi_rank_trip::Model {
        taxi_rank_trip::Model {
            id: Uuid::new_v4(),
            taxi_rank_id: Uuid::nil(),
            route_id,
            vehicle_id: Uuid::new_v4(),
            driver_id: None,
            marshal_id: None,
            schedule_id: None,
            departure_at: Utc::now().into(),
            arrived_at: None,
            status: TripStatus::Departed,
            passenger_count: passengers,
            total_fare: Decimal::new(fare, 2),
            notes: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_summary_groups_per_route() {
        let soweto = route("Soweto");
        let alex = route("Alexandra");
        let trips = vec![
            trip(soweto.id, 15, 33000),
            trip(alex.id, 10, 18000),
            trip(soweto.id, 12, 26400),
        ];

        let summary = summarize_by_route(&trips, &[soweto.clone(), alex.clone()]);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].route_name, "Alexandra");
        assert_eq!(summary[1].trip_count, 2);
        assert_eq!(summary[1].passenger_count, 27);
        assert_eq!(summary[1].total_fare, Decimal::new(59400, 2));
    }

    #[test]
    fn test_summary_of_quiet_day_is_empty() {
        assert!(summarize_by_route(&[], &[]).is_empty());
    }

    #[test]
    fn test_cancelled_trips_stay_out_of_totals() {
        let soweto = route("Soweto");
        let cancelled = taxi_rank_trip::Model {
            status: TripStatus::Cancelled,
            ..trip(soweto.id, 9, 19800)
        };
        let trips = vec![trip(soweto.id, 15, 33000), cancelled];

        let summary = summarize_by_route(&trips, &[soweto]);

        assert_eq!(summary[0].trip_count, 1);
        assert_eq!(summary[0].cancelled_trip_count, 1);
        assert_eq!(summary[0].passenger_count, 15);
        assert_eq!(summary[0].total_fare, Decimal::new(33000, 2));
    }
}
