use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, OnConflict}, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{route, taxi_rank, vehicle_route_assignment};
use crate::error::{AppError, AppResult};
use crate::repositories::{self, taxi_rank_association as associations};
use crate::services::vehicles::load_vehicle;
use crate::services::{ensure_manager, non_negative, required};
use crate::utils::jwt::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRouteRequest {
    pub taxi_rank_id: Uuid,
    pub name: String,
    pub origin: String,
    pub destination: String,
    pub distance_km: Option<f64>,
    pub standard_fare: Decimal,
    pub estimated_minutes: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRouteRequest {
    pub name: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub distance_km: Option<f64>,
    pub standard_fare: Option<Decimal>,
    pub estimated_minutes: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteVehicleRequest {
    pub vehicle_id: Uuid,
}

fn positive_distance(distance_km: Option<f64>) -> AppResult<Option<f64>> {
    match distance_km {
        Some(d) if !d.is_finite() || d <= 0.0 => {
            Err(AppError::BadRequest("Distance must be a positive number".to_string()))
        }
        other => Ok(other),
    }
}

pub async fn get_route(db: &DatabaseConnection, id: Uuid) -> AppResult<route::Model> {
    repositories::require::<route::Entity, _>(db, id, "Route").await
}

/// Route owned by the caller's tenant (admins pass)
async fn load_managed_route(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<route::Model> {
    let route = get_route(db, id).await?;
    ensure_manager(claims, route.tenant_id)?;
    Ok(route)
}

/// The creating tenant must operate at the rank
pub async fn create_route(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: CreateRouteRequest,
) -> AppResult<route::Model> {
    let rank = repositories::require::<taxi_rank::Entity, _>(db, payload.taxi_rank_id, "Taxi rank").await?;
    let tenant_id = if claims.is_admin() {
        claims.tenant_id.unwrap_or(rank.tenant_id)
    } else {
        claims.require_tenant()?
    };
    ensure_manager(claims, tenant_id)?;

    if associations::find_pair(db, rank.id, tenant_id).await?.is_none() {
        return Err(AppError::Forbidden(
            "Your tenant is not associated with this taxi rank".to_string(),
        ));
    }

    let route = route::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        taxi_rank_id: Set(rank.id),
        name: Set(required(&payload.name, "Name")?),
        origin: Set(required(&payload.origin, "Origin")?),
        destination: Set(required(&payload.destination, "Destination")?),
        distance_km: Set(positive_distance(payload.distance_km)?),
        standard_fare: Set(non_negative(payload.standard_fare, "Standard fare")?),
        estimated_minutes: Set(payload.estimated_minutes),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(route_id = %route.id, taxi_rank_id = %rank.id, "Route created");
    Ok(route)
}

pub async fn list_routes_for_rank(db: &DatabaseConnection, rank_id: Uuid) -> AppResult<Vec<route::Model>> {
    repositories::require::<taxi_rank::Entity, _>(db, rank_id, "Taxi rank").await?;
    Ok(route::Entity::find()
        .filter(route::Column::TaxiRankId.eq(rank_id))
        .order_by_asc(route::Column::Name)
        .all(db)
        .await?)
}

pub async fn update_route(
    db: &DatabaseConnection,
    claims: &Claims,
    id: Uuid,
    payload: UpdateRouteRequest,
) -> AppResult<route::Model> {
    let route = load_managed_route(db, claims, id).await?;

    let mut active: route::ActiveModel = route.into();
    if let Some(name) = payload.name {
        active.name = Set(required(&name, "Name")?);
    }
    if let Some(origin) = payload.origin {
        active.origin = Set(required(&origin, "Origin")?);
    }
    if let Some(destination) = payload.destination {
        active.destination = Set(required(&destination, "Destination")?);
    }
    if payload.distance_km.is_some() {
        active.distance_km = Set(positive_distance(payload.distance_km)?);
    }
    if let Some(fare) = payload.standard_fare {
        active.standard_fare = Set(non_negative(fare, "Standard fare")?);
    }
    if payload.estimated_minutes.is_some() {
        active.estimated_minutes = Set(payload.estimated_minutes);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    Ok(active.update(db).await?)
}

pub async fn delete_route(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<()> {
    load_managed_route(db, claims, id).await?;
    repositories::delete_by_id::<route::Entity, _>(db, id, "Route").await
}

/// Re-assigning a previously released vehicle reactivates its row
pub async fn assign_vehicle(
    db: &DatabaseConnection,
    claims: &Claims,
    route_id: Uuid,
    payload: RouteVehicleRequest,
) -> AppResult<vehicle_route_assignment::Model> {
    let route = load_managed_route(db, claims, route_id).await?;
    let vehicle = load_vehicle(db, claims, payload.vehicle_id).await?;
    if vehicle.tenant_id != route.tenant_id {
        return Err(AppError::BadRequest("Vehicle belongs to another tenant".to_string()));
    }

    let existing = vehicle_route_assignment::Entity::find()
        .filter(vehicle_route_assignment::Column::RouteId.eq(route.id))
        .filter(vehicle_route_assignment::Column::VehicleId.eq(vehicle.id))
        .one(db)
        .await?;

    if let Some(assignment) = existing {
        if assignment.is_active {
            return Err(AppError::Conflict("Vehicle is already assigned to this route".to_string()));
        }
        let mut active: vehicle_route_assignment::ActiveModel = assignment.into();
        active.is_active = Set(true);
        return Ok(active.update(db).await?);
    }

    let assignment = vehicle_route_assignment::ActiveModel {
        id: Set(Uuid::new_v4()),
        vehicle_id: Set(vehicle.id),
        route_id: Set(route.id),
        is_active: Set(true),
        ..Default::default()
    };
    let inserted = vehicle_route_assignment::Entity::insert(assignment)
        .on_conflict(
            OnConflict::columns([
                vehicle_route_assignment::Column::VehicleId,
                vehicle_route_assignment::Column::RouteId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    if inserted == 0 {
        return Err(AppError::Conflict("Vehicle is already assigned to this route".to_string()));
    }

    tracing::info!(route_id = %route.id, vehicle_id = %vehicle.id, "Vehicle assigned to route");

    vehicle_route_assignment::Entity::find()
        .filter(vehicle_route_assignment::Column::RouteId.eq(route.id))
        .filter(vehicle_route_assignment::Column::VehicleId.eq(vehicle.id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal("Route assignment vanished after insert".to_string()))
}

/// Releases the vehicle; the row stays as history
pub async fn unassign_vehicle(
    db: &DatabaseConnection,
    claims: &Claims,
    route_id: Uuid,
    vehicle_id: Uuid,
) -> AppResult<()> {
    let route = load_managed_route(db, claims, route_id).await?;

    let result = vehicle_route_assignment::Entity::update_many()
        .col_expr(vehicle_route_assignment::Column::IsActive, Expr::value(false))
        .filter(vehicle_route_assignment::Column::RouteId.eq(route.id))
        .filter(vehicle_route_assignment::Column::VehicleId.eq(vehicle_id))
        .filter(vehicle_route_assignment::Column::IsActive.eq(true))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Vehicle is not assigned to this route".to_string()));
    }
    Ok(())
}

pub async fn list_assignments(
    db: &DatabaseConnection,
    route_id: Uuid,
) -> AppResult<Vec<vehicle_route_assignment::Model>> {
    get_route(db, route_id).await?;
    Ok(vehicle_route_assignment::Entity::find()
        .filter(vehicle_route_assignment::Column::RouteId.eq(route_id))
        .order_by_asc(vehicle_route_assignment::Column::AssignedAt)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_must_be_positive() {
        assert!(positive_distance(Some(0.0)).is_err());
        assert!(positive_distance(Some(f64::NAN)).is_err());
        assert_eq!(positive_distance(Some(12.5)).unwrap(), Some(12.5));
        assert_eq!(positive_distance(None).unwrap(), None);
    }
}
