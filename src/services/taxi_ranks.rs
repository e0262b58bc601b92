//! Taxi ranks, the tenants associated with them, and the vehicles working
//! from them.
//!
//! A rank is registered by one tenant but may be shared: every tenant that
//! operates there holds a `taxi_rank_association` row, and at most one of
//! those rows carries the primary flag.

use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{taxi_rank, taxi_rank_association, tenant, vehicle, vehicle_taxi_rank};
use crate::error::{AppError, AppResult};
use crate::repositories::{self, taxi_rank_association as associations};
use crate::services::vehicles::load_vehicle;
use crate::services::{ensure_manager, optional, required};
use crate::utils::geo::{haversine_distance, is_valid_coordinate};
use crate::utils::jwt::Claims;

const DEFAULT_RADIUS_KM: f64 = 5.0;
const MAX_RADIUS_KM: f64 = 100.0;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaxiRankRequest {
    /// Admins register ranks for a tenant; managers always for their own
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub code: String,
    pub address: String,
    pub city: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaxiRankRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxiRankFilter {
    pub tenant_id: Option<Uuid>,
    pub city: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyTaxiRank {
    #[serde(flatten)]
    pub rank: taxi_rank::Model,
    pub distance_km: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociateRequest {
    pub tenant_id: Uuid,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignVehicleRequest {
    pub vehicle_id: Uuid,
}

fn check_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> AppResult<()> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) if !is_valid_coordinate(lat, lng) => {
            Err(AppError::BadRequest("Coordinates out of range".to_string()))
        }
        (Some(_), None) | (None, Some(_)) => Err(AppError::BadRequest(
            "Latitude and longitude must be given together".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Admins, or managers of any tenant associated with the rank
async fn ensure_rank_manager<C: sea_orm::ConnectionTrait>(
    db: &C,
    claims: &Claims,
    rank: &taxi_rank::Model,
) -> AppResult<()> {
    if claims.is_admin() {
        return Ok(());
    }
    let tenant_id = claims.require_tenant()?;
    ensure_manager(claims, tenant_id)?;

    if rank.tenant_id == tenant_id || associations::find_pair(db, rank.id, tenant_id).await?.is_some() {
        Ok(())
    } else {
        Err(AppError::Forbidden("Taxi rank is not associated with your tenant".to_string()))
    }
}

/// Ranks within `radius_km` of the point, nearest first. Ranks without
/// coordinates never match.
pub fn ranks_within(
    ranks: Vec<taxi_rank::Model>,
    latitude: f64,
    longitude: f64,
    radius_km: f64,
) -> Vec<NearbyTaxiRank> {
    let mut nearby: Vec<NearbyTaxiRank> = ranks
        .into_iter()
        .filter_map(|rank| {
            let (lat, lng) = (rank.latitude?, rank.longitude?);
            let distance_km = haversine_distance(latitude, longitude, lat, lng);
            (distance_km <= radius_km).then_some(NearbyTaxiRank { rank, distance_km })
        })
        .collect();

    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

pub async fn create_taxi_rank(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: CreateTaxiRankRequest,
) -> AppResult<taxi_rank::Model> {
    let tenant_id = match payload.tenant_id {
        Some(id) if claims.is_admin() => id,
        _ => claims.require_tenant()?,
    };
    ensure_manager(claims, tenant_id)?;
    repositories::require::<tenant::Entity, _>(db, tenant_id, "Tenant").await?;

    check_coordinates(payload.latitude, payload.longitude)?;
    let capacity = payload.capacity.unwrap_or(0);
    if capacity < 0 {
        return Err(AppError::BadRequest("Capacity cannot be negative".to_string()));
    }

    let txn = db.begin().await?;

    let rank = taxi_rank::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(tenant_id),
        name: Set(required(&payload.name, "Name")?),
        code: Set(required(&payload.code, "Code")?.to_uppercase()),
        address: Set(required(&payload.address, "Address")?),
        city: Set(required(&payload.city, "City")?),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        capacity: Set(capacity),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    associations::insert_if_absent(
        &txn,
        taxi_rank_association::ActiveModel {
            id: Set(Uuid::new_v4()),
            taxi_rank_id: Set(rank.id),
            tenant_id: Set(tenant_id),
            is_primary: Set(true),
            ..Default::default()
        },
    )
    .await?;

    txn.commit().await?;

    tracing::info!(taxi_rank_id = %rank.id, tenant_id = %tenant_id, "Taxi rank created");
    Ok(rank)
}

pub async fn get_taxi_rank(db: &DatabaseConnection, id: Uuid) -> AppResult<taxi_rank::Model> {
    repositories::require::<taxi_rank::Entity, _>(db, id, "Taxi rank").await
}

/// With a tenant filter, every rank the tenant is associated with
pub async fn list_taxi_ranks(
    db: &DatabaseConnection,
    claims: &Claims,
    filter: TaxiRankFilter,
) -> AppResult<Vec<taxi_rank::Model>> {
    let tenant_id = match filter.tenant_id {
        Some(id) => Some(id),
        None if claims.is_admin() => None,
        None => claims.tenant_id,
    };

    let mut query = taxi_rank::Entity::find().order_by_asc(taxi_rank::Column::Name);
    if let Some(tenant_id) = tenant_id {
        query = query
            .inner_join(taxi_rank_association::Entity)
            .filter(taxi_rank_association::Column::TenantId.eq(tenant_id));
    }
    if let Some(city) = optional(filter.city) {
        query = query.filter(taxi_rank::Column::City.eq(city));
    }

    Ok(query.all(db).await?)
}

pub async fn update_taxi_rank(
    db: &DatabaseConnection,
    claims: &Claims,
    id: Uuid,
    payload: UpdateTaxiRankRequest,
) -> AppResult<taxi_rank::Model> {
    let rank = get_taxi_rank(db, id).await?;
    ensure_rank_manager(db, claims, &rank).await?;

    let latitude = payload.latitude.or(rank.latitude);
    let longitude = payload.longitude.or(rank.longitude);
    check_coordinates(latitude, longitude)?;

    let mut active: taxi_rank::ActiveModel = rank.into();
    if let Some(name) = payload.name {
        active.name = Set(required(&name, "Name")?);
    }
    if let Some(address) = payload.address {
        active.address = Set(required(&address, "Address")?);
    }
    if let Some(city) = payload.city {
        active.city = Set(required(&city, "City")?);
    }
    active.latitude = Set(latitude);
    active.longitude = Set(longitude);
    if let Some(capacity) = payload.capacity {
        if capacity < 0 {
            return Err(AppError::BadRequest("Capacity cannot be negative".to_string()));
        }
        active.capacity = Set(capacity);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    Ok(active.update(db).await?)
}

/// Routes, trips, associations and vehicle links go with the rank
pub async fn delete_taxi_rank(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<()> {
    let rank = get_taxi_rank(db, id).await?;
    ensure_rank_manager(db, claims, &rank).await?;
    repositories::delete_by_id::<taxi_rank::Entity, _>(db, id, "Taxi rank").await?;
    tracing::info!(taxi_rank_id = %id, "Taxi rank deleted");
    Ok(())
}

pub async fn find_nearby(db: &DatabaseConnection, query: NearbyQuery) -> AppResult<Vec<NearbyTaxiRank>> {
    if !is_valid_coordinate(query.latitude, query.longitude) {
        return Err(AppError::BadRequest("Coordinates out of range".to_string()));
    }
    let radius_km = query.radius_km.unwrap_or(DEFAULT_RADIUS_KM);
    if radius_km <= 0.0 || radius_km > MAX_RADIUS_KM {
        return Err(AppError::BadRequest(format!(
            "Radius must be greater than 0 and at most {} km",
            MAX_RADIUS_KM
        )));
    }

    let ranks = taxi_rank::Entity::find()
        .filter(taxi_rank::Column::IsActive.eq(true))
        .filter(taxi_rank::Column::Latitude.is_not_null())
        .filter(taxi_rank::Column::Longitude.is_not_null())
        .all(db)
        .await?;

    Ok(ranks_within(ranks, query.latitude, query.longitude, radius_km))
}

pub async fn associate_tenant(
    db: &DatabaseConnection,
    claims: &Claims,
    rank_id: Uuid,
    payload: AssociateRequest,
) -> AppResult<taxi_rank_association::Model> {
    let rank = get_taxi_rank(db, rank_id).await?;
    ensure_rank_manager(db, claims, &rank).await?;
    repositories::require::<tenant::Entity, _>(db, payload.tenant_id, "Tenant").await?;

    let txn = db.begin().await?;

    let is_primary = match payload.is_primary {
        Some(flag) => flag,
        None => associations::find_any_for_rank(&txn, rank.id).await?.is_none(),
    };

    let inserted = associations::insert_if_absent(
        &txn,
        taxi_rank_association::ActiveModel {
            id: Set(Uuid::new_v4()),
            taxi_rank_id: Set(rank.id),
            tenant_id: Set(payload.tenant_id),
            is_primary: Set(is_primary),
            ..Default::default()
        },
    )
    .await?;
    if inserted == 0 {
        return Err(AppError::Conflict(
            "Tenant is already associated with this taxi rank".to_string(),
        ));
    }

    if is_primary {
        associations::clear_other_primaries(&txn, rank.id, payload.tenant_id).await?;
    }

    let association = associations::find_pair(&txn, rank.id, payload.tenant_id)
        .await?
        .ok_or_else(|| AppError::Internal("Association vanished after insert".to_string()))?;

    txn.commit().await?;

    tracing::info!(
        taxi_rank_id = %rank.id,
        tenant_id = %payload.tenant_id,
        is_primary,
        "Tenant associated with taxi rank"
    );
    Ok(association)
}

pub async fn set_primary_tenant(
    db: &DatabaseConnection,
    claims: &Claims,
    rank_id: Uuid,
    tenant_id: Uuid,
) -> AppResult<taxi_rank_association::Model> {
    let rank = get_taxi_rank(db, rank_id).await?;
    ensure_rank_manager(db, claims, &rank).await?;

    let txn = db.begin().await?;

    let association = associations::find_pair(&txn, rank.id, tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Association not found".to_string()))?;

    associations::clear_other_primaries(&txn, rank.id, tenant_id).await?;

    let association = if association.is_primary {
        association
    } else {
        let mut active: taxi_rank_association::ActiveModel = association.into();
        active.is_primary = Set(true);
        active.update(&txn).await?
    };

    txn.commit().await?;
    Ok(association)
}

/// Removing the primary tenant hands the flag to the oldest remaining one
pub async fn dissociate_tenant(
    db: &DatabaseConnection,
    claims: &Claims,
    rank_id: Uuid,
    tenant_id: Uuid,
) -> AppResult<()> {
    let rank = get_taxi_rank(db, rank_id).await?;
    ensure_rank_manager(db, claims, &rank).await?;

    let txn = db.begin().await?;

    let association = associations::find_pair(&txn, rank.id, tenant_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Association not found".to_string()))?;
    associations::delete_pair(&txn, rank.id, tenant_id).await?;

    if association.is_primary {
        let remaining = associations::list_for_rank(&txn, rank.id).await?;
        if let Some(next) = remaining.into_iter().min_by_key(|a| a.created_at) {
            let mut active: taxi_rank_association::ActiveModel = next.into();
            active.is_primary = Set(true);
            active.update(&txn).await?;
        }
    }

    txn.commit().await?;

    tracing::info!(taxi_rank_id = %rank.id, tenant_id = %tenant_id, "Tenant dissociated from taxi rank");
    Ok(())
}

pub async fn list_associations(
    db: &DatabaseConnection,
    rank_id: Uuid,
) -> AppResult<Vec<taxi_rank_association::Model>> {
    get_taxi_rank(db, rank_id).await?;
    associations::list_for_rank(db, rank_id).await
}

pub async fn list_tenant_associations(
    db: &DatabaseConnection,
    claims: &Claims,
    tenant_id: Uuid,
) -> AppResult<Vec<taxi_rank_association::Model>> {
    claims.ensure_tenant(tenant_id)?;
    associations::list_for_tenant(db, tenant_id).await
}

/// Only vehicles of a tenant associated with the rank may work from it
pub async fn assign_vehicle(
    db: &DatabaseConnection,
    claims: &Claims,
    rank_id: Uuid,
    payload: AssignVehicleRequest,
) -> AppResult<vehicle_taxi_rank::Model> {
    let rank = get_taxi_rank(db, rank_id).await?;
    ensure_rank_manager(db, claims, &rank).await?;
    let vehicle = load_vehicle(db, claims, payload.vehicle_id).await?;

    if associations::find_pair(db, rank.id, vehicle.tenant_id).await?.is_none() {
        return Err(AppError::BadRequest(
            "Vehicle's tenant is not associated with this taxi rank".to_string(),
        ));
    }

    let link = vehicle_taxi_rank::ActiveModel {
        id: Set(Uuid::new_v4()),
        vehicle_id: Set(vehicle.id),
        taxi_rank_id: Set(rank.id),
        ..Default::default()
    };
    let inserted = vehicle_taxi_rank::Entity::insert(link)
        .on_conflict(
            OnConflict::columns([
                vehicle_taxi_rank::Column::VehicleId,
                vehicle_taxi_rank::Column::TaxiRankId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    if inserted == 0 {
        return Err(AppError::Conflict("Vehicle is already assigned to this taxi rank".to_string()));
    }

    vehicle_taxi_rank::Entity::find()
        .filter(vehicle_taxi_rank::Column::VehicleId.eq(vehicle.id))
        .filter(vehicle_taxi_rank::Column::TaxiRankId.eq(rank.id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::Internal("Vehicle assignment vanished after insert".to_string()))
}

pub async fn unassign_vehicle(
    db: &DatabaseConnection,
    claims: &Claims,
    rank_id: Uuid,
    vehicle_id: Uuid,
) -> AppResult<()> {
    let rank = get_taxi_rank(db, rank_id).await?;
    ensure_rank_manager(db, claims, &rank).await?;

    let result = vehicle_taxi_rank::Entity::delete_many()
        .filter(vehicle_taxi_rank::Column::VehicleId.eq(vehicle_id))
        .filter(vehicle_taxi_rank::Column::TaxiRankId.eq(rank.id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Vehicle is not assigned to this taxi rank".to_string()));
    }
    Ok(())
}

pub async fn list_rank_vehicles(db: &DatabaseConnection, rank_id: Uuid) -> AppResult<Vec<vehicle::Model>> {
    get_taxi_rank(db, rank_id).await?;
    Ok(vehicle::Entity::find()
        .inner_join(vehicle_taxi_rank::Entity)
        .filter(vehicle_taxi_rank::Column::TaxiRankId.eq(rank_id))
        .order_by_asc(vehicle::Column::RegistrationNumber)
        .all(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn rank(name: &str, coords: Option<(f64, f64)>) -> taxi_rank::Model {
        taxi_rank::Model {
            id: Uuid::new_v4(),
            tenant_id: Uuid::nil(),
            name: name.into(),
            code: name.to_uppercase(),
            address: "1 Main Rd".into(),
            city: "Johannesburg".into(),
            latitude: coords.map(|c| c.0),
            longitude: coords.map(|c| c.1),
            capacity: 40,
            is_active: true,
            created_at: Utc::now().into(),
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

    #[test]
    fn test_ranks_within_sorted_and_filtered() {
        let ranks = vec![
            rank("noord", Some((-26.1996, 28.0466))),
            rank("bree", Some((-26.2005, 28.0383))),
            rank("bloed", Some((-25.7422, 28.1881))),
            rank("unmapped", None),
        ];

        let nearby = ranks_within(ranks, -26.2005, 28.0383, 5.0);

        let names: Vec<_> = nearby.iter().map(|n| n.rank.name.as_str()).collect();
        assert_eq!(names, vec!["bree", "noord"]);
        assert!(nearby[0].distance_km < 0.01);
    }

    #[test]
    fn test_coordinates_must_pair() {
        assert!(check_coordinates(Some(-26.2), None).is_err());
        assert!(check_coordinates(Some(-126.2), Some(28.0)).is_err());
        assert!(check_coordinates(None, None).is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_association_conflicts() {
        let existing = rank("bree", Some((-26.2005, 28.0383)));
        let rank_id = existing.id;
        let tenant = tenant::Model {
            id: Uuid::new_v4(),
            name: "Soweto Taxi Association".into(),
            code: "STA".into(),
            tenant_type: tenant::TenantType::Association,
            contact_person: None,
            email: None,
            phone: None,
            address: None,
            is_active: true,
            created_at: Utc::now().into(),
        };
        let tenant_id = tenant.id;
        let current = taxi_rank_association::Model {
            id: Uuid::new_v4(),
            taxi_rank_id: rank_id,
            tenant_id,
            is_primary: true,
            created_at: Utc::now().into(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing]])
            .append_query_results([vec![tenant]])
            .append_query_results([vec![current]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 0 }])
            .into_connection();

        let result = associate_tenant(
            &db,
            &admin(),
            rank_id,
            AssociateRequest { tenant_id, is_primary: None },
        )
        .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    fn association(rank_id: Uuid, is_primary: bool, age_days: i64) -> taxi_rank_association::Model {
        taxi_rank_association::Model {
            id: Uuid::new_v4(),
            taxi_rank_id: rank_id,
            tenant_id: Uuid::new_v4(),
            is_primary,
            created_at: (Utc::now() - chrono::Duration::days(age_days)).into(),
        }
    }

    #[tokio::test]
    async fn test_new_primary_clears_the_others() {
        let existing = rank("bree", None);
        let tenant = tenant::Model {
            id: Uuid::new_v4(),
            name: "Alexandra Taxi Association".into(),
            code: "ATA".into(),
            tenant_type: tenant::TenantType::Association,
            contact_person: None,
            email: None,
            phone: None,
            address: None,
            is_active: true,
            created_at: Utc::now().into(),
        };
        let created = taxi_rank_association::Model {
            tenant_id: tenant.id,
            ..association(existing.id, true, 0)
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![tenant.clone()]])
            .append_exec_results([
                MockExecResult { last_insert_id: 0, rows_affected: 1 },
                MockExecResult { last_insert_id: 0, rows_affected: 1 },
            ])
            .append_query_results([vec![created]])
            .into_connection();

        let result = associate_tenant(
            &db,
            &admin(),
            existing.id,
            AssociateRequest {
                tenant_id: tenant.id,
                is_primary: Some(true),
            },
        )
        .await
        .unwrap();

        assert!(result.is_primary);
        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("ON CONFLICT"));
        assert!(log.contains("UPDATE"));
        assert!(log.contains("is_primary"));
    }

    #[tokio::test]
    async fn test_dissociating_primary_promotes_oldest() {
        let existing = rank("bree", None);
        let primary = association(existing.id, true, 30);
        let older = association(existing.id, false, 20);
        let newer = association(existing.id, false, 2);
        let promoted = taxi_rank_association::Model {
            is_primary: true,
            ..older.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![primary.clone()]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
            .append_query_results([vec![newer.clone(), older.clone()]])
            .append_query_results([vec![promoted]])
            .into_connection();

        dissociate_tenant(&db, &admin(), existing.id, primary.tenant_id)
            .await
            .unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains(&older.id.to_string()));
        assert!(!log.contains(&newer.id.to_string()));
    }

    #[tokio::test]
    async fn test_dissociating_secondary_leaves_primary_alone() {
        let existing = rank("bree", None);
        let secondary = association(existing.id, false, 5);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![existing.clone()]])
            .append_query_results([vec![secondary.clone()]])
            .append_exec_results([MockExecResult { last_insert_id: 0, rows_affected: 1 }])
            .into_connection();

        dissociate_tenant(&db, &admin(), existing.id, secondary.tenant_id)
            .await
            .unwrap();

        let log = format!("{:?}", db.into_transaction_log());
        assert!(log.contains("DELETE FROM"));
        assert!(!log.contains("UPDATE"));
    }
}
