use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    owner_profile,
    user::UserRole,
    vehicle::{self, VehicleStatus},
    vehicle_document, vehicle_earning, vehicle_expense,
};
use crate::error::{AppError, AppResult};
use crate::repositories;
use crate::services::{ensure_manager, non_negative, optional, required};
use crate::utils::jwt::Claims;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVehicleRequest {
    /// Required when a manager registers a vehicle on an owner's behalf
    pub owner_profile_id: Option<Uuid>,
    pub registration_number: String,
    pub make: String,
    pub model: String,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub colour: Option<String>,
    pub seating_capacity: i32,
    pub photos: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVehicleRequest {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub colour: Option<String>,
    pub seating_capacity: Option<i32>,
    pub photos: Option<Vec<String>>,
    pub status: Option<VehicleStatus>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleFilter {
    pub tenant_id: Option<Uuid>,
    pub owner_profile_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub document_type: String,
    pub url: String,
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEarningRequest {
    pub amount: Decimal,
    pub earned_on: NaiveDate,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub amount: Decimal,
    pub spent_on: NaiveDate,
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSummary {
    pub vehicle_id: Uuid,
    pub total_earnings: Decimal,
    pub total_expenses: Decimal,
    pub net_income: Decimal,
    pub earning_count: usize,
    pub expense_count: usize,
}

fn photo_list(photos: Option<Vec<String>>) -> AppResult<serde_json::Value> {
    let photos = photos.unwrap_or_default();
    if photos.iter().any(|url| url.trim().is_empty()) {
        return Err(AppError::BadRequest("Photo URLs cannot be blank".to_string()));
    }
    Ok(serde_json::json!(photos))
}

fn check_capacity(seats: i32) -> AppResult<i32> {
    if !(1..=100).contains(&seats) {
        return Err(AppError::BadRequest("Seating capacity must be between 1 and 100".to_string()));
    }
    Ok(seats)
}

/// Owners manage their own fleet; managers the fleets of their tenant
pub(crate) async fn ensure_vehicle_writer(
    db: &DatabaseConnection,
    claims: &Claims,
    vehicle: &vehicle::Model,
) -> AppResult<()> {
    if claims.role == UserRole::Owner {
        let owner = repositories::require::<owner_profile::Entity, _>(db, vehicle.owner_profile_id, "Owner profile").await?;
        if owner.user_id == claims.sub {
            return Ok(());
        }
        return Err(AppError::Forbidden("Vehicle belongs to another owner".to_string()));
    }
    ensure_manager(claims, vehicle.tenant_id)
}

/// Fetch a vehicle visible to the caller's tenant
pub async fn load_vehicle(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<vehicle::Model> {
    let vehicle = repositories::require::<vehicle::Entity, _>(db, id, "Vehicle").await?;
    claims.ensure_tenant(vehicle.tenant_id)?;
    Ok(vehicle)
}

pub async fn create_vehicle(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: CreateVehicleRequest,
) -> AppResult<vehicle::Model> {
    let owner = match (claims.role, payload.owner_profile_id) {
        (UserRole::Owner, _) => owner_profile::Entity::find()
            .filter(owner_profile::Column::UserId.eq(claims.sub))
            .one(db)
            .await?
            .ok_or_else(|| AppError::BadRequest("Complete your owner profile first".to_string()))?,
        (_, Some(profile_id)) => {
            repositories::require::<owner_profile::Entity, _>(db, profile_id, "Owner profile").await?
        }
        (_, None) => return Err(AppError::BadRequest("Owner profile is required".to_string())),
    };
    let tenant_id = claims.require_tenant()?;
    if claims.role != UserRole::Owner {
        ensure_manager(claims, tenant_id)?;
    }

    let registration_number = required(&payload.registration_number, "Registration number")?.to_uppercase();
    let existing = vehicle::Entity::find()
        .filter(vehicle::Column::RegistrationNumber.eq(&registration_number))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict(format!("Vehicle {} already registered", registration_number)));
    }

    let vehicle = vehicle::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_profile_id: Set(owner.id),
        tenant_id: Set(tenant_id),
        registration_number: Set(registration_number),
        make: Set(required(&payload.make, "Make")?),
        model: Set(required(&payload.model, "Model")?),
        year: Set(payload.year),
        vin: Set(optional(payload.vin)),
        colour: Set(optional(payload.colour)),
        seating_capacity: Set(check_capacity(payload.seating_capacity)?),
        photos: Set(photo_list(payload.photos)?),
        status: Set(VehicleStatus::Active),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(vehicle_id = %vehicle.id, registration = %vehicle.registration_number, "Vehicle registered");
    Ok(vehicle)
}

pub async fn list_vehicles(
    db: &DatabaseConnection,
    claims: &Claims,
    filter: VehicleFilter,
) -> AppResult<Vec<vehicle::Model>> {
    let tenant_id = match filter.tenant_id {
        Some(id) => {
            claims.ensure_tenant(id)?;
            Some(id)
        }
        None if claims.is_admin() => None,
        None => Some(claims.require_tenant()?),
    };

    let mut query = vehicle::Entity::find().order_by_asc(vehicle::Column::RegistrationNumber);
    if let Some(tenant_id) = tenant_id {
        query = query.filter(vehicle::Column::TenantId.eq(tenant_id));
    }
    if let Some(owner_profile_id) = filter.owner_profile_id {
        query = query.filter(vehicle::Column::OwnerProfileId.eq(owner_profile_id));
    }

    Ok(query.all(db).await?)
}

pub async fn update_vehicle(
    db: &DatabaseConnection,
    claims: &Claims,
    id: Uuid,
    payload: UpdateVehicleRequest,
) -> AppResult<vehicle::Model> {
    let vehicle = load_vehicle(db, claims, id).await?;
    ensure_vehicle_writer(db, claims, &vehicle).await?;

    let mut active: vehicle::ActiveModel = vehicle.into();
    if let Some(make) = payload.make {
        active.make = Set(required(&make, "Make")?);
    }
    if let Some(model) = payload.model {
        active.model = Set(required(&model, "Model")?);
    }
    if payload.year.is_some() {
        active.year = Set(payload.year);
    }
    if payload.vin.is_some() {
        active.vin = Set(optional(payload.vin));
    }
    if payload.colour.is_some() {
        active.colour = Set(optional(payload.colour));
    }
    if let Some(seats) = payload.seating_capacity {
        active.seating_capacity = Set(check_capacity(seats)?);
    }
    if payload.photos.is_some() {
        active.photos = Set(photo_list(payload.photos)?);
    }
    if let Some(status) = payload.status {
        active.status = Set(status);
    }

    Ok(active.update(db).await?)
}

pub async fn delete_vehicle(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<()> {
    let vehicle = load_vehicle(db, claims, id).await?;
    ensure_vehicle_writer(db, claims, &vehicle).await?;
    repositories::delete_by_id::<vehicle::Entity, _>(db, id, "Vehicle").await?;
    tracing::info!(vehicle_id = %id, "Vehicle deleted");
    Ok(())
}

pub async fn add_document(
    db: &DatabaseConnection,
    claims: &Claims,
    vehicle_id: Uuid,
    payload: CreateDocumentRequest,
) -> AppResult<vehicle_document::Model> {
    let vehicle = load_vehicle(db, claims, vehicle_id).await?;
    ensure_vehicle_writer(db, claims, &vehicle).await?;

    let document = vehicle_document::ActiveModel {
        id: Set(Uuid::new_v4()),
        vehicle_id: Set(vehicle.id),
        document_type: Set(required(&payload.document_type, "Document type")?.to_lowercase()),
        url: Set(required(&payload.url, "URL")?),
        expires_on: Set(payload.expires_on),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(document)
}

pub async fn list_documents(
    db: &DatabaseConnection,
    claims: &Claims,
    vehicle_id: Uuid,
) -> AppResult<Vec<vehicle_document::Model>> {
    let vehicle = load_vehicle(db, claims, vehicle_id).await?;
    Ok(vehicle_document::Entity::find()
        .filter(vehicle_document::Column::VehicleId.eq(vehicle.id))
        .order_by_desc(vehicle_document::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn delete_document(
    db: &DatabaseConnection,
    claims: &Claims,
    vehicle_id: Uuid,
    document_id: Uuid,
) -> AppResult<()> {
    let vehicle = load_vehicle(db, claims, vehicle_id).await?;
    ensure_vehicle_writer(db, claims, &vehicle).await?;

    let result = vehicle_document::Entity::delete_many()
        .filter(vehicle_document::Column::Id.eq(document_id))
        .filter(vehicle_document::Column::VehicleId.eq(vehicle.id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Document not found".to_string()));
    }
    Ok(())
}

pub async fn add_earning(
    db: &DatabaseConnection,
    claims: &Claims,
    vehicle_id: Uuid,
    payload: CreateEarningRequest,
) -> AppResult<vehicle_earning::Model> {
    let vehicle = load_vehicle(db, claims, vehicle_id).await?;
    ensure_vehicle_writer(db, claims, &vehicle).await?;

    let earning = vehicle_earning::ActiveModel {
        id: Set(Uuid::new_v4()),
        vehicle_id: Set(vehicle.id),
        amount: Set(non_negative(payload.amount, "Amount")?),
        earned_on: Set(payload.earned_on),
        description: Set(optional(payload.description)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(earning)
}

pub async fn list_earnings(
    db: &DatabaseConnection,
    claims: &Claims,
    vehicle_id: Uuid,
    period: &PeriodQuery,
) -> AppResult<Vec<vehicle_earning::Model>> {
    let vehicle = load_vehicle(db, claims, vehicle_id).await?;

    let mut query = vehicle_earning::Entity::find()
        .filter(vehicle_earning::Column::VehicleId.eq(vehicle.id))
        .order_by_desc(vehicle_earning::Column::EarnedOn);
    if let Some(from) = period.from {
        query = query.filter(vehicle_earning::Column::EarnedOn.gte(from));
    }
    if let Some(to) = period.to {
        query = query.filter(vehicle_earning::Column::EarnedOn.lte(to));
    }

    Ok(query.all(db).await?)
}

pub async fn add_expense(
    db: &DatabaseConnection,
    claims: &Claims,
    vehicle_id: Uuid,
    payload: CreateExpenseRequest,
) -> AppResult<vehicle_expense::Model> {
    let vehicle = load_vehicle(db, claims, vehicle_id).await?;
    ensure_vehicle_writer(db, claims, &vehicle).await?;

    let expense = vehicle_expense::ActiveModel {
        id: Set(Uuid::new_v4()),
        vehicle_id: Set(vehicle.id),
        amount: Set(non_negative(payload.amount, "Amount")?),
        spent_on: Set(payload.spent_on),
        category: Set(required(&payload.category, "Category")?.to_lowercase()),
        description: Set(optional(payload.description)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    Ok(expense)
}

pub async fn list_expenses(
    db: &DatabaseConnection,
    claims: &Claims,
    vehicle_id: Uuid,
    period: &PeriodQuery,
) -> AppResult<Vec<vehicle_expense::Model>> {
    let vehicle = load_vehicle(db, claims, vehicle_id).await?;

    let mut query = vehicle_expense::Entity::find()
        .filter(vehicle_expense::Column::VehicleId.eq(vehicle.id))
        .order_by_desc(vehicle_expense::Column::SpentOn);
    if let Some(from) = period.from {
        query = query.filter(vehicle_expense::Column::SpentOn.gte(from));
    }
    if let Some(to) = period.to {
        query = query.filter(vehicle_expense::Column::SpentOn.lte(to));
    }

    Ok(query.all(db).await?)
}

pub fn summarize_finances(
    vehicle_id: Uuid,
    earnings: &[vehicle_earning::Model],
    expenses: &[vehicle_expense::Model],
) -> FinancialSummary {
    let total_earnings: Decimal = earnings.iter().map(|e| e.amount).sum();
    let total_expenses: Decimal = expenses.iter().map(|e| e.amount).sum();

    FinancialSummary {
        vehicle_id,
        total_earnings,
        total_expenses,
        net_income: total_earnings - total_expenses,
        earning_count: earnings.len(),
        expense_count: expenses.len(),
    }
}

pub async fn financial_summary(
    db: &DatabaseConnection,
    claims: &Claims,
    vehicle_id: Uuid,
    period: &PeriodQuery,
) -> AppResult<FinancialSummary> {
    let earnings = list_earnings(db, claims, vehicle_id, period).await?;
    let expenses = list_expenses(db, claims, vehicle_id, period).await?;
    Ok(summarize_finances(vehicle_id, &earnings, &expenses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn earning(amount: i64) -> vehicle_earning::Model {
        vehicle_earning::Model {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::nil(),
            amount: Decimal::new(amount, 2),
            earned_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            description: None,
            created_at: Utc::now().into(),
        }
    }

    fn expense(amount: i64) -> vehicle_expense::Model {
        vehicle_expense::Model {
            id: Uuid::new_v4(),
            vehicle_id: Uuid::nil(),
            amount: Decimal::new(amount, 2),
            spent_on: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            category: "fuel".into(),
            description: None,
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_financial_summary_nets_expenses() {
        let summary = summarize_finances(
            Uuid::nil(),
            &[earning(150000), earning(25050)],
            &[expense(60000)],
        );
        assert_eq!(summary.total_earnings, Decimal::new(175050, 2));
        assert_eq!(summary.total_expenses, Decimal::new(60000, 2));
        assert_eq!(summary.net_income, Decimal::new(115050, 2));
        assert_eq!(summary.earning_count, 2);
        assert_eq!(summary.expense_count, 1);
    }

    #[test]
    fn test_financial_summary_empty() {
        let summary = summarize_finances(Uuid::nil(), &[], &[]);
        assert_eq!(summary.net_income, Decimal::ZERO);
    }

    #[test]
    fn test_photo_list_rejects_blank() {
        assert!(photo_list(Some(vec!["https://cdn/a.jpg".into(), " ".into()])).is_err());
        assert_eq!(photo_list(None).unwrap(), serde_json::json!([]));
    }

    #[test]
    fn test_capacity_bounds() {
        assert!(check_capacity(0).is_err());
        assert_eq!(check_capacity(15).unwrap(), 15);
    }
}
