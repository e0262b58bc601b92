use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{
    roadside_assistance_request::{self, AssistanceStatus},
    user::{self, UserRole},
};
use crate::error::{AppError, AppResult};
use crate::repositories;
use crate::services::vehicles::load_vehicle;
use crate::services::{optional, required};
use crate::utils::geo::is_valid_coordinate;
use crate::utils::jwt::Claims;
use crate::utils::transitions::ensure_transition;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssistanceRequest {
    pub vehicle_id: Option<Uuid>,
    pub assistance_type: String,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignProviderRequest {
    /// Defaults to the calling provider picking the job up
    pub provider_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateAssistanceStatusRequest {
    pub status: AssistanceStatus,
}

fn can_assist(role: UserRole) -> bool {
    matches!(role, UserRole::ServiceProvider | UserRole::Mechanic)
}

pub async fn create_request(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: CreateAssistanceRequest,
) -> AppResult<roadside_assistance_request::Model> {
    if let Some(vehicle_id) = payload.vehicle_id {
        load_vehicle(db, claims, vehicle_id).await?;
    }
    if let (Some(lat), Some(lng)) = (payload.latitude, payload.longitude) {
        if !is_valid_coordinate(lat, lng) {
            return Err(AppError::BadRequest("Coordinates out of range".to_string()));
        }
    }

    let request = roadside_assistance_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        requester_id: Set(claims.sub),
        vehicle_id: Set(payload.vehicle_id),
        assistance_type: Set(required(&payload.assistance_type, "Assistance type")?.to_lowercase()),
        location: Set(required(&payload.location, "Location")?),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        description: Set(optional(payload.description)),
        status: Set(AssistanceStatus::Pending),
        assigned_provider_id: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(request_id = %request.id, kind = %request.assistance_type, "Roadside assistance requested");
    Ok(request)
}

/// Requests the caller raised, or was assigned as provider
pub async fn list_mine(
    db: &DatabaseConnection,
    claims: &Claims,
) -> AppResult<Vec<roadside_assistance_request::Model>> {
    let column = if can_assist(claims.role) {
        roadside_assistance_request::Column::AssignedProviderId
    } else {
        roadside_assistance_request::Column::RequesterId
    };

    Ok(roadside_assistance_request::Entity::find()
        .filter(column.eq(claims.sub))
        .order_by_desc(roadside_assistance_request::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn list_open(
    db: &DatabaseConnection,
    claims: &Claims,
) -> AppResult<Vec<roadside_assistance_request::Model>> {
    if !can_assist(claims.role) && !claims.is_admin() {
        return Err(AppError::Forbidden("Only service providers can browse open requests".to_string()));
    }

    Ok(roadside_assistance_request::Entity::find()
        .filter(roadside_assistance_request::Column::Status.eq(AssistanceStatus::Pending))
        .order_by_asc(roadside_assistance_request::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn assign_provider(
    db: &DatabaseConnection,
    claims: &Claims,
    id: Uuid,
    payload: AssignProviderRequest,
) -> AppResult<roadside_assistance_request::Model> {
    let request =
        repositories::require::<roadside_assistance_request::Entity, _>(db, id, "Assistance request").await?;

    let provider_id = match payload.provider_id {
        Some(provider_id) if claims.is_admin() || provider_id == claims.sub => provider_id,
        Some(_) => return Err(AppError::Forbidden("Only admins can assign other providers".to_string())),
        None => claims.sub,
    };
    let provider = repositories::require::<user::Entity, _>(db, provider_id, "Provider").await?;
    if !can_assist(provider.role) {
        return Err(AppError::BadRequest("Assigned user is not a service provider".to_string()));
    }

    ensure_transition("Assistance request", request.status, AssistanceStatus::Assigned)?;

    let mut active: roadside_assistance_request::ActiveModel = request.into();
    active.status = Set(AssistanceStatus::Assigned);
    active.assigned_provider_id = Set(Some(provider.id));
    let request = active.update(db).await?;

    tracing::info!(request_id = %request.id, provider_id = %provider.id, "Roadside provider assigned");
    Ok(request)
}

/// The requester may only cancel; the assigned provider drives the rest
pub async fn update_status(
    db: &DatabaseConnection,
    claims: &Claims,
    id: Uuid,
    payload: UpdateAssistanceStatusRequest,
) -> AppResult<roadside_assistance_request::Model> {
    let request =
        repositories::require::<roadside_assistance_request::Entity, _>(db, id, "Assistance request").await?;

    let is_requester = request.requester_id == claims.sub;
    let is_provider = request.assigned_provider_id == Some(claims.sub);
    let allowed = claims.is_admin()
        || is_provider
        || (is_requester && payload.status == AssistanceStatus::Cancelled);
    if !allowed {
        return Err(AppError::Forbidden("Cannot change this request's status".to_string()));
    }
    if payload.status == AssistanceStatus::Assigned {
        return Err(AppError::BadRequest("Use the assign endpoint to assign a provider".to_string()));
    }

    ensure_transition("Assistance request", request.status, payload.status)?;

    let mut active: roadside_assistance_request::ActiveModel = request.into();
    active.status = Set(payload.status);
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn request(requester_id: Uuid, status: AssistanceStatus) -> roadside_assistance_request::Model {
        roadside_assistance_request::Model {
            id: Uuid::new_v4(),
            requester_id,
            vehicle_id: None,
            assistance_type: "tow".into(),
            location: "N1 near Midrand".into(),
            latitude: None,
            longitude: None,
            description: None,
            status,
            assigned_provider_id: None,
            created_at: Utc::now().into(),
        }
    }

    fn claims(sub: Uuid, role: UserRole) -> Claims {
        Claims {
            sub,
            email: "driver@example.com".into(),
            role,
            tenant_id: None,
            exp: 0,
            iat: 0,
        }
    }

    #[tokio::test]
    async fn test_requester_can_only_cancel() {
        let me = Uuid::new_v4();
        let pending = request(me, AssistanceStatus::Pending);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![pending.clone()]])
            .into_connection();

        let result = update_status(
            &db,
            &claims(me, UserRole::Driver),
            pending.id,
            UpdateAssistanceStatusRequest { status: AssistanceStatus::Completed },
        )
        .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_completed_request_cannot_be_cancelled() {
        let me = Uuid::new_v4();
        let done = request(me, AssistanceStatus::Completed);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![done.clone()]])
            .into_connection();

        let result = update_status(
            &db,
            &claims(me, UserRole::Driver),
            done.id,
            UpdateAssistanceStatusRequest { status: AssistanceStatus::Cancelled },
        )
        .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
