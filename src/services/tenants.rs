use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::tenant::{self, TenantType};
use crate::error::{AppError, AppResult};
use crate::repositories;
use crate::services::{optional, required};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub name: String,
    pub code: String,
    pub tenant_type: TenantType,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub tenant_type: Option<TenantType>,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

/// Tenant codes are compared upper-cased
fn normalize_code(code: &str) -> AppResult<String> {
    Ok(required(code, "Code")?.to_uppercase())
}

pub async fn create_tenant(
    db: &DatabaseConnection,
    payload: CreateTenantRequest,
) -> AppResult<tenant::Model> {
    let name = required(&payload.name, "Name")?;
    let code = normalize_code(&payload.code)?;

    let existing = tenant::Entity::find()
        .filter(tenant::Column::Code.eq(&code))
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict(format!("Tenant code {} already in use", code)));
    }

    let tenant = tenant::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        code: Set(code),
        tenant_type: Set(payload.tenant_type),
        contact_person: Set(optional(payload.contact_person)),
        email: Set(optional(payload.email)),
        phone: Set(optional(payload.phone)),
        address: Set(optional(payload.address)),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(tenant_id = %tenant.id, code = %tenant.code, "Tenant created");
    Ok(tenant)
}

pub async fn get_tenant(db: &DatabaseConnection, id: Uuid) -> AppResult<tenant::Model> {
    repositories::require::<tenant::Entity, _>(db, id, "Tenant").await
}

pub async fn list_tenants(db: &DatabaseConnection) -> AppResult<Vec<tenant::Model>> {
    Ok(tenant::Entity::find()
        .order_by_asc(tenant::Column::Name)
        .all(db)
        .await?)
}

pub async fn update_tenant(
    db: &DatabaseConnection,
    id: Uuid,
    payload: UpdateTenantRequest,
) -> AppResult<tenant::Model> {
    let tenant = get_tenant(db, id).await?;
    let mut active: tenant::ActiveModel = tenant.into();

    if let Some(name) = payload.name {
        active.name = Set(required(&name, "Name")?);
    }
    if let Some(tenant_type) = payload.tenant_type {
        active.tenant_type = Set(tenant_type);
    }
    if payload.contact_person.is_some() {
        active.contact_person = Set(optional(payload.contact_person));
    }
    if payload.email.is_some() {
        active.email = Set(optional(payload.email));
    }
    if payload.phone.is_some() {
        active.phone = Set(optional(payload.phone));
    }
    if payload.address.is_some() {
        active.address = Set(optional(payload.address));
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }

    Ok(active.update(db).await?)
}

/// Users, routes, ranks and associations go with the tenant (FK cascade)
pub async fn delete_tenant(db: &DatabaseConnection, id: Uuid) -> AppResult<()> {
    repositories::delete_by_id::<tenant::Entity, _>(db, id, "Tenant").await?;
    tracing::info!(tenant_id = %id, "Tenant deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn sample_tenant(code: &str) -> tenant::Model {
        tenant::Model {
            id: Uuid::new_v4(),
            name: "Soweto Taxi Association".into(),
            code: code.into(),
            tenant_type: TenantType::Association,
            contact_person: None,
            email: None,
            phone: None,
            address: None,
            is_active: true,
            created_at: Utc::now().fixed_offset(),
        }
    }

    fn create_request(code: &str) -> CreateTenantRequest {
        CreateTenantRequest {
            name: "Soweto Taxi Association".into(),
            code: code.into(),
            tenant_type: TenantType::Association,
            contact_person: None,
            email: None,
            phone: None,
            address: None,
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code(" sta ").unwrap(), "STA");
        assert!(normalize_code("").is_err());
    }

    #[tokio::test]
    async fn test_create_tenant_rejects_duplicate_code() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![sample_tenant("STA")]])
            .into_connection();

        let err = create_tenant(&db, create_request("sta")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_create_tenant_inserts() {
        let created = sample_tenant("STA");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<tenant::Model>::new()])
            .append_query_results([vec![created.clone()]])
            .into_connection();

        let tenant = create_tenant(&db, create_request("sta")).await.unwrap();
        assert_eq!(tenant.code, "STA");
    }

    #[tokio::test]
    async fn test_get_missing_tenant_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<tenant::Model>::new()])
            .into_connection();

        let err = get_tenant(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_tenant_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = delete_tenant(&db, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
