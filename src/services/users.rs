use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::{tenant, user::{self, UserRole}};
use crate::error::{AppError, AppResult};
use crate::repositories;
use crate::services::auth::{check_password_strength, normalize_email};
use crate::services::{optional, required};
use crate::utils::jwt::Claims;
use crate::utils::password::hash_password;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<UserRole>,
    pub tenant_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilter {
    pub role: Option<UserRole>,
    pub tenant_id: Option<Uuid>,
}

/// Non-admin managers only touch users of their own tenant and never mint admins
fn check_manager_scope(claims: &Claims, tenant_id: Option<Uuid>, role: UserRole) -> AppResult<()> {
    if claims.is_admin() {
        return Ok(());
    }
    if role == UserRole::Admin {
        return Err(AppError::Forbidden("Only admins can grant the admin role".to_string()));
    }
    match tenant_id {
        Some(id) => claims.ensure_tenant(id),
        None => Err(AppError::Forbidden("Users must belong to your tenant".to_string())),
    }
}

pub async fn create_user(
    db: &DatabaseConnection,
    claims: &Claims,
    payload: CreateUserRequest,
) -> AppResult<user::Model> {
    let tenant_id = payload.tenant_id.or(claims.tenant_id);
    check_manager_scope(claims, tenant_id, payload.role)?;

    let email = normalize_email(&payload.email)?;
    check_password_strength(&payload.password)?;

    if let Some(id) = tenant_id {
        repositories::require::<tenant::Entity, _>(db, id, "Tenant").await?;
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        first_name: Set(required(&payload.first_name, "First name")?),
        last_name: Set(required(&payload.last_name, "Last name")?),
        phone: Set(optional(payload.phone)),
        role: Set(payload.role),
        tenant_id: Set(tenant_id),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(user_id = %user.id, role = ?user.role, created_by = %claims.sub, "User created");
    Ok(user)
}

pub async fn get_user(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<user::Model> {
    let user = repositories::require::<user::Entity, _>(db, id, "User").await?;

    if user.id != claims.sub && !claims.is_admin() {
        match user.tenant_id {
            Some(tenant_id) if claims.role.is_tenant_manager() => claims.ensure_tenant(tenant_id)?,
            _ => return Err(AppError::Forbidden("Cannot view this user".to_string())),
        }
    }

    Ok(user)
}

/// Admins see everyone (optionally filtered); managers only their tenant
pub async fn list_users(
    db: &DatabaseConnection,
    claims: &Claims,
    filter: UserFilter,
) -> AppResult<Vec<user::Model>> {
    let tenant_id = if claims.is_admin() {
        filter.tenant_id
    } else {
        Some(claims.require_tenant()?)
    };

    let mut query = user::Entity::find().order_by_asc(user::Column::LastName);
    if let Some(tenant_id) = tenant_id {
        query = query.filter(user::Column::TenantId.eq(tenant_id));
    }
    if let Some(role) = filter.role {
        query = query.filter(user::Column::Role.eq(role));
    }

    let users = query.all(db).await?;
    Ok(users)
}

pub async fn update_user(
    db: &DatabaseConnection,
    claims: &Claims,
    id: Uuid,
    payload: UpdateUserRequest,
) -> AppResult<user::Model> {
    let user = repositories::require::<user::Entity, _>(db, id, "User").await?;
    let is_self = user.id == claims.sub;

    if !is_self {
        check_manager_scope(claims, user.tenant_id, payload.role.unwrap_or(user.role))?;
    }
    if is_self && (payload.role.is_some() || payload.tenant_id.is_some()) && !claims.is_admin() {
        return Err(AppError::Forbidden("Cannot change your own role or tenant".to_string()));
    }

    let mut active: user::ActiveModel = user.into();

    if let Some(first_name) = payload.first_name {
        active.first_name = Set(required(&first_name, "First name")?);
    }
    if let Some(last_name) = payload.last_name {
        active.last_name = Set(required(&last_name, "Last name")?);
    }
    if payload.phone.is_some() {
        active.phone = Set(optional(payload.phone));
    }
    if let Some(role) = payload.role {
        active.role = Set(role);
    }
    if let Some(tenant_id) = payload.tenant_id {
        check_manager_scope(claims, Some(tenant_id), UserRole::Passenger)?;
        repositories::require::<tenant::Entity, _>(db, tenant_id, "Tenant").await?;
        active.tenant_id = Set(Some(tenant_id));
    }

    Ok(active.update(db).await?)
}

pub async fn set_active(
    db: &DatabaseConnection,
    claims: &Claims,
    id: Uuid,
    is_active: bool,
) -> AppResult<user::Model> {
    let user = repositories::require::<user::Entity, _>(db, id, "User").await?;
    if user.id == claims.sub {
        return Err(AppError::BadRequest("Cannot change your own active flag".to_string()));
    }
    check_manager_scope(claims, user.tenant_id, user.role)?;

    let mut active: user::ActiveModel = user.into();
    active.is_active = Set(is_active);
    let updated = active.update(db).await?;

    tracing::info!(user_id = %updated.id, is_active, "User activation changed");
    Ok(updated)
}

/// Profiles, messages and requests of the user go with it (FK cascade)
pub async fn delete_user(db: &DatabaseConnection, claims: &Claims, id: Uuid) -> AppResult<()> {
    let user = repositories::require::<user::Entity, _>(db, id, "User").await?;
    if user.id == claims.sub {
        return Err(AppError::BadRequest("Cannot delete your own account".to_string()));
    }
    check_manager_scope(claims, user.tenant_id, user.role)?;

    repositories::delete_by_id::<user::Entity, _>(db, id, "User").await?;
    tracing::info!(user_id = %id, deleted_by = %claims.sub, "User deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: UserRole, tenant_id: Option<Uuid>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            email: "manager@example.com".into(),
            role,
            tenant_id,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_staff_cannot_create_admin() {
        let tenant = Uuid::new_v4();
        let staff = claims(UserRole::Staff, Some(tenant));
        assert!(check_manager_scope(&staff, Some(tenant), UserRole::Admin).is_err());
        assert!(check_manager_scope(&staff, Some(tenant), UserRole::TaxiMarshal).is_ok());
    }

    #[test]
    fn test_staff_confined_to_own_tenant() {
        let staff = claims(UserRole::Staff, Some(Uuid::new_v4()));
        assert!(check_manager_scope(&staff, Some(Uuid::new_v4()), UserRole::Driver).is_err());
        assert!(check_manager_scope(&staff, None, UserRole::Driver).is_err());
    }

    #[test]
    fn test_admin_unrestricted() {
        let admin = claims(UserRole::Admin, None);
        assert!(check_manager_scope(&admin, None, UserRole::Admin).is_ok());
    }
}
