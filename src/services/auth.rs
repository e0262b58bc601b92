use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::entities::tenant;
use crate::entities::user::{self, UserRole};
use crate::error::{AppError, AppResult};
use crate::services::{optional, required};
use crate::utils::jwt::create_token;
use crate::utils::password::{hash_password, verify_password};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// Defaults to passenger
    pub role: Option<UserRole>,
    /// Join an existing tenant by its code
    pub tenant_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub tenant_id: Option<Uuid>,
}

impl From<user::Model> for UserInfo {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            role: u.role,
            tenant_id: u.tenant_id,
        }
    }
}

pub(crate) fn normalize_email(email: &str) -> AppResult<String> {
    let email = required(email, "Email")?.to_lowercase();
    if !email.contains('@') {
        return Err(AppError::BadRequest("Email is not valid".to_string()));
    }
    Ok(email)
}

pub(crate) fn check_password_strength(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn issue(config: &Config, user: user::Model) -> AppResult<AuthResponse> {
    let token = create_token(
        user.id,
        &user.email,
        user.role,
        user.tenant_id,
        &config.jwt_secret,
        config.jwt_expiration_hours,
    )?;

    Ok(AuthResponse {
        token,
        user: user.into(),
    })
}

/// Self-registration; privileged roles are only handed out by admins
pub async fn register(
    db: &DatabaseConnection,
    config: &Config,
    payload: RegisterRequest,
) -> AppResult<AuthResponse> {
    let email = normalize_email(&payload.email)?;
    check_password_strength(&payload.password)?;
    let first_name = required(&payload.first_name, "First name")?;
    let last_name = required(&payload.last_name, "Last name")?;

    let role = payload.role.unwrap_or(UserRole::Passenger);
    if !role.is_self_service() {
        return Err(AppError::Forbidden(format!(
            "Role {:?} cannot be self-registered",
            role
        )));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let tenant_id = match optional(payload.tenant_code) {
        Some(code) => {
            let tenant = tenant::Entity::find()
                .filter(tenant::Column::Code.eq(code.to_uppercase()))
                .one(db)
                .await?
                .ok_or_else(|| AppError::BadRequest("Unknown tenant code".to_string()))?;
            Some(tenant.id)
        }
        None => None,
    };

    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(hash_password(&payload.password)?),
        first_name: Set(first_name),
        last_name: Set(last_name),
        phone: Set(optional(payload.phone)),
        role: Set(role),
        tenant_id: Set(tenant_id),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(user_id = %user.id, role = ?user.role, "User registered");
    issue(config, user)
}

pub async fn login(
    db: &DatabaseConnection,
    config: &Config,
    payload: LoginRequest,
) -> AppResult<AuthResponse> {
    let email = payload.email.trim().to_lowercase();

    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid email or password".to_string()))?;

    if !verify_password(&payload.password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Failed login attempt");
        return Err(AppError::Unauthorized("Invalid email or password".to_string()));
    }

    if !user.is_active {
        return Err(AppError::Forbidden("Account is disabled".to_string()));
    }

    issue(config, user)
}

/// Create the configured admin account when it does not exist yet
pub async fn seed_admin(db: &DatabaseConnection, config: &Config) -> AppResult<()> {
    let admin_email = normalize_email(&config.admin_email)?;

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&admin_email))
        .one(db)
        .await?;

    if existing.is_none() {
        user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(admin_email.clone()),
            password_hash: Set(hash_password(&config.admin_password)?),
            first_name: Set("System".to_string()),
            last_name: Set("Admin".to_string()),
            phone: Set(None),
            role: Set(UserRole::Admin),
            tenant_id: Set(None),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await?;

        tracing::info!("Admin account created: {}", admin_email);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn config() -> Config {
        Config {
            database_url: String::new(),
            jwt_secret: "test-secret".into(),
            jwt_expiration_hours: 1,
            server_host: "127.0.0.1".into(),
            server_port: 0,
            cors_allowed_origins: vec![],
            admin_email: "admin@taxirank.local".into(),
            admin_password: "admin123".into(),
        }
    }

    fn register_request(role: Option<UserRole>) -> RegisterRequest {
        RegisterRequest {
            email: "Lerato@Example.com".into(),
            password: "long-enough".into(),
            first_name: "Lerato".into(),
            last_name: "Dlamini".into(),
            phone: None,
            role,
            tenant_code: None,
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" A@B.com ").unwrap(), "a@b.com");
        assert!(normalize_email("no-at-sign").is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(check_password_strength("short").is_err());
        assert!(check_password_strength("12345678").is_ok());
    }

    #[tokio::test]
    async fn test_register_refuses_admin_role() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let err = register(&db, &config(), register_request(Some(UserRole::Admin)))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let err = login(
            &db,
            &config(),
            LoginRequest {
                email: "nobody@example.com".into(),
                password: "whatever1".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn test_login_issues_token() {
        let cfg = config();
        let stored = user::Model {
            id: Uuid::new_v4(),
            email: "owner@example.com".into(),
            password_hash: hash_password("correct-horse").unwrap(),
            first_name: "Sipho".into(),
            last_name: "Nkosi".into(),
            phone: None,
            role: UserRole::Owner,
            tenant_id: None,
            is_active: true,
            created_at: chrono::Utc::now().fixed_offset(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![stored.clone()]])
            .into_connection();

        let response = login(
            &db,
            &cfg,
            LoginRequest {
                email: "OWNER@example.com".into(),
                password: "correct-horse".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(response.user.id, stored.id);
        let claims = crate::utils::jwt::verify_token(&response.token, &cfg.jwt_secret).unwrap();
        assert_eq!(claims.role, UserRole::Owner);
    }
}
