//! Role specific profiles. A user carries at most one, and which one is
//! decided by their role.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{
    driver_profile, marshal_profile, owner_profile, service_provider_profile, staff_profile,
    taxi_rank,
    user::{self, UserRole},
};
use crate::error::{AppError, AppResult};
use crate::repositories;
use crate::services::{optional, required};
use crate::utils::jwt::Claims;
use crate::utils::marshal_code::generate_marshal_code;

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Profile {
    Owner(owner_profile::Model),
    Driver(driver_profile::Model),
    Staff(staff_profile::Model),
    Marshal(marshal_profile::Model),
    ServiceProvider(service_provider_profile::Model),
    None,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerProfileRequest {
    pub company_name: Option<String>,
    pub id_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverProfileRequest {
    pub license_number: String,
    pub license_expiry: Option<NaiveDate>,
    pub pdp_expiry: Option<NaiveDate>,
    pub is_available: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffProfileRequest {
    pub position: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarshalProfileRequest {
    pub taxi_rank_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProviderProfileRequest {
    pub business_name: String,
    pub service_types: Option<Vec<String>>,
    pub address: Option<String>,
}

/// Which profile kind a role may hold
fn expected_role(kind: &str) -> &'static [UserRole] {
    match kind {
        "owner" => &[UserRole::Owner],
        "driver" => &[UserRole::Driver],
        "staff" => &[UserRole::Staff, UserRole::TaxiRankAdmin],
        "marshal" => &[UserRole::TaxiMarshal],
        "service_provider" => &[UserRole::ServiceProvider, UserRole::Mechanic, UserRole::Shop],
        _ => &[],
    }
}

/// Load the target user and check the caller may edit their `kind` profile
async fn profile_owner(
    db: &DatabaseConnection,
    claims: &Claims,
    user_id: Uuid,
    kind: &str,
) -> AppResult<user::Model> {
    let user = repositories::require::<user::Entity, _>(db, user_id, "User").await?;

    if user.id != claims.sub {
        if !claims.role.is_tenant_manager() {
            return Err(AppError::Forbidden("Cannot edit another user's profile".to_string()));
        }
        match user.tenant_id {
            Some(tenant_id) => claims.ensure_tenant(tenant_id)?,
            None if claims.is_admin() => {}
            None => return Err(AppError::Forbidden("User is outside your tenant".to_string())),
        }
    }

    if !expected_role(kind).contains(&user.role) {
        return Err(AppError::BadRequest(format!(
            "A {:?} user cannot hold a {} profile",
            user.role, kind
        )));
    }

    Ok(user)
}

fn join_service_types(types: Option<Vec<String>>) -> Option<String> {
    let joined = types?
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",");
    Some(joined).filter(|s| !s.is_empty())
}

pub async fn get_profile(db: &DatabaseConnection, claims: &Claims, user_id: Uuid) -> AppResult<Profile> {
    let user = repositories::require::<user::Entity, _>(db, user_id, "User").await?;

    if user.id != claims.sub && !claims.is_admin() {
        match user.tenant_id {
            Some(tenant_id) => claims.ensure_tenant(tenant_id)?,
            None => return Err(AppError::Forbidden("Cannot view this profile".to_string())),
        }
    }

    let profile = match user.role {
        UserRole::Owner => user
            .find_related(owner_profile::Entity)
            .one(db)
            .await?
            .map(Profile::Owner),
        UserRole::Driver => user
            .find_related(driver_profile::Entity)
            .one(db)
            .await?
            .map(Profile::Driver),
        UserRole::Staff | UserRole::TaxiRankAdmin => user
            .find_related(staff_profile::Entity)
            .one(db)
            .await?
            .map(Profile::Staff),
        UserRole::TaxiMarshal => user
            .find_related(marshal_profile::Entity)
            .one(db)
            .await?
            .map(Profile::Marshal),
        UserRole::ServiceProvider | UserRole::Mechanic | UserRole::Shop => user
            .find_related(service_provider_profile::Entity)
            .one(db)
            .await?
            .map(Profile::ServiceProvider),
        UserRole::Passenger | UserRole::Admin => None,
    };

    Ok(profile.unwrap_or(Profile::None))
}

pub async fn upsert_owner_profile(
    db: &DatabaseConnection,
    claims: &Claims,
    user_id: Uuid,
    payload: OwnerProfileRequest,
) -> AppResult<owner_profile::Model> {
    let user = profile_owner(db, claims, user_id, "owner").await?;

    let existing = owner_profile::Entity::find()
        .filter(owner_profile::Column::UserId.eq(user.id))
        .one(db)
        .await?;

    let (mut active, is_new): (owner_profile::ActiveModel, bool) = match existing {
        Some(profile) => (profile.into(), false),
        None => (owner_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            ..Default::default()
        }, true),
    };
    active.company_name = Set(optional(payload.company_name));
    active.id_number = Set(optional(payload.id_number));
    active.address = Set(optional(payload.address));

    let profile = if is_new {
        active.insert(db).await?
    } else {
        active.update(db).await?
    };
    Ok(profile)
}

pub async fn upsert_driver_profile(
    db: &DatabaseConnection,
    claims: &Claims,
    user_id: Uuid,
    payload: DriverProfileRequest,
) -> AppResult<driver_profile::Model> {
    let user = profile_owner(db, claims, user_id, "driver").await?;
    let license_number = required(&payload.license_number, "License number")?;

    let existing = driver_profile::Entity::find()
        .filter(driver_profile::Column::UserId.eq(user.id))
        .one(db)
        .await?;

    let (mut active, is_new): (driver_profile::ActiveModel, bool) = match existing {
        Some(profile) => (profile.into(), false),
        None => (driver_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            is_available: Set(true),
            ..Default::default()
        }, true),
    };
    active.license_number = Set(license_number);
    active.license_expiry = Set(payload.license_expiry);
    active.pdp_expiry = Set(payload.pdp_expiry);
    if let Some(is_available) = payload.is_available {
        active.is_available = Set(is_available);
    }

    let profile = if is_new {
        active.insert(db).await?
    } else {
        active.update(db).await?
    };
    Ok(profile)
}

pub async fn upsert_staff_profile(
    db: &DatabaseConnection,
    claims: &Claims,
    user_id: Uuid,
    payload: StaffProfileRequest,
) -> AppResult<staff_profile::Model> {
    let user = profile_owner(db, claims, user_id, "staff").await?;

    let existing = staff_profile::Entity::find()
        .filter(staff_profile::Column::UserId.eq(user.id))
        .one(db)
        .await?;

    let (mut active, is_new): (staff_profile::ActiveModel, bool) = match existing {
        Some(profile) => (profile.into(), false),
        None => (staff_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            ..Default::default()
        }, true),
    };
    active.position = Set(optional(payload.position));

    let profile = if is_new {
        active.insert(db).await?
    } else {
        active.update(db).await?
    };
    Ok(profile)
}

/// The marshal code is minted once, on first save, and never changes
pub async fn upsert_marshal_profile(
    db: &DatabaseConnection,
    claims: &Claims,
    user_id: Uuid,
    payload: MarshalProfileRequest,
) -> AppResult<marshal_profile::Model> {
    let user = profile_owner(db, claims, user_id, "marshal").await?;

    if let Some(rank_id) = payload.taxi_rank_id {
        repositories::require::<taxi_rank::Entity, _>(db, rank_id, "Taxi rank").await?;
    }

    let existing = marshal_profile::Entity::find()
        .filter(marshal_profile::Column::UserId.eq(user.id))
        .one(db)
        .await?;

    let profile = match existing {
        Some(profile) => {
            let mut active: marshal_profile::ActiveModel = profile.into();
            active.taxi_rank_id = Set(payload.taxi_rank_id);
            active.update(db).await?
        }
        None => {
            let code = generate_marshal_code(&user.first_name, &user.last_name, Utc::now());
            let profile = marshal_profile::ActiveModel {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.id),
                taxi_rank_id: Set(payload.taxi_rank_id),
                marshal_code: Set(code),
                ..Default::default()
            }
            .insert(db)
            .await?;
            tracing::info!(user_id = %user.id, code = %profile.marshal_code, "Marshal code issued");
            profile
        }
    };

    Ok(profile)
}

pub async fn upsert_service_provider_profile(
    db: &DatabaseConnection,
    claims: &Claims,
    user_id: Uuid,
    payload: ServiceProviderProfileRequest,
) -> AppResult<service_provider_profile::Model> {
    let user = profile_owner(db, claims, user_id, "service_provider").await?;
    let business_name = required(&payload.business_name, "Business name")?;

    let existing = service_provider_profile::Entity::find()
        .filter(service_provider_profile::Column::UserId.eq(user.id))
        .one(db)
        .await?;

    let (mut active, is_new): (service_provider_profile::ActiveModel, bool) = match existing {
        Some(profile) => (profile.into(), false),
        None => (service_provider_profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user.id),
            ..Default::default()
        }, true),
    };
    active.business_name = Set(business_name);
    active.service_types = Set(join_service_types(payload.service_types));
    active.address = Set(optional(payload.address));

    let profile = if is_new {
        active.insert(db).await?
    } else {
        active.update(db).await?
    };
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[test]
    fn test_service_types_joined_lowercase() {
        let joined = join_service_types(Some(vec![" Towing".into(), "".into(), "MECHANIC".into()]));
        assert_eq!(joined.as_deref(), Some("towing,mechanic"));
        assert_eq!(join_service_types(Some(vec!["  ".into()])), None);
        assert_eq!(join_service_types(None), None);
    }

    #[test]
    fn test_profile_kind_by_role() {
        assert!(expected_role("marshal").contains(&UserRole::TaxiMarshal));
        assert!(!expected_role("owner").contains(&UserRole::Driver));
        assert!(expected_role("unknown").is_empty());
    }

    #[test]
    fn test_profile_is_tagged() {
        let json = serde_json::to_value(Profile::None).unwrap();
        assert_eq!(json["kind"], "none");
    }

    fn user_with_role(role: UserRole) -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: "someone@example.com".into(),
            password_hash: String::new(),
            first_name: "Lerato".into(),
            last_name: "Mokoena".into(),
            phone: None,
            role,
            tenant_id: None,
            is_active: true,
            created_at: Utc::now().into(),
        }
    }

    fn claims_for(user: &user::Model) -> Claims {
        Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            tenant_id: user.tenant_id,
            exp: 0,
            iat: 0,
        }
    }

    fn owner_request() -> OwnerProfileRequest {
        OwnerProfileRequest {
            company_name: Some("Soweto Cabs".into()),
            id_number: None,
            address: None,
        }
    }

    fn last_statement(db: DatabaseConnection) -> String {
        let log = db.into_transaction_log();
        format!("{:?}", log.last().unwrap())
    }

    #[tokio::test]
    async fn test_first_owner_profile_is_inserted() {
        let owner = user_with_role(UserRole::Owner);
        let stored = owner_profile::Model {
            id: Uuid::new_v4(),
            user_id: owner.id,
            company_name: Some("Soweto Cabs".into()),
            id_number: None,
            address: None,
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![owner.clone()]])
            .append_query_results([Vec::<owner_profile::Model>::new()])
            .append_query_results([vec![stored.clone()]])
            .into_connection();

        let profile = upsert_owner_profile(&db, &claims_for(&owner), owner.id, owner_request())
            .await
            .unwrap();

        assert_eq!(profile, stored);
        assert!(last_statement(db).contains("INSERT INTO"));
    }

    #[tokio::test]
    async fn test_existing_owner_profile_is_updated() {
        let owner = user_with_role(UserRole::Owner);
        let existing = owner_profile::Model {
            id: Uuid::new_v4(),
            user_id: owner.id,
            company_name: None,
            id_number: None,
            address: None,
            created_at: Utc::now().into(),
        };
        let updated = owner_profile::Model {
            company_name: Some("Soweto Cabs".into()),
            ..existing.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![owner.clone()]])
            .append_query_results([vec![existing]])
            .append_query_results([vec![updated.clone()]])
            .into_connection();

        let profile = upsert_owner_profile(&db, &claims_for(&owner), owner.id, owner_request())
            .await
            .unwrap();

        assert_eq!(profile.company_name, updated.company_name);
        let sql = last_statement(db);
        assert!(sql.contains("UPDATE"));
        assert!(!sql.contains("INSERT INTO"));
    }

    #[tokio::test]
    async fn test_first_driver_profile_is_inserted() {
        let driver = user_with_role(UserRole::Driver);
        let stored = driver_profile::Model {
            id: Uuid::new_v4(),
            user_id: driver.id,
            license_number: "GP123".into(),
            license_expiry: None,
            pdp_expiry: None,
            is_available: true,
            created_at: Utc::now().into(),
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![driver.clone()]])
            .append_query_results([Vec::<driver_profile::Model>::new()])
            .append_query_results([vec![stored]])
            .into_connection();

        let profile = upsert_driver_profile(
            &db,
            &claims_for(&driver),
            driver.id,
            DriverProfileRequest {
                license_number: "GP123".into(),
                license_expiry: None,
                pdp_expiry: None,
                is_available: None,
            },
        )
        .await
        .unwrap();

        assert!(profile.is_available);
        assert!(last_statement(db).contains("INSERT INTO"));
    }

    #[tokio::test]
    async fn test_passenger_cannot_hold_driver_profile() {
        let passenger = user_with_role(UserRole::Passenger);
        let user_id = passenger.id;
        let claims = claims_for(&passenger);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![passenger]])
            .into_connection();

        let result = upsert_driver_profile(
            &db,
            &claims,
            user_id,
            DriverProfileRequest {
                license_number: "GP123".into(),
                license_expiry: None,
                pdp_expiry: None,
                is_available: None,
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
