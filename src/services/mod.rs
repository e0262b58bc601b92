//! Command and query handlers.
//!
//! Every use case has the same shape: check the required input, make one or
//! a few repository calls, then map the entity into the response DTO.

pub mod auth;
pub mod dashboard;
pub mod messages;
pub mod profiles;
pub mod rentals;
pub mod roadside;
pub mod routes;
pub mod schedules;
pub mod taxi_ranks;
pub mod tenants;
pub mod tenders;
pub mod tracking_devices;
pub mod trips;
pub mod users;
pub mod vehicles;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::utils::jwt::Claims;

/// Trim and reject a blank required text field
pub(crate) fn required(value: &str, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}

/// Blank optional text collapses to None
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn non_negative(amount: Decimal, field: &str) -> AppResult<Decimal> {
    if amount.is_sign_negative() {
        return Err(AppError::BadRequest(format!("{} cannot be negative", field)));
    }
    Ok(amount)
}

/// Admins, or a manager belonging to `tenant_id`
pub(crate) fn ensure_manager(claims: &Claims, tenant_id: Uuid) -> AppResult<()> {
    if !claims.role.is_tenant_manager() {
        return Err(AppError::Forbidden("Manager role required".to_string()));
    }
    claims.ensure_tenant(tenant_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::user::UserRole;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("  Bree Rank ", "name").unwrap(), "Bree Rank");
        assert!(matches!(required("   ", "name"), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_optional_blank_is_none() {
        assert_eq!(optional(Some("  ".into())), None);
        assert_eq!(optional(Some(" x ".into())), Some("x".into()));
        assert_eq!(optional(None), None);
    }

    #[test]
    fn test_non_negative() {
        assert!(non_negative(Decimal::new(-1, 2), "fare").is_err());
        assert!(non_negative(Decimal::ZERO, "fare").is_ok());
    }

    #[test]
    fn test_ensure_manager() {
        let tenant = Uuid::new_v4();
        let mut claims = Claims {
            sub: Uuid::new_v4(),
            email: "staff@example.com".into(),
            role: UserRole::Staff,
            tenant_id: Some(tenant),
            exp: 0,
            iat: 0,
        };
        assert!(ensure_manager(&claims, tenant).is_ok());
        assert!(ensure_manager(&claims, Uuid::new_v4()).is_err());

        claims.role = UserRole::Driver;
        assert!(matches!(ensure_manager(&claims, tenant), Err(AppError::Forbidden(_))));
    }
}
