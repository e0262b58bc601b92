use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,       // user id
    pub email: String,
    pub role: UserRole,
    pub tenant_id: Option<Uuid>,
    pub exp: i64,        // expiration timestamp
    pub iat: i64,        // issued at timestamp
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Tenant the caller is bound to; admins may act on any tenant
    pub fn require_tenant(&self) -> AppResult<Uuid> {
        self.tenant_id
            .ok_or_else(|| AppError::Forbidden("No tenant affiliation".to_string()))
    }

    /// Admins pass; everyone else must belong to `tenant_id`
    pub fn ensure_tenant(&self, tenant_id: Uuid) -> AppResult<()> {
        if self.is_admin() || self.tenant_id == Some(tenant_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Record belongs to another tenant".to_string(),
            ))
        }
    }
}

pub fn create_token(
    user_id: Uuid,
    email: &str,
    role: UserRole,
    tenant_id: Option<Uuid>,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let exp = now + Duration::hours(expiration_hours);

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role,
        tenant_id,
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
}

pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_roundtrip_keeps_tenant() {
        let user_id = Uuid::new_v4();
        let tenant_id = Uuid::new_v4();
        let token = create_token(
            user_id,
            "marshal@rank.co.za",
            UserRole::TaxiMarshal,
            Some(tenant_id),
            "secret",
            1,
        )
        .unwrap();

        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, UserRole::TaxiMarshal);
        assert_eq!(claims.tenant_id, Some(tenant_id));
    }

    #[test]
    fn test_wrong_secret_is_unauthorized() {
        let token =
            create_token(Uuid::new_v4(), "a@b.c", UserRole::Owner, None, "one", 1).unwrap();
        let err = verify_token(&token, "two").unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn test_ensure_tenant() {
        let tenant = Uuid::new_v4();
        let mut claims = Claims {
            sub: Uuid::new_v4(),
            email: "staff@rank.co.za".into(),
            role: UserRole::Staff,
            tenant_id: Some(tenant),
            exp: 0,
            iat: 0,
        };
        assert!(claims.ensure_tenant(tenant).is_ok());
        assert!(claims.ensure_tenant(Uuid::new_v4()).is_err());

        claims.role = UserRole::Admin;
        assert!(claims.ensure_tenant(Uuid::new_v4()).is_ok());
    }
}
