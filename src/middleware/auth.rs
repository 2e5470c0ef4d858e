use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::auth::Claims,
    error::{AppError, AppResult},
};

/// Identity decoded from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub is_admin: bool,
}

/// An [`AuthUser`] that also carries the admin flag.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthUser);

pub fn ensure_admin(user: &AuthUser) -> Result<(), AppError> {
    if !user.is_admin {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Owner of a resource, or any admin.
pub fn ensure_owner_or_admin(user: &AuthUser, owner_id: Uuid) -> Result<(), AppError> {
    if user.user_id != owner_id && !user.is_admin {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

pub fn issue_token(config: &AppConfig, user_id: Uuid, is_admin: bool) -> AppResult<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.jwt_ttl_hours))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("Failed to set expiration")))?;

    let claims = Claims {
        sub: user_id.to_string(),
        is_admin,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
}

/// Verify signature and expiry of `token` and return its identity.
pub fn verify_token(config: &AppConfig, token: &str) -> AppResult<AuthUser> {
    let decoded = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|err| {
        tracing::warn!(error = %err, "rejected bearer token");
        AppError::Unauthorized("Token is not valid".into())
    })?;

    let user_id = Uuid::parse_str(&decoded.claims.sub)
        .map_err(|_| AppError::Unauthorized("Token is not valid".into()))?;

    Ok(AuthUser {
        user_id,
        is_admin: decoded.claims.is_admin,
    })
}

fn bearer_token(parts: &Parts) -> AppResult<&str> {
    let auth_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthorized("No token, authorization denied".into()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Invalid Authorization header".into()))?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::Unauthorized("No token, authorization denied".into()))
}

impl<S> FromRequestParts<S> for AuthUser
where
    Arc<AppConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<AppConfig>::from_ref(state);
        let token = bearer_token(parts)?;
        verify_token(&config, token)
    }
}

impl<S> FromRequestParts<S> for AdminUser
where
    Arc<AppConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        ensure_admin(&user)?;
        Ok(AdminUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 0,
            jwt_secret: "unit-test-secret".into(),
            jwt_ttl_hours: 24,
            cors_origin: None,
        }
    }

    #[test]
    fn issued_token_verifies_with_same_secret() {
        let config = config();
        let user_id = Uuid::new_v4();
        let token = issue_token(&config, user_id, true).expect("token");

        let user = verify_token(&config, &token).expect("valid token");
        assert_eq!(user.user_id, user_id);
        assert!(user.is_admin);
    }

    #[test]
    fn token_signed_with_other_secret_is_unauthorized() {
        let config = config();
        let token = issue_token(&config, Uuid::new_v4(), false).expect("token");

        let other = AppConfig {
            jwt_secret: "another-secret".into(),
            ..config
        };
        let err = verify_token(&other, &token).expect_err("must be rejected");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn expired_token_is_unauthorized() {
        let config = config();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            is_admin: false,
            exp: (Utc::now() - Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
        )
        .expect("encode");

        let err = verify_token(&config, &token).expect_err("must be rejected");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn owner_or_admin_gate() {
        let owner = Uuid::new_v4();
        let stranger = AuthUser {
            user_id: Uuid::new_v4(),
            is_admin: false,
        };
        let admin = AuthUser {
            user_id: Uuid::new_v4(),
            is_admin: true,
        };
        let me = AuthUser {
            user_id: owner,
            is_admin: false,
        };

        assert!(ensure_owner_or_admin(&me, owner).is_ok());
        assert!(ensure_owner_or_admin(&admin, owner).is_ok());
        assert!(matches!(
            ensure_owner_or_admin(&stranger, owner),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(ensure_admin(&me), Err(AppError::Forbidden)));
    }
}
