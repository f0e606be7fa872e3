//! Identity middleware
//!
//! Verifies the bearer token issued by the external identity provider and
//! upserts the caller into the user collection. Every authenticated request
//! therefore refreshes the caller's profile and `last_active`, and the role
//! is re-derived from the reserved administrator email on each sign-in.

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::User,
    services::UserService,
    state::AppState,
};

/// Claims carried by the identity provider's token
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Stable user id
    pub sub: String,
    pub email: String,
    /// Display name
    pub name: String,
    pub exp: i64,
}

/// The authenticated caller, as stored in this service
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Verify a provider token and extract its claims
pub fn verify_token(token: &str, secret: &str, leeway_seconds: u64) -> AppResult<Claims> {
    let mut validation = Validation::default();
    validation.leeway = leeway_seconds;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}

/// Identity middleware for the authenticated route group
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            debug!(path = %path, "auth failed: no Authorization header");
            AppError::Unauthorized
        })?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        debug!(path = %path, "auth failed: Authorization is not a bearer token");
        AppError::Unauthorized
    })?;

    let claims = verify_token(
        token,
        &state.config().auth.jwt_secret,
        state.config().auth.leeway_seconds,
    )?;

    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| {
        debug!(path = %path, sub = %claims.sub, "auth failed: subject is not a uuid");
        AppError::InvalidToken
    })?;

    let user = UserService::ensure_user(
        state.store(),
        state.mirror(),
        user_id,
        &claims.email,
        &claims.name,
        &state.config().admin.email,
    )
    .await?;

    debug!(path = %path, user_id = %user.id, role = %user.role, "caller authenticated");
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret";

    fn token_with_exp(exp: i64) -> String {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice".to_string(),
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_valid_token_round_trips() {
        let token = token_with_exp(Utc::now().timestamp() + 3600);
        let claims = verify_token(&token, SECRET, 0).unwrap();
        assert_eq!(claims.email, "alice@example.com");
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = token_with_exp(Utc::now().timestamp() - 3600);
        let result = verify_token(&token, SECRET, 0);
        assert!(matches!(result, Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_leeway_tolerates_slight_clock_skew() {
        let token = token_with_exp(Utc::now().timestamp() - 10);
        assert!(verify_token(&token, SECRET, 0).is_err());
        assert!(verify_token(&token, SECRET, 30).is_ok());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = token_with_exp(Utc::now().timestamp() + 3600);
        let result = verify_token(&token, "other-secret", 0);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
