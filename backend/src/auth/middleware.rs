//! Authentication extractors
//!
//! Handlers declare the access level they need through two extractors:
//! `AuthUser` rejects requests without a valid access token, while
//! `OptionalAuthUser` lets anonymous readers through and records who is
//! asking when a valid token is present.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

/// Authenticated user extracted from a JWT access token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = bearer_token(parts)?;

        let claims = app_state
            .jwt()
            .validate_access_token(token)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid token: {}", e)))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        Ok(AuthUser { user_id })
    }
}

/// Possibly-authenticated user for endpoints that also serve
/// anonymous readers.
///
/// Extraction never rejects: a missing, malformed or invalid
/// Authorization header simply yields `user_id: None`.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser {
    pub user_id: Option<Uuid>,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for OptionalAuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let user_id = bearer_token(parts)
            .ok()
            .and_then(|token| app_state.jwt().validate_access_token(token).ok())
            .and_then(|claims| Uuid::parse_str(&claims.sub).ok());

        Ok(OptionalAuthUser { user_id })
    }
}

/// Pull the bearer token out of the Authorization header.
fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))
}
