//! User service for authentication, registration and public profiles
//!
//! Password hashing and verification run on the blocking thread pool;
//! the JWT service is passed by reference so its pre-computed keys are
//! reused across requests.

use crate::auth::{JwtService, PasswordService};
use crate::error::ApiError;
use crate::repositories::{CreateUser, SubscriptionRepository, UserRecord, UserRepository};
use platebook_shared::types::{AuthTokens, Page, RegisterRequest, UserResponse};
use platebook_shared::validation::validate_username;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;
use validator::ValidateEmail;

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user and sign them in
    pub async fn register(
        pool: &PgPool,
        jwt_service: &JwtService,
        input: RegisterRequest,
    ) -> Result<AuthTokens, ApiError> {
        if !input.email.validate_email() {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }

        // Rejects empty, overlong and reserved usernames
        validate_username(&input.username).map_err(ApiError::Validation)?;

        if input.password.len() < 8 {
            return Err(ApiError::Validation(
                "Password must be at least 8 characters".to_string(),
            ));
        }

        if UserRepository::email_exists(pool, &input.email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict(
                "A user with this email is already registered.".to_string(),
            ));
        }

        if UserRepository::username_exists(pool, &input.username)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict(
                "A user with this name already exists.".to_string(),
            ));
        }

        // Hash password on blocking thread pool (CPU-intensive)
        let password_hash = PasswordService::hash_async(input.password)
            .await
            .map_err(ApiError::Internal)?;

        let user = UserRepository::create(
            pool,
            CreateUser {
                email: input.email,
                username: input.username,
                first_name: input.first_name,
                last_name: input.last_name,
                password_hash,
            },
        )
        .await
        .map_err(ApiError::Internal)?;

        metrics::counter!("users_registered_total").increment(1);

        Self::issue_tokens(jwt_service, user.id)
    }

    /// Login with email and password
    pub async fn login(
        pool: &PgPool,
        jwt_service: &JwtService,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, ApiError> {
        let user = UserRepository::find_by_email(pool, email)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        // Verify password on blocking thread pool (CPU-intensive)
        let valid = PasswordService::verify_async(password.to_string(), user.password_hash.clone())
            .await
            .map_err(ApiError::Internal)?;

        if !valid {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        Self::issue_tokens(jwt_service, user.id)
    }

    /// Refresh access token using refresh token
    pub async fn refresh_token(
        pool: &PgPool,
        jwt_service: &JwtService,
        refresh_token: &str,
    ) -> Result<AuthTokens, ApiError> {
        let claims = jwt_service
            .validate_refresh_token(refresh_token)
            .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid user ID in token".to_string()))?;

        // Verify user still exists
        let _user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        Self::issue_tokens(jwt_service, user_id)
    }

    /// Profile of the signed-in user
    ///
    /// A subscription to oneself cannot exist, so `is_subscribed`
    /// is always false here.
    pub async fn me(pool: &PgPool, user_id: Uuid) -> Result<UserResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(to_response(&user, false))
    }

    /// Public profile of any user
    pub async fn get_user(
        pool: &PgPool,
        viewer: Option<Uuid>,
        user_id: Uuid,
    ) -> Result<UserResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        let is_subscribed = match viewer {
            Some(viewer_id) => !SubscriptionRepository::followed_ids(pool, viewer_id, &[user.id])
                .await
                .map_err(ApiError::Internal)?
                .is_empty(),
            None => false,
        };

        Ok(to_response(&user, is_subscribed))
    }

    /// Page through all users in registration order
    pub async fn list_users(
        pool: &PgPool,
        viewer: Option<Uuid>,
        page: i64,
        limit: i64,
    ) -> Result<Page<UserResponse>, ApiError> {
        let offset = (page - 1) * limit;

        let count = UserRepository::count(pool)
            .await
            .map_err(ApiError::Internal)?;
        let users = UserRepository::list(pool, limit, offset)
            .await
            .map_err(ApiError::Internal)?;

        let followed: HashSet<Uuid> = match viewer {
            Some(viewer_id) => {
                let ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
                SubscriptionRepository::followed_ids(pool, viewer_id, &ids)
                    .await
                    .map_err(ApiError::Internal)?
                    .into_iter()
                    .collect()
            }
            None => HashSet::new(),
        };

        let results = users
            .iter()
            .map(|u| to_response(u, followed.contains(&u.id)))
            .collect();

        Ok(Page { count, results })
    }

    fn issue_tokens(jwt_service: &JwtService, user_id: Uuid) -> Result<AuthTokens, ApiError> {
        let access_token = jwt_service
            .generate_access_token(user_id)
            .map_err(ApiError::Internal)?;
        let refresh_token = jwt_service
            .generate_refresh_token(user_id)
            .map_err(ApiError::Internal)?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_service.access_token_expiry_secs(),
        })
    }
}

/// Map a user row onto the wire shape
pub(crate) fn to_response(user: &UserRecord, is_subscribed: bool) -> UserResponse {
    UserResponse {
        email: user.email.clone(),
        id: user.id,
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed,
    }
}

#[cfg(test)]
mod tests {
    // Integration tests require database - marked with #[ignore]
}
