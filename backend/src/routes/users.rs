//! User directory and subscription routes
//!
//! Listing and profile endpoints are public; the is_subscribed flag in
//! their responses is only meaningful when the caller sends a valid
//! token. Subscription management always requires one.

use crate::auth::{AuthUser, OptionalAuthUser};
use crate::error::ApiResult;
use crate::services::{SubscriptionService, UserService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use platebook_shared::types::{Page, Pagination, SubscriptionQuery, SubscriptionView, UserResponse};
use uuid::Uuid;

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/subscriptions", get(list_subscriptions))
        .route("/:id", get(get_user))
        .route("/:id/subscribe", post(subscribe).delete(unsubscribe))
}

/// GET /api/v1/users - Paginated user directory
async fn list_users(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<Page<UserResponse>>> {
    let (page, limit) = pagination.normalize();
    let users = UserService::list_users(state.db(), auth.user_id, page, limit).await?;
    Ok(Json(users))
}

/// GET /api/v1/users/subscriptions - Authors the caller follows, with recent recipes
async fn list_subscriptions(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<SubscriptionQuery>,
) -> ApiResult<Json<Page<SubscriptionView>>> {
    let (page, limit) = query.pagination().normalize();
    let subscriptions = SubscriptionService::subscriptions(
        state.db(),
        auth.user_id,
        query.recipes_limit(),
        page,
        limit,
    )
    .await?;
    Ok(Json(subscriptions))
}

/// GET /api/v1/users/:id - Public profile of one user
async fn get_user(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::get_user(state.db(), auth.user_id, user_id).await?;
    Ok(Json(user))
}

/// POST /api/v1/users/:id/subscribe - Follow an author
///
/// Responds 201 with the author's profile and their most recent
/// recipes, trimmed to ?recipes_limit=.
async fn subscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
    Query(query): Query<SubscriptionQuery>,
) -> ApiResult<(StatusCode, Json<SubscriptionView>)> {
    let view = SubscriptionService::follow(
        state.db(),
        auth.user_id,
        user_id,
        query.recipes_limit(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /api/v1/users/:id/subscribe - Unfollow an author
async fn unsubscribe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    SubscriptionService::unfollow(state.db(), auth.user_id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
