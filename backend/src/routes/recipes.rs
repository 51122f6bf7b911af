//! Recipe routes
//!
//! Reading recipes is public. Writing requires a token, and editing or
//! deleting is restricted to the author. The favorite and shopping
//! cart sub-resources hang off the recipe id, and the aggregated
//! shopping list is served as a PDF download.

use crate::auth::{AuthUser, OptionalAuthUser};
use crate::error::ApiResult;
use crate::services::{CartService, FavoriteService, RecipeService, ShoppingListService};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use platebook_shared::types::{
    CreateRecipeRequest, Page, RecipeListQuery, RecipeResponse, RecipeSummary, UpdateRecipeRequest,
};
use uuid::Uuid;

/// Create recipe routes
pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_recipes).post(create_recipe))
        .route("/download_shopping_cart", get(download_shopping_cart))
        .route(
            "/:id",
            get(get_recipe).patch(update_recipe).delete(delete_recipe),
        )
        .route("/:id/favorite", post(add_favorite).delete(remove_favorite))
        .route(
            "/:id/shopping_cart",
            post(add_to_cart).delete(remove_from_cart),
        )
}

/// GET /api/v1/recipes - Paginated recipe feed, newest first
///
/// Supports ?author=, ?tags= (comma-separated slugs), and, for
/// signed-in callers, ?is_favorited=1 and ?is_in_shopping_cart=1.
async fn list_recipes(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    Query(query): Query<RecipeListQuery>,
) -> ApiResult<Json<Page<RecipeResponse>>> {
    let recipes = RecipeService::list(state.db(), auth.user_id, query).await?;
    Ok(Json(recipes))
}

/// POST /api/v1/recipes - Publish a new recipe
async fn create_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateRecipeRequest>,
) -> ApiResult<(StatusCode, Json<RecipeResponse>)> {
    let recipe = RecipeService::create(state.db(), auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// GET /api/v1/recipes/download_shopping_cart - Shopping list as PDF
///
/// Aggregates the ingredients of every recipe in the caller's cart,
/// summing amounts per (name, unit) pair.
async fn download_shopping_cart(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<impl IntoResponse> {
    let pdf = ShoppingListService::generate(state.db(), auth.user_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"shopping_list.pdf\"",
            ),
        ],
        pdf,
    ))
}

/// GET /api/v1/recipes/:id - Fetch one recipe
async fn get_recipe(
    State(state): State<AppState>,
    auth: OptionalAuthUser,
    Path(recipe_id): Path<Uuid>,
) -> ApiResult<Json<RecipeResponse>> {
    let recipe = RecipeService::get(state.db(), auth.user_id, recipe_id).await?;
    Ok(Json(recipe))
}

/// PATCH /api/v1/recipes/:id - Edit a recipe (author only)
async fn update_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<Uuid>,
    Json(req): Json<UpdateRecipeRequest>,
) -> ApiResult<Json<RecipeResponse>> {
    let recipe = RecipeService::update(state.db(), auth.user_id, recipe_id, req).await?;
    Ok(Json(recipe))
}

/// DELETE /api/v1/recipes/:id - Delete a recipe (author only)
async fn delete_recipe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    RecipeService::delete(state.db(), auth.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/recipes/:id/favorite - Add to favorites
async fn add_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<RecipeSummary>)> {
    let summary = FavoriteService::add(state.db(), auth.user_id, recipe_id).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// DELETE /api/v1/recipes/:id/favorite - Remove from favorites
async fn remove_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    FavoriteService::remove(state.db(), auth.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/recipes/:id/shopping_cart - Add to the shopping cart
async fn add_to_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> ApiResult<(StatusCode, Json<RecipeSummary>)> {
    let summary = CartService::add(state.db(), auth.user_id, recipe_id).await?;
    Ok((StatusCode::CREATED, Json(summary)))
}

/// DELETE /api/v1/recipes/:id/shopping_cart - Remove from the shopping cart
async fn remove_from_cart(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(recipe_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    CartService::remove(state.db(), auth.user_id, recipe_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
