//! Tag and ingredient catalog routes
//!
//! Both catalogs are public, read-only, and unpaginated. The recipe
//! editor pulls them in full to populate its pickers; the ingredient
//! list also serves a prefix search for type-ahead.

use crate::error::ApiResult;
use crate::services::CatalogService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use platebook_shared::types::{IngredientResponse, IngredientSearchQuery, TagResponse};

/// Create tag routes
pub fn tag_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tags))
        .route("/:id", get(get_tag))
}

/// Create ingredient routes
pub fn ingredient_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_ingredients))
        .route("/:id", get(get_ingredient))
}

/// GET /api/v1/tags - List all tags
async fn list_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<TagResponse>>> {
    let tags = CatalogService::list_tags(state.db()).await?;
    Ok(Json(tags))
}

/// GET /api/v1/tags/:id - Fetch one tag
async fn get_tag(
    State(state): State<AppState>,
    Path(tag_id): Path<i64>,
) -> ApiResult<Json<TagResponse>> {
    let tag = CatalogService::get_tag(state.db(), tag_id).await?;
    Ok(Json(tag))
}

/// GET /api/v1/ingredients - List ingredients, with optional ?name= prefix search
async fn list_ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientSearchQuery>,
) -> ApiResult<Json<Vec<IngredientResponse>>> {
    let ingredients = CatalogService::list_ingredients(state.db(), query.name.as_deref()).await?;
    Ok(Json(ingredients))
}

/// GET /api/v1/ingredients/:id - Fetch one ingredient
async fn get_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<i64>,
) -> ApiResult<Json<IngredientResponse>> {
    let ingredient = CatalogService::get_ingredient(state.db(), ingredient_id).await?;
    Ok(Json(ingredient))
}
