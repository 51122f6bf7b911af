//! Catalog read service
//!
//! Tags and ingredients form a fixed reference catalog maintained by
//! the seeding binary. The API only reads it.

use crate::error::ApiError;
use crate::repositories::{IngredientRecord, IngredientRepository, TagRecord, TagRepository};
use platebook_shared::types::{IngredientResponse, TagResponse};
use sqlx::PgPool;

/// Read-only access to the tag and ingredient catalogs
pub struct CatalogService;

impl CatalogService {
    /// List every tag, ordered by name
    pub async fn list_tags(db: &PgPool) -> Result<Vec<TagResponse>, ApiError> {
        let tags = TagRepository::list(db).await.map_err(ApiError::Internal)?;
        Ok(tags.into_iter().map(tag_response).collect())
    }

    /// Fetch a single tag
    pub async fn get_tag(db: &PgPool, tag_id: i64) -> Result<TagResponse, ApiError> {
        let tag = TagRepository::find_by_id(db, tag_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

        Ok(tag_response(tag))
    }

    /// List ingredients, narrowed to a name prefix when one is given
    pub async fn list_ingredients(
        db: &PgPool,
        name: Option<&str>,
    ) -> Result<Vec<IngredientResponse>, ApiError> {
        let ingredients = match name {
            Some(prefix) if !prefix.is_empty() => {
                IngredientRepository::search_by_prefix(db, prefix).await
            }
            _ => IngredientRepository::list(db).await,
        }
        .map_err(ApiError::Internal)?;

        Ok(ingredients.into_iter().map(ingredient_response).collect())
    }

    /// Fetch a single ingredient
    pub async fn get_ingredient(
        db: &PgPool,
        ingredient_id: i64,
    ) -> Result<IngredientResponse, ApiError> {
        let ingredient = IngredientRepository::find_by_id(db, ingredient_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Ingredient not found".to_string()))?;

        Ok(ingredient_response(ingredient))
    }
}

fn tag_response(tag: TagRecord) -> TagResponse {
    TagResponse {
        id: tag.id,
        name: tag.name,
        color: tag.color,
        slug: tag.slug,
    }
}

fn ingredient_response(ingredient: IngredientRecord) -> IngredientResponse {
    IngredientResponse {
        id: ingredient.id,
        name: ingredient.name,
        measurement_unit: ingredient.measurement_unit,
    }
}
