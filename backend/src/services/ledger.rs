//! Favorite and shopping cart services
//!
//! Both ledgers behave identically apart from their wording: adding
//! returns a compact recipe summary, adding twice is an error, and
//! removing an absent entry is an error.

use crate::error::ApiError;
use crate::repositories::{CartRepository, FavoriteRepository, RecipeRecord, RecipeRepository};
use platebook_shared::types::RecipeSummary;
use sqlx::PgPool;
use uuid::Uuid;

/// Favorites service
pub struct FavoriteService;

impl FavoriteService {
    /// Add a recipe to the user's favorites
    pub async fn add(
        db: &PgPool,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<RecipeSummary, ApiError> {
        let recipe = RecipeRepository::find_by_id(db, recipe_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

        let inserted = FavoriteRepository::add(db, user_id, recipe_id)
            .await
            .map_err(ApiError::Internal)?;

        if !inserted {
            return Err(ApiError::Conflict(
                "You can not add a recipe to favorites again.".to_string(),
            ));
        }

        metrics::counter!("favorites_added_total").increment(1);

        Ok(to_summary(recipe))
    }

    /// Remove a recipe from the user's favorites
    ///
    /// An unknown recipe is a 404; a known recipe that was never
    /// favorited is a 400.
    pub async fn remove(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<(), ApiError> {
        RecipeRepository::find_by_id(db, recipe_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

        let removed = FavoriteRepository::remove(db, user_id, recipe_id)
            .await
            .map_err(ApiError::Internal)?;

        if !removed {
            return Err(ApiError::BadRequest(
                "This recipe is not in your favorites.".to_string(),
            ));
        }

        Ok(())
    }
}

/// Shopping cart service
pub struct CartService;

impl CartService {
    /// Add a recipe to the user's shopping cart
    pub async fn add(
        db: &PgPool,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<RecipeSummary, ApiError> {
        let recipe = RecipeRepository::find_by_id(db, recipe_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

        let inserted = CartRepository::add(db, user_id, recipe_id)
            .await
            .map_err(ApiError::Internal)?;

        if !inserted {
            return Err(ApiError::Conflict(
                "You cannot add a prescription to the shopping list again.".to_string(),
            ));
        }

        metrics::counter!("cart_added_total").increment(1);

        Ok(to_summary(recipe))
    }

    /// Remove a recipe from the user's shopping cart
    ///
    /// An unknown recipe is a 404; a known recipe that is not in the
    /// cart is a 400.
    pub async fn remove(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<(), ApiError> {
        RecipeRepository::find_by_id(db, recipe_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

        let removed = CartRepository::remove(db, user_id, recipe_id)
            .await
            .map_err(ApiError::Internal)?;

        if !removed {
            return Err(ApiError::BadRequest(
                "This recipe is not on your shopping list.".to_string(),
            ));
        }

        Ok(())
    }
}

/// Map a recipe row onto the compact wire shape
pub(crate) fn to_summary(recipe: RecipeRecord) -> RecipeSummary {
    RecipeSummary {
        id: recipe.id,
        name: recipe.name,
        image: recipe.image,
        cooking_time: recipe.cooking_time,
    }
}
