//! Ledger repositories - favorites and shopping cart membership
//!
//! Both ledgers are plain (user, recipe) pair tables. Inserts go
//! through ON CONFLICT DO NOTHING so a duplicate add is reported by
//! the row count instead of a constraint error, which also makes
//! concurrent adds of the same pair safe.

use anyhow::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// One aggregated shopping list line
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ShoppingListRow {
    pub name: String,
    pub measurement_unit: String,
    pub total: i64,
}

/// Favorites ledger repository
pub struct FavoriteRepository;

impl FavoriteRepository {
    /// Add a recipe to a user's favorites
    ///
    /// Returns false if the pair was already present.
    pub async fn add(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO favorites (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a recipe from a user's favorites
    ///
    /// Returns false if the pair was not present.
    pub async fn remove(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM favorites
            WHERE user_id = $1 AND recipe_id = $2
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Which of the given recipes the user has favorited
    pub async fn member_recipe_ids(
        db: &PgPool,
        user_id: Uuid,
        recipe_ids: &[Uuid],
    ) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT recipe_id FROM favorites
            WHERE user_id = $1 AND recipe_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(recipe_ids)
        .fetch_all(db)
        .await?;

        Ok(ids)
    }
}

/// Shopping cart ledger repository
pub struct CartRepository;

impl CartRepository {
    /// Add a recipe to a user's cart
    ///
    /// Returns false if the pair was already present.
    pub async fn add(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO cart_items (user_id, recipe_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, recipe_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Remove a recipe from a user's cart
    ///
    /// Returns false if the pair was not present.
    pub async fn remove(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM cart_items
            WHERE user_id = $1 AND recipe_id = $2
            "#,
        )
        .bind(user_id)
        .bind(recipe_id)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Which of the given recipes are in the user's cart
    pub async fn member_recipe_ids(
        db: &PgPool,
        user_id: Uuid,
        recipe_ids: &[Uuid],
    ) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT recipe_id FROM cart_items
            WHERE user_id = $1 AND recipe_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(recipe_ids)
        .fetch_all(db)
        .await?;

        Ok(ids)
    }

    /// Aggregate every ingredient across the user's cart
    ///
    /// Lines are grouped by (name, measurement unit) so the same
    /// ingredient from different recipes collapses into one total.
    pub async fn aggregate_ingredients(
        db: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<ShoppingListRow>> {
        let rows = sqlx::query_as::<_, ShoppingListRow>(
            r#"
            SELECT i.name, i.measurement_unit, SUM(ri.amount)::BIGINT AS total
            FROM cart_items c
            JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE c.user_id = $1
            GROUP BY i.name, i.measurement_unit
            ORDER BY i.name ASC, i.measurement_unit ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    // Integration tests require database - marked with #[ignore]
    // Run with: cargo test --features integration -- --ignored
}
