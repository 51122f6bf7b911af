//! Recipe repository - database operations for recipes and their
//! ingredient and tag associations
//!
//! Association rows are owned by the recipe: writes replace them
//! wholesale inside the same transaction as the recipe row itself.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Recipe row from the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeRecord {
    pub id: Uuid,
    pub author_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub pub_date: DateTime<Utc>,
}

/// One ingredient line on a recipe, joined with the catalog
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeIngredientRow {
    pub recipe_id: Uuid,
    pub ingredient_id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// One tag on a recipe, joined with the catalog
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecipeTagRow {
    pub recipe_id: Uuid,
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Validated ingredient line ready to be written
#[derive(Debug, Clone)]
pub struct IngredientLine {
    pub ingredient_id: i64,
    pub amount: i64,
}

/// Input for creating a recipe with its associations
#[derive(Debug, Clone)]
pub struct CreateRecipe {
    pub author_id: Uuid,
    pub name: String,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Vec<IngredientLine>,
    pub tag_ids: Vec<i64>,
}

/// Final state for an update; the caller has already merged
/// partial input with the stored row
#[derive(Debug, Clone)]
pub struct UpdateRecipe {
    pub name: String,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Vec<IngredientLine>,
    pub tag_ids: Vec<i64>,
}

/// Filters for the recipe list; `None` fields match everything
#[derive(Debug, Clone, Default)]
pub struct RecipeFilter {
    pub author: Option<Uuid>,
    pub tag_slugs: Option<Vec<String>>,
    pub favorited_by: Option<Uuid>,
    pub in_cart_of: Option<Uuid>,
}

/// Recipe repository
pub struct RecipeRepository;

impl RecipeRepository {
    /// Create a recipe with its ingredient and tag associations
    pub async fn create(db: &PgPool, input: CreateRecipe) -> Result<RecipeRecord> {
        let mut tx = db.begin().await?;

        let recipe = sqlx::query_as::<_, RecipeRecord>(
            r#"
            INSERT INTO recipes (author_id, name, image, text, cooking_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, author_id, name, image, text, cooking_time, pub_date
            "#,
        )
        .bind(input.author_id)
        .bind(&input.name)
        .bind(&input.image)
        .bind(&input.text)
        .bind(input.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        for line in &input.ingredients {
            sqlx::query(
                r#"
                INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(recipe.id)
            .bind(line.ingredient_id)
            .bind(line.amount)
            .execute(&mut *tx)
            .await?;
        }

        for tag_id in &input.tag_ids {
            sqlx::query(
                r#"
                INSERT INTO recipe_tags (recipe_id, tag_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(recipe.id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(recipe)
    }

    /// Rewrite a recipe and replace its associations
    pub async fn update(db: &PgPool, id: Uuid, input: UpdateRecipe) -> Result<RecipeRecord> {
        let mut tx = db.begin().await?;

        let recipe = sqlx::query_as::<_, RecipeRecord>(
            r#"
            UPDATE recipes
            SET name = $2, image = $3, text = $4, cooking_time = $5
            WHERE id = $1
            RETURNING id, author_id, name, image, text, cooking_time, pub_date
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.image)
        .bind(&input.text)
        .bind(input.cooking_time)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for line in &input.ingredients {
            sqlx::query(
                r#"
                INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(recipe.id)
            .bind(line.ingredient_id)
            .bind(line.amount)
            .execute(&mut *tx)
            .await?;
        }

        for tag_id in &input.tag_ids {
            sqlx::query(
                r#"
                INSERT INTO recipe_tags (recipe_id, tag_id)
                VALUES ($1, $2)
                "#,
            )
            .bind(recipe.id)
            .bind(tag_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(recipe)
    }

    /// Find recipe by ID
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<RecipeRecord>> {
        let recipe = sqlx::query_as::<_, RecipeRecord>(
            r#"
            SELECT id, author_id, name, image, text, cooking_time, pub_date
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(recipe)
    }

    /// Check whether an author already has a recipe with this name
    ///
    /// `exclude` skips one recipe, so updates do not collide with
    /// themselves.
    pub async fn name_taken(
        db: &PgPool,
        author_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM recipes
                WHERE author_id = $1 AND name = $2
                  AND ($3::uuid IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(author_id)
        .bind(name)
        .bind(exclude)
        .fetch_one(db)
        .await?;

        Ok(taken)
    }

    /// List recipes, newest first, honoring the filter
    pub async fn list(
        db: &PgPool,
        filter: &RecipeFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RecipeRecord>> {
        let recipes = sqlx::query_as::<_, RecipeRecord>(
            r#"
            SELECT r.id, r.author_id, r.name, r.image, r.text, r.cooking_time, r.pub_date
            FROM recipes r
            WHERE ($1::uuid IS NULL OR r.author_id = $1)
              AND ($2::text[] IS NULL OR EXISTS (
                    SELECT 1
                    FROM recipe_tags rt
                    JOIN tags t ON t.id = rt.tag_id
                    WHERE rt.recipe_id = r.id AND t.slug = ANY($2)))
              AND ($3::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM favorites f
                    WHERE f.recipe_id = r.id AND f.user_id = $3))
              AND ($4::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM cart_items c
                    WHERE c.recipe_id = r.id AND c.user_id = $4))
            ORDER BY r.pub_date DESC, r.id
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.author)
        .bind(filter.tag_slugs.as_deref())
        .bind(filter.favorited_by)
        .bind(filter.in_cart_of)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;

        Ok(recipes)
    }

    /// Count recipes matching the filter
    pub async fn count(db: &PgPool, filter: &RecipeFilter) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM recipes r
            WHERE ($1::uuid IS NULL OR r.author_id = $1)
              AND ($2::text[] IS NULL OR EXISTS (
                    SELECT 1
                    FROM recipe_tags rt
                    JOIN tags t ON t.id = rt.tag_id
                    WHERE rt.recipe_id = r.id AND t.slug = ANY($2)))
              AND ($3::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM favorites f
                    WHERE f.recipe_id = r.id AND f.user_id = $3))
              AND ($4::uuid IS NULL OR EXISTS (
                    SELECT 1 FROM cart_items c
                    WHERE c.recipe_id = r.id AND c.user_id = $4))
            "#,
        )
        .bind(filter.author)
        .bind(filter.tag_slugs.as_deref())
        .bind(filter.favorited_by)
        .bind(filter.in_cart_of)
        .fetch_one(db)
        .await?;

        Ok(count)
    }

    /// Most recent recipes by one author
    pub async fn recent_by_author(
        db: &PgPool,
        author_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RecipeRecord>> {
        let recipes = sqlx::query_as::<_, RecipeRecord>(
            r#"
            SELECT id, author_id, name, image, text, cooking_time, pub_date
            FROM recipes
            WHERE author_id = $1
            ORDER BY pub_date DESC, id
            LIMIT $2
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(db)
        .await?;

        Ok(recipes)
    }

    /// Ingredient lines for a batch of recipes, ordered by catalog ID
    pub async fn ingredients_for(
        db: &PgPool,
        recipe_ids: &[Uuid],
    ) -> Result<Vec<RecipeIngredientRow>> {
        let rows = sqlx::query_as::<_, RecipeIngredientRow>(
            r#"
            SELECT ri.recipe_id, ri.ingredient_id, i.name, i.measurement_unit, ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.id = ri.ingredient_id
            WHERE ri.recipe_id = ANY($1)
            ORDER BY ri.ingredient_id ASC
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    /// Tags for a batch of recipes, ordered by tag name
    pub async fn tags_for(db: &PgPool, recipe_ids: &[Uuid]) -> Result<Vec<RecipeTagRow>> {
        let rows = sqlx::query_as::<_, RecipeTagRow>(
            r#"
            SELECT rt.recipe_id, t.id, t.name, t.color, t.slug
            FROM recipe_tags rt
            JOIN tags t ON t.id = rt.tag_id
            WHERE rt.recipe_id = ANY($1)
            ORDER BY t.name ASC
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    /// Delete a recipe; association rows go with it via cascade
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    // Integration tests require database - marked with #[ignore]
    // Run with: cargo test --features integration -- --ignored
}
