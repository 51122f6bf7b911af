//! Catalog repositories - database operations for ingredients and tags
//!
//! Both catalogs are seeded out of band and read-only through the API,
//! so the write paths here exist for the seeding tool only.

use anyhow::Result;
use sqlx::PgPool;

/// Ingredient from the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct IngredientRecord {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// Tag from the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TagRecord {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Ingredient catalog repository
pub struct IngredientRepository;

impl IngredientRepository {
    /// List the whole catalog in name order
    pub async fn list(db: &PgPool) -> Result<Vec<IngredientRecord>> {
        let items = sqlx::query_as::<_, IngredientRecord>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            ORDER BY name ASC
            "#,
        )
        .fetch_all(db)
        .await?;

        Ok(items)
    }

    /// Case-insensitive prefix search on the ingredient name
    pub async fn search_by_prefix(db: &PgPool, prefix: &str) -> Result<Vec<IngredientRecord>> {
        let items = sqlx::query_as::<_, IngredientRecord>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE name ILIKE $1 || '%'
            ORDER BY name ASC
            "#,
        )
        .bind(prefix)
        .fetch_all(db)
        .await?;

        Ok(items)
    }

    /// Find ingredient by ID
    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<IngredientRecord>> {
        let item = sqlx::query_as::<_, IngredientRecord>(
            r#"
            SELECT id, name, measurement_unit
            FROM ingredients
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(item)
    }

    /// Out of the given IDs, return the ones that exist
    pub async fn existing_ids(db: &PgPool, ids: &[i64]) -> Result<Vec<i64>> {
        let found = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM ingredients WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(db)
        .await?;

        Ok(found)
    }

    /// Insert an ingredient, ignoring rows already in the catalog
    ///
    /// Returns true if a new row was written.
    pub async fn seed(db: &PgPool, name: &str, measurement_unit: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            ON CONFLICT (name, measurement_unit) DO NOTHING
            "#,
        )
        .bind(name)
        .bind(measurement_unit)
        .execute(db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Tag catalog repository
pub struct TagRepository;

impl TagRepository {
    /// List the whole catalog in name order
    pub async fn list(db: &PgPool) -> Result<Vec<TagRecord>> {
        let tags = sqlx::query_as::<_, TagRecord>(
            r#"
            SELECT id, name, color, slug
            FROM tags
            ORDER BY name ASC
            "#,
        )
        .fetch_all(db)
        .await?;

        Ok(tags)
    }

    /// Find tag by ID
    pub async fn find_by_id(db: &PgPool, id: i64) -> Result<Option<TagRecord>> {
        let tag = sqlx::query_as::<_, TagRecord>(
            r#"
            SELECT id, name, color, slug
            FROM tags
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;

        Ok(tag)
    }

    /// Out of the given IDs, return the ones that exist
    pub async fn existing_ids(db: &PgPool, ids: &[i64]) -> Result<Vec<i64>> {
        let found = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM tags WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(db)
        .await?;

        Ok(found)
    }

    /// Insert or refresh a tag, keyed by slug
    pub async fn seed(db: &PgPool, name: &str, color: &str, slug: &str) -> Result<TagRecord> {
        let tag = sqlx::query_as::<_, TagRecord>(
            r#"
            INSERT INTO tags (name, color, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug)
            DO UPDATE SET name = EXCLUDED.name, color = EXCLUDED.color
            RETURNING id, name, color, slug
            "#,
        )
        .bind(name)
        .bind(color)
        .bind(slug)
        .fetch_one(db)
        .await?;

        Ok(tag)
    }
}
