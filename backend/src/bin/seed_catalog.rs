//! Catalog seeding tool
//!
//! Loads the ingredient and tag catalogs from CSV files. Re-running is
//! safe: existing ingredients are left alone, tags are updated in
//! place by slug.
//!
//! Usage:
//!
//! ```text
//! seed-catalog [ingredients.csv] [tags.csv]
//! ```
//!
//! Paths default to data/ingredients.csv and data/tags.csv. The
//! ingredient file has `name,measurement_unit` columns, the tag file
//! `name,color,slug` with a #RRGGBB color.

use anyhow::{Context, Result};
use platebook_backend::config::AppConfig;
use platebook_backend::db;
use platebook_backend::repositories::{IngredientRepository, TagRepository};
use platebook_shared::validation::validate_hex_color;
use serde::Deserialize;
use sqlx::PgPool;
use std::env;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
struct IngredientRow {
    name: String,
    measurement_unit: String,
}

#[derive(Debug, Deserialize)]
struct TagRow {
    name: String,
    color: String,
    slug: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "seed_catalog=info,platebook_backend=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = env::args().collect();
    let ingredients_path = args.get(1).map(String::as_str).unwrap_or("data/ingredients.csv");
    let tags_path = args.get(2).map(String::as_str).unwrap_or("data/tags.csv");

    let config = AppConfig::load()?;
    let pool = db::create_pool(&config.database).await?;
    db::run_migrations(&pool).await?;

    seed_ingredients(&pool, Path::new(ingredients_path)).await?;
    seed_tags(&pool, Path::new(tags_path)).await?;

    Ok(())
}

async fn seed_ingredients(pool: &PgPool, path: &Path) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut inserted = 0u64;
    let mut skipped = 0u64;

    for row in reader.deserialize() {
        let row: IngredientRow =
            row.with_context(|| format!("malformed row in {}", path.display()))?;

        if row.name.trim().is_empty() || row.measurement_unit.trim().is_empty() {
            warn!(name = %row.name, "Skipping ingredient with empty fields");
            skipped += 1;
            continue;
        }

        if IngredientRepository::seed(pool, row.name.trim(), row.measurement_unit.trim()).await? {
            inserted += 1;
        } else {
            skipped += 1;
        }
    }

    info!(inserted, skipped, file = %path.display(), "Ingredient catalog seeded");
    Ok(())
}

async fn seed_tags(pool: &PgPool, path: &Path) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut upserted = 0u64;
    let mut skipped = 0u64;

    for row in reader.deserialize() {
        let row: TagRow = row.with_context(|| format!("malformed row in {}", path.display()))?;

        if let Err(e) = validate_hex_color(&row.color) {
            warn!(slug = %row.slug, color = %row.color, "Skipping tag: {}", e);
            skipped += 1;
            continue;
        }

        let tag = TagRepository::seed(pool, row.name.trim(), &row.color, row.slug.trim()).await?;
        info!(id = tag.id, slug = %tag.slug, "Tag upserted");
        upserted += 1;
    }

    info!(upserted, skipped, file = %path.display(), "Tag catalog seeded");
    Ok(())
}
