//! Recipe service - validation, authorization and read-model assembly
//!
//! Validation short-circuits: checks run in a fixed order and the
//! first failure is the one reported. An update merges partial scalar
//! input with the stored row, while ingredient and tag sets are always
//! replaced wholesale.

use crate::error::ApiError;
use crate::repositories::{
    CartRepository, CreateRecipe, FavoriteRepository, IngredientLine, IngredientRepository,
    RecipeFilter, RecipeRecord, RecipeRepository, SubscriptionRepository, TagRepository,
    UpdateRecipe, UserRecord, UserRepository,
};
use platebook_shared::types::{
    CreateRecipeRequest, IngredientAmountInput, Page, RecipeIngredientView, RecipeListQuery,
    RecipeResponse, TagResponse, UpdateRecipeRequest,
};
use platebook_shared::validation::{
    capitalize_first, parse_amount, validate_cooking_time, validate_recipe_name,
    validate_recipe_text,
};
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use super::user::to_response;

const DUPLICATE_NAME: &str = "You have already saved a recipe with this name.";

/// Recipe service
pub struct RecipeService;

impl RecipeService {
    /// Create a recipe for the signed-in author
    pub async fn create(
        db: &PgPool,
        author_id: Uuid,
        input: CreateRecipeRequest,
    ) -> Result<RecipeResponse, ApiError> {
        let name = Self::checked_name(db, author_id, &input.name, None).await?;
        let text = match input.text.as_deref() {
            Some(raw) => Some(checked_text(raw)?),
            None => None,
        };
        if let Some(minutes) = input.cooking_time {
            validate_cooking_time(minutes).map_err(ApiError::Validation)?;
        }
        let ingredients = Self::checked_lines(db, &input.ingredients).await?;
        let tag_ids = Self::checked_tags(db, &input.tags).await?;

        let record = RecipeRepository::create(
            db,
            CreateRecipe {
                author_id,
                name,
                image: input.image,
                text,
                cooking_time: input.cooking_time,
                ingredients,
                tag_ids,
            },
        )
        .await
        .map_err(map_write_err)?;

        metrics::counter!("recipes_created_total").increment(1);

        let mut views = Self::build_views(db, Some(author_id), vec![record]).await?;
        Ok(views.remove(0))
    }

    /// Partially update a recipe
    ///
    /// Absent scalar fields keep their stored values; the ingredient
    /// and tag sets in the request replace the stored ones entirely.
    pub async fn update(
        db: &PgPool,
        author_id: Uuid,
        recipe_id: Uuid,
        input: UpdateRecipeRequest,
    ) -> Result<RecipeResponse, ApiError> {
        let existing = RecipeRepository::find_by_id(db, recipe_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

        if existing.author_id != author_id {
            return Err(ApiError::Forbidden(
                "You can only edit your own recipes.".to_string(),
            ));
        }

        let name = match input.name.as_deref() {
            Some(raw) => Self::checked_name(db, author_id, raw, Some(recipe_id)).await?,
            None => existing.name.clone(),
        };
        let text = match input.text.as_deref() {
            Some(raw) => Some(checked_text(raw)?),
            None => existing.text.clone(),
        };
        let cooking_time = match input.cooking_time {
            Some(minutes) => {
                validate_cooking_time(minutes).map_err(ApiError::Validation)?;
                Some(minutes)
            }
            None => existing.cooking_time,
        };
        let image = input.image.or_else(|| existing.image.clone());
        let ingredients = Self::checked_lines(db, &input.ingredients).await?;
        let tag_ids = Self::checked_tags(db, &input.tags).await?;

        let record = RecipeRepository::update(
            db,
            recipe_id,
            UpdateRecipe {
                name,
                image,
                text,
                cooking_time,
                ingredients,
                tag_ids,
            },
        )
        .await
        .map_err(map_write_err)?;

        metrics::counter!("recipes_updated_total").increment(1);

        let mut views = Self::build_views(db, Some(author_id), vec![record]).await?;
        Ok(views.remove(0))
    }

    /// Delete a recipe; only the author may do this
    pub async fn delete(db: &PgPool, author_id: Uuid, recipe_id: Uuid) -> Result<(), ApiError> {
        let existing = RecipeRepository::find_by_id(db, recipe_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

        if existing.author_id != author_id {
            return Err(ApiError::Forbidden(
                "You can only delete your own recipes.".to_string(),
            ));
        }

        RecipeRepository::delete(db, recipe_id)
            .await
            .map_err(ApiError::Internal)?;

        Ok(())
    }

    /// Fetch one recipe with viewer-dependent flags
    pub async fn get(
        db: &PgPool,
        viewer: Option<Uuid>,
        recipe_id: Uuid,
    ) -> Result<RecipeResponse, ApiError> {
        let record = RecipeRepository::find_by_id(db, recipe_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Recipe not found".to_string()))?;

        let mut views = Self::build_views(db, viewer, vec![record]).await?;
        Ok(views.remove(0))
    }

    /// Page through recipes, newest first, honoring the query filters
    ///
    /// The favorited and cart filters need a signed-in viewer; for
    /// anonymous readers they are ignored.
    pub async fn list(
        db: &PgPool,
        viewer: Option<Uuid>,
        query: RecipeListQuery,
    ) -> Result<Page<RecipeResponse>, ApiError> {
        let (page, limit) = query.pagination().normalize();
        let offset = (page - 1) * limit;

        let filter = RecipeFilter {
            author: query.author,
            tag_slugs: query.tag_slugs(),
            favorited_by: if query.favorited_only() { viewer } else { None },
            in_cart_of: if query.in_cart_only() { viewer } else { None },
        };

        let count = RecipeRepository::count(db, &filter)
            .await
            .map_err(ApiError::Internal)?;
        let records = RecipeRepository::list(db, &filter, limit, offset)
            .await
            .map_err(ApiError::Internal)?;

        let results = Self::build_views(db, viewer, records).await?;

        Ok(Page { count, results })
    }

    /// Validate and normalize a recipe name, then check it is free
    async fn checked_name(
        db: &PgPool,
        author_id: Uuid,
        raw: &str,
        exclude: Option<Uuid>,
    ) -> Result<String, ApiError> {
        validate_recipe_name(raw).map_err(ApiError::Validation)?;
        let name = capitalize_first(raw);

        if RecipeRepository::name_taken(db, author_id, &name, exclude)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Validation(DUPLICATE_NAME.to_string()));
        }

        Ok(name)
    }

    /// Validate every ingredient line against the catalog
    async fn checked_lines(
        db: &PgPool,
        inputs: &[IngredientAmountInput],
    ) -> Result<Vec<IngredientLine>, ApiError> {
        if inputs.is_empty() {
            return Err(ApiError::Validation(
                "Add at least one ingredient.".to_string(),
            ));
        }

        let ids: Vec<i64> = inputs.iter().map(|line| line.id).collect();
        let known: HashSet<i64> = IngredientRepository::existing_ids(db, &ids)
            .await
            .map_err(ApiError::Internal)?
            .into_iter()
            .collect();

        validate_ingredient_lines(inputs, &known).map_err(ApiError::Validation)
    }

    /// Check that every tag exists; duplicates collapse silently
    async fn checked_tags(db: &PgPool, tag_ids: &[i64]) -> Result<Vec<i64>, ApiError> {
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }

        let known: HashSet<i64> = TagRepository::existing_ids(db, tag_ids)
            .await
            .map_err(ApiError::Internal)?
            .into_iter()
            .collect();

        for id in tag_ids {
            if !known.contains(id) {
                return Err(ApiError::Validation(format!("No tag found with id={}!", id)));
            }
        }

        Ok(dedupe_tags(tag_ids))
    }

    /// Assemble full read models for a batch of recipe rows
    ///
    /// Hydration runs one query per concern over the whole batch, so a
    /// page costs a fixed number of round trips regardless of its size.
    async fn build_views(
        db: &PgPool,
        viewer: Option<Uuid>,
        records: Vec<RecipeRecord>,
    ) -> Result<Vec<RecipeResponse>, ApiError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let recipe_ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let author_ids: Vec<Uuid> = {
            let mut ids: Vec<Uuid> = records.iter().map(|r| r.author_id).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };

        let authors: HashMap<Uuid, UserRecord> = UserRepository::find_by_ids(db, &author_ids)
            .await
            .map_err(ApiError::Internal)?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let mut ingredients: HashMap<Uuid, Vec<RecipeIngredientView>> = HashMap::new();
        for row in RecipeRepository::ingredients_for(db, &recipe_ids)
            .await
            .map_err(ApiError::Internal)?
        {
            ingredients
                .entry(row.recipe_id)
                .or_default()
                .push(RecipeIngredientView {
                    id: row.ingredient_id,
                    name: row.name,
                    measurement_unit: row.measurement_unit,
                    amount: row.amount,
                });
        }

        let mut tags: HashMap<Uuid, Vec<TagResponse>> = HashMap::new();
        for row in RecipeRepository::tags_for(db, &recipe_ids)
            .await
            .map_err(ApiError::Internal)?
        {
            tags.entry(row.recipe_id).or_default().push(TagResponse {
                id: row.id,
                name: row.name,
                color: row.color,
                slug: row.slug,
            });
        }

        let (favorited, in_cart, followed) = match viewer {
            Some(viewer_id) => {
                let favorited: HashSet<Uuid> =
                    FavoriteRepository::member_recipe_ids(db, viewer_id, &recipe_ids)
                        .await
                        .map_err(ApiError::Internal)?
                        .into_iter()
                        .collect();
                let in_cart: HashSet<Uuid> =
                    CartRepository::member_recipe_ids(db, viewer_id, &recipe_ids)
                        .await
                        .map_err(ApiError::Internal)?
                        .into_iter()
                        .collect();
                let followed: HashSet<Uuid> =
                    SubscriptionRepository::followed_ids(db, viewer_id, &author_ids)
                        .await
                        .map_err(ApiError::Internal)?
                        .into_iter()
                        .collect();
                (favorited, in_cart, followed)
            }
            None => (HashSet::new(), HashSet::new(), HashSet::new()),
        };

        let mut views = Vec::with_capacity(records.len());
        for record in records {
            let author = authors.get(&record.author_id).ok_or_else(|| {
                ApiError::Internal(anyhow::anyhow!("recipe {} has no author row", record.id))
            })?;

            views.push(RecipeResponse {
                id: record.id,
                tags: tags.remove(&record.id).unwrap_or_default(),
                author: to_response(author, followed.contains(&record.author_id)),
                ingredients: ingredients.remove(&record.id).unwrap_or_default(),
                is_favorited: favorited.contains(&record.id),
                is_in_shopping_cart: in_cart.contains(&record.id),
                name: record.name,
                image: record.image,
                text: record.text,
                cooking_time: record.cooking_time,
            });
        }

        Ok(views)
    }
}

/// Validate and normalize a recipe description
fn checked_text(raw: &str) -> Result<String, ApiError> {
    validate_recipe_text(raw).map_err(ApiError::Validation)?;
    Ok(capitalize_first(raw))
}

/// A concurrent create can still trip the (author, name) unique
/// constraint after the pre-check passed; report it as the same
/// duplicate-name failure.
fn map_write_err(err: anyhow::Error) -> ApiError {
    let is_unique = err
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|d| d.is_unique_violation());

    if is_unique {
        ApiError::Validation(DUPLICATE_NAME.to_string())
    } else {
        ApiError::Internal(err)
    }
}

/// Check every ingredient line in input order; the first failure wins
fn validate_ingredient_lines(
    inputs: &[IngredientAmountInput],
    known_ids: &HashSet<i64>,
) -> Result<Vec<IngredientLine>, String> {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut lines = Vec::with_capacity(inputs.len());

    for input in inputs {
        let amount = parse_amount(&input.amount).ok_or_else(|| {
            "The amount of ingredient can only be specified by number.".to_string()
        })?;
        if amount < 1 {
            return Err("Specify the weight/quantity of ingredients.".to_string());
        }
        if !known_ids.contains(&input.id) {
            return Err(format!("No ingredient found with id={}!", input.id));
        }
        if !seen.insert(input.id) {
            return Err("The ingredients should not be repeated.".to_string());
        }
        lines.push(IngredientLine {
            ingredient_id: input.id,
            amount,
        });
    }

    Ok(lines)
}

/// Keep the first occurrence of each tag ID, preserving order
fn dedupe_tags(tag_ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    tag_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: distinct known ingredients with positive amounts
        /// always validate, and the output preserves input order.
        #[test]
        fn prop_valid_lines_pass(amounts in proptest::collection::vec(1i64..10_000, 1..20)) {
            let inputs: Vec<IngredientAmountInput> = amounts
                .iter()
                .enumerate()
                .map(|(i, amount)| IngredientAmountInput {
                    id: i as i64 + 1,
                    amount: json!(amount),
                })
                .collect();
            let known: HashSet<i64> = (1..=amounts.len() as i64).collect();

            let lines = validate_ingredient_lines(&inputs, &known).unwrap();
            prop_assert_eq!(lines.len(), amounts.len());
            for (i, (line, amount)) in lines.iter().zip(amounts.iter()).enumerate() {
                prop_assert_eq!(line.ingredient_id, i as i64 + 1);
                prop_assert_eq!(line.amount, *amount);
            }
        }

        /// Property: string and numeric amount encodings validate identically.
        #[test]
        fn prop_amount_encoding_does_not_matter(amount in 1i64..10_000) {
            let known: HashSet<i64> = [7].into_iter().collect();
            let as_number = vec![IngredientAmountInput { id: 7, amount: json!(amount) }];
            let as_string = vec![IngredientAmountInput {
                id: 7,
                amount: json!(amount.to_string()),
            }];

            let a = validate_ingredient_lines(&as_number, &known).unwrap();
            let b = validate_ingredient_lines(&as_string, &known).unwrap();
            prop_assert_eq!(a[0].amount, b[0].amount);
        }

        /// Property: a repeated ingredient is always rejected the same way.
        #[test]
        fn prop_repeated_ingredient_rejected(id in 1i64..100, amount in 1i64..100) {
            let known: HashSet<i64> = (1..200).collect();
            let inputs = vec![
                IngredientAmountInput { id, amount: json!(amount) },
                IngredientAmountInput { id, amount: json!(amount) },
            ];

            let err = validate_ingredient_lines(&inputs, &known).unwrap_err();
            prop_assert_eq!(err, "The ingredients should not be repeated.");
        }

        /// Property: tag dedup removes duplicates and keeps first
        /// occurrences in their original order.
        #[test]
        fn prop_dedupe_preserves_first_occurrence(
            ids in proptest::collection::vec(1i64..20, 0..30)
        ) {
            let deduped = dedupe_tags(&ids);

            let set: HashSet<i64> = deduped.iter().copied().collect();
            prop_assert_eq!(set.len(), deduped.len());

            let mut remaining = ids.iter();
            for want in &deduped {
                prop_assert!(remaining.any(|got| got == want));
            }
        }
    }
}
