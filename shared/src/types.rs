//! API request and response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Page parameters accepted by every list endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl Pagination {
    /// Clamp the parameters to sane bounds: page >= 1, 1 <= limit <= 100
    pub fn normalize(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(6).clamp(1, 100);
        (page, limit)
    }

    pub fn offset(&self) -> i64 {
        let (page, limit) = self.normalize();
        (page - 1) * limit
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: None,
            limit: None,
        }
    }
}

/// Page envelope for list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub results: Vec<T>,
}

/// Error response body; every 4xx/5xx carries one human-readable message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub errors: String,
}

// ============================================================================
// Auth and User Types
// ============================================================================

/// Authentication tokens response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
}

/// Public user profile with the subscription flag relative to the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

/// A followed author together with a preview of their newest recipes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionView {
    pub email: String,
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<RecipeSummary>,
}

/// Query parameters for subscription views (`recipes_limit` caps the preview)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SubscriptionQuery {
    #[serde(default)]
    pub recipes_limit: Option<i64>,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl SubscriptionQuery {
    pub fn recipes_limit(&self) -> i64 {
        self.recipes_limit.unwrap_or(3).clamp(0, 100)
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }
}

// ============================================================================
// Catalog Types
// ============================================================================

/// Ingredient catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientResponse {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
}

/// Tag catalog entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Ingredient name prefix search
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IngredientSearchQuery {
    #[serde(default)]
    pub name: Option<String>,
}

// ============================================================================
// Recipe Types
// ============================================================================

/// One ingredient entry in a recipe write payload
///
/// `amount` is kept as raw JSON so that both `5` and `"5"` are accepted;
/// anything non-numeric is rejected with a validation message instead of a
/// deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientAmountInput {
    pub id: i64,
    pub amount: serde_json::Value,
}

/// Recipe creation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRecipeRequest {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub cooking_time: Option<i32>,
    #[serde(default)]
    pub ingredients: Vec<IngredientAmountInput>,
    #[serde(default)]
    pub tags: Vec<i64>,
}

/// Recipe update payload
///
/// Scalar fields are optional (absent keeps the stored value); the
/// ingredient and tag sets always replace the stored sets wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRecipeRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub cooking_time: Option<i32>,
    #[serde(default)]
    pub ingredients: Vec<IngredientAmountInput>,
    #[serde(default)]
    pub tags: Vec<i64>,
}

/// Ingredient line inside a recipe read view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredientView {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Full recipe read view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub tags: Vec<TagResponse>,
    pub author: UserResponse,
    pub ingredients: Vec<RecipeIngredientView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<i32>,
}

/// Minimal recipe view returned by ledger adds and subscription previews
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<i32>,
}

/// Recipe list filters and pagination
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RecipeListQuery {
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
    /// Filter by author id
    #[serde(default)]
    pub author: Option<Uuid>,
    /// Comma-separated tag slugs, OR-combined
    #[serde(default)]
    pub tags: Option<String>,
    /// "1" or "true" restricts to the caller's favorites
    #[serde(default)]
    pub is_favorited: Option<String>,
    /// "1" or "true" restricts to the caller's shopping cart
    #[serde(default)]
    pub is_in_shopping_cart: Option<String>,
}

impl RecipeListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }

    pub fn tag_slugs(&self) -> Option<Vec<String>> {
        let slugs: Vec<String> = self
            .tags
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if slugs.is_empty() {
            None
        } else {
            Some(slugs)
        }
    }

    pub fn favorited_only(&self) -> bool {
        flag_set(self.is_favorited.as_deref())
    }

    pub fn in_cart_only(&self) -> bool {
        flag_set(self.is_in_shopping_cart.as_deref())
    }
}

fn flag_set(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true") | Some("True"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::default();
        assert_eq!(p.normalize(), (1, 6));
        assert_eq!(p.offset(), 0);
    }

    #[test]
    fn test_pagination_clamps_out_of_range() {
        let p = Pagination {
            page: Some(0),
            limit: Some(1000),
        };
        assert_eq!(p.normalize(), (1, 100));

        let p = Pagination {
            page: Some(3),
            limit: Some(10),
        };
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn test_recipe_list_query_tag_slugs() {
        let q = RecipeListQuery {
            tags: Some("breakfast, dinner ,".to_string()),
            ..Default::default()
        };
        assert_eq!(
            q.tag_slugs(),
            Some(vec!["breakfast".to_string(), "dinner".to_string()])
        );

        let q = RecipeListQuery {
            tags: Some("  ,".to_string()),
            ..Default::default()
        };
        assert_eq!(q.tag_slugs(), None);

        let q = RecipeListQuery::default();
        assert_eq!(q.tag_slugs(), None);
    }

    #[test]
    fn test_recipe_list_query_flags() {
        let q = RecipeListQuery {
            is_favorited: Some("1".to_string()),
            is_in_shopping_cart: Some("0".to_string()),
            ..Default::default()
        };
        assert!(q.favorited_only());
        assert!(!q.in_cart_only());
    }

    #[test]
    fn test_subscription_query_limit_default() {
        let q = SubscriptionQuery::default();
        assert_eq!(q.recipes_limit(), 3);

        let q = SubscriptionQuery {
            recipes_limit: Some(500),
            ..Default::default()
        };
        assert_eq!(q.recipes_limit(), 100);
    }

    #[test]
    fn test_ingredient_amount_accepts_number_and_string() {
        let entry: IngredientAmountInput =
            serde_json::from_str(r#"{"id": 3, "amount": 10}"#).unwrap();
        assert_eq!(entry.amount, serde_json::json!(10));

        let entry: IngredientAmountInput =
            serde_json::from_str(r#"{"id": 3, "amount": "10"}"#).unwrap();
        assert_eq!(entry.amount, serde_json::json!("10"));
    }
}
