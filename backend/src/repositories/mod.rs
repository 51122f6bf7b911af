//! Database repositories
//!
//! Provides data access layer for database operations. Repositories
//! own the SQL and return plain records; validation, authorization
//! and error wording live in the service layer.

pub mod catalog;
pub mod ledger;
pub mod recipe;
pub mod subscription;
pub mod user;

pub use catalog::{IngredientRecord, IngredientRepository, TagRecord, TagRepository};
pub use ledger::{CartRepository, FavoriteRepository, ShoppingListRow};
pub use recipe::{
    CreateRecipe, IngredientLine, RecipeFilter, RecipeIngredientRow, RecipeRecord,
    RecipeRepository, RecipeTagRow, UpdateRecipe,
};
pub use subscription::SubscriptionRepository;
pub use user::{CreateUser, UserRecord, UserRepository};
