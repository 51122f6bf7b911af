//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! repositories, validation and the wire types.

pub mod catalog;
pub mod ledger;
pub mod recipe;
pub mod shopping_list;
pub mod subscription;
pub mod user;

pub use catalog::CatalogService;
pub use ledger::{CartService, FavoriteService};
pub use recipe::RecipeService;
pub use shopping_list::ShoppingListService;
pub use subscription::SubscriptionService;
pub use user::UserService;
