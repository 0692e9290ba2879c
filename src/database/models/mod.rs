//! Data models.

pub mod credential;
pub mod recipe;

pub use credential::Credential;
pub use recipe::{store_precision, Recipe, RecipeDocument, RecipeFields, RecipeId};
