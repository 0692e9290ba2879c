//! Repository module - record store adapters.
//!
//! The core consumes the authoritative store through two narrow traits so the
//! MongoDB implementations can be swapped for in-memory doubles in tests.

mod credential_repository;
mod recipe_repository;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use credential_repository::CredentialRepository;
pub use recipe_repository::RecipeRepository;

use super::models::{Credential, Recipe, RecipeFields, RecipeId};
use crate::error::StoreError;

/// CRUD over the recipe collection.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// All recipes in the store's natural iteration order.
    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError>;

    /// One recipe; `Ok(None)` when the identifier is unknown.
    async fn find_one(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError>;

    /// Insert a new recipe and return the identifier the store assigned.
    async fn insert(&self, fields: RecipeFields, published_at: DateTime<Utc>) -> Result<RecipeId, StoreError>;

    /// Overwrite name, instructions, ingredients and tags.
    /// Returns `false` when no recipe has this identifier.
    async fn replace_fields(&self, id: &RecipeId, fields: RecipeFields) -> Result<bool, StoreError>;

    /// Delete a recipe. Returns `false` when no recipe has this identifier.
    async fn delete(&self, id: &RecipeId) -> Result<bool, StoreError>;
}

/// Lookup and insertion of user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// The credential matching both subject and digest, if any.
    async fn find_credential(&self, subject: &str, digest: &str) -> Result<Option<Credential>, StoreError>;

    /// Insert a credential. Returns `false` if the subject already exists.
    async fn insert_credential(&self, subject: &str, digest: &str) -> Result<bool, StoreError>;
}
