//! In-memory record stores for tests.
//!
//! Each store counts the calls it receives so tests can tell whether a read
//! was served from the cache or from the store.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::models::{Credential, Recipe, RecipeFields, RecipeId};
use super::repository::{CredentialStore, RecipeStore};
use crate::error::StoreError;

/// Recipe store keeping insertion order.
#[derive(Default)]
pub struct MemoryRecipeStore {
    recipes: RwLock<Vec<Recipe>>,
    next_id: AtomicU64,
    find_all_calls: AtomicUsize,
}

impl MemoryRecipeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `find_all` has been called.
    pub fn find_all_calls(&self) -> usize {
        self.find_all_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the store contents.
    pub fn snapshot(&self) -> Vec<Recipe> {
        self.recipes.read().clone()
    }
}

#[async_trait]
impl RecipeStore for MemoryRecipeStore {
    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError> {
        self.find_all_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot())
    }

    async fn find_one(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError> {
        Ok(self.recipes.read().iter().find(|r| &r.id == id).cloned())
    }

    async fn insert(&self, fields: RecipeFields, published_at: DateTime<Utc>) -> Result<RecipeId, StoreError> {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = RecipeId::new(format!("{n:024x}"));
        self.recipes
            .write()
            .push(Recipe::from_fields(id.clone(), fields, published_at));
        Ok(id)
    }

    async fn replace_fields(&self, id: &RecipeId, fields: RecipeFields) -> Result<bool, StoreError> {
        let mut recipes = self.recipes.write();
        let Some(recipe) = recipes.iter_mut().find(|r| &r.id == id) else {
            return Ok(false);
        };
        recipe.name = fields.name;
        recipe.tags = fields.tags;
        recipe.ingredients = fields.ingredients;
        recipe.instructions = fields.instructions;
        Ok(true)
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool, StoreError> {
        let mut recipes = self.recipes.write();
        let before = recipes.len();
        recipes.retain(|r| &r.id != id);
        Ok(recipes.len() != before)
    }
}

/// Credential store enforcing subject uniqueness like the unique index does.
#[derive(Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<Vec<Credential>>,
    calls: AtomicUsize,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total calls received, of any kind.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.credentials.read().len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_credential(&self, subject: &str, digest: &str) -> Result<Option<Credential>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .credentials
            .read()
            .iter()
            .find(|c| c.username == subject && c.password == digest)
            .cloned())
    }

    async fn insert_credential(&self, subject: &str, digest: &str) -> Result<bool, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut credentials = self.credentials.write();
        if credentials.iter().any(|c| c.username == subject) {
            return Ok(false);
        }
        credentials.push(Credential::new(subject, digest));
        Ok(true)
    }
}
