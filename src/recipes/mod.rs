//! Recipe operations with a cache-aside read path.
//!
//! List reads go through the cache store under one well-known key. On a miss
//! the full collection is read from the record store and written back with no
//! expiry. Every accepted create, replace or delete removes that key; the
//! cache is never patched in place.
//!
//! Known race: a write that invalidates between a reader's miss and the
//! reader's repopulate lets the reader put back a snapshot that predates the
//! write. The stale entry lives until the next write invalidates it.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::config::CacheErrorPolicy;
use crate::database::{store_precision, Recipe, RecipeFields, RecipeId, RecipeStore};
use crate::error::{AppError, AppResult, StoreError};
use crate::utils::bounded;

/// Cache key holding the serialized recipe list.
pub const RECIPES_CACHE_KEY: &str = "recipes";

/// Recipe operations exposed to the dispatch layer.
pub struct RecipeService {
    store: Arc<dyn RecipeStore>,
    cache: Arc<dyn CacheStore>,
    policy: CacheErrorPolicy,
    store_timeout: Duration,
}

impl RecipeService {
    pub fn new(
        store: Arc<dyn RecipeStore>,
        cache: Arc<dyn CacheStore>,
        policy: CacheErrorPolicy,
        store_timeout: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            policy,
            store_timeout,
        }
    }

    /// All recipes, served from the cache when present.
    pub async fn list_recipes(&self) -> AppResult<Vec<Recipe>> {
        match self.read_cached().await {
            Ok(Some(recipes)) => {
                debug!(count = recipes.len(), "recipes served from cache");
                return Ok(recipes);
            }
            Ok(None) => debug!("recipes cache miss"),
            Err(e) => match self.policy {
                CacheErrorPolicy::Surface => return Err(e.into()),
                CacheErrorPolicy::Fallthrough => {
                    warn!(error = %e, "cache read failed, reading from record store");
                }
            },
        }

        let recipes = bounded("find_all", self.store_timeout, self.store.find_all()).await?;
        info!(count = recipes.len(), "recipes read from record store");

        self.repopulate(&recipes).await;
        Ok(recipes)
    }

    /// Recipes carrying `tag`, compared case-insensitively.
    pub async fn search_recipes(&self, tag: &str) -> AppResult<Vec<Recipe>> {
        if tag.trim().is_empty() {
            return Err(AppError::invalid_input("tag is required"));
        }

        let recipes = self.list_recipes().await?;
        Ok(recipes.into_iter().filter(|r| r.has_tag(tag)).collect())
    }

    /// One recipe, read from the record store.
    pub async fn get_recipe(&self, id: &RecipeId) -> AppResult<Recipe> {
        bounded("find_one", self.store_timeout, self.store.find_one(id))
            .await?
            .ok_or_else(|| AppError::not_found("Recipe not found"))
    }

    /// Insert a recipe stamped with the current time.
    pub async fn create_recipe(&self, fields: RecipeFields) -> AppResult<Recipe> {
        validate(&fields)?;

        // Stamped at store precision so the returned record matches later reads.
        let published_at = store_precision(Utc::now());
        let id = bounded(
            "insert",
            self.store_timeout,
            self.store.insert(fields.clone(), published_at),
        )
        .await?;

        info!(id = %id, "recipe created");
        self.invalidate().await?;

        Ok(Recipe::from_fields(id, fields, published_at))
    }

    /// Overwrite name, instructions, ingredients and tags of a recipe.
    pub async fn replace_recipe(&self, id: &RecipeId, fields: RecipeFields) -> AppResult<()> {
        validate(&fields)?;

        let matched = bounded(
            "replace_fields",
            self.store_timeout,
            self.store.replace_fields(id, fields),
        )
        .await?;
        if !matched {
            return Err(AppError::not_found("Recipe not found"));
        }

        info!(id = %id, "recipe updated");
        self.invalidate().await
    }

    /// Delete a recipe.
    pub async fn delete_recipe(&self, id: &RecipeId) -> AppResult<()> {
        let deleted = bounded("delete", self.store_timeout, self.store.delete(id)).await?;
        if !deleted {
            return Err(AppError::not_found("Recipe not found"));
        }

        info!(id = %id, "recipe deleted");
        self.invalidate().await
    }

    /// Drop the cached recipe list. Dropping an absent entry is a no-op.
    pub async fn invalidate(&self) -> AppResult<()> {
        bounded(
            "cache_delete",
            self.store_timeout,
            self.cache.delete(RECIPES_CACHE_KEY),
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "failed to invalidate recipes cache");
            AppError::from(e)
        })?;

        debug!("recipes cache invalidated");
        Ok(())
    }

    /// Cached list, `Ok(None)` on a miss. An undecodable entry is a cache fault.
    async fn read_cached(&self) -> Result<Option<Vec<Recipe>>, StoreError> {
        let bytes = bounded("cache_get", self.store_timeout, self.cache.get(RECIPES_CACHE_KEY)).await?;

        match bytes {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Best effort: a failed write never fails the read.
    async fn repopulate(&self, recipes: &[Recipe]) {
        let bytes = match serde_json::to_vec(recipes) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "failed to serialize recipes for cache");
                return;
            }
        };

        if let Err(e) = bounded(
            "cache_set",
            self.store_timeout,
            self.cache.set(RECIPES_CACHE_KEY, bytes, None),
        )
        .await
        {
            warn!(error = %e, "failed to populate recipes cache");
        }
    }
}

fn validate(fields: &RecipeFields) -> AppResult<()> {
    if fields.name.trim().is_empty() {
        return Err(AppError::invalid_input("name is required"));
    }
    Ok(())
}
