//! Recipe repository backed by the `recipes` collection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::Collection;
use tracing::debug;

use super::RecipeStore;
use crate::database::models::{Recipe, RecipeDocument, RecipeFields, RecipeId};
use crate::database::mongo::RECIPES_COLLECTION;
use crate::database::Database;
use crate::error::StoreError;

/// Repository for recipes.
#[derive(Clone)]
pub struct RecipeRepository {
    collection: Collection<RecipeDocument>,
}

impl RecipeRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(RECIPES_COLLECTION),
        }
    }
}

/// Malformed identifiers cannot match any document.
fn object_id(id: &RecipeId) -> Option<ObjectId> {
    ObjectId::parse_str(id.as_str()).ok()
}

#[async_trait]
impl RecipeStore for RecipeRepository {
    async fn find_all(&self) -> Result<Vec<Recipe>, StoreError> {
        let cursor = self.collection.find(doc! {}).await?;
        let docs: Vec<RecipeDocument> = cursor.try_collect().await?;

        debug!("DB find_all recipes: {}", docs.len());
        Ok(docs.into_iter().map(Recipe::from).collect())
    }

    async fn find_one(&self, id: &RecipeId) -> Result<Option<Recipe>, StoreError> {
        let Some(oid) = object_id(id) else {
            return Ok(None);
        };

        let result = self.collection.find_one(doc! { "_id": oid }).await?;
        debug!("DB get recipe {}: {:?}", id, result.is_some());
        Ok(result.map(Recipe::from))
    }

    async fn insert(&self, fields: RecipeFields, published_at: DateTime<Utc>) -> Result<RecipeId, StoreError> {
        let document = RecipeDocument::new(fields, published_at);
        self.collection.insert_one(&document).await?;

        debug!("Inserted recipe {}", document.id);
        Ok(document.id.into())
    }

    async fn replace_fields(&self, id: &RecipeId, fields: RecipeFields) -> Result<bool, StoreError> {
        let Some(oid) = object_id(id) else {
            return Ok(false);
        };

        let update = doc! {
            "$set": {
                "name": fields.name,
                "instructions": fields.instructions,
                "ingredients": fields.ingredients,
                "tags": fields.tags,
            }
        };

        let result = self.collection.update_one(doc! { "_id": oid }, update).await?;
        debug!("Updated recipe {}: matched {}", id, result.matched_count);
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &RecipeId) -> Result<bool, StoreError> {
        let Some(oid) = object_id(id) else {
            return Ok(false);
        };

        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        debug!("Deleted recipe {}: {}", id, result.deleted_count > 0);
        Ok(result.deleted_count > 0)
    }
}
