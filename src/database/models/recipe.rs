//! Recipe models.
//!
//! `Recipe` is the wire and cache shape. `RecipeDocument` is how a recipe is
//! laid out in the `recipes` collection.

use std::fmt;

use chrono::{DateTime, Timelike, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Truncate `at` to the millisecond precision of a BSON date.
pub fn store_precision(at: DateTime<Utc>) -> DateTime<Utc> {
    at.with_nanosecond(at.nanosecond() / 1_000_000 * 1_000_000)
        .unwrap_or(at)
}

/// Opaque recipe identifier assigned by the record store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(String);

impl RecipeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ObjectId> for RecipeId {
    fn from(id: ObjectId) -> Self {
        Self(id.to_hex())
    }
}

/// A recipe as returned to callers and stored in the cache entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub tags: Vec<String>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub published_at: DateTime<Utc>,
}

impl Recipe {
    /// Assemble a recipe from its replaceable fields.
    pub fn from_fields(id: RecipeId, fields: RecipeFields, published_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: fields.name,
            tags: fields.tags,
            ingredients: fields.ingredients,
            instructions: fields.instructions,
            published_at,
        }
    }

    /// Case-insensitive tag match.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == wanted)
    }
}

/// The fields a caller supplies on create, and overwrites in full on replace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeFields {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

/// A recipe document in the `recipes` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDocument {
    /// MongoDB document ID
    #[serde(rename = "_id")]
    pub id: ObjectId,

    pub name: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub ingredients: Vec<String>,

    #[serde(default)]
    pub instructions: Vec<String>,

    #[serde(rename = "publishedAt")]
    pub published_at: mongodb::bson::DateTime,
}

impl RecipeDocument {
    /// Create a new document with a fresh ObjectId.
    pub fn new(fields: RecipeFields, published_at: DateTime<Utc>) -> Self {
        Self {
            id: ObjectId::new(),
            name: fields.name,
            tags: fields.tags,
            ingredients: fields.ingredients,
            instructions: fields.instructions,
            published_at: mongodb::bson::DateTime::from_millis(published_at.timestamp_millis()),
        }
    }
}

impl From<RecipeDocument> for Recipe {
    fn from(doc: RecipeDocument) -> Self {
        let published_at =
            DateTime::from_timestamp_millis(doc.published_at.timestamp_millis()).unwrap_or_default();

        Self {
            id: doc.id.into(),
            name: doc.name,
            tags: doc.tags,
            ingredients: doc.ingredients,
            instructions: doc.instructions,
            published_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_wire_shape() {
        let recipe = Recipe::from_fields(
            RecipeId::new("65f1c0ffee0000000000abcd"),
            RecipeFields {
                name: "Pasta".into(),
                tags: vec!["italian".into()],
                ..Default::default()
            },
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        );

        let value = serde_json::to_value(&recipe).unwrap();
        assert_eq!(value["id"], "65f1c0ffee0000000000abcd");
        assert_eq!(value["publishedAt"], "2023-11-14T22:13:20Z");
        assert_eq!(value["tags"][0], "italian");
    }

    #[test]
    fn test_has_tag_ignores_case() {
        let recipe = Recipe::from_fields(
            RecipeId::new("1"),
            RecipeFields {
                name: "Ramen".into(),
                tags: vec!["Japanese".into(), "soup".into()],
                ..Default::default()
            },
            Utc::now(),
        );
        assert!(recipe.has_tag("japanese"));
        assert!(recipe.has_tag("SOUP"));
        assert!(!recipe.has_tag("italian"));
    }

    #[test]
    fn test_fields_default_missing_lists() {
        let fields: RecipeFields = serde_json::from_str(r#"{"name":"Toast"}"#).unwrap();
        assert_eq!(fields.name, "Toast");
        assert!(fields.tags.is_empty());
        assert!(fields.instructions.is_empty());
    }

    #[test]
    fn test_document_keeps_millisecond_timestamp() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        let doc = RecipeDocument::new(RecipeFields { name: "Soup".into(), ..Default::default() }, at);
        let id = doc.id;
        let recipe = Recipe::from(doc);
        assert_eq!(recipe.published_at, at);
        assert_eq!(recipe.id, RecipeId::from(id));
    }

    #[test]
    fn test_sub_millisecond_timestamp_survives_document_round_trip() {
        let at = DateTime::from_timestamp(1_700_000_000, 123_456_789).unwrap();
        let stamped = store_precision(at);
        assert_eq!(stamped, DateTime::from_timestamp_millis(1_700_000_000_123).unwrap());

        let doc = RecipeDocument::new(RecipeFields { name: "Soup".into(), ..Default::default() }, stamped);
        assert_eq!(Recipe::from(doc).published_at, stamped);
    }
}
