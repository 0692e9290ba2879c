//! User credential model.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A stored credential (`users` collection).
///
/// `password` holds the hex-encoded digest, never the raw password.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Subject name (unique).
    pub username: String,

    /// Password digest.
    pub password: String,
}

impl Credential {
    pub fn new(username: impl Into<String>, digest: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            password: digest.into(),
        }
    }
}
