//! Credential repository backed by the `users` collection.

use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::Collection;
use tracing::debug;

use super::CredentialStore;
use crate::database::models::Credential;
use crate::database::mongo::USERS_COLLECTION;
use crate::database::Database;
use crate::error::StoreError;

/// MongoDB duplicate key error code.
const DUPLICATE_KEY: i32 = 11000;

/// Repository for user credentials.
#[derive(Clone)]
pub struct CredentialRepository {
    collection: Collection<Credential>,
}

impl CredentialRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USERS_COLLECTION),
        }
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == DUPLICATE_KEY
    )
}

#[async_trait]
impl CredentialStore for CredentialRepository {
    async fn find_credential(&self, subject: &str, digest: &str) -> Result<Option<Credential>, StoreError> {
        let filter = doc! { "username": subject, "password": digest };
        let result = self.collection.find_one(filter).await?;
        debug!("DB find credential for {}: {:?}", subject, result.is_some());
        Ok(result)
    }

    async fn insert_credential(&self, subject: &str, digest: &str) -> Result<bool, StoreError> {
        match self.collection.insert_one(Credential::new(subject, digest)).await {
            Ok(result) => {
                debug!("Inserted credential for {} with id {}", subject, result.inserted_id);
                Ok(true)
            }
            Err(e) if is_duplicate_key(&e) => {
                debug!("Credential for {} already exists", subject);
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
