//! Sign-up, sign-in and token refresh.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{info, warn};

use super::password::{password_digest, MIN_PASSWORD_LEN};
use super::token::{SessionToken, TokenManager};
use crate::database::CredentialStore;
use crate::error::{AppError, AppResult};
use crate::utils::bounded;

/// Credentials posted to sign-up and sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    pub username: String,
    pub password: String,
}

/// Authentication operations exposed to the dispatch layer.
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<TokenManager>,
    store_timeout: Duration,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialStore>, tokens: Arc<TokenManager>, store_timeout: Duration) -> Self {
        Self {
            credentials,
            tokens,
            store_timeout,
        }
    }

    /// Register a new subject and issue its first token.
    ///
    /// Input is validated before the store is touched. An existing subject
    /// is a `Conflict`, whether found by the pre-check or by the unique index.
    pub async fn sign_up(&self, subject: &str, raw_password: &str) -> AppResult<SessionToken> {
        if subject.trim().is_empty() {
            return Err(AppError::invalid_input("invalid signup credentials"));
        }
        if raw_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::invalid_input("password is too short"));
        }

        let digest = password_digest(raw_password);

        let existing = bounded(
            "find_credential",
            self.store_timeout,
            self.credentials.find_credential(subject, &digest),
        )
        .await?;
        if existing.is_some() {
            return Err(AppError::conflict("user already exists"));
        }

        let inserted = bounded(
            "insert_credential",
            self.store_timeout,
            self.credentials.insert_credential(subject, &digest),
        )
        .await?;
        if !inserted {
            return Err(AppError::conflict("user already exists"));
        }

        info!("New user signup: {}", subject);
        self.tokens.issue(subject)
    }

    /// Check a subject's password and issue a token.
    pub async fn sign_in(&self, subject: &str, raw_password: &str) -> AppResult<SessionToken> {
        let digest = password_digest(raw_password);

        let found = bounded(
            "find_credential",
            self.store_timeout,
            self.credentials.find_credential(subject, &digest),
        )
        .await?;

        match found {
            Some(credential) => {
                info!("User signed in: {}", credential.username);
                self.tokens.issue(&credential.username)
            }
            None => {
                warn!("Failed sign-in for {}", subject);
                Err(AppError::unauthorized("invalid username or password"))
            }
        }
    }

    /// Exchange a token close to expiry for a fresh one.
    pub fn refresh_token(&self, token: &str) -> AppResult<SessionToken> {
        self.tokens.refresh(token)
    }
}
