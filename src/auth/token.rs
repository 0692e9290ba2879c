//! Session token lifecycle: issue, validate, authorize, refresh.
//!
//! Tokens are HS256 JWTs carrying a fixed claim set. Signature and structure
//! are checked by `jsonwebtoken`; expiry is checked here against the injected
//! clock, in exactly one helper shared by `authorize` and `refresh`.

use std::collections::HashSet;
use std::sync::Arc;

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::clock::Clock;
use crate::error::{AppError, AppResult};

/// Fixed issuer claim.
pub const ISSUER: &str = "recipes_api_gin";

/// Message for every rejected token, whatever the cause.
const REJECTED: &str = "unauthorized";

// ============================================================================
// SECRET
// ============================================================================

/// Signing secret that never shows up in logs.
#[derive(Clone)]
pub struct JwtSecret(String);

impl JwtSecret {
    /// # Errors
    /// Returns `AppError::Config` if the secret is empty.
    pub fn new(secret: impl Into<String>) -> AppResult<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(AppError::config("JWT_SECRET must be set"));
        }
        Ok(Self(secret))
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JwtSecret([REDACTED, {} chars])", self.0.len())
    }
}

// ============================================================================
// POLICY & CLAIMS
// ============================================================================

/// Validity windows, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Validity of a token issued at sign-in or sign-up.
    pub issue_ttl_secs: i64,
    /// Validity of a token produced by refresh.
    pub refresh_ttl_secs: i64,
    /// A token may be refreshed once its remaining validity is at most this.
    pub refresh_band_secs: i64,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            issue_ttl_secs: 600,
            refresh_ttl_secs: 300,
            refresh_band_secs: 30,
        }
    }
}

/// Claims carried by every session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user name)
    pub sub: String,
    /// Issuer, always `ISSUER`
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    fn new(subject: impl Into<String>, now: i64, ttl_secs: i64) -> Self {
        Self {
            sub: subject.into(),
            iss: ISSUER.to_string(),
            iat: now,
            exp: now + ttl_secs,
        }
    }

    /// Seconds of validity left at `now`; zero or negative once expired.
    pub fn remaining_secs(&self, now: i64) -> i64 {
        self.exp - now
    }
}

/// A signed token handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    pub token: String,
}

/// Proof that a request passed the access gate.
///
/// Carries no identity: admission is all-or-nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admitted;

// ============================================================================
// MANAGER
// ============================================================================

/// Issues, validates and refreshes session tokens.
#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    policy: TokenPolicy,
    clock: Arc<dyn Clock>,
}

impl TokenManager {
    pub fn new(secret: &JwtSecret, policy: TokenPolicy, clock: Arc<dyn Clock>) -> Self {
        // Signature, algorithm and issuer only; expiry is ours to check.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.required_spec_claims = HashSet::from(["exp".to_string(), "sub".to_string()]);
        validation.set_issuer(&[ISSUER]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            policy,
            clock,
        }
    }

    /// Issue a token for `subject` valid for the issue window.
    pub fn issue(&self, subject: &str) -> AppResult<SessionToken> {
        let claims = Claims::new(subject, self.clock.now_epoch_secs(), self.policy.issue_ttl_secs);
        self.sign(&claims)
    }

    /// Verify signature and structure and return the claims.
    ///
    /// Expiry is NOT checked; use `authorize` or `refresh`.
    pub fn validate(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                debug!(error = %e, "token rejected");
                AppError::unauthorized(REJECTED)
            })
    }

    /// Validate the token and require it to be unexpired.
    pub fn authorize(&self, token: &str) -> AppResult<Admitted> {
        let claims = self.validate(token)?;
        self.ensure_unexpired(&claims, self.clock.now_epoch_secs())?;
        Ok(Admitted)
    }

    /// Exchange a token close to expiry for a new one.
    ///
    /// The new token keeps the subject and is valid for the refresh window
    /// from now. The presented token stays valid until its own expiry.
    pub fn refresh(&self, token: &str) -> AppResult<SessionToken> {
        let claims = self.validate(token)?;
        let now = self.clock.now_epoch_secs();
        self.ensure_unexpired(&claims, now)?;

        let remaining = claims.remaining_secs(now);
        if remaining > self.policy.refresh_band_secs {
            debug!(sub = %claims.sub, remaining, "refresh requested too early");
            return Err(AppError::unauthorized("token not yet eligible for refresh"));
        }

        let renewed = Claims::new(claims.sub, now, self.policy.refresh_ttl_secs);
        debug!(sub = %renewed.sub, exp = renewed.exp, "token refreshed");
        self.sign(&renewed)
    }

    fn ensure_unexpired(&self, claims: &Claims, now: i64) -> AppResult<()> {
        if claims.remaining_secs(now) <= 0 {
            debug!(sub = %claims.sub, exp = claims.exp, now, "token expired");
            return Err(AppError::unauthorized(REJECTED));
        }
        Ok(())
    }

    fn sign(&self, claims: &Claims) -> AppResult<SessionToken> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map(|token| SessionToken { token })
            .map_err(|e| AppError::config(format!("failed to sign token: {e}")))
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("policy", &self.policy)
            .field("clock", &"<Clock>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;

    const T0: i64 = 1_704_067_200; // 2024-01-01 00:00:00 UTC

    fn manager_with(secret: &str) -> (TokenManager, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::at(T0));
        let manager = TokenManager::new(
            &JwtSecret::new(secret).unwrap(),
            TokenPolicy::default(),
            clock.clone(),
        );
        (manager, clock)
    }

    #[test]
    fn test_empty_secret_is_config_error() {
        assert!(matches!(JwtSecret::new(""), Err(AppError::Config(_))));
        assert!(matches!(JwtSecret::new("   "), Err(AppError::Config(_))));
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = JwtSecret::new("hunter22").unwrap();
        let shown = format!("{secret:?}");
        assert!(!shown.contains("hunter22"));
        assert!(shown.contains("REDACTED"));
    }

    #[test]
    fn test_issue_sets_claims() {
        let (manager, _) = manager_with("secret");
        let token = manager.issue("alice").unwrap();
        let claims = manager.validate(&token.token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.iat, T0);
        assert_eq!(claims.exp, T0 + 600);
        assert_eq!(token.token.split('.').count(), 3);
    }

    #[test]
    fn test_validate_rejects_foreign_secret() {
        let (ours, _) = manager_with("our-secret");
        let (theirs, _) = manager_with("their-secret");

        let forged = theirs.issue("alice").unwrap();
        assert!(matches!(ours.validate(&forged.token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_validate_rejects_tampered_claims() {
        let (manager, _) = manager_with("secret");
        let token = manager.issue("alice").unwrap().token;
        let parts: Vec<&str> = token.split('.').collect();

        // Swap in the claims of a token for another subject, keep the signature.
        let other = manager.issue("mallory").unwrap().token;
        let other_claims = other.split('.').nth(1).unwrap();
        let tampered = format!("{}.{}.{}", parts[0], other_claims, parts[2]);

        assert!(manager.validate(&tampered).is_err());
    }

    #[test]
    fn test_validate_rejects_malformed() {
        let (manager, _) = manager_with("secret");
        assert!(manager.validate("").is_err());
        assert!(manager.validate("not-a-token").is_err());
        assert!(manager.validate("a.b.c").is_err());
    }

    #[test]
    fn test_validate_does_not_check_expiry() {
        let (manager, clock) = manager_with("secret");
        let token = manager.issue("alice").unwrap();
        clock.advance(3_600);
        assert!(manager.validate(&token.token).is_ok());
    }

    #[test]
    fn test_authorize_enforces_expiry() {
        let (manager, clock) = manager_with("secret");
        let token = manager.issue("alice").unwrap();

        clock.advance(599);
        assert_eq!(manager.authorize(&token.token).unwrap(), Admitted);

        clock.advance(1);
        assert!(matches!(manager.authorize(&token.token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_and_forged_are_indistinguishable() {
        let (manager, clock) = manager_with("secret");
        let (other, _) = manager_with("other");

        let expired = manager.issue("alice").unwrap();
        let forged = other.issue("alice").unwrap();
        clock.advance(601);

        let a = manager.authorize(&expired.token).unwrap_err().to_string();
        let b = manager.authorize(&forged.token).unwrap_err().to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn test_refresh_rejects_fresh_token() {
        let (manager, clock) = manager_with("secret");
        let token = manager.issue("alice").unwrap();

        clock.advance(60); // 540s left, band is 30s
        assert!(matches!(manager.refresh(&token.token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_refresh_at_band_edge() {
        let (manager, clock) = manager_with("secret");
        let token = manager.issue("alice").unwrap();

        clock.set(T0 + 569); // 31s left
        assert!(manager.refresh(&token.token).is_err());

        clock.set(T0 + 570); // exactly 30s left
        assert!(manager.refresh(&token.token).is_ok());
    }

    #[test]
    fn test_refresh_within_band_issues_new_window() {
        let (manager, clock) = manager_with("secret");
        let original = manager.issue("alice").unwrap();

        clock.set(T0 + 585); // +9m45s
        let renewed = manager.refresh(&original.token).unwrap();
        let claims = manager.validate(&renewed.token).unwrap();

        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iat, T0 + 585);
        assert_eq!(claims.exp, T0 + 585 + 300);
        assert_ne!(renewed, original);
    }

    #[test]
    fn test_original_token_can_be_refreshed_repeatedly() {
        // Tokens are stateless: refreshing does not consume the original,
        // so it can be exchanged again while it is still inside the band.
        let (manager, clock) = manager_with("secret");
        let original = manager.issue("alice").unwrap();

        clock.set(T0 + 585);
        let first = manager.refresh(&original.token).unwrap();

        clock.set(T0 + 586);
        let second = manager.refresh(&original.token).unwrap();

        assert_ne!(first, second);
        assert!(manager.authorize(&original.token).is_ok());
    }

    #[test]
    fn test_refresh_rejects_expired_token() {
        let (manager, clock) = manager_with("secret");
        let token = manager.issue("alice").unwrap();

        clock.set(T0 + 600);
        assert!(matches!(manager.refresh(&token.token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_refresh_rejects_foreign_secret() {
        let (ours, clock) = manager_with("secret");
        let (theirs, _) = manager_with("other");
        let forged = theirs.issue("alice").unwrap();

        clock.set(T0 + 590);
        assert!(ours.refresh(&forged.token).is_err());
    }

    #[test]
    fn test_refreshed_token_enters_band_again() {
        let (manager, clock) = manager_with("secret");
        let original = manager.issue("alice").unwrap();

        clock.set(T0 + 590);
        let renewed = manager.refresh(&original.token).unwrap();

        // 300s window: not eligible right away, eligible in its last 30s.
        assert!(manager.refresh(&renewed.token).is_err());
        clock.set(T0 + 590 + 275);
        assert!(manager.refresh(&renewed.token).is_ok());
    }
}
