//! Configuration module for the recipes service.
//!
//! Loads configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::{JwtSecret, TokenPolicy};
use crate::error::{AppError, AppResult};

/// What the read path does when the cache store faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheErrorPolicy {
    /// Log the fault and read from the record store.
    #[default]
    Fallthrough,
    /// Fail the read with a store error.
    Surface,
}

impl FromStr for CacheErrorPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fallthrough" => Ok(Self::Fallthrough),
            "surface" => Ok(Self::Surface),
            other => Err(AppError::config(format!(
                "CACHE_ERROR_POLICY must be 'fallthrough' or 'surface', got '{other}'"
            ))),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    /// Redis URL. When unset the in-process cache is used.
    pub redis_url: Option<String>,
    pub redis_pool_size: usize,

    /// Max entries of the in-process cache.
    pub cache_capacity: u64,
    pub cache_error_policy: CacheErrorPolicy,

    // Tokens
    pub jwt_secret: JwtSecret,
    pub token_policy: TokenPolicy,

    /// Extra key required on write routes, if set.
    pub api_key: Option<String>,

    /// Deadline for every record store and cache store call.
    pub store_timeout: Duration,

    pub listen_addr: SocketAddr,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns `AppError::Config` if a required variable is missing or a
    /// numeric variable does not parse.
    pub fn from_env() -> AppResult<Self> {
        let mongodb_uri = required("MONGO_URI")?;
        let mongodb_database = env::var("MONGO_DATABASE").unwrap_or_else(|_| "demo".to_string());

        let redis_url = env::var("REDIS_URL").ok().filter(|s| !s.trim().is_empty());

        let jwt_secret = JwtSecret::new(env::var("JWT_SECRET").unwrap_or_default())?;

        let defaults = TokenPolicy::default();
        let token_policy = TokenPolicy {
            issue_ttl_secs: parsed("JWT_TTL_SECS", defaults.issue_ttl_secs)?,
            refresh_ttl_secs: parsed("JWT_REFRESH_TTL_SECS", defaults.refresh_ttl_secs)?,
            refresh_band_secs: parsed("JWT_REFRESH_BAND_SECS", defaults.refresh_band_secs)?,
        };

        let cache_error_policy = match env::var("CACHE_ERROR_POLICY") {
            Ok(raw) => raw.parse()?,
            Err(_) => CacheErrorPolicy::default(),
        };

        Ok(Self {
            mongodb_uri,
            mongodb_database,
            redis_url,
            redis_pool_size: parsed("REDIS_POOL_SIZE", 8)?,
            cache_capacity: parsed("CACHE_CAPACITY", 1024)?,
            cache_error_policy,
            jwt_secret,
            token_policy,
            api_key: env::var("X_API_KEY").ok().filter(|s| !s.is_empty()),
            store_timeout: Duration::from_millis(parsed("STORE_TIMEOUT_MS", 5_000)?),
            listen_addr: parsed("LISTEN_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
        })
    }
}

fn required(name: &str) -> AppResult<String> {
    env::var(name)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::config(format!("{name} must be set")))
}

fn parsed<T: FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::config(format!("{name} has an invalid value: '{raw}'"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_policy_parse() {
        assert_eq!("fallthrough".parse::<CacheErrorPolicy>().unwrap(), CacheErrorPolicy::Fallthrough);
        assert_eq!(" Surface ".parse::<CacheErrorPolicy>().unwrap(), CacheErrorPolicy::Surface);
        assert!(matches!(
            "sometimes".parse::<CacheErrorPolicy>(),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_default_policy_falls_through() {
        assert_eq!(CacheErrorPolicy::default(), CacheErrorPolicy::Fallthrough);
    }
}
