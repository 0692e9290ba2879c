//! Utility functions.

use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;

/// Run a store call under a deadline.
///
/// A call that does not finish within `after` is dropped and reported as
/// `StoreError::Timeout` naming `operation`.
pub async fn bounded<T, F>(operation: &'static str, after: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(after, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout { operation, after }),
    }
}
