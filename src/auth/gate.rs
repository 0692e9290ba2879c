//! Access gate in front of mutating routes.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use super::token::{Admitted, TokenManager};
use crate::error::{AppError, AppResult};

/// Header carrying the optional API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Admits a request only if it carries a valid, unexpired session token
/// (and the API key, when one is configured).
#[derive(Clone)]
pub struct AccessGate {
    tokens: Arc<TokenManager>,
    api_key: Option<Arc<str>>,
}

impl AccessGate {
    pub fn new(tokens: Arc<TokenManager>, api_key: Option<String>) -> Self {
        Self {
            tokens,
            api_key: api_key.map(Arc::from),
        }
    }

    /// Decide on a request from its headers.
    pub fn admit(&self, headers: &HeaderMap) -> AppResult<Admitted> {
        if let Some(expected) = &self.api_key {
            let presented = headers.get(API_KEY_HEADER).and_then(|h| h.to_str().ok());
            if presented != Some(expected.as_ref()) {
                debug!("request rejected: API key mismatch");
                return Err(AppError::unauthorized("unauthorized"));
            }
        }

        let token = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| {
                debug!("request rejected: no bearer token");
                AppError::unauthorized("unauthorized")
            })?;

        self.tokens.authorize(token)
    }
}

/// Token text from an `Authorization` value, with or without `Bearer `.
pub fn bearer_token(value: &str) -> Option<&str> {
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Axum middleware enforcing the gate.
///
/// A rejected request never reaches the wrapped handler.
pub async fn require_session(
    State(gate): State<AccessGate>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    gate.admit(request.headers())?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::auth::token::{JwtSecret, TokenPolicy};
    use axum::body::Body;
    use axum::http::{HeaderValue, Request, StatusCode};
    use axum::routing::post;
    use axum::{middleware, Router};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt; // for `oneshot`

    fn tokens() -> Arc<TokenManager> {
        Arc::new(TokenManager::new(
            &JwtSecret::new("gate-secret").unwrap(),
            TokenPolicy::default(),
            Arc::new(ManualClock::at(1_704_067_200)),
        ))
    }

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_bearer_token_prefix_optional() {
        assert_eq!(bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token(""), None);
    }

    #[test]
    fn test_admit_valid_token() {
        let tokens = tokens();
        let gate = AccessGate::new(tokens.clone(), None);
        let token = tokens.issue("alice").unwrap().token;

        assert!(gate.admit(&headers(&[("authorization", token.as_str())])).is_ok());
        let bearer = format!("Bearer {token}");
        assert!(gate.admit(&headers(&[("authorization", bearer.as_str())])).is_ok());
    }

    #[test]
    fn test_admit_rejects_missing_header() {
        let gate = AccessGate::new(tokens(), None);
        assert!(matches!(gate.admit(&HeaderMap::new()), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_admit_requires_configured_api_key() {
        let tokens = tokens();
        let gate = AccessGate::new(tokens.clone(), Some("k-123".into()));
        let token = tokens.issue("alice").unwrap().token;

        assert!(gate.admit(&headers(&[("authorization", token.as_str())])).is_err());
        assert!(gate
            .admit(&headers(&[("authorization", token.as_str()), ("x-api-key", "wrong")]))
            .is_err());
        assert!(gate
            .admit(&headers(&[("authorization", token.as_str()), ("x-api-key", "k-123")]))
            .is_ok());
    }

    #[tokio::test]
    async fn test_rejected_request_has_no_side_effect() {
        let gate = AccessGate::new(tokens(), None);
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let app = Router::new()
            .route(
                "/protected",
                post(move || {
                    let counter = counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        "done"
                    }
                }),
            )
            .layer(middleware::from_fn_with_state(gate, require_session));

        let request = Request::builder()
            .method("POST")
            .uri("/protected")
            .header("authorization", "garbage")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
