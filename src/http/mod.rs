//! HTTP dispatch layer.
//!
//! Thin axum routes over `RecipeService` and `AuthService`. Write routes sit
//! behind the access gate.

mod handlers;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{middleware, Router};

use crate::auth::{require_session, AccessGate, AuthService};
use crate::recipes::RecipeService;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub recipes: Arc<RecipeService>,
    pub auth: Arc<AuthService>,
    pub gate: AccessGate,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/recipes", post(handlers::create_recipe))
        .route(
            "/recipes/:id",
            put(handlers::replace_recipe).delete(handlers::delete_recipe),
        )
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            require_session,
        ));

    Router::new()
        .route("/recipes", get(handlers::list_recipes))
        .route("/recipes/search", get(handlers::search_recipes))
        .route("/recipes/:id", get(handlers::get_recipe))
        .route("/signup", post(handlers::sign_up))
        .route("/signin", post(handlers::sign_in))
        .route("/refresh", post(handlers::refresh))
        .merge(protected)
        .with_state(state)
}
