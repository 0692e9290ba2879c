//! Route handlers.

use axum::extract::{Path, Query, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;
use crate::auth::{bearer_token, SessionToken, SignInRequest};
use crate::database::{Recipe, RecipeFields, RecipeId};
use crate::error::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    tag: Option<String>,
}

pub async fn list_recipes(State(state): State<AppState>) -> AppResult<Json<Vec<Recipe>>> {
    Ok(Json(state.recipes.list_recipes().await?))
}

pub async fn search_recipes(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<Vec<Recipe>>> {
    let tag = params.tag.unwrap_or_default();
    Ok(Json(state.recipes.search_recipes(&tag).await?))
}

pub async fn get_recipe(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Recipe>> {
    Ok(Json(state.recipes.get_recipe(&RecipeId::new(id)).await?))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    Json(fields): Json<RecipeFields>,
) -> AppResult<(StatusCode, Json<Recipe>)> {
    let recipe = state.recipes.create_recipe(fields).await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn replace_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<RecipeFields>,
) -> AppResult<Json<Value>> {
    state.recipes.replace_recipe(&RecipeId::new(id), fields).await?;
    Ok(Json(json!({ "message": "Recipe updated" })))
}

pub async fn delete_recipe(State(state): State<AppState>, Path(id): Path<String>) -> AppResult<Json<Value>> {
    state.recipes.delete_recipe(&RecipeId::new(id)).await?;
    Ok(Json(json!({ "message": "Recipe has been deleted" })))
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> AppResult<(StatusCode, Json<SessionToken>)> {
    let token = state.auth.sign_up(&body.username, &body.password).await?;
    Ok((StatusCode::CREATED, Json(token)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(body): Json<SignInRequest>,
) -> AppResult<Json<SessionToken>> {
    Ok(Json(state.auth.sign_in(&body.username, &body.password).await?))
}

pub async fn refresh(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Json<SessionToken>> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| AppError::unauthorized("unauthorized"))?;

    Ok(Json(state.auth.refresh_token(token)?))
}
