use crate::AppState;
use crate::error::AppError;
use crate::helpers::{normalize_game, normalize_game_patch};
use crate::routes::{GameResponse, JsonBody, PathParam, QueryParams, SummaryResponse};
use crate::validation::{self, Part};

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use std::collections::HashMap;
use std::sync::Arc;

#[debug_handler]
pub(crate) async fn list_games(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let sort = Part::Query.check(validation::sort_query(&validation::query_object(query)))?;

    let games = state.db.list_games(sort).await?;

    Ok(Json(
        games.into_iter().map(GameResponse::from).collect::<Vec<_>>(),
    ))
}

pub(crate) async fn game_summary(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let summary = state.db.game_summary().await?;

    Ok(Json(SummaryResponse::from(summary)))
}

pub(crate) async fn get_game(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = Part::Params.check(validation::required_id("id", &id))?;

    let game = state
        .db
        .get_game(&id)
        .await?
        .ok_or(AppError::NotFound("Game not found"))?;

    Ok(Json(GameResponse::from(game)))
}

#[debug_handler]
pub(crate) async fn create_game(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let draft = Part::Body.check(validation::game_payload(&body))?;

    let game = state.db.create_game(normalize_game(draft)).await?;

    Ok((StatusCode::CREATED, Json(GameResponse::from(game))))
}

pub(crate) async fn replace_game(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let (id, draft) = validation::both(
        Part::Params.check(validation::required_id("id", &id)),
        Part::Body.check(validation::game_payload(&body)),
    )?;

    let game = state.db.replace_game(&id, normalize_game(draft)).await?;

    Ok(Json(GameResponse::from(game)))
}

pub(crate) async fn update_game(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<String>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let (id, patch) = validation::both(
        Part::Params.check(validation::required_id("id", &id)),
        Part::Body.check(validation::game_patch(&body)),
    )?;

    let game = state
        .db
        .update_game(&id, normalize_game_patch(patch))
        .await?;

    Ok(Json(GameResponse::from(game)))
}

pub(crate) async fn delete_game(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = Part::Params.check(validation::required_id("id", &id))?;

    state.db.delete_game(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}
