use crate::AppState;
use crate::error::AppError;
use crate::helpers::normalize_rating;
use crate::routes::{JsonBody, Paginated, PathParam, QueryParams, ReviewResponse};
use crate::validation::{self, Part, ReviewDraft};

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::debug_handler;
use gamelog_db::{Game, NewReview, ObjectId, ReviewFilter};
use std::collections::HashMap;
use std::sync::Arc;

#[debug_handler]
pub(crate) async fn list_reviews(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let page = Part::Query.check(validation::pagination_query(&validation::query_object(query)))?;

    let reviews = state.db.list_reviews(ReviewFilter::All, page).await?;
    let total = state.db.count_reviews(ReviewFilter::All).await?;

    Ok(Json(Paginated::new(
        reviews.into_iter().map(ReviewResponse::from).collect(),
        page,
        total,
    )))
}

pub(crate) async fn list_reviews_by_game(
    State(state): State<Arc<AppState>>,
    PathParam(game_id): PathParam<String>,
    QueryParams(query): QueryParams<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let (game_id, page) = validation::both(
        Part::Params.check(validation::object_id("gameId", &game_id)),
        Part::Query.check(validation::pagination_query(&validation::query_object(query))),
    )?;
    let filter = ReviewFilter::ByGame(ObjectId::parse(&game_id)?);

    let reviews = state.db.list_reviews(filter, page).await?;
    let total = state.db.count_reviews(filter).await?;

    Ok(Json(Paginated::new(
        reviews.into_iter().map(ReviewResponse::from).collect(),
        page,
        total,
    )))
}

pub(crate) async fn get_review(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = Part::Params.check(validation::object_id("id", &id))?;

    let review = state
        .db
        .get_review(&id)
        .await?
        .ok_or(AppError::NotFound("Review not found"))?;

    Ok(Json(ReviewResponse::from(review)))
}

#[debug_handler]
pub(crate) async fn create_review(
    State(state): State<Arc<AppState>>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, AppError> {
    let draft = Part::Body.check(validation::review_payload(&body))?;

    let game = state
        .db
        .get_game(&draft.game_id)
        .await?
        .ok_or(AppError::NotFound("Game not found for provided gameId"))?;

    let review = state.db.create_review(resolve_review(draft, &game)).await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))))
}

pub(crate) async fn delete_review(
    State(state): State<Arc<AppState>>,
    PathParam(id): PathParam<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = Part::Params.check(validation::object_id("id", &id))?;

    state.db.delete_review(&id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Fill the snapshot fields from the game as it is right now.
fn resolve_review(draft: ReviewDraft, game: &Game) -> NewReview {
    let game_name = draft
        .game_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| game.name.clone());

    NewReview {
        game_id: game.id,
        game_name,
        review: draft.review.trim().to_string(),
        rating: normalize_rating(draft.rating),
        cover: draft.cover.or_else(|| Some(game.cover.clone())),
    }
}
