pub(crate) mod games;
pub(crate) mod reviews;

use crate::error::{AppError, ErrorResponse};
use crate::helpers::format_timestamp;

use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::IntoResponse,
};
use axum_macros::FromRequestParts;
use gamelog_db::{Game, GameSummary, PageRequest, Review};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameResponse {
    id: String,
    name: String,
    genre: String,
    cover: String,
    rating: f64,
    status: String,
    hours_played: i64,
    created_at: String,
    updated_at: String,
}

impl From<Game> for GameResponse {
    fn from(game: Game) -> Self {
        Self {
            id: game.id.to_string(),
            name: game.name,
            genre: game.genre,
            cover: game.cover,
            rating: game.rating,
            status: game.status,
            hours_played: game.hours_played,
            created_at: format_timestamp(game.created_at),
            updated_at: format_timestamp(game.updated_at),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ReviewResponse {
    id: String,
    game_id: String,
    game_name: String,
    review: String,
    rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover: Option<String>,
    created_at: String,
    updated_at: String,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id.to_string(),
            game_id: review.game_id.to_string(),
            game_name: review.game_name,
            review: review.review,
            rating: review.rating,
            cover: review.cover,
            created_at: format_timestamp(review.created_at),
            updated_at: format_timestamp(review.updated_at),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusEntry {
    status: String,
    count: u64,
    hours_played: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Totals {
    total_games: u64,
    total_hours_played: i64,
    rating_average: f64,
}

#[derive(Serialize)]
pub(crate) struct SummaryResponse {
    breakdown: Vec<StatusEntry>,
    totals: Totals,
}

impl From<GameSummary> for SummaryResponse {
    fn from(summary: GameSummary) -> Self {
        Self {
            breakdown: summary
                .breakdown
                .into_iter()
                .map(|entry| StatusEntry {
                    status: entry.status,
                    count: entry.count,
                    hours_played: entry.hours_played,
                })
                .collect(),
            totals: Totals {
                total_games: summary.totals.total_games,
                total_hours_played: summary.totals.total_hours_played,
                rating_average: summary.totals.rating_average,
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Pagination {
    page: u64,
    limit: u64,
    total: u64,
    total_pages: u64,
}

/// Envelope for paginated listings.
#[derive(Serialize)]
pub(crate) struct Paginated<T> {
    data: Vec<T>,
    pagination: Pagination,
}

impl<T> Paginated<T> {
    pub(crate) fn new(data: Vec<T>, page: PageRequest, total: u64) -> Self {
        Self {
            data,
            pagination: Pagination {
                page: page.page,
                limit: page.limit,
                total,
                total_pages: page.total_pages(total),
            },
        }
    }
}

/// `Path` whose rejections use the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub(crate) struct PathParam<T>(pub T);

/// `Query` whose rejections use the error envelope.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub(crate) struct QueryParams<T>(pub T);

/// Raw JSON body, left untyped so validators can report every field.
pub(crate) struct JsonBody(pub Value);

impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state).await?;
        json_body(&body).map(JsonBody)
    }
}

/// Parse a JSON request body. An empty body is an empty object.
pub(crate) fn json_body(body: &Bytes) -> Result<Value, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(body).map_err(|e| AppError::MalformedBody(e.to_string()))
}

pub(crate) async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

pub(crate) async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Resource not found")),
    )
}
