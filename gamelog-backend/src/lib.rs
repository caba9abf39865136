pub mod config;
mod error;
mod helpers;
mod routes;
mod validation;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    routing::get,
};
use routes::{games, reviews};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub db: gamelog_db::Database,
}

/// CORS policy for the configured origins. Credentials are allowed, so
/// methods and headers are listed explicitly.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create the application router with the given database and configuration
pub fn create_app(
    db: gamelog_db::Database,
    request_body_limit: usize,
    request_timeout: Duration,
    cors_origins: &[String],
) -> Router {
    let state = Arc::new(AppState { db });

    let game_routes = Router::new()
        .route("/api/games", get(games::list_games).post(games::create_game))
        .route("/api/games/summary", get(games::game_summary))
        .route(
            "/api/games/{id}",
            get(games::get_game)
                .put(games::replace_game)
                .patch(games::update_game)
                .delete(games::delete_game),
        );

    let review_routes = Router::new()
        .route(
            "/api/reviews",
            get(reviews::list_reviews).post(reviews::create_review),
        )
        .route(
            "/api/reviews/game/{gameId}",
            get(reviews::list_reviews_by_game),
        )
        .route(
            "/api/reviews/{id}",
            get(reviews::get_review).delete(reviews::delete_review),
        );

    Router::new()
        .route("/health", get(routes::health))
        .merge(game_routes)
        .merge(review_routes)
        .fallback(routes::not_found)
        .method_not_allowed_fallback(routes::not_found)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        // Checked by the body extractor
        .layer(DefaultBodyLimit::max(request_body_limit))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
