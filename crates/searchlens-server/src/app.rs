use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware
/// attached.
///
/// Middleware is applied in outer-to-inner order:
///
/// 1. `TraceLayer` — structured request/response logging via `tracing`.
/// 2. `CorsLayer` — permissive CORS; the dashboard frontend runs on a
///    different origin and calls these routes directly.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/analyze", post(routes::analyze::analyze))
        .route(
            "/api/branded-terms",
            post(routes::branded::classify_branded_terms),
        )
        .route(
            "/api/export/search-terms",
            post(routes::export::export_search_terms),
        )
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
