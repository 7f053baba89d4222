//! Axum router wiring (spec §6).

use crate::http::auth::require_auth;
use crate::http::handlers::{collections, health, search, upsert};
use crate::http::request_id::propagate_request_id;
use crate::state::AppState;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Builds the full HTTP surface: `/healthz` is unauthenticated and
/// mounted outside the auth layer; everything else requires the
/// configured bearer/API-key token when one is set (spec §4.8). Every
/// request is tagged with a request id (taken from `X-Request-Id` or
/// generated) before anything else runs, so it is present on both the
/// trace span and the response.
#[must_use]
pub fn build_router(state: AppState) -> Router {
    let request_budget = state.config.defaults.request_budget;

    let protected = Router::new()
        .route("/upsert", post(upsert::upsert))
        .route("/search", post(search::search))
        .route("/collections", get(collections::list_collections))
        .route("/collections/{name}/stats", get(collections::collection_stats))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/healthz", get(health::health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_budget))
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(propagate_request_id))
        .with_state(state)
}
