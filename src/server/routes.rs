//! Route table and middleware layers.

use super::{handlers, AppState};
use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        // Vehicle data
        .route(
            "/api/car/profile/{make}/{model}/{year}",
            get(handlers::get_profile),
        )
        .route(
            "/api/listings/{make}/{model}/{year}",
            get(handlers::search_listings),
        )
        .route("/api/safety/{make}/{model}/{year}", get(handlers::get_safety))
        .route("/api/insights/{make}/{model}", get(handlers::get_insights))
        // Calculators
        .route("/api/finance/payment", get(handlers::loan_payment))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
