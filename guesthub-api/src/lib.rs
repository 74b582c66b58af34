use axum::{
    http::{header, Method},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bookings;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod rooms;
pub mod state;

pub use state::{AppState, AuthConfig};

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .merge(auth::routes())
        .merge(rooms::routes())
        .merge(bookings::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness only; does not touch the store.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
