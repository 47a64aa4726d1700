//! HTTP routes

mod audio;
mod briefings;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state);
    let body_limit = DefaultBodyLimit::max(state.config.server.max_body_bytes);

    let router = Router::new()
        .route("/health", get(health))
        .route("/v1/audio/decode", post(audio::decode))
        .route("/v1/audio/wav", post(audio::wav))
        .route("/v1/briefings", post(briefings::create))
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn cors_layer(state: &AppState) -> Option<CorsLayer> {
    let server = &state.config.server;
    if !server.cors_enabled {
        return None;
    }
    if server.cors_origins.is_empty() || server.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::new().allow_origin(Any).allow_headers(Any).allow_methods(Any));
    }
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();
    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_headers(Any)
            .allow_methods(Any),
    )
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
