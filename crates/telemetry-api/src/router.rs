//! Axum router construction for the telemetry API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS and request tracing.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use telemetry_core::RecordStore;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /health`, `GET /ready` -- probes
/// - `GET /ws` -- `WebSocket` telemetry stream
/// - `POST /api/v1/telemetry/ingest`
/// - `GET /api/v1/telemetry/latest`, `GET /api/v1/telemetry/list`
/// - `GET /api/v1/telemetry/raw/latest`, `GET /api/v1/telemetry/raw/list`
///
/// `cors_origins` restricts cross-origin access; an empty list allows
/// any origin. Entries that are not valid header values are skipped.
pub fn build_router<S: RecordStore>(state: Arc<AppState<S>>, cors_origins: &[String]) -> Router {
    Router::new()
        // Probes
        .route("/health", get(handlers::health))
        .route("/ready", get(handlers::ready))
        // WebSocket
        .route("/ws", get(ws::ws_telemetry::<S>))
        // Processed telemetry
        .route("/api/v1/telemetry/ingest", post(handlers::ingest::<S>))
        .route("/api/v1/telemetry/latest", get(handlers::latest::<S>))
        .route("/api/v1/telemetry/list", get(handlers::list::<S>))
        // Raw telemetry
        .route("/api/v1/telemetry/raw/latest", get(handlers::raw_latest::<S>))
        .route("/api/v1/telemetry/raw/list", get(handlers::raw_list::<S>))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(origin = %o, error = %e, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
