//! HTTP + `WebSocket` API for the vehicle telemetry pipeline.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **Ingest endpoint** (`POST /api/v1/telemetry/ingest`) feeding the
//!   shared ingestion pipeline, then the real-time fan-out
//! - **Query endpoints** for processed and raw records (latest + paged)
//! - **`WebSocket` endpoint** (`/ws`) subscribed to the fan-out
//! - **Probes** (`/health`, `/ready`)
//!
//! Handlers are generic over the [`RecordStore`](telemetry_core::RecordStore),
//! so the same router serves the `PostgreSQL` and in-memory backends.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{start_server, ServerConfig, ServerError};
pub use startup::{spawn_api, StartupError};
pub use state::AppState;
