//! Shared application state for the telemetry API.

use telemetry_core::{FanoutHandle, Ingestor, RecordStore};

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor. Generic over the record store so tests run against the
/// in-memory backend and production against `PostgreSQL`.
#[derive(Debug)]
pub struct AppState<S> {
    /// The ingestion pipeline; also the route to the store for reads.
    pub ingestor: Ingestor<S>,
    /// Handle to the real-time fan-out task.
    pub fanout: FanoutHandle,
}

impl<S: RecordStore> AppState<S> {
    /// Bundle the pipeline and fan-out handle.
    pub const fn new(ingestor: Ingestor<S>, fanout: FanoutHandle) -> Self {
        Self { ingestor, fanout }
    }

    /// The record store behind the pipeline.
    pub fn store(&self) -> &S {
        self.ingestor.store()
    }
}
