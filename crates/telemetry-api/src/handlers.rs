//! REST API endpoint handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness probe |
//! | `GET` | `/ready` | Readiness probe |
//! | `POST` | `/api/v1/telemetry/ingest` | Ingest one report and broadcast it |
//! | `GET` | `/api/v1/telemetry/latest` | Freshest processed document |
//! | `GET` | `/api/v1/telemetry/list` | Page of processed documents |
//! | `GET` | `/api/v1/telemetry/raw/latest` | Most recent raw record |
//! | `GET` | `/api/v1/telemetry/raw/list` | Page of raw records |

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use telemetry_core::{decode_report, RecordStore};
use telemetry_types::{RangeQuery, RawRangeQuery, RawRecordView, TelemetryDocument};
use validator::Validate;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Probes
// ---------------------------------------------------------------------------

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Readiness probe.
pub async fn ready() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ready" }))
}

// ---------------------------------------------------------------------------
// Processed telemetry
// ---------------------------------------------------------------------------

/// Decode, ingest, and broadcast one report.
///
/// The body is decoded at the schema boundary, so malformed and
/// out-of-range reports are rejected with 422 before anything is
/// written. A fan-out failure is logged and does not fail the request.
pub async fn ingest<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Bytes,
) -> Result<Json<TelemetryDocument>, ApiError> {
    let report = decode_report(&body)?;
    let record = state.ingestor.ingest(&report).await?;

    if let Err(e) = state.fanout.broadcast(&record.document) {
        tracing::warn!(ts = record.ts, error = %e, "broadcast after HTTP ingest failed");
    }

    Ok(Json(record.document))
}

/// The freshest processed document, or `null`.
pub async fn latest<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Option<TelemetryDocument>>, ApiError> {
    let record = state.store().latest().await?;
    Ok(Json(record.map(|r| r.document)))
}

/// A page of processed documents.
pub async fn list<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<Vec<TelemetryDocument>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    query
        .validate()
        .map_err(|e| ApiError::InvalidQuery(e.to_string()))?;

    let records = state.store().range(&query).await?;
    Ok(Json(records.into_iter().map(|r| r.document).collect()))
}

// ---------------------------------------------------------------------------
// Raw telemetry
// ---------------------------------------------------------------------------

/// The most recently received raw record, or `null`.
pub async fn raw_latest<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Option<RawRecordView>>, ApiError> {
    let view = state
        .store()
        .latest_raw()
        .await?
        .map(|r| r.to_view())
        .transpose()?;
    Ok(Json(view))
}

/// A page of raw records.
pub async fn raw_list<S: RecordStore>(
    State(state): State<Arc<AppState<S>>>,
    query: Result<Query<RawRangeQuery>, QueryRejection>,
) -> Result<Json<Vec<RawRecordView>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::InvalidQuery(e.body_text()))?;
    query
        .validate()
        .map_err(|e| ApiError::InvalidQuery(e.to_string()))?;

    let views = state
        .store()
        .range_raw(&query)
        .await?
        .iter()
        .map(telemetry_types::RawRecord::to_view)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}
