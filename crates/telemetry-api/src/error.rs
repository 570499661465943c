//! Error types for the telemetry API.
//!
//! [`ApiError`] unifies all failure modes into a single enum that
//! can be converted into an Axum HTTP response via its
//! [`IntoResponse`](axum::response::IntoResponse) implementation.
//!
//! | Variant | Status |
//! |---------|--------|
//! | `Rejected` | 422 |
//! | `InvalidQuery` | 400 |
//! | everything else | 500 |

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use telemetry_core::{IngestError, ReportError, StoreError};

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request body is not a valid report.
    #[error(transparent)]
    Rejected(#[from] ReportError),

    /// An invalid query parameter was provided.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Ingestion failed after validation.
    #[error(transparent)]
    Ingest(IngestError),

    /// A store read failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A stored value could not be re-encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::Rejected(e) => Self::Rejected(e),
            other => Self::Ingest(other),
        }
    }
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            Self::Ingest(_) | Self::Store(_) | Self::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
