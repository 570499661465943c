//! Error types for the report generator.

/// Errors that can occur while generating and sending reports.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Failed to connect to or publish on the NATS server.
    #[error("NATS error: {0}")]
    Nats(String),

    /// The ingest route was unreachable or the client could not be built.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A report could not be serialized.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
