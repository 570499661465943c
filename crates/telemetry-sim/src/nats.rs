//! Bus transport: publishes each report as JSON on a NATS subject.

use telemetry_types::Report;
use tracing::info;

use crate::error::SimError;

/// NATS publisher for generated reports.
pub struct NatsPublisher {
    client: async_nats::Client,
    subject: String,
}

impl NatsPublisher {
    /// Connect to the NATS server at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Nats`] if the connection cannot be established.
    pub async fn connect(url: &str, subject: &str) -> Result<Self, SimError> {
        let client = async_nats::connect(url)
            .await
            .map_err(|e| SimError::Nats(format!("failed to connect to {url}: {e}")))?;
        info!(url = url, subject = subject, "NATS connection established");
        Ok(Self {
            client,
            subject: subject.to_owned(),
        })
    }

    /// Publish one report.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Serde`] if the report cannot be encoded, or
    /// [`SimError::Nats`] if the publish fails.
    pub async fn send(&self, report: &Report) -> Result<(), SimError> {
        let payload = serde_json::to_vec(report)?;
        self.client
            .publish(self.subject.clone(), payload.into())
            .await
            .map_err(|e| SimError::Nats(format!("failed to publish on {}: {e}", self.subject)))
    }
}
