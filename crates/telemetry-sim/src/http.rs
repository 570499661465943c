//! Direct transport: POSTs each report to the ingest route.

use std::time::Duration;

use telemetry_types::Report;
use tracing::warn;

use crate::error::SimError;

/// Per-request deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest response body echoed into a warning.
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for the ingest route.
pub struct HttpPoster {
    client: reqwest::Client,
    url: String,
}

impl HttpPoster {
    /// Build a client targeting `url`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Http`] if the client cannot be constructed.
    pub fn new(url: &str) -> Result<Self, SimError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }

    /// POST one report.
    ///
    /// A non-success status is logged, not returned, so a rejected sample
    /// does not stop the generator.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Http`] if the route is unreachable.
    pub async fn send(&self, report: &Report) -> Result<(), SimError> {
        let response = self.client.post(&self.url).json(report).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            warn!(status = status.as_u16(), body = body, "ingest route rejected report");
        }
        Ok(())
    }
}
