//! Generator configuration.
//!
//! All configuration comes from environment variables:
//!
//! - `SIM_MODE` -- `nats` (default) or `http`
//! - `NATS_URL` -- NATS server (default `nats://localhost:4222`)
//! - `NATS_SUBJECT` -- publish subject (default `telemetry.combined.1`)
//! - `API_INGEST_URL` -- ingest route for `http` mode
//!   (default `http://localhost:8000/api/v1/telemetry/ingest`)
//! - `SIM_INTERVAL_MS` -- delay between reports (default 200)
//! - `SIM_SRC` -- source tag stamped on every report (default `sim`)

use std::str::FromStr;
use std::time::Duration;

use crate::error::SimError;

/// Where generated reports are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimMode {
    /// Publish JSON on the bus subject.
    Nats,
    /// POST JSON to the ingest route.
    Http,
}

impl FromStr for SimMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nats" => Ok(Self::Nats),
            "http" => Ok(Self::Http),
            other => Err(SimError::Config(format!(
                "unknown SIM_MODE {other:?}, expected nats or http"
            ))),
        }
    }
}

/// Complete generator configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    /// Transport.
    pub mode: SimMode,
    /// NATS server URL.
    pub nats_url: String,
    /// NATS subject to publish on.
    pub nats_subject: String,
    /// Ingest route URL.
    pub ingest_url: String,
    /// Delay between reports.
    pub interval: Duration,
    /// Source tag.
    pub src: String,
}

impl SimConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if a variable is present but invalid.
    pub fn from_env() -> Result<Self, SimError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Config`] if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SimError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mode = lookup("SIM_MODE")
            .map_or(Ok(SimMode::Nats), |raw| raw.parse())?;

        let interval_ms: u64 = lookup("SIM_INTERVAL_MS")
            .map_or(Ok(200), |raw| raw.trim().parse())
            .map_err(|e| SimError::Config(format!("invalid SIM_INTERVAL_MS: {e}")))?;
        if interval_ms == 0 {
            return Err(SimError::Config(String::from(
                "SIM_INTERVAL_MS must be greater than zero",
            )));
        }

        Ok(Self {
            mode,
            nats_url: lookup("NATS_URL").unwrap_or_else(|| String::from("nats://localhost:4222")),
            nats_subject: lookup("NATS_SUBJECT")
                .unwrap_or_else(|| String::from("telemetry.combined.1")),
            ingest_url: lookup("API_INGEST_URL").unwrap_or_else(|| {
                String::from("http://localhost:8000/api/v1/telemetry/ingest")
            }),
            interval: Duration::from_millis(interval_ms),
            src: lookup("SIM_SRC").unwrap_or_else(|| String::from("sim")),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<SimConfig, SimError> {
        let env: BTreeMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        SimConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.mode, SimMode::Nats);
        assert_eq!(config.nats_subject, "telemetry.combined.1");
        assert_eq!(config.interval, Duration::from_millis(200));
        assert_eq!(config.src, "sim");
    }

    #[test]
    fn http_mode_with_overrides() {
        let config = load(&[
            ("SIM_MODE", "HTTP"),
            ("API_INGEST_URL", "http://api:8000/api/v1/telemetry/ingest"),
            ("SIM_INTERVAL_MS", "50"),
            ("SIM_SRC", "feeder"),
        ])
        .unwrap();
        assert_eq!(config.mode, SimMode::Http);
        assert_eq!(config.ingest_url, "http://api:8000/api/v1/telemetry/ingest");
        assert_eq!(config.interval, Duration::from_millis(50));
        assert_eq!(config.src, "feeder");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(load(&[("SIM_MODE", "mqtt")]), Err(SimError::Config(_))));
        assert!(matches!(load(&[("SIM_INTERVAL_MS", "fast")]), Err(SimError::Config(_))));
        assert!(matches!(load(&[("SIM_INTERVAL_MS", "0")]), Err(SimError::Config(_))));
    }
}
