//! Synthetic report generator for the telemetry pipeline.
//!
//! Emits one [`Report`](telemetry_types::Report) every `SIM_INTERVAL_MS`
//! either on the NATS bus subject or through the HTTP ingest route, so
//! both ingestion paths of the service can be exercised without a car.
//!
//! ```text
//! generator --> NATS subject --> bus bridge --\
//!          \--> POST /api/v1/telemetry/ingest --> pipeline --> fan-out
//! ```

mod config;
mod error;
mod generator;
mod http;
mod nats;

use std::time::Instant;

use anyhow::Context as _;
use telemetry_types::Report;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{SimConfig, SimMode};
use crate::error::SimError;
use crate::http::HttpPoster;
use crate::nats::NatsPublisher;

/// The configured transport.
enum Sink {
    Nats(NatsPublisher),
    Http(HttpPoster),
}

impl Sink {
    async fn open(config: &SimConfig) -> Result<Self, SimError> {
        match config.mode {
            SimMode::Nats => Ok(Self::Nats(
                NatsPublisher::connect(&config.nats_url, &config.nats_subject).await?,
            )),
            SimMode::Http => Ok(Self::Http(HttpPoster::new(&config.ingest_url)?)),
        }
    }

    async fn send(&self, report: &Report) -> Result<(), SimError> {
        match self {
            Self::Nats(publisher) => publisher.send(report).await,
            Self::Http(poster) => poster.send(report).await,
        }
    }
}

/// Application entry point.
///
/// Runs until interrupted. Send failures are logged and the next sample
/// is generated on schedule.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config = SimConfig::from_env().context("loading simulator configuration")?;
    info!(
        mode = ?config.mode,
        interval_ms = config.interval.as_millis(),
        src = config.src,
        "telemetry-sim starting"
    );

    let sink = Sink::open(&config)
        .await
        .context("opening report transport")?;

    let mut ticker = tokio::time::interval(config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let started = Instant::now();
    let mut rng = rand::rng();
    let mut sent: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!(sent = sent, "telemetry-sim stopping");
                return Ok(());
            }
        }

        let report = generator::report_at(started.elapsed().as_secs_f64(), &config.src, &mut rng);
        match sink.send(&report).await {
            Ok(()) => sent = sent.saturating_add(1),
            Err(e) => warn!(error = %e, "failed to send report"),
        }
    }
}
