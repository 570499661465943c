//! Telemetry service binary.
//!
//! Wires the record store, the ingestion pipeline, the real-time
//! fan-out, the HTTP + `WebSocket` API, and the NATS bus bridge into one
//! process, then runs until interrupted.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `telemetry-config.yaml` (path overridable
//!    with `TELEMETRY_CONFIG`), with environment overrides applied
//! 2. Initialize structured logging (tracing)
//! 3. Resolve the display timezone
//! 4. Start the fan-out task
//! 5. Open the record store (`PostgreSQL` with migrations, or in-memory)
//! 6. Start the API server
//! 7. Start the NATS bus bridge
//! 8. Wait for Ctrl-C, then stop the background tasks

mod error;
mod nats_bridge;

use std::path::PathBuf;
use std::sync::Arc;

use telemetry_api::{spawn_api, AppState, ServerConfig};
use telemetry_core::{
    spawn_fanout, FanoutHandle, Ingestor, MemoryStore, RecordStore, StorageBackend,
    TelemetryConfig, TimeFormatter,
};
use telemetry_db::{PgRecordStore, PostgresPool};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::nats_bridge::{spawn_bridge, NatsBridge};

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "telemetry-config.yaml";

/// Application entry point for the telemetry service.
///
/// # Errors
///
/// Returns an error if configuration, storage, or the API listener
/// cannot be set up.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_tracing(&config);
    info!("telemetry-server starting");
    info!(
        storage = ?config.infrastructure.storage,
        vmax_mps = config.derivation.vmax_mps,
        timezone = config.time.timezone,
        port = config.server.port,
        "Configuration loaded"
    );

    // 3. Resolve the display timezone; unknown zones fall back to UTC.
    let formatter = TimeFormatter::new(&config.time.timezone);

    // 4. Start the fan-out task.
    let (fanout, fanout_task) = spawn_fanout();

    // 5. Open the record store and run the rest of the service over it.
    match config.infrastructure.storage {
        StorageBackend::Postgres => {
            let pool = PostgresPool::connect_url(&config.infrastructure.postgres_url)
                .await
                .map_err(EngineError::from)?;
            pool.run_migrations().await.map_err(EngineError::from)?;
            pool.ping().await.map_err(EngineError::from)?;

            let result = run(&config, PgRecordStore::new(pool.clone()), formatter, fanout).await;
            pool.close().await;
            result?;
        }
        StorageBackend::Memory => {
            info!("Using in-memory record store; records are lost on exit");
            run(&config, MemoryStore::new(), formatter, fanout).await?;
        }
    }

    fanout_task.abort();
    info!("telemetry-server stopped");
    Ok(())
}

/// Start the API and the bus bridge over `store`, then wait for Ctrl-C.
async fn run<S: RecordStore>(
    config: &TelemetryConfig,
    store: S,
    formatter: TimeFormatter,
    fanout: FanoutHandle,
) -> Result<(), EngineError> {
    let ingestor = Ingestor::new(Arc::new(store), config.derivation.vmax_mps, formatter);

    // 6. Start the API server.
    let state = Arc::new(AppState::new(ingestor.clone(), fanout.clone()));
    let api_handle = spawn_api(&ServerConfig::from(&config.server), state).await?;

    // 7. Start the bus bridge.
    let bridge = NatsBridge::new(
        ingestor,
        fanout,
        &config.infrastructure.nats_url,
        &config.infrastructure.nats_subject,
    );
    let bridge_handle = spawn_bridge(bridge);
    info!(
        nats_url = config.infrastructure.nats_url,
        subject = config.infrastructure.nats_subject,
        "NATS bus bridge started"
    );

    // 8. Run until interrupted.
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");

    bridge_handle.abort();
    api_handle.abort();
    Ok(())
}

/// Load configuration from the YAML file if present, else from defaults.
///
/// Environment overrides apply in both cases.
fn load_config() -> Result<TelemetryConfig, EngineError> {
    let config_path = std::env::var("TELEMETRY_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    if config_path.exists() {
        Ok(TelemetryConfig::from_file(&config_path)?)
    } else {
        Ok(TelemetryConfig::from_env()?)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(config: &TelemetryConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}
