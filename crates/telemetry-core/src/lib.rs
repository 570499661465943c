//! Core pipeline for the vehicle telemetry service.
//!
//! Everything between "a report arrived" and "subscribers were told"
//! lives here, independent of the transport it arrived on and of the
//! storage backend behind it.
//!
//! # Modules
//!
//! - [`config`] -- YAML configuration with environment overrides
//! - [`derivation`] -- Control tuple to kinematic summary
//! - [`time_format`] -- UTC and zone-local timestamp rendering
//! - [`schema`] -- Report decoding and validation at the boundary
//! - [`store`] -- The [`RecordStore`] contract
//! - [`memory_store`] -- In-memory [`RecordStore`] backend
//! - [`ingest`] -- The ingestion pipeline
//! - [`fanout`] -- Real-time subscriber fan-out

pub mod config;
pub mod derivation;
pub mod fanout;
pub mod ingest;
pub mod memory_store;
pub mod schema;
pub mod store;
pub mod time_format;

pub use config::{ConfigError, StorageBackend, TelemetryConfig};
pub use derivation::derive_controls;
pub use fanout::{spawn_fanout, Fanout, FanoutError, FanoutHandle, Frame, Subscription};
pub use ingest::{now_ms, IngestError, Ingestor};
pub use memory_store::MemoryStore;
pub use schema::{check_report, decode_report, ReportError};
pub use store::{RecordStore, StoreError};
pub use time_format::{TimeError, TimeFormatter, Timestamps};
