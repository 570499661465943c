//! `PostgreSQL` data layer for the vehicle telemetry pipeline.
//!
//! # Tables
//!
//! ```text
//! telemetry_raw   one row per ingestion, report text verbatim
//! telemetry       one row per ingestion, processed document + flattened columns
//! ```
//!
//! Both tables are append-only; `telemetry.updated_at` is the only column
//! ever updated, and only forward.
//!
//! # Modules
//!
//! - [`postgres`] -- `PostgreSQL` connection pool and configuration
//! - [`raw_store`] -- `telemetry_raw` inserts and queries
//! - [`processed_store`] -- `telemetry` inserts, queries, and touch
//! - [`pg_record_store`] -- [`RecordStore`](telemetry_core::RecordStore) implementation
//! - [`error`] -- Shared error types

pub mod error;
pub mod pg_record_store;
pub mod postgres;
pub mod processed_store;
pub mod raw_store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use pg_record_store::PgRecordStore;
pub use postgres::{PostgresConfig, PostgresPool};
pub use processed_store::{ProcessedRow, ProcessedStore};
pub use raw_store::{RawRow, RawStore};
