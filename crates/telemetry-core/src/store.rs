//! Record store contract.
//!
//! A [`RecordStore`] owns the two append-only record kinds and the
//! queries over them. The ingestion pipeline, the query routes, and the
//! bus bridge all go through this trait, so the `PostgreSQL` backend in
//! `telemetry-db` and the in-memory [`MemoryStore`](crate::MemoryStore)
//! are interchangeable.
//!
//! Ordering contract shared by every implementation:
//!
//! - `latest` returns the processed record with the greatest
//!   `updated_at`; ties go to the most recently inserted record.
//! - `range` filters on inclusive `ts` bounds regardless of the sort
//!   key, sorts descending by the chosen key (ties by insertion, newest
//!   first), then applies `offset` and `limit`.
//! - Raw queries filter and sort by `received_at` only.

use std::future::Future;

use telemetry_types::{
    NewProcessedRecord, ProcessedRecord, ProcessedRecordId, RangeQuery, RawRangeQuery, RawRecord,
    RawRecordId,
};

/// Errors surfaced by a record store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The storage backend failed (connection, constraint, I/O).
    #[error("storage backend error: {0}")]
    Backend(String),

    /// A document could not be serialized for storage.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persistent storage for raw and processed telemetry records.
///
/// Writes are appends; the only in-place mutation is [`touch`]. Both
/// writes for one ingestion are issued raw first by the caller; the
/// store itself does not pair them in a transaction.
///
/// [`touch`]: RecordStore::touch
pub trait RecordStore: Send + Sync + 'static {
    /// Append a raw record and return its key.
    fn write_raw(
        &self,
        received_at: i64,
        source: Option<&str>,
        payload: &str,
    ) -> impl Future<Output = Result<RawRecordId, StoreError>> + Send;

    /// Append a processed record, including its flattened projection.
    fn write_processed(
        &self,
        record: &NewProcessedRecord,
    ) -> impl Future<Output = Result<ProcessedRecordId, StoreError>> + Send;

    /// The freshest processed record, or `None` when empty.
    fn latest(&self) -> impl Future<Output = Result<Option<ProcessedRecord>, StoreError>> + Send;

    /// A page of processed records.
    fn range(
        &self,
        query: &RangeQuery,
    ) -> impl Future<Output = Result<Vec<ProcessedRecord>, StoreError>> + Send;

    /// The most recently received raw record, or `None` when empty.
    fn latest_raw(&self) -> impl Future<Output = Result<Option<RawRecord>, StoreError>> + Send;

    /// A page of raw records.
    fn range_raw(
        &self,
        query: &RawRangeQuery,
    ) -> impl Future<Output = Result<Vec<RawRecord>, StoreError>> + Send;

    /// Advance a processed record's `updated_at` to `at`.
    ///
    /// Never moves `updated_at` backwards, so `updated_at >= ts` holds.
    /// Returns `false` when no record has the given key.
    fn touch(
        &self,
        id: ProcessedRecordId,
        at: i64,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;
}
