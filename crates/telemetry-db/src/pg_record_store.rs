//! [`RecordStore`] backed by `PostgreSQL`.
//!
//! A processed row whose stored document no longer decodes is skipped
//! in range results and reported as absent by `latest`; both cases are
//! logged with the row ID.

use telemetry_core::{RecordStore, StoreError};
use telemetry_types::{
    NewProcessedRecord, ProcessedRecord, ProcessedRecordId, RangeQuery, RawRangeQuery, RawRecord,
    RawRecordId,
};

use crate::postgres::PostgresPool;
use crate::processed_store::{ProcessedRow, ProcessedStore};
use crate::raw_store::RawStore;

/// `PostgreSQL` implementation of [`RecordStore`].
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PostgresPool,
}

impl PgRecordStore {
    /// Wrap an open pool.
    pub const fn new(pool: PostgresPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub const fn pool(&self) -> &PostgresPool {
        &self.pool
    }

    fn raw(&self) -> RawStore<'_> {
        RawStore::new(self.pool.pool())
    }

    fn processed(&self) -> ProcessedStore<'_> {
        ProcessedStore::new(self.pool.pool())
    }
}

fn decode(row: ProcessedRow) -> Option<ProcessedRecord> {
    let id = row.id;
    match row.into_record() {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(id, error = %e, "skipping unreadable telemetry row");
            None
        }
    }
}

impl RecordStore for PgRecordStore {
    async fn write_raw(
        &self,
        received_at: i64,
        source: Option<&str>,
        payload: &str,
    ) -> Result<RawRecordId, StoreError> {
        Ok(self.raw().insert(received_at, source, payload).await?)
    }

    async fn write_processed(
        &self,
        record: &NewProcessedRecord,
    ) -> Result<ProcessedRecordId, StoreError> {
        Ok(self.processed().insert(record).await?)
    }

    async fn latest(&self) -> Result<Option<ProcessedRecord>, StoreError> {
        let row = self.processed().latest().await?;
        Ok(row.and_then(decode))
    }

    async fn range(&self, query: &RangeQuery) -> Result<Vec<ProcessedRecord>, StoreError> {
        let rows = self.processed().list(query).await?;
        Ok(rows.into_iter().filter_map(decode).collect())
    }

    async fn latest_raw(&self) -> Result<Option<RawRecord>, StoreError> {
        let row = self.raw().latest().await?;
        Ok(row.map(RawRecord::from))
    }

    async fn range_raw(&self, query: &RawRangeQuery) -> Result<Vec<RawRecord>, StoreError> {
        let rows = self.raw().list(query).await?;
        Ok(rows.into_iter().map(RawRecord::from).collect())
    }

    async fn touch(&self, id: ProcessedRecordId, at: i64) -> Result<bool, StoreError> {
        Ok(self.processed().touch(id, at).await?)
    }
}
