//! In-memory [`RecordStore`] backend.
//!
//! Used by tests and by `storage: memory` deployments. Contents live in
//! two vectors behind a single [`RwLock`], so a reader never sees a
//! half-appended record.

use std::cmp::Reverse;

use telemetry_types::{
    NewProcessedRecord, OrderBy, ProcessedRecord, ProcessedRecordId, RangeQuery, RawRangeQuery,
    RawRecord, RawRecordId,
};
use tokio::sync::RwLock;

use crate::store::{RecordStore, StoreError};

#[derive(Debug, Default)]
struct Tables {
    raw: Vec<RawRecord>,
    processed: Vec<ProcessedRecord>,
}

/// Process-local record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of raw and processed records held.
    pub async fn counts(&self) -> (usize, usize) {
        let tables = self.tables.read().await;
        (tables.raw.len(), tables.processed.len())
    }
}

/// Next 1-based key for a table currently holding `len` rows.
fn next_id(len: usize) -> Result<i64, StoreError> {
    i64::try_from(len)
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or_else(|| StoreError::Backend(String::from("record key space exhausted")))
}

fn page<T>(rows: Vec<T>, offset: u32, limit: u32) -> Vec<T> {
    let skip = usize::try_from(offset).unwrap_or(usize::MAX);
    let take = usize::try_from(limit).unwrap_or(usize::MAX);
    rows.into_iter().skip(skip).take(take).collect()
}

impl RecordStore for MemoryStore {
    async fn write_raw(
        &self,
        received_at: i64,
        source: Option<&str>,
        payload: &str,
    ) -> Result<RawRecordId, StoreError> {
        let mut tables = self.tables.write().await;
        let id = RawRecordId(next_id(tables.raw.len())?);
        tables.raw.push(RawRecord {
            id,
            received_at,
            source: source.map(str::to_owned),
            payload: payload.to_owned(),
        });
        Ok(id)
    }

    async fn write_processed(
        &self,
        record: &NewProcessedRecord,
    ) -> Result<ProcessedRecordId, StoreError> {
        let mut tables = self.tables.write().await;
        let id = ProcessedRecordId(next_id(tables.processed.len())?);
        tables
            .processed
            .push(ProcessedRecord::from_new(id, record.clone()));
        Ok(id)
    }

    async fn latest(&self) -> Result<Option<ProcessedRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .processed
            .iter()
            .max_by_key(|r| (r.updated_at, r.id))
            .cloned())
    }

    async fn range(&self, query: &RangeQuery) -> Result<Vec<ProcessedRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<ProcessedRecord> = tables
            .processed
            .iter()
            .filter(|r| query.contains(r.ts))
            .cloned()
            .collect();
        match query.order_by {
            OrderBy::UpdatedAt => rows.sort_by_key(|r| Reverse((r.updated_at, r.id))),
            OrderBy::Ts => rows.sort_by_key(|r| Reverse((r.ts, r.id))),
        }
        Ok(page(rows, query.offset, query.limit))
    }

    async fn latest_raw(&self) -> Result<Option<RawRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .raw
            .iter()
            .max_by_key(|r| (r.received_at, r.id))
            .cloned())
    }

    async fn range_raw(&self, query: &RawRangeQuery) -> Result<Vec<RawRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows: Vec<RawRecord> = tables
            .raw
            .iter()
            .filter(|r| query.contains(r.received_at))
            .cloned()
            .collect();
        rows.sort_by_key(|r| Reverse((r.received_at, r.id)));
        Ok(page(rows, query.offset, query.limit))
    }

    async fn touch(&self, id: ProcessedRecordId, at: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .processed
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| r.updated_at = r.updated_at.max(at))
            .is_some())
    }
}
