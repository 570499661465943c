//! Operations on the `telemetry_raw` table.
//!
//! One row per ingested report, holding the validated report exactly as
//! it was serialized at ingestion. Rows are never updated or deleted.

use sqlx::PgPool;
use telemetry_types::{RawRangeQuery, RawRecord, RawRecordId};

use crate::error::DbError;

/// Operations on the `telemetry_raw` table.
pub struct RawStore<'a> {
    pool: &'a PgPool,
}

impl<'a> RawStore<'a> {
    /// Create a new raw store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one raw record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(
        &self,
        received_at: i64,
        src: Option<&str>,
        raw_json: &str,
    ) -> Result<RawRecordId, DbError> {
        let id = sqlx::query_scalar::<_, i64>(
            r"INSERT INTO telemetry_raw (received_at, src, raw_json)
              VALUES ($1, $2, $3)
              RETURNING id",
        )
        .bind(received_at)
        .bind(src)
        .bind(raw_json)
        .fetch_one(self.pool)
        .await?;

        Ok(RawRecordId(id))
    }

    /// The most recently received row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn latest(&self) -> Result<Option<RawRow>, DbError> {
        let row = sqlx::query_as::<_, RawRow>(
            r"SELECT id, received_at, src, raw_json
              FROM telemetry_raw
              ORDER BY received_at DESC, id DESC
              LIMIT 1",
        )
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// A page of rows within inclusive `received_at` bounds, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list(&self, query: &RawRangeQuery) -> Result<Vec<RawRow>, DbError> {
        let rows = sqlx::query_as::<_, RawRow>(
            r"SELECT id, received_at, src, raw_json
              FROM telemetry_raw
              WHERE ($1::BIGINT IS NULL OR received_at >= $1)
                AND ($2::BIGINT IS NULL OR received_at <= $2)
              ORDER BY received_at DESC, id DESC
              LIMIT $3 OFFSET $4",
        )
        .bind(query.start_received_at)
        .bind(query.end_received_at)
        .bind(i64::from(query.limit))
        .bind(i64::from(query.offset))
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// A row from the `telemetry_raw` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RawRow {
    /// Auto-incremented row ID.
    pub id: i64,
    /// Ingestion instant in epoch milliseconds.
    pub received_at: i64,
    /// Source tag.
    pub src: Option<String>,
    /// The stored report text.
    pub raw_json: String,
}

impl From<RawRow> for RawRecord {
    fn from(row: RawRow) -> Self {
        Self {
            id: RawRecordId(row.id),
            received_at: row.received_at,
            source: row.src,
            payload: row.raw_json,
        }
    }
}
