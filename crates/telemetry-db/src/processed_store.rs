//! Operations on the `telemetry` table.
//!
//! Each row carries the processed document verbatim in `doc_json` plus
//! the flattened scalar columns used for filtering. The scalar columns
//! are written from [`FlatFields`] in the same statement as the
//! document, so they never drift.
//!
//! Range filters always apply to `ts`, whichever column the page is
//! sorted by.

use sqlx::PgPool;
use telemetry_types::{
    FlatFields, NewProcessedRecord, OrderBy, ProcessedRecord, ProcessedRecordId, RangeQuery,
    TelemetryDocument,
};

use crate::error::DbError;

const SELECT_COLUMNS: &str = "SELECT id, ts, updated_at, src, lat, lon, speed_est_mps, pwm, \
     steering_deg, speed_cmd_pct, speed_cmd_mps, movement_dir, doc_json FROM telemetry";

/// Operations on the `telemetry` table.
pub struct ProcessedStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ProcessedStore<'a> {
    /// Create a new processed store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append one processed record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, record: &NewProcessedRecord) -> Result<ProcessedRecordId, DbError> {
        let f = &record.fields;
        let id = sqlx::query_scalar::<_, i64>(
            r"INSERT INTO telemetry (
                  ts, ts_iso, ts_local, src, updated_at,
                  lat, lon, speed_est_mps, pwm,
                  steering_deg, speed_cmd_pct, speed_cmd_mps, movement_dir,
                  doc_json
              )
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
              RETURNING id",
        )
        .bind(record.ts)
        .bind(&record.ts_iso)
        .bind(&record.ts_local)
        .bind(record.source.as_deref())
        .bind(record.updated_at)
        .bind(f.lat)
        .bind(f.lon)
        .bind(f.speed_est_mps)
        .bind(f.pwm)
        .bind(f.steering_deg)
        .bind(f.speed_cmd_pct)
        .bind(f.speed_cmd_mps)
        .bind(f.movement_dir)
        .bind(&record.document_json)
        .fetch_one(self.pool)
        .await?;

        Ok(ProcessedRecordId(id))
    }

    /// The row with the greatest `updated_at`, newest insert on ties.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn latest(&self) -> Result<Option<ProcessedRow>, DbError> {
        let sql = format!("{SELECT_COLUMNS} ORDER BY updated_at DESC, id DESC LIMIT 1");
        let row = sqlx::query_as::<_, ProcessedRow>(&sql)
            .fetch_optional(self.pool)
            .await?;
        Ok(row)
    }

    /// A page of rows within inclusive `ts` bounds.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn list(&self, query: &RangeQuery) -> Result<Vec<ProcessedRow>, DbError> {
        let sql = format!(
            "{SELECT_COLUMNS} \
             WHERE ($1::BIGINT IS NULL OR ts >= $1) AND ($2::BIGINT IS NULL OR ts <= $2) \
             ORDER BY {} DESC, id DESC \
             LIMIT $3 OFFSET $4",
            order_column(query.order_by)
        );
        let rows = sqlx::query_as::<_, ProcessedRow>(&sql)
            .bind(query.start_ts)
            .bind(query.end_ts)
            .bind(i64::from(query.limit))
            .bind(i64::from(query.offset))
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Advance `updated_at` for one row, never moving it backwards.
    ///
    /// Returns `false` if no row has the given ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn touch(&self, id: ProcessedRecordId, at: i64) -> Result<bool, DbError> {
        let result = sqlx::query(
            r"UPDATE telemetry
              SET updated_at = GREATEST(updated_at, $2)
              WHERE id = $1",
        )
        .bind(id.into_inner())
        .bind(at)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

const fn order_column(order_by: OrderBy) -> &'static str {
    match order_by {
        OrderBy::UpdatedAt => "updated_at",
        OrderBy::Ts => "ts",
    }
}

/// A row from the `telemetry` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProcessedRow {
    /// Auto-incremented row ID.
    pub id: i64,
    /// Capture instant in epoch milliseconds.
    pub ts: i64,
    /// Freshness marker in epoch milliseconds.
    pub updated_at: i64,
    /// Source tag.
    pub src: Option<String>,
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lon: Option<f64>,
    /// Estimated speed in m/s.
    pub speed_est_mps: Option<f64>,
    /// PWM duty byte.
    pub pwm: Option<i32>,
    /// Steering angle in degrees.
    pub steering_deg: f64,
    /// Commanded speed fraction.
    pub speed_cmd_pct: f64,
    /// Commanded speed in m/s.
    pub speed_cmd_mps: f64,
    /// 1 = front, 0 = back.
    pub movement_dir: i16,
    /// The processed document as stored.
    pub doc_json: String,
}

impl ProcessedRow {
    /// Decode the stored document into a [`ProcessedRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Serialization`] if `doc_json` does not parse.
    pub fn into_record(self) -> Result<ProcessedRecord, DbError> {
        let document: TelemetryDocument = serde_json::from_str(&self.doc_json)?;
        Ok(ProcessedRecord {
            id: ProcessedRecordId(self.id),
            ts: self.ts,
            updated_at: self.updated_at,
            source: self.src,
            fields: FlatFields {
                lat: self.lat,
                lon: self.lon,
                speed_est_mps: self.speed_est_mps,
                pwm: self.pwm,
                steering_deg: self.steering_deg,
                speed_cmd_pct: self.speed_cmd_pct,
                speed_cmd_mps: self.speed_cmd_mps,
                movement_dir: self.movement_dir,
            },
            document,
        })
    }
}
