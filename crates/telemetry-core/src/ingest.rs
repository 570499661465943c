//! Ingestion pipeline.
//!
//! Every report, whatever transport it arrived on, passes through
//! [`Ingestor::ingest`]:
//!
//! 1. validate (rejection writes nothing)
//! 2. capture the ingestion instant once
//! 3. append the raw record with the untouched report
//! 4. derive, timestamp, and project the processed document
//! 5. append the processed record
//!
//! Failures in steps 3-5 are returned to the caller as-is. The pipeline
//! never retries; a crash between the two writes leaves an orphan raw
//! record.

use std::sync::Arc;

use telemetry_types::{
    NewProcessedRecord, ProcessedCentric, ProcessedControls, ProcessedRecord, Report,
    TelemetryDocument,
};

use crate::derivation::derive_controls;
use crate::schema::{check_report, ReportError};
use crate::store::{RecordStore, StoreError};
use crate::time_format::{TimeError, TimeFormatter};

/// Errors from a single ingestion.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The report failed schema validation; nothing was written.
    #[error(transparent)]
    Rejected(#[from] ReportError),

    /// A store write failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The ingestion instant could not be rendered.
    #[error(transparent)]
    Time(#[from] TimeError),

    /// The report or document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Runs the validate, write, derive, write sequence against a store.
#[derive(Debug)]
pub struct Ingestor<S> {
    store: Arc<S>,
    vmax_mps: f64,
    formatter: TimeFormatter,
}

impl<S> Clone for Ingestor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            vmax_mps: self.vmax_mps,
            formatter: self.formatter,
        }
    }
}

impl<S: RecordStore> Ingestor<S> {
    /// Create a pipeline over `store`.
    pub const fn new(store: Arc<S>, vmax_mps: f64, formatter: TimeFormatter) -> Self {
        Self {
            store,
            vmax_mps,
            formatter,
        }
    }

    /// The store this pipeline writes to.
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Ingest one report stamped with the current time.
    ///
    /// # Errors
    ///
    /// See [`IngestError`].
    pub async fn ingest(&self, report: &Report) -> Result<ProcessedRecord, IngestError> {
        self.ingest_at(report, now_ms()).await
    }

    /// Ingest one report with an explicit ingestion instant.
    ///
    /// The report is validated before anything is written, so a caller
    /// that skipped the schema boundary still cannot store bad input.
    ///
    /// # Errors
    ///
    /// See [`IngestError`].
    pub async fn ingest_at(
        &self,
        report: &Report,
        received_at: i64,
    ) -> Result<ProcessedRecord, IngestError> {
        check_report(report)?;

        let payload = serde_json::to_string(report)?;
        let raw_id = self
            .store
            .write_raw(received_at, report.src.as_deref(), &payload)
            .await?;

        let controls = report.centric.controls;
        let derived = derive_controls(&controls, self.vmax_mps);
        let stamps = self.formatter.format(received_at)?;

        let document = TelemetryDocument {
            ts: received_at,
            ts_iso: stamps.ts_iso,
            ts_local: stamps.ts_local,
            src: report.src.clone(),
            car: report.car.clone(),
            centric: ProcessedCentric {
                controls: ProcessedControls {
                    commanded: controls,
                    derived,
                },
            },
        };
        let new = NewProcessedRecord::from_document(document)?;
        let id = self.store.write_processed(&new).await?;

        tracing::debug!(
            raw_id = %raw_id,
            processed_id = %id,
            ts = received_at,
            src = ?new.source,
            "report ingested"
        );
        Ok(ProcessedRecord::from_new(id, new))
    }
}
