//! Persisted record kinds.
//!
//! Every ingestion appends exactly one [`RawRecord`] and one
//! [`ProcessedRecord`] sharing the same capture instant. Both are
//! append-only; the only mutable field is
//! [`ProcessedRecord::updated_at`].

use serde::{Serialize, Serializer};
use ts_rs::TS;

use crate::document::TelemetryDocument;
use crate::ids::{ProcessedRecordId, RawRecordId};

/// Verbatim stored copy of a report plus receipt metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// Store-assigned key.
    pub id: RawRecordId,
    /// Ingestion instant in epoch milliseconds.
    pub received_at: i64,
    /// Source tag copied from the report.
    pub source: Option<String>,
    /// The validated report serialized to compact JSON, byte for byte.
    pub payload: String,
}

/// Wire shape of a raw record on the query routes.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RawRecordView {
    /// Ingestion instant in epoch milliseconds.
    #[ts(type = "number")]
    pub received_at: i64,
    /// Source tag.
    pub src: Option<String>,
    /// The stored payload re-parsed as JSON.
    pub raw: serde_json::Value,
}

impl RawRecord {
    /// Build the wire view, re-parsing the stored payload.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the stored payload is not valid JSON.
    pub fn to_view(&self) -> Result<RawRecordView, serde_json::Error> {
        Ok(RawRecordView {
            received_at: self.received_at,
            src: self.source.clone(),
            raw: serde_json::from_str(&self.payload)?,
        })
    }
}

impl Serialize for RawRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_view()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// Scalar fields projected from a [`TelemetryDocument`] for indexed
/// filtering. Always computed from the document, never edited on their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatFields {
    /// GPS latitude.
    pub lat: Option<f64>,
    /// GPS longitude.
    pub lon: Option<f64>,
    /// Estimated speed in m/s.
    pub speed_est_mps: Option<f64>,
    /// PWM duty byte.
    pub pwm: Option<i32>,
    /// Derived steering angle.
    pub steering_deg: f64,
    /// Derived commanded speed fraction.
    pub speed_cmd_pct: f64,
    /// Derived commanded speed in m/s.
    pub speed_cmd_mps: f64,
    /// 1 = front, 0 = back.
    pub movement_dir: i16,
}

impl From<&TelemetryDocument> for FlatFields {
    fn from(doc: &TelemetryDocument) -> Self {
        let gps = doc.car.gps;
        let drive = doc.car.drive;
        let derived = &doc.centric.controls.derived;
        Self {
            lat: gps.map(|g| g.latitude),
            lon: gps.map(|g| g.longitude),
            speed_est_mps: drive.and_then(|d| d.speed_est_mps),
            pwm: drive.and_then(|d| d.pwm),
            steering_deg: derived.steering_deg,
            speed_cmd_pct: derived.speed_cmd_pct,
            speed_cmd_mps: derived.speed_cmd_mps,
            movement_dir: derived.movement_direction_text.as_flag(),
        }
    }
}

/// A processed record ready to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProcessedRecord {
    /// Capture instant; equals the paired raw record's `received_at`.
    pub ts: i64,
    /// UTC rendering of `ts`.
    pub ts_iso: String,
    /// Zone-local rendering of `ts`.
    pub ts_local: String,
    /// Source tag.
    pub source: Option<String>,
    /// Freshness marker; equals `ts` at creation.
    pub updated_at: i64,
    /// Indexed projection of `document`.
    pub fields: FlatFields,
    /// The structured document.
    pub document: TelemetryDocument,
    /// `document` serialized once, stored verbatim.
    pub document_json: String,
}

impl NewProcessedRecord {
    /// Build an insertable record from a finished document.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the document cannot be serialized.
    pub fn from_document(document: TelemetryDocument) -> Result<Self, serde_json::Error> {
        let document_json = serde_json::to_string(&document)?;
        Ok(Self {
            ts: document.ts,
            ts_iso: document.ts_iso.clone(),
            ts_local: document.ts_local.clone(),
            source: document.src.clone(),
            updated_at: document.ts,
            fields: FlatFields::from(&document),
            document,
            document_json,
        })
    }
}

/// A stored processed record.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedRecord {
    /// Store-assigned key.
    pub id: ProcessedRecordId,
    /// Capture instant in epoch milliseconds.
    pub ts: i64,
    /// Last freshness mark; `updated_at >= ts`.
    pub updated_at: i64,
    /// Source tag.
    pub source: Option<String>,
    /// Indexed projection.
    pub fields: FlatFields,
    /// The full structured document.
    pub document: TelemetryDocument,
}

impl ProcessedRecord {
    /// Materialize a stored record from its insertable form.
    pub fn from_new(id: ProcessedRecordId, new: NewProcessedRecord) -> Self {
        Self {
            id,
            ts: new.ts,
            updated_at: new.updated_at,
            source: new.source,
            fields: new.fields,
            document: new.document,
        }
    }
}
