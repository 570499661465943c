//! Shared type definitions for the vehicle telemetry pipeline.
//!
//! This crate is the single source of truth for the report, document,
//! and record shapes used across the workspace. Wire types flow
//! downstream to `TypeScript` via `ts-rs` for the telemetry dashboard.
//!
//! # Modules
//!
//! - [`report`] -- Inbound report tree with schema-level range checks
//! - [`document`] -- Processed document and derivation output
//! - [`record`] -- Raw and processed record kinds plus the flattened projection
//! - [`query`] -- Range-query parameters
//! - [`ids`] -- Row and subscriber identifiers

pub mod document;
pub mod ids;
pub mod query;
pub mod record;
pub mod report;

// Re-export all public types at crate root for convenience.
pub use document::{
    ControlsDerived, MovementDirection, ProcessedCentric, ProcessedControls, SteeringSide,
    TelemetryDocument,
};
pub use ids::{ProcessedRecordId, RawRecordId, SubscriberId};
pub use query::{OrderBy, RangeQuery, RawRangeQuery, DEFAULT_LIMIT, MAX_LIMIT};
pub use record::{FlatFields, NewProcessedRecord, ProcessedRecord, RawRecord, RawRecordView};
pub use report::{
    CarBlock, CarDrive, CarGps, CarImu, CentricBlock, Controls, Report, DEFAULT_SOURCE,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the dashboard.

    #[test]
    fn export_bindings() {
        // Files are written to the `bindings/` directory relative to the
        // crate root.
        use ts_rs::TS;

        // Report
        let _ = crate::report::Report::export_all();
        let _ = crate::report::CarBlock::export_all();
        let _ = crate::report::CarGps::export_all();
        let _ = crate::report::CarImu::export_all();
        let _ = crate::report::CarDrive::export_all();
        let _ = crate::report::CentricBlock::export_all();
        let _ = crate::report::Controls::export_all();

        // Document
        let _ = crate::document::TelemetryDocument::export_all();
        let _ = crate::document::ProcessedCentric::export_all();
        let _ = crate::document::ProcessedControls::export_all();
        let _ = crate::document::ControlsDerived::export_all();
        let _ = crate::document::SteeringSide::export_all();
        let _ = crate::document::MovementDirection::export_all();

        // Records
        let _ = crate::record::RawRecordView::export_all();
    }
}
