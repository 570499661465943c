//! Schema boundary: bytes in, validated [`Report`] out.
//!
//! Both transports call [`decode_report`] (or [`check_report`] when the
//! HTTP extractor has already parsed the body) before anything is written,
//! so a rejected report never produces a raw record.

use telemetry_types::Report;
use validator::Validate;

/// Errors from decoding or validating an inbound report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The payload is not JSON of the report shape.
    #[error("malformed report: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload parsed but a field is out of range.
    #[error("invalid report: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

/// Parse and validate a report from raw bytes.
///
/// # Errors
///
/// Returns [`ReportError::Json`] for malformed or mistyped input and
/// [`ReportError::Invalid`] for range violations.
pub fn decode_report(bytes: &[u8]) -> Result<Report, ReportError> {
    let report: Report = serde_json::from_slice(bytes)?;
    check_report(&report)?;
    Ok(report)
}

/// Validate an already-parsed report.
///
/// # Errors
///
/// Returns [`ReportError::Invalid`] for range violations.
pub fn check_report(report: &Report) -> Result<(), ReportError> {
    report.validate()?;
    Ok(())
}
