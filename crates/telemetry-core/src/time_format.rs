//! Epoch-millisecond instant to UTC and zone-local renderings.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

/// Errors from timestamp rendering.
#[derive(Debug, thiserror::Error)]
pub enum TimeError {
    /// The configured zone identifier is not a known IANA zone.
    #[error("unknown timezone {name:?}: {message}")]
    UnknownZone {
        /// The identifier as configured.
        name: String,
        /// Parser message.
        message: String,
    },

    /// The instant cannot be represented as a calendar date.
    #[error("timestamp {ts} is out of range")]
    OutOfRange {
        /// The offending epoch-millisecond value.
        ts: i64,
    },
}

/// Both renderings of one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamps {
    /// `YYYY-MM-DDTHH:MM:SS.mmmZ`, always UTC.
    pub ts_iso: String,
    /// `YYYY-MM-DD HH:MM:SS.mmm+HH:MM` in the configured zone.
    pub ts_local: String,
}

/// Renders instants for a fixed display zone, resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFormatter {
    zone: Tz,
}

impl TimeFormatter {
    /// Resolve `zone_name`, falling back to UTC with a warning when the
    /// identifier is unknown.
    pub fn new(zone_name: &str) -> Self {
        Self::try_new(zone_name).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to UTC for local timestamps");
            Self::utc()
        })
    }

    /// Resolve `zone_name` strictly.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::UnknownZone`] if the identifier does not parse.
    pub fn try_new(zone_name: &str) -> Result<Self, TimeError> {
        let zone = zone_name
            .trim()
            .parse::<Tz>()
            .map_err(|e| TimeError::UnknownZone {
                name: zone_name.to_owned(),
                message: e.to_string(),
            })?;
        Ok(Self { zone })
    }

    /// A formatter whose local rendering is UTC.
    pub const fn utc() -> Self {
        Self { zone: Tz::UTC }
    }

    /// The resolved display zone.
    pub const fn zone(&self) -> Tz {
        self.zone
    }

    /// Render `ts` (epoch milliseconds) in both forms.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::OutOfRange`] if `ts` is outside chrono's range.
    pub fn format(&self, ts: i64) -> Result<Timestamps, TimeError> {
        let utc: DateTime<Utc> =
            DateTime::from_timestamp_millis(ts).ok_or(TimeError::OutOfRange { ts })?;
        Ok(Timestamps {
            ts_iso: utc.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            ts_local: utc
                .with_timezone(&self.zone)
                .format("%Y-%m-%d %H:%M:%S%.3f%:z")
                .to_string(),
        })
    }
}

impl Default for TimeFormatter {
    fn default() -> Self {
        Self::utc()
    }
}
