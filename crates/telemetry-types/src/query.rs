//! Range-query parameters for processed and raw records.
//!
//! Both structs deserialize straight from a URL query string and carry
//! their bounds as `validator` attributes, so the routing layer only
//! has to call `validate()` before handing them to a store.

use serde::Deserialize;
use validator::Validate;

/// Default page size.
pub const DEFAULT_LIMIT: u32 = 100;

/// Largest accepted page size.
pub const MAX_LIMIT: u32 = 1000;

/// Sort key for processed-record listings. Always descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderBy {
    /// Freshness marker (default).
    #[default]
    UpdatedAt,
    /// Capture instant.
    Ts,
}

/// Parameters of a processed-record range query.
///
/// `start_ts`/`end_ts` are inclusive and always filter on `ts`, even when
/// sorting by `updated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate)]
pub struct RangeQuery {
    /// Page size, 1..=1000.
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1000))]
    pub limit: u32,
    /// Rows to skip before the page starts.
    #[serde(default)]
    pub offset: u32,
    /// Inclusive lower bound on `ts`.
    #[serde(default)]
    pub start_ts: Option<i64>,
    /// Inclusive upper bound on `ts`.
    #[serde(default)]
    pub end_ts: Option<i64>,
    /// Sort key.
    #[serde(default)]
    pub order_by: OrderBy,
}

impl Default for RangeQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            start_ts: None,
            end_ts: None,
            order_by: OrderBy::UpdatedAt,
        }
    }
}

impl RangeQuery {
    /// Whether `ts` falls within the inclusive bounds.
    pub fn contains(&self, ts: i64) -> bool {
        self.start_ts.is_none_or(|start| ts >= start) && self.end_ts.is_none_or(|end| ts <= end)
    }
}

/// Parameters of a raw-record range query, filtered and sorted by
/// `received_at` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Validate)]
pub struct RawRangeQuery {
    /// Page size, 1..=1000.
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 1000))]
    pub limit: u32,
    /// Rows to skip before the page starts.
    #[serde(default)]
    pub offset: u32,
    /// Inclusive lower bound on `received_at`.
    #[serde(default)]
    pub start_received_at: Option<i64>,
    /// Inclusive upper bound on `received_at`.
    #[serde(default)]
    pub end_received_at: Option<i64>,
}

impl Default for RawRangeQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
            start_received_at: None,
            end_received_at: None,
        }
    }
}

impl RawRangeQuery {
    /// Whether `received_at` falls within the inclusive bounds.
    pub fn contains(&self, received_at: i64) -> bool {
        self.start_received_at.is_none_or(|start| received_at >= start)
            && self.end_received_at.is_none_or(|end| received_at <= end)
    }
}

const fn default_limit() -> u32 {
    DEFAULT_LIMIT
}
