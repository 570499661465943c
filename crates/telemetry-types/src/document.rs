//! Processed telemetry document.
//!
//! [`TelemetryDocument`] is what the pipeline stores verbatim, returns
//! from the query routes, and pushes to every real-time subscriber. It
//! is the inbound [`Report`](crate::Report) plus the capture instant in
//! three renderings and the derived kinematic block.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::report::{CarBlock, Controls};

/// Normalized, derived, timestamped document built from one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TelemetryDocument {
    /// Capture instant in epoch milliseconds.
    #[ts(type = "number")]
    pub ts: i64,
    /// UTC rendering, `YYYY-MM-DDTHH:MM:SS.mmmZ`.
    pub ts_iso: String,
    /// Zone-local rendering, `YYYY-MM-DD HH:MM:SS.mmm+HH:MM`.
    pub ts_local: String,
    /// Source tag copied from the report.
    pub src: Option<String>,
    /// Vehicle block copied from the report.
    pub car: CarBlock,
    /// Control block with the derived summary attached.
    pub centric: ProcessedCentric,
}

/// Central controller block of a processed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProcessedCentric {
    /// Commanded controls plus derivation output.
    pub controls: ProcessedControls,
}

/// Commanded controls together with their derived kinematic summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ProcessedControls {
    /// The control tuple exactly as received.
    #[serde(flatten)]
    pub commanded: Controls,
    /// Human-meaningful values computed from `commanded`.
    pub derived: ControlsDerived,
}

/// Output of the derivation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ControlsDerived {
    /// Steering angle in degrees, positive to the right, within `[-180, 180]`.
    pub steering_deg: f64,
    /// Which way the wheels point.
    pub steering_side: SteeringSide,
    /// Commanded speed byte after clamping to `[0, 255]`.
    pub speed_cmd_byte: u8,
    /// `speed_cmd_byte / 255`, rounded to six decimals.
    pub speed_cmd_pct: f64,
    /// Commanded speed in metres per second, rounded to six decimals.
    pub speed_cmd_mps: f64,
    /// Direction of travel.
    pub movement_direction_text: MovementDirection,
}

/// Steering side classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum SteeringSide {
    /// Positive steering angle.
    Right,
    /// Negative steering angle.
    Left,
    /// Zero steering angle.
    Straight,
}

/// Direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum MovementDirection {
    /// Forward (`movement_direction == 1`).
    Front,
    /// Reverse.
    Back,
}

impl MovementDirection {
    /// The numeric flag stored in the flattened projection.
    pub const fn as_flag(self) -> i16 {
        match self {
            Self::Front => 1,
            Self::Back => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_serializes_with_flattened_controls() {
        let doc = TelemetryDocument {
            ts: 1_700_000_000_123,
            ts_iso: String::from("2023-11-14T22:13:20.123Z"),
            ts_local: String::from("2023-11-14 22:13:20.123+00:00"),
            src: Some(String::from("central")),
            car: CarBlock::default(),
            centric: ProcessedCentric {
                controls: ProcessedControls {
                    commanded: Controls {
                        curve_direction: 270,
                        speed: 255,
                        movement_direction: 0,
                    },
                    derived: ControlsDerived {
                        steering_deg: -90.0,
                        steering_side: SteeringSide::Left,
                        speed_cmd_byte: 255,
                        speed_cmd_pct: 1.0,
                        speed_cmd_mps: 12.0,
                        movement_direction_text: MovementDirection::Back,
                    },
                },
            },
        };

        let json = serde_json::to_value(&doc).unwrap_or_default();
        let controls = &json["centric"]["controls"];
        assert_eq!(controls["curve_direction"], 270);
        assert_eq!(controls["derived"]["steering_side"], "left");
        assert_eq!(controls["derived"]["movement_direction_text"], "back");
        assert_eq!(json["ts"], 1_700_000_000_123_i64);
    }

    #[test]
    fn movement_flag_matches_text() {
        assert_eq!(MovementDirection::Front.as_flag(), 1);
        assert_eq!(MovementDirection::Back.as_flag(), 0);
    }
}
