//! Inbound telemetry report as published by the vehicle bridge.
//!
//! A [`Report`] is one sample before processing. The same shape is
//! accepted on the HTTP ingest route and on the bus subject. Range
//! constraints are declared with `validator` attributes so a decoded
//! report can be checked once at the boundary and trusted afterwards.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use validator::Validate;

/// Source tag applied when a report does not carry `src`.
pub const DEFAULT_SOURCE: &str = "central";

/// One inbound telemetry sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Report {
    /// Vehicle-side sensor block.
    #[validate(nested)]
    pub car: CarBlock,
    /// Central controller block.
    #[validate(nested)]
    pub centric: CentricBlock,
    /// Free-text source tag. Absent keys default to [`DEFAULT_SOURCE`];
    /// an explicit `null` stays absent.
    #[serde(default = "default_source")]
    pub src: Option<String>,
}

fn default_source() -> Option<String> {
    Some(String::from(DEFAULT_SOURCE))
}

/// Sensor readings reported by the car.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CarBlock {
    /// GPS fix, if the receiver had one.
    #[serde(default)]
    pub gps: Option<CarGps>,
    /// Raw inertial measurement unit sample.
    #[serde(default)]
    #[validate(nested)]
    pub imu: Option<CarImu>,
    /// Drive actuation state.
    #[serde(default)]
    #[validate(nested)]
    pub drive: Option<CarDrive>,
}

/// WGS-84 position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CarGps {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
}

/// Signed 8-bit accelerometer and gyroscope readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CarImu {
    /// Acceleration on the X axis.
    #[serde(rename = "accelerationX")]
    #[validate(range(min = -128, max = 127))]
    pub acceleration_x: i32,
    /// Acceleration on the Y axis.
    #[serde(rename = "accelerationY")]
    #[validate(range(min = -128, max = 127))]
    pub acceleration_y: i32,
    /// Acceleration on the Z axis.
    #[serde(rename = "accelerationZ")]
    #[validate(range(min = -128, max = 127))]
    pub acceleration_z: i32,
    /// Angular rate around X.
    #[serde(rename = "spinX")]
    #[validate(range(min = -128, max = 127))]
    pub spin_x: i32,
    /// Angular rate around Y.
    #[serde(rename = "spinY")]
    #[validate(range(min = -128, max = 127))]
    pub spin_y: i32,
    /// Angular rate around Z.
    #[serde(rename = "spinZ")]
    #[validate(range(min = -128, max = 127))]
    pub spin_z: i32,
    /// Gyroscope full-scale range in degrees per second (250, 500, 1000, 2000).
    pub scale_dps: i32,
}

/// Motor drive state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CarDrive {
    /// PWM duty byte applied to the motor.
    #[serde(default)]
    #[validate(range(min = 0, max = 255))]
    pub pwm: Option<i32>,
    /// Estimated ground speed in metres per second.
    #[serde(default)]
    pub speed_est_mps: Option<f64>,
}

/// Central controller block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CentricBlock {
    /// Commanded controls.
    #[validate(nested)]
    pub controls: Controls,
}

/// Raw control tuple as commanded by the central unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Validate, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Controls {
    /// Steering heading code, 0..=360 (0 and 180 mean straight).
    #[validate(range(min = 0, max = 360))]
    pub curve_direction: i32,
    /// Commanded speed byte.
    #[validate(range(min = 0, max = 255))]
    pub speed: i32,
    /// 1 = forward, 0 = reverse.
    #[validate(range(min = 0, max = 1))]
    pub movement_direction: i32,
}
