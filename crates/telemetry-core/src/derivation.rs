//! Derivation engine: control tuple to kinematic summary.
//!
//! Pure and total. Out-of-range inputs are clamped, never rejected;
//! rejection happens at the schema boundary in [`crate::schema`].

use telemetry_types::{Controls, ControlsDerived, MovementDirection, SteeringSide};

/// Largest accepted speed byte.
const SPEED_BYTE_MAX: i32 = 255;

/// Derive the kinematic summary for one control tuple.
///
/// - `steering_deg` is `0` for `curve_direction` 0 or 180, `+curve_direction`
///   below 180, and `-(360 - curve_direction)` above. At 360 the result is
///   an integer zero, so it classifies as straight.
/// - `speed_cmd_pct` and `speed_cmd_mps` are rounded to six decimals; the
///   m/s value is computed from the unrounded fraction.
///
/// `vmax_mps` must be positive; [`TelemetryConfig::validate`] guarantees
/// that for configured values.
///
/// [`TelemetryConfig::validate`]: crate::config::TelemetryConfig::validate
pub fn derive_controls(controls: &Controls, vmax_mps: f64) -> ControlsDerived {
    let curve = controls.curve_direction.clamp(0, 360);
    let steering = match curve {
        0 | 180 => 0,
        c if c < 180 => c,
        c => c.saturating_sub(360),
    };
    let steering_deg = f64::from(steering);

    let steering_side = match steering.signum() {
        1 => SteeringSide::Right,
        -1 => SteeringSide::Left,
        _ => SteeringSide::Straight,
    };

    let speed_cmd_byte = u8::try_from(controls.speed.clamp(0, SPEED_BYTE_MAX)).unwrap_or(u8::MAX);
    let fraction = f64::from(speed_cmd_byte) / f64::from(SPEED_BYTE_MAX);

    let movement_direction_text = if controls.movement_direction.clamp(0, 1) == 1 {
        MovementDirection::Front
    } else {
        MovementDirection::Back
    };

    ControlsDerived {
        steering_deg,
        steering_side,
        speed_cmd_byte,
        speed_cmd_pct: round6(fraction),
        speed_cmd_mps: round6(fraction * vmax_mps),
        movement_direction_text,
    }
}

/// Round to six decimal places.
fn round6(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    const fn controls(curve_direction: i32, speed: i32, movement_direction: i32) -> Controls {
        Controls {
            curve_direction,
            speed,
            movement_direction,
        }
    }

    #[test]
    fn steering_follows_curve_direction() {
        let cases = [
            (0, 0.0, SteeringSide::Straight),
            (45, 45.0, SteeringSide::Right),
            (179, 179.0, SteeringSide::Right),
            (180, 0.0, SteeringSide::Straight),
            (181, -179.0, SteeringSide::Left),
            (270, -90.0, SteeringSide::Left),
            (359, -1.0, SteeringSide::Left),
        ];
        for (curve, deg, side) in cases {
            let d = derive_controls(&controls(curve, 0, 1), 12.0);
            assert_eq!(d.steering_deg, deg, "curve_direction {curve}");
            assert_eq!(d.steering_side, side, "curve_direction {curve}");
        }
    }

    #[test]
    fn full_turn_is_straight_without_negative_zero() {
        let d = derive_controls(&controls(360, 0, 1), 12.0);
        assert_eq!(d.steering_side, SteeringSide::Straight);
        assert_eq!(d.steering_deg, 0.0);
        assert!(d.steering_deg.is_sign_positive());
        assert_eq!(serde_json::to_string(&d.steering_deg).unwrap(), "0.0");
    }

    #[test]
    fn speed_is_scaled_and_rounded() {
        let d = derive_controls(&controls(90, 51, 1), 12.0);
        assert_eq!(d.speed_cmd_byte, 51);
        assert_eq!(d.speed_cmd_pct, 0.2);
        assert_eq!(d.speed_cmd_mps, 2.4);

        let d = derive_controls(&controls(90, 1, 1), 12.0);
        assert_eq!(d.speed_cmd_pct, 0.003_922);
        assert_eq!(d.speed_cmd_mps, 0.047_059);

        let d = derive_controls(&controls(90, 255, 1), 12.0);
        assert_eq!(d.speed_cmd_pct, 1.0);
        assert_eq!(d.speed_cmd_mps, 12.0);
    }

    #[test]
    fn out_of_range_inputs_are_clamped() {
        let d = derive_controls(&controls(400, 300, 5), 10.0);
        assert_eq!(d.steering_side, SteeringSide::Straight);
        assert_eq!(d.speed_cmd_byte, 255);
        assert_eq!(d.speed_cmd_mps, 10.0);
        assert_eq!(d.movement_direction_text, MovementDirection::Front);

        let d = derive_controls(&controls(-20, -4, -1), 10.0);
        assert_eq!(d.steering_side, SteeringSide::Straight);
        assert_eq!(d.speed_cmd_byte, 0);
        assert_eq!(d.speed_cmd_pct, 0.0);
        assert_eq!(d.movement_direction_text, MovementDirection::Back);
    }

    #[test]
    fn movement_direction_zero_is_back() {
        let d = derive_controls(&controls(0, 0, 0), 12.0);
        assert_eq!(d.movement_direction_text, MovementDirection::Back);
        let d = derive_controls(&controls(0, 0, 1), 12.0);
        assert_eq!(d.movement_direction_text, MovementDirection::Front);
    }
}
