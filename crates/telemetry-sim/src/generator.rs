//! Synthetic trajectory.
//!
//! The car circles a fixed origin while every sensor channel follows a
//! slow sinusoid of elapsed time. A little random jitter is layered on
//! the IMU and the speed estimate so consecutive samples are not
//! perfectly smooth. Every channel is clamped to the range the ingest
//! pipeline accepts.

use rand::Rng;
use telemetry_types::{CarBlock, CarDrive, CarGps, CarImu, CentricBlock, Controls, Report};

/// Latitude of the circle centre.
pub const ORIGIN_LAT: f64 = -23.5586;
/// Longitude of the circle centre.
pub const ORIGIN_LON: f64 = -46.6492;
/// Circle radius in degrees.
const RADIUS_DEG: f64 = 0.00015;
/// Full-scale estimated speed in m/s.
const MAX_SPEED_MPS: f64 = 12.0;

/// Round `value` and clamp it into `lo..=hi`.
#[allow(clippy::cast_possible_truncation)]
fn clamp_i32(value: f64, lo: i32, hi: i32) -> i32 {
    value.round().clamp(f64::from(lo), f64::from(hi)) as i32
}

/// Normalize `sin(x)` into `0.0..=1.0`.
fn unit_wave(x: f64) -> f64 {
    f64::midpoint(x.sin(), 1.0)
}

/// Build the report for `t` seconds since the generator started.
pub fn report_at<R: Rng>(t: f64, src: &str, rng: &mut R) -> Report {
    let latitude = RADIUS_DEG.mul_add((t / 20.0).sin(), ORIGIN_LAT);
    let longitude = RADIUS_DEG.mul_add((t / 20.0).cos(), ORIGIN_LON);

    let mut jitter = |amplitude: f64| rng.random_range(-amplitude..=amplitude);

    let imu = CarImu {
        acceleration_x: clamp_i32(40.0f64.mul_add((t / 3.0).sin(), jitter(2.0)), -128, 127),
        acceleration_y: clamp_i32(40.0f64.mul_add((t / 5.0).cos(), jitter(2.0)), -128, 127),
        acceleration_z: clamp_i32(10.0f64.mul_add((t / 7.0).sin(), jitter(2.0)), -128, 127),
        spin_x: clamp_i32(50.0f64.mul_add((t / 4.0).sin(), jitter(2.0)), -128, 127),
        spin_y: clamp_i32(50.0f64.mul_add((t / 6.0).cos(), jitter(2.0)), -128, 127),
        spin_z: clamp_i32(70.0f64.mul_add((t / 2.0).sin(), jitter(2.0)), -128, 127),
        scale_dps: 500,
    };

    let drive_level = unit_wave(t / 5.0);
    let pwm = clamp_i32(drive_level * 255.0, 0, 255);
    let speed_est = MAX_SPEED_MPS
        .mul_add(drive_level, jitter(0.3))
        .clamp(0.0, MAX_SPEED_MPS);
    let speed_est_mps = (speed_est * 1000.0).round() / 1000.0;

    // -90..=90 degrees mapped onto the 0..360 heading code.
    let steering = clamp_i32((t / 4.0).sin() * 90.0, -90, 90);
    let curve_direction = steering.rem_euclid(360);

    let movement_direction = i32::from((t / 15.0).sin() > -0.2);

    Report {
        car: CarBlock {
            gps: Some(CarGps { latitude, longitude }),
            imu: Some(imu),
            drive: Some(CarDrive {
                pwm: Some(pwm),
                speed_est_mps: Some(speed_est_mps),
            }),
        },
        centric: CentricBlock {
            controls: Controls {
                curve_direction,
                speed: pwm,
                movement_direction,
            },
        },
        src: Some(src.to_owned()),
    }
}
