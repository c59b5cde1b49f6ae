use nalgebra::{Point2, Rotation2, Vector2};

use std::f64::consts::TAU;

/// An absolute position in the plane of the system, in kilometers.
pub type Position = Point2<f64>;

/// A displacement between two positions, in kilometers.
pub type Offset = Vector2<f64>;

/// Wraps an angle into [0, 2pi).
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// The offset of a point at distance `radius` and polar angle `angle`.
pub fn polar_offset(radius: f64, angle: f64) -> Offset {
    radius * Vector2::new(angle.cos(), angle.sin())
}

/// Rotates `v` counterclockwise by `angle`.
pub fn rotate(v: &Offset, angle: f64) -> Offset {
    Rotation2::new(angle) * v
}
