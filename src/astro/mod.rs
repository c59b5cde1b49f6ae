//! Orbit models for bodies that follow fixed paths around an anchor.
//!
//! The important type in this module is [Orbit], a tagged union over
//! [CircularOrbit] and [EllipticalOrbit]. Both are advanced one tick at a time
//! by their integrators, and both reconstruct an absolute position given the
//! anchor's absolute position for that same tick.

mod orbit;

pub use orbit::{CircularOrbit, EllipticalOrbit, Orbit};

/// Kilometers in one astronomical unit (mean Earth-Sun distance).
pub const KM_PER_AU: f64 = 149_597_870.7;

/// Seconds in a Julian year.
pub const SECONDS_PER_YEAR: f64 = 365.25 * 86400.0;

/// Standard gravitational parameter of the Sun, in km^3 / s^2.
pub const SUN_MU: f64 = 1.327_124_400_18e11;

/// Orbital speed from the vis-viva equation, v^2 = mu (2/r - 1/a).
///
/// Distances in km, `mu` in km^3 / s^2, result in km/s.
pub fn vis_viva_speed(semimajor_axis: f64, radius: f64, mu: f64) -> f64 {
    (mu * (2.0 / radius - 1.0 / semimajor_axis)).sqrt()
}
