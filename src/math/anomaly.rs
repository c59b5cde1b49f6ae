use std::f64::consts::PI;

use crate::math::geometry::normalize_angle;
use crate::math::root_finding::newton_raphson;

pub const KEPLER_TOLERANCE: f64 = 1e-8;
pub const KEPLER_MAX_ITERATIONS: usize = 30;

// Below this, 1 - e cos E is too flat to take a Newton step from
const MIN_KEPLER_DERIVATIVE: f64 = 1e-12;

/// Solves Kepler's equation M = E - e sin E for the eccentric anomaly E,
/// with the default tolerance and iteration budget.
pub fn mean_to_eccentric(mean_anomaly: f64, e: f64) -> f64 {
    solve_kepler(mean_anomaly, e, KEPLER_TOLERANCE, KEPLER_MAX_ITERATIONS)
}

/// Solves Kepler's equation for 0 <= e < 1.
///
/// Circular orbits take a fast path and hand back `mean_anomaly` untouched.
/// Otherwise the result is wrapped into [0, 2pi). Running out of iterations
/// is not an error; the best estimate so far is returned.
#[allow(clippy::float_cmp)]
pub fn solve_kepler(mean_anomaly: f64, e: f64, tolerance: f64, num_iterations: usize) -> f64 {
    debug_assert!((0.0..1.0).contains(&e));

    if e == 0.0 {
        return mean_anomaly;
    }

    let m = normalize_angle(mean_anomaly);
    let kepler = |x: f64| -> (f64, f64) { (x - e * x.sin() - m, 1.0 - e * x.cos()) };

    // Near-parabolic orbits converge much better starting from the apoapsis
    let initial_guess = if e > 0.8 { PI } else { m };

    let eccentric_anomaly = newton_raphson(
        kepler,
        initial_guess,
        tolerance,
        MIN_KEPLER_DERIVATIVE,
        num_iterations,
    );
    normalize_angle(eccentric_anomaly)
}

pub fn eccentric_to_mean(eccentric_anomaly: f64, e: f64) -> f64 {
    eccentric_anomaly - e * eccentric_anomaly.sin()
}

/// Converts eccentric to true anomaly.
///
/// Uses sin and cos of the true anomaly directly rather than the half-angle
/// tangent formula, which blows up at E = pi.
pub fn eccentric_to_true(eccentric_anomaly: f64, e: f64) -> f64 {
    let (sin_ecc, cos_ecc) = eccentric_anomaly.sin_cos();
    let denominator = 1.0 - e * cos_ecc;

    let sin_true = (1.0 - e * e).sqrt() * sin_ecc / denominator;
    let cos_true = (cos_ecc - e) / denominator;
    sin_true.atan2(cos_true)
}

pub fn mean_to_true(mean_anomaly: f64, e: f64) -> f64 {
    eccentric_to_true(mean_to_eccentric(mean_anomaly, e), e)
}
