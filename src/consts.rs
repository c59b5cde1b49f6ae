use std::f64::consts::PI;

// Mean values for the Earth, in km and km/s
pub const EARTH_ORBIT_RADIUS: f64 = 149_597_870.7;
pub const EARTH_ORBIT_SPEED: f64 = 29.78;
pub const EARTH_YEAR: f64 = 365.25 * 86400.0;

// Taken from JPL's small-body database
pub const HALLEY_SEMIMAJOR_AXIS: f64 = 17.834 * EARTH_ORBIT_RADIUS;
pub const HALLEY_ECCENTRICITY: f64 = 0.967;

pub fn get_circular_period(radius: f64, speed: f64) -> f64 {
    2.0 * PI * radius / speed
}

pub fn get_period(a: f64, mu: f64) -> f64 {
    (4.0 * PI * PI * a.powi(3) / mu).sqrt()
}
