use std::f64::consts::TAU;

use serde::Serialize;

use super::{vis_viva_speed, KM_PER_AU, SECONDS_PER_YEAR};
use crate::error::ConfigError;
use crate::math::anomaly;
use crate::math::geometry::{normalize_angle, polar_offset, rotate, Position};
use crate::model::EntityID;

/// A uniform circular orbit around an anchor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CircularOrbit {
    #[serde(rename = "anchor_id")]
    anchor: EntityID,
    #[serde(rename = "radius_km")]
    radius: f64,
    #[serde(rename = "speed_km_per_s")]
    speed: f64,
    /// Derived from speed / radius once, at construction
    #[serde(rename = "angular_speed_rad_per_s")]
    angular_speed: f64,
    #[serde(rename = "current_angle_rad")]
    angle: f64,
}

/// A Keplerian ellipse around an anchor, with the anchor at one focus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EllipticalOrbit {
    #[serde(rename = "anchor_id")]
    anchor: EntityID,
    #[serde(rename = "semi_major_axis_km")]
    semimajor_axis: f64,
    eccentricity: f64,
    #[serde(rename = "argument_of_periapsis_rad")]
    arg_periapsis: f64,
    #[serde(rename = "mean_anomaly_at_epoch_rad")]
    mean_anomaly_at_epoch: f64,
    #[serde(rename = "orbital_period_s")]
    period: f64,
    #[serde(rename = "current_mean_anomaly_rad")]
    mean_anomaly: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Orbit {
    Circular(CircularOrbit),
    Elliptical(EllipticalOrbit),
}

fn require_positive(quantity: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { quantity, value })
    }
}

fn require_finite(quantity: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { quantity, value })
    }
}

impl CircularOrbit {
    pub fn new(
        anchor: EntityID,
        radius: f64,
        speed: f64,
        initial_angle: f64,
    ) -> Result<Self, ConfigError> {
        let radius = require_positive("orbit radius", radius)?;
        let speed = require_finite("orbital speed", speed)?;
        let angle = require_finite("initial angle", initial_angle)?;

        Ok(CircularOrbit {
            anchor,
            radius,
            speed,
            angular_speed: speed / radius,
            angle: normalize_angle(angle),
        })
    }

    pub fn anchor(&self) -> EntityID {
        self.anchor
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn angular_speed(&self) -> f64 {
        self.angular_speed
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Time for one revolution, in simulated seconds. Infinite for a body
    /// that doesn't move.
    pub fn period(&self) -> f64 {
        TAU / self.angular_speed.abs()
    }

    pub fn advance(&mut self, delta_seconds: f64, game_speed: f64) {
        self.angle = normalize_angle(self.angle + self.angular_speed * delta_seconds * game_speed);
    }

    pub fn position(&self, anchor_position: &Position) -> Position {
        anchor_position + polar_offset(self.radius, self.angle)
    }
}

impl EllipticalOrbit {
    /// Builds an orbit from its elements. The body starts at the epoch, so the
    /// current mean anomaly is the (wrapped) mean anomaly at epoch.
    pub fn new(
        anchor: EntityID,
        semimajor_axis: f64,
        eccentricity: f64,
        arg_periapsis: f64,
        mean_anomaly_at_epoch: f64,
        period: f64,
    ) -> Result<Self, ConfigError> {
        let semimajor_axis = require_positive("semi-major axis", semimajor_axis)?;
        let period = require_positive("orbital period", period)?;
        if !(0.0..1.0).contains(&eccentricity) {
            return Err(ConfigError::Eccentricity(eccentricity));
        }
        let arg_periapsis = require_finite("argument of periapsis", arg_periapsis)?;
        let mean_anomaly_at_epoch =
            normalize_angle(require_finite("mean anomaly at epoch", mean_anomaly_at_epoch)?);

        Ok(EllipticalOrbit {
            anchor,
            semimajor_axis,
            eccentricity,
            arg_periapsis,
            mean_anomaly_at_epoch,
            period,
            mean_anomaly: mean_anomaly_at_epoch,
        })
    }

    pub fn anchor(&self) -> EntityID {
        self.anchor
    }

    pub fn semimajor_axis(&self) -> f64 {
        self.semimajor_axis
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn arg_periapsis(&self) -> f64 {
        self.arg_periapsis
    }

    pub fn mean_anomaly_at_epoch(&self) -> f64 {
        self.mean_anomaly_at_epoch
    }

    pub fn mean_anomaly(&self) -> f64 {
        self.mean_anomaly
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn mean_motion(&self) -> f64 {
        TAU / self.period
    }

    pub fn periapsis(&self) -> f64 {
        self.semimajor_axis * (1.0 - self.eccentricity)
    }

    pub fn apoapsis(&self) -> f64 {
        self.semimajor_axis * (1.0 + self.eccentricity)
    }

    pub fn advance(&mut self, delta_seconds: f64, game_speed: f64) {
        self.mean_anomaly =
            normalize_angle(self.mean_anomaly + self.mean_motion() * delta_seconds * game_speed);
    }

    /// Distance from the focus at the current mean anomaly.
    pub fn radius(&self) -> f64 {
        let ecc_anomaly = anomaly::mean_to_eccentric(self.mean_anomaly, self.eccentricity);
        self.semimajor_axis * (1.0 - self.eccentricity * ecc_anomaly.cos())
    }

    /// Absolute position at the current mean anomaly, given where the anchor
    /// is right now. Depends only on the inputs, so replays are bit-for-bit.
    pub fn position(&self, anchor_position: &Position) -> Position {
        let e = self.eccentricity;
        let ecc_anomaly = anomaly::mean_to_eccentric(self.mean_anomaly, e);
        let true_anomaly = anomaly::eccentric_to_true(ecc_anomaly, e);

        // Periapsis lies along +x before rotating by the argument of periapsis
        let r = self.semimajor_axis * (1.0 - e * ecc_anomaly.cos());
        let offset = rotate(&polar_offset(r, true_anomaly), self.arg_periapsis);

        anchor_position + offset
    }
}

impl Orbit {
    pub fn anchor(&self) -> EntityID {
        match self {
            Orbit::Circular(orbit) => orbit.anchor(),
            Orbit::Elliptical(orbit) => orbit.anchor(),
        }
    }

    pub fn period(&self) -> f64 {
        match self {
            Orbit::Circular(orbit) => orbit.period(),
            Orbit::Elliptical(orbit) => orbit.period(),
        }
    }

    pub fn periapsis(&self) -> f64 {
        match self {
            Orbit::Circular(orbit) => orbit.radius(),
            Orbit::Elliptical(orbit) => orbit.periapsis(),
        }
    }

    pub fn apoapsis(&self) -> f64 {
        match self {
            Orbit::Circular(orbit) => orbit.radius(),
            Orbit::Elliptical(orbit) => orbit.apoapsis(),
        }
    }

    /// Advances the orbit by `delta_seconds` of wall time, scaled by the
    /// global game speed.
    pub fn advance(&mut self, delta_seconds: f64, game_speed: f64) {
        match self {
            Orbit::Circular(orbit) => orbit.advance(delta_seconds, game_speed),
            Orbit::Elliptical(orbit) => orbit.advance(delta_seconds, game_speed),
        }
    }

    pub fn position(&self, anchor_position: &Position) -> Position {
        match self {
            Orbit::Circular(orbit) => orbit.position(anchor_position),
            Orbit::Elliptical(orbit) => orbit.position(anchor_position),
        }
    }

    /// Current speed relative to the anchor, in km/s. Circular orbits report
    /// their configured speed; elliptical ones use vis-viva with the anchor's
    /// gravitational parameter `mu`.
    pub fn speed(&self, mu: f64) -> f64 {
        match self {
            Orbit::Circular(orbit) => orbit.speed(),
            Orbit::Elliptical(orbit) => vis_viva_speed(orbit.semimajor_axis, orbit.radius(), mu),
        }
    }

    /// T^2 / a^3 in years and AU. For anything orbiting a Sun-like star this
    /// should be close to 1.
    pub fn kepler_ratio(&self) -> f64 {
        let a_au = (self.periapsis() + self.apoapsis()) / 2.0 / KM_PER_AU;
        let t_years = self.period() / SECONDS_PER_YEAR;
        t_years * t_years / a_au.powi(3)
    }
}
