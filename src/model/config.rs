use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Simulation-wide tuning. Threaded through the world and every integrator
/// call rather than kept in globals, so that runs are reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimConfig {
    /// Simulated seconds per wall-clock second. Applies uniformly to every
    /// body, so relative orbital periods are preserved.
    pub game_speed: f64,
    /// Ship cruise speed before time acceleration.
    pub ship_speed_km_per_s: f64,
    /// A flying ship this close to its destination docks.
    pub arrival_tolerance_km: f64,
    /// Nominal period of the simulation driver.
    pub tick_period_ms: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            game_speed: 100_000.0,
            ship_speed_km_per_s: 30.0,
            arrival_tolerance_km: 50_000.0,
            tick_period_ms: 100,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.game_speed >= 0.0 && self.game_speed.is_finite()) {
            return Err(ConfigError::NotFinite {
                quantity: "game speed",
                value: self.game_speed,
            });
        }
        if !(self.ship_speed_km_per_s > 0.0 && self.ship_speed_km_per_s.is_finite()) {
            return Err(ConfigError::NotPositive {
                quantity: "ship speed",
                value: self.ship_speed_km_per_s,
            });
        }
        if !(self.arrival_tolerance_km >= 0.0 && self.arrival_tolerance_km.is_finite()) {
            return Err(ConfigError::NotFinite {
                quantity: "arrival tolerance",
                value: self.arrival_tolerance_km,
            });
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigError::NotPositive {
                quantity: "tick period",
                value: 0.0,
            });
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    /// How far a ship cruises in `delta_seconds` of wall time.
    pub fn travel_distance(&self, delta_seconds: f64) -> f64 {
        self.ship_speed_km_per_s * delta_seconds * self.game_speed
    }
}
