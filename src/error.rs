//! Error types for scenario setup and external commands

use thiserror::Error;

use crate::model::{Category, EntityID};

/// Problems with the initial configuration of a world. These are only ever
/// raised while the world is being built; a running simulation never sees them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("anchor {0:?} does not exist")]
    UnknownAnchor(EntityID),

    #[error("{child:?} cannot orbit a {anchor:?}")]
    InvalidAnchor { child: Category, anchor: Category },

    #[error("{quantity} must be positive and finite, got {value}")]
    NotPositive { quantity: &'static str, value: f64 },

    #[error("{quantity} must be finite, got {value}")]
    NotFinite { quantity: &'static str, value: f64 },

    #[error("eccentricity must lie in [0, 1), got {0}")]
    Eccentricity(f64),

    #[error("duplicate entity name {0:?}")]
    DuplicateName(String),
}

/// Reasons a command against the world was refused. A refused command leaves
/// the world untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("ship {0:?} not found")]
    ShipNotFound(EntityID),

    #[error("target {0:?} not found")]
    TargetNotFound(EntityID),

    #[error("entity {0:?} is not a ship")]
    NotAShip(EntityID),

    #[error("ship {0:?} cannot target itself")]
    TargetIsSelf(EntityID),

    #[error("ship {ship:?} is already docked at {target:?}")]
    AlreadyDocked { ship: EntityID, target: EntityID },

    #[error("{0:?} is a ship, not a celestial body")]
    TargetIsShip(EntityID),

    #[error("simulation is no longer running")]
    Disconnected,
}

/// Failures while loading a scenario file.
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("{entity:?} refers to unknown body {name:?}")]
    UnknownName { entity: String, name: String },

    #[error("invalid body {entity:?}: {source}")]
    Config {
        entity: String,
        #[source]
        source: ConfigError,
    },
}

pub type CommandResult<T> = Result<T, CommandError>;
