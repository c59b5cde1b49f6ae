//! The entities of a star system, and the world that ticks them.

mod config;
mod entity;
mod ship;
mod simulation;
mod snapshot;
mod world;

pub use config::SimConfig;
pub use entity::{Category, Entity, EntityID, EntityKind};
pub use ship::NavState;
pub use simulation::{
    Clock, Command, ManualClock, Reply, Simulation, SimulationHandle, SystemClock, TickRate,
};
pub use snapshot::{Coordinates, EntitySnapshot, WorldSnapshot};
pub use world::WorldState;
