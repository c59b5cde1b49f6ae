use serde::{Serialize, Serializer};

use super::entity::{Entity, EntityID, EntityKind};
use super::ship::NavState;
use crate::astro::Orbit;
use crate::math::geometry::Position;

/// A read-only view of the world at the end of some tick, laid out for
/// display clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub simulated_seconds: f64,
    pub stars: Vec<EntitySnapshot>,
    pub planets: Vec<EntitySnapshot>,
    pub moons: Vec<EntitySnapshot>,
    pub asteroids: Vec<EntitySnapshot>,
    pub ships: Vec<EntitySnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub id: EntityID,
    pub name: String,
    pub position: Coordinates,
    #[serde(rename = "radius_km", skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orbit: Option<Orbit>,
    #[serde(rename = "navigation", skip_serializing_if = "Option::is_none")]
    pub nav: Option<NavState>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub moons: Vec<EntityID>,
}

impl From<Position> for Coordinates {
    fn from(p: Position) -> Self {
        Coordinates { x: p.x, y: p.y }
    }
}

impl From<&Entity> for EntitySnapshot {
    fn from(entity: &Entity) -> Self {
        let moons = match &entity.kind {
            EntityKind::Planet { moons, .. } => moons.clone(),
            _ => vec![],
        };
        EntitySnapshot {
            id: entity.id,
            name: entity.name.clone(),
            position: entity.position().into(),
            radius: entity.radius(),
            orbit: entity.orbit().cloned(),
            nav: entity.nav().copied(),
            moons,
        }
    }
}

impl WorldSnapshot {
    pub fn iter(&self) -> impl Iterator<Item = &EntitySnapshot> {
        self.stars
            .iter()
            .chain(&self.planets)
            .chain(&self.moons)
            .chain(&self.asteroids)
            .chain(&self.ships)
    }

    pub fn find(&self, name: &str) -> Option<&EntitySnapshot> {
        self.iter().find(|e| e.name.eq_ignore_ascii_case(name))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Writes a point as `{"x": .., "y": ..}` rather than nalgebra's bare array.
pub(crate) fn as_coordinates<S: Serializer>(p: &Position, s: S) -> Result<S::Ok, S::Error> {
    Coordinates::from(*p).serialize(s)
}
