use serde::Serialize;

use super::config::SimConfig;
use super::ship::NavState;
use crate::astro::Orbit;
use crate::error::CommandError;
use crate::math::geometry::Position;

#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct EntityID(pub usize);

/// Which table of the world an entity lives in.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Star,
    Planet,
    Moon,
    Asteroid,
    Ship,
}

impl Category {
    /// Anchors always come before the things anchored to them, and ships go
    /// last so they see every body's final position for the tick.
    pub const TICK_ORDER: [Category; 5] = [
        Category::Star,
        Category::Planet,
        Category::Moon,
        Category::Asteroid,
        Category::Ship,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn is_celestial(self) -> bool {
        !matches!(self, Category::Ship)
    }

    /// Whether something of this category may orbit (or, for ships, dock at)
    /// something of category `anchor`.
    pub fn can_anchor_to(self, anchor: Category) -> bool {
        match self {
            Category::Star => false,
            Category::Planet => anchor == Category::Star,
            Category::Moon => anchor == Category::Planet,
            Category::Asteroid => {
                matches!(anchor, Category::Star | Category::Planet | Category::Moon)
            }
            Category::Ship => anchor.is_celestial(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    /// Immobile; normally the root anchor of the system.
    Star { radius: f64 },
    Planet {
        radius: f64,
        orbit: Orbit,
        /// Filled in as moons are added to the world
        moons: Vec<EntityID>,
    },
    Moon { radius: f64, orbit: Orbit },
    Asteroid { radius: f64, orbit: Orbit },
    Ship { nav: NavState },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityID,
    pub name: String,
    position: Position,
    pub kind: EntityKind,
}

impl EntityKind {
    pub fn category(&self) -> Category {
        match self {
            EntityKind::Star { .. } => Category::Star,
            EntityKind::Planet { .. } => Category::Planet,
            EntityKind::Moon { .. } => Category::Moon,
            EntityKind::Asteroid { .. } => Category::Asteroid,
            EntityKind::Ship { .. } => Category::Ship,
        }
    }
}

impl Entity {
    pub(crate) fn new(id: EntityID, name: String, position: Position, kind: EntityKind) -> Self {
        Entity {
            id,
            name,
            position,
            kind,
        }
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn radius(&self) -> Option<f64> {
        match self.kind {
            EntityKind::Star { radius }
            | EntityKind::Planet { radius, .. }
            | EntityKind::Moon { radius, .. }
            | EntityKind::Asteroid { radius, .. } => Some(radius),
            EntityKind::Ship { .. } => None,
        }
    }

    pub fn orbit(&self) -> Option<&Orbit> {
        match &self.kind {
            EntityKind::Planet { orbit, .. }
            | EntityKind::Moon { orbit, .. }
            | EntityKind::Asteroid { orbit, .. } => Some(orbit),
            EntityKind::Star { .. } | EntityKind::Ship { .. } => None,
        }
    }

    pub fn nav(&self) -> Option<&NavState> {
        match &self.kind {
            EntityKind::Ship { nav } => Some(nav),
            _ => None,
        }
    }

    /// The entity whose position this one reads during its own update: the
    /// orbit anchor for bodies, the dock or destination for ships.
    pub fn anchor(&self) -> Option<EntityID> {
        match &self.kind {
            EntityKind::Star { .. } => None,
            EntityKind::Ship { nav } => Some(nav.target()),
            _ => self.orbit().map(Orbit::anchor),
        }
    }

    /// Puts a freshly created entity where its anchor says it should be,
    /// without advancing anything. Flying ships keep their position.
    pub(crate) fn place(&mut self, anchor_position: &Position) {
        match &self.kind {
            EntityKind::Star { .. } => {}
            EntityKind::Planet { orbit, .. }
            | EntityKind::Moon { orbit, .. }
            | EntityKind::Asteroid { orbit, .. } => {
                self.position = orbit.position(anchor_position)
            }
            EntityKind::Ship { nav } => {
                if nav.is_docked() {
                    self.position = *anchor_position;
                }
            }
        }
    }

    /// Advances this entity by one tick. `anchor_position` must be the
    /// already-updated position of [Entity::anchor] for this tick; stars
    /// ignore it.
    ///
    /// Returns true when a flying ship arrives and docks.
    pub fn update(
        &mut self,
        delta_seconds: f64,
        config: &SimConfig,
        anchor_position: &Position,
    ) -> bool {
        match &mut self.kind {
            EntityKind::Star { .. } => false,
            EntityKind::Planet { orbit, .. }
            | EntityKind::Moon { orbit, .. }
            | EntityKind::Asteroid { orbit, .. } => {
                orbit.advance(delta_seconds, config.game_speed);
                self.position = orbit.position(anchor_position);
                false
            }
            EntityKind::Ship { nav } => {
                let was_flying = !nav.is_docked();
                let (new_nav, new_position) = nav.step(
                    &self.position,
                    anchor_position,
                    config.travel_distance(delta_seconds),
                    config.arrival_tolerance_km,
                );
                *nav = new_nav;
                self.position = new_position;
                was_flying && nav.is_docked()
            }
        }
    }

    /// Docks this ship at `target`, snapping it onto the target's position.
    pub fn dock_to(
        &mut self,
        target: EntityID,
        target_position: Position,
    ) -> Result<(), CommandError> {
        match &mut self.kind {
            EntityKind::Ship { nav } => {
                *nav = NavState::Docked { anchor: target };
                self.position = target_position;
                Ok(())
            }
            _ => Err(CommandError::NotAShip(self.id)),
        }
    }

    /// Sends this ship towards `target`, starting from wherever it is now.
    pub fn fly_to(&mut self, target: EntityID) -> Result<(), CommandError> {
        match &mut self.kind {
            EntityKind::Ship { nav } => {
                *nav = NavState::Flying {
                    destination: target,
                    start_position: self.position,
                };
                Ok(())
            }
            _ => Err(CommandError::NotAShip(self.id)),
        }
    }
}
