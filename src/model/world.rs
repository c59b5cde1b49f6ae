use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, info, trace};

use super::config::SimConfig;
use super::entity::{Category, Entity, EntityID, EntityKind};
use super::ship::NavState;
use super::snapshot::{EntitySnapshot, WorldSnapshot};
use crate::astro::Orbit;
use crate::error::{CommandError, CommandResult, ConfigError};
use crate::math::geometry::Position;

/// Owns every entity in the system, filed by category.
///
/// Invariants:
///   - every id in `categories` is a key of `entities`, and vice versa
///   - every anchor (orbit anchor, ship dock or destination) is a key of
///     `entities`, and of a category its dependent may anchor to
///   - within a category, ids are in insertion order
#[derive(Debug, Clone)]
pub struct WorldState {
    entities: HashMap<EntityID, Entity>,
    categories: [Vec<EntityID>; 5],
    next_id: usize,
    config: SimConfig,
    tick_count: u64,
    simulated_seconds: f64,
}

impl Default for WorldState {
    fn default() -> Self {
        WorldState {
            entities: HashMap::new(),
            categories: Default::default(),
            next_id: 0,
            config: SimConfig::default(),
            tick_count: 0,
            simulated_seconds: 0.0,
        }
    }
}

impl WorldState {
    /// An empty world. Fails if `config` doesn't validate.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(WorldState {
            config,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Swaps in a new configuration. Orbits and ships pick it up on the next
    /// tick; nothing already simulated is recomputed.
    pub fn with_config(mut self, config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Total orbital time that has passed, i.e. wall time times game speed.
    pub fn simulated_seconds(&self) -> f64 {
        self.simulated_seconds
    }

    pub fn get(&self, id: EntityID) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn ids(&self, category: Category) -> &[EntityID] {
        &self.categories[category.index()]
    }

    pub fn entities(&self, category: Category) -> impl Iterator<Item = &Entity> + '_ {
        self.ids(category).iter().map(move |id| &self.entities[id])
    }

    /// Every entity, in the order they're updated.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        Category::TICK_ORDER
            .into_iter()
            .flat_map(move |category| self.entities(category))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn find_by_name(&self, name: &str) -> Option<EntityID> {
        self.iter()
            .find(|entity| entity.name.eq_ignore_ascii_case(name))
            .map(|entity| entity.id)
    }

    pub fn add_star(
        &mut self,
        name: &str,
        radius: f64,
        position: Position,
    ) -> Result<EntityID, ConfigError> {
        self.add_entity(name, position, EntityKind::Star { radius })
    }

    pub fn add_planet(
        &mut self,
        name: &str,
        radius: f64,
        orbit: Orbit,
    ) -> Result<EntityID, ConfigError> {
        let kind = EntityKind::Planet {
            radius,
            orbit,
            moons: vec![],
        };
        self.add_entity(name, Position::origin(), kind)
    }

    pub fn add_moon(
        &mut self,
        name: &str,
        radius: f64,
        orbit: Orbit,
    ) -> Result<EntityID, ConfigError> {
        self.add_entity(name, Position::origin(), EntityKind::Moon { radius, orbit })
    }

    pub fn add_asteroid(
        &mut self,
        name: &str,
        radius: f64,
        orbit: Orbit,
    ) -> Result<EntityID, ConfigError> {
        let kind = EntityKind::Asteroid { radius, orbit };
        self.add_entity(name, Position::origin(), kind)
    }

    /// Adds a ship docked at `dock`.
    pub fn add_ship(&mut self, name: &str, dock: EntityID) -> Result<EntityID, ConfigError> {
        let nav = NavState::Docked { anchor: dock };
        self.add_entity(name, Position::origin(), EntityKind::Ship { nav })
    }

    /// Validates and files a new entity, returning its id.
    ///
    /// `position` is only used by entities that don't derive their position
    /// from an anchor: stars, and ships that start out flying. Orbiting bodies
    /// start at their orbit's position around the anchor, and docked ships
    /// start on top of their dock.
    ///
    /// A planet's moon list is rebuilt as moons are added, so whatever list
    /// it comes in with is dropped.
    pub fn add_entity(
        &mut self,
        name: &str,
        position: Position,
        mut kind: EntityKind,
    ) -> Result<EntityID, ConfigError> {
        let category = kind.category();

        match &mut kind {
            EntityKind::Star { radius }
            | EntityKind::Moon { radius, .. }
            | EntityKind::Asteroid { radius, .. } => check_radius(*radius)?,
            EntityKind::Planet { radius, moons, .. } => {
                check_radius(*radius)?;
                moons.clear();
            }
            EntityKind::Ship { .. } => {}
        }

        let id = EntityID(self.next_id);
        let mut entity = Entity::new(id, name.to_owned(), position, kind);

        if let Some(anchor_id) = entity.anchor() {
            let anchor = self
                .entities
                .get(&anchor_id)
                .ok_or(ConfigError::UnknownAnchor(anchor_id))?;
            if !category.can_anchor_to(anchor.category()) {
                return Err(ConfigError::InvalidAnchor {
                    child: category,
                    anchor: anchor.category(),
                });
            }
            entity.place(&anchor.position());

            // Everything checked out; from here on we only commit
            if category == Category::Moon {
                if let Some(EntityKind::Planet { moons, .. }) =
                    self.entities.get_mut(&anchor_id).map(|planet| &mut planet.kind)
                {
                    moons.push(id);
                }
            }
        }

        debug!(?id, name, ?category, "added entity");
        self.next_id += 1;
        self.entities.insert(id, entity);
        self.categories[category.index()].push(id);
        Ok(id)
    }

    /// Advances the whole world by `delta` of wall time.
    ///
    /// Bodies are updated strictly after their anchors (stars, planets, moons,
    /// asteroids), and ships last, so every read of an anchor's position sees
    /// the value for this tick.
    pub fn update(&mut self, delta: Duration) {
        let delta_seconds = delta.as_secs_f64();
        trace!(tick = self.tick_count, delta_seconds, "tick");

        let Self {
            entities,
            categories,
            config,
            ..
        } = self;

        for category in Category::TICK_ORDER {
            for &id in &categories[category.index()] {
                update_entity(entities, id, delta_seconds, config);
            }
        }

        self.tick_count += 1;
        self.simulated_seconds += delta_seconds * self.config.game_speed;
    }

    /// Sends `ship` towards `target`.
    ///
    /// Refuses unknown ids, non-ships, ship targets, flying to oneself, and
    /// flying to the current dock. A refused command changes nothing.
    pub fn fly_to(&mut self, ship: EntityID, target: EntityID) -> CommandResult<()> {
        let nav = self.check_command(ship, target)?;
        if nav.is_docked_at(target) {
            return Err(CommandError::AlreadyDocked { ship, target });
        }

        self.ship_mut(ship)?.fly_to(target)?;
        debug!(?ship, ?target, "ship departing");
        Ok(())
    }

    /// Docks `ship` at `target` immediately, wherever the ship is.
    pub fn dock_to(&mut self, ship: EntityID, target: EntityID) -> CommandResult<()> {
        self.check_command(ship, target)?;
        let target_position = self.entities[&target].position();

        self.ship_mut(ship)?.dock_to(target, target_position)?;
        debug!(?ship, ?target, "ship docked by command");
        Ok(())
    }

    fn check_command(&self, ship: EntityID, target: EntityID) -> CommandResult<NavState> {
        let nav = match self.entities.get(&ship) {
            None => return Err(CommandError::ShipNotFound(ship)),
            Some(entity) => *entity.nav().ok_or(CommandError::NotAShip(ship))?,
        };
        if ship == target {
            return Err(CommandError::TargetIsSelf(ship));
        }
        match self.entities.get(&target) {
            None => Err(CommandError::TargetNotFound(target)),
            Some(entity) if !entity.category().is_celestial() => {
                Err(CommandError::TargetIsShip(target))
            }
            Some(_) => Ok(nav),
        }
    }

    fn ship_mut(&mut self, ship: EntityID) -> CommandResult<&mut Entity> {
        self.entities
            .get_mut(&ship)
            .ok_or(CommandError::ShipNotFound(ship))
    }

    /// A read-only copy of everything a display needs.
    pub fn snapshot(&self) -> WorldSnapshot {
        let collect = |category: Category| -> Vec<EntitySnapshot> {
            self.entities(category).map(EntitySnapshot::from).collect()
        };
        WorldSnapshot {
            tick: self.tick_count,
            simulated_seconds: self.simulated_seconds,
            stars: collect(Category::Star),
            planets: collect(Category::Planet),
            moons: collect(Category::Moon),
            asteroids: collect(Category::Asteroid),
            ships: collect(Category::Ship),
        }
    }
}

fn check_radius(radius: f64) -> Result<(), ConfigError> {
    if radius > 0.0 && radius.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotPositive {
            quantity: "body radius",
            value: radius,
        })
    }
}

fn update_entity(
    entities: &mut HashMap<EntityID, Entity>,
    id: EntityID,
    delta_seconds: f64,
    config: &SimConfig,
) {
    // Anchors were validated when the world was built, so indexing can't fail
    let entity = &entities[&id];
    let anchor_position = match entity.anchor() {
        Some(anchor) => entities[&anchor].position(),
        None => entity.position(),
    };

    let Some(entity) = entities.get_mut(&id) else {
        return;
    };
    if entity.update(delta_seconds, config, &anchor_position) {
        info!(
            ship = %entity.name,
            target = ?entity.anchor(),
            "ship arrived and docked"
        );
    }
}
