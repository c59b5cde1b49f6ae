//! Loading scenarios from TOML.
//!
//! A scenario has an optional `[config]` table (see [SimConfig]) followed by
//! arrays of `[[star]]`, `[[planet]]`, `[[moon]]`, `[[asteroid]]` and
//! `[[ship]]` tables. Bodies refer to their anchors by name; names must be
//! unique across the whole file. Anchors have to be declared before the
//! bodies that use them, which the section order already guarantees for
//! everything except asteroids orbiting other asteroids (not allowed anyway).

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::astro::{CircularOrbit, EllipticalOrbit, Orbit};
use crate::error::{ConfigError, ScenarioError};
use crate::math::geometry::Position;
use crate::model::{Category, EntityID, EntityKind, NavState, SimConfig, WorldState};

const SOL: &str = include_str!("../scenarios/sol.toml");

/// Kepler third-law ratios outside this band get a warning. Anything orbiting
/// a Sun-like star should be close to 1.
const KEPLER_RATIO_BAND: (f64, f64) = (0.5, 2.0);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScenarioFile {
    #[serde(default)]
    config: SimConfig,
    #[serde(default, rename = "star")]
    stars: Vec<StarEntry>,
    #[serde(default, rename = "planet")]
    planets: Vec<BodyEntry>,
    #[serde(default, rename = "moon")]
    moons: Vec<BodyEntry>,
    #[serde(default, rename = "asteroid")]
    asteroids: Vec<BodyEntry>,
    #[serde(default, rename = "ship")]
    ships: Vec<ShipEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct StarEntry {
    name: String,
    radius_km: f64,
    #[serde(default)]
    position: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BodyEntry {
    name: String,
    radius_km: f64,
    anchor: String,
    orbit: OrbitEntry,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
enum OrbitEntry {
    Circular {
        radius_km: f64,
        speed_km_per_s: f64,
        #[serde(default)]
        initial_angle_rad: f64,
    },
    Elliptical {
        semi_major_axis_km: f64,
        eccentricity: f64,
        #[serde(default)]
        argument_of_periapsis_rad: f64,
        #[serde(default)]
        mean_anomaly_at_epoch_rad: f64,
        orbital_period_s: f64,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ShipEntry {
    name: String,
    docked_at: String,
}

impl OrbitEntry {
    fn build(&self, anchor: EntityID) -> Result<Orbit, ConfigError> {
        let orbit = match *self {
            OrbitEntry::Circular {
                radius_km,
                speed_km_per_s,
                initial_angle_rad,
            } => Orbit::Circular(CircularOrbit::new(
                anchor,
                radius_km,
                speed_km_per_s,
                initial_angle_rad,
            )?),
            OrbitEntry::Elliptical {
                semi_major_axis_km,
                eccentricity,
                argument_of_periapsis_rad,
                mean_anomaly_at_epoch_rad,
                orbital_period_s,
            } => Orbit::Elliptical(EllipticalOrbit::new(
                anchor,
                semi_major_axis_km,
                eccentricity,
                argument_of_periapsis_rad,
                mean_anomaly_at_epoch_rad,
                orbital_period_s,
            )?),
        };
        Ok(orbit)
    }
}

/// Tracks names as they're declared, so later entries can refer to them.
/// Names are matched ignoring ASCII case, the same way
/// [WorldState::find_by_name] matches them.
struct Loader {
    world: WorldState,
    names: HashMap<String, EntityID>,
}

impl Loader {
    fn lookup(&self, entity: &str, name: &str) -> Result<EntityID, ScenarioError> {
        self.names
            .get(&name.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| ScenarioError::UnknownName {
                entity: entity.to_owned(),
                name: name.to_owned(),
            })
    }

    fn add(
        &mut self,
        name: &str,
        position: Position,
        kind: EntityKind,
    ) -> Result<EntityID, ScenarioError> {
        let wrap = |source| ScenarioError::Config {
            entity: name.to_owned(),
            source,
        };

        let key = name.to_ascii_lowercase();
        if self.names.contains_key(&key) {
            return Err(wrap(ConfigError::DuplicateName(name.to_owned())));
        }
        let id = self.world.add_entity(name, position, kind).map_err(wrap)?;
        self.names.insert(key, id);
        Ok(id)
    }

    fn add_body(
        &mut self,
        category: Category,
        entry: &BodyEntry,
    ) -> Result<EntityID, ScenarioError> {
        let anchor = self.lookup(&entry.name, &entry.anchor)?;
        let orbit = entry.orbit.build(anchor).map_err(|source| ScenarioError::Config {
            entity: entry.name.clone(),
            source,
        })?;

        let radius = entry.radius_km;
        let kind = match category {
            Category::Planet => EntityKind::Planet {
                radius,
                orbit,
                moons: vec![],
            },
            Category::Moon => EntityKind::Moon { radius, orbit },
            Category::Asteroid => EntityKind::Asteroid { radius, orbit },
            Category::Star | Category::Ship => unreachable!("{:?} has no orbit", category),
        };

        let id = self.add(&entry.name, Position::origin(), kind)?;
        self.check_kepler_ratio(id);
        Ok(id)
    }

    /// Only meaningful for things going around a star: the ratio is in years
    /// and AU, so it's close to 1 for a Sun-like parent.
    fn check_kepler_ratio(&self, id: EntityID) {
        let Some(entity) = self.world.get(id) else {
            return;
        };
        let Some(orbit) = entity.orbit() else {
            return;
        };
        let anchored_to_star = self
            .world
            .get(orbit.anchor())
            .map_or(false, |anchor| anchor.category() == Category::Star);

        let ratio = orbit.kepler_ratio();
        let (low, high) = KEPLER_RATIO_BAND;
        if anchored_to_star && !(low..=high).contains(&ratio) {
            warn!(
                body = %entity.name,
                ratio,
                "orbit is far from Kepler's third law for a Sun-like star"
            );
        }
    }
}

/// Builds a world from the text of a scenario file.
pub fn parse_scenario(text: &str) -> Result<WorldState, ScenarioError> {
    let file: ScenarioFile = toml::from_str(text)?;
    let world = WorldState::new(file.config).map_err(|source| ScenarioError::Config {
        entity: "config".to_owned(),
        source,
    })?;

    let mut loader = Loader {
        world,
        names: HashMap::new(),
    };

    for star in &file.stars {
        let [x, y] = star.position;
        let kind = EntityKind::Star {
            radius: star.radius_km,
        };
        loader.add(&star.name, Position::new(x, y), kind)?;
    }
    for planet in &file.planets {
        loader.add_body(Category::Planet, planet)?;
    }
    for moon in &file.moons {
        loader.add_body(Category::Moon, moon)?;
    }
    for asteroid in &file.asteroids {
        loader.add_body(Category::Asteroid, asteroid)?;
    }
    for ship in &file.ships {
        let dock = loader.lookup(&ship.name, &ship.docked_at)?;
        let kind = EntityKind::Ship {
            nav: NavState::Docked { anchor: dock },
        };
        loader.add(&ship.name, Position::origin(), kind)?;
    }

    let world = loader.world;
    info!(
        stars = world.ids(Category::Star).len(),
        planets = world.ids(Category::Planet).len(),
        moons = world.ids(Category::Moon).len(),
        asteroids = world.ids(Category::Asteroid).len(),
        ships = world.ids(Category::Ship).len(),
        "loaded scenario"
    );
    Ok(world)
}

pub fn read_file(path: impl AsRef<Path>) -> Result<WorldState, ScenarioError> {
    let text = fs::read_to_string(path)?;
    parse_scenario(&text)
}

/// The bundled Solar System scenario.
pub fn sol() -> Result<WorldState, ScenarioError> {
    parse_scenario(SOL)
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::astro::KM_PER_AU;

    #[test]
    fn test_sol() {
        let world = sol().unwrap();
        assert_eq!(world.ids(Category::Star).len(), 1);
        assert_eq!(world.ids(Category::Planet).len(), 8);
        assert_eq!(world.ids(Category::Moon).len(), 1);
        assert_eq!(world.ids(Category::Asteroid).len(), 2);
        assert_eq!(world.ids(Category::Ship).len(), 1);
        assert_eq!(world.config(), &SimConfig::default());

        // Pioneer starts docked at Mercury, sitting right on top of it
        let mercury = world.find_by_name("Mercury").unwrap();
        let pioneer = world.get(world.find_by_name("Pioneer").unwrap()).unwrap();
        assert_eq!(pioneer.nav(), Some(&NavState::Docked { anchor: mercury }));
        assert_eq!(pioneer.position(), world.get(mercury).unwrap().position());

        // Earth starts on the +x axis, one AU out
        let earth = world.get(world.find_by_name("Earth").unwrap()).unwrap();
        assert_relative_eq!(earth.position(), Position::new(KM_PER_AU, 0.0));

        let luna = world.find_by_name("Luna").unwrap();
        match &earth.kind {
            EntityKind::Planet { moons, .. } => assert_eq!(moons, &vec![luna]),
            other => panic!("Earth isn't a planet: {:?}", other),
        }
    }

    #[test]
    fn test_sol_follows_kepler() {
        let world = sol().unwrap();
        for body in world.iter() {
            let Some(orbit) = body.orbit() else { continue };
            if world.get(orbit.anchor()).unwrap().category() == Category::Star {
                assert_relative_eq!(orbit.kepler_ratio(), 1.0, max_relative = 0.05);
            }
        }
    }

    #[test]
    fn test_minimal() {
        let world = parse_scenario(
            r#"
            [[star]]
            name = "Alpha"
            radius_km = 1.0
            position = [10.0, 0.0]

            [[planet]]
            name = "Beta"
            radius_km = 1.0
            anchor = "Alpha"

            [planet.orbit]
            type = "elliptical"
            semi_major_axis_km = 100.0
            eccentricity = 0.5
            orbital_period_s = 10.0
            "#,
        )
        .unwrap();

        let beta = world.get(world.find_by_name("Beta").unwrap()).unwrap();
        // At periapsis, along +x from the star
        assert_relative_eq!(beta.position(), Position::new(60.0, 0.0));
        assert_eq!(world.config(), &SimConfig::default());
    }

    #[test]
    fn test_unknown_anchor_name() {
        let err = parse_scenario(
            r#"
            [[ship]]
            name = "Drifter"
            docked_at = "Nowhere"
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::UnknownName { ref entity, ref name }
                if entity == "Drifter" && name == "Nowhere"
        ));
    }

    #[test]
    fn test_names_ignore_case() {
        let err = parse_scenario(
            r#"
            [[star]]
            name = "Sol"
            radius_km = 1.0

            [[planet]]
            name = "Earth"
            radius_km = 1.0
            anchor = "Sol"
            orbit = { type = "circular", radius_km = 100.0, speed_km_per_s = 1.0 }

            [[planet]]
            name = "earth"
            radius_km = 1.0
            anchor = "Sol"
            orbit = { type = "circular", radius_km = 200.0, speed_km_per_s = 1.0 }
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Config { ref entity, source: ConfigError::DuplicateName(_) }
                if entity == "earth"
        ));

        // Anchors resolve the same way find_by_name does
        let world = parse_scenario(
            r#"
            [[star]]
            name = "Sol"
            radius_km = 1.0

            [[ship]]
            name = "Pioneer"
            docked_at = "SOL"
            "#,
        )
        .unwrap();
        let sol = world.find_by_name("sol").unwrap();
        let pioneer = world.get(world.find_by_name("Pioneer").unwrap()).unwrap();
        assert_eq!(pioneer.nav(), Some(&NavState::Docked { anchor: sol }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let misspelled = [
            "[config]\narrival_tolerance = 10.0\n",
            "[[star]]\nname = \"Sol\"\nradius = 1.0\n",
            "[[ship]]\nname = \"Pioneer\"\ndocked_at = \"Sol\"\ndock = \"Sol\"\n",
            r#"
            [[star]]
            name = "Sol"
            radius_km = 1.0

            [[planet]]
            name = "Earth"
            radius_km = 1.0
            anchor = "Sol"

            [planet.orbit]
            type = "circular"
            radius_km = 100.0
            speed_km_per_s = 1.0
            initial_angle = 2.0
            "#,
            r#"
            [[star]]
            name = "Sol"
            radius_km = 1.0
            colour = "yellow"
            "#,
        ];
        for text in misspelled {
            assert!(
                matches!(parse_scenario(text), Err(ScenarioError::Toml(_))),
                "accepted {:?}",
                text
            );
        }
    }

    #[test]
    fn test_duplicate_name() {
        let err = parse_scenario(
            r#"
            [[star]]
            name = "Twin"
            radius_km = 1.0

            [[star]]
            name = "Twin"
            radius_km = 2.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Config { source: ConfigError::DuplicateName(_), .. }
        ));
    }

    #[test]
    fn test_bad_orbit() {
        let err = parse_scenario(
            r#"
            [[star]]
            name = "Alpha"
            radius_km = 1.0

            [[asteroid]]
            name = "Escapee"
            radius_km = 1.0
            anchor = "Alpha"

            [asteroid.orbit]
            type = "elliptical"
            semi_major_axis_km = 100.0
            eccentricity = 1.2
            orbital_period_s = 10.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Config { source: ConfigError::Eccentricity(_), .. }
        ));

        let err = parse_scenario("[config]\ntick_period_ms = 0\n").unwrap_err();
        assert!(matches!(err, ScenarioError::Config { .. }));

        assert!(matches!(parse_scenario("[[star]]\nname = 3"), Err(ScenarioError::Toml(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_file("/nonexistent/scenario.toml"),
            Err(ScenarioError::Io(_))
        ));
    }
}
