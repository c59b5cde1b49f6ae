use std::f64::consts::TAU;
use std::thread;
use std::time::Duration;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use itertools::Itertools;

use rust_orrery::astro::{CircularOrbit, Orbit};
use rust_orrery::error::CommandError;
use rust_orrery::file::sol;
use rust_orrery::math::geometry::Position;
use rust_orrery::model::{
    Category, EntityID, ManualClock, NavState, SimConfig, Simulation, WorldState,
};

fn config() -> SimConfig {
    SimConfig {
        game_speed: 1.0,
        ship_speed_km_per_s: 20.0,
        arrival_tolerance_km: 5.0,
        tick_period_ms: 1000,
    }
}

fn circular(anchor: EntityID, radius: f64, speed: f64, angle: f64) -> Orbit {
    Orbit::Circular(CircularOrbit::new(anchor, radius, speed, angle).unwrap())
}

/// A sun with two planets on slow circular orbits, and a ship docked at the
/// inner one.
fn two_planets() -> (WorldState, EntityID, EntityID, EntityID, EntityID) {
    let mut world = WorldState::new(config()).unwrap();
    let sun = world.add_star("Sun", 10.0, Position::origin()).unwrap();
    let inner = world
        .add_planet("Inner", 1.0, circular(sun, 1000.0, 1.0, 0.0))
        .unwrap();
    let outer = world
        .add_planet("Outer", 1.0, circular(sun, 2000.0, 1.0, 2.0))
        .unwrap();
    let ship = world.add_ship("Courier", inner).unwrap();
    (world, sun, inner, outer, ship)
}

fn position(world: &WorldState, id: EntityID) -> Position {
    world.get(id).unwrap().position()
}

fn nav(world: &WorldState, id: EntityID) -> NavState {
    *world.get(id).unwrap().nav().unwrap()
}

#[test]
fn planet_returns_after_one_period() {
    let (mut world, _, inner, _, _) = two_planets();
    let start = position(&world, inner);

    // 2 pi r / v, in 1000 uneven pieces
    let period = TAU * 1000.0 / 1.0;
    let mut elapsed = 0.0;
    for i in 0..1000 {
        let weight = if i % 2 == 0 { 0.5 } else { 1.5 };
        let dt = weight * period / 1000.0;
        world.update(Duration::from_secs_f64(dt));
        elapsed += dt;
    }
    assert_relative_eq!(elapsed, period, max_relative = 1e-9);

    let end = position(&world, inner);
    assert_abs_diff_eq!(start.x, end.x, epsilon = 1e-3);
    assert_abs_diff_eq!(start.y, end.y, epsilon = 1e-3);
}

#[test]
fn ship_flies_to_moving_planet_and_docks() {
    let (mut world, _, inner, outer, ship) = two_planets();
    world.fly_to(ship, outer).unwrap();
    assert_eq!(
        nav(&world, ship),
        NavState::Flying {
            destination: outer,
            start_position: position(&world, inner),
        }
    );

    let mut distances = vec![];
    let mut ticks = 0;
    while !nav(&world, ship).is_docked() {
        distances.push((position(&world, outer) - position(&world, ship)).norm());
        world.update(Duration::from_secs(1));
        ticks += 1;
        assert!(ticks < 1000, "ship never caught up");
    }

    // The ship is 20x faster than its target, so it closes in every tick
    assert!(distances.iter().tuple_windows().all(|(a, b)| b < a));

    assert_eq!(nav(&world, ship), NavState::Docked { anchor: outer });
    assert_eq!(position(&world, ship), position(&world, outer));

    // And it stays put on subsequent ticks
    for _ in 0..10 {
        world.update(Duration::from_secs(1));
        assert_eq!(position(&world, ship), position(&world, outer));
    }
}

#[test]
fn bad_commands_change_nothing() {
    let (mut world, sun, inner, _, ship) = two_planets();
    world.update(Duration::from_secs(3));
    let before = world.snapshot();

    assert_eq!(world.fly_to(ship, ship), Err(CommandError::TargetIsSelf(ship)));
    assert_eq!(
        world.fly_to(ship, inner),
        Err(CommandError::AlreadyDocked {
            ship,
            target: inner
        })
    );
    assert_eq!(
        world.fly_to(EntityID(77), sun),
        Err(CommandError::ShipNotFound(EntityID(77)))
    );
    assert_eq!(
        world.fly_to(ship, EntityID(77)),
        Err(CommandError::TargetNotFound(EntityID(77)))
    );
    assert_eq!(world.fly_to(inner, sun), Err(CommandError::NotAShip(inner)));

    let other = world.add_ship("Other", sun).unwrap();
    assert_eq!(world.fly_to(ship, other), Err(CommandError::TargetIsShip(other)));

    let mut after = world.snapshot();
    after.ships.retain(|s| s.id != other);
    assert_eq!(after, before);
}

#[test]
fn sol_keeps_pioneer_on_mercury() {
    let mut world = sol().unwrap();
    let mercury = world.find_by_name("mercury").unwrap();
    let pioneer = world.find_by_name("pioneer").unwrap();
    let start = position(&world, mercury);

    for _ in 0..100 {
        world.update(world.config().tick_period());
        assert_eq!(position(&world, pioneer), position(&world, mercury));
    }
    assert_ne!(position(&world, mercury), start);

    // Every planet is still at its orbit radius from the Sun
    for planet in world.entities(Category::Planet) {
        let orbit = planet.orbit().unwrap();
        assert_relative_eq!(
            planet.position().coords.norm(),
            orbit.periapsis(),
            max_relative = 1e-9
        );
    }
}

#[test]
fn forced_ticks_match_scheduled_ticks() {
    let (world, _, _, outer, ship) = two_planets();

    let mut scheduled = Simulation::with_clock(world.clone(), ManualClock::new());
    scheduled.handle().fly_to(ship, outer);
    assert_eq!(scheduled.run_for(Duration::from_secs(50)), 50);

    let mut forced = Simulation::with_clock(world, ManualClock::new());
    forced.handle().fly_to(ship, outer);
    for _ in 0..50 {
        forced.clock_mut().advance(Duration::from_secs(1));
        forced.tick();
    }

    assert_eq!(forced.world().snapshot(), scheduled.world().snapshot());
}

#[test]
fn commands_from_another_thread() {
    let (world, _, _, outer, ship) = two_planets();
    let mut sim = Simulation::with_clock(world, ManualClock::new());
    let handle = sim.handle();

    let reply = thread::spawn(move || handle.fly_to(ship, outer))
        .join()
        .unwrap();

    sim.clock_mut().advance(Duration::from_secs(1));
    sim.tick();
    assert_eq!(reply.wait(), Ok(Ok(())));

    let state = sim.handle().get_state();
    sim.process_commands();
    let snapshot = state.wait().unwrap();
    assert_eq!(snapshot.tick, 1);
    assert!(matches!(
        snapshot.ships[0].nav,
        Some(NavState::Flying { destination, .. }) if destination == outer
    ));
}
