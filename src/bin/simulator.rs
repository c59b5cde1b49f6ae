use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rust_orrery::file::{read_file, sol};
use rust_orrery::model::{Clock, ManualClock, Simulation, SystemClock, WorldState};

/// Runs a scenario headless and prints the final state as JSON.
#[derive(Debug, Parser)]
struct Args {
    /// Scenario file; defaults to the bundled Solar System
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Wall-clock seconds to run for
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    /// Run this many ticks instead of a fixed duration
    #[arg(long, conflicts_with = "seconds")]
    ticks: Option<u32>,

    /// Don't actually sleep between ticks
    #[arg(long)]
    fast: bool,

    #[arg(long)]
    game_speed: Option<f64>,

    #[arg(long)]
    tick_ms: Option<u64>,

    /// Send SHIP to TARGET (both by name) once the simulation starts
    #[arg(long, num_args = 2, value_names = ["SHIP", "TARGET"])]
    fly: Option<Vec<String>>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let world = match &args.scenario {
        Some(path) => read_file(path)?,
        None => sol()?,
    };
    let world = apply_overrides(world, &args)?;

    if args.fast {
        run(Simulation::with_clock(world, ManualClock::new()), &args)
    } else {
        run(Simulation::new(world), &args)
    }
}

/// Command line overrides go through the same validation as the file.
fn apply_overrides(world: WorldState, args: &Args) -> Result<WorldState, Box<dyn Error>> {
    if args.game_speed.is_none() && args.tick_ms.is_none() {
        return Ok(world);
    }

    let mut config = *world.config();
    if let Some(game_speed) = args.game_speed {
        config.game_speed = game_speed;
    }
    if let Some(tick_ms) = args.tick_ms {
        config.tick_period_ms = tick_ms;
    }
    Ok(world.with_config(config)?)
}

fn run<C: Clock>(mut sim: Simulation<C>, args: &Args) -> Result<(), Box<dyn Error>> {
    let handle = sim.handle();

    let fly_reply = match args.fly.as_deref() {
        Some([ship_name, target_name]) => {
            let lookup = |name: &str| {
                sim.world()
                    .find_by_name(name)
                    .ok_or_else(|| format!("no body or ship named {:?}", name))
            };
            let ship = lookup(ship_name.as_str())?;
            let target = lookup(target_name.as_str())?;
            Some(handle.fly_to(ship, target))
        }
        _ => None,
    };

    let duration = match args.ticks {
        Some(ticks) => sim.world().config().tick_period() * ticks,
        None => Duration::try_from_secs_f64(args.seconds)?,
    };

    sim.start();
    let ticks = sim.run_for(duration);
    info!(
        ticks,
        simulated_days = sim.world().simulated_seconds() / 86400.0,
        "finished"
    );

    if let Some(reply) = fly_reply {
        match reply.try_take()? {
            Some(Ok(())) => info!("fly command accepted"),
            Some(Err(err)) => warn!(%err, "fly command refused"),
            None => warn!("fly command was never processed"),
        }
    }

    println!("{}", sim.world().snapshot().to_json()?);
    Ok(())
}
