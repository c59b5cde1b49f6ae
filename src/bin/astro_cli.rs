use std::path::PathBuf;

use clap::Parser;

use rust_orrery::astro::{Orbit, SUN_MU};
use rust_orrery::file::{read_file, sol};
use rust_orrery::model::Category;

/// Prints the orbital characteristics of a body.
#[derive(Debug, Parser)]
struct Args {
    name: String,

    #[arg(long)]
    scenario: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let world = match &args.scenario {
        Some(path) => read_file(path)?,
        None => sol()?,
    };

    for body in world.iter() {
        if !body.name.eq_ignore_ascii_case(&args.name) {
            continue;
        }

        let orbit = match body.orbit() {
            None => continue,
            Some(orbit) => orbit,
        };
        let anchor = world.get(orbit.anchor());
        let anchor_name = anchor.map_or("?", |a| a.name.as_str());
        let around_star = anchor.map_or(false, |a| a.category() == Category::Star);

        println!("Orbital characteristics for {}", body.name);
        println!("- Anchor: {}", anchor_name);
        if let Orbit::Elliptical(elliptical) = orbit {
            println!("- Semi-major axis: {} km", elliptical.semimajor_axis());
            println!("- Orbital eccentricity: {}", elliptical.eccentricity());
            println!(
                "- Argument of periapsis: {}",
                elliptical.arg_periapsis().to_degrees()
            );
        }
        println!("- Apoapsis: {} km", orbit.apoapsis());
        println!("- Periapsis: {} km", orbit.periapsis());
        println!("- Orbital period: {} days", orbit.period() / 86400.0);
        if around_star {
            println!("- Current orbital speed: {} km/s", orbit.speed(SUN_MU));
            println!("- Kepler ratio (T^2 / a^3, years and AU): {}", orbit.kepler_ratio());
        }
        println!();
    }

    Ok(())
}
