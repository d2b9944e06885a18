#![warn(non_snake_case)]
//! # dungeon_carver
//!
//! Command line host for the map generators. Picks a generator from the
//! command line or a JSON config file, seeds a reproducible random stream
//! and prints the finished grid as text (`#` for wall, `.` for floor).
//!
//! ```text
//! RUST_LOG=info dungeon_carver --algorithm cave --width 60 --height 40 --seed 7
//! ```

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::{info, warn};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use dungeon_carver::generator::{
    BorderOnlyConfig, BspConfig, CaveConfig, CellularAutomataConfig, CityConfig,
    TunnelingWithRoomsConfig,
};
use dungeon_carver::MapConfig;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Algorithm {
    Bsp,
    City,
    Cave,
    CellularAutomata,
    TunnelingWithRooms,
    BorderOnly,
}

impl Algorithm {
    fn default_config(self) -> MapConfig {
        match self {
            Algorithm::Bsp => MapConfig::Bsp(BspConfig::default()),
            Algorithm::City => MapConfig::City(CityConfig::default()),
            Algorithm::Cave => MapConfig::Cave(CaveConfig::default()),
            Algorithm::CellularAutomata => {
                MapConfig::CellularAutomata(CellularAutomataConfig::default())
            }
            Algorithm::TunnelingWithRooms => {
                MapConfig::TunnelingWithRooms(TunnelingWithRoomsConfig::default())
            }
            Algorithm::BorderOnly => MapConfig::BorderOnly(BorderOnlyConfig::default()),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "dungeon_carver", version, about = "Generate a dungeon map and print it")]
struct Args {
    /// Generator to run when no config file is given.
    #[arg(short, long, value_enum, default_value = "bsp")]
    algorithm: Algorithm,

    /// JSON generator config; overrides --algorithm.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<i32>,

    #[arg(long)]
    height: Option<i32>,

    /// Seed for the random stream. Drawn from the OS when omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Extra attempts, each with the next seed, when generation fails in a
    /// way a new seed can fix.
    #[arg(short, long, default_value_t = 3)]
    retries: u32,
}

fn load_config(args: &Args) -> Result<MapConfig, Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            MapConfig::from_json(&text)?
        }
        None => args.algorithm.default_config(),
    };
    let (width, height) = config.dimensions();
    Ok(config.with_dimensions(args.width.unwrap_or(width), args.height.unwrap_or(height)))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let config = load_config(&args)?;
    let generator = config.into_generator();
    let first_seed = args.seed.unwrap_or_else(|| rand::rng().next_u64());

    let mut attempt = 0;
    let grid = loop {
        let seed = first_seed.wrapping_add(u64::from(attempt));
        info!("{}: generating with seed {}", generator.name(), seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        match generator.create_map(&mut rng) {
            Ok(grid) => break grid,
            Err(err) if err.is_retryable() && attempt < args.retries => {
                warn!("{}: seed {} failed: {}", generator.name(), seed, err);
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    };

    print!("{}", grid);
    Ok(())
}
