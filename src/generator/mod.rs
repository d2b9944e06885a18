// src/generator/mod.rs
//! The generator contract and the grid-based generators that are not built
//! on the binary space partition.

pub mod border;
pub mod cave;
pub mod cellular;
pub mod config;
pub mod error;
pub mod tunneling;

pub use border::BorderOnlyGenerator;
pub use cave::CaveGenerator;
pub use cellular::{connect_sections, CellularAutomataGenerator, SectionRepair};
pub use config::{
    BorderOnlyConfig, BspConfig, CaveConfig, CellularAutomataConfig, CityConfig, MapConfig,
    TunnelingWithRoomsConfig,
};
pub use error::GeneratorError;
pub use tunneling::TunnelingWithRoomsGenerator;

use rand::{Rng, RngCore};

use crate::map::{Grid, GridError};
use crate::utils::Point;

/// One map-building algorithm.
///
/// A call to [`create_map`](MapGenerator::create_map) validates the
/// configuration, builds a fresh grid and hands it over. The random stream
/// is only borrowed, so the same seeded stream can drive several calls.
pub trait MapGenerator {
    /// Short, stable identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    fn create_map(&self, rng: &mut dyn RngCore) -> Result<Grid, GeneratorError>;
}

/// Open an L-shaped tunnel between two points. A fair coin decides whether
/// the horizontal leg runs first.
pub(crate) fn carve_l_tunnel(
    grid: &mut Grid,
    from: Point,
    to: Point,
    rng: &mut dyn RngCore,
) -> Result<(), GridError> {
    if rng.random_bool(0.5) {
        grid.carve_horizontal(from.x, to.x, from.y)?;
        grid.carve_vertical(from.y, to.y, to.x)
    } else {
        grid.carve_vertical(from.y, to.y, from.x)?;
        grid.carve_horizontal(from.x, to.x, to.y)
    }
}
