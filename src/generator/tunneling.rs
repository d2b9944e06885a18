// src/generator/tunneling.rs

use log::{debug, info};
use rand::{Rng, RngCore};

use crate::generator::{carve_l_tunnel, GeneratorError, MapGenerator, TunnelingWithRoomsConfig};
use crate::map::{Grid, Tile};
use crate::utils::Rect;

/// Rooms placed by rejection sampling, then joined in placement order by
/// L-shaped tunnels.
pub struct TunnelingWithRoomsGenerator {
    config: TunnelingWithRoomsConfig,
}

impl TunnelingWithRoomsGenerator {
    pub const NAME: &'static str = "tunneling_with_rooms";

    pub fn new(config: TunnelingWithRoomsConfig) -> Self {
        TunnelingWithRoomsGenerator { config }
    }

    /// Build the map and also return the accepted room rectangles, in
    /// acceptance order. A room's outer ring stays solid; only its interior
    /// is carved.
    pub fn generate(&self, rng: &mut dyn RngCore) -> Result<(Grid, Vec<Rect>), GeneratorError> {
        self.config.validate()?;
        let config = &self.config;

        let mut grid = Grid::new(config.width, config.height)?;
        grid.clear(Tile::Block);

        let mut rooms: Vec<Rect> = Vec::new();
        for _ in 0..config.max_rooms {
            let width = rng.random_range(config.room_min_size..=config.room_max_size);
            let height = rng.random_range(config.room_min_size..=config.room_max_size);
            let x = rng.random_range(0..=config.width - width);
            let y = rng.random_range(0..=config.height - height);
            let candidate = Rect::new(x, y, width, height);

            if rooms.iter().all(|room| !room.intersects(&candidate)) {
                rooms.push(candidate);
            }
        }
        debug!(
            "{}: accepted {} of {} room attempts",
            Self::NAME,
            rooms.len(),
            config.max_rooms
        );

        for room in &rooms {
            let interior = Rect::new(room.x + 1, room.y + 1, room.width - 2, room.height - 2);
            grid.fill_rect(&interior, Tile::Empty)?;
        }
        for pair in rooms.windows(2) {
            carve_l_tunnel(&mut grid, pair[0].center(), pair[1].center(), rng)?;
        }

        info!(
            "{}: carved {} rooms in a {}x{} map",
            Self::NAME,
            rooms.len(),
            config.width,
            config.height
        );
        Ok((grid, rooms))
    }
}

impl MapGenerator for TunnelingWithRoomsGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn create_map(&self, rng: &mut dyn RngCore) -> Result<Grid, GeneratorError> {
        self.generate(rng).map(|(grid, _)| grid)
    }
}
