// src/bsp/bsp_procedural.rs

use log::{debug, info, warn};
use rand::RngCore;

use crate::bsp::LeafTree;
use crate::generator::{carve_l_tunnel, BspConfig, GeneratorError, MapGenerator};
use crate::map::{Grid, Tile};
use crate::utils::Rect;

/// Carves one room per partition leaf into solid rock and joins sibling
/// subtrees with L-shaped corridors, deepest pairs first. The outer ring
/// always stays solid.
pub struct BspRoomGenerator {
    config: BspConfig,
}

#[derive(Default, Debug)]
pub struct GenerationStats {
    pub terminal_leaves: usize,
    pub room_count: usize,
    pub corridor_count: usize,
}

impl BspRoomGenerator {
    pub const NAME: &'static str = "bsp";

    pub fn new(config: BspConfig) -> Self {
        BspRoomGenerator { config }
    }

    pub fn config(&self) -> &BspConfig {
        &self.config
    }

    /// Build the map and also return the partition it was carved from.
    pub fn generate(&self, rng: &mut dyn RngCore) -> Result<(Grid, LeafTree), GeneratorError> {
        self.config.validate()?;
        let config = &self.config;

        let mut grid = Grid::new(config.width, config.height)?;
        grid.clear(Tile::Block);

        let mut tree = LeafTree::new(Rect::new(0, 0, config.width, config.height));
        let splits = tree.split_until_fit(config.leaf_max_size, config.leaf_min_size, rng);
        tree.place_rooms(config.room_min_size, config.room_max_size, 1, rng);

        let mut stats = GenerationStats {
            terminal_leaves: splits + 1,
            ..GenerationStats::default()
        };
        for room in tree.rooms() {
            grid.fill_rect(&room, Tile::Empty)?;
            stats.room_count += 1;
        }

        for (a, b) in tree.sibling_pairs() {
            let first = tree.random_room(a, rng);
            let second = tree.random_room(b, rng);
            if let (Some(first), Some(second)) = (first, second) {
                carve_l_tunnel(&mut grid, first.center(), second.center(), rng)?;
                stats.corridor_count += 1;
            }
        }

        if stats.room_count == 0 {
            warn!("{}: no leaf was large enough for a room", Self::NAME);
        }
        debug!("{}: {:?}", Self::NAME, stats);
        info!(
            "{}: carved {} rooms in a {}x{} map",
            Self::NAME,
            stats.room_count,
            config.width,
            config.height
        );
        Ok((grid, tree))
    }
}

impl MapGenerator for BspRoomGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn create_map(&self, rng: &mut dyn RngCore) -> Result<Grid, GeneratorError> {
        self.generate(rng).map(|(grid, _)| grid)
    }
}
