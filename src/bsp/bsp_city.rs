// src/bsp/bsp_city.rs

use log::{debug, info};
use rand::{Rng, RngCore};

use crate::bsp::LeafTree;
use crate::generator::{CityConfig, GeneratorError, MapGenerator};
use crate::map::{Grid, Tile};
use crate::utils::{Direction, Point, Rect};

/// City blocks: starts from open ground, walls in one building per
/// partition leaf and gives each building a single door.
pub struct CityGenerator {
    config: CityConfig,
}

impl CityGenerator {
    pub const NAME: &'static str = "city";

    pub fn new(config: CityConfig) -> Self {
        CityGenerator { config }
    }

    pub fn config(&self) -> &CityConfig {
        &self.config
    }

    /// Build the map and also return the buildings that were placed.
    pub fn generate(&self, rng: &mut dyn RngCore) -> Result<(Grid, Vec<Rect>), GeneratorError> {
        self.config.validate()?;
        let config = &self.config;

        let mut grid = Grid::new(config.width, config.height)?;
        grid.clear(Tile::Empty);

        // Keep a street along the map edge.
        let mut tree = LeafTree::new(Rect::new(1, 1, config.width - 2, config.height - 2));
        let splits = tree.split_until_fit(config.leaf_max_size, config.leaf_min_size, rng);
        tree.place_rooms(config.room_min_size, config.room_max_size, 0, rng);
        debug!("{}: {} splits", Self::NAME, splits);

        let buildings = tree.rooms();
        for building in &buildings {
            grid.fill_rect(building, Tile::Block)?;
            let interior = Rect::new(
                building.x + 1,
                building.y + 1,
                building.width - 2,
                building.height - 2,
            );
            grid.fill_rect(&interior, Tile::Empty)?;
        }
        for building in &buildings {
            let side = Direction::ALL[rng.random_range(0..Direction::ALL.len())];
            grid.set_at(door_position(building, side), Tile::Empty)?;
        }

        info!(
            "{}: walled {} buildings in a {}x{} map",
            Self::NAME,
            buildings.len(),
            config.width,
            config.height
        );
        Ok((grid, buildings))
    }
}

/// Midpoint of the wall on `side`. North is the high-y wall.
pub fn door_position(building: &Rect, side: Direction) -> Point {
    let center = building.center();
    match side {
        Direction::North => Point::new(center.x, building.bottom() - 1),
        Direction::South => Point::new(center.x, building.y),
        Direction::East => Point::new(building.right() - 1, center.y),
        Direction::West => Point::new(building.x, center.y),
    }
}

impl MapGenerator for CityGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn create_map(&self, rng: &mut dyn RngCore) -> Result<Grid, GeneratorError> {
        self.generate(rng).map(|(grid, _)| grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    /// Open perimeter tiles of a building, i.e. its doors.
    fn doors(grid: &Grid, building: &Rect) -> Vec<Point> {
        building
            .points()
            .filter(|p| {
                let on_wall = p.x == building.x
                    || p.y == building.y
                    || p.x == building.right() - 1
                    || p.y == building.bottom() - 1;
                on_wall && grid.get_at(*p) == Ok(Tile::Empty)
            })
            .collect()
    }

    #[test]
    fn test_door_positions_are_wall_midpoints() {
        let building = Rect::new(2, 4, 7, 5);
        assert_eq!(door_position(&building, Direction::North), Point::new(5, 8));
        assert_eq!(door_position(&building, Direction::South), Point::new(5, 4));
        assert_eq!(door_position(&building, Direction::East), Point::new(8, 6));
        assert_eq!(door_position(&building, Direction::West), Point::new(2, 6));
    }

    #[test]
    fn test_each_building_has_one_door() {
        for seed in 0..10 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let config = CityConfig {
                width: 60,
                height: 45,
                ..CityConfig::default()
            };
            let (grid, buildings) = CityGenerator::new(config).generate(&mut rng).unwrap();

            assert_eq!((grid.width(), grid.height()), (60, 45));
            assert!(!buildings.is_empty());
            for building in &buildings {
                assert_eq!(doors(&grid, building).len(), 1, "seed {}: {:?}", seed, building);
            }
        }
    }

    #[test]
    fn test_buildings_are_hollow_and_apart() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let (grid, buildings) = CityGenerator::new(CityConfig {
            width: 50,
            height: 50,
            ..CityConfig::default()
        })
        .generate(&mut rng)
        .unwrap();

        for (i, building) in buildings.iter().enumerate() {
            assert!(building.width >= 8 && building.height >= 8);
            let center = building.center();
            assert_eq!(grid.get_at(center), Ok(Tile::Empty));
            for other in &buildings[i + 1..] {
                assert!(!building.intersects(other));
            }
        }
        // The street along the edge is never built on.
        for x in 0..50 {
            assert_eq!(grid.get(x, 0), Ok(Tile::Empty));
            assert_eq!(grid.get(x, 49), Ok(Tile::Empty));
        }
    }

    #[test]
    fn test_same_seed_same_city() {
        let generator = CityGenerator::new(CityConfig::default());
        let a = generator.create_map(&mut ChaCha8Rng::seed_from_u64(13)).unwrap();
        let b = generator.create_map(&mut ChaCha8Rng::seed_from_u64(13)).unwrap();
        assert_eq!(a, b);
    }
}
