// src/generator/cave.rs
//! Cave systems grown from noise.
//!
//! The pipeline seeds random open tiles, erodes them at random picks,
//! smooths off filaments, fills pinholes, keeps the regions whose size falls
//! inside the configured limits and finally weaves corridors from the
//! connected caves until every cave is reached. Weaving is a randomized
//! search bounded by `break_out` attempts; running out is reported as
//! [`GeneratorError::NotConnected`] and the caller may retry with another
//! seed.

use log::{debug, info, warn};
use rand::{Rng, RngCore};

use crate::connectivity::{FloodFillAnalyzer, MapSection};
use crate::generator::{CaveConfig, GeneratorError, MapGenerator};
use crate::map::{Grid, GridError, Tile};
use crate::utils::{Direction, Point};

const SMOOTHING_PASSES: usize = 5;
/// Tries at finding a usable edge point before the attempt is dropped.
const EDGE_SEARCH_LIMIT: usize = 64;

pub struct CaveGenerator {
    config: CaveConfig,
}

impl CaveGenerator {
    pub const NAME: &'static str = "cave";

    pub fn new(config: CaveConfig) -> Self {
        CaveGenerator { config }
    }

    pub fn config(&self) -> &CaveConfig {
        &self.config
    }

    /// Build the map and also return the caves that survived the size
    /// limits, as they were before any corridor was woven.
    pub fn generate(
        &self,
        rng: &mut dyn RngCore,
    ) -> Result<(Grid, Vec<MapSection>), GeneratorError> {
        self.config.validate()?;

        let mut grid = Grid::new(self.config.width, self.config.height)?;
        grid.clear(Tile::Block);

        let mut builder = CaveBuilder {
            config: &self.config,
            grid,
            rng,
            corridors: Vec::new(),
        };
        builder.seed()?;
        builder.erode()?;
        builder.smooth()?;
        builder.fill_holes()?;
        let caves = builder.extract_caves()?;
        builder.weave(&caves)?;

        info!(
            "{}: {} caves joined by {} corridor tiles in a {}x{} map",
            Self::NAME,
            caves.len(),
            builder.corridors.len(),
            self.config.width,
            self.config.height
        );
        Ok((builder.grid, caves))
    }
}

impl MapGenerator for CaveGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn create_map(&self, rng: &mut dyn RngCore) -> Result<Grid, GeneratorError> {
        self.generate(rng).map(|(grid, _)| grid)
    }
}

struct CaveBuilder<'c, 'r> {
    config: &'c CaveConfig,
    grid: Grid,
    rng: &'r mut dyn RngCore,
    /// Every corridor tile committed so far, in carving order.
    corridors: Vec<Point>,
}

impl CaveBuilder<'_, '_> {
    fn interior_points(&self) -> Vec<Point> {
        self.grid
            .tiles()
            .map(|(point, _)| point)
            .filter(|p| self.grid.is_interior(p.x, p.y))
            .collect()
    }

    fn seed(&mut self) -> Result<(), GridError> {
        for point in self.interior_points() {
            if self.rng.random_range(0..100) < self.config.close_tile_prob {
                self.grid.set_at(point, Tile::Empty)?;
            }
        }
        debug!("{}: seeded {} open tiles", CaveGenerator::NAME, self.grid.count(Tile::Empty));
        Ok(())
    }

    fn erode(&mut self) -> Result<(), GridError> {
        let (width, height) = (self.grid.width(), self.grid.height());
        for _ in 0..self.config.iterations {
            let x = self.rng.random_range(1..width - 1);
            let y = self.rng.random_range(1..height - 1);
            let open = self
                .grid
                .tiles_in_square(x, y, 1)
                .filter(|(_, tile)| tile.is_open())
                .count();
            let tile = if open > self.config.neighbours {
                Tile::Empty
            } else {
                Tile::Block
            };
            self.grid.set(x, y, tile)?;
        }
        debug!("{}: {} open tiles after erosion", CaveGenerator::NAME, self.grid.count(Tile::Empty));
        Ok(())
    }

    /// 4-neighbours of `point` inside the grid holding `kind`.
    fn neighbours_of_kind(&self, point: Point, kind: Tile) -> usize {
        Direction::ALL
            .iter()
            .filter(|direction| self.grid.get_at(point + **direction) == Ok(kind))
            .count()
    }

    fn smooth(&mut self) -> Result<(), GridError> {
        let interior = self.interior_points();
        for _ in 0..SMOOTHING_PASSES {
            for &point in &interior {
                if self.grid.get_at(point)?.is_open()
                    && self.neighbours_of_kind(point, Tile::Block) >= self.config.empty_neighbours
                {
                    self.grid.set_at(point, Tile::Block)?;
                }
            }
        }
        Ok(())
    }

    fn fill_holes(&mut self) -> Result<(), GridError> {
        for point in self.interior_points() {
            if self.grid.get_at(point)?.is_block()
                && self.neighbours_of_kind(point, Tile::Empty) >= self.config.empty_tile_neighbours
            {
                self.grid.set_at(point, Tile::Empty)?;
            }
        }
        debug!("{}: {} open tiles after smoothing", CaveGenerator::NAME, self.grid.count(Tile::Empty));
        Ok(())
    }

    /// Keep open regions with `lower_limit < size <= upper_limit`, wall in
    /// the rest.
    fn extract_caves(&mut self) -> Result<Vec<MapSection>, GridError> {
        let regions = FloodFillAnalyzer::new(&self.grid).sections_of(Tile::Empty);
        let found = regions.len();
        let mut caves = Vec::new();
        for region in regions {
            if region.len() <= self.config.lower_limit || region.len() > self.config.upper_limit {
                for &point in &region.tiles {
                    self.grid.set_at(point, Tile::Block)?;
                }
            } else {
                caves.push(region);
            }
        }
        debug!(
            "{}: kept {} of {} open regions",
            CaveGenerator::NAME,
            caves.len(),
            found
        );
        Ok(caves)
    }

    fn weave(&mut self, caves: &[MapSection]) -> Result<(), GeneratorError> {
        if caves.is_empty() {
            warn!("{}: no region fits the cave size limits", CaveGenerator::NAME);
            return Ok(());
        }

        let width = self.grid.width();
        let mut owner: Vec<Option<usize>> = vec![None; (width * self.grid.height()) as usize];
        for (i, cave) in caves.iter().enumerate() {
            for point in &cave.tiles {
                owner[(point.y * width + point.x) as usize] = Some(i);
            }
        }

        let mut connected = vec![false; caves.len()];
        let first = self.rng.random_range(0..caves.len());
        connected[first] = true;
        let mut connected_caves = vec![first];
        let mut remaining = caves.len() - 1;
        let mut attempts = 0;

        while remaining > 0 {
            if attempts >= self.config.break_out {
                return Err(GeneratorError::NotConnected {
                    attempts,
                    remaining,
                });
            }
            attempts += 1;

            let from_cave = self.corridors.is_empty()
                || self.rng.random_range(0..100) < self.config.cave_edge_chance;
            let edge = if from_cave {
                let source = connected_caves[self.rng.random_range(0..connected_caves.len())];
                self.cave_edge(&caves[source])
            } else {
                self.corridor_edge()
            };
            let Some((start, direction)) = edge else {
                continue;
            };
            let Some(mut corridor) = self.corridor_attempt(start, direction) else {
                continue;
            };
            let Some(&end) = corridor.last() else {
                continue;
            };

            let target = owner[(end.y * width + end.x) as usize];
            if let Some(target) = target.filter(|&t| !connected[t]) {
                // The end point already belongs to the cave.
                corridor.pop();
                for &point in &corridor {
                    self.grid.set_at(point, Tile::Empty)?;
                }
                self.corridors.extend(corridor);
                connected[target] = true;
                connected_caves.push(target);
                remaining -= 1;
            }
        }

        debug!(
            "{}: wove {} caves in {} attempts",
            CaveGenerator::NAME,
            caves.len(),
            attempts
        );
        Ok(())
    }

    /// Walk from a random cave tile in a random direction until the first
    /// wall. Wall tiles on the outer ring are not usable.
    fn cave_edge(&mut self, cave: &MapSection) -> Option<(Point, Direction)> {
        for _ in 0..EDGE_SEARCH_LIMIT {
            let mut point = cave.tiles[self.rng.random_range(0..cave.tiles.len())];
            let direction = Direction::ALL[self.rng.random_range(0..Direction::ALL.len())];
            loop {
                point = point + direction;
                match self.grid.get_at(point) {
                    Ok(Tile::Empty) => continue,
                    Ok(Tile::Block) if self.grid.is_interior(point.x, point.y) => {
                        return Some((point, direction));
                    }
                    _ => break,
                }
            }
        }
        None
    }

    /// A wall tile next to a random corridor tile, never the first one
    /// carved.
    fn corridor_edge(&mut self) -> Option<(Point, Direction)> {
        if self.corridors.is_empty() {
            return None;
        }
        for _ in 0..EDGE_SEARCH_LIMIT {
            let index = if self.corridors.len() > 1 {
                self.rng.random_range(1..self.corridors.len())
            } else {
                0
            };
            let location = self.corridors[index];
            let walls: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|&direction| {
                    let next = location + direction;
                    self.grid.is_interior(next.x, next.y)
                        && self.grid.get_at(next) == Ok(Tile::Block)
                })
                .collect();
            if !walls.is_empty() {
                let direction = walls[self.rng.random_range(0..walls.len())];
                return Some((location + direction, direction));
            }
        }
        None
    }

    /// Dig from `start` in straight runs until open space is hit. Returns
    /// the dug points, the open tile last, or `None` when the walk leaves
    /// the interior, runs alongside open space or uses up its turns.
    fn corridor_attempt(&mut self, start: Point, direction: Direction) -> Option<Vec<Point>> {
        let mut corridor = vec![start];
        let mut point = start;
        let mut direction = direction;
        let start_direction = direction;

        for run in 0..=self.config.corridor_max_turns {
            let length = self
                .rng
                .random_range(self.config.corridor_min..=self.config.corridor_max);
            for _ in 0..length {
                point = point + direction;
                if !self.grid.is_interior(point.x, point.y) {
                    return None;
                }
                if self.grid.get_at(point).ok()?.is_open() {
                    corridor.push(point);
                    return Some(corridor);
                }
                if !self.has_clearance(point, direction) {
                    return None;
                }
                corridor.push(point);
            }
            if run < self.config.corridor_max_turns {
                direction = self.turn(direction, start_direction);
            }
        }
        None
    }

    /// New heading that does not double back on the current heading or on
    /// the heading the corridor started with.
    fn turn(&mut self, current: Direction, start: Direction) -> Direction {
        let choices: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|d| d.reverse() != current && d.reverse() != start)
            .collect();
        choices[self.rng.random_range(0..choices.len())]
    }

    /// Tiles up to `corridor_space` to either side of `point`, across the
    /// direction of travel, must all be wall.
    fn has_clearance(&self, point: Point, direction: Direction) -> bool {
        let space = self.config.corridor_space;
        (-space..=space).all(|offset| {
            let side = if direction.is_vertical() {
                Point::new(point.x + offset, point.y)
            } else {
                Point::new(point.x, point.y + offset)
            };
            !matches!(self.grid.get_at(side), Ok(Tile::Empty))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::is_connected;
    use crate::utils::Rect;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn two_room_grid() -> Grid {
        let mut grid = Grid::new(30, 12).unwrap();
        grid.fill_rect(&Rect::new(2, 3, 6, 6), Tile::Empty).unwrap();
        grid.fill_rect(&Rect::new(20, 3, 6, 6), Tile::Empty).unwrap();
        grid
    }

    fn builder_for<'a>(
        config: &'a CaveConfig,
        grid: Grid,
        rng: &'a mut dyn RngCore,
    ) -> CaveBuilder<'a, 'a> {
        CaveBuilder {
            config,
            grid,
            rng,
            corridors: Vec::new(),
        }
    }

    #[test]
    fn test_weave_joins_two_rooms() {
        let config = CaveConfig {
            width: 30,
            height: 12,
            lower_limit: 4,
            break_out: 20_000,
            ..CaveConfig::default()
        };
        for seed in 0..5 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut builder = builder_for(&config, two_room_grid(), &mut rng);
            let caves = builder.extract_caves().unwrap();
            assert_eq!(caves.len(), 2);

            builder.weave(&caves).unwrap();
            assert!(!builder.corridors.is_empty());
            assert!(is_connected(&builder.grid), "seed {}:\n{}", seed, builder.grid);
            for point in &builder.corridors {
                assert!(builder.grid.is_interior(point.x, point.y));
            }
        }
    }

    #[test]
    fn test_weave_reports_exhausted_budget() {
        let config = CaveConfig {
            width: 30,
            height: 12,
            lower_limit: 4,
            break_out: 0,
            ..CaveConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut builder = builder_for(&config, two_room_grid(), &mut rng);
        let caves = builder.extract_caves().unwrap();

        let err = builder.weave(&caves).unwrap_err();
        assert_eq!(
            err,
            GeneratorError::NotConnected {
                attempts: 0,
                remaining: 1
            }
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn test_extract_caves_applies_size_limits() {
        let mut grid = Grid::new(30, 12).unwrap();
        grid.fill_rect(&Rect::new(2, 2, 2, 2), Tile::Empty).unwrap(); // 4 tiles
        grid.fill_rect(&Rect::new(6, 2, 5, 5), Tile::Empty).unwrap(); // 25 tiles
        grid.fill_rect(&Rect::new(13, 1, 15, 10), Tile::Empty).unwrap(); // 150 tiles

        let config = CaveConfig {
            width: 30,
            height: 12,
            lower_limit: 4,
            upper_limit: 100,
            ..CaveConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut builder = builder_for(&config, grid, &mut rng);
        let caves = builder.extract_caves().unwrap();

        assert_eq!(caves.len(), 1);
        assert_eq!(caves[0].len(), 25);
        assert_eq!(builder.grid.count(Tile::Empty), 25);
    }

    #[test]
    fn test_seed_keeps_border_solid() {
        let config = CaveConfig {
            close_tile_prob: 100,
            ..CaveConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut builder = builder_for(&config, Grid::new(8, 6).unwrap(), &mut rng);
        builder.seed().unwrap();

        for (point, tile) in builder.grid.tiles() {
            if builder.grid.is_border(point.x, point.y) {
                assert_eq!(tile, Tile::Block);
            } else {
                assert_eq!(tile, Tile::Empty);
            }
        }

        let config = CaveConfig {
            close_tile_prob: 0,
            ..CaveConfig::default()
        };
        let mut builder = builder_for(&config, Grid::new(8, 6).unwrap(), &mut rng);
        builder.seed().unwrap();
        assert_eq!(builder.grid.count(Tile::Empty), 0);
    }

    #[test]
    fn test_erode_threshold() {
        // On a 3x3 grid the only interior tile is (1, 1), so every pick
        // lands there and counts all nine tiles.
        let config = CaveConfig {
            neighbours: 4,
            iterations: 1,
            ..CaveConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        // Four open tiles, center included: not more than 4, so it closes.
        let mut grid = Grid::new(3, 3).unwrap();
        for (x, y) in [(1, 1), (0, 0), (1, 0), (2, 0)] {
            grid.set(x, y, Tile::Empty).unwrap();
        }
        let mut builder = builder_for(&config, grid, &mut rng);
        builder.erode().unwrap();
        assert_eq!(builder.grid.get(1, 1), Ok(Tile::Block));

        // Five open neighbours around a wall: more than 4, so it opens.
        let mut grid = Grid::new(3, 3).unwrap();
        for (x, y) in [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1)] {
            grid.set(x, y, Tile::Empty).unwrap();
        }
        let mut builder = builder_for(&config, grid, &mut rng);
        builder.erode().unwrap();
        assert_eq!(builder.grid.get(1, 1), Ok(Tile::Empty));
    }

    #[test]
    fn test_smooth_closes_filaments() {
        let mut grid = Grid::new(12, 9).unwrap();
        grid.fill_rect(&Rect::new(6, 2, 3, 3), Tile::Empty).unwrap();
        // A one-tile-wide corridor of open space with nothing around it.
        grid.fill_rect(&Rect::new(1, 7, 10, 1), Tile::Empty).unwrap();

        let config = CaveConfig {
            empty_neighbours: 3,
            ..CaveConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut builder = builder_for(&config, grid, &mut rng);
        builder.smooth().unwrap();

        // The filament erodes from its ends; the 3x3 room has at most two
        // wall neighbours per tile and stays.
        for x in 1..11 {
            assert_eq!(builder.grid.get(x, 7), Ok(Tile::Block));
        }
        assert_eq!(builder.grid.count(Tile::Empty), 9);
        assert_eq!(builder.grid.get(7, 3), Ok(Tile::Empty));
    }

    #[test]
    fn test_fill_holes_opens_pinholes() {
        let mut grid = Grid::new(7, 7).unwrap();
        grid.fill_rect(&Rect::new(1, 1, 5, 5), Tile::Empty).unwrap();
        grid.set(3, 3, Tile::Block).unwrap();
        // Against the border only three neighbours are open.
        grid.set(3, 1, Tile::Block).unwrap();

        let config = CaveConfig {
            empty_tile_neighbours: 4,
            ..CaveConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut builder = builder_for(&config, grid, &mut rng);
        builder.fill_holes().unwrap();

        assert_eq!(builder.grid.get(3, 3), Ok(Tile::Empty));
        assert_eq!(builder.grid.get(3, 1), Ok(Tile::Block));
        assert_eq!(builder.grid.get(0, 3), Ok(Tile::Block));
    }

    #[test]
    fn test_clearance_rejects_tiles_beside_open_space() {
        let mut grid = Grid::new(12, 12).unwrap();
        grid.set(6, 4, Tile::Empty).unwrap();
        let config = CaveConfig {
            width: 12,
            height: 12,
            corridor_space: 2,
            ..CaveConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let builder = builder_for(&config, grid, &mut rng);

        // Travelling north along x = 6, (6, 4) is on the line of travel.
        assert!(builder.has_clearance(Point::new(6, 6), Direction::North));
        // Travelling east along y = 6, (6, 4) is two tiles to the side.
        assert!(!builder.has_clearance(Point::new(6, 6), Direction::East));
        assert!(builder.has_clearance(Point::new(6, 7), Direction::East));
    }

    #[test]
    fn test_turn_never_doubles_back() {
        let config = CaveConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut builder = builder_for(&config, Grid::new(5, 5).unwrap(), &mut rng);
        for _ in 0..200 {
            let turned = builder.turn(Direction::East, Direction::North);
            assert_ne!(turned, Direction::West);
            assert_ne!(turned, Direction::South);
        }
    }

    #[test]
    fn test_generated_caves_respect_limits_and_connect() {
        let config = CaveConfig {
            width: 60,
            height: 40,
            iterations: 30_000,
            break_out: 20_000,
            ..CaveConfig::default()
        };
        let generator = CaveGenerator::new(config.clone());

        let mut successes = 0;
        for seed in 0..8 {
            match generator.generate(&mut ChaCha8Rng::seed_from_u64(seed)) {
                Ok((grid, caves)) => {
                    successes += 1;
                    assert_eq!((grid.width(), grid.height()), (60, 40));
                    for cave in &caves {
                        assert!(cave.len() > config.lower_limit);
                        assert!(cave.len() <= config.upper_limit);
                    }
                    for (point, tile) in grid.tiles() {
                        if grid.is_border(point.x, point.y) {
                            assert_eq!(tile, Tile::Block);
                        }
                    }
                    assert!(is_connected(&grid), "seed {}:\n{}", seed, grid);
                }
                Err(err) => assert!(err.is_retryable(), "seed {}: {}", seed, err),
            }
        }
        assert!(successes > 0);
    }

    #[test]
    fn test_same_seed_same_caves() {
        let generator = CaveGenerator::new(CaveConfig::default());
        let a = generator.create_map(&mut ChaCha8Rng::seed_from_u64(31));
        let b = generator.create_map(&mut ChaCha8Rng::seed_from_u64(31));
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_limits_are_rejected() {
        let generator = CaveGenerator::new(CaveConfig {
            lower_limit: 600,
            ..CaveConfig::default()
        });
        let err = generator
            .create_map(&mut ChaCha8Rng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(err, GeneratorError::InvalidConfig { .. }));
        assert!(!err.is_retryable());
    }
}
