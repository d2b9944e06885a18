// src/generator/cellular.rs

use log::{debug, info};
use rand::{Rng, RngCore};

use crate::connectivity::{FloodFillAnalyzer, MapSection, SectionUnion};
use crate::generator::{CellularAutomataConfig, GeneratorError, MapGenerator};
use crate::map::{Grid, GridError, Tile};
use crate::utils::{line_points, Point};

/// Wall neighbours (radius 1) at or above which a tile becomes wall.
const CROWDED_WALLS: usize = 5;
/// Wall neighbours (radius 2) at or below which a tile becomes wall while
/// the big-area rule is active.
const SPARSE_WALLS: usize = 2;

/// Cave-like maps from a neighbour-count automaton. Pockets the automaton
/// leaves apart are joined afterwards with straight tunnels, so every open
/// tile is reachable from every other.
pub struct CellularAutomataGenerator {
    config: CellularAutomataConfig,
}

impl CellularAutomataGenerator {
    pub const NAME: &'static str = "cellular_automata";

    pub fn new(config: CellularAutomataConfig) -> Self {
        CellularAutomataGenerator { config }
    }

    fn randomly_fill(&self, grid: &mut Grid, rng: &mut dyn RngCore) -> Result<(), GridError> {
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let tile = if grid.is_border(x, y) {
                    Tile::Block
                } else if rng.random_range(0..100) < self.config.fill_probability {
                    Tile::Empty
                } else {
                    Tile::Block
                };
                grid.set(x, y, tile)?;
            }
        }
        Ok(())
    }

    /// One automaton step. Reads only from `grid` and returns the next
    /// generation.
    fn step(grid: &Grid, big_area: bool) -> Result<Grid, GridError> {
        let mut next = grid.clone();
        for (point, _) in grid.tiles() {
            if grid.is_border(point.x, point.y) {
                continue;
            }
            let crowded = count_walls_near(grid, point, 1) >= CROWDED_WALLS;
            let sparse = big_area && count_walls_near(grid, point, 2) <= SPARSE_WALLS;
            let tile = if crowded || sparse {
                Tile::Block
            } else {
                Tile::Empty
            };
            next.set_at(point, tile)?;
        }
        Ok(next)
    }
}

/// Wall tiles within `radius` of `point`, excluding the point itself.
fn count_walls_near(grid: &Grid, point: Point, radius: i32) -> usize {
    grid.tiles_in_square(point.x, point.y, radius)
        .filter(|(p, tile)| *p != point && tile.is_block())
        .count()
}

/// Carve a 4-connected line between two points: every diagonal Bresenham
/// step also opens the elbow tile.
fn carve_line(grid: &mut Grid, from: Point, to: Point) -> Result<(), GridError> {
    let mut previous: Option<Point> = None;
    for point in line_points(from, to) {
        grid.set_at(point, Tile::Empty)?;
        if let Some(prev) = previous {
            if prev.x != point.x && prev.y != point.y {
                grid.set(point.x, prev.y, Tile::Empty)?;
            }
        }
        previous = Some(point);
    }
    Ok(())
}

fn nearest_unconnected(
    sections: &[MapSection],
    index: usize,
    union: &mut SectionUnion,
) -> Option<usize> {
    let center = sections[index].center();
    let mut nearest = None;
    let mut best = i32::MAX;
    for (i, section) in sections.iter().enumerate() {
        if i == index || union.connected(i, index) {
            continue;
        }
        let distance = center.manhattan_distance(&section.center());
        if distance < best {
            best = distance;
            nearest = Some(i);
        }
    }
    nearest
}

/// What [`connect_sections`] found and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionRepair {
    /// Open sections before any tunnel was carved.
    pub sections: usize,
    pub tunnels: usize,
    /// Components left in the union-find: 1, or 0 with no open tiles.
    pub components: usize,
}

/// Join every open section into one component.
pub fn connect_sections(grid: &mut Grid) -> Result<SectionRepair, GridError> {
    let sections = FloodFillAnalyzer::new(grid).sections_of(Tile::Empty);
    let mut union = SectionUnion::new(sections.len());
    let mut tunnels = 0;

    while union.components() > 1 {
        for i in 0..sections.len() {
            let Some(j) = nearest_unconnected(&sections, i, &mut union) else {
                continue;
            };
            // Sections are never empty, so both anchors exist.
            if let (Some(from), Some(to)) = (sections[i].anchor(), sections[j].anchor()) {
                carve_line(grid, from, to)?;
                tunnels += 1;
            }
            union.union(i, j);
        }
    }
    debug!(
        "{}: joined {} open sections with {} tunnels",
        CellularAutomataGenerator::NAME,
        sections.len(),
        tunnels
    );
    Ok(SectionRepair {
        sections: sections.len(),
        tunnels,
        components: union.components(),
    })
}

impl MapGenerator for CellularAutomataGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn create_map(&self, rng: &mut dyn RngCore) -> Result<Grid, GeneratorError> {
        self.config.validate()?;
        let config = &self.config;

        let mut grid = Grid::new(config.width, config.height)?;
        grid.clear(Tile::Block);
        self.randomly_fill(&mut grid, rng)?;

        for i in 0..config.total_iterations {
            grid = Self::step(&grid, i < config.cutoff_of_big_area_fill)?;
        }

        connect_sections(&mut grid)?;
        info!(
            "{}: {} open tiles in a {}x{} map",
            Self::NAME,
            grid.count(Tile::Empty),
            config.width,
            config.height
        );
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::is_connected;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn scenario_config() -> CellularAutomataConfig {
        CellularAutomataConfig {
            width: 25,
            height: 25,
            fill_probability: 50,
            total_iterations: 3,
            cutoff_of_big_area_fill: 3,
        }
    }

    #[test]
    fn test_scenario_single_region_and_deterministic() {
        let generator = CellularAutomataGenerator::new(scenario_config());
        let a = generator.create_map(&mut ChaCha8Rng::seed_from_u64(2024)).unwrap();
        let b = generator.create_map(&mut ChaCha8Rng::seed_from_u64(2024)).unwrap();

        assert_eq!((a.width(), a.height()), (25, 25));
        assert!(is_connected(&a), "\n{}", a);
        assert_eq!(a, b);
        assert_eq!(a.count(Tile::Empty), b.count(Tile::Empty));
    }

    #[test]
    fn test_connected_with_solid_border_across_seeds() {
        for seed in 0..25 {
            let config = CellularAutomataConfig {
                width: 48,
                height: 32,
                fill_probability: 45,
                total_iterations: 5,
                cutoff_of_big_area_fill: 2,
            };
            let grid = CellularAutomataGenerator::new(config)
                .create_map(&mut ChaCha8Rng::seed_from_u64(seed))
                .unwrap();

            assert!(is_connected(&grid), "seed {}:\n{}", seed, grid);
            for (point, tile) in grid.tiles() {
                if grid.is_border(point.x, point.y) {
                    assert_eq!(tile, Tile::Block);
                }
            }
        }
    }

    #[test]
    fn test_count_walls_excludes_center() {
        let mut grid = Grid::new(5, 5).unwrap();
        grid.clear(Tile::Block);
        let center = Point::new(2, 2);
        assert_eq!(count_walls_near(&grid, center, 1), 8);
        assert_eq!(count_walls_near(&grid, center, 2), 24);
        // Clipped at the corner.
        assert_eq!(count_walls_near(&grid, Point::new(0, 0), 1), 3);
    }

    #[test]
    fn test_step_reads_from_snapshot() {
        // A lone open tile in solid rock closes; a solid grid stays solid.
        let mut grid = Grid::new(7, 7).unwrap();
        grid.set(3, 3, Tile::Empty).unwrap();
        let next = CellularAutomataGenerator::step(&grid, false).unwrap();
        assert_eq!(next.count(Tile::Empty), 0);
        assert_eq!(grid.count(Tile::Empty), 1);
    }

    #[test]
    fn test_big_area_rule_fills_open_space() {
        let mut grid = Grid::new(9, 9).unwrap();
        grid.clear(Tile::Empty);
        grid.fill_border(Tile::Block);

        let plain = CellularAutomataGenerator::step(&grid, false).unwrap();
        let big = CellularAutomataGenerator::step(&grid, true).unwrap();
        // The middle of a wide open room has no walls within two tiles.
        assert_eq!(plain.get(4, 4), Ok(Tile::Empty));
        assert_eq!(big.get(4, 4), Ok(Tile::Block));
    }

    #[test]
    fn test_connect_sections_joins_pockets() {
        let mut grid = Grid::new(20, 12).unwrap();
        for (x, y) in [(2, 2), (3, 2), (15, 9), (16, 9), (9, 5), (2, 9)] {
            grid.set(x, y, Tile::Empty).unwrap();
        }
        assert!(!is_connected(&grid));

        let repair = connect_sections(&mut grid).unwrap();
        assert_eq!(repair.sections, 4);
        assert_eq!(repair.tunnels, 3);
        assert_eq!(repair.components, 1);
        assert!(is_connected(&grid), "\n{}", grid);
    }

    #[test]
    fn test_connect_sections_without_open_tiles() {
        let mut grid = Grid::new(6, 6).unwrap();
        let repair = connect_sections(&mut grid).unwrap();
        assert_eq!(
            repair,
            SectionRepair {
                sections: 0,
                tunnels: 0,
                components: 0
            }
        );
        assert_eq!(grid.count(Tile::Empty), 0);
    }

    #[test]
    fn test_carve_line_is_four_connected() {
        let mut grid = Grid::new(12, 12).unwrap();
        carve_line(&mut grid, Point::new(1, 1), Point::new(10, 7)).unwrap();
        assert!(is_connected(&grid));
        assert_eq!(grid.get(1, 1), Ok(Tile::Empty));
        assert_eq!(grid.get(10, 7), Ok(Tile::Empty));
    }
}
