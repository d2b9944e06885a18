// src/connectivity/flood_fill.rs

use crate::map::{Grid, Tile};
use crate::utils::{Direction, Point, Rect};

/// A maximal 4-connected region of same-kind tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapSection {
    pub tile: Tile,
    pub tiles: Vec<Point>,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl MapSection {
    fn new(tile: Tile) -> Self {
        MapSection {
            tile,
            tiles: Vec::new(),
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
        }
    }

    fn add(&mut self, point: Point) {
        self.tiles.push(point);
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Bounding rectangle of every tile observed in the section.
    pub fn bounds(&self) -> Rect {
        if self.tiles.is_empty() {
            return Rect::new(0, 0, 0, 0);
        }
        Rect::new(
            self.min_x,
            self.min_y,
            self.max_x - self.min_x + 1,
            self.max_y - self.min_y + 1,
        )
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// The member tile closest to the bounding-box center. The center
    /// itself may fall outside a concave section; the anchor never does.
    pub fn anchor(&self) -> Option<Point> {
        let center = self.center();
        self.tiles
            .iter()
            .copied()
            .min_by_key(|p| p.manhattan_distance(&center))
    }
}

/// Splits a grid into its 4-connected same-kind regions.
pub struct FloodFillAnalyzer<'a> {
    grid: &'a Grid,
    visited: Vec<bool>,
}

impl<'a> FloodFillAnalyzer<'a> {
    pub fn new(grid: &'a Grid) -> Self {
        FloodFillAnalyzer {
            grid,
            visited: vec![false; (grid.width() * grid.height()) as usize],
        }
    }

    /// Every section of either kind, ordered by the row-major position
    /// of its first tile.
    pub fn sections(mut self) -> Vec<MapSection> {
        let mut sections = Vec::new();
        for (point, tile) in self.grid.tiles() {
            if let Some(section) = self.visit(point, tile) {
                sections.push(section);
            }
        }
        sections
    }

    /// Only the sections made of `kind` tiles.
    pub fn sections_of(self, kind: Tile) -> Vec<MapSection> {
        self.sections()
            .into_iter()
            .filter(|section| section.tile == kind)
            .collect()
    }

    fn slot(&self, point: Point) -> usize {
        (point.y * self.grid.width() + point.x) as usize
    }

    fn visit(&mut self, start: Point, kind: Tile) -> Option<MapSection> {
        if self.visited[self.slot(start)] {
            return None;
        }

        let mut section = MapSection::new(kind);
        let mut stack = vec![start];
        let start_slot = self.slot(start);
        self.visited[start_slot] = true;

        while let Some(point) = stack.pop() {
            section.add(point);
            for direction in Direction::ALL {
                let neighbor = point + direction;
                // Out-of-range neighbors simply end the region.
                let Ok(tile) = self.grid.get_at(neighbor) else {
                    continue;
                };
                let slot = self.slot(neighbor);
                if tile == kind && !self.visited[slot] {
                    self.visited[slot] = true;
                    stack.push(neighbor);
                }
            }
        }

        Some(section)
    }
}

/// True when the grid holds at most one 4-connected region of `Empty`
/// tiles.
pub fn is_connected(grid: &Grid) -> bool {
    FloodFillAnalyzer::new(grid).sections_of(Tile::Empty).len() <= 1
}
