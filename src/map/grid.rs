// src/map/grid.rs

use std::fmt;

use thiserror::Error;

use crate::map::Tile;
use crate::utils::{line_points, Point, Rect};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    #[error("tile ({x}, {y}) is outside the {width}x{height} grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("grid dimensions must be positive and fit in memory, got {width}x{height}")]
    InvalidSize { width: i32, height: i32 },
}

/// A rectangular, row-major array of tiles.
///
/// Every in-range coordinate holds exactly one tile. Single-tile access
/// outside the grid is rejected with [`GridError::OutOfBounds`]; the
/// neighborhood and line queries clip to the grid instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create a `width x height` grid filled with `Tile::Block`.
    pub fn new(width: i32, height: i32) -> Result<Self, GridError> {
        let mut grid = Grid {
            width: 0,
            height: 0,
            tiles: Vec::new(),
        };
        grid.initialize(width, height)?;
        Ok(grid)
    }

    /// Resize to `width x height`, discarding the previous contents.
    pub fn initialize(&mut self, width: i32, height: i32) -> Result<(), GridError> {
        // The tile count must also fit in i32 so that row-major offsets
        // computed from coordinates cannot overflow.
        let len = match width.checked_mul(height) {
            Some(len) if width > 0 && height > 0 => len,
            _ => return Err(GridError::InvalidSize { width, height }),
        };
        self.width = width;
        self.height = height;
        self.tiles = vec![Tile::default(); len as usize];
        Ok(())
    }

    /// Overwrite every tile with `tile`.
    pub fn clear(&mut self, tile: Tile) {
        self.tiles.fill(tile);
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// True for coordinates on the outermost ring of the grid.
    pub fn is_border(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && (x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1)
    }

    /// In range and not on the border ring.
    pub fn is_interior(&self, x: i32, y: i32) -> bool {
        x > 0 && y > 0 && x < self.width - 1 && y < self.height - 1
    }

    fn index(&self, x: i32, y: i32) -> Result<usize, GridError> {
        if self.in_bounds(x, y) {
            Ok((y * self.width + x) as usize)
        } else {
            Err(GridError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Result<Tile, GridError> {
        let index = self.index(x, y)?;
        Ok(self.tiles[index])
    }

    pub fn set(&mut self, x: i32, y: i32, tile: Tile) -> Result<(), GridError> {
        let index = self.index(x, y)?;
        self.tiles[index] = tile;
        Ok(())
    }

    pub fn get_at(&self, point: Point) -> Result<Tile, GridError> {
        self.get(point.x, point.y)
    }

    pub fn set_at(&mut self, point: Point, tile: Tile) -> Result<(), GridError> {
        self.set(point.x, point.y, tile)
    }

    /// All `(position, tile)` pairs in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (Point, Tile)> + '_ {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .map(move |(i, tile)| (Point::new(i as i32 % width, i as i32 / width), *tile))
    }

    /// Tiles in the `(2 * radius + 1)` square centered on `(x, y)`, center
    /// included, clipped to the grid.
    pub fn tiles_in_square(
        &self,
        x: i32,
        y: i32,
        radius: i32,
    ) -> impl Iterator<Item = (Point, Tile)> + '_ {
        let x0 = (x - radius).max(0);
        let x1 = (x + radius).min(self.width - 1);
        let y0 = (y - radius).max(0);
        let y1 = (y + radius).min(self.height - 1);
        (y0..=y1).flat_map(move |ny| {
            (x0..=x1).map(move |nx| {
                let tile = self.tiles[(ny * self.width + nx) as usize];
                (Point::new(nx, ny), tile)
            })
        })
    }

    /// Tiles along the Bresenham line from `(x0, y0)` to `(x1, y1)`,
    /// endpoints included, skipping any position outside the grid.
    pub fn tiles_along_line(&self, x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<(Point, Tile)> {
        line_points(Point::new(x0, y0), Point::new(x1, y1))
            .into_iter()
            .filter_map(|p| self.get_at(p).ok().map(|tile| (p, tile)))
            .collect()
    }

    /// Number of tiles equal to `tile`.
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|t| **t == tile).count()
    }

    /// Set every tile of `rect` to `tile`. Fails without writing anything
    /// if the rectangle is not fully inside the grid.
    pub fn fill_rect(&mut self, rect: &Rect, tile: Tile) -> Result<(), GridError> {
        if rect.width <= 0 || rect.height <= 0 {
            return Ok(());
        }
        for corner in [
            Point::new(rect.x, rect.y),
            Point::new(rect.right() - 1, rect.bottom() - 1),
        ] {
            self.index(corner.x, corner.y)?;
        }
        for point in rect.points() {
            self.set_at(point, tile)?;
        }
        Ok(())
    }

    /// Open a horizontal run on row `y`, both ends included.
    pub fn carve_horizontal(&mut self, x_start: i32, x_end: i32, y: i32) -> Result<(), GridError> {
        for x in x_start.min(x_end)..=x_start.max(x_end) {
            self.set(x, y, Tile::Empty)?;
        }
        Ok(())
    }

    /// Open a vertical run on column `x`, both ends included.
    pub fn carve_vertical(&mut self, y_start: i32, y_end: i32, x: i32) -> Result<(), GridError> {
        for y in y_start.min(y_end)..=y_start.max(y_end) {
            self.set(x, y, Tile::Empty)?;
        }
        Ok(())
    }

    /// Set the outer ring to `tile`.
    pub fn fill_border(&mut self, tile: Tile) {
        for x in 0..self.width {
            self.tiles[x as usize] = tile;
            self.tiles[((self.height - 1) * self.width + x) as usize] = tile;
        }
        for y in 0..self.height {
            self.tiles[(y * self.width) as usize] = tile;
            self.tiles[(y * self.width + self.width - 1) as usize] = tile;
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.tiles.chunks(self.width as usize) {
            let line: String = row.iter().map(|tile| tile.glyph()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
