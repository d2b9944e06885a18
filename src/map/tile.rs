// src/map/tile.rs

/// A single grid cell. `Block` is solid wall, `Empty` is passable floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tile {
    #[default]
    Block,
    Empty,
}

impl Tile {
    pub fn is_block(self) -> bool {
        self == Tile::Block
    }

    pub fn is_open(self) -> bool {
        self == Tile::Empty
    }

    /// Character used by the text dump of a grid.
    pub fn glyph(self) -> char {
        match self {
            Tile::Block => '#',
            Tile::Empty => '.',
        }
    }
}
