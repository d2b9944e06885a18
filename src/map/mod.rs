// src/map/mod.rs
pub mod grid;
pub mod tile;

pub use grid::{Grid, GridError};
pub use tile::Tile;
