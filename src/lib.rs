// src/lib.rs

pub mod bsp;
pub mod connectivity;
pub mod generator;
pub mod map;
pub mod utils;

pub use generator::{GeneratorError, MapConfig, MapGenerator};
pub use map::{Grid, GridError, Tile};
