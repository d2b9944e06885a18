// src/utils/mod.rs
pub mod geometry;

pub use geometry::{line_points, Direction, Point, Rect};
