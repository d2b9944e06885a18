// src/bsp/mod.rs
//! Binary space partitioning and the two generators built on it.
pub mod bsp_city;
pub mod bsp_node;
pub mod bsp_procedural;

pub use bsp_city::CityGenerator;
pub use bsp_node::{Leaf, LeafId, LeafTree};
pub use bsp_procedural::{BspRoomGenerator, GenerationStats};
