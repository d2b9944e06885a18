// src/connectivity/mod.rs
//! Region discovery and merging shared by the cave and cellular-automata
//! generators.
pub mod flood_fill;
pub mod union;

pub use flood_fill::{is_connected, FloodFillAnalyzer, MapSection};
pub use union::SectionUnion;
