// src/generator/config.rs
//! Parameter sets for every generator, their defaults, and the validation
//! each generator runs before touching a grid.

use serde::{Deserialize, Serialize};

use crate::bsp::{BspRoomGenerator, CityGenerator};
use crate::generator::{
    BorderOnlyGenerator, CaveGenerator, CellularAutomataGenerator, GeneratorError, MapGenerator,
    TunnelingWithRoomsGenerator,
};

const DEFAULT_WIDTH: i32 = 25;
const DEFAULT_HEIGHT: i32 = 25;

fn ensure(ok: bool, generator: &'static str, reason: impl Into<String>) -> Result<(), GeneratorError> {
    if ok {
        Ok(())
    } else {
        Err(GeneratorError::InvalidConfig {
            generator,
            reason: reason.into(),
        })
    }
}

fn ensure_dimensions(
    generator: &'static str,
    width: i32,
    height: i32,
    min: i32,
) -> Result<(), GeneratorError> {
    ensure(
        width >= min && height >= min,
        generator,
        format!("map must be at least {min}x{min}, got {width}x{height}"),
    )
}

fn ensure_percent(generator: &'static str, name: &str, value: u32) -> Result<(), GeneratorError> {
    ensure(
        value <= 100,
        generator,
        format!("{name} must be between 0 and 100, got {value}"),
    )
}

fn ensure_room_sizes(
    generator: &'static str,
    room_min_size: i32,
    room_max_size: i32,
) -> Result<(), GeneratorError> {
    ensure(
        room_min_size >= 3,
        generator,
        format!("room_min_size must be at least 3, got {room_min_size}"),
    )?;
    ensure(
        room_min_size <= room_max_size,
        generator,
        format!("room_min_size ({room_min_size}) cannot be greater than room_max_size ({room_max_size})"),
    )
}

fn ensure_leaf_sizes(
    generator: &'static str,
    leaf_min_size: i32,
    leaf_max_size: i32,
) -> Result<(), GeneratorError> {
    ensure(
        leaf_min_size > 0,
        generator,
        format!("leaf_min_size must be positive, got {leaf_min_size}"),
    )?;
    ensure(
        leaf_min_size <= leaf_max_size,
        generator,
        format!("leaf_min_size ({leaf_min_size}) cannot be greater than leaf_max_size ({leaf_max_size})"),
    )
}

/// Binary space partition with carved rooms and L-shaped corridors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BspConfig {
    pub width: i32,
    pub height: i32,
    pub leaf_max_size: i32,
    pub leaf_min_size: i32,
    pub room_max_size: i32,
    pub room_min_size: i32,
}

impl Default for BspConfig {
    fn default() -> Self {
        BspConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            leaf_max_size: 24,
            leaf_min_size: 10,
            room_max_size: 15,
            room_min_size: 6,
        }
    }
}

impl BspConfig {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        const NAME: &str = BspRoomGenerator::NAME;
        ensure_dimensions(NAME, self.width, self.height, 3)?;
        ensure_leaf_sizes(NAME, self.leaf_min_size, self.leaf_max_size)?;
        ensure_room_sizes(NAME, self.room_min_size, self.room_max_size)
    }
}

/// Same partition as [`BspConfig`], rendered as walled blocks with doors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CityConfig {
    pub width: i32,
    pub height: i32,
    pub leaf_max_size: i32,
    pub leaf_min_size: i32,
    pub room_max_size: i32,
    pub room_min_size: i32,
}

impl Default for CityConfig {
    fn default() -> Self {
        CityConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            leaf_max_size: 30,
            leaf_min_size: 8,
            room_max_size: 16,
            room_min_size: 8,
        }
    }
}

impl CityConfig {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        const NAME: &str = CityGenerator::NAME;
        ensure_dimensions(NAME, self.width, self.height, 3)?;
        ensure_leaf_sizes(NAME, self.leaf_min_size, self.leaf_max_size)?;
        ensure_room_sizes(NAME, self.room_min_size, self.room_max_size)
    }
}

/// Cave growth, smoothing and corridor weaving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveConfig {
    pub width: i32,
    pub height: i32,
    /// Open tiles (out of 9) above which an eroded tile is opened.
    pub neighbours: usize,
    /// Number of random erosion picks.
    pub iterations: usize,
    /// Percent chance that an interior tile starts open.
    pub close_tile_prob: u32,
    /// Regions of this size or smaller are filled in.
    pub lower_limit: usize,
    /// Regions larger than this are filled in.
    pub upper_limit: usize,
    /// Wall neighbours (out of 4) that close an open tile while smoothing.
    pub empty_neighbours: usize,
    /// Open neighbours (out of 4) that open a wall tile while filling holes.
    pub empty_tile_neighbours: usize,
    /// Lateral clearance a corridor keeps from existing open space.
    pub corridor_space: i32,
    pub corridor_max_turns: usize,
    pub corridor_min: i32,
    pub corridor_max: i32,
    /// Corridor attempts before weaving gives up.
    pub break_out: usize,
    /// Percent chance of growing the next corridor from a cave rather than
    /// from an existing corridor, once corridors exist.
    pub cave_edge_chance: u32,
}

impl Default for CaveConfig {
    fn default() -> Self {
        CaveConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            neighbours: 4,
            iterations: 50_000,
            close_tile_prob: 45,
            lower_limit: 16,
            upper_limit: 500,
            empty_neighbours: 3,
            empty_tile_neighbours: 4,
            corridor_space: 2,
            corridor_max_turns: 10,
            corridor_min: 2,
            corridor_max: 5,
            break_out: 100_000,
            cave_edge_chance: 50,
        }
    }
}

impl CaveConfig {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        const NAME: &str = CaveGenerator::NAME;
        ensure_dimensions(NAME, self.width, self.height, 3)?;
        ensure(
            (1..=9).contains(&self.neighbours),
            NAME,
            format!("neighbours must be between 1 and 9, got {}", self.neighbours),
        )?;
        ensure(self.iterations >= 1, NAME, "iterations must be at least 1")?;
        ensure(self.lower_limit >= 1, NAME, "lower_limit must be at least 1")?;
        ensure_percent(NAME, "close_tile_prob", self.close_tile_prob)?;
        ensure_percent(NAME, "cave_edge_chance", self.cave_edge_chance)?;
        ensure(
            self.lower_limit <= self.upper_limit,
            NAME,
            format!(
                "lower_limit ({}) cannot be greater than upper_limit ({})",
                self.lower_limit, self.upper_limit
            ),
        )?;
        ensure(
            (1..=4).contains(&self.empty_neighbours),
            NAME,
            format!("empty_neighbours must be between 1 and 4, got {}", self.empty_neighbours),
        )?;
        ensure(
            (1..=4).contains(&self.empty_tile_neighbours),
            NAME,
            format!(
                "empty_tile_neighbours must be between 1 and 4, got {}",
                self.empty_tile_neighbours
            ),
        )?;
        ensure(
            self.corridor_space >= 0,
            NAME,
            format!("corridor_space cannot be negative, got {}", self.corridor_space),
        )?;
        ensure(
            self.corridor_min >= 1,
            NAME,
            format!("corridor_min must be at least 1, got {}", self.corridor_min),
        )?;
        ensure(
            self.corridor_min <= self.corridor_max,
            NAME,
            format!(
                "corridor_min ({}) cannot be greater than corridor_max ({})",
                self.corridor_min, self.corridor_max
            ),
        )
    }
}

/// Neighbour-rule automaton with flood-fill connectivity repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CellularAutomataConfig {
    pub width: i32,
    pub height: i32,
    /// Percent chance that an interior tile starts open.
    pub fill_probability: u32,
    pub total_iterations: usize,
    /// Iterations that use the two-radius rule before switching to the
    /// nearest-neighbour rule.
    pub cutoff_of_big_area_fill: usize,
}

impl Default for CellularAutomataConfig {
    fn default() -> Self {
        CellularAutomataConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            fill_probability: 50,
            total_iterations: 3,
            cutoff_of_big_area_fill: 3,
        }
    }
}

impl CellularAutomataConfig {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        const NAME: &str = CellularAutomataGenerator::NAME;
        ensure_dimensions(NAME, self.width, self.height, 3)?;
        ensure_percent(NAME, "fill_probability", self.fill_probability)?;
        ensure(
            self.total_iterations >= 1,
            NAME,
            "total_iterations must be at least 1",
        )
    }
}

/// Rejection-sampled rooms joined in placement order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TunnelingWithRoomsConfig {
    pub width: i32,
    pub height: i32,
    pub max_rooms: usize,
    pub room_max_size: i32,
    pub room_min_size: i32,
}

impl Default for TunnelingWithRoomsConfig {
    fn default() -> Self {
        TunnelingWithRoomsConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            max_rooms: 30,
            room_max_size: 15,
            room_min_size: 6,
        }
    }
}

impl TunnelingWithRoomsConfig {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        const NAME: &str = TunnelingWithRoomsGenerator::NAME;
        ensure_dimensions(NAME, self.width, self.height, 3)?;
        ensure(self.max_rooms >= 1, NAME, "max_rooms must be at least 1")?;
        ensure_room_sizes(NAME, self.room_min_size, self.room_max_size)?;
        ensure(
            self.room_max_size <= self.width.min(self.height),
            NAME,
            format!(
                "room_max_size ({}) does not fit in a {}x{} map",
                self.room_max_size, self.width, self.height
            ),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderOnlyConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for BorderOnlyConfig {
    fn default() -> Self {
        BorderOnlyConfig {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl BorderOnlyConfig {
    pub fn validate(&self) -> Result<(), GeneratorError> {
        ensure_dimensions(BorderOnlyGenerator::NAME, self.width, self.height, 1)
    }
}

/// A generator choice plus its parameters, as loaded from a JSON file:
///
/// ```json
/// { "algorithm": "cave", "width": 60, "height": 40, "break_out": 5000 }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum MapConfig {
    Bsp(BspConfig),
    City(CityConfig),
    Cave(CaveConfig),
    CellularAutomata(CellularAutomataConfig),
    TunnelingWithRooms(TunnelingWithRoomsConfig),
    BorderOnly(BorderOnlyConfig),
}

impl MapConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn dimensions(&self) -> (i32, i32) {
        match self {
            MapConfig::Bsp(c) => (c.width, c.height),
            MapConfig::City(c) => (c.width, c.height),
            MapConfig::Cave(c) => (c.width, c.height),
            MapConfig::CellularAutomata(c) => (c.width, c.height),
            MapConfig::TunnelingWithRooms(c) => (c.width, c.height),
            MapConfig::BorderOnly(c) => (c.width, c.height),
        }
    }

    /// Override the map size, keeping every other parameter.
    pub fn with_dimensions(mut self, width: i32, height: i32) -> Self {
        match &mut self {
            MapConfig::Bsp(c) => (c.width, c.height) = (width, height),
            MapConfig::City(c) => (c.width, c.height) = (width, height),
            MapConfig::Cave(c) => (c.width, c.height) = (width, height),
            MapConfig::CellularAutomata(c) => (c.width, c.height) = (width, height),
            MapConfig::TunnelingWithRooms(c) => (c.width, c.height) = (width, height),
            MapConfig::BorderOnly(c) => (c.width, c.height) = (width, height),
        }
        self
    }

    pub fn into_generator(self) -> Box<dyn MapGenerator> {
        match self {
            MapConfig::Bsp(c) => Box::new(BspRoomGenerator::new(c)),
            MapConfig::City(c) => Box::new(CityGenerator::new(c)),
            MapConfig::Cave(c) => Box::new(CaveGenerator::new(c)),
            MapConfig::CellularAutomata(c) => Box::new(CellularAutomataGenerator::new(c)),
            MapConfig::TunnelingWithRooms(c) => Box::new(TunnelingWithRoomsGenerator::new(c)),
            MapConfig::BorderOnly(c) => Box::new(BorderOnlyGenerator::new(c)),
        }
    }
}
