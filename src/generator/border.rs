// src/generator/border.rs

use log::info;
use rand::RngCore;

use crate::generator::{BorderOnlyConfig, GeneratorError, MapGenerator};
use crate::map::{Grid, Tile};

/// An open floor surrounded by a one-tile wall.
pub struct BorderOnlyGenerator {
    config: BorderOnlyConfig,
}

impl BorderOnlyGenerator {
    pub const NAME: &'static str = "border_only";

    pub fn new(config: BorderOnlyConfig) -> Self {
        BorderOnlyGenerator { config }
    }
}

impl MapGenerator for BorderOnlyGenerator {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn create_map(&self, _rng: &mut dyn RngCore) -> Result<Grid, GeneratorError> {
        self.config.validate()?;
        let mut grid = Grid::new(self.config.width, self.config.height)?;
        grid.clear(Tile::Empty);
        grid.fill_border(Tile::Block);
        info!(
            "{}: {}x{} map",
            Self::NAME,
            self.config.width,
            self.config.height
        );
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::GridError;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_only_the_border_is_solid() {
        let generator = BorderOnlyGenerator::new(BorderOnlyConfig {
            width: 7,
            height: 5,
        });
        let grid = generator
            .create_map(&mut ChaCha8Rng::seed_from_u64(0))
            .unwrap();

        for (point, tile) in grid.tiles() {
            let expected = if grid.is_border(point.x, point.y) {
                Tile::Block
            } else {
                Tile::Empty
            };
            assert_eq!(tile, expected);
        }
        assert_eq!(grid.count(Tile::Empty), 15);
    }

    #[test]
    fn test_oversized_map_is_an_error() {
        let generator = BorderOnlyGenerator::new(BorderOnlyConfig {
            width: 50_000,
            height: 50_000,
        });
        let err = generator
            .create_map(&mut ChaCha8Rng::seed_from_u64(0))
            .unwrap_err();
        assert!(matches!(
            err,
            GeneratorError::Grid(GridError::InvalidSize { .. })
        ));
    }
}
