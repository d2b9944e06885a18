// src/generator/error.rs

use thiserror::Error;

use crate::map::GridError;

/// Everything that can stop a generator from handing back a grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("invalid {generator} configuration: {reason}")]
    InvalidConfig {
        generator: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(
        "generation did not produce a fully connected map: \
         {remaining} caves still unconnected after {attempts} attempts"
    )]
    NotConnected { attempts: usize, remaining: usize },
}

impl GeneratorError {
    /// Whether running again with a different seed may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, GeneratorError::NotConnected { .. })
    }
}
