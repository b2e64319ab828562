//! Errors raised by the grid model.
//!
//! Everything here is recoverable: a rejected operation leaves the prior
//! state untouched.

use thiserror::Error;

use crate::grid::{MAX_GRID_SIZE, MIN_GRID_SIZE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("invalid grid size {size} (must be in [{}, {}])", MIN_GRID_SIZE, MAX_GRID_SIZE)]
    InvalidSize { size: usize },

    #[error("cell ({row}, {col}) is outside a {size}x{size} grid")]
    OutOfBounds { row: usize, col: usize, size: usize },

    #[error("token count mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}
