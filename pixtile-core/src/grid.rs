// Canonical pixel buffer for the editor.
// A square grid of cells, row-major, index = row * size + col.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::GridError;

pub const MIN_GRID_SIZE: usize = 4;
pub const MAX_GRID_SIZE: usize = 64;
pub const DEFAULT_GRID_SIZE: usize = 16;

/// Token written for empty cells in serialized grids.
pub const EMPTY_TOKEN: &str = "transparent";

/// One grid position: either an opaque colour token or fully transparent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cell {
    #[default]
    Empty,
    Color(String),
}

impl Cell {
    pub fn color(token: impl Into<String>) -> Self {
        Cell::from(token.into())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn token(&self) -> &str {
        match self {
            Cell::Empty => EMPTY_TOKEN,
            Cell::Color(token) => token,
        }
    }
}

impl From<String> for Cell {
    fn from(token: String) -> Self {
        if token == EMPTY_TOKEN || token.is_empty() {
            Cell::Empty
        } else {
            Cell::Color(token)
        }
    }
}

impl From<&str> for Cell {
    fn from(token: &str) -> Self {
        Cell::from(token.to_string())
    }
}

impl From<Cell> for String {
    fn from(cell: Cell) -> Self {
        match cell {
            Cell::Empty => EMPTY_TOKEN.to_string(),
            Cell::Color(token) => token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

// Unchecked wire shape; validated on the way into `Grid`.
#[derive(Deserialize)]
struct RawGrid {
    size: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = GridError;

    fn try_from(raw: RawGrid) -> Result<Self, Self::Error> {
        Grid::from_cells(raw.cells, raw.size)
    }
}

impl Grid {
    /// Create a grid of `size * size` empty cells.
    pub fn new(size: usize) -> Result<Self, GridError> {
        check_size(size)?;
        info!("Creating new {}x{} grid", size, size);
        Ok(Self {
            size,
            cells: vec![Cell::Empty; size * size],
        })
    }

    /// Like [`Grid::new`] but clamps `size` into the supported range.
    pub fn new_clamped(size: usize) -> Self {
        let clamped = clamp_size(size);
        if clamped != size {
            warn!("Clamped grid size {} to {}", size, clamped);
        }
        Self {
            size: clamped,
            cells: vec![Cell::Empty; clamped * clamped],
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    // Check if coordinates are within grid bounds
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    /// Signed variant of [`Grid::contains`], for pointer samples and brush
    /// offsets that may fall off the canvas.
    pub fn contains_signed(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && self.contains(row as usize, col as usize)
    }

    // Convert 2d coordinates to 1d index
    pub fn index(&self, row: usize, col: usize) -> Result<usize, GridError> {
        if !self.contains(row, col) {
            return Err(GridError::OutOfBounds {
                row,
                col,
                size: self.size,
            });
        }
        Ok(row * self.size + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<&Cell, GridError> {
        let index = self.index(row, col)?;
        Ok(&self.cells[index])
    }

    pub fn set(&mut self, row: usize, col: usize, value: Cell) -> Result<(), GridError> {
        let index = self.index(row, col)?;
        trace!("Setting cell ({}, {}) to {}", row, col, value.token());
        self.cells[index] = value;
        Ok(())
    }

    /// Write a cell if it is on the grid; off-grid writes are dropped.
    /// Returns whether the cell was written.
    pub(crate) fn set_clipped(&mut self, row: i64, col: i64, value: &Cell) -> bool {
        if !self.contains_signed(row, col) {
            return false;
        }
        let index = row as usize * self.size + col as usize;
        self.cells[index] = value.clone();
        true
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    pub fn painted_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// Flat token sequence, row-major, suitable for storage.
    pub fn serialize(&self) -> Vec<String> {
        self.cells.iter().map(|cell| cell.token().to_string()).collect()
    }

    pub fn deserialize<S: AsRef<str>>(tokens: &[S], size: usize) -> Result<Self, GridError> {
        let cells = tokens.iter().map(|t| Cell::from(t.as_ref())).collect();
        Self::from_cells(cells, size)
    }

    pub fn from_cells(cells: Vec<Cell>, size: usize) -> Result<Self, GridError> {
        check_size(size)?;
        let expected = size * size;
        if cells.len() != expected {
            warn!(
                "Rejecting {} cells for a {}x{} grid",
                cells.len(),
                size,
                size
            );
            return Err(GridError::SizeMismatch {
                expected,
                actual: cells.len(),
            });
        }
        debug!("Loaded {}x{} grid", size, size);
        Ok(Self { size, cells })
    }
}

impl Default for Grid {
    fn default() -> Self {
        Grid::new_clamped(DEFAULT_GRID_SIZE)
    }
}

pub fn clamp_size(size: usize) -> usize {
    size.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE)
}

fn check_size(size: usize) -> Result<(), GridError> {
    if !(MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size) {
        warn!("Invalid grid size {}", size);
        return Err(GridError::InvalidSize { size });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_empty_for_all_sizes() {
        for n in MIN_GRID_SIZE..=MAX_GRID_SIZE {
            let grid = Grid::new(n).unwrap();
            assert_eq!(grid.len(), n * n);
            assert!(grid.is_blank());
        }
    }

    #[test]
    fn test_invalid_sizes_rejected() {
        assert_eq!(Grid::new(3), Err(GridError::InvalidSize { size: 3 }));
        assert_eq!(Grid::new(65), Err(GridError::InvalidSize { size: 65 }));
    }

    #[test]
    fn test_new_clamped() {
        assert_eq!(Grid::new_clamped(0).size(), MIN_GRID_SIZE);
        assert_eq!(Grid::new_clamped(200).size(), MAX_GRID_SIZE);
        assert_eq!(Grid::new_clamped(32).size(), 32);
    }

    #[test]
    fn test_get_set() {
        let mut grid = Grid::new(4).unwrap();
        grid.set(1, 2, Cell::color("#ff0000")).unwrap();

        assert_eq!(grid.get(1, 2).unwrap(), &Cell::color("#ff0000"));
        assert_eq!(grid.cells()[6], Cell::color("#ff0000"));
        assert_eq!(grid.painted_count(), 1);
        assert_eq!(grid.size(), 4);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = Grid::new(4).unwrap();
        assert_eq!(
            grid.get(4, 0),
            Err(GridError::OutOfBounds {
                row: 4,
                col: 0,
                size: 4
            })
        );
        assert!(grid.set(0, 9, Cell::color("#000000")).is_err());
        assert!(grid.is_blank());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut grid = Grid::new(5).unwrap();
        grid.set(0, 0, Cell::color("#123456")).unwrap();
        grid.set(4, 4, Cell::color("#abcdef")).unwrap();

        let tokens = grid.serialize();
        assert_eq!(tokens.len(), 25);
        assert_eq!(tokens[1], EMPTY_TOKEN);

        let restored = Grid::deserialize(&tokens, 5).unwrap();
        assert_eq!(restored, grid);
    }

    #[test]
    fn test_deserialize_size_mismatch() {
        let tokens = vec!["transparent"; 15];
        assert_eq!(
            Grid::deserialize(&tokens, 4),
            Err(GridError::SizeMismatch {
                expected: 16,
                actual: 15
            })
        );
    }

    #[test]
    fn test_cell_tokens() {
        assert_eq!(Cell::from("transparent"), Cell::Empty);
        assert_eq!(Cell::from(""), Cell::Empty);
        assert_eq!(Cell::from("#fff").token(), "#fff");
        assert_eq!(String::from(Cell::Empty), "transparent");
    }
}
