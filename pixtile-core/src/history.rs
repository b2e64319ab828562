// Undo/redo history for the editor.
//
// A single linear sequence of full grid snapshots with a cursor. Committing
// after an undo drops everything past the cursor; the oldest snapshots are
// evicted once the cap is exceeded.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::Grid;

pub const DEFAULT_MAX_STATES: usize = 50;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(try_from = "RawHistory")]
pub struct History {
    states: Vec<Grid>,
    current_index: usize,

    #[serde(default = "default_max_states")]
    max_states: usize,
}

fn default_max_states() -> usize {
    DEFAULT_MAX_STATES
}

#[derive(Deserialize)]
struct RawHistory {
    states: Vec<Grid>,
    current_index: usize,
    #[serde(default = "default_max_states")]
    max_states: usize,
}

impl TryFrom<RawHistory> for History {
    type Error = String;

    fn try_from(raw: RawHistory) -> Result<Self, Self::Error> {
        if raw.current_index >= raw.states.len() {
            return Err(format!(
                "history cursor {} outside {} entries",
                raw.current_index,
                raw.states.len()
            ));
        }
        Ok(Self {
            states: raw.states,
            current_index: raw.current_index,
            max_states: raw.max_states.max(1),
        })
    }
}

impl History {
    pub fn new(initial_state: Grid) -> Self {
        Self::with_capacity(initial_state, DEFAULT_MAX_STATES)
    }

    /// History holding at most `max_states` snapshots (at least one).
    pub fn with_capacity(initial_state: Grid, max_states: usize) -> Self {
        Self {
            states: vec![initial_state],
            current_index: 0,
            max_states: max_states.max(1),
        }
    }

    /// Push a snapshot after the cursor, discarding any redo entries.
    pub fn commit(&mut self, grid: Grid) {
        self.states.truncate(self.current_index + 1);
        self.states.push(grid);

        let overflow = self.states.len().saturating_sub(self.max_states);
        if overflow > 0 {
            self.states.drain(..overflow);
            trace!("Evicted {} oldest history entries", overflow);
        }
        self.current_index = self.states.len() - 1;

        debug!(
            "Committed history entry {} of {}",
            self.current_index + 1,
            self.states.len()
        );
    }

    pub fn undo(&mut self) -> &Grid {
        if self.can_undo() {
            self.current_index -= 1;
            debug!("Undo to history entry {}", self.current_index);
        } else {
            trace!("Nothing to undo");
        }
        self.current()
    }

    pub fn redo(&mut self) -> &Grid {
        if self.can_redo() {
            self.current_index += 1;
            debug!("Redo to history entry {}", self.current_index);
        } else {
            trace!("Nothing to redo");
        }
        self.current()
    }

    /// Discard everything and start over from `initial_state`.
    pub fn reset(&mut self, initial_state: Grid) {
        debug!("Resetting history ({} entries dropped)", self.states.len());
        self.states.clear();
        self.states.push(initial_state);
        self.current_index = 0;
    }

    pub fn current(&self) -> &Grid {
        &self.states[self.current_index]
    }

    pub fn can_undo(&self) -> bool {
        self.current_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.current_index + 1 < self.states.len()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn max_states(&self) -> usize {
        self.max_states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Cell;

    fn grid_with(marker: usize) -> Grid {
        let mut grid = Grid::new(8).unwrap();
        grid.set(marker / 8, marker % 8, Cell::color("#ff0000")).unwrap();
        grid
    }

    #[test]
    fn test_undo_redo_restores_exact_states() {
        let before = Grid::new(8).unwrap();
        let after = grid_with(3);
        let mut history = History::new(before.clone());

        history.commit(after.clone());
        assert_eq!(history.undo(), &before);
        assert_eq!(history.redo(), &after);
    }

    #[test]
    fn test_undo_redo_at_edges_are_noops() {
        let mut history = History::new(Grid::new(4).unwrap());
        assert!(!history.can_undo());
        assert!(!history.can_redo());

        let start = history.current().clone();
        assert_eq!(history.undo(), &start);
        assert_eq!(history.redo(), &start);
        assert_eq!(history.current_index(), 0);
    }

    #[test]
    fn test_commit_after_undo_truncates_redo() {
        let mut history = History::new(Grid::new(8).unwrap());
        history.commit(grid_with(1));
        history.commit(grid_with(2));
        history.undo();

        history.commit(grid_with(5));

        assert_eq!(history.len(), 3);
        assert!(!history.can_redo());
        assert_eq!(history.current(), &grid_with(5));
        assert_eq!(history.undo(), &grid_with(1));
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let initial = Grid::new(8).unwrap();
        let mut history = History::new(initial.clone());
        for i in 0..60 {
            history.commit(grid_with(i));
        }

        assert_eq!(history.len(), DEFAULT_MAX_STATES);
        assert_eq!(history.current_index(), DEFAULT_MAX_STATES - 1);

        let mut oldest = history.current().clone();
        while history.can_undo() {
            oldest = history.undo().clone();
        }
        // 61 states pushed in total, the first 11 are gone
        assert_ne!(oldest, initial);
        assert_eq!(oldest, grid_with(10));
    }

    #[test]
    fn test_custom_capacity() {
        let mut history = History::with_capacity(Grid::new(8).unwrap(), 3);
        for i in 0..5 {
            history.commit(grid_with(i));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.max_states(), 3);

        let zero = History::with_capacity(Grid::new(8).unwrap(), 0);
        assert_eq!(zero.max_states(), 1);
    }

    #[test]
    fn test_serde_rejects_dangling_cursor() {
        let mut history = History::new(Grid::new(4).unwrap());
        history.commit(Grid::new(4).unwrap());
        let json = serde_json::to_string(&history).unwrap();
        let restored: History = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, history);

        let broken = json.replace("\"current_index\":1", "\"current_index\":7");
        assert!(serde_json::from_str::<History>(&broken).is_err());
    }

    #[test]
    fn test_reset() {
        let mut history = History::new(Grid::new(8).unwrap());
        history.commit(grid_with(1));
        history.commit(grid_with(2));

        let loaded = grid_with(7);
        history.reset(loaded.clone());

        assert_eq!(history.len(), 1);
        assert_eq!(history.current(), &loaded);
        assert!(!history.can_undo());
    }
}
