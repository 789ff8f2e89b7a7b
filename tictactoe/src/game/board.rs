//! The tic-tac-toe board, tracked as the set of cells still open.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{constants, entities::Cell, state_machine::GameError};

/// Cells not yet claimed by either player.
///
/// A fresh board holds all nine cells. Claiming removes a cell from the
/// open set; claimed cells are tracked per player by the session itself.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Board {
    open: BTreeSet<Cell>,
}

impl Board {
    #[must_use]
    pub fn new() -> Self {
        let open = (1..=constants::CELL_COUNT).map(Cell).collect();
        Self { open }
    }

    #[must_use]
    pub fn is_open(&self, cell: Cell) -> bool {
        self.open.contains(&cell)
    }

    /// Removes the cell from the open set.
    ///
    /// # Errors
    ///
    /// Fails with [`GameError::InvalidMove`] if the cell was already claimed.
    pub fn claim(&mut self, cell: Cell) -> Result<(), GameError> {
        if self.open.remove(&cell) {
            Ok(())
        } else {
            Err(GameError::InvalidMove { cell: cell.label() })
        }
    }

    #[must_use]
    pub fn open_cells(&self) -> &BTreeSet<Cell> {
        &self.open
    }

    /// True once every cell has been claimed.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.open.is_empty()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_has_nine_open_cells() {
        let board = Board::new();
        assert_eq!(board.open_cells().len(), 9);
        assert!(!board.is_full());
    }

    #[test]
    fn test_claim_removes_cell_from_open_set() {
        let mut board = Board::new();
        let cell = Cell::new(5).unwrap();

        assert!(board.is_open(cell));
        board.claim(cell).unwrap();
        assert!(!board.is_open(cell));
        assert_eq!(board.open_cells().len(), 8);
    }

    #[test]
    fn test_claiming_a_taken_cell_fails() {
        let mut board = Board::new();
        let cell = Cell::new(1).unwrap();

        board.claim(cell).unwrap();
        let result = board.claim(cell);
        assert_eq!(result, Err(GameError::InvalidMove { cell: 1 }));
    }

    #[test]
    fn test_board_is_full_after_nine_claims() {
        let mut board = Board::new();
        for label in 1..=9 {
            board.claim(Cell::new(label).unwrap()).unwrap();
        }
        assert!(board.is_full());
    }
}
