//! Game-wide constants.

/// Number of cells on the board.
pub const CELL_COUNT: u8 = 9;

/// Width and height of the grid.
pub const GRID_SIZE: u8 = 3;

/// Maximum number of characters allowed in a player name.
pub const MAX_NAME_LENGTH: usize = 32;
