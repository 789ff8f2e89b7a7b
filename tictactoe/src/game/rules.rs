//! Win evaluation over claimed cell sets.

use std::collections::BTreeSet;

use super::entities::Cell;

/// The eight lines that win the game: three rows, three columns, and the
/// two diagonals, in cell labels.
pub const WINNING_LINES: [[Cell; 3]; 8] = [
    [Cell(1), Cell(2), Cell(3)],
    [Cell(4), Cell(5), Cell(6)],
    [Cell(7), Cell(8), Cell(9)],
    [Cell(1), Cell(4), Cell(7)],
    [Cell(2), Cell(5), Cell(8)],
    [Cell(3), Cell(6), Cell(9)],
    [Cell(1), Cell(5), Cell(9)],
    [Cell(3), Cell(5), Cell(7)],
];

/// True when the claimed set covers at least one winning line.
///
/// The check is insensitive to claim order and ignores cells outside the
/// line being tested.
#[must_use]
pub fn has_won(claimed: &BTreeSet<Cell>) -> bool {
    WINNING_LINES
        .iter()
        .any(|line| line.iter().all(|cell| claimed.contains(cell)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(labels: &[u8]) -> BTreeSet<Cell> {
        labels
            .iter()
            .map(|&label| Cell::new(label).unwrap())
            .collect()
    }

    #[test]
    fn test_every_winning_line_is_detected() {
        for line in &WINNING_LINES {
            let claimed: BTreeSet<Cell> = line.iter().copied().collect();
            assert!(has_won(&claimed), "line {line:?} should win");
        }
    }

    #[test]
    fn test_diagonal_win() {
        assert!(has_won(&cells(&[1, 5, 9])));
        assert!(has_won(&cells(&[3, 5, 7])));
    }

    #[test]
    fn test_three_cells_off_line_do_not_win() {
        assert!(!has_won(&cells(&[1, 2, 4])));
    }

    #[test]
    fn test_two_cells_never_win() {
        assert!(!has_won(&cells(&[1, 2])));
    }

    #[test]
    fn test_empty_set_does_not_win() {
        assert!(!has_won(&BTreeSet::new()));
    }

    #[test]
    fn test_superset_of_a_line_wins() {
        assert!(has_won(&cells(&[2, 4, 5, 6, 9])));
    }

    #[test]
    fn test_scattered_cells_do_not_win() {
        assert!(!has_won(&cells(&[2, 4, 6, 8])));
    }
}
