//! Core identities and records shared across the game engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::{
    borrow::Borrow,
    fmt::{Display, Formatter},
};
use uuid::Uuid;

use super::constants;

/// A player's display name.
///
/// Names are sanitized on construction: surrounding whitespace is trimmed,
/// inner whitespace becomes underscores, and the result is truncated to
/// [`constants::MAX_NAME_LENGTH`] characters.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(name: &str) -> Self {
        let mut sanitized: String = name
            .trim()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect();
        sanitized.truncate(constants::MAX_NAME_LENGTH);
        Self(sanitized)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Borrow<str> for PlayerName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Display for PlayerName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(PlayerName::new(&raw))
    }
}

impl From<String> for PlayerName {
    fn from(value: String) -> Self {
        PlayerName::new(&value)
    }
}

/// Opaque identifier for a game session.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct SessionId(Uuid);

impl SessionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for SessionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// A board cell, labeled 1 through 9.
///
/// Labels map onto the grid row by row:
///
/// ```text
/// 1 | 2 | 3
/// 4 | 5 | 6
/// 7 | 8 | 9
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Cell(pub(crate) u8);

impl Cell {
    /// Returns `None` if the label is outside 1..=9.
    #[must_use]
    pub fn new(label: u8) -> Option<Self> {
        (1..=constants::CELL_COUNT).contains(&label).then_some(Self(label))
    }

    #[must_use]
    pub fn label(&self) -> u8 {
        self.0
    }

    /// Zero-based row on the grid.
    #[must_use]
    pub fn row(&self) -> u8 {
        (self.0 - 1) / constants::GRID_SIZE
    }

    /// Zero-based column on the grid.
    #[must_use]
    pub fn col(&self) -> u8 {
        (self.0 - 1) % constants::GRID_SIZE
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Cell {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let label = u8::deserialize(deserializer)?;
        Cell::new(label)
            .ok_or_else(|| serde::de::Error::custom(format!("cell label {label} out of range")))
    }
}

/// Lifecycle state of a game session.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GameStatus {
    Active,
    Completed,
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let repr = match self {
            GameStatus::Active => "Active",
            GameStatus::Completed => "Completed",
        };
        write!(f, "{repr}")
    }
}

/// A single entry in a session's move log.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MoveRecord {
    pub player: PlayerName,
    pub cell: Cell,
}

/// A registered player together with their lifetime aggregates.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub name: PlayerName,
    pub email: String,
    pub won: i64,
    pub played: i64,
    pub created_at: DateTime<Utc>,
}

impl PlayerRecord {
    /// Percentage of completed games this player has won.
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.played > 0 {
            self.won as f64 / self.played as f64 * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_name_sanitizes_whitespace() {
        let name = PlayerName::new("  ada lovelace ");
        assert_eq!(name.as_str(), "ada_lovelace");
    }

    #[test]
    fn test_player_name_truncates_long_input() {
        let long = "x".repeat(100);
        let name = PlayerName::new(&long);
        assert_eq!(name.as_str().len(), constants::MAX_NAME_LENGTH);
    }

    #[test]
    fn test_player_name_deserializes_through_sanitizer() {
        let name: PlayerName = serde_json::from_str("\" grace hopper \"").unwrap();
        assert_eq!(name.as_str(), "grace_hopper");
    }

    #[test]
    fn test_cell_accepts_labels_one_through_nine() {
        for label in 1..=9 {
            assert!(Cell::new(label).is_some(), "cell {label} should be valid");
        }
    }

    #[test]
    fn test_cell_rejects_out_of_range_labels() {
        assert!(Cell::new(0).is_none());
        assert!(Cell::new(10).is_none());
        assert!(Cell::new(255).is_none());
    }

    #[test]
    fn test_cell_grid_position() {
        let cell = Cell::new(5).unwrap();
        assert_eq!(cell.row(), 1);
        assert_eq!(cell.col(), 1);

        let cell = Cell::new(7).unwrap();
        assert_eq!(cell.row(), 2);
        assert_eq!(cell.col(), 0);
    }

    #[test]
    fn test_cell_deserialize_rejects_invalid_label() {
        let result: Result<Cell, _> = serde_json::from_str("12");
        assert!(result.is_err(), "label 12 should not deserialize");
    }

    #[test]
    fn test_win_rate_with_no_games_played() {
        let player = PlayerRecord {
            name: PlayerName::new("fresh"),
            email: "fresh@example.com".to_string(),
            won: 0,
            played: 0,
            created_at: Utc::now(),
        };
        assert_eq!(player.win_rate(), 0.0);
    }

    #[test]
    fn test_win_rate_is_a_percentage() {
        let player = PlayerRecord {
            name: PlayerName::new("veteran"),
            email: "veteran@example.com".to_string(),
            won: 3,
            played: 4,
            created_at: Utc::now(),
        };
        assert_eq!(player.win_rate(), 75.0);
    }
}
