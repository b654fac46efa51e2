// Positions, slot kinds, and individual pick records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Football positions a player can be eligible for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    #[serde(rename = "QB")]
    Quarterback,
    #[serde(rename = "RB")]
    RunningBack,
    #[serde(rename = "WR")]
    WideReceiver,
    #[serde(rename = "TE")]
    TightEnd,
    #[serde(rename = "K")]
    Kicker,
    #[serde(rename = "DST")]
    Defense,
}

impl Position {
    /// Every playing position, in display order.
    pub const ALL: [Position; 6] = [
        Position::Quarterback,
        Position::RunningBack,
        Position::WideReceiver,
        Position::TightEnd,
        Position::Kicker,
        Position::Defense,
    ];

    /// Parse a position string into a Position enum.
    ///
    /// Case-insensitive. Accepts the common defense spellings
    /// ("DST", "D/ST", "DEF", "D").
    pub fn from_str_pos(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "QB" => Some(Position::Quarterback),
            "RB" => Some(Position::RunningBack),
            "WR" => Some(Position::WideReceiver),
            "TE" => Some(Position::TightEnd),
            "K" | "PK" => Some(Position::Kicker),
            "DST" | "D/ST" | "DEF" | "D" => Some(Position::Defense),
            _ => None,
        }
    }

    /// Return the display string for this position.
    pub fn display_str(&self) -> &'static str {
        match self {
            Position::Quarterback => "QB",
            Position::RunningBack => "RB",
            Position::WideReceiver => "WR",
            Position::TightEnd => "TE",
            Position::Kicker => "K",
            Position::Defense => "DST",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// The named slot kinds a league roster is configured with.
///
/// A slot kind expands to the set of positions it accepts; `Bench` accepts
/// every position but never scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    Single(Position),
    /// RB/WR/TE
    Flex,
    /// QB/RB/WR/TE
    SuperFlex,
    Bench,
}

impl SlotKind {
    /// Parse a roster config key (e.g. "RB", "FLEX", "BENCH").
    pub fn from_str_slot(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "FLEX" => Some(SlotKind::Flex),
            "SUPERFLEX" | "SFLEX" | "OP" => Some(SlotKind::SuperFlex),
            "BENCH" | "BE" | "BN" => Some(SlotKind::Bench),
            other => Position::from_str_pos(other).map(SlotKind::Single),
        }
    }

    /// Display name used for the slots this kind creates.
    pub fn display_str(&self) -> &'static str {
        match self {
            SlotKind::Single(pos) => pos.display_str(),
            SlotKind::Flex => "FLEX",
            SlotKind::SuperFlex => "SUPERFLEX",
            SlotKind::Bench => "BENCH",
        }
    }

    /// Positions accepted by a slot of this kind.
    pub fn accepted_positions(&self) -> Vec<Position> {
        match self {
            SlotKind::Single(pos) => vec![*pos],
            SlotKind::Flex => vec![
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
            ],
            SlotKind::SuperFlex => vec![
                Position::Quarterback,
                Position::RunningBack,
                Position::WideReceiver,
                Position::TightEnd,
            ],
            SlotKind::Bench => Position::ALL.to_vec(),
        }
    }

    /// Deterministic ordering index for roster slot display.
    pub fn sort_order(&self) -> u8 {
        match self {
            SlotKind::Single(Position::Quarterback) => 0,
            SlotKind::Single(Position::RunningBack) => 1,
            SlotKind::Single(Position::WideReceiver) => 2,
            SlotKind::Single(Position::TightEnd) => 3,
            SlotKind::Flex => 4,
            SlotKind::SuperFlex => 5,
            SlotKind::Single(Position::Kicker) => 6,
            SlotKind::Single(Position::Defense) => 7,
            SlotKind::Bench => 8,
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_str())
    }
}

/// A single draft pick record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftPick {
    /// Sequential pick number (1-indexed).
    pub pick_number: u32,
    /// ID of the team that made the pick.
    pub team_id: String,
    /// ID of the drafted player. `None` when the turn was skipped.
    pub player_id: Option<String>,
    /// Name of the drafted player (empty for skipped turns).
    #[serde(default)]
    pub player_name: String,
    /// Primary position of the drafted player, if any.
    #[serde(default)]
    pub position: Option<Position>,
    /// Whether the engine chose this player on the team's behalf.
    #[serde(default)]
    pub auto_drafted: bool,
}

impl DraftPick {
    /// Whether this pick record represents a skipped turn.
    pub fn is_skip(&self) -> bool {
        self.player_id.is_none()
    }
}
