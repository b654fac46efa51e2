// Roster slot model and position eligibility.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::pick::{Position, SlotKind};
use super::player::Player;

/// A single slot on a team's lineup.
///
/// `assigned_player_id` is filled only by the lineup optimizer and is
/// recomputed on every scoring query. It is unrelated to draft ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSlot {
    /// Display name of the slot (e.g., "FLEX").
    pub name: String,
    /// Positions this slot accepts.
    pub allowed_positions: Vec<Position>,
    /// Bench slot: accepts any position, never scores.
    #[serde(default)]
    pub allows_any_position: bool,
    #[serde(default)]
    pub assigned_player_id: Option<String>,
}

impl RosterSlot {
    /// Build an empty slot of the given kind.
    pub fn from_kind(kind: SlotKind) -> Self {
        RosterSlot {
            name: kind.display_str().to_string(),
            allowed_positions: kind.accepted_positions(),
            allows_any_position: kind == SlotKind::Bench,
            assigned_player_id: None,
        }
    }

    /// Build a slot with an explicit accepted-position set.
    pub fn new(name: &str, allowed_positions: Vec<Position>) -> Self {
        RosterSlot {
            name: name.to_string(),
            allowed_positions,
            allows_any_position: false,
            assigned_player_id: None,
        }
    }

    /// Size of the accepted-position set. Bench slots accept everything.
    pub fn accepted_count(&self) -> usize {
        if self.allows_any_position {
            Position::ALL.len()
        } else {
            self.allowed_positions.len()
        }
    }

    pub fn accepts(&self, pos: Position) -> bool {
        self.allows_any_position || self.allowed_positions.contains(&pos)
    }

    pub fn is_bench(&self) -> bool {
        self.allows_any_position
    }
}

/// Build the canonical per-team slot list from a `slot name -> count` map.
///
/// Unknown slot names are skipped with a warning. Slots come out in a
/// deterministic display order.
pub fn slots_from_config(roster_config: &HashMap<String, usize>) -> Vec<RosterSlot> {
    let mut kinds: Vec<SlotKind> = Vec::new();

    for (name, &count) in roster_config {
        match SlotKind::from_str_slot(name) {
            Some(kind) => kinds.extend(std::iter::repeat(kind).take(count)),
            None => warn!("ignoring unknown roster slot '{}'", name),
        }
    }

    kinds.sort_by_key(|k| k.sort_order());
    kinds.into_iter().map(RosterSlot::from_kind).collect()
}

/// The player's primary position: the first eligible position listed.
pub fn primary_position(player: &Player) -> Option<Position> {
    player.allowed_positions.first().copied()
}

/// Whether the player can fill the slot.
pub fn is_eligible(player: &Player, slot: &RosterSlot) -> bool {
    player.allowed_positions.iter().any(|&pos| slot.accepts(pos))
}
