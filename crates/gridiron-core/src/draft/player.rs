// Player records and the owned player pool.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::pick::Position;
use crate::error::DraftError;

/// Where a player currently sits in the league.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Availability {
    Available,
    Drafted,
    /// Dropped through waivers this week; released at the next waiver run.
    OnHold,
}

impl Availability {
    /// Storage form, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "AVAILABLE",
            Availability::Drafted => "DRAFTED",
            Availability::OnHold => "ON_HOLD",
        }
    }

    pub fn from_str_availability(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "AVAILABLE" => Some(Availability::Available),
            "DRAFTED" => Some(Availability::Drafted),
            "ON_HOLD" => Some(Availability::OnHold),
            _ => None,
        }
    }
}

/// Mutable ownership state of a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatus {
    pub availability: Availability,
    /// Pick number at which the player was drafted.
    #[serde(default)]
    pub pick_chosen: Option<u32>,
    /// Team that currently owns the player.
    #[serde(default)]
    pub owning_team_id: Option<String>,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        PlayerStatus {
            availability: Availability::Available,
            pick_chosen: None,
            owning_team_id: None,
        }
    }
}

/// A draftable player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Stable identifier shared with the scoring data.
    pub id: String,
    pub full_name: String,
    /// NFL team abbreviation (e.g., "KC").
    #[serde(default)]
    pub professional_team: String,
    /// Eligible positions. The first entry is the primary position.
    pub allowed_positions: Vec<Position>,
    #[serde(default)]
    pub bye_week: Option<u32>,
    /// Overall draft rank (lower is better).
    pub rank: u32,
    #[serde(default)]
    pub tier: u32,
    #[serde(default)]
    pub position_rank: u32,
    #[serde(default)]
    pub position_tier: u32,
    #[serde(default)]
    pub status: PlayerStatus,
}

impl Player {
    /// Build an undrafted player with the given rank and positions.
    pub fn new(id: &str, full_name: &str, allowed_positions: Vec<Position>, rank: u32) -> Self {
        Player {
            id: id.to_string(),
            full_name: full_name.to_string(),
            professional_team: String::new(),
            allowed_positions,
            bye_week: None,
            rank,
            tier: 0,
            position_rank: 0,
            position_tier: 0,
            status: PlayerStatus::default(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.status.availability == Availability::Available
    }

    pub fn is_owned_by(&self, team_id: &str) -> bool {
        self.status.owning_team_id.as_deref() == Some(team_id)
    }
}

// ---------------------------------------------------------------------------
// Player pool
// ---------------------------------------------------------------------------

/// The single owned collection of players, indexed by id.
///
/// Only the draft state machine and waiver application mutate it; strategies
/// see cloned snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "Vec<Player>", into = "Vec<Player>")]
pub struct PlayerPool {
    players: Vec<Player>,
    index: HashMap<String, usize>,
}

impl PlayerPool {
    /// Build a pool, rejecting duplicate ids, empty ids, and players with no
    /// eligible position.
    pub fn new(players: Vec<Player>) -> Result<Self, DraftError> {
        let mut index = HashMap::with_capacity(players.len());
        for (i, player) in players.iter().enumerate() {
            if player.id.is_empty() {
                return Err(DraftError::InvalidPlayerPool(format!(
                    "player at index {} has an empty id",
                    i
                )));
            }
            if player.allowed_positions.is_empty() {
                return Err(DraftError::InvalidPlayerPool(format!(
                    "player {} has no eligible positions",
                    player.id
                )));
            }
            if index.insert(player.id.clone(), i).is_some() {
                return Err(DraftError::InvalidPlayerPool(format!(
                    "duplicate player id {}",
                    player.id
                )));
            }
        }
        Ok(PlayerPool { players, index })
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, player_id: &str) -> Option<&Player> {
        self.index.get(player_id).map(|&i| &self.players[i])
    }

    pub(crate) fn get_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        match self.index.get(player_id) {
            Some(&i) => Some(&mut self.players[i]),
            None => None,
        }
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn available(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_available())
    }

    /// Players currently owned by a team, in pool order.
    pub fn owned_by<'a>(&'a self, team_id: &'a str) -> impl Iterator<Item = &'a Player> + 'a {
        self.players.iter().filter(move |p| p.is_owned_by(team_id))
    }

    /// The best-ranked available player. Ties keep pool order.
    pub fn best_available(&self) -> Option<&Player> {
        self.available()
            .fold(None, |best: Option<&Player>, p| match best {
                Some(b) if b.rank <= p.rank => Some(b),
                _ => Some(p),
            })
    }
}

impl TryFrom<Vec<Player>> for PlayerPool {
    type Error = DraftError;

    fn try_from(players: Vec<Player>) -> Result<Self, Self::Error> {
        PlayerPool::new(players)
    }
}

impl From<PlayerPool> for Vec<Player> {
    fn from(pool: PlayerPool) -> Self {
        pool.players
    }
}
