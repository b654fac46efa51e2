// Best-possible lineup computation.
//
// Greedy allocation: slots are filled most-restrictive first, each taking the
// highest-scoring unused eligible player. This is not a maximum-weight
// matching; historical scores depend on the exact greedy order.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::draft::player::Player;
use crate::draft::roster::{self, RosterSlot};
use crate::scoring::ScoreProvider;

/// First and last week of the fantasy season.
pub const FIRST_WEEK: u32 = 1;
pub const LAST_WEEK: u32 = 17;

/// The outcome of filling a slot layout for one week.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupResult {
    pub total: f64,
    /// Points contributed by each player that was slotted in.
    pub contributions: HashMap<String, f64>,
    /// The slot layout with `assigned_player_id` filled in.
    pub slots: Vec<RosterSlot>,
}

/// Season aggregation of weekly lineups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonLineup {
    pub total: f64,
    /// Weekly optimum totals, indexed from `FIRST_WEEK`.
    pub weekly_totals: Vec<f64>,
    /// Per-player sum over the weeks the player was slotted in.
    pub contributions: HashMap<String, f64>,
}

/// Assign players to slots greedily.
///
/// Bench slots never score and stay empty. A player for whom `points`
/// returns `None` is skipped as a candidate; ties keep the first player
/// encountered.
pub fn best_lineup<F>(players: &[&Player], slots: &[RosterSlot], points: F) -> LineupResult
where
    F: Fn(&Player) -> Option<f64>,
{
    let mut filled: Vec<RosterSlot> = slots.to_vec();
    for slot in &mut filled {
        slot.assigned_player_id = None;
    }

    // Stable: equally restrictive slots keep their configured order.
    let mut order: Vec<usize> = (0..filled.len()).collect();
    order.sort_by_key(|&i| filled[i].accepted_count());

    let mut used: HashSet<usize> = HashSet::new();
    let mut total = 0.0;
    let mut contributions = HashMap::new();

    for slot_idx in order {
        let slot = &filled[slot_idx];
        if slot.is_bench() {
            continue;
        }

        let mut best: Option<(usize, f64)> = None;
        let mut best_score = f64::NEG_INFINITY;
        for (i, player) in players.iter().enumerate() {
            if used.contains(&i) || !roster::is_eligible(player, slot) {
                continue;
            }
            let Some(score) = points(player) else {
                continue;
            };
            if score > best_score {
                best_score = score;
                best = Some((i, score));
            }
        }

        if let Some((i, score)) = best {
            used.insert(i);
            total += score;
            contributions.insert(players[i].id.clone(), score);
            filled[slot_idx].assigned_player_id = Some(players[i].id.clone());
        }
    }

    LineupResult {
        total,
        contributions,
        slots: filled,
    }
}

/// Best lineup for one week using a scoring provider.
pub fn best_possible_score(
    players: &[&Player],
    slots: &[RosterSlot],
    provider: &dyn ScoreProvider,
    season: u32,
    week: u32,
) -> LineupResult {
    best_lineup(players, slots, |p| provider.weekly_points(&p.id, season, week))
}

/// Sum of independently computed weekly optima over the whole season.
pub fn best_possible_season(
    players: &[&Player],
    slots: &[RosterSlot],
    provider: &dyn ScoreProvider,
    season: u32,
) -> SeasonLineup {
    let mut total = 0.0;
    let mut weekly_totals = Vec::with_capacity((LAST_WEEK - FIRST_WEEK + 1) as usize);
    let mut contributions: HashMap<String, f64> = HashMap::new();

    for week in FIRST_WEEK..=LAST_WEEK {
        let result = best_possible_score(players, slots, provider, season, week);
        total += result.total;
        weekly_totals.push(result.total);
        for (id, points) in result.contributions {
            *contributions.entry(id).or_insert(0.0) += points;
        }
    }

    SeasonLineup {
        total,
        weekly_totals,
        contributions,
    }
}
