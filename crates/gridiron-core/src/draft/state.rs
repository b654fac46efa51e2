// Draft state: league settings, teams, the player pool, and the pick pointer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::pick::DraftPick;
use super::player::{Availability, Player, PlayerPool};
use super::roster::{self, RosterSlot};
use crate::error::DraftError;

/// League-wide settings fixed for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSettings {
    pub num_teams: usize,
    pub total_rounds: u32,
    pub is_snake_draft: bool,
    /// Points awarded per reception.
    #[serde(default)]
    pub points_per_reception: f64,
    pub year: u32,
    /// Canonical slot layout, identical for every team.
    pub roster_slots: Vec<RosterSlot>,
}

impl LeagueSettings {
    /// Total number of turns in the draft.
    pub fn total_picks(&self) -> u32 {
        self.total_rounds * self.num_teams as u32
    }

    pub fn validate(&self) -> Result<(), DraftError> {
        if self.num_teams == 0 {
            return Err(DraftError::InvalidSettings {
                field: "num_teams".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.total_rounds == 0 {
            return Err(DraftError::InvalidSettings {
                field: "total_rounds".into(),
                message: "must be greater than 0".into(),
            });
        }
        Ok(())
    }
}

/// A fantasy team (one bot).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: String,
    /// Zero-based draft slot.
    pub draft_order: usize,
    /// Waiver priority; lower claims first. Zero means unset.
    #[serde(default)]
    pub waiver_priority: u32,
    /// Remaining FAAB budget.
    #[serde(default)]
    pub waiver_budget: u32,
}

impl Team {
    pub fn new(id: &str, name: &str, draft_order: usize) -> Self {
        Team {
            id: id.to_string(),
            name: name.to_string(),
            owner: String::new(),
            draft_order,
            waiver_priority: 0,
            waiver_budget: 0,
        }
    }
}

/// Map a 1-based pick number to the index of the team on the clock.
///
/// In a snake draft odd (0-indexed) rounds run in reverse.
pub fn pick_to_team_index(pick: u32, num_teams: usize, is_snake: bool) -> usize {
    if num_teams == 0 {
        return 0;
    }
    let i = pick.saturating_sub(1) as usize;
    let round = i / num_teams;
    let pos = i % num_teams;
    if is_snake && round % 2 == 1 {
        num_teams - 1 - pos
    } else {
        pos
    }
}

// ---------------------------------------------------------------------------
// Draft state
// ---------------------------------------------------------------------------

/// The complete state of a league: draft progress and player ownership.
///
/// After the draft completes the same state carries the season's waiver
/// activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftState {
    pub settings: LeagueSettings,
    /// Teams sorted by draft order.
    pub teams: Vec<Team>,
    players: PlayerPool,
    /// Next pick number (1-based).
    current_pick: u32,
    /// Team on the clock, `None` once the draft is complete.
    drafting_team_id: Option<String>,
    /// Every turn taken so far, including skipped ones.
    picks: Vec<DraftPick>,
}

impl DraftState {
    /// Create a fresh draft. Teams are sorted by `draft_order`, which must be
    /// unique.
    pub fn new(
        settings: LeagueSettings,
        mut teams: Vec<Team>,
        players: PlayerPool,
    ) -> Result<Self, DraftError> {
        settings.validate()?;

        if teams.len() != settings.num_teams {
            return Err(DraftError::InvalidSettings {
                field: "teams".into(),
                message: format!(
                    "expected {} teams, got {}",
                    settings.num_teams,
                    teams.len()
                ),
            });
        }

        let mut ids = HashSet::new();
        let mut orders = HashSet::new();
        for team in &teams {
            if !ids.insert(team.id.as_str()) {
                return Err(DraftError::InvalidSettings {
                    field: "teams".into(),
                    message: format!("duplicate team id {}", team.id),
                });
            }
            if !orders.insert(team.draft_order) {
                return Err(DraftError::InvalidSettings {
                    field: "teams".into(),
                    message: format!("duplicate draft order {}", team.draft_order),
                });
            }
        }

        teams.sort_by_key(|t| t.draft_order);

        let mut state = DraftState {
            settings,
            teams,
            players,
            current_pick: 1,
            drafting_team_id: None,
            picks: Vec::new(),
        };
        state.refresh_drafting_team();
        Ok(state)
    }

    pub fn current_pick(&self) -> u32 {
        self.current_pick
    }

    pub fn drafting_team_id(&self) -> Option<&str> {
        self.drafting_team_id.as_deref()
    }

    pub fn picks(&self) -> &[DraftPick] {
        &self.picks
    }

    pub fn players(&self) -> &PlayerPool {
        &self.players
    }

    pub(crate) fn players_mut(&mut self) -> &mut PlayerPool {
        &mut self.players
    }

    pub fn total_picks(&self) -> u32 {
        self.settings.total_picks()
    }

    pub fn is_complete(&self) -> bool {
        self.current_pick > self.total_picks()
    }

    /// The team on the clock, or `None` once the draft is complete.
    pub fn current_team(&self) -> Option<&Team> {
        if self.is_complete() {
            return None;
        }
        let idx = pick_to_team_index(
            self.current_pick,
            self.teams.len(),
            self.settings.is_snake_draft,
        );
        self.teams.get(idx)
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn team_mut(&mut self, team_id: &str) -> Option<&mut Team> {
        self.teams.iter_mut().find(|t| t.id == team_id)
    }

    /// Players currently owned by a team.
    pub fn roster_of(&self, team_id: &str) -> Vec<&Player> {
        self.players
            .iter()
            .filter(|p| p.is_owned_by(team_id))
            .collect()
    }

    /// Apply the current team's pick.
    ///
    /// An empty or unknown `player_id` records a skipped turn and advances
    /// the draft. Drafting a player that is not `Available` fails with
    /// `AlreadyDrafted` and leaves the state untouched.
    pub fn apply_pick(&mut self, player_id: &str) -> Result<DraftPick, DraftError> {
        self.apply_pick_inner(player_id, false)
    }

    /// Draft the best-ranked available player for the current team. Skips
    /// the turn when nobody is left.
    pub fn apply_auto_pick(&mut self) -> Result<DraftPick, DraftError> {
        let player_id = self
            .players
            .best_available()
            .map(|p| p.id.clone())
            .unwrap_or_default();
        self.apply_pick_inner(&player_id, true)
    }

    fn apply_pick_inner(&mut self, player_id: &str, auto: bool) -> Result<DraftPick, DraftError> {
        let team_id = match self.current_team() {
            Some(team) => team.id.clone(),
            None => return Err(DraftError::DraftComplete),
        };
        let pick_number = self.current_pick;
        let player_id = player_id.trim();

        let availability = self.players.get(player_id).map(|p| p.status.availability);

        let pick = match availability {
            Some(availability) if availability != Availability::Available => {
                return Err(DraftError::AlreadyDrafted {
                    player_id: player_id.to_string(),
                    availability,
                });
            }
            Some(_) => {
                let Some(player) = self.players.get_mut(player_id) else {
                    return Err(DraftError::InvalidPlayerPool(player_id.to_string()));
                };
                player.status.availability = Availability::Drafted;
                player.status.pick_chosen = Some(pick_number);
                player.status.owning_team_id = Some(team_id.clone());

                info!(
                    "Pick {}: {} drafted {} ({}){}",
                    pick_number,
                    team_id,
                    player.full_name,
                    player.id,
                    if auto { " [auto]" } else { "" }
                );

                DraftPick {
                    pick_number,
                    team_id,
                    player_id: Some(player.id.clone()),
                    player_name: player.full_name.clone(),
                    position: roster::primary_position(player),
                    auto_drafted: auto,
                }
            }
            None => {
                if player_id.is_empty() {
                    info!("Pick {}: {} made no selection", pick_number, team_id);
                } else {
                    warn!(
                        "Pick {}: {} selected unknown player '{}', skipping turn",
                        pick_number, team_id, player_id
                    );
                }
                DraftPick {
                    pick_number,
                    team_id,
                    player_id: None,
                    player_name: String::new(),
                    position: None,
                    auto_drafted: false,
                }
            }
        };

        self.picks.push(pick.clone());
        self.current_pick += 1;
        self.refresh_drafting_team();
        Ok(pick)
    }

    fn refresh_drafting_team(&mut self) {
        self.drafting_team_id = self.current_team().map(|t| t.id.clone());
    }

    /// Rebuild draft progress by replaying persisted picks from scratch.
    ///
    /// Every player is reset to `Available` first. A persisted pick whose
    /// number does not match the replay position is logged; replay order
    /// wins. A pick made by a team outside this league fails with
    /// `UnknownTeam`.
    pub fn restore_from_picks(&mut self, picks: &[DraftPick]) -> Result<(), DraftError> {
        for player in self.players.iter_mut() {
            player.status = Default::default();
        }
        self.picks.clear();
        self.current_pick = 1;
        self.refresh_drafting_team();

        for pick in picks {
            if self.team(&pick.team_id).is_none() {
                return Err(DraftError::UnknownTeam(pick.team_id.clone()));
            }
            if pick.pick_number != self.current_pick {
                warn!(
                    "restored pick number {} does not match replay position {}",
                    pick.pick_number, self.current_pick
                );
            }
            if let Some(team) = self.current_team() {
                if team.id != pick.team_id {
                    warn!(
                        "restored pick {} belongs to {}, expected {}",
                        pick.pick_number, pick.team_id, team.id
                    );
                }
            }
            let player_id = pick.player_id.as_deref().unwrap_or("");
            self.apply_pick_inner(player_id, pick.auto_drafted)?;
        }

        debug!("restored {} picks, next pick {}", picks.len(), self.current_pick);
        Ok(())
    }

    /// An isolated copy of the visible state, as seen by `team_id`.
    pub fn snapshot(&self, team_id: &str, week: Option<u32>) -> GameSnapshot {
        GameSnapshot {
            team_id: team_id.to_string(),
            week,
            settings: self.settings.clone(),
            teams: self.teams.clone(),
            players: self.players.clone(),
            current_pick: self.current_pick,
            drafting_team_id: self.drafting_team_id.clone(),
            picks: self.picks.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshot handed to strategies
// ---------------------------------------------------------------------------

/// A deep copy of league state handed to a strategy. Mutating it has no
/// effect on the draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// The team the strategy is acting for.
    pub team_id: String,
    /// Current week during the season, `None` during the draft.
    #[serde(default)]
    pub week: Option<u32>,
    pub settings: LeagueSettings,
    pub teams: Vec<Team>,
    pub players: PlayerPool,
    pub current_pick: u32,
    #[serde(default)]
    pub drafting_team_id: Option<String>,
    #[serde(default)]
    pub picks: Vec<DraftPick>,
}

impl GameSnapshot {
    pub fn my_team(&self) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == self.team_id)
    }

    pub fn my_players(&self) -> Vec<&Player> {
        self.players.owned_by(&self.team_id).collect()
    }

    pub fn available_players(&self) -> Vec<&Player> {
        self.players.available().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::pick::Position;

    fn test_settings(num_teams: usize, total_rounds: u32) -> LeagueSettings {
        LeagueSettings {
            num_teams,
            total_rounds,
            is_snake_draft: true,
            points_per_reception: 1.0,
            year: 2024,
            roster_slots: vec![RosterSlot::new("QB", vec![Position::Quarterback])],
        }
    }

    fn test_teams(n: usize) -> Vec<Team> {
        (0..n)
            .map(|i| Team::new(&format!("team_{}", i + 1), &format!("Team {}", i + 1), i))
            .collect()
    }

    fn test_pool(n: usize) -> PlayerPool {
        let players = (0..n)
            .map(|i| {
                Player::new(
                    &format!("p{}", i + 1),
                    &format!("Player {}", i + 1),
                    vec![Position::RunningBack],
                    (i + 1) as u32,
                )
            })
            .collect();
        PlayerPool::new(players).unwrap()
    }

    fn test_state(num_teams: usize, rounds: u32, players: usize) -> DraftState {
        DraftState::new(test_settings(num_teams, rounds), test_teams(num_teams), test_pool(players))
            .unwrap()
    }

    // --- Turn order ---

    #[test]
    fn snake_order_four_teams() {
        let order: Vec<usize> = (1..=12).map(|p| pick_to_team_index(p, 4, true)).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 3, 2, 1, 0, 0, 1, 2, 3]);
    }

    #[test]
    fn standard_order_is_periodic() {
        for n in 1..=12usize {
            for pick in 1..=(n as u32 * 5) {
                let idx = pick_to_team_index(pick, n, false);
                assert_eq!(idx, (pick as usize - 1) % n);
            }
        }
    }

    #[test]
    fn snake_order_single_team() {
        for pick in 1..=5 {
            assert_eq!(pick_to_team_index(pick, 1, true), 0);
        }
    }

    // --- Construction ---

    #[test]
    fn new_state_starts_at_pick_one() {
        let state = test_state(4, 2, 10);
        assert_eq!(state.current_pick(), 1);
        assert_eq!(state.drafting_team_id(), Some("team_1"));
        assert_eq!(state.total_picks(), 8);
        assert!(!state.is_complete());
    }

    #[test]
    fn new_state_sorts_by_draft_order() {
        let mut teams = test_teams(3);
        teams.reverse();
        let state = DraftState::new(test_settings(3, 1), teams, test_pool(3)).unwrap();
        assert_eq!(state.teams[0].id, "team_1");
        assert_eq!(state.teams[2].id, "team_3");
    }

    #[test]
    fn new_state_rejects_team_count_mismatch() {
        let err = DraftState::new(test_settings(4, 1), test_teams(3), test_pool(3)).unwrap_err();
        assert!(matches!(err, DraftError::InvalidSettings { .. }));
    }

    #[test]
    fn new_state_rejects_zero_rounds() {
        let err = DraftState::new(test_settings(2, 0), test_teams(2), test_pool(3)).unwrap_err();
        assert!(matches!(err, DraftError::InvalidSettings { ref field, .. } if field == "total_rounds"));
    }

    #[test]
    fn new_state_rejects_duplicate_draft_order() {
        let mut teams = test_teams(2);
        teams[1].draft_order = 0;
        assert!(DraftState::new(test_settings(2, 1), teams, test_pool(3)).is_err());
    }

    // --- Picks ---

    #[test]
    fn apply_pick_marks_player() {
        let mut state = test_state(2, 2, 6);
        let pick = state.apply_pick("p3").unwrap();
        assert_eq!(pick.pick_number, 1);
        assert_eq!(pick.team_id, "team_1");
        assert_eq!(pick.position, Some(Position::RunningBack));

        let p = state.players().get("p3").unwrap();
        assert_eq!(p.status.availability, Availability::Drafted);
        assert_eq!(p.status.pick_chosen, Some(1));
        assert_eq!(p.status.owning_team_id.as_deref(), Some("team_1"));
        assert_eq!(state.current_pick(), 2);
        assert_eq!(state.drafting_team_id(), Some("team_2"));
    }

    #[test]
    fn double_draft_fails_without_mutation() {
        let mut state = test_state(2, 2, 6);
        state.apply_pick("p1").unwrap();

        let err = state.apply_pick("p1").unwrap_err();
        assert!(matches!(err, DraftError::AlreadyDrafted { ref player_id, .. } if player_id == "p1"));

        let p = state.players().get("p1").unwrap();
        assert_eq!(p.status.pick_chosen, Some(1));
        assert_eq!(p.status.owning_team_id.as_deref(), Some("team_1"));
        assert_eq!(state.current_pick(), 2);
        assert_eq!(state.picks().len(), 1);
    }

    #[test]
    fn empty_pick_skips_turn() {
        let mut state = test_state(2, 1, 4);
        let pick = state.apply_pick("").unwrap();
        assert!(pick.is_skip());
        assert_eq!(state.current_pick(), 2);
        assert!(state.players().iter().all(|p| p.is_available()));
    }

    #[test]
    fn unknown_pick_skips_turn() {
        let mut state = test_state(2, 1, 4);
        let pick = state.apply_pick("nobody").unwrap();
        assert!(pick.is_skip());
        assert_eq!(state.drafting_team_id(), Some("team_2"));
    }

    #[test]
    fn draft_completes_after_all_turns() {
        let mut state = test_state(2, 2, 10);
        for _ in 0..4 {
            state.apply_pick("").unwrap();
        }
        assert!(state.is_complete());
        assert_eq!(state.current_pick(), 5);
        assert!(state.current_team().is_none());
        assert!(state.drafting_team_id().is_none());
        assert!(matches!(state.apply_pick("p1"), Err(DraftError::DraftComplete)));
    }

    #[test]
    fn auto_pick_takes_best_rank() {
        let mut state = test_state(2, 2, 4);
        state.apply_pick("p1").unwrap();
        let pick = state.apply_auto_pick().unwrap();
        assert_eq!(pick.player_id.as_deref(), Some("p2"));
        assert!(pick.auto_drafted);
    }

    #[test]
    fn auto_pick_with_empty_pool_skips() {
        let mut state = test_state(2, 2, 1);
        state.apply_pick("p1").unwrap();
        let pick = state.apply_auto_pick().unwrap();
        assert!(pick.is_skip());
        assert_eq!(state.current_pick(), 3);
    }

    #[test]
    fn snake_turns_follow_order() {
        let mut state = test_state(3, 2, 10);
        let mut order = Vec::new();
        while let Some(team) = state.current_team() {
            order.push(team.id.clone());
            state.apply_auto_pick().unwrap();
        }
        assert_eq!(
            order,
            vec!["team_1", "team_2", "team_3", "team_3", "team_2", "team_1"]
        );
        assert_eq!(state.roster_of("team_1").len(), 2);
    }

    #[test]
    fn roster_outlives_team_id() {
        let mut state = test_state(2, 1, 4);
        state.apply_pick("p3").unwrap();
        let roster = state.roster_of(&format!("team_{}", 1));
        let ids: Vec<&str> = roster.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p3"]);
    }

    // --- Restore ---

    #[test]
    fn restore_from_picks() {
        let mut state = test_state(2, 2, 6);
        state.apply_pick("p2").unwrap();
        state.apply_pick("").unwrap();
        state.apply_pick("p5").unwrap();
        let saved = state.picks().to_vec();

        let mut fresh = test_state(2, 2, 6);
        fresh.restore_from_picks(&saved).unwrap();
        assert_eq!(fresh.current_pick(), 4);
        assert_eq!(fresh.picks(), state.picks());
        assert_eq!(
            fresh.players().get("p5").unwrap().status.owning_team_id.as_deref(),
            Some("team_2")
        );
    }

    #[test]
    fn restore_from_picks_resets_previous_state() {
        let mut state = test_state(2, 2, 6);
        state.apply_pick("p1").unwrap();
        state.apply_pick("p2").unwrap();

        state.restore_from_picks(&[]).unwrap();
        assert_eq!(state.current_pick(), 1);
        assert!(state.players().iter().all(|p| p.is_available()));
        assert!(state.picks().is_empty());
    }

    #[test]
    fn restore_rejects_pick_from_unknown_team() {
        let mut state = test_state(2, 2, 6);
        state.apply_pick("p1").unwrap();
        let mut saved = state.picks().to_vec();
        saved[0].team_id = "team_9".to_string();

        let mut fresh = test_state(2, 2, 6);
        let err = fresh.restore_from_picks(&saved).unwrap_err();
        assert!(matches!(err, DraftError::UnknownTeam(ref id) if id == "team_9"));
    }

    // --- Snapshot ---

    #[test]
    fn snapshot_is_isolated() {
        let state = test_state(2, 1, 3);
        let mut snap = state.snapshot("team_1", None);
        snap.teams.clear();
        snap.current_pick = 99;
        assert_eq!(state.teams.len(), 2);
        assert_eq!(state.current_pick(), 1);
    }

    #[test]
    fn snapshot_views() {
        let mut state = test_state(2, 1, 3);
        state.apply_pick("p1").unwrap();
        let snap = state.snapshot("team_1", Some(3));
        assert_eq!(snap.my_team().unwrap().name, "Team 1");
        assert_eq!(snap.my_players().len(), 1);
        assert_eq!(snap.available_players().len(), 2);
        assert_eq!(snap.week, Some(3));
    }
}
