// Head-to-head season: schedule, weekly results, standings, and playoffs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::draft::state::{DraftState, Team};
use crate::error::DraftError;
use crate::lineup;
use crate::scoring::ScoreProvider;

/// Opponent id used when a team has no game that week.
pub const BYE: &str = "BYE";
/// Placeholder for playoff slots decided by an earlier round.
pub const TBD: &str = "TBD";
/// First id handed to playoff matchups.
pub const PLAYOFF_MATCHUP_START_ID: u32 = 1000;

/// A single head-to-head game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub id: u32,
    pub week: u32,
    pub home_team_id: String,
    pub visitor_team_id: String,
    #[serde(default)]
    pub home_score: f64,
    #[serde(default)]
    pub visitor_score: f64,
    #[serde(default)]
    pub winning_team_id: Option<String>,
    #[serde(default)]
    pub is_playoff: bool,
    /// Playoff matchup whose winner becomes the home team.
    #[serde(default)]
    pub home_play_in_id: Option<u32>,
    /// Playoff matchup whose winner becomes the visitor.
    #[serde(default)]
    pub visitor_play_in_id: Option<u32>,
}

impl Matchup {
    fn new(id: u32, week: u32, home: &str, visitor: &str, is_playoff: bool) -> Self {
        Matchup {
            id,
            week,
            home_team_id: home.to_string(),
            visitor_team_id: visitor.to_string(),
            home_score: 0.0,
            visitor_score: 0.0,
            winning_team_id: None,
            is_playoff,
            home_play_in_id: None,
            visitor_play_in_id: None,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.home_team_id == BYE || self.visitor_team_id == BYE
    }

    pub fn is_undetermined(&self) -> bool {
        self.home_team_id == TBD || self.visitor_team_id == TBD
    }

    pub fn is_settled(&self) -> bool {
        self.winning_team_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// Regular season
// ---------------------------------------------------------------------------

/// Round-robin schedule for `weeks` weeks using the circle method.
///
/// With an odd number of teams one team per week plays `BYE`. Once every
/// pairing has been played the rotation starts over. Matchup ids start at 1.
pub fn round_robin_schedule(team_ids: &[String], weeks: u32) -> Vec<Matchup> {
    let mut ring: Vec<&str> = team_ids.iter().map(String::as_str).collect();
    if ring.len() < 2 {
        return Vec::new();
    }
    if ring.len() % 2 == 1 {
        ring.push(BYE);
    }
    let n = ring.len();
    let rounds = n - 1;

    let mut matchups = Vec::new();
    for week in 1..=weeks {
        let round = (week as usize - 1) % rounds;

        // Rotate everyone but the first seat `round` times.
        let mut seats = Vec::with_capacity(n);
        seats.push(ring[0]);
        for k in 0..rounds {
            seats.push(ring[1 + (k + rounds - round) % rounds]);
        }

        for i in 0..n / 2 {
            let (mut home, mut visitor) = (seats[i], seats[n - 1 - i]);
            if round % 2 == 1 {
                std::mem::swap(&mut home, &mut visitor);
            }
            if home == BYE {
                std::mem::swap(&mut home, &mut visitor);
            }
            let id = matchups.len() as u32 + 1;
            matchups.push(Matchup::new(id, week, home, visitor, false));
        }
    }
    matchups
}

/// Each team's best-possible lineup total for the week, using current rosters.
pub fn team_week_scores(
    state: &DraftState,
    provider: &dyn ScoreProvider,
    season: u32,
    week: u32,
) -> HashMap<String, f64> {
    state
        .teams
        .iter()
        .map(|team| {
            let roster = state.roster_of(&team.id);
            let result = lineup::best_possible_score(
                &roster,
                &state.settings.roster_slots,
                provider,
                season,
                week,
            );
            (team.id.clone(), result.total)
        })
        .collect()
}

/// Record scores and winners for the week's matchups.
///
/// The home team wins ties. A team facing `BYE` always wins. Matchups still
/// waiting on an earlier playoff round are left alone. Returns the number of
/// matchups settled.
pub fn settle_week(matchups: &mut [Matchup], week: u32, scores: &HashMap<String, f64>) -> usize {
    let mut settled = 0;
    for m in matchups.iter_mut().filter(|m| m.week == week) {
        if m.is_undetermined() {
            warn!("Matchup {} in week {} has undetermined teams", m.id, week);
            continue;
        }
        m.home_score = scores.get(&m.home_team_id).copied().unwrap_or(0.0);
        m.visitor_score = scores.get(&m.visitor_team_id).copied().unwrap_or(0.0);

        let winner = if m.visitor_team_id == BYE {
            &m.home_team_id
        } else if m.home_team_id == BYE || m.home_score < m.visitor_score {
            &m.visitor_team_id
        } else {
            &m.home_team_id
        };
        m.winning_team_id = Some(winner.clone());

        info!(
            "Week {}: {} ({:.2}) vs {} ({:.2}), winner {}",
            week, m.home_team_id, m.home_score, m.visitor_team_id, m.visitor_score, winner
        );
        settled += 1;
    }
    settled
}

/// A team's regular-season record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub rank: usize,
    pub team_id: String,
    pub wins: u32,
    pub losses: u32,
    pub points_for: f64,
    pub points_against: f64,
}

/// Rank teams by wins, then points scored. Only settled regular-season games
/// between two real teams count. Remaining ties keep `teams` order.
pub fn standings(teams: &[Team], matchups: &[Matchup]) -> Vec<Standing> {
    let mut table: Vec<Standing> = teams
        .iter()
        .map(|t| Standing {
            rank: 0,
            team_id: t.id.clone(),
            wins: 0,
            losses: 0,
            points_for: 0.0,
            points_against: 0.0,
        })
        .collect();

    for m in matchups
        .iter()
        .filter(|m| !m.is_playoff && !m.is_bye() && m.is_settled())
    {
        let winner = m.winning_team_id.as_deref();
        for (team_id, scored, allowed) in [
            (&m.home_team_id, m.home_score, m.visitor_score),
            (&m.visitor_team_id, m.visitor_score, m.home_score),
        ] {
            let Some(row) = table.iter_mut().find(|s| &s.team_id == team_id) else {
                continue;
            };
            row.points_for += scored;
            row.points_against += allowed;
            if winner == Some(team_id.as_str()) {
                row.wins += 1;
            } else {
                row.losses += 1;
            }
        }
    }

    table.sort_by(|a, b| {
        b.wins
            .cmp(&a.wins)
            .then(b.points_for.total_cmp(&a.points_for))
    });
    for (i, row) in table.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    table
}

// ---------------------------------------------------------------------------
// Playoffs
// ---------------------------------------------------------------------------

/// Build the full playoff bracket from seeds (best first).
///
/// The top `byes` seeds play `BYE` in the first round; seed `i` otherwise
/// meets seed `teams + byes + 1 - i`. Later rounds pair the winners of the
/// outermost earlier matchups and start as `TBD` with play-in references.
pub fn playoff_bracket(
    seeds: &[String],
    byes: usize,
    start_week: u32,
) -> Result<Vec<Matchup>, DraftError> {
    let teams = seeds.len();
    let slots = teams + byes;
    if teams < 2 || teams % 2 != 0 || byes % 2 != 0 || byes >= teams {
        return Err(DraftError::InvalidSettings {
            field: "playoff_teams".into(),
            message: format!(
                "{} teams with {} byes cannot form a bracket (both must be even, byes fewer than teams)",
                teams, byes
            ),
        });
    }
    if !(slots / 2).is_power_of_two() {
        return Err(DraftError::InvalidSettings {
            field: "playoff_byes".into(),
            message: format!(
                "{} teams with {} byes leaves {} first-round games, which does not halve evenly",
                teams,
                byes,
                slots / 2
            ),
        });
    }

    let mut bracket: Vec<Matchup> = Vec::new();
    for i in 0..slots / 2 {
        let id = PLAYOFF_MATCHUP_START_ID + bracket.len() as u32;
        let home = &seeds[i];
        let visitor = if i < byes { BYE } else { seeds[slots - 1 - i].as_str() };
        bracket.push(Matchup::new(id, start_week, home, visitor, true));
    }

    let mut start = 0;
    let mut end = bracket.len() - 1;
    let mut week = start_week;
    while start != end {
        week += 1;
        let games = (end - start + 1) / 2;
        for i in 0..games {
            let home_ref = bracket[start + i].id;
            let visitor_ref = bracket[end - i].id;
            let id = PLAYOFF_MATCHUP_START_ID + bracket.len() as u32;
            let mut m = Matchup::new(id, week, TBD, TBD, true);
            m.home_play_in_id = Some(home_ref);
            m.visitor_play_in_id = Some(visitor_ref);
            bracket.push(m);
        }
        start = end + 1;
        end = bracket.len() - 1;
    }

    Ok(bracket)
}

/// Fill the week's playoff matchups with the winners of their play-in games.
/// Returns how many matchups were filled.
pub fn advance_playoffs(matchups: &mut [Matchup], week: u32) -> usize {
    let winners: HashMap<u32, String> = matchups
        .iter()
        .filter_map(|m| m.winning_team_id.clone().map(|w| (m.id, w)))
        .collect();

    let mut filled = 0;
    for m in matchups
        .iter_mut()
        .filter(|m| m.is_playoff && m.week == week)
    {
        let (Some(home_ref), Some(visitor_ref)) = (m.home_play_in_id, m.visitor_play_in_id) else {
            continue;
        };
        match (winners.get(&home_ref), winners.get(&visitor_ref)) {
            (Some(home), Some(visitor)) => {
                m.home_team_id = home.clone();
                m.visitor_team_id = visitor.clone();
                filled += 1;
            }
            _ => warn!(
                "Playoff matchup {} waits on unsettled matchups {} and {}",
                m.id, home_ref, visitor_ref
            ),
        }
    }
    filled
}

/// Winner of the final playoff game, once it has been played.
pub fn champion(matchups: &[Matchup]) -> Option<&str> {
    matchups
        .iter()
        .filter(|m| m.is_playoff)
        .max_by_key(|m| m.id)
        .and_then(|m| m.winning_team_id.as_deref())
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub team_id: String,
    pub team_name: String,
    pub season_points: f64,
}

/// Best-possible season score per team, highest first.
pub fn season_leaderboard(
    state: &DraftState,
    provider: &dyn ScoreProvider,
    season: u32,
) -> Vec<LeaderboardEntry> {
    let mut board: Vec<LeaderboardEntry> = state
        .teams
        .iter()
        .map(|team| {
            let roster = state.roster_of(&team.id);
            let result = lineup::best_possible_season(
                &roster,
                &state.settings.roster_slots,
                provider,
                season,
            );
            LeaderboardEntry {
                team_id: team.id.clone(),
                team_name: team.name.clone(),
                season_points: result.total,
            }
        })
        .collect();
    board.sort_by(|a, b| b.season_points.total_cmp(&a.season_points));
    board
}
