// Player and weekly score loading from CSV.
//
// players.csv: id, full_name, professional_team, positions ("RB|WR"),
// bye_week, rank, tier, position_rank, position_tier.
// weekly_scores.csv: player_id, season, week, standard_points, receptions.

use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::warn;

use gridiron_core::draft::pick::Position;
use gridiron_core::draft::player::Player;
use gridiron_core::lineup::{FIRST_WEEK, LAST_WEEK};
use gridiron_core::scoring::{StatLine, WeeklyScores};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One player's stat line for one week.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRow {
    pub player_id: String,
    pub season: u32,
    pub week: u32,
    pub line: StatLine,
}

/// Collect rows into an in-memory provider scored at `points_per_reception`.
pub fn to_weekly_scores(rows: &[ScoreRow], points_per_reception: f64) -> WeeklyScores {
    let mut scores = WeeklyScores::new(points_per_reception);
    for row in rows {
        scores.insert(&row.player_id, row.season, row.week, row.line);
    }
    scores
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawPlayer {
    id: String,
    #[serde(alias = "name")]
    full_name: String,
    #[serde(default, alias = "team")]
    professional_team: String,
    positions: String,
    #[serde(default)]
    bye_week: Option<u32>,
    rank: u32,
    #[serde(default)]
    tier: Option<u32>,
    #[serde(default)]
    position_rank: Option<u32>,
    #[serde(default)]
    position_tier: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawScore {
    player_id: String,
    season: u32,
    week: u32,
    #[serde(alias = "points")]
    standard_points: f64,
    #[serde(default)]
    receptions: Option<f64>,
}

// ---------------------------------------------------------------------------
// Reader-based loaders (private, enable testing without temp files)
// ---------------------------------------------------------------------------

fn parse_positions(raw: &str) -> Result<Vec<Position>, String> {
    let mut positions = Vec::new();
    for part in raw.split('|').map(str::trim).filter(|s| !s.is_empty()) {
        match Position::from_str_pos(part) {
            Some(pos) if !positions.contains(&pos) => positions.push(pos),
            Some(_) => {}
            None => return Err(format!("unknown position '{part}'")),
        }
    }
    if positions.is_empty() {
        return Err("no positions".into());
    }
    Ok(positions)
}

fn load_players_from_reader<R: Read>(rdr: R) -> Result<Vec<Player>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut players: Vec<Player> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();

    for result in reader.deserialize::<RawPlayer>() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipping malformed player row: {}", e);
                continue;
            }
        };
        let id = raw.id.trim().to_string();
        if id.is_empty() {
            warn!("skipping player '{}': empty id", raw.full_name.trim());
            continue;
        }
        let positions = match parse_positions(&raw.positions) {
            Ok(p) => p,
            Err(reason) => {
                warn!("skipping player '{}': {}", id, reason);
                continue;
            }
        };

        let mut player = Player::new(&id, raw.full_name.trim(), positions, raw.rank);
        player.professional_team = raw.professional_team.trim().to_string();
        player.bye_week = raw.bye_week;
        player.tier = raw.tier.unwrap_or_default();
        player.position_rank = raw.position_rank.unwrap_or_default();
        player.position_tier = raw.position_tier.unwrap_or_default();

        if let Some(&idx) = seen.get(&id) {
            warn!("duplicate player id '{}', using latest row", id);
            players[idx] = player;
        } else {
            seen.insert(id, players.len());
            players.push(player);
        }
    }
    Ok(players)
}

fn load_scores_from_reader<R: Read>(rdr: R) -> Result<Vec<ScoreRow>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut rows = Vec::new();
    for result in reader.deserialize::<RawScore>() {
        match result {
            Ok(raw) => {
                let receptions = raw.receptions.unwrap_or(0.0);
                if !raw.standard_points.is_finite() || !receptions.is_finite() {
                    warn!(
                        "skipping score for '{}' week {}: non-finite value",
                        raw.player_id.trim(),
                        raw.week
                    );
                    continue;
                }
                if !(FIRST_WEEK..=LAST_WEEK).contains(&raw.week) {
                    warn!(
                        "skipping score for '{}': week {} outside {}..={}",
                        raw.player_id.trim(),
                        raw.week,
                        FIRST_WEEK,
                        LAST_WEEK
                    );
                    continue;
                }
                rows.push(ScoreRow {
                    player_id: raw.player_id.trim().to_string(),
                    season: raw.season,
                    week: raw.week,
                    line: StatLine {
                        standard_points: raw.standard_points,
                        receptions,
                    },
                });
            }
            Err(e) => {
                warn!("skipping malformed score row: {}", e);
            }
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

/// Load the draftable player list. Fails if no valid row remains.
pub fn load_players(path: &Path) -> Result<Vec<Player>, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let players = load_players_from_reader(file).map_err(|e| DataError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    if players.is_empty() {
        return Err(DataError::Validation(format!(
            "{} produced zero valid players",
            path.display()
        )));
    }
    Ok(players)
}

/// Load weekly stat lines. An empty file is fine: every score is then missing.
pub fn load_weekly_scores(path: &Path) -> Result<Vec<ScoreRow>, DataError> {
    let file = std::fs::File::open(path).map_err(|e| DataError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    load_scores_from_reader(file).map_err(|e| DataError::Csv {
        path: path.display().to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
