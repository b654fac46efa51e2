// Scoring data provider interface and an in-memory implementation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::lineup::{FIRST_WEEK, LAST_WEEK};

/// Supplies fantasy points keyed by a stable player id.
///
/// `None` means no data (bye week, injury, unknown player). Callers treat it
/// as "not a candidate this week", never as an error.
pub trait ScoreProvider: Send + Sync {
    fn weekly_points(&self, player_id: &str, season: u32, week: u32) -> Option<f64>;

    /// Season total. Defaults to the sum of the weeks that have data, or
    /// `None` when no week does.
    fn seasonal_points(&self, player_id: &str, season: u32) -> Option<f64> {
        let mut total = None;
        for week in FIRST_WEEK..=LAST_WEEK {
            if let Some(points) = self.weekly_points(player_id, season, week) {
                *total.get_or_insert(0.0) += points;
            }
        }
        total
    }
}

/// Raw weekly stat line for one player.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    /// Points before the per-reception bonus.
    pub standard_points: f64,
    #[serde(default)]
    pub receptions: f64,
}

impl StatLine {
    pub fn total(&self, points_per_reception: f64) -> f64 {
        self.standard_points + points_per_reception * self.receptions
    }
}

/// Weekly stat lines held in memory, scored with a fixed PPR value.
#[derive(Debug, Clone, Default)]
pub struct WeeklyScores {
    points_per_reception: f64,
    lines: HashMap<(String, u32, u32), StatLine>,
}

impl WeeklyScores {
    pub fn new(points_per_reception: f64) -> Self {
        WeeklyScores {
            points_per_reception,
            lines: HashMap::new(),
        }
    }

    pub fn insert(&mut self, player_id: &str, season: u32, week: u32, line: StatLine) {
        self.lines.insert((player_id.to_string(), season, week), line);
    }

    /// Record a line with no reception component.
    pub fn insert_points(&mut self, player_id: &str, season: u32, week: u32, points: f64) {
        self.insert(
            player_id,
            season,
            week,
            StatLine {
                standard_points: points,
                receptions: 0.0,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl ScoreProvider for WeeklyScores {
    fn weekly_points(&self, player_id: &str, season: u32, week: u32) -> Option<f64> {
        self.lines
            .get(&(player_id.to_string(), season, week))
            .map(|line| line.total(self.points_per_reception))
    }
}
