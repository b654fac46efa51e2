// SQLite persistence layer for the league, the draft, and the season.

use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

use gridiron_core::draft::pick::{DraftPick, Position};
use gridiron_core::draft::player::{Availability, Player, PlayerPool, PlayerStatus};
use gridiron_core::draft::state::{LeagueSettings, Team};
use gridiron_core::scoring::ScoreProvider;
use gridiron_core::season::Matchup;
use gridiron_core::store::{DraftStatus, DraftStore};

use crate::data::ScoreRow;

/// Errors surfaced through the `DraftStore` interface.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("stored JSON is invalid: {0}")]
    Json(#[from] serde_json::Error),
}

/// SQLite-backed persistence for players, teams, draft picks, weekly scores,
/// matchups, and key-value game state.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;
             PRAGMA foreign_keys = ON;",
        )
        .context("failed to set database pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS players (
                id                TEXT PRIMARY KEY,
                full_name         TEXT NOT NULL,
                professional_team TEXT NOT NULL DEFAULT '',
                allowed_positions TEXT NOT NULL,
                bye_week          INTEGER,
                rank              INTEGER NOT NULL,
                tier              INTEGER NOT NULL DEFAULT 0,
                position_rank     INTEGER NOT NULL DEFAULT 0,
                position_tier     INTEGER NOT NULL DEFAULT 0,
                availability      TEXT NOT NULL DEFAULT 'AVAILABLE',
                pick_chosen       INTEGER,
                owning_team_id    TEXT
            );

            CREATE TABLE IF NOT EXISTS fantasy_teams (
                id              TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                owner           TEXT NOT NULL DEFAULT '',
                draft_order     INTEGER NOT NULL,
                waiver_priority INTEGER NOT NULL DEFAULT 0,
                waiver_budget   INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS draft_picks (
                pick_number  INTEGER NOT NULL,
                draft_id     TEXT NOT NULL,
                team_id      TEXT NOT NULL,
                player_id    TEXT,
                player_name  TEXT NOT NULL DEFAULT '',
                position     TEXT,
                auto_drafted INTEGER NOT NULL DEFAULT 0,
                timestamp    TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
                PRIMARY KEY (pick_number, draft_id)
            );

            CREATE TABLE IF NOT EXISTS game_state (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS weekly_scores (
                player_id TEXT NOT NULL,
                season    INTEGER NOT NULL,
                week      INTEGER NOT NULL,
                points    REAL NOT NULL,
                PRIMARY KEY (player_id, season, week)
            );

            CREATE TABLE IF NOT EXISTS matchups (
                season             INTEGER NOT NULL,
                id                 INTEGER NOT NULL,
                week               INTEGER NOT NULL,
                home_team_id       TEXT NOT NULL,
                visitor_team_id    TEXT NOT NULL,
                home_score         REAL NOT NULL DEFAULT 0,
                visitor_score      REAL NOT NULL DEFAULT 0,
                winning_team_id    TEXT,
                is_playoff         INTEGER NOT NULL DEFAULT 0,
                home_play_in_id    INTEGER,
                visitor_play_in_id INTEGER,
                PRIMARY KEY (season, id)
            );

            CREATE INDEX IF NOT EXISTS idx_draft_picks_draft_id ON draft_picks(draft_id);
            ",
        )
        .context("failed to create database schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock).
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("database mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Key-value game state
    // ------------------------------------------------------------------

    fn save_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), DbError> {
        let json_str = serde_json::to_string(value)?;
        self.conn().execute(
            "INSERT OR REPLACE INTO game_state (key, value) VALUES (?1, ?2)",
            params![key, json_str],
        )?;
        Ok(())
    }

    fn load_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>, DbError> {
        let json_str: Option<String> = self
            .conn()
            .query_row(
                "SELECT value FROM game_state WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        match json_str {
            Some(s) => Ok(Some(serde_json::from_str(&s)?)),
            None => Ok(None),
        }
    }

    const DRAFT_ID_KEY: &'static str = "current_draft_id";
    const DRAFT_STATUS_KEY: &'static str = "draft_status";
    const LEAGUE_SETTINGS_KEY: &'static str = "league_settings";

    /// Retrieve the stored draft ID. Returns `None` if no draft has started.
    pub fn get_draft_id(&self) -> Result<Option<String>> {
        self.load_json(Self::DRAFT_ID_KEY)
            .context("failed to load draft id")
    }

    pub fn set_draft_id(&self, draft_id: &str) -> Result<()> {
        self.save_json(Self::DRAFT_ID_KEY, &draft_id)
            .context("failed to save draft id")
    }

    pub fn save_league_settings(&self, settings: &LeagueSettings) -> Result<()> {
        self.save_json(Self::LEAGUE_SETTINGS_KEY, settings)
            .context("failed to save league settings")
    }

    /// Generate a new unique draft ID based on the current UTC timestamp.
    ///
    /// Format: `draft_YYYYMMDD_HHMMSS_SSS` (e.g. `draft_20240905_143022_123`).
    pub fn generate_draft_id() -> String {
        let now = chrono::Utc::now();
        now.format("draft_%Y%m%d_%H%M%S_%3f").to_string()
    }

    /// Return the number of draft picks recorded for the given `draft_id`.
    pub fn pick_count(&self, draft_id: &str) -> Result<usize> {
        let count: i64 = self
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM draft_picks WHERE draft_id = ?1",
                params![draft_id],
                |row| row.get(0),
            )
            .context("failed to count draft picks")?;
        Ok(count as usize)
    }

    /// Forget the current draft: picks, game state, matchups, teams, and
    /// player ownership. Player and score data are preserved; the next draft
    /// saves its own teams.
    pub fn clear_draft(&self) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin transaction")?;
        tx.execute("DELETE FROM draft_picks", [])
            .context("failed to delete draft picks")?;
        tx.execute("DELETE FROM game_state", [])
            .context("failed to delete game state")?;
        tx.execute("DELETE FROM matchups", [])
            .context("failed to delete matchups")?;
        tx.execute(
            "UPDATE players SET availability = 'AVAILABLE', pick_chosen = NULL, owning_team_id = NULL",
            [],
        )
        .context("failed to reset player ownership")?;
        tx.execute("DELETE FROM fantasy_teams", [])
            .context("failed to delete teams")?;
        tx.commit().context("failed to commit clear_draft")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Players and teams
    // ------------------------------------------------------------------

    /// Insert or refresh players in a single transaction.
    ///
    /// Descriptive columns are overwritten; ownership columns are left alone
    /// so re-importing during a draft does not undo picks.
    pub fn import_players(&self, players: &[Player]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin import transaction")?;

        for player in players {
            let positions_json = serde_json::to_string(&player.allowed_positions)
                .context("failed to serialize positions")?;
            tx.execute(
                "INSERT INTO players
                    (id, full_name, professional_team, allowed_positions, bye_week,
                     rank, tier, position_rank, position_tier)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(id) DO UPDATE SET
                    full_name         = excluded.full_name,
                    professional_team = excluded.professional_team,
                    allowed_positions = excluded.allowed_positions,
                    bye_week          = excluded.bye_week,
                    rank              = excluded.rank,
                    tier              = excluded.tier,
                    position_rank     = excluded.position_rank,
                    position_tier     = excluded.position_tier",
                params![
                    player.id,
                    player.full_name,
                    player.professional_team,
                    positions_json,
                    player.bye_week,
                    player.rank,
                    player.tier,
                    player.position_rank,
                    player.position_tier,
                ],
            )
            .context("failed to upsert player in batch")?;
        }

        tx.commit().context("failed to commit player import")?;
        Ok(())
    }

    /// Write every player's ownership state back, e.g. after a waiver run.
    pub fn save_player_statuses(&self, players: &PlayerPool) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin status transaction")?;
        for player in players.iter() {
            tx.execute(
                "UPDATE players SET availability = ?2, pick_chosen = ?3, owning_team_id = ?4
                 WHERE id = ?1",
                params![
                    player.id,
                    player.status.availability.as_str(),
                    player.status.pick_chosen,
                    player.status.owning_team_id,
                ],
            )
            .context("failed to update player status")?;
        }
        tx.commit().context("failed to commit player statuses")?;
        Ok(())
    }

    /// Insert or update teams, including their waiver budget and priority.
    pub fn save_teams(&self, teams: &[Team]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin team transaction")?;
        for team in teams {
            tx.execute(
                "INSERT OR REPLACE INTO fantasy_teams
                    (id, name, owner, draft_order, waiver_priority, waiver_budget)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    team.id,
                    team.name,
                    team.owner,
                    team.draft_order as i64,
                    team.waiver_priority,
                    team.waiver_budget,
                ],
            )
            .context("failed to save team")?;
        }
        tx.commit().context("failed to commit teams")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Weekly scores
    // ------------------------------------------------------------------

    pub fn upsert_weekly_score(
        &self,
        player_id: &str,
        season: u32,
        week: u32,
        points: f64,
    ) -> Result<()> {
        self.conn()
            .execute(
                "INSERT OR REPLACE INTO weekly_scores (player_id, season, week, points)
                 VALUES (?1, ?2, ?3, ?4)",
                params![player_id, season, week, points],
            )
            .context("failed to upsert weekly score")?;
        Ok(())
    }

    /// Store stat lines as fantasy points at the league's PPR value, in one
    /// transaction.
    pub fn import_weekly_scores(&self, rows: &[ScoreRow], points_per_reception: f64) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin score import")?;
        for row in rows {
            tx.execute(
                "INSERT OR REPLACE INTO weekly_scores (player_id, season, week, points)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    row.player_id,
                    row.season,
                    row.week,
                    row.line.total(points_per_reception)
                ],
            )
            .context("failed to insert weekly score in batch")?;
        }
        tx.commit().context("failed to commit score import")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Matchups
    // ------------------------------------------------------------------

    /// Replace the stored matchups for `season`.
    pub fn save_matchups(&self, season: u32, matchups: &[Matchup]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin matchup transaction")?;
        tx.execute("DELETE FROM matchups WHERE season = ?1", params![season])
            .context("failed to clear matchups")?;
        for m in matchups {
            tx.execute(
                "INSERT INTO matchups
                    (season, id, week, home_team_id, visitor_team_id, home_score, visitor_score,
                     winning_team_id, is_playoff, home_play_in_id, visitor_play_in_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    season,
                    m.id,
                    m.week,
                    m.home_team_id,
                    m.visitor_team_id,
                    m.home_score,
                    m.visitor_score,
                    m.winning_team_id,
                    m.is_playoff,
                    m.home_play_in_id,
                    m.visitor_play_in_id,
                ],
            )
            .context("failed to insert matchup")?;
        }
        tx.commit().context("failed to commit matchups")?;
        Ok(())
    }

    pub fn load_matchups(&self, season: u32) -> Result<Vec<Matchup>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT id, week, home_team_id, visitor_team_id, home_score, visitor_score,
                        winning_team_id, is_playoff, home_play_in_id, visitor_play_in_id
                 FROM matchups WHERE season = ?1 ORDER BY id",
            )
            .context("failed to prepare load_matchups query")?;
        let matchups = stmt
            .query_map(params![season], |row| {
                Ok(Matchup {
                    id: row.get(0)?,
                    week: row.get(1)?,
                    home_team_id: row.get(2)?,
                    visitor_team_id: row.get(3)?,
                    home_score: row.get(4)?,
                    visitor_score: row.get(5)?,
                    winning_team_id: row.get(6)?,
                    is_playoff: row.get(7)?,
                    home_play_in_id: row.get(8)?,
                    visitor_play_in_id: row.get(9)?,
                })
            })
            .context("failed to query matchups")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map matchup rows")?;
        Ok(matchups)
    }
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

const PLAYER_COLUMNS: &str = "id, full_name, professional_team, allowed_positions, bye_week, rank, \
     tier, position_rank, position_tier, availability, pick_chosen, owning_team_id";

fn player_from_row(row: &Row<'_>) -> rusqlite::Result<Player> {
    let positions_json: String = row.get(3)?;
    let allowed_positions: Vec<Position> = serde_json::from_str(&positions_json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    let availability_str: String = row.get(9)?;
    let availability = Availability::from_str_availability(&availability_str).unwrap_or_else(|| {
        warn!("unknown availability '{}', treating as available", availability_str);
        Availability::Available
    });
    Ok(Player {
        id: row.get(0)?,
        full_name: row.get(1)?,
        professional_team: row.get(2)?,
        allowed_positions,
        bye_week: row.get(4)?,
        rank: row.get(5)?,
        tier: row.get(6)?,
        position_rank: row.get(7)?,
        position_tier: row.get(8)?,
        status: PlayerStatus {
            availability,
            pick_chosen: row.get(10)?,
            owning_team_id: row.get(11)?,
        },
    })
}

fn team_from_row(row: &Row<'_>) -> rusqlite::Result<Team> {
    let draft_order: i64 = row.get(3)?;
    Ok(Team {
        id: row.get(0)?,
        name: row.get(1)?,
        owner: row.get(2)?,
        draft_order: draft_order as usize,
        waiver_priority: row.get(4)?,
        waiver_budget: row.get(5)?,
    })
}

fn pick_from_row(row: &Row<'_>) -> rusqlite::Result<DraftPick> {
    let position: Option<String> = row.get(4)?;
    Ok(DraftPick {
        pick_number: row.get(0)?,
        team_id: row.get(1)?,
        player_id: row.get(2)?,
        player_name: row.get(3)?,
        position: position.as_deref().and_then(Position::from_str_pos),
        auto_drafted: row.get(5)?,
    })
}

// ---------------------------------------------------------------------------
// Collaborator implementations
// ---------------------------------------------------------------------------

impl DraftStore for Database {
    type Error = DbError;

    fn get_draft_status(&self) -> Result<Option<DraftStatus>, DbError> {
        self.load_json(Self::DRAFT_STATUS_KEY)
    }

    fn get_league_settings(&self) -> Result<Option<LeagueSettings>, DbError> {
        self.load_json(Self::LEAGUE_SETTINGS_KEY)
    }

    fn list_players(&self) -> Result<Vec<Player>, DbError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {PLAYER_COLUMNS} FROM players ORDER BY rank, id"
        ))?;
        let players = stmt
            .query_map([], player_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(players)
    }

    fn list_teams(&self) -> Result<Vec<Team>, DbError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, name, owner, draft_order, waiver_priority, waiver_budget
             FROM fantasy_teams ORDER BY draft_order",
        )?;
        let teams = stmt
            .query_map([], team_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(teams)
    }

    fn get_player(&self, player_id: &str) -> Result<Option<Player>, DbError> {
        let player = self
            .conn()
            .query_row(
                &format!("SELECT {PLAYER_COLUMNS} FROM players WHERE id = ?1"),
                params![player_id],
                player_from_row,
            )
            .optional()?;
        Ok(player)
    }

    fn mark_drafted(&self, player_id: &str, team_id: &str, pick_number: u32) -> Result<(), DbError> {
        let updated = self.conn().execute(
            "UPDATE players SET availability = 'DRAFTED', pick_chosen = ?2, owning_team_id = ?3
             WHERE id = ?1",
            params![player_id, pick_number, team_id],
        )?;
        if updated == 0 {
            warn!("mark_drafted: player {} is not in the database", player_id);
        }
        Ok(())
    }

    fn advance_pick(&self, status: &DraftStatus) -> Result<(), DbError> {
        self.save_json(Self::DRAFT_STATUS_KEY, status)
    }

    /// Uses INSERT OR IGNORE so re-recording the same pick number is a no-op.
    fn record_pick(&self, draft_id: &str, pick: &DraftPick) -> Result<(), DbError> {
        self.conn().execute(
            "INSERT OR IGNORE INTO draft_picks
                (pick_number, draft_id, team_id, player_id, player_name, position, auto_drafted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                pick.pick_number,
                draft_id,
                pick.team_id,
                pick.player_id,
                pick.player_name,
                pick.position.map(|p| p.display_str()),
                pick.auto_drafted,
            ],
        )?;
        Ok(())
    }

    fn load_picks(&self, draft_id: &str) -> Result<Vec<DraftPick>, DbError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT pick_number, team_id, player_id, player_name, position, auto_drafted
             FROM draft_picks WHERE draft_id = ?1 ORDER BY pick_number",
        )?;
        let picks = stmt
            .query_map(params![draft_id], pick_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(picks)
    }
}

impl ScoreProvider for Database {
    fn weekly_points(&self, player_id: &str, season: u32, week: u32) -> Option<f64> {
        let result = self
            .conn()
            .query_row(
                "SELECT points FROM weekly_scores WHERE player_id = ?1 AND season = ?2 AND week = ?3",
                params![player_id, season, week],
                |row| row.get::<_, f64>(0),
            )
            .optional();
        match result {
            Ok(points) => points,
            Err(e) => {
                warn!("failed to read score for {} week {}: {}", player_id, week, e);
                None
            }
        }
    }

    fn seasonal_points(&self, player_id: &str, season: u32) -> Option<f64> {
        let result = self.conn().query_row(
            "SELECT SUM(points) FROM weekly_scores WHERE player_id = ?1 AND season = ?2
             AND week BETWEEN ?3 AND ?4",
            params![
                player_id,
                season,
                gridiron_core::lineup::FIRST_WEEK,
                gridiron_core::lineup::LAST_WEEK
            ],
            |row| row.get::<_, Option<f64>>(0),
        );
        match result {
            Ok(total) => total,
            Err(e) => {
                warn!("failed to read season score for {}: {}", player_id, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridiron_core::season::{round_robin_schedule, settle_week};
    use gridiron_core::scoring::StatLine;
    use std::collections::HashMap;

    const TEST_DRAFT_ID: &str = "test_draft_001";

    /// Helper: create a fresh in-memory database for each test.
    fn test_db() -> Database {
        Database::open(":memory:").expect("in-memory database should open")
    }

    fn sample_players() -> Vec<Player> {
        let mut cmc = Player::new("p1", "Christian McCaffrey", vec![Position::RunningBack], 1);
        cmc.professional_team = "SF".into();
        cmc.bye_week = Some(9);
        let deebo = Player::new(
            "p2",
            "Deebo Samuel",
            vec![Position::WideReceiver, Position::RunningBack],
            14,
        );
        let kelce = Player::new("p3", "Travis Kelce", vec![Position::TightEnd], 8);
        vec![cmc, deebo, kelce]
    }

    fn sample_pick(pick_number: u32, player_id: Option<&str>) -> DraftPick {
        DraftPick {
            pick_number,
            team_id: "team_1".to_string(),
            player_id: player_id.map(str::to_string),
            player_name: player_id.map(|p| format!("Player {p}")).unwrap_or_default(),
            position: player_id.map(|_| Position::RunningBack),
            auto_drafted: false,
        }
    }

    #[test]
    fn open_creates_tables() {
        let db = test_db();
        let conn = db.conn();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        for expected in [
            "draft_picks",
            "fantasy_teams",
            "game_state",
            "matchups",
            "players",
            "weekly_scores",
        ] {
            assert!(tables.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn import_and_list_players_round_trip() {
        let db = test_db();
        db.import_players(&sample_players()).unwrap();

        let players = db.list_players().unwrap();
        assert_eq!(players.len(), 3);
        // Ordered by rank.
        assert_eq!(players[0].id, "p1");
        assert_eq!(players[1].id, "p3");
        assert_eq!(players[2].id, "p2");

        let deebo = db.get_player("p2").unwrap().unwrap();
        assert_eq!(
            deebo.allowed_positions,
            vec![Position::WideReceiver, Position::RunningBack]
        );
        assert!(deebo.is_available());
        assert_eq!(db.get_player("p1").unwrap().unwrap().bye_week, Some(9));
        assert!(db.get_player("missing").unwrap().is_none());
    }

    #[test]
    fn reimport_keeps_ownership() {
        let db = test_db();
        db.import_players(&sample_players()).unwrap();
        db.mark_drafted("p1", "team_1", 1).unwrap();

        let mut updated = sample_players();
        updated[0].rank = 2;
        db.import_players(&updated).unwrap();

        let p1 = db.get_player("p1").unwrap().unwrap();
        assert_eq!(p1.rank, 2);
        assert_eq!(p1.status.availability, Availability::Drafted);
        assert_eq!(p1.status.owning_team_id.as_deref(), Some("team_1"));
        assert_eq!(p1.status.pick_chosen, Some(1));
    }

    #[test]
    fn record_and_load_picks() {
        let db = test_db();
        db.record_pick(TEST_DRAFT_ID, &sample_pick(2, None)).unwrap();
        db.record_pick(TEST_DRAFT_ID, &sample_pick(1, Some("p1"))).unwrap();
        db.record_pick("other_draft", &sample_pick(1, Some("p3"))).unwrap();

        let picks = db.load_picks(TEST_DRAFT_ID).unwrap();
        assert_eq!(picks.len(), 2);
        assert_eq!(picks[0], sample_pick(1, Some("p1")));
        assert!(picks[1].is_skip());
        assert_eq!(picks[1].position, None);
        assert_eq!(db.pick_count("other_draft").unwrap(), 1);
    }

    #[test]
    fn record_pick_is_idempotent() {
        let db = test_db();
        db.record_pick(TEST_DRAFT_ID, &sample_pick(1, Some("p1"))).unwrap();
        db.record_pick(TEST_DRAFT_ID, &sample_pick(1, Some("p2"))).unwrap();

        let picks = db.load_picks(TEST_DRAFT_ID).unwrap();
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].player_id.as_deref(), Some("p1"));
    }

    #[test]
    fn draft_status_and_settings_round_trip() {
        let db = test_db();
        assert!(db.get_draft_status().unwrap().is_none());
        assert!(db.get_league_settings().unwrap().is_none());
        assert!(db.get_draft_id().unwrap().is_none());

        let status = DraftStatus {
            draft_id: TEST_DRAFT_ID.into(),
            current_pick: 12,
            drafting_team_id: Some("team_9".into()),
            is_complete: false,
        };
        db.advance_pick(&status).unwrap();
        assert_eq!(db.get_draft_status().unwrap(), Some(status));

        let settings = LeagueSettings {
            num_teams: 2,
            total_rounds: 3,
            is_snake_draft: true,
            points_per_reception: 0.5,
            year: 2024,
            roster_slots: Vec::new(),
        };
        db.save_league_settings(&settings).unwrap();
        assert_eq!(db.get_league_settings().unwrap(), Some(settings));

        db.set_draft_id(TEST_DRAFT_ID).unwrap();
        assert_eq!(db.get_draft_id().unwrap().as_deref(), Some(TEST_DRAFT_ID));
    }

    #[test]
    fn clear_draft_resets_ownership_but_keeps_players() {
        let db = test_db();
        db.import_players(&sample_players()).unwrap();
        db.mark_drafted("p1", "team_1", 1).unwrap();
        db.record_pick(TEST_DRAFT_ID, &sample_pick(1, Some("p1"))).unwrap();
        db.set_draft_id(TEST_DRAFT_ID).unwrap();
        db.save_teams(&[Team::new("team_1", "One", 0)]).unwrap();

        db.clear_draft().unwrap();

        assert_eq!(db.pick_count(TEST_DRAFT_ID).unwrap(), 0);
        assert!(db.get_draft_id().unwrap().is_none());
        let p1 = db.get_player("p1").unwrap().unwrap();
        assert!(p1.is_available());
        assert!(p1.status.owning_team_id.is_none());
        assert_eq!(db.list_players().unwrap().len(), 3);
        assert!(db.list_teams().unwrap().is_empty());
    }

    #[test]
    fn teams_round_trip_in_draft_order() {
        let db = test_db();
        let mut a = Team::new("a", "Alpha", 1);
        a.waiver_budget = 80;
        a.waiver_priority = 2;
        let b = Team::new("b", "Beta", 0);
        db.save_teams(&[a.clone(), b.clone()]).unwrap();

        let teams = db.list_teams().unwrap();
        assert_eq!(teams, vec![b, a.clone()]);

        a.waiver_budget = 50;
        db.save_teams(&[a]).unwrap();
        assert_eq!(db.list_teams().unwrap()[1].waiver_budget, 50);
    }

    #[test]
    fn save_player_statuses_writes_on_hold() {
        let db = test_db();
        db.import_players(&sample_players()).unwrap();
        let mut players = sample_players();
        players[1].status.availability = Availability::OnHold;
        players[2].status.availability = Availability::Drafted;
        players[2].status.owning_team_id = Some("b".into());
        let pool = PlayerPool::new(players).unwrap();

        db.save_player_statuses(&pool).unwrap();
        assert_eq!(
            db.get_player("p2").unwrap().unwrap().status.availability,
            Availability::OnHold
        );
        assert!(db.get_player("p3").unwrap().unwrap().is_owned_by("b"));
    }

    #[test]
    fn weekly_scores_serve_the_provider() {
        let db = test_db();
        let rows = vec![
            ScoreRow {
                player_id: "p1".into(),
                season: 2024,
                week: 1,
                line: StatLine {
                    standard_points: 10.0,
                    receptions: 4.0,
                },
            },
            ScoreRow {
                player_id: "p1".into(),
                season: 2024,
                week: 2,
                line: StatLine {
                    standard_points: 6.0,
                    receptions: 0.0,
                },
            },
        ];
        db.import_weekly_scores(&rows, 1.0).unwrap();
        db.upsert_weekly_score("p2", 2024, 1, 3.5).unwrap();

        assert_eq!(db.weekly_points("p1", 2024, 1), Some(14.0));
        assert_eq!(db.weekly_points("p1", 2024, 3), None);
        assert_eq!(db.weekly_points("p1", 2023, 1), None);
        assert_eq!(db.seasonal_points("p1", 2024), Some(20.0));
        assert_eq!(db.seasonal_points("p2", 2024), Some(3.5));
        assert_eq!(db.seasonal_points("nobody", 2024), None);

        db.upsert_weekly_score("p2", 2024, 1, 9.0).unwrap();
        assert_eq!(db.weekly_points("p2", 2024, 1), Some(9.0));
    }

    #[test]
    fn matchups_round_trip() {
        let db = test_db();
        let ids: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        let mut schedule = round_robin_schedule(&ids, 3);
        let scores: HashMap<String, f64> =
            [("a".to_string(), 90.0), ("b".to_string(), 80.0), ("c".to_string(), 70.0)]
                .into_iter()
                .collect();
        settle_week(&mut schedule, 1, &scores);

        db.save_matchups(2024, &schedule).unwrap();
        assert_eq!(db.load_matchups(2024).unwrap(), schedule);
        assert!(db.load_matchups(2023).unwrap().is_empty());

        // Saving again replaces rather than duplicates.
        db.save_matchups(2024, &schedule[..2]).unwrap();
        assert_eq!(db.load_matchups(2024).unwrap().len(), 2);
    }

    #[test]
    fn generated_draft_ids_have_expected_shape() {
        let id = Database::generate_draft_id();
        assert!(id.starts_with("draft_"));
        // draft_YYYYMMDD_HHMMSS_mmm
        assert_eq!(id.len(), "draft_20240101_000000_000".len());
    }
}
