// Configuration loading and parsing (league.toml, simulation.toml).

use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use gridiron_core::draft::pick::SlotKind;
use gridiron_core::draft::roster::slots_from_config;
use gridiron_core::draft::runner::{DraftPolicies, DuplicatePolicy, FailurePolicy};
use gridiron_core::draft::state::{LeagueSettings, Team};
use gridiron_core::waivers::DEFAULT_MAX_ADDS_PER_RUN;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub league: LeagueConfig,
    pub simulation: SimulationConfig,
    pub db_path: String,
    pub data_paths: DataPaths,
}

impl Config {
    /// Database location. An empty `database.path` falls back to the
    /// platform data directory.
    pub fn resolve_db_path(&self) -> PathBuf {
        if !self.db_path.trim().is_empty() {
            return PathBuf::from(&self.db_path);
        }
        match directories::ProjectDirs::from("", "", "gridiron") {
            Some(dirs) => dirs.data_dir().join("gridiron.db"),
            None => PathBuf::from("gridiron.db"),
        }
    }
}

// ---------------------------------------------------------------------------
// league.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[league]` table in league.toml.
#[derive(Debug, Clone, Deserialize)]
struct LeagueFile {
    league: LeagueConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeagueConfig {
    pub name: String,
    pub num_teams: usize,
    pub total_rounds: u32,
    #[serde(default = "default_true")]
    pub is_snake_draft: bool,
    #[serde(default)]
    pub points_per_reception: f64,
    pub year: u32,
    pub roster: HashMap<String, usize>,
    #[serde(default)]
    pub teams: Vec<TeamConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub owner: String,
}

fn default_true() -> bool {
    true
}

impl LeagueConfig {
    pub fn to_settings(&self) -> LeagueSettings {
        LeagueSettings {
            num_teams: self.num_teams,
            total_rounds: self.total_rounds,
            is_snake_draft: self.is_snake_draft,
            points_per_reception: self.points_per_reception,
            year: self.year,
            roster_slots: slots_from_config(&self.roster),
        }
    }

    /// Teams in file order; file order is the draft order.
    pub fn to_teams(&self) -> Vec<Team> {
        self.teams
            .iter()
            .enumerate()
            .map(|(i, t)| {
                let mut team = Team::new(&t.id, &t.name, i);
                team.owner = t.owner.clone();
                team
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// simulation.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire simulation.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SimulationFile {
    draft: DraftSection,
    #[serde(default)]
    waivers: WaiverSection,
    season: SeasonSection,
    database: DatabaseSection,
    data_paths: DataPaths,
    #[serde(default)]
    bots: HashMap<String, BotConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    #[serde(default)]
    path: String,
}

/// The public simulation config assembled from the simulation.toml sections.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub draft: DraftSection,
    pub waivers: WaiverSection,
    pub season: SeasonSection,
    /// Bot definitions keyed by team id.
    pub bots: HashMap<String, BotConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DraftSection {
    pub turn_timeout_secs: u64,
    #[serde(default)]
    pub on_strategy_failure: FailurePolicy,
    #[serde(default)]
    pub on_duplicate_pick: DuplicatePolicy,
}

impl DraftSection {
    pub fn policies(&self) -> DraftPolicies {
        DraftPolicies {
            turn_timeout: Duration::from_secs(self.turn_timeout_secs),
            on_strategy_failure: self.on_strategy_failure,
            on_duplicate_pick: self.on_duplicate_pick,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WaiverSection {
    pub enabled: bool,
    pub starting_budget: u32,
    #[serde(default = "default_max_adds")]
    pub max_adds_per_run: usize,
}

fn default_max_adds() -> usize {
    DEFAULT_MAX_ADDS_PER_RUN
}

impl Default for WaiverSection {
    fn default() -> Self {
        WaiverSection {
            enabled: false,
            starting_budget: 0,
            max_adds_per_run: DEFAULT_MAX_ADDS_PER_RUN,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonSection {
    pub regular_season_weeks: u32,
    pub playoff_start_week: u32,
    /// Zero disables the playoffs.
    #[serde(default)]
    pub playoff_teams: usize,
    #[serde(default)]
    pub playoff_byes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BotKind {
    BestAvailable,
    Process,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub kind: BotKind,
    /// Program and arguments for `process` bots.
    #[serde(default)]
    pub command: Vec<String>,
    /// FAAB bid used by `best_available` bots.
    #[serde(default)]
    pub waiver_bid: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub players: String,
    #[serde(default)]
    pub weekly_scores: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/league.toml` and
/// `config/simulation.toml`, relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- league.toml (required) ---
    let league_path = config_dir.join("league.toml");
    let league_text = read_file(&league_path)?;
    let league_file: LeagueFile =
        toml::from_str(&league_text).map_err(|e| ConfigError::ParseError {
            path: league_path.clone(),
            source: e,
        })?;

    // --- simulation.toml (required) ---
    let simulation_path = config_dir.join("simulation.toml");
    let simulation_text = read_file(&simulation_path)?;
    let simulation_file: SimulationFile =
        toml::from_str(&simulation_text).map_err(|e| ConfigError::ParseError {
            path: simulation_path.clone(),
            source: e,
        })?;

    let config = Config {
        league: league_file.league,
        simulation: SimulationConfig {
            draft: simulation_file.draft,
            waivers: simulation_file.waivers,
            season: simulation_file.season,
            bots: simulation_file.bots,
        },
        db_path: simulation_file.database.path,
        data_paths: simulation_file.data_paths,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the gridiron-app directory or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            // Never overwrite a user's edited config.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_string(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let league = &config.league;

    if league.num_teams == 0 {
        return Err(invalid("league.num_teams", "must be greater than 0"));
    }
    if league.total_rounds == 0 {
        return Err(invalid("league.total_rounds", "must be greater than 0"));
    }
    if league.teams.len() != league.num_teams {
        return Err(invalid(
            "league.teams",
            format!(
                "num_teams is {} but {} teams are listed",
                league.num_teams,
                league.teams.len()
            ),
        ));
    }

    let mut ids = HashSet::new();
    for team in &league.teams {
        if team.id.trim().is_empty() {
            return Err(invalid("league.teams.id", "must not be empty"));
        }
        if !ids.insert(team.id.as_str()) {
            return Err(invalid(
                "league.teams.id",
                format!("duplicate team id `{}`", team.id),
            ));
        }
    }

    for name in league.roster.keys() {
        if SlotKind::from_str_slot(name).is_none() {
            return Err(invalid(
                "league.roster",
                format!("unknown roster slot `{name}`"),
            ));
        }
    }

    // Draft
    if config.simulation.draft.turn_timeout_secs == 0 {
        return Err(invalid("draft.turn_timeout_secs", "must be greater than 0"));
    }

    // Season
    let season = &config.simulation.season;
    if season.playoff_start_week > season.regular_season_weeks + 1 {
        return Err(invalid(
            "season.playoff_start_week",
            format!(
                "must be at most regular_season_weeks + 1 ({}), got {}",
                season.regular_season_weeks + 1,
                season.playoff_start_week
            ),
        ));
    }
    if season.playoff_teams > 0 {
        if season.playoff_start_week == 0 {
            return Err(invalid("season.playoff_start_week", "must be at least 1"));
        }
        if season.playoff_teams % 2 != 0 {
            return Err(invalid(
                "season.playoff_teams",
                format!("must be even, got {}", season.playoff_teams),
            ));
        }
        if season.playoff_byes % 2 != 0 {
            return Err(invalid(
                "season.playoff_byes",
                format!("must be even, got {}", season.playoff_byes),
            ));
        }
        if season.playoff_byes >= season.playoff_teams {
            return Err(invalid(
                "season.playoff_byes",
                "must be fewer than playoff_teams",
            ));
        }
        let first_round = (season.playoff_teams + season.playoff_byes) / 2;
        if !first_round.is_power_of_two() {
            return Err(invalid(
                "season.playoff_byes",
                format!(
                    "{} teams with {} byes gives {} first-round games; need a power of two",
                    season.playoff_teams, season.playoff_byes, first_round
                ),
            ));
        }
        if season.playoff_teams > league.num_teams {
            return Err(invalid(
                "season.playoff_teams",
                format!(
                    "cannot exceed num_teams ({}), got {}",
                    league.num_teams, season.playoff_teams
                ),
            ));
        }
    }

    // Bots
    for (team_id, bot) in &config.simulation.bots {
        if !ids.contains(team_id.as_str()) {
            return Err(invalid(
                &format!("bots.{team_id}"),
                "does not match any team id",
            ));
        }
        if bot.kind == BotKind::Process && bot.command.iter().all(|s| s.trim().is_empty()) {
            return Err(invalid(
                &format!("bots.{team_id}.command"),
                "process bots need a non-empty command",
            ));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
