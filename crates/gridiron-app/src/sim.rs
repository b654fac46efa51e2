// Simulation orchestration: draft, weekly waivers and scoring, playoffs,
// and the season leaderboard.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use gridiron_core::draft::player::PlayerPool;
use gridiron_core::draft::runner::{DraftRunner, DraftSummary};
use gridiron_core::draft::state::DraftState;
use gridiron_core::season::{self, LeaderboardEntry, Matchup, Standing};
use gridiron_core::store::{persist_pick, DraftStore};
use gridiron_core::waivers;

use crate::bots;
use crate::config::Config;
use crate::data;
use crate::db::Database;

/// Everything a finished run reports.
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub draft_id: String,
    /// True when an interrupted draft was picked up from the database.
    pub resumed: bool,
    pub draft: DraftSummary,
    pub waiver_awards: usize,
    pub matchups: Vec<Matchup>,
    pub standings: Vec<Standing>,
    pub champion: Option<String>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Load players and weekly scores from the configured CSV files into the
/// database. Relative paths resolve against `base_dir`.
pub fn import_data(config: &Config, db: &Database, base_dir: &Path) -> Result<usize> {
    let players_path = base_dir.join(&config.data_paths.players);
    let players = data::load_players(&players_path)
        .with_context(|| format!("failed to load players from {}", players_path.display()))?;
    db.import_players(&players)?;
    info!("Imported {} players", players.len());

    if let Some(scores) = &config.data_paths.weekly_scores {
        let scores_path = base_dir.join(scores);
        let rows = data::load_weekly_scores(&scores_path).with_context(|| {
            format!("failed to load weekly scores from {}", scores_path.display())
        })?;
        db.import_weekly_scores(&rows, config.league.points_per_reception)?;
        info!("Imported {} weekly score rows", rows.len());
    } else {
        warn!("No weekly score file configured; every matchup will score zero");
    }

    Ok(players.len())
}

/// Build the league from config and the imported players, resuming the
/// stored draft if one was interrupted. Returns the state, the draft id, and
/// whether it was resumed.
pub fn prepare_draft(config: &Config, db: &Database) -> Result<(DraftState, String, bool)> {
    let settings = config.league.to_settings();
    let teams = config.league.to_teams();

    if let Some(draft_id) = db.get_draft_id()? {
        let status = db.get_draft_status()?;
        let interrupted = status.as_ref().is_some_and(|s| !s.is_complete);
        if interrupted && stored_league_matches(config, db)? {
            let picks = db.load_picks(&draft_id)?;
            let mut state = fresh_state(config, db)?;
            state
                .restore_from_picks(&picks)
                .context("failed to replay stored picks")?;
            info!(
                "Resuming draft {} at pick {} ({} picks replayed)",
                draft_id,
                state.current_pick(),
                picks.len()
            );
            return Ok((state, draft_id, true));
        } else if interrupted {
            warn!(
                "Draft {} was started with different league settings or teams; \
                 discarding it and starting a new draft",
                draft_id
            );
        } else {
            info!("Previous draft {} is finished, starting a new one", draft_id);
        }
    }

    db.clear_draft()?;
    let draft_id = Database::generate_draft_id();
    db.set_draft_id(&draft_id)?;
    db.save_league_settings(&settings)?;
    db.save_teams(&teams)?;
    info!("Starting draft {}", draft_id);

    let state = fresh_state(config, db)?;
    Ok((state, draft_id, false))
}

/// The stored draft can only be replayed against the league it was started
/// with: same settings, same team ids in the same draft slots.
fn stored_league_matches(config: &Config, db: &Database) -> Result<bool> {
    let Some(stored) = db.get_league_settings()? else {
        return Ok(false);
    };
    if stored != config.league.to_settings() {
        return Ok(false);
    }

    let mut stored_teams: Vec<(String, usize)> = db
        .list_teams()?
        .into_iter()
        .map(|t| (t.id, t.draft_order))
        .collect();
    let mut teams: Vec<(String, usize)> = config
        .league
        .to_teams()
        .into_iter()
        .map(|t| (t.id, t.draft_order))
        .collect();
    stored_teams.sort();
    teams.sort();
    Ok(stored_teams == teams)
}

fn fresh_state(config: &Config, db: &Database) -> Result<DraftState> {
    let mut players = db.list_players()?;
    for player in &mut players {
        player.status = Default::default();
    }
    let pool = PlayerPool::new(players).context("invalid player pool")?;
    DraftState::new(config.league.to_settings(), config.league.to_teams(), pool)
        .context("invalid league settings")
}

/// Play the remaining draft turns, writing each through to the database.
pub async fn run_draft(
    runner: &DraftRunner,
    state: &mut DraftState,
    db: &Database,
    draft_id: &str,
) -> Result<DraftSummary> {
    runner.validate(state)?;

    let mut summary = DraftSummary::default();
    for pick in state.picks() {
        summary.record(pick);
    }

    while !state.is_complete() {
        let pick = runner.play_turn(state).await?;
        persist_pick(db, draft_id, state, &pick).context("failed to persist pick")?;
        summary.record(&pick);
    }

    info!(
        "Draft {} complete: {} drafted ({} auto), {} skipped",
        draft_id, summary.drafted, summary.auto_drafted, summary.skipped
    );
    Ok(summary)
}

/// Play the regular season and the playoffs on the drafted rosters.
///
/// Each week runs waivers first (when enabled) and then scores every team's
/// best lineup against its opponent. The bracket is seeded from the
/// standings when the playoff start week arrives.
pub async fn run_season(
    config: &Config,
    runner: &DraftRunner,
    state: &mut DraftState,
    db: &Database,
) -> Result<(Vec<Matchup>, usize)> {
    let year = state.settings.year;
    let sim = &config.simulation;
    let team_ids: Vec<String> = state.teams.iter().map(|t| t.id.clone()).collect();

    if sim.waivers.enabled {
        for team in &mut state.teams {
            team.waiver_budget = sim.waivers.starting_budget;
        }
    }

    let mut matchups = season::round_robin_schedule(&team_ids, sim.season.regular_season_weeks);
    let playoffs = sim.season.playoff_teams > 0;
    let mut last_week = sim.season.regular_season_weeks;
    if playoffs {
        last_week = last_week.max(sim.season.playoff_start_week);
    }
    let mut waiver_awards = 0;

    let mut week = 1;
    while week <= last_week {
        if sim.waivers.enabled {
            let released = waivers::prepare_waiver_run(state);
            let claims = runner.collect_claims(state, week).await;
            let report = waivers::apply_waivers(state, &claims, sim.waivers.max_adds_per_run);
            info!(
                "Week {} waivers: {} released, {} awarded, {} rejected",
                week,
                released,
                report.applied.len(),
                report.rejected.len()
            );
            waiver_awards += report.applied.len();
            db.save_player_statuses(state.players())?;
        }

        if playoffs && week == sim.season.playoff_start_week {
            let table = season::standings(&state.teams, &matchups);
            let seeds: Vec<String> = table
                .iter()
                .take(sim.season.playoff_teams)
                .map(|s| s.team_id.clone())
                .collect();
            let bracket = season::playoff_bracket(&seeds, sim.season.playoff_byes, week)
                .context("failed to build playoff bracket")?;
            if let Some(final_week) = bracket.iter().map(|m| m.week).max() {
                last_week = last_week.max(final_week);
            }
            info!("Playoffs seeded: {}", seeds.join(", "));
            matchups.extend(bracket);
        }

        season::advance_playoffs(&mut matchups, week);
        let scores = season::team_week_scores(state, db, year, week);
        let settled = season::settle_week(&mut matchups, week, &scores);
        info!("Week {}: {} matchups settled", week, settled);

        week += 1;
    }

    db.save_matchups(year, &matchups)?;
    db.save_teams(&state.teams)?;
    Ok((matchups, waiver_awards))
}

/// Full run: import data, draft (or resume), play the season, rank teams.
pub async fn run(config: &Config, db: &Database, base_dir: &Path) -> Result<SimulationReport> {
    import_data(config, db, base_dir)?;

    let strategies = bots::build_strategies(config, base_dir).context("failed to build bots")?;
    let runner = DraftRunner::new(strategies, config.simulation.draft.policies());

    let (mut state, draft_id, resumed) = prepare_draft(config, db)?;
    let draft = run_draft(&runner, &mut state, db, &draft_id).await?;

    let (matchups, waiver_awards) = run_season(config, &runner, &mut state, db).await?;

    let standings = season::standings(&state.teams, &matchups);
    let champion = season::champion(&matchups).map(str::to_string);
    if let Some(team_id) = &champion {
        info!("Champion: {}", team_id);
    }
    let leaderboard = season::season_leaderboard(&state, db, state.settings.year);

    Ok(SimulationReport {
        draft_id,
        resumed,
        draft,
        waiver_awards,
        matchups,
        standings,
        champion,
        leaderboard,
    })
}
