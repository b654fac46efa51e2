// Integration tests: full simulations against the fixture league.

use std::collections::HashSet;
use std::path::PathBuf;

use gridiron_app::bots;
use gridiron_app::config::{self, Config};
use gridiron_app::db::Database;
use gridiron_app::sim;
use gridiron_core::draft::player::Availability;
use gridiron_core::draft::runner::DraftRunner;
use gridiron_core::season::PLAYOFF_MATCHUP_START_ID;
use gridiron_core::store::{persist_pick, DraftStore};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/league")
}

fn fixture_config() -> Config {
    config::load_config_from(&fixture_dir()).expect("fixture config should load")
}

fn memory_db() -> Database {
    Database::open(":memory:").expect("in-memory database should open")
}

#[tokio::test]
async fn full_season_runs_draft_to_champion() {
    let config = fixture_config();
    let db = memory_db();

    let report = sim::run(&config, &db, &fixture_dir()).await.unwrap();

    assert!(!report.resumed);
    assert!(report.draft_id.starts_with("draft_"));
    assert_eq!(report.draft.drafted, 16);
    assert_eq!(report.draft.skipped, 0);

    // Three regular-season weeks of a four-team round robin, then a
    // two-round bracket.
    let regular: Vec<_> = report.matchups.iter().filter(|m| !m.is_playoff).collect();
    let playoff: Vec<_> = report.matchups.iter().filter(|m| m.is_playoff).collect();
    assert_eq!(regular.len(), 6);
    assert_eq!(playoff.len(), 3);
    assert_eq!(playoff[0].id, PLAYOFF_MATCHUP_START_ID);
    assert!(report.matchups.iter().all(|m| m.is_settled()));

    assert_eq!(report.standings.len(), 4);
    for row in &report.standings {
        assert_eq!(row.wins + row.losses, 3, "{}", row.team_id);
    }
    let seeds: HashSet<&str> = playoff[..2]
        .iter()
        .flat_map(|m| [m.home_team_id.as_str(), m.visitor_team_id.as_str()])
        .collect();
    assert_eq!(seeds.len(), 4);

    let final_game = playoff.last().unwrap();
    assert_eq!(report.champion.as_deref(), final_game.winning_team_id.as_deref());

    assert_eq!(report.leaderboard.len(), 4);
    assert!(report
        .leaderboard
        .windows(2)
        .all(|w| w[0].season_points >= w[1].season_points));
    assert!(report.leaderboard[0].season_points > 0.0);

    // Everything the report shows was written through.
    assert_eq!(db.load_matchups(2024).unwrap(), report.matchups);
    assert_eq!(db.pick_count(&report.draft_id).unwrap(), 16);
    let status = db.get_draft_status().unwrap().unwrap();
    assert!(status.is_complete);
    assert_eq!(status.current_pick, 17);
    let drafted = db
        .list_players()
        .unwrap()
        .into_iter()
        .filter(|p| p.status.availability == Availability::Drafted)
        .count();
    assert_eq!(drafted, 16);
    let teams = db.list_teams().unwrap();
    assert_eq!(teams.len(), 4);
    assert!(teams.iter().all(|t| t.waiver_budget <= 100));
}

#[tokio::test]
async fn interrupted_draft_resumes_under_same_id() {
    let config = fixture_config();
    let db = memory_db();
    sim::import_data(&config, &db, &fixture_dir()).unwrap();

    let strategies = bots::build_strategies(&config, &fixture_dir()).unwrap();
    let runner = DraftRunner::new(strategies, config.simulation.draft.policies());

    let (mut state, draft_id, resumed) = sim::prepare_draft(&config, &db).unwrap();
    assert!(!resumed);
    for _ in 0..6 {
        let pick = runner.play_turn(&mut state).await.unwrap();
        persist_pick(&db, &draft_id, &state, &pick).unwrap();
    }
    let partial = state.picks().to_vec();
    drop(state);

    // A new process finds the stored draft and replays it.
    let (mut state, resumed_id, resumed) = sim::prepare_draft(&config, &db).unwrap();
    assert!(resumed);
    assert_eq!(resumed_id, draft_id);
    assert_eq!(state.current_pick(), 7);
    assert_eq!(state.picks(), partial.as_slice());

    let summary = sim::run_draft(&runner, &mut state, &db, &draft_id)
        .await
        .unwrap();
    assert_eq!(summary.drafted, 16);
    assert!(state.is_complete());
    assert_eq!(db.pick_count(&draft_id).unwrap(), 16);

    // Once finished, the next run starts over.
    let (state, _, resumed) = sim::prepare_draft(&config, &db).unwrap();
    assert!(!resumed);
    assert_eq!(state.current_pick(), 1);
    assert!(state.players().iter().all(|p| p.is_available()));
}

#[tokio::test]
async fn interrupted_draft_discarded_when_league_changes() {
    let config = fixture_config();
    let db = memory_db();
    sim::import_data(&config, &db, &fixture_dir()).unwrap();

    let strategies = bots::build_strategies(&config, &fixture_dir()).unwrap();
    let runner = DraftRunner::new(strategies, config.simulation.draft.policies());
    let (mut state, draft_id, _) = sim::prepare_draft(&config, &db).unwrap();
    for _ in 0..3 {
        let pick = runner.play_turn(&mut state).await.unwrap();
        persist_pick(&db, &draft_id, &state, &pick).unwrap();
    }
    drop(state);

    // Same number of teams, but the first two swap draft slots.
    let mut changed = config.clone();
    changed.league.teams.swap(0, 1);

    let (state, _, resumed) = sim::prepare_draft(&changed, &db).unwrap();
    assert!(!resumed);
    assert_eq!(state.current_pick(), 1);
    assert!(state.players().iter().all(|p| p.is_available()));
    assert_eq!(db.pick_count(&draft_id).unwrap(), 0);
    let order: Vec<String> = db.list_teams().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(order, vec!["team_2", "team_1", "team_3", "team_4"]);
}

#[tokio::test]
async fn rerun_after_finished_season_starts_fresh() {
    let config = fixture_config();
    let db = memory_db();

    let first = sim::run(&config, &db, &fixture_dir()).await.unwrap();
    let second = sim::run(&config, &db, &fixture_dir()).await.unwrap();

    assert!(!second.resumed);
    assert_eq!(second.draft.drafted, 16);
    // Deterministic bots on identical data replay the same season.
    assert_eq!(first.champion, second.champion);
    assert_eq!(first.leaderboard, second.leaderboard);
}

#[cfg(unix)]
#[tokio::test]
async fn process_bot_that_passes_forfeits_its_turns() {
    use gridiron_app::config::{BotConfig, BotKind};

    let mut config = fixture_config();
    config.simulation.bots.insert(
        "team_2".to_string(),
        BotConfig {
            kind: BotKind::Process,
            command: vec![
                "sh".into(),
                "-c".into(),
                "cat > /dev/null; echo '{\"player_id\":\"\"}'".into(),
            ],
            waiver_bid: None,
        },
    );
    let db = memory_db();

    let report = sim::run(&config, &db, &fixture_dir()).await.unwrap();
    assert_eq!(report.draft.skipped, 4);
    assert_eq!(report.draft.drafted, 12);

    let picks = db.load_picks(&report.draft_id).unwrap();
    assert!(picks
        .iter()
        .filter(|p| p.team_id == "team_2")
        .all(|p| p.is_skip()));

    let team_2 = report
        .leaderboard
        .iter()
        .find(|e| e.team_id == "team_2")
        .unwrap();
    assert_eq!(team_2.season_points, 0.0);
}
