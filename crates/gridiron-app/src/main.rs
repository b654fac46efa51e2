// Gridiron simulator entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, not terminal)
// 2. Load config
// 3. Open database
// 4. Run the simulation (import data, draft or resume, season, playoffs)
// 5. Print the results

use gridiron_app::config;
use gridiron_app::db;
use gridiron_app::sim;

use anyhow::Context;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing (log to file, not terminal)
    init_tracing()?;
    info!("Gridiron simulator starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: league={}, {} teams, {} rounds",
        config.league.name, config.league.num_teams, config.league.total_rounds
    );

    // 3. Open database
    let db_path = config.resolve_db_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let db_path_str = db_path.to_string_lossy();
    let db = db::Database::open(&db_path_str).context("failed to open database")?;
    info!("Database opened at {}", db_path_str);

    // 4. Run the simulation
    let base_dir = std::env::current_dir().context("failed to read working directory")?;
    let report = match sim::run(&config, &db, &base_dir).await {
        Ok(report) => report,
        Err(e) => {
            error!("Simulation failed: {:#}", e);
            return Err(e);
        }
    };

    // 5. Print the results
    println!("{}", config.league.name);
    println!(
        "Draft {}{}: {} drafted, {} auto-drafted, {} skipped",
        report.draft_id,
        if report.resumed { " (resumed)" } else { "" },
        report.draft.drafted,
        report.draft.auto_drafted,
        report.draft.skipped
    );
    println!("Waiver claims awarded: {}", report.waiver_awards);

    println!();
    println!("Standings");
    for s in &report.standings {
        println!(
            "{:>3}. {:<16} {:>2}-{:<2} PF {:>8.2} PA {:>8.2}",
            s.rank, s.team_id, s.wins, s.losses, s.points_for, s.points_against
        );
    }

    if let Some(champion) = &report.champion {
        println!();
        println!("Champion: {champion}");
    }

    println!();
    println!("Best possible season");
    for (i, entry) in report.leaderboard.iter().enumerate() {
        println!(
            "{:>3}. {:<24} {:>9.2}",
            i + 1,
            entry.team_name,
            entry.season_points
        );
    }

    info!("Gridiron simulator finished");
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("gridiron.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("gridiron=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
