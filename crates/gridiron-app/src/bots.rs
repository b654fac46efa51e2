// Strategy construction from the `[bots.<team_id>]` config tables.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use gridiron_core::error::StrategyError;
use gridiron_core::strategy::{BestAvailable, ProcessStrategy, Strategy};

use crate::config::{BotConfig, BotKind, Config};

/// Bid used by best-available bots that do not set `waiver_bid`.
pub const DEFAULT_WAIVER_BID: u32 = 1;

/// One strategy per configured team. Teams without a `[bots.*]` entry get a
/// best-available bot. Process bots run with `base_dir` as their working
/// directory so relative script paths resolve against it.
pub fn build_strategies(
    config: &Config,
    base_dir: &Path,
) -> Result<HashMap<String, Arc<dyn Strategy>>, StrategyError> {
    let mut strategies: HashMap<String, Arc<dyn Strategy>> = HashMap::new();

    for team in &config.league.teams {
        let strategy = match config.simulation.bots.get(&team.id) {
            Some(bot) => build_one(&team.id, bot, base_dir)?,
            None => {
                info!("{} has no bot configured, using best_available", team.id);
                Arc::new(BestAvailable::new(&format!("best_available:{}", team.id)))
            }
        };
        strategies.insert(team.id.clone(), strategy);
    }

    Ok(strategies)
}

fn build_one(
    team_id: &str,
    bot: &BotConfig,
    base_dir: &Path,
) -> Result<Arc<dyn Strategy>, StrategyError> {
    let strategy: Arc<dyn Strategy> = match bot.kind {
        BotKind::BestAvailable => Arc::new(
            BestAvailable::new(&format!("best_available:{team_id}"))
                .with_waiver_bid(bot.waiver_bid.unwrap_or(DEFAULT_WAIVER_BID)),
        ),
        BotKind::Process => Arc::new(
            ProcessStrategy::new(&format!("process:{team_id}"), &bot.command)?
                .with_cwd(base_dir),
        ),
    };
    info!("{} drafts with {}", team_id, strategy.name());
    Ok(strategy)
}
