// In-process strategies.

use crate::draft::player::Player;
use crate::draft::state::GameSnapshot;
use crate::error::StrategyError;
use crate::protocol::WaiverClaim;

use super::Strategy;

/// Drafts the best-ranked available player at any position.
///
/// On waivers it bids for the best-ranked free agent whenever that player
/// outranks the worst player on the roster, dropping the latter.
pub struct BestAvailable {
    name: String,
    waiver_bid: u32,
}

impl BestAvailable {
    pub fn new(name: &str) -> Self {
        BestAvailable {
            name: name.to_string(),
            waiver_bid: 1,
        }
    }

    pub fn with_waiver_bid(mut self, bid: u32) -> Self {
        self.waiver_bid = bid;
        self
    }
}

#[async_trait::async_trait]
impl Strategy for BestAvailable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn draft_player(&self, snapshot: &GameSnapshot) -> Result<String, StrategyError> {
        Ok(snapshot
            .players
            .best_available()
            .map(|p| p.id.clone())
            .unwrap_or_default())
    }

    async fn weekly_actions(
        &self,
        snapshot: &GameSnapshot,
    ) -> Result<Vec<WaiverClaim>, StrategyError> {
        let Some(target) = snapshot.players.best_available() else {
            return Ok(Vec::new());
        };
        let worst: Option<&Player> = snapshot
            .my_players()
            .into_iter()
            .max_by_key(|p| p.rank);
        let Some(worst) = worst else {
            return Ok(Vec::new());
        };
        if target.rank >= worst.rank {
            return Ok(Vec::new());
        }

        let budget = snapshot.my_team().map(|t| t.waiver_budget).unwrap_or(0);
        let bid = self.waiver_bid.min(budget);
        Ok(vec![WaiverClaim::new(&target.id, &worst.id, bid)])
    }
}

type DraftFn = dyn Fn(&GameSnapshot) -> String + Send + Sync;

/// Wraps a plain function as a draft strategy.
pub struct FnStrategy {
    name: String,
    pick: Box<DraftFn>,
}

impl FnStrategy {
    pub fn new<F>(name: &str, pick: F) -> Self
    where
        F: Fn(&GameSnapshot) -> String + Send + Sync + 'static,
    {
        FnStrategy {
            name: name.to_string(),
            pick: Box::new(pick),
        }
    }
}

#[async_trait::async_trait]
impl Strategy for FnStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    async fn draft_player(&self, snapshot: &GameSnapshot) -> Result<String, StrategyError> {
        Ok((self.pick)(snapshot))
    }
}
