// Draft runner: asks each team's strategy for a pick and applies it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::pick::DraftPick;
use super::state::DraftState;
use crate::error::DraftError;
use crate::protocol::WaiverClaim;
use crate::strategy::{draft_player_isolated, weekly_actions_isolated, Strategy};

/// Default time a strategy gets to answer.
pub const DEFAULT_TURN_TIMEOUT: Duration = Duration::from_secs(30);

/// What to do when a strategy errors or times out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    #[default]
    Skip,
    AutoDraft,
}

/// What to do when a strategy picks a player who is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Stop the draft with `AlreadyDrafted`.
    #[default]
    Abort,
    Skip,
    AutoDraft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DraftPolicies {
    pub turn_timeout: Duration,
    pub on_strategy_failure: FailurePolicy,
    pub on_duplicate_pick: DuplicatePolicy,
}

impl Default for DraftPolicies {
    fn default() -> Self {
        DraftPolicies {
            turn_timeout: DEFAULT_TURN_TIMEOUT,
            on_strategy_failure: FailurePolicy::default(),
            on_duplicate_pick: DuplicatePolicy::default(),
        }
    }
}

/// Counts reported once the draft finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSummary {
    pub drafted: u32,
    pub skipped: u32,
    pub auto_drafted: u32,
}

impl DraftSummary {
    pub fn record(&mut self, pick: &DraftPick) {
        if pick.is_skip() {
            self.skipped += 1;
        } else {
            self.drafted += 1;
            if pick.auto_drafted {
                self.auto_drafted += 1;
            }
        }
    }

    pub fn turns(&self) -> u32 {
        self.drafted + self.skipped
    }
}

/// Drives a draft one turn at a time. Strategies only ever see snapshots.
pub struct DraftRunner {
    strategies: HashMap<String, Arc<dyn Strategy>>,
    policies: DraftPolicies,
}

impl DraftRunner {
    pub fn new(strategies: HashMap<String, Arc<dyn Strategy>>, policies: DraftPolicies) -> Self {
        DraftRunner {
            strategies,
            policies,
        }
    }

    pub fn policies(&self) -> &DraftPolicies {
        &self.policies
    }

    pub fn strategy(&self, team_id: &str) -> Option<&Arc<dyn Strategy>> {
        self.strategies.get(team_id)
    }

    /// Every team needs a strategy before the draft can start.
    pub fn validate(&self, state: &DraftState) -> Result<(), DraftError> {
        for team in &state.teams {
            if !self.strategies.contains_key(&team.id) {
                return Err(DraftError::MissingStrategy {
                    team_id: team.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Run the current team's turn.
    pub async fn play_turn(&self, state: &mut DraftState) -> Result<DraftPick, DraftError> {
        let team_id = state
            .current_team()
            .map(|t| t.id.clone())
            .ok_or(DraftError::DraftComplete)?;
        let strategy = self
            .strategies
            .get(&team_id)
            .ok_or_else(|| DraftError::MissingStrategy {
                team_id: team_id.clone(),
            })?;

        let snapshot = state.snapshot(&team_id, None);
        let player_id = match draft_player_isolated(
            Arc::clone(strategy),
            snapshot,
            self.policies.turn_timeout,
        )
        .await
        {
            Ok(player_id) => player_id,
            Err(e) => {
                warn!(
                    "Pick {}: strategy {} for {} failed: {}",
                    state.current_pick(),
                    strategy.name(),
                    team_id,
                    e
                );
                return match self.policies.on_strategy_failure {
                    FailurePolicy::Skip => state.apply_pick(""),
                    FailurePolicy::AutoDraft => state.apply_auto_pick(),
                };
            }
        };

        match state.apply_pick(&player_id) {
            Err(DraftError::AlreadyDrafted {
                player_id,
                availability,
            }) => match self.policies.on_duplicate_pick {
                DuplicatePolicy::Abort => {
                    error!(
                        "Pick {}: {} chose {} which is {:?}; aborting draft",
                        state.current_pick(),
                        team_id,
                        player_id,
                        availability
                    );
                    Err(DraftError::AlreadyDrafted {
                        player_id,
                        availability,
                    })
                }
                DuplicatePolicy::Skip => {
                    warn!(
                        "Pick {}: {} chose unavailable player {}, skipping turn",
                        state.current_pick(),
                        team_id,
                        player_id
                    );
                    state.apply_pick("")
                }
                DuplicatePolicy::AutoDraft => {
                    warn!(
                        "Pick {}: {} chose unavailable player {}, auto-drafting",
                        state.current_pick(),
                        team_id,
                        player_id
                    );
                    state.apply_auto_pick()
                }
            },
            other => other,
        }
    }

    /// Run every remaining turn. The state's pick counter ends at
    /// `total_picks + 1`.
    pub async fn run_to_completion(&self, state: &mut DraftState) -> Result<DraftSummary, DraftError> {
        self.validate(state)?;

        let mut summary = DraftSummary::default();
        while !state.is_complete() {
            let pick = self.play_turn(state).await?;
            summary.record(&pick);
        }

        info!(
            "Draft complete: {} drafted ({} auto), {} skipped",
            summary.drafted, summary.auto_drafted, summary.skipped
        );
        Ok(summary)
    }

    /// Collect every team's waiver claims for `week`, in draft order.
    ///
    /// A strategy that fails or times out submits no claims.
    pub async fn collect_claims(
        &self,
        state: &DraftState,
        week: u32,
    ) -> Vec<(String, Vec<WaiverClaim>)> {
        let timeout = self.policies.turn_timeout;
        let mut all = Vec::with_capacity(state.teams.len());

        for team in &state.teams {
            let Some(strategy) = self.strategies.get(&team.id) else {
                continue;
            };
            let snapshot = state.snapshot(&team.id, Some(week));
            match weekly_actions_isolated(Arc::clone(strategy), snapshot, timeout).await {
                Ok(claims) => all.push((team.id.clone(), claims)),
                Err(e) => {
                    warn!(
                        "Week {}: strategy {} for {} failed: {}",
                        week,
                        strategy.name(),
                        team.id,
                        e
                    );
                    all.push((team.id.clone(), Vec::new()));
                }
            }
        }
        all
    }
}
