// Majority-vote ensemble over several strategies.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::draft::runner::DEFAULT_TURN_TIMEOUT;
use crate::draft::state::GameSnapshot;
use crate::error::StrategyError;

use super::{draft_player_isolated, Strategy};

/// Asks every member for a pick on the same snapshot and drafts the most
/// common non-empty answer. Ties go to the answer seen first. A member that
/// errors or panics is left out of the vote. Each member gets at most
/// `DEFAULT_TURN_TIMEOUT`.
pub struct MajorityVote {
    name: String,
    members: Vec<Arc<dyn Strategy>>,
}

impl MajorityVote {
    pub fn new(name: &str, members: Vec<Arc<dyn Strategy>>) -> Self {
        MajorityVote {
            name: name.to_string(),
            members,
        }
    }
}

#[async_trait::async_trait]
impl Strategy for MajorityVote {
    fn name(&self) -> &str {
        &self.name
    }

    async fn draft_player(&self, snapshot: &GameSnapshot) -> Result<String, StrategyError> {
        let mut votes: Vec<String> = Vec::with_capacity(self.members.len());
        for member in &self.members {
            let result = draft_player_isolated(
                Arc::clone(member),
                snapshot.clone(),
                DEFAULT_TURN_TIMEOUT,
            )
            .await;
            match result {
                Ok(pick) if !pick.trim().is_empty() => votes.push(pick.trim().to_string()),
                Ok(_) => {}
                Err(e) => warn!("{}: member {} failed: {}", self.name, member.name(), e),
            }
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for vote in &votes {
            *counts.entry(vote.as_str()).or_insert(0) += 1;
        }

        let mut winner: Option<(&str, usize)> = None;
        for vote in &votes {
            let count = counts[vote.as_str()];
            if winner.map_or(true, |(_, best)| count > best) {
                winner = Some((vote.as_str(), count));
            }
        }

        debug!("{}: votes {:?}", self.name, votes);
        Ok(winner.map(|(id, _)| id.to_string()).unwrap_or_default())
    }
}
