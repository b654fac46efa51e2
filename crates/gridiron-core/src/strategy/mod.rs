//! Strategy trait and implementations.
//!
//! A strategy only expresses intent through its return value. It receives an
//! isolated snapshot and has no handle on the live draft state.

mod builtin;
mod ensemble;
mod process;

pub use builtin::{BestAvailable, FnStrategy};
pub use ensemble::MajorityVote;
pub use process::ProcessStrategy;

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::draft::state::GameSnapshot;
use crate::error::StrategyError;
use crate::protocol::WaiverClaim;

/// A drafting and waiver bot.
#[async_trait::async_trait]
pub trait Strategy: Send + Sync {
    /// Display name used in logs.
    fn name(&self) -> &str;

    /// Choose a player id to draft. An empty string passes the turn.
    async fn draft_player(&self, snapshot: &GameSnapshot) -> Result<String, StrategyError>;

    /// Waiver claims for the week in `snapshot.week`. Claims are validated
    /// and resolved by the host, not the strategy.
    async fn weekly_actions(
        &self,
        _snapshot: &GameSnapshot,
    ) -> Result<Vec<WaiverClaim>, StrategyError> {
        Ok(Vec::new())
    }
}

/// Ask `strategy` for a draft pick on its own task, bounded by `timeout`.
///
/// A panic inside the strategy comes back as `StrategyError::Failed`
/// instead of unwinding into the caller.
pub async fn draft_player_isolated(
    strategy: Arc<dyn Strategy>,
    snapshot: GameSnapshot,
    timeout: Duration,
) -> Result<String, StrategyError> {
    let handle = tokio::spawn(async move { strategy.draft_player(&snapshot).await });
    join_within(handle, timeout).await
}

/// Same as [`draft_player_isolated`] for weekly waiver claims.
pub async fn weekly_actions_isolated(
    strategy: Arc<dyn Strategy>,
    snapshot: GameSnapshot,
    timeout: Duration,
) -> Result<Vec<WaiverClaim>, StrategyError> {
    let handle = tokio::spawn(async move { strategy.weekly_actions(&snapshot).await });
    join_within(handle, timeout).await
}

async fn join_within<T>(
    handle: JoinHandle<Result<T, StrategyError>>,
    timeout: Duration,
) -> Result<T, StrategyError> {
    let abort = handle.abort_handle();
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) if e.is_panic() => Err(StrategyError::Failed(format!(
            "strategy panicked: {}",
            panic_message(e.into_panic())
        ))),
        Ok(Err(e)) => Err(StrategyError::Failed(e.to_string())),
        Err(_) => {
            // Dropping a JoinHandle detaches the task, so stop it explicitly.
            abort.abort();
            Err(StrategyError::Timeout(timeout))
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
