// Error taxonomy for the draft core.

use std::time::Duration;

use thiserror::Error;

use crate::draft::player::Availability;

// ---------------------------------------------------------------------------
// Draft errors
// ---------------------------------------------------------------------------

/// Errors raised by the draft state machine and runner.
///
/// `AlreadyDrafted` is an invariant violation: the player pool is left
/// untouched when it is returned.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("player {player_id} is not available (currently {availability:?})")]
    AlreadyDrafted {
        player_id: String,
        availability: Availability,
    },

    #[error("invalid league setting `{field}`: {message}")]
    InvalidSettings { field: String, message: String },

    #[error("invalid player pool: {0}")]
    InvalidPlayerPool(String),

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("no strategy registered for team {team_id}")]
    MissingStrategy { team_id: String },

    #[error("draft is already complete")]
    DraftComplete,
}

// ---------------------------------------------------------------------------
// Strategy errors
// ---------------------------------------------------------------------------

/// Errors raised while invoking a strategy. The runner never propagates
/// these; they are logged and resolved by the configured failure policy.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("strategy timed out after {0:?}")]
    Timeout(Duration),

    #[error("strategy failed: {0}")]
    Failed(String),

    #[error("failed to spawn strategy process `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("strategy process I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed strategy message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("strategy process exited with {status}: {stderr}")]
    ExitStatus { status: String, stderr: String },
}
