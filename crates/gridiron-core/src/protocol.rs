// Wire messages exchanged with out-of-process strategies.
//
// One JSON request is written to the strategy's stdin, one JSON response is
// read back from its stdout. Unknown fields are ignored and missing fields
// fall back to defaults so either side can add fields without breaking the
// other.

use serde::{Deserialize, Serialize};

use crate::draft::state::GameSnapshot;

/// Current message version. Bumped when a field changes meaning.
pub const PROTOCOL_VERSION: u32 = 1;

fn current_version() -> u32 {
    PROTOCOL_VERSION
}

/// What the host is asking the strategy to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    DraftPlayer,
    WeeklyActions,
}

/// Host -> strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRequest {
    #[serde(default = "current_version")]
    pub protocol_version: u32,
    pub kind: RequestKind,
    pub snapshot: GameSnapshot,
}

impl StrategyRequest {
    pub fn new(kind: RequestKind, snapshot: GameSnapshot) -> Self {
        StrategyRequest {
            protocol_version: PROTOCOL_VERSION,
            kind,
            snapshot,
        }
    }
}

/// Strategy -> host, answering `DraftPlayer`. An empty id means "no pick".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSelection {
    #[serde(default = "current_version")]
    pub protocol_version: u32,
    #[serde(default)]
    pub player_id: String,
}

impl DraftSelection {
    pub fn new(player_id: &str) -> Self {
        DraftSelection {
            protocol_version: PROTOCOL_VERSION,
            player_id: player_id.to_string(),
        }
    }
}

/// One add/drop request with a FAAB bid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaiverClaim {
    pub player_to_add_id: String,
    /// Empty when the team has an open roster spot.
    #[serde(default)]
    pub player_to_drop_id: String,
    #[serde(default)]
    pub bid_amount: u32,
}

impl WaiverClaim {
    pub fn new(add: &str, drop: &str, bid_amount: u32) -> Self {
        WaiverClaim {
            player_to_add_id: add.to_string(),
            player_to_drop_id: drop.to_string(),
            bid_amount,
        }
    }
}

/// Strategy -> host, answering `WeeklyActions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptedFantasyActions {
    #[serde(default = "current_version")]
    pub protocol_version: u32,
    #[serde(default)]
    pub waiver_claims: Vec<WaiverClaim>,
}

impl Default for AttemptedFantasyActions {
    fn default() -> Self {
        AttemptedFantasyActions {
            protocol_version: PROTOCOL_VERSION,
            waiver_claims: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_defaults_missing_fields() {
        let sel: DraftSelection = serde_json::from_str("{}").unwrap();
        assert_eq!(sel.protocol_version, PROTOCOL_VERSION);
        assert!(sel.player_id.is_empty());
    }

    #[test]
    fn selection_ignores_unknown_fields() {
        let sel: DraftSelection =
            serde_json::from_str(r#"{"player_id":"p7","confidence":0.9,"protocol_version":1}"#)
                .unwrap();
        assert_eq!(sel.player_id, "p7");
    }

    #[test]
    fn waiver_claim_optional_drop() {
        let actions: AttemptedFantasyActions = serde_json::from_str(
            r#"{"waiver_claims":[{"player_to_add_id":"p1","bid_amount":12},{"player_to_add_id":"p2","player_to_drop_id":"p9"}]}"#,
        )
        .unwrap();
        assert_eq!(actions.waiver_claims.len(), 2);
        assert_eq!(actions.waiver_claims[0], WaiverClaim::new("p1", "", 12));
        assert_eq!(actions.waiver_claims[1].bid_amount, 0);
    }

    #[test]
    fn request_kind_snake_case() {
        let json = serde_json::to_string(&RequestKind::WeeklyActions).unwrap();
        assert_eq!(json, "\"weekly_actions\"");
    }
}
