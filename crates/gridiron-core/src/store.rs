// Persistence collaborator used by the draft loop.

use serde::{Deserialize, Serialize};

use crate::draft::pick::DraftPick;
use crate::draft::player::Player;
use crate::draft::state::{DraftState, LeagueSettings, Team};

/// Progress marker stored alongside the picks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftStatus {
    pub draft_id: String,
    pub current_pick: u32,
    #[serde(default)]
    pub drafting_team_id: Option<String>,
    #[serde(default)]
    pub is_complete: bool,
}

impl DraftStatus {
    pub fn from_state(draft_id: &str, state: &DraftState) -> Self {
        DraftStatus {
            draft_id: draft_id.to_string(),
            current_pick: state.current_pick(),
            drafting_team_id: state.drafting_team_id().map(str::to_string),
            is_complete: state.is_complete(),
        }
    }
}

/// Narrow storage interface the draft depends on.
pub trait DraftStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get_draft_status(&self) -> Result<Option<DraftStatus>, Self::Error>;
    fn get_league_settings(&self) -> Result<Option<LeagueSettings>, Self::Error>;
    fn list_players(&self) -> Result<Vec<Player>, Self::Error>;
    fn list_teams(&self) -> Result<Vec<Team>, Self::Error>;
    fn get_player(&self, player_id: &str) -> Result<Option<Player>, Self::Error>;
    fn mark_drafted(&self, player_id: &str, team_id: &str, pick_number: u32)
        -> Result<(), Self::Error>;
    fn advance_pick(&self, status: &DraftStatus) -> Result<(), Self::Error>;
    fn record_pick(&self, draft_id: &str, pick: &DraftPick) -> Result<(), Self::Error>;
    fn load_picks(&self, draft_id: &str) -> Result<Vec<DraftPick>, Self::Error>;
}

/// Write one applied pick through to the store.
pub fn persist_pick<S: DraftStore>(
    store: &S,
    draft_id: &str,
    state: &DraftState,
    pick: &DraftPick,
) -> Result<(), S::Error> {
    store.record_pick(draft_id, pick)?;
    if let Some(player_id) = &pick.player_id {
        store.mark_drafted(player_id, &pick.team_id, pick.pick_number)?;
    }
    store.advance_pick(&DraftStatus::from_state(draft_id, state))
}
