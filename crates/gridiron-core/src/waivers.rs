// FAAB waiver processing: claim resolution and roster application.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::draft::player::Availability;
use crate::draft::state::{DraftState, Team};
use crate::protocol::WaiverClaim;

/// Claims a single team may win in one run.
pub const DEFAULT_MAX_ADDS_PER_RUN: usize = 3;

/// A claim that won its auction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AwardedClaim {
    pub team_id: String,
    pub claim: WaiverClaim,
}

/// A winning claim that could not be applied to the rosters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedClaim {
    pub award: AwardedClaim,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaiverReport {
    pub applied: Vec<AwardedClaim>,
    pub rejected: Vec<RejectedClaim>,
}

struct Candidate<'a> {
    team: &'a Team,
    claim: &'a WaiverClaim,
}

/// Keep each team's highest bid per add target. The first claim wins a tie.
fn dedupe_claims(claims: &[WaiverClaim]) -> Vec<&WaiverClaim> {
    let mut best: Vec<&WaiverClaim> = Vec::new();
    for claim in claims {
        match best
            .iter_mut()
            .find(|c| c.player_to_add_id == claim.player_to_add_id)
        {
            Some(existing) if claim.bid_amount > existing.bid_amount => *existing = claim,
            Some(_) => {}
            None => best.push(claim),
        }
    }
    best
}

/// Resolve sealed FAAB bids.
///
/// The globally highest affordable bid is awarded repeatedly until nothing
/// is left. Equal bids go to the lower `waiver_priority` value, then to the
/// team drafting later. A bid is affordable when it does not exceed the
/// team's remaining budget, which is debited as claims are won. A team wins
/// at most `max_adds_per_run` claims. Awards come back in the order they
/// were decided.
pub fn resolve_faab(
    teams: &[Team],
    claims_by_team: &[(String, Vec<WaiverClaim>)],
    max_adds_per_run: usize,
) -> Vec<AwardedClaim> {
    let mut pending: Vec<Candidate> = Vec::new();
    for (team_id, claims) in claims_by_team {
        let Some(team) = teams.iter().find(|t| &t.id == team_id) else {
            warn!("ignoring waiver claims from unknown team {}", team_id);
            continue;
        };
        for claim in dedupe_claims(claims) {
            if claim.player_to_add_id.is_empty() {
                continue;
            }
            pending.push(Candidate { team, claim });
        }
    }

    let mut budgets: HashMap<&str, u32> = teams
        .iter()
        .map(|t| (t.id.as_str(), t.waiver_budget))
        .collect();
    let mut wins: HashMap<&str, usize> = HashMap::new();
    let mut taken: HashSet<&str> = HashSet::new();
    let mut awards = Vec::new();

    loop {
        let mut best: Option<usize> = None;
        for (i, cand) in pending.iter().enumerate() {
            let team_id = cand.team.id.as_str();
            if taken.contains(cand.claim.player_to_add_id.as_str())
                || wins.get(team_id).copied().unwrap_or(0) >= max_adds_per_run
                || cand.claim.bid_amount > budgets.get(team_id).copied().unwrap_or(0)
            {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => {
                    let cur = &pending[b];
                    (
                        cand.claim.bid_amount,
                        std::cmp::Reverse(cand.team.waiver_priority),
                        cand.team.draft_order,
                    ) > (
                        cur.claim.bid_amount,
                        std::cmp::Reverse(cur.team.waiver_priority),
                        cur.team.draft_order,
                    )
                }
            };
            if better {
                best = Some(i);
            }
        }

        let Some(i) = best else { break };
        let cand = pending.remove(i);
        let team_id = cand.team.id.as_str();
        if let Some(budget) = budgets.get_mut(team_id) {
            *budget -= cand.claim.bid_amount;
        }
        *wins.entry(team_id).or_insert(0) += 1;
        taken.insert(cand.claim.player_to_add_id.as_str());

        debug!(
            "{} wins {} for ${}",
            team_id, cand.claim.player_to_add_id, cand.claim.bid_amount
        );
        awards.push(AwardedClaim {
            team_id: team_id.to_string(),
            claim: cand.claim.clone(),
        });
    }

    awards
}

/// Give every team a waiver priority in reverse draft order when none has
/// one yet. The last team to draft gets priority 1.
pub fn init_waiver_priorities(teams: &mut [Team]) -> bool {
    if teams.iter().any(|t| t.waiver_priority != 0) {
        return false;
    }
    let n = teams.len();
    let mut orders: Vec<usize> = teams.iter().map(|t| t.draft_order).collect();
    orders.sort_unstable();
    for team in teams.iter_mut() {
        let rank = orders.partition_point(|&o| o < team.draft_order);
        team.waiver_priority = (n - rank) as u32;
    }
    info!("Initialized waiver priorities for {} teams", n);
    true
}

/// Start-of-run housekeeping: last week's drops become available again and
/// priorities are initialized if needed. Returns how many players were
/// released.
pub fn prepare_waiver_run(state: &mut DraftState) -> usize {
    let mut released = 0;
    for player in state.players_mut().iter_mut() {
        if player.status.availability == Availability::OnHold {
            player.status.availability = Availability::Available;
            debug!("{} is available again", player.full_name);
            released += 1;
        }
    }
    init_waiver_priorities(&mut state.teams);
    released
}

fn validate_award(state: &DraftState, award: &AwardedClaim) -> Result<(), String> {
    let claim = &award.claim;
    let Some(team) = state.team(&award.team_id) else {
        return Err(format!("unknown team {}", award.team_id));
    };
    if claim.bid_amount > team.waiver_budget {
        return Err(format!(
            "bid {} exceeds remaining budget {}",
            claim.bid_amount, team.waiver_budget
        ));
    }
    match state.players().get(&claim.player_to_add_id) {
        Some(p) if p.is_available() => {}
        Some(p) => {
            return Err(format!(
                "{} is {:?}",
                claim.player_to_add_id, p.status.availability
            ))
        }
        None => return Err(format!("unknown player {}", claim.player_to_add_id)),
    }
    if !claim.player_to_drop_id.is_empty() {
        match state.players().get(&claim.player_to_drop_id) {
            Some(p) if p.is_owned_by(&award.team_id) => {}
            _ => {
                return Err(format!(
                    "{} is not on {}'s roster",
                    claim.player_to_drop_id, award.team_id
                ))
            }
        }
    }
    Ok(())
}

/// Resolve the week's claims and apply the winners to the player pool.
///
/// Each award is checked against the pool as it stands when applied: the
/// added player must still be available and the dropped player must belong
/// to the claiming team. Dropped players go on hold until the next run.
pub fn apply_waivers(
    state: &mut DraftState,
    claims_by_team: &[(String, Vec<WaiverClaim>)],
    max_adds_per_run: usize,
) -> WaiverReport {
    let awards = resolve_faab(&state.teams, claims_by_team, max_adds_per_run);
    let mut report = WaiverReport::default();

    for award in awards {
        if let Err(reason) = validate_award(state, &award) {
            warn!(
                "Rejected waiver claim by {} for {}: {}",
                award.team_id, award.claim.player_to_add_id, reason
            );
            report.rejected.push(RejectedClaim { award, reason });
            continue;
        }

        let claim = &award.claim;
        if let Some(team) = state.team_mut(&award.team_id) {
            team.waiver_budget -= claim.bid_amount;
        }
        if let Some(added) = state.players_mut().get_mut(&claim.player_to_add_id) {
            added.status.availability = Availability::Drafted;
            added.status.owning_team_id = Some(award.team_id.clone());
        }
        if let Some(dropped) = state.players_mut().get_mut(&claim.player_to_drop_id) {
            dropped.status.availability = Availability::OnHold;
            dropped.status.owning_team_id = None;
        }

        info!(
            "Waiver: {} adds {} drops {} for ${}",
            award.team_id,
            claim.player_to_add_id,
            if claim.player_to_drop_id.is_empty() {
                "nobody"
            } else {
                claim.player_to_drop_id.as_str()
            },
            claim.bid_amount
        );
        report.applied.push(award);
    }

    report
}
