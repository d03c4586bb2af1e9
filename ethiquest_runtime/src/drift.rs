//! Drift detection — determinism verification and state comparison.
//!
//! Used by operational tooling to confirm that a live session's state
//! agrees with a fresh replay of its decision log, and to summarize how
//! two states differ when it does not.

use std::collections::BTreeSet;

use ethiquest_engine::domain::{EngineConfig, GameState};

use crate::errors::RuntimeError;
use crate::proto_types::ProtoDecisionRecord;
use crate::replay;

/// Verify determinism by replaying the same records twice and asserting
/// identical hashes. Returns the agreed hash. Panics on disagreement —
/// a nondeterministic engine is unrecoverable, not a caller error.
pub fn verify_determinism(
    player_id: &str,
    company_name: &str,
    config: &EngineConfig,
    records: &[ProtoDecisionRecord],
) -> Result<String, RuntimeError> {
    let (_, hash1) = replay::rebuild_state(player_id, company_name, config, records)?;
    let (_, hash2) = replay::rebuild_state(player_id, company_name, config, records)?;

    if hash1 != hash2 {
        panic!(
            "DETERMINISM FAILURE: two replays produced different hashes.\n\
             Run 1: {hash1}\n\
             Run 2: {hash2}"
        );
    }
    Ok(hash1)
}

/// Structured comparison of two states.
pub fn compare_states(state_a: &GameState, state_b: &GameState) -> DriftReport {
    let ids_a: BTreeSet<&str> = state_a.active_challenges.iter().map(|c| c.id.as_str()).collect();
    let ids_b: BTreeSet<&str> = state_b.active_challenges.iter().map(|c| c.id.as_str()).collect();

    let opened_challenges: Vec<String> =
        ids_b.difference(&ids_a).map(|s| s.to_string()).collect();
    let closed_challenges: Vec<String> =
        ids_a.difference(&ids_b).map(|s| s.to_string()).collect();

    let names_a: BTreeSet<&str> = state_a
        .stakeholder_satisfaction
        .keys()
        .map(|s| s.as_str())
        .collect();
    let names_b: BTreeSet<&str> = state_b
        .stakeholder_satisfaction
        .keys()
        .map(|s| s.as_str())
        .collect();

    let mut satisfaction_deltas = Vec::new();
    for name in names_a.intersection(&names_b) {
        let a = state_a.stakeholder_satisfaction[*name];
        let b = state_b.stakeholder_satisfaction[*name];
        if a != b {
            satisfaction_deltas.push((name.to_string(), b - a));
        }
    }

    DriftReport {
        level_delta: state_b.level as i64 - state_a.level as i64,
        experience_delta: state_b.experience_points as i64 - state_a.experience_points as i64,
        financial_delta: state_b.financial_resources - state_a.financial_resources,
        reputation_delta: state_b.reputation_points - state_a.reputation_points,
        market_share_delta: state_b.market_share - state_a.market_share,
        satisfaction_deltas,
        opened_challenges,
        closed_challenges,
    }
}

/// Drift summary between two states.
#[derive(Debug, Clone)]
pub struct DriftReport {
    pub level_delta: i64,
    pub experience_delta: i64,
    pub financial_delta: f64,
    pub reputation_delta: f64,
    pub market_share_delta: f64,
    /// (stakeholder, satisfaction change) for stakeholders in both states.
    pub satisfaction_deltas: Vec<(String, f64)>,
    pub opened_challenges: Vec<String>,
    pub closed_challenges: Vec<String>,
}

impl DriftReport {
    /// True when the two states are identical in every compared field.
    pub fn is_clean(&self) -> bool {
        self.level_delta == 0
            && self.experience_delta == 0
            && self.financial_delta == 0.0
            && self.reputation_delta == 0.0
            && self.market_share_delta == 0.0
            && self.satisfaction_deltas.is_empty()
            && self.opened_challenges.is_empty()
            && self.closed_challenges.is_empty()
    }
}
