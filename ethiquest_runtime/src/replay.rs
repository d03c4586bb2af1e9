//! Replay orchestrator — rebuild game state from the decision log.
//!
//! Delegates all domain logic to the engine crate. No shortcuts, no
//! cached state: a replay starts from a fresh initial state and applies
//! every logged decision in sequence order.

use ethiquest_engine::domain::{EngineConfig, GameState};
use ethiquest_engine::engine::DecisionEngine;
use ethiquest_engine::hashing::canonical_hash;

use crate::decision_log::parts_from_record;
use crate::errors::RuntimeError;
use crate::proto_types::ProtoDecisionRecord;

/// Deterministic state id for a player. Replays of the same player must
/// produce byte-identical states, so the id cannot be random.
pub fn state_id_for_player(player_id: &str) -> String {
    format!("gs-{player_id}")
}

/// Rebuild a player's state from their decision log.
///
/// 1. Create a fresh engine + initial state
/// 2. Apply each logged decision sequentially
/// 3. Return (final_state, canonical_hash)
///
/// Pure in the record stream: two replays of the same records always
/// agree, by the engine's determinism guarantee.
pub fn rebuild_state(
    player_id: &str,
    company_name: &str,
    config: &EngineConfig,
    records: &[ProtoDecisionRecord],
) -> Result<(GameState, String), RuntimeError> {
    let mut engine = DecisionEngine::new(config.clone());
    engine.initialize_state(&state_id_for_player(player_id), player_id, company_name);

    for record in records {
        let (scenario, decision) = parts_from_record(record)?;
        engine.apply_decision(&scenario, &decision)?;
    }

    let state = engine.state().clone();
    let hash = canonical_hash(&state);
    Ok((state, hash))
}

/// Rebuild and return only the canonical hash.
pub fn rebuild_hash(
    player_id: &str,
    company_name: &str,
    config: &EngineConfig,
    records: &[ProtoDecisionRecord],
) -> Result<String, RuntimeError> {
    let (_, hash) = rebuild_state(player_id, company_name, config, records)?;
    Ok(hash)
}
