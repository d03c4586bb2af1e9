/// State invariant checks.
///
/// Run after every resolution and on snapshot restore. All checks return
/// `Err(message)` on the first failure so callers can surface the reason
/// without aborting the process.

use std::collections::BTreeSet;

use crate::domain::GameState;

/// Run every invariant check. `Ok(())` if all pass.
pub fn validate_state(state: &GameState) -> Result<(), String> {
    check_level_floor(state)?;
    check_satisfaction_keys(state)?;
    check_satisfaction_values(state)?;
    check_scale_bounds(state)?;
    check_finite_resources(state)?;
    check_unique_challenge_ids(state)?;
    Ok(())
}

fn check_level_floor(state: &GameState) -> Result<(), String> {
    if state.level < 1 {
        return Err(format!("level must be >= 1, got {}", state.level));
    }
    Ok(())
}

fn check_satisfaction_keys(state: &GameState) -> Result<(), String> {
    for key in state.stakeholder_satisfaction.keys() {
        if key.trim().is_empty() {
            return Err("stakeholder satisfaction contains an empty key".to_string());
        }
    }
    Ok(())
}

fn check_satisfaction_values(state: &GameState) -> Result<(), String> {
    for (key, value) in &state.stakeholder_satisfaction {
        if !value.is_finite() {
            return Err(format!("satisfaction for {key:?} is not finite"));
        }
        if !(0.0..=100.0).contains(value) {
            return Err(format!(
                "satisfaction for {key:?} is {value}, outside [0, 100]"
            ));
        }
    }
    Ok(())
}

fn check_scale_bounds(state: &GameState) -> Result<(), String> {
    if !(0.0..=100.0).contains(&state.reputation_points) {
        return Err(format!(
            "reputation is {}, outside [0, 100]",
            state.reputation_points
        ));
    }
    if !(0.0..=100.0).contains(&state.market_share) {
        return Err(format!(
            "market share is {}, outside [0, 100]",
            state.market_share
        ));
    }
    Ok(())
}

fn check_finite_resources(state: &GameState) -> Result<(), String> {
    // Negative is allowed (insolvency), non-finite is not.
    if !state.financial_resources.is_finite() {
        return Err("financial resources are not finite".to_string());
    }
    Ok(())
}

fn check_unique_challenge_ids(state: &GameState) -> Result<(), String> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for challenge in &state.active_challenges {
        if !seen.insert(challenge.id.as_str()) {
            return Err(format!("duplicate challenge id {:?}", challenge.id));
        }
    }
    Ok(())
}
