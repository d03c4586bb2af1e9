/// Decision resolution — the single state-mutation path.
///
/// `resolve_decision` validates fully before touching anything, then
/// builds the next state from a clone of the current one. The input
/// state is never mutated; a failed resolution returns an error and
/// nothing else.

use std::collections::BTreeMap;

use tracing::{info, warn};

use crate::challenges::sync_challenges;
use crate::domain::{
    Decision, EngineConfig, GameState, ResolutionOutcome, Scenario, SustainabilityRating,
};
use crate::errors::EngineError;
use crate::metrics::{clamp_scale, percent_change};
use crate::progression::level_for_xp;
use crate::validity;

/// Where an impact key routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImpactTarget {
    Financial,
    Reputation,
    /// A key present in the state's satisfaction map.
    Stakeholder(String),
    /// No recognized target; recorded for audit, no numeric effect.
    Unmodeled(String),
}

/// Classify an impact key against the current state.
pub fn classify_impact(key: &str, state: &GameState) -> ImpactTarget {
    match key {
        "financial" => ImpactTarget::Financial,
        "reputation" => ImpactTarget::Reputation,
        _ if state.stakeholder_satisfaction.contains_key(key) => {
            ImpactTarget::Stakeholder(key.to_string())
        }
        _ => ImpactTarget::Unmodeled(key.to_string()),
    }
}

/// Resolve a player's decision against a scenario, producing the next
/// state and an audit outcome.
///
/// Fails with [`EngineError::InvalidApproach`], [`EngineError::ScenarioExpired`],
/// [`EngineError::EmptyRationale`] or [`EngineError::ScenarioMismatch`]
/// without modifying anything. Unrecognized impact keys are not errors:
/// they are logged and reported in the outcome.
pub fn resolve_decision(
    state: &GameState,
    scenario: &Scenario,
    decision: &Decision,
    config: &EngineConfig,
) -> Result<(GameState, ResolutionOutcome), EngineError> {
    // -- Validation, before any mutation --
    if decision.scenario_id != scenario.id {
        return Err(EngineError::ScenarioMismatch {
            expected: decision.scenario_id.clone(),
            actual: scenario.id.clone(),
        });
    }

    let approach = scenario.approach(&decision.approach_id).ok_or_else(|| {
        EngineError::InvalidApproach {
            scenario_id: scenario.id.clone(),
            approach_id: decision.approach_id.clone(),
        }
    })?;

    if scenario.time_constraint.is_some() && !validity::is_valid(scenario, decision.timestamp) {
        let overdue = validity::remaining_time(scenario, decision.timestamp)
            .map(|remaining| -remaining)
            .unwrap_or(0);
        return Err(EngineError::ScenarioExpired {
            scenario_id: scenario.id.clone(),
            overdue_seconds: overdue,
        });
    }

    if decision.rationale.trim().is_empty() {
        return Err(EngineError::EmptyRationale {
            decision_id: decision.id.clone(),
        });
    }

    // -- Apply impacts to a fresh copy --
    let mut next = state.clone();

    let prev_financial = state.financial_resources;
    let prev_reputation = state.reputation_points;
    let prev_share = state.market_share;
    let prev_sustainability = state.sustainability_score();

    let mut declared_financial = 0.0;
    let mut declared_reputation = 0.0;
    let mut applied_reputation = 0.0;
    let mut applied_satisfaction: BTreeMap<String, f64> = BTreeMap::new();
    let mut ignored = Vec::new();
    let mut positive_sum = 0.0;

    // BTreeMap iteration keeps impact application deterministic even
    // though the impacts are independent and additive.
    for (key, delta) in &approach.impacts {
        if *delta > 0.0 {
            positive_sum += *delta;
        }
        match classify_impact(key, state) {
            ImpactTarget::Financial => {
                // Absolute currency, never clamped: insolvency is a signal.
                next.financial_resources += *delta;
                declared_financial += *delta;
            }
            ImpactTarget::Reputation => {
                let before = next.reputation_points;
                next.reputation_points = clamp_scale(before + *delta);
                applied_reputation += next.reputation_points - before;
                declared_reputation += *delta;
            }
            ImpactTarget::Stakeholder(name) => {
                if let Some(entry) = next.stakeholder_satisfaction.get_mut(&name) {
                    let before = *entry;
                    *entry = clamp_scale(before + *delta);
                    *applied_satisfaction.entry(name).or_insert(0.0) += *entry - before;
                }
            }
            ImpactTarget::Unmodeled(key) => {
                warn!(%key, scenario = %scenario.id, "ignoring unrecognized impact key");
                ignored.push(key);
            }
        }
    }

    // -- Trends: declared deltas as a percentage of the previous value --
    next.financial_trend = Some(percent_change(declared_financial, prev_financial));
    next.reputation_trend = Some(percent_change(declared_reputation, prev_reputation));

    // -- Market share follows reputation and relative financial movement --
    let financial_term = if prev_financial > 0.0 {
        declared_financial / prev_financial
    } else {
        0.0
    };
    let share_change = (declared_reputation * 0.1 + financial_term) * 0.5;
    next.market_share = clamp_scale(prev_share + share_change);
    next.market_share_trend = Some(percent_change(next.market_share - prev_share, prev_share));

    // -- Sustainability rating from the post-impact composite score --
    let sustainability = next.sustainability_score();
    next.sustainability_rating = SustainabilityRating::from_score(sustainability);
    next.sustainability_trend = Some(sustainability - prev_sustainability);

    // -- Experience and level --
    let xp_awarded = experience_for_decision(
        scenario.difficulty_level,
        &applied_satisfaction,
        positive_sum,
        config,
    );
    next.experience_points = next.experience_points.saturating_add(xp_awarded);

    // At most one level per resolution, and never downward.
    let derived = level_for_xp(next.experience_points, config);
    next.level = derived.min(state.level + 1).max(state.level);
    let leveled_up = next.level > state.level;
    if leveled_up {
        info!(player = %state.player_id, level = next.level, "level up");
    }

    // -- Challenge lifecycle --
    let (challenges_opened, challenges_closed) = sync_challenges(&mut next, config);

    let outcome = ResolutionOutcome {
        scenario_id: scenario.id.clone(),
        decision_id: decision.id.clone(),
        approach_id: approach.id.clone(),
        financial_delta: declared_financial,
        reputation_delta: applied_reputation,
        satisfaction_deltas: applied_satisfaction,
        ignored_impacts: ignored,
        xp_awarded,
        leveled_up,
        challenges_opened,
        challenges_closed,
    };

    Ok((next, outcome))
}

/// XP for a resolved decision:
/// base, plus base scaled by scenario difficulty, plus a balance bonus for
/// touching many stakeholders, plus half of the positive declared deltas.
/// Truncated to an integer.
fn experience_for_decision(
    difficulty: f64,
    applied_satisfaction: &BTreeMap<String, f64>,
    positive_sum: f64,
    config: &EngineConfig,
) -> u64 {
    let base = config.base_xp;
    let difficulty_bonus = base * difficulty.clamp(0.0, 1.0);
    let roster = config.stakeholder_roster.len();
    let balance_bonus = if roster == 0 {
        0.0
    } else {
        let touched = applied_satisfaction
            .values()
            .filter(|delta| **delta != 0.0)
            .count();
        base * touched as f64 / roster as f64
    };
    let impact_bonus = positive_sum * 0.5;

    (base + difficulty_bonus + balance_bonus + impact_bonus).max(0.0) as u64
}
