/// Resolution behavior tests — impact application, clamping, trends,
/// progression and the challenge lifecycle, driven through both the pure
/// function and the stateful engine.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, TimeZone, Utc};

use ethiquest_engine::domain::{
    Approach, ChallengeKind, Decision, EngineConfig, GameState, Scenario, Severity,
    SustainabilityRating,
};
use ethiquest_engine::engine::DecisionEngine;
use ethiquest_engine::errors::EngineError;
use ethiquest_engine::hashing::canonical_hash;
use ethiquest_engine::resolution::resolve_decision;
use ethiquest_engine::state::create_initial_state;

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
}

fn base_state() -> GameState {
    create_initial_state("gs-1", "p1", "Acme Corp", &EngineConfig::default())
}

fn scenario_with_impacts(impacts: &[(&str, f64)]) -> Scenario {
    let approach = Approach {
        id: "approach_1".to_string(),
        title: "Primary response".to_string(),
        description: "The measured option".to_string(),
        impacts: impacts
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect(),
        risks: None,
        opportunities: None,
        long_term_impacts: None,
    };
    Scenario {
        id: "s1".to_string(),
        title: "Supplier audit".to_string(),
        description: "An audit uncovers violations at a key supplier".to_string(),
        category: "ethics".to_string(),
        difficulty_level: 0.5,
        stakeholders_affected: BTreeSet::new(),
        possible_approaches: vec![approach],
        hidden_factors: None,
        time_constraint: None,
        created_at: fixed_now(),
    }
}

fn decision_for(scenario: &Scenario, approach_id: &str) -> Decision {
    Decision {
        id: "d1".to_string(),
        scenario_id: scenario.id.clone(),
        approach_id: approach_id.to_string(),
        rationale: "Protecting workers outweighs the short-term cost".to_string(),
        timestamp: fixed_now(),
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn impacts_change_each_targeted_field_by_exactly_the_delta() {
    let config = EngineConfig::default();
    let state = base_state();
    let scenario =
        scenario_with_impacts(&[("financial", -50_000.0), ("reputation", 5.0), ("customers", 10.0)]);
    let decision = decision_for(&scenario, "approach_1");

    let (next, outcome) = resolve_decision(&state, &scenario, &decision, &config).unwrap();

    assert_eq!(next.financial_resources, 950_000.0);
    assert_eq!(next.reputation_points, 55.0);
    assert_eq!(next.stakeholder_satisfaction["customers"], 60.0);
    // Untargeted stakeholders are untouched.
    assert_eq!(next.stakeholder_satisfaction["employees"], 50.0);

    assert_eq!(outcome.financial_delta, -50_000.0);
    assert_eq!(outcome.reputation_delta, 5.0);
    assert_eq!(outcome.satisfaction_deltas["customers"], 10.0);
    assert!(outcome.ignored_impacts.is_empty());
}

#[test]
fn trends_are_percentages_of_the_previous_values() {
    let config = EngineConfig::default();
    let state = base_state();
    let scenario = scenario_with_impacts(&[("financial", -50_000.0), ("reputation", 5.0)]);
    let decision = decision_for(&scenario, "approach_1");

    let (next, _) = resolve_decision(&state, &scenario, &decision, &config).unwrap();

    assert_close(next.financial_trend.unwrap(), -5.0);
    assert_close(next.reputation_trend.unwrap(), 10.0);
    // share_change = (5 * 0.1 + (-50_000 / 1_000_000)) * 0.5 = 0.225
    assert_close(next.market_share, 5.225);
    assert_close(next.market_share_trend.unwrap(), 4.5);
}

#[test]
fn reputation_trend_is_zero_when_previous_reputation_was_zero() {
    let config = EngineConfig::default();
    let mut state = base_state();
    state.reputation_points = 0.0;
    let scenario = scenario_with_impacts(&[("reputation", 10.0)]);
    let decision = decision_for(&scenario, "approach_1");

    let (next, _) = resolve_decision(&state, &scenario, &decision, &config).unwrap();
    assert_eq!(next.reputation_trend, Some(0.0));
    assert_eq!(next.reputation_points, 10.0);
}

#[test]
fn satisfaction_clamps_at_one_hundred() {
    let config = EngineConfig::default();
    let mut state = base_state();
    state
        .stakeholder_satisfaction
        .insert("customers".to_string(), 95.0);
    let scenario = scenario_with_impacts(&[("customers", 20.0)]);
    let decision = decision_for(&scenario, "approach_1");

    let (next, outcome) = resolve_decision(&state, &scenario, &decision, &config).unwrap();
    assert_eq!(next.stakeholder_satisfaction["customers"], 100.0);
    // The outcome reports the applied delta, not the declared one.
    assert_eq!(outcome.satisfaction_deltas["customers"], 5.0);
}

#[test]
fn unrecognized_impact_keys_are_soft_ignored() {
    let config = EngineConfig::default();
    let state = base_state();
    let scenario = scenario_with_impacts(&[("regulators", 5.0), ("financial", 100.0)]);
    let decision = decision_for(&scenario, "approach_1");

    let (next, outcome) = resolve_decision(&state, &scenario, &decision, &config).unwrap();
    assert_eq!(outcome.ignored_impacts, vec!["regulators"]);
    assert_eq!(next.financial_resources, 1_000_100.0);
    assert!(!next.stakeholder_satisfaction.contains_key("regulators"));
}

#[test]
fn invalid_approach_is_rejected_and_state_untouched() {
    let config = EngineConfig::default();
    let state = base_state();
    let original = state.clone();
    let scenario = scenario_with_impacts(&[("financial", 100.0)]);
    let decision = decision_for(&scenario, "nonexistent");

    let err = resolve_decision(&state, &scenario, &decision, &config).unwrap_err();
    assert!(matches!(err, EngineError::InvalidApproach { .. }));
    assert_eq!(state, original);
}

#[test]
fn decision_after_time_constraint_fails_with_scenario_expired() {
    let config = EngineConfig::default();
    let state = base_state();
    let mut scenario = scenario_with_impacts(&[("financial", 100.0)]);
    scenario.time_constraint = Some(300);
    scenario.created_at = fixed_now() - Duration::seconds(300);

    // elapsed == constraint is already expired (strict '<').
    let decision = decision_for(&scenario, "approach_1");
    let err = resolve_decision(&state, &scenario, &decision, &config).unwrap_err();
    assert_eq!(
        err,
        EngineError::ScenarioExpired {
            scenario_id: "s1".to_string(),
            overdue_seconds: 0,
        }
    );
}

#[test]
fn decision_within_time_constraint_succeeds() {
    let config = EngineConfig::default();
    let state = base_state();
    let mut scenario = scenario_with_impacts(&[("financial", 100.0)]);
    scenario.time_constraint = Some(300);
    scenario.created_at = fixed_now() - Duration::seconds(299);

    let decision = decision_for(&scenario, "approach_1");
    assert!(resolve_decision(&state, &scenario, &decision, &config).is_ok());
}

#[test]
fn empty_rationale_is_rejected() {
    let config = EngineConfig::default();
    let state = base_state();
    let scenario = scenario_with_impacts(&[("financial", 100.0)]);
    let mut decision = decision_for(&scenario, "approach_1");
    decision.rationale = "   ".to_string();

    let err = resolve_decision(&state, &scenario, &decision, &config).unwrap_err();
    assert!(matches!(err, EngineError::EmptyRationale { .. }));
}

#[test]
fn dropping_employees_below_the_low_mark_opens_a_medium_challenge() {
    let config = EngineConfig::default();
    let mut state = base_state();
    state
        .stakeholder_satisfaction
        .insert("employees".to_string(), 45.0);
    let scenario = scenario_with_impacts(&[("employees", -10.0)]);
    let decision = decision_for(&scenario, "approach_1");

    let (next, outcome) = resolve_decision(&state, &scenario, &decision, &config).unwrap();
    assert_eq!(next.stakeholder_satisfaction["employees"], 35.0);
    assert_eq!(outcome.challenges_opened, vec!["stakeholder-employees"]);

    let challenge = next.challenge("stakeholder-employees").unwrap();
    assert_eq!(challenge.kind, ChallengeKind::Stakeholder);
    assert_eq!(challenge.severity, Severity::Medium);
}

#[test]
fn recovery_above_the_mark_closes_the_challenge() {
    let config = EngineConfig::default();
    let mut state = base_state();
    state
        .stakeholder_satisfaction
        .insert("employees".to_string(), 35.0);

    let opener = scenario_with_impacts(&[("financial", 0.0)]);
    let decision = decision_for(&opener, "approach_1");
    let (mid, outcome) = resolve_decision(&state, &opener, &decision, &config).unwrap();
    assert_eq!(outcome.challenges_opened, vec!["stakeholder-employees"]);

    let mut closer = scenario_with_impacts(&[("employees", 30.0)]);
    closer.id = "s2".to_string();
    let mut decision = decision_for(&closer, "approach_1");
    decision.id = "d2".to_string();
    let (next, outcome) = resolve_decision(&mid, &closer, &decision, &config).unwrap();
    assert_eq!(next.stakeholder_satisfaction["employees"], 65.0);
    assert_eq!(outcome.challenges_closed, vec!["stakeholder-employees"]);
    assert!(next.challenge("stakeholder-employees").is_none());
}

#[test]
fn environmental_damage_drops_the_rating_and_opens_challenges() {
    let config = EngineConfig::default();
    let state = base_state();
    let scenario = scenario_with_impacts(&[("environment", -40.0)]);
    let decision = decision_for(&scenario, "approach_1");

    let (next, outcome) = resolve_decision(&state, &scenario, &decision, &config).unwrap();
    assert_eq!(next.stakeholder_satisfaction["environment"], 10.0);

    // Composite: 10 * 0.6 + community 50 * 0.4 = 26, down from 50.
    assert_eq!(next.sustainability_rating, SustainabilityRating::D);
    assert_close(next.sustainability_trend.unwrap(), -24.0);

    // The composite at 26 is below the low mark but not critical; the
    // environment stakeholder itself is below the critical mark.
    assert_eq!(
        outcome.challenges_opened,
        vec!["stakeholder-environment", "environmental"]
    );
    let environmental = next.challenge("environmental").unwrap();
    assert_eq!(environmental.kind, ChallengeKind::Environmental);
    assert_eq!(environmental.severity, Severity::Medium);
    assert_eq!(
        next.challenge("stakeholder-environment").unwrap().severity,
        Severity::High
    );
}

#[test]
fn one_xp_past_the_threshold_levels_up() {
    let mut config = EngineConfig::default();
    // Award exactly 1 XP: base 1, difficulty 0, nothing else touched.
    config.base_xp = 1.0;
    let mut state = base_state();
    state.experience_points = 1499;
    let mut scenario = scenario_with_impacts(&[("financial", -5.0)]);
    scenario.difficulty_level = 0.0;
    let decision = decision_for(&scenario, "approach_1");

    let (next, outcome) = resolve_decision(&state, &scenario, &decision, &config).unwrap();
    assert_eq!(outcome.xp_awarded, 1);
    assert_eq!(next.experience_points, 1500);
    assert_eq!(next.level, 2);
    assert!(outcome.leveled_up);
}

#[test]
fn a_single_resolution_cannot_skip_levels() {
    let mut config = EngineConfig::default();
    config.base_xp = 10_000.0; // would jump several thresholds at once
    let mut state = base_state();
    state.experience_points = 1499;
    let mut scenario = scenario_with_impacts(&[("financial", -5.0)]);
    scenario.difficulty_level = 0.0;
    let decision = decision_for(&scenario, "approach_1");

    let (next, outcome) = resolve_decision(&state, &scenario, &decision, &config).unwrap();
    assert!(next.experience_points >= 11_000);
    assert_eq!(next.level, 2, "level increments are capped at +1");
    assert!(outcome.leveled_up);
}

#[test]
fn xp_award_scales_with_difficulty_and_breadth() {
    let config = EngineConfig::default();
    let state = base_state();
    // difficulty 0.5, one of five roster stakeholders touched, +10 positive.
    let scenario = scenario_with_impacts(&[("customers", 10.0)]);
    let decision = decision_for(&scenario, "approach_1");

    let (_, outcome) = resolve_decision(&state, &scenario, &decision, &config).unwrap();
    // 100 + 100*0.5 + 100*(1/5) + 10*0.5 = 175
    assert_eq!(outcome.xp_awarded, 175);
}

#[test]
fn engine_consumes_each_scenario_exactly_once() {
    let mut engine = DecisionEngine::new(EngineConfig::default());
    engine.initialize_state("gs-1", "p1", "Acme Corp");

    let scenario = scenario_with_impacts(&[("financial", 100.0)]);
    let decision = decision_for(&scenario, "approach_1");
    engine.apply_decision(&scenario, &decision).unwrap();

    let mut retry = decision_for(&scenario, "approach_1");
    retry.id = "d2".to_string();
    let err = engine.apply_decision(&scenario, &retry).unwrap_err();
    assert!(matches!(err, EngineError::ScenarioAlreadyResolved { .. }));
}

#[test]
fn resolution_is_deterministic() {
    let config = EngineConfig::default();
    let state = base_state();
    let scenario =
        scenario_with_impacts(&[("financial", -2_500.0), ("employees", -12.0), ("reputation", 3.0)]);
    let decision = decision_for(&scenario, "approach_1");

    let (a, _) = resolve_decision(&state, &scenario, &decision, &config).unwrap();
    let (b, _) = resolve_decision(&state, &scenario, &decision, &config).unwrap();
    assert_eq!(canonical_hash(&a), canonical_hash(&b));
}

#[test]
fn mismatched_scenario_id_is_rejected() {
    let config = EngineConfig::default();
    let state = base_state();
    let scenario = scenario_with_impacts(&[("financial", 100.0)]);
    let mut decision = decision_for(&scenario, "approach_1");
    decision.scenario_id = "other".to_string();

    let err = resolve_decision(&state, &scenario, &decision, &config).unwrap_err();
    assert!(matches!(err, EngineError::ScenarioMismatch { .. }));
}
