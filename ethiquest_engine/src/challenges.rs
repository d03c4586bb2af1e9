/// Challenge lifecycle — a threshold state machine per tracked dimension.
///
/// States per dimension: none, low (medium severity), critical (high
/// severity). Transitions are driven solely by the post-impact value.
/// A challenge closes only once the value rises above the recovery mark,
/// so values sitting between the low and recovery marks do not flap.

use tracing::info;

use crate::domain::{Challenge, ChallengeKind, EngineConfig, GameState, Severity};

/// Reconcile `active_challenges` with the post-impact state.
/// Returns the ids of challenges opened and closed by this pass.
pub fn sync_challenges(
    state: &mut GameState,
    config: &EngineConfig,
) -> (Vec<String>, Vec<String>) {
    let mut opened = Vec::new();
    let mut closed = Vec::new();

    // Stakeholder satisfaction, in key order for determinism.
    let stakeholders: Vec<(String, f64)> = state
        .stakeholder_satisfaction
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();
    for (name, value) in stakeholders {
        let severity = severity_below(
            value,
            config.satisfaction_low_mark,
            config.satisfaction_critical_mark,
        );
        reconcile(
            state,
            ChallengeDimension {
                id: format!("stakeholder-{name}"),
                name: format!("{name} dissatisfaction"),
                kind: ChallengeKind::Stakeholder,
                description: format!("{name} satisfaction fell to {value:.0}"),
                stakeholder: Some(name.clone()),
            },
            severity,
            value > config.satisfaction_recovery_mark,
            &mut opened,
            &mut closed,
        );
    }

    // Financial resources against absolute-currency marks.
    let financial = state.financial_resources;
    let severity = severity_below(
        financial,
        config.financial_low_mark,
        config.financial_critical_mark,
    );
    reconcile(
        state,
        ChallengeDimension {
            id: "financial".to_string(),
            name: "Financial distress".to_string(),
            kind: ChallengeKind::Financial,
            description: format!("Financial resources fell to {financial:.0}"),
            stakeholder: None,
        },
        severity,
        financial > config.financial_recovery_mark,
        &mut opened,
        &mut closed,
    );

    // Environmental standing via the composite sustainability score.
    let score = state.sustainability_score();
    let severity = severity_below(
        score,
        config.satisfaction_low_mark,
        config.satisfaction_critical_mark,
    );
    reconcile(
        state,
        ChallengeDimension {
            id: "environmental".to_string(),
            name: "Environmental backlash".to_string(),
            kind: ChallengeKind::Environmental,
            description: format!("Sustainability score fell to {score:.0}"),
            stakeholder: None,
        },
        severity,
        score > config.satisfaction_recovery_mark,
        &mut opened,
        &mut closed,
    );

    // Reputation crisis: single mark, always high severity.
    let reputation = state.reputation_points;
    let severity = if reputation < config.reputation_crisis_mark {
        Some(Severity::High)
    } else {
        None
    };
    reconcile(
        state,
        ChallengeDimension {
            id: "reputation".to_string(),
            name: "Reputation crisis".to_string(),
            kind: ChallengeKind::Reputation,
            description: format!("Reputation fell to {reputation:.0}"),
            stakeholder: None,
        },
        severity,
        reputation > config.satisfaction_recovery_mark,
        &mut opened,
        &mut closed,
    );

    (opened, closed)
}

struct ChallengeDimension {
    id: String,
    name: String,
    kind: ChallengeKind,
    description: String,
    stakeholder: Option<String>,
}

/// Severity for a value measured against a low and a critical mark.
fn severity_below(value: f64, low_mark: f64, critical_mark: f64) -> Option<Severity> {
    if value < critical_mark {
        Some(Severity::High)
    } else if value < low_mark {
        Some(Severity::Medium)
    } else {
        None
    }
}

fn reconcile(
    state: &mut GameState,
    dimension: ChallengeDimension,
    severity: Option<Severity>,
    recovered: bool,
    opened: &mut Vec<String>,
    closed: &mut Vec<String>,
) {
    let existing = state
        .active_challenges
        .iter_mut()
        .find(|c| c.id == dimension.id);

    match (existing, severity) {
        (Some(challenge), Some(severity)) => {
            // Re-derive severity from the current value; a low<->critical
            // move updates the open challenge in place.
            if challenge.severity != severity {
                challenge.severity = severity;
            }
            challenge.description = dimension.description;
        }
        (None, Some(severity)) => {
            info!(challenge = %dimension.id, ?severity, "challenge opened");
            state.active_challenges.push(Challenge {
                id: dimension.id.clone(),
                name: dimension.name,
                kind: dimension.kind,
                severity,
                description: dimension.description,
                stakeholder: dimension.stakeholder,
            });
            opened.push(dimension.id);
        }
        (Some(_), None) if recovered => {
            info!(challenge = %dimension.id, "challenge closed");
            state.active_challenges.retain(|c| c.id != dimension.id);
            closed.push(dimension.id);
        }
        // Between the low and recovery marks: leave the challenge as-is.
        _ => {}
    }
}
