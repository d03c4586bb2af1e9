/// Engine error taxonomy.
///
/// All engine errors are local, synchronous and non-retryable by the
/// engine itself. A failed resolution never leaves a partially updated
/// state behind.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The decision references an approach the scenario does not offer.
    /// The caller should re-fetch the scenario or reject the submission.
    #[error("approach {approach_id:?} not found in scenario {scenario_id:?}")]
    InvalidApproach {
        scenario_id: String,
        approach_id: String,
    },

    /// The scenario's time constraint elapsed before the decision was
    /// made. The expired scenario is discarded, never retried.
    #[error("scenario {scenario_id:?} expired {overdue_seconds}s before the decision")]
    ScenarioExpired {
        scenario_id: String,
        overdue_seconds: i64,
    },

    /// Submissions must carry a non-empty rationale. Recoverable by
    /// re-prompting the player.
    #[error("decision {decision_id:?} has an empty rationale")]
    EmptyRationale { decision_id: String },

    /// The decision was submitted against a different scenario than the
    /// one supplied for resolution.
    #[error("decision targets scenario {expected:?} but {actual:?} was supplied")]
    ScenarioMismatch { expected: String, actual: String },

    /// Scenarios are consumed exactly once.
    #[error("scenario {scenario_id:?} was already resolved")]
    ScenarioAlreadyResolved { scenario_id: String },

    /// The resolved state failed post-resolution validation. Indicates a
    /// malformed input state rather than a bad decision.
    #[error("state invariant violated: {0}")]
    InvariantViolation(String),
}
