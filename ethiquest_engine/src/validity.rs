/// Scenario validity checks.
///
/// Pure functions of wall-clock time; `now` is always supplied by the
/// caller so the engine stays deterministic and testable.

use chrono::{DateTime, Utc};

use crate::domain::Scenario;

/// Whole seconds elapsed since the scenario was created (truncated).
fn elapsed_seconds(scenario: &Scenario, now: DateTime<Utc>) -> i64 {
    (now - scenario.created_at).num_seconds()
}

/// A scenario without a time constraint never expires. Otherwise it is
/// valid while strictly less than `time_constraint` seconds have elapsed:
/// at exactly the constraint the scenario is already expired.
pub fn is_valid(scenario: &Scenario, now: DateTime<Utc>) -> bool {
    match scenario.time_constraint {
        None => true,
        Some(constraint) => elapsed_seconds(scenario, now) < constraint,
    }
}

/// Signed seconds until expiry, `None` when the scenario has no
/// constraint. Negative or zero once expired — callers must not clamp
/// this, a clamped value would mask expiry.
pub fn remaining_time(scenario: &Scenario, now: DateTime<Utc>) -> Option<i64> {
    scenario
        .time_constraint
        .map(|constraint| constraint - elapsed_seconds(scenario, now))
}
