/// Core domain types.
///
/// Pure data. No resolution logic lives here.
/// All wire-facing types reject unknown fields and round-trip optional
/// fields as absent, not null.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Company size band. Informational for the engine; scenario generators
/// use it to scale stakes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanySize {
    Small,
    Medium,
    Large,
}

/// Ordinal sustainability scale, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SustainabilityRating {
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    #[serde(rename = "C+")]
    CPlus,
    C,
    D,
    F,
}

impl SustainabilityRating {
    /// Map a composite sustainability score (0-100) onto the letter scale.
    /// F is never produced here; it exists for decoding legacy states.
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            SustainabilityRating::APlus
        } else if score >= 80.0 {
            SustainabilityRating::A
        } else if score >= 70.0 {
            SustainabilityRating::BPlus
        } else if score >= 60.0 {
            SustainabilityRating::B
        } else if score >= 50.0 {
            SustainabilityRating::CPlus
        } else if score >= 40.0 {
            SustainabilityRating::C
        } else {
            SustainabilityRating::D
        }
    }
}

/// Challenge category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeKind {
    Financial,
    Reputation,
    Stakeholder,
    Environmental,
    Operational,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// An open company problem surfaced to the player.
///
/// Challenge ids are deterministic per tracked dimension
/// (e.g. `stakeholder-employees`, `financial`) so replays are stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Challenge {
    pub id: String,
    pub name: String,
    pub kind: ChallengeKind,
    pub severity: Severity,
    pub description: String,
    /// Set only for `kind == Stakeholder`: the satisfaction key that
    /// triggered the challenge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stakeholder: Option<String>,
}

/// One selectable response to a scenario, with fixed metric impacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Approach {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Signed deltas keyed by metric (`financial`, `reputation`) or
    /// stakeholder name. Unrecognized keys are preserved but have no
    /// numeric effect.
    pub impacts: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risks: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunities: Option<Vec<String>>,
    /// Informational; not applied by the engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long_term_impacts: Option<BTreeMap<String, f64>>,
}

/// A timed ethical-dilemma prompt. Immutable once created; consumed
/// exactly once by a successful decision, discarded on expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    /// In [0, 1].
    pub difficulty_level: f64,
    pub stakeholders_affected: BTreeSet<String>,
    /// Non-empty; approach ids unique within the scenario.
    pub possible_approaches: Vec<Approach>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden_factors: Option<Vec<String>>,
    /// Seconds after `created_at` until the scenario expires.
    /// Absent means the scenario never expires.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_constraint: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Scenario {
    /// Look up an approach by id.
    pub fn approach(&self, approach_id: &str) -> Option<&Approach> {
        self.possible_approaches.iter().find(|a| a.id == approach_id)
    }
}

/// Immutable audit record of a player's choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Decision {
    pub id: String,
    pub scenario_id: String,
    pub approach_id: String,
    /// Required non-empty for submission.
    pub rationale: String,
    pub timestamp: DateTime<Utc>,
}

/// Persistent snapshot of a player's company. Mutated only through
/// decision resolution; every update constructs a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GameState {
    pub id: String,
    pub player_id: String,
    pub company_name: String,
    pub company_size: CompanySize,
    /// >= 1; strictly increases only via the experience threshold rule.
    pub level: u32,
    pub experience_points: u64,
    /// Absolute currency. May go negative to signal insolvency.
    pub financial_resources: f64,
    /// Clamped to [0, 100].
    pub reputation_points: f64,
    /// In [0, 100].
    pub market_share: f64,
    pub sustainability_rating: SustainabilityRating,
    /// Satisfaction per stakeholder, values in [0, 100].
    pub stakeholder_satisfaction: BTreeMap<String, f64>,
    pub active_challenges: Vec<Challenge>,
    /// Signed percentage deltas since the previous resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial_trend: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation_trend: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_share_trend: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sustainability_trend: Option<f64>,
}

impl GameState {
    /// Composite sustainability score on the 0-100 scale:
    /// `environment * 0.6 + community * 0.4`, neutral 50 for a missing key.
    pub fn sustainability_score(&self) -> f64 {
        let value = |key: &str| {
            self.stakeholder_satisfaction
                .get(key)
                .copied()
                .unwrap_or(50.0)
        };
        value("environment") * 0.6 + value("community") * 0.4
    }

    /// Find an open challenge by its deterministic id.
    pub fn challenge(&self, challenge_id: &str) -> Option<&Challenge> {
        self.active_challenges.iter().find(|c| c.id == challenge_id)
    }
}

/// Tuning constants for resolution, progression and challenge thresholds.
/// Injected into every resolution so tuning never touches the algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Base XP awarded for any resolved decision.
    pub base_xp: f64,
    /// Level curve: `next_level_xp(level) = round(level_xp_base * level * level_xp_multiplier)`.
    pub level_xp_base: u64,
    pub level_xp_multiplier: f64,
    /// Satisfaction marks: below `low` opens a medium challenge, below
    /// `critical` a high one; above `recovery` closes it.
    pub satisfaction_low_mark: f64,
    pub satisfaction_critical_mark: f64,
    pub satisfaction_recovery_mark: f64,
    /// Absolute-currency marks for financial challenges.
    pub financial_low_mark: f64,
    pub financial_critical_mark: f64,
    pub financial_recovery_mark: f64,
    /// Reputation below this opens a high-severity reputation challenge.
    pub reputation_crisis_mark: f64,
    pub starting_capital: f64,
    pub initial_reputation: f64,
    pub initial_market_share: f64,
    /// Canonical stakeholder roster for initial states and XP balance bonus.
    pub stakeholder_roster: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_xp: 100.0,
            level_xp_base: 1000,
            level_xp_multiplier: 1.5,
            satisfaction_low_mark: 40.0,
            satisfaction_critical_mark: 20.0,
            satisfaction_recovery_mark: 60.0,
            financial_low_mark: 200_000.0,
            financial_critical_mark: 50_000.0,
            financial_recovery_mark: 400_000.0,
            reputation_crisis_mark: 30.0,
            starting_capital: 1_000_000.0,
            initial_reputation: 50.0,
            initial_market_share: 5.0,
            stakeholder_roster: vec![
                "employees".to_string(),
                "customers".to_string(),
                "investors".to_string(),
                "community".to_string(),
                "environment".to_string(),
            ],
        }
    }
}

/// Structured, immutable outcome of a single resolution.
///
/// Deltas here are the *applied* changes (post-clamp), which may be
/// smaller than the approach's declared impacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolutionOutcome {
    pub scenario_id: String,
    pub decision_id: String,
    pub approach_id: String,
    pub financial_delta: f64,
    pub reputation_delta: f64,
    pub satisfaction_deltas: BTreeMap<String, f64>,
    /// Impact keys with no recognized target; recorded for audit only.
    pub ignored_impacts: Vec<String>,
    pub xp_awarded: u64,
    pub leveled_up: bool,
    pub challenges_opened: Vec<String>,
    pub challenges_closed: Vec<String>,
}
