/// Stateful engine wrapping the pure resolution layer.
///
/// Owns the current state between resolutions, which serializes decisions
/// for one player by construction: the caller holds the engine, and the
/// engine applies one decision at a time against its own latest state.
/// Also enforces the scenario lifecycle — each scenario is consumed
/// exactly once.

use std::collections::BTreeSet;

use crate::domain::{Decision, EngineConfig, GameState, ResolutionOutcome, Scenario};
use crate::errors::EngineError;
use crate::invariants::validate_state;
use crate::resolution::resolve_decision;
use crate::state::create_initial_state;

pub struct DecisionEngine {
    state: Option<GameState>,
    config: EngineConfig,
    resolved_scenarios: BTreeSet<String>,
}

impl DecisionEngine {
    /// Create a new, uninitialized engine.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            state: None,
            config,
            resolved_scenarios: BTreeSet::new(),
        }
    }

    /// Access the current state (panics if not initialized).
    pub fn state(&self) -> &GameState {
        self.state
            .as_ref()
            .expect("engine not initialized — call initialize_state() or load_state() first")
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create and store a fresh initial state.
    pub fn initialize_state(&mut self, id: &str, player_id: &str, company_name: &str) -> &GameState {
        self.state = Some(create_initial_state(id, player_id, company_name, &self.config));
        self.resolved_scenarios.clear();
        self.state.as_ref().expect("state just set")
    }

    /// Adopt an externally persisted state after validating its invariants.
    pub fn load_state(&mut self, state: GameState) -> Result<&GameState, EngineError> {
        validate_state(&state).map_err(EngineError::InvariantViolation)?;
        self.state = Some(state);
        self.resolved_scenarios.clear();
        Ok(self.state.as_ref().expect("state just set"))
    }

    /// Apply a single decision:
    ///   1. reject a scenario that was already consumed
    ///   2. delegate to the pure resolution
    ///   3. validate invariants on the produced state
    ///   4. commit and return
    pub fn apply_decision(
        &mut self,
        scenario: &Scenario,
        decision: &Decision,
    ) -> Result<(&GameState, ResolutionOutcome), EngineError> {
        if self.resolved_scenarios.contains(&scenario.id) {
            return Err(EngineError::ScenarioAlreadyResolved {
                scenario_id: scenario.id.clone(),
            });
        }

        let current = self
            .state
            .as_ref()
            .expect("engine not initialized — call initialize_state() or load_state() first");

        let (next, outcome) = resolve_decision(current, scenario, decision, &self.config)?;
        validate_state(&next).map_err(EngineError::InvariantViolation)?;

        self.state = Some(next);
        self.resolved_scenarios.insert(scenario.id.clone());

        Ok((self.state.as_ref().expect("state just set"), outcome))
    }

    /// Apply an ordered sequence of (scenario, decision) pairs.
    pub fn apply_sequence<'a, I>(&mut self, pairs: I) -> Result<&GameState, EngineError>
    where
        I: IntoIterator<Item = (&'a Scenario, &'a Decision)>,
    {
        for (scenario, decision) in pairs {
            self.apply_decision(scenario, decision)?;
        }
        Ok(self.state())
    }
}
