//! State store abstraction for callers that persist states outside the
//! log-and-replay path (dashboards, admin tooling, tests).
//!
//! The decision log remains the source of truth; a store holds derived
//! copies keyed by state id and never participates in resolution.

use std::collections::BTreeMap;
use std::sync::Mutex;

use ethiquest_engine::domain::GameState;
use ethiquest_engine::invariants::validate_state;

use crate::errors::RuntimeError;

pub trait StateStore: Send + Sync {
    /// Insert or replace a state. Invalid states are rejected.
    fn save(&self, state: &GameState) -> Result<(), RuntimeError>;

    fn load(&self, state_id: &str) -> Result<Option<GameState>, RuntimeError>;

    /// Remove a state; returns whether it existed.
    fn delete(&self, state_id: &str) -> Result<bool, RuntimeError>;

    fn list_ids(&self) -> Result<Vec<String>, RuntimeError>;
}

/// In-memory store.
#[derive(Default)]
pub struct MemoryStateStore {
    states: Mutex<BTreeMap<String, GameState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn save(&self, state: &GameState) -> Result<(), RuntimeError> {
        validate_state(state)
            .map_err(|e| RuntimeError::BadSnapshot(format!("refusing to store invalid state: {e}")))?;
        let mut states = self.states.lock().expect("store lock poisoned");
        states.insert(state.id.clone(), state.clone());
        Ok(())
    }

    fn load(&self, state_id: &str) -> Result<Option<GameState>, RuntimeError> {
        let states = self.states.lock().expect("store lock poisoned");
        Ok(states.get(state_id).cloned())
    }

    fn delete(&self, state_id: &str) -> Result<bool, RuntimeError> {
        let mut states = self.states.lock().expect("store lock poisoned");
        Ok(states.remove(state_id).is_some())
    }

    fn list_ids(&self) -> Result<Vec<String>, RuntimeError> {
        let states = self.states.lock().expect("store lock poisoned");
        Ok(states.keys().cloned().collect())
    }
}
