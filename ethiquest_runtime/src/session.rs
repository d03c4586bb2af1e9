//! Session manager — one isolated session per player, with
//! apply-before-persist semantics.
//!
//! Each session gets its own directory holding a decision log and
//! snapshots. Concurrency: a Mutex wrapper for write serialization, no
//! global mutable state.
//!
//! Apply-before-persist order:
//!   1. engine.apply_decision()  — may reject the decision
//!   2. log.append()             — only if step 1 succeeded
//!   3. snapshot if the interval is reached

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use ethiquest_engine::domain::{Decision, EngineConfig, GameState, ResolutionOutcome, Scenario};
use ethiquest_engine::engine::DecisionEngine;
use ethiquest_engine::hashing::canonical_hash;

use crate::decision_log::{parts_from_record, record_from_parts, DecisionLog};
use crate::errors::RuntimeError;
use crate::replay::{self, state_id_for_player};
use crate::snapshot;

/// Outcomes retained in memory for trend displays and debugging.
const MAX_HISTORY: usize = 50;

/// An isolated player session with its own decision log and state.
pub struct Session {
    player_id: String,
    company_name: String,
    session_dir: PathBuf,
    engine: DecisionEngine,
    log: DecisionLog,
    snapshot_interval: u64,
    current_sequence: u64,
    history: Vec<ResolutionOutcome>,
}

impl Session {
    /// Open (or create) a session for a player.
    ///
    /// Directory structure:
    ///   <base_dir>/<player_id>/decisions.log
    ///   <base_dir>/<player_id>/snapshots/
    ///
    /// An existing log is replayed in full so the in-memory state always
    /// matches the persisted history. The latest snapshot, if any, is
    /// cross-checked against the replayed state.
    pub fn open(
        base_dir: &Path,
        player_id: &str,
        company_name: &str,
        config: EngineConfig,
        snapshot_interval: u64,
    ) -> Result<Self, RuntimeError> {
        let session_dir = base_dir.join(player_id);
        let log = DecisionLog::open(&session_dir.join("decisions.log"))?;

        let mut engine = DecisionEngine::new(config);
        engine.initialize_state(&state_id_for_player(player_id), player_id, company_name);

        let records = log.load_all()?;
        for record in &records {
            let (scenario, decision) = parts_from_record(record)?;
            engine.apply_decision(&scenario, &decision)?;
        }

        if let Some(snap) = snapshot::load_latest_snapshot(&session_dir.join("snapshots"))? {
            if !snapshot::verify_snapshot(&snap) {
                tracing::warn!(
                    player_id,
                    sequence = snap.sequence,
                    "latest snapshot fails verification, relying on log replay"
                );
            }
        }

        tracing::info!(
            player_id,
            replayed = records.len(),
            "session opened"
        );

        let current_sequence = log.last_sequence();
        Ok(Self {
            player_id: player_id.to_string(),
            company_name: company_name.to_string(),
            session_dir,
            engine,
            log,
            snapshot_interval,
            current_sequence,
            history: Vec::new(),
        })
    }

    /// Submit a fully-formed decision. Returns `Ok(None)` when the
    /// decision id was already logged — a resubmission is a no-op, not
    /// an error.
    pub fn submit_decision(
        &mut self,
        scenario: &Scenario,
        decision: &Decision,
    ) -> Result<Option<ResolutionOutcome>, RuntimeError> {
        if self.log.contains_decision(&decision.id) {
            tracing::info!(
                decision_id = %decision.id,
                "duplicate decision submission ignored"
            );
            return Ok(None);
        }
        self.apply_and_log(scenario, decision).map(Some)
    }

    /// Build a decision for the chosen approach and submit it. The
    /// decision id is a fresh v4 UUID, so this always resolves.
    pub fn decide(
        &mut self,
        scenario: &Scenario,
        approach_id: &str,
        rationale: &str,
        now: DateTime<Utc>,
    ) -> Result<ResolutionOutcome, RuntimeError> {
        let decision = Decision {
            id: Uuid::new_v4().to_string(),
            scenario_id: scenario.id.clone(),
            approach_id: approach_id.to_string(),
            rationale: rationale.to_string(),
            timestamp: now,
        };
        self.apply_and_log(scenario, &decision)
    }

    fn apply_and_log(
        &mut self,
        scenario: &Scenario,
        decision: &Decision,
    ) -> Result<ResolutionOutcome, RuntimeError> {
        // Step 1: resolve through the engine. Nothing is persisted if
        // the engine rejects the decision.
        let (_, outcome) = self.engine.apply_decision(scenario, decision)?;

        // Step 2: persist to the decision log.
        let sequence = self.current_sequence + 1;
        let record = record_from_parts(sequence, &self.player_id, scenario, decision)?;
        self.log.append(&record)?;
        self.current_sequence = sequence;

        // Step 3: auto-snapshot at the interval.
        if self.snapshot_interval > 0 && sequence % self.snapshot_interval == 0 {
            let snap_dir = self.session_dir.join("snapshots");
            snapshot::save_snapshot(&snap_dir, sequence, self.engine.state())?;
        }

        self.history.push(outcome.clone());
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }

        tracing::info!(
            decision_id = %decision.id,
            scenario_id = %scenario.id,
            sequence,
            xp_awarded = outcome.xp_awarded,
            "decision resolved and logged"
        );

        Ok(outcome)
    }

    /// Full replay from the decision log, resetting the engine to the
    /// replayed state. Returns the state and its canonical hash.
    pub fn replay_full(&mut self) -> Result<(GameState, String), RuntimeError> {
        let records = self.log.load_all()?;
        let (state, hash) = replay::rebuild_state(
            &self.player_id,
            &self.company_name,
            self.engine.config(),
            &records,
        )?;

        let config = self.engine.config().clone();
        let mut engine = DecisionEngine::new(config);
        engine.initialize_state(
            &state_id_for_player(&self.player_id),
            &self.player_id,
            &self.company_name,
        );
        for record in &records {
            let (scenario, decision) = parts_from_record(record)?;
            engine.apply_decision(&scenario, &decision)?;
        }
        self.engine = engine;

        Ok((state, hash))
    }

    /// Persist a snapshot at the current sequence, outside the interval.
    pub fn snapshot_now(&self) -> Result<PathBuf, RuntimeError> {
        let snap_dir = self.session_dir.join("snapshots");
        snapshot::save_snapshot(&snap_dir, self.current_sequence, self.engine.state())
    }

    pub fn state(&self) -> &GameState {
        self.engine.state()
    }

    pub fn current_hash(&self) -> String {
        canonical_hash(self.engine.state())
    }

    pub fn current_sequence(&self) -> u64 {
        self.current_sequence
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    /// Outcomes of the most recent resolutions, newest first.
    pub fn recent_outcomes(&self) -> impl Iterator<Item = &ResolutionOutcome> {
        self.history.iter().rev()
    }
}

/// Thread-safe session handle.
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    pub fn submit_decision(
        &self,
        scenario: &Scenario,
        decision: &Decision,
    ) -> Result<Option<ResolutionOutcome>, RuntimeError> {
        let mut session = self.inner.lock().expect("session lock poisoned");
        session.submit_decision(scenario, decision)
    }

    pub fn current_hash(&self) -> String {
        let session = self.inner.lock().expect("session lock poisoned");
        session.current_hash()
    }

    pub fn current_sequence(&self) -> u64 {
        let session = self.inner.lock().expect("session lock poisoned");
        session.current_sequence()
    }
}
