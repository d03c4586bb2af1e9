//! Snapshot layer — deterministic state snapshots.
//!
//! A snapshot carries the plain JSON of the state (for decoding) plus
//! the canonical hash (for verification). No timestamps in snapshot
//! content, so taking the same snapshot twice yields identical bytes.
//!
//! If a snapshot fails verification against replay, fall back to a full
//! replay from the decision log.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ethiquest_engine::domain::GameState;
use ethiquest_engine::hashing::canonical_hash;
use ethiquest_engine::invariants::validate_state;
use ethiquest_engine::ENGINE_VERSION;

use crate::errors::RuntimeError;

/// Snapshot on-disk format.
#[derive(Serialize, Deserialize)]
pub struct Snapshot {
    /// Decision-log sequence at which this snapshot was taken.
    pub sequence: u64,
    /// Plain JSON of the state (UTF-8).
    pub state_json: String,
    /// Canonical hash of the state at snapshot time.
    pub hash: String,
    /// Engine version at snapshot time.
    pub engine_version: u32,
}

/// Save a deterministic snapshot of the current state.
pub fn save_snapshot(dir: &Path, sequence: u64, state: &GameState) -> Result<PathBuf, RuntimeError> {
    fs::create_dir_all(dir)?;

    let snap = Snapshot {
        sequence,
        state_json: serde_json::to_string(state)?,
        hash: canonical_hash(state),
        engine_version: ENGINE_VERSION,
    };

    let path = dir.join(format!("snapshot_{sequence:06}.json"));
    let content = serde_json::to_string(&snap)?;

    let mut file = File::create(&path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    Ok(path)
}

/// Load a snapshot at a specific sequence. None if no file exists there.
pub fn load_snapshot(dir: &Path, sequence: u64) -> Result<Option<Snapshot>, RuntimeError> {
    let path = dir.join(format!("snapshot_{sequence:06}.json"));
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&path)?;
    let snap: Snapshot = serde_json::from_str(&content)
        .map_err(|e| RuntimeError::BadSnapshot(format!("unreadable snapshot file: {e}")))?;
    Ok(Some(snap))
}

/// Load the highest-sequence snapshot in a directory.
pub fn load_latest_snapshot(dir: &Path) -> Result<Option<Snapshot>, RuntimeError> {
    if !dir.exists() {
        return Ok(None);
    }

    let mut best_seq: Option<u64> = None;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if let Some(seq_str) = name_str
            .strip_prefix("snapshot_")
            .and_then(|s| s.strip_suffix(".json"))
        {
            if let Ok(seq) = seq_str.parse::<u64>() {
                if best_seq.map_or(true, |best| seq > best) {
                    best_seq = Some(seq);
                }
            }
        }
    }

    match best_seq {
        Some(seq) => load_snapshot(dir, seq),
        None => Ok(None),
    }
}

/// Decode a snapshot back into a state, checking version, hash and
/// engine invariants. Every failure is a `BadSnapshot`, which callers
/// treat as "snapshot unusable, replay instead".
pub fn restore_state(snap: &Snapshot) -> Result<GameState, RuntimeError> {
    if snap.engine_version != ENGINE_VERSION {
        return Err(RuntimeError::BadSnapshot(format!(
            "engine version mismatch: snapshot {}, current {}",
            snap.engine_version, ENGINE_VERSION
        )));
    }

    let state: GameState = serde_json::from_str(&snap.state_json)
        .map_err(|e| RuntimeError::BadSnapshot(format!("undecodable state: {e}")))?;

    let computed = canonical_hash(&state);
    if computed != snap.hash {
        return Err(RuntimeError::BadSnapshot(format!(
            "hash mismatch: recorded {}, computed {computed}",
            snap.hash
        )));
    }

    validate_state(&state).map_err(RuntimeError::BadSnapshot)?;
    Ok(state)
}

/// Check a snapshot's recorded hash against its own state payload.
pub fn verify_snapshot(snap: &Snapshot) -> bool {
    restore_state(snap).is_ok()
}
