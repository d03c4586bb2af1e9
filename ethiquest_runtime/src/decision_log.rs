//! Append-only decision log — binary protobuf frames.
//!
//! Storage format: length-prefixed protobuf frames.
//!   [4-byte LE length][protobuf bytes][4-byte LE length][protobuf bytes]...
//!
//! Rules:
//!   - Strict append only — no mutation, no deletion, no reordering
//!   - fsync after every write
//!   - Sequence strictly increasing (validated on append)
//!   - Decision ids are tracked so resubmissions can be detected

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use prost::Message;

use ethiquest_engine::domain::{Decision, Scenario};

use crate::errors::RuntimeError;
use crate::proto_types::ProtoDecisionRecord;

/// Frames larger than this are treated as corruption.
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Append-only decision log backed by a binary file.
pub struct DecisionLog {
    path: PathBuf,
    last_sequence: u64,
    decision_ids: BTreeSet<String>,
}

impl DecisionLog {
    /// Open or create a log at the given path. Existing frames are read
    /// to recover the last sequence and the set of known decision ids.
    pub fn open(path: &Path) -> Result<Self, RuntimeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut last_sequence = 0;
        let mut decision_ids = BTreeSet::new();
        if path.exists() {
            for record in Self::read_all_from_file(path)? {
                last_sequence = record.sequence;
                decision_ids.insert(record.decision_id);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            last_sequence,
            decision_ids,
        })
    }

    /// Append one record, validating strict sequence ordering, then fsync.
    pub fn append(&mut self, record: &ProtoDecisionRecord) -> Result<(), RuntimeError> {
        let expected = self.last_sequence + 1;
        if record.sequence != expected {
            return Err(RuntimeError::SequenceViolation {
                expected,
                got: record.sequence,
            });
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let buf = record.encode_to_vec();
        let len = buf.len() as u32;
        {
            let mut writer = BufWriter::new(&mut file);
            writer.write_all(&len.to_le_bytes())?;
            writer.write_all(&buf)?;
            writer.flush()?;
        }
        file.sync_all()?;

        self.last_sequence = record.sequence;
        self.decision_ids.insert(record.decision_id.clone());
        Ok(())
    }

    /// Load all records in sequence order.
    pub fn load_all(&self) -> Result<Vec<ProtoDecisionRecord>, RuntimeError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        Self::read_all_from_file(&self.path)
    }

    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Whether a decision id has already been logged (idempotency check).
    pub fn contains_decision(&self, decision_id: &str) -> bool {
        self.decision_ids.contains(decision_id)
    }

    fn read_all_from_file(path: &Path) -> Result<Vec<ProtoDecisionRecord>, RuntimeError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        let mut records = Vec::new();
        let mut len_buf = [0u8; 4];

        loop {
            match reader.read_exact(&mut len_buf) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                Err(e) => return Err(e.into()),
            }

            let len = u32::from_le_bytes(len_buf) as usize;
            if len == 0 || len > MAX_FRAME_LEN {
                return Err(RuntimeError::CorruptLog(format!(
                    "invalid frame length: {len}"
                )));
            }

            let mut frame = vec![0u8; len];
            reader
                .read_exact(&mut frame)
                .map_err(|e| RuntimeError::CorruptLog(format!("truncated frame: {e}")))?;

            records.push(ProtoDecisionRecord::decode(frame.as_slice())?);
        }

        Ok(records)
    }
}

/// Build a log record from a resolved (scenario, decision) pair.
pub fn record_from_parts(
    sequence: u64,
    player_id: &str,
    scenario: &Scenario,
    decision: &Decision,
) -> Result<ProtoDecisionRecord, RuntimeError> {
    Ok(ProtoDecisionRecord {
        sequence,
        decision_id: decision.id.clone(),
        player_id: player_id.to_string(),
        scenario_json: serde_json::to_string(scenario)?,
        decision_json: serde_json::to_string(decision)?,
    })
}

/// Decode the (scenario, decision) pair carried by a log record.
pub fn parts_from_record(
    record: &ProtoDecisionRecord,
) -> Result<(Scenario, Decision), RuntimeError> {
    let scenario = serde_json::from_str(&record.scenario_json)?;
    let decision = serde_json::from_str(&record.decision_json)?;
    Ok((scenario, decision))
}
