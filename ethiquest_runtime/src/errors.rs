/// Runtime error type.
///
/// Engine errors pass through unchanged so callers can distinguish a bad
/// submission (re-prompt the player) from a storage failure (retry or
/// surface to operations).

use ethiquest_engine::errors::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON codec failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("protobuf decode failure: {0}")]
    ProtoDecode(#[from] prost::DecodeError),

    #[error("decision log sequence violation: expected {expected}, got {got}")]
    SequenceViolation { expected: u64, got: u64 },

    #[error("corrupt decision log: {0}")]
    CorruptLog(String),

    #[error("snapshot rejected: {0}")]
    BadSnapshot(String),
}
