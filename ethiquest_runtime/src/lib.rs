#![forbid(unsafe_code)]

//! Runtime for the EthiQuest decision engine.
//!
//! Wraps the pure engine with per-player sessions, an append-only
//! decision log, deterministic snapshots, replay and drift reporting.
//! No domain logic lives here — resolution and invariants are delegated
//! to `ethiquest_engine`.

pub mod decision_log;
pub mod drift;
pub mod errors;
pub mod proto_types;
pub mod replay;
pub mod session;
pub mod snapshot;
pub mod store;
