#![forbid(unsafe_code)]

//! Decision-resolution and progression engine for the EthiQuest
//! business-ethics simulation.
//!
//! The engine is a pure, synchronous computation over immutable inputs:
//! given the current [`domain::GameState`], a [`domain::Scenario`] and the
//! player's [`domain::Decision`], it produces the next state plus a
//! structured [`domain::ResolutionOutcome`]. Persistence, transport and
//! scenario generation live in `ethiquest_runtime` and beyond.

/// Engine version, bound into canonical hashes and snapshots.
pub const ENGINE_VERSION: u32 = 1;

pub mod challenges;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod hashing;
pub mod invariants;
pub mod metrics;
pub mod progression;
pub mod resolution;
pub mod state;
pub mod validity;
