//! Game Logic Module
//!
//! The deterministic heart of the engine. Everything below derives from
//! fixed seed material; play never consults fresh randomness.
//!
//! ## Module Structure
//!
//! - `config`: Table parameters and their defaults
//! - `fairness`: Commit-reveal seed material
//! - `outcome`: Seed material -> per-row outcome sequence (three policies)
//! - `payout`: Multiplier mathematics and house edge
//! - `session`: One round's state and its step/cashout transitions
//! - `verify`: Post-round recomputation and audit

pub mod config;
pub mod fairness;
pub mod outcome;
pub mod payout;
pub mod session;
pub mod verify;

// Re-export key types
pub use config::GameConfig;
pub use fairness::RoundSeeds;
pub use outcome::{derive_outcome, DiceRoll, OutcomePolicy, RoundOutcome};
pub use payout::{Difficulty, HOUSE_EDGE};
pub use session::{
    CashoutResult, GameSession, GameStatus, RoundError, SessionSnapshot, StepEvidence, StepResult,
};
pub use verify::{verify_round, VerificationData};
