//! # Chicken Road Game Server
//!
//! Provably fair engine for Chicken Road, a stepwise betting game: stake,
//! advance through rows of increasing multipliers, cash out before the
//! hazard ends the round.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  CHICKEN ROAD SERVER                         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Cryptographic primitives                  │
//! │  └── hash.rs     - SHA-256, HMAC-SHA256, secure random hex   │
//! │                                                              │
//! │  game/           - Deterministic game logic                  │
//! │  ├── config.rs   - Table parameters                          │
//! │  ├── fairness.rs - Commit-reveal seed material               │
//! │  ├── outcome.rs  - Seed material -> outcome sequence         │
//! │  ├── payout.rs   - Multiplier math and house edge            │
//! │  ├── session.rs  - Round state machine                       │
//! │  └── verify.rs   - Post-round audit                          │
//! │                                                              │
//! │  service/        - Coordination (in-process)                 │
//! │  ├── engine.rs   - Authoritative session store               │
//! │  └── table.rs    - Player balance, history, round driver     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Fairness Guarantee
//!
//! Before any bet-dependent action, the server publishes a SHA-256
//! commitment to a secret seed. The full outcome sequence is derived once
//! at round creation from (secret, client seed, nonce) — no further
//! randomness is consulted during play, so the operator cannot reseed a
//! round after seeing the bet, and the player can recompute everything
//! after the reveal.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod service;

// Re-export commonly used types
pub use game::config::GameConfig;
pub use game::fairness::RoundSeeds;
pub use game::outcome::{DiceRoll, OutcomePolicy, RoundOutcome};
pub use game::payout::HOUSE_EDGE;
pub use game::session::{
    CashoutResult, GameSession, GameStatus, RoundError, SessionSnapshot, StepEvidence, StepResult,
};
pub use game::verify::{verify_round, VerificationData};
pub use service::engine::{GameError, GameService};
pub use service::table::{GameTable, HistoryEntry, RoundResult};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
