//! In-Process Service Layer
//!
//! The authoritative side of the engine plus the player-facing table that
//! drives it. These stand in for the client/server pair of a deployed
//! system; the seam is the same, only the transport is absent.

pub mod engine;
pub mod table;

pub use engine::{GameError, GameService};
pub use table::{ActiveRound, GameTable, HistoryEntry, RoundResult};
