//! Commit-Reveal Fairness Scheme
//!
//! The seed material a round is derived from, and the protocol around it:
//!
//! 1. **Generate** - a server secret is drawn before any outcome exists
//! 2. **Commit** - its SHA-256 commitment is published to the player
//! 3. **Reveal** - the secret is disclosed once the round is terminal
//! 4. **Verify** - anyone recomputes `sha256(secret)` and the outcome
//!    sequence and checks both against what was presented during play
//!
//! The player cannot predict outcomes (secret unknown); the operator
//! cannot change them after the bet (commitment and the full outcome
//! sequence are fixed up front).

use serde::{Deserialize, Serialize};

use crate::core::hash::{secure_random_hex, sha256_hex};

/// Entropy drawn for a fresh server secret, in bytes.
pub const SERVER_SEED_BYTES: usize = 32;

/// Entropy drawn for a generated client seed, in bytes.
pub const CLIENT_SEED_BYTES: usize = 16;

/// Seed material fixed at round start.
///
/// The server seed stays private until the round terminates; everything
/// else is shown to the player up front.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundSeeds {
    /// Secret operator seed, revealed only after the round ends.
    pub server_seed: String,
    /// Published commitment: `sha256(server_seed)`.
    pub server_seed_hash: String,
    /// Player-influenceable seed.
    pub client_seed: String,
    /// Round-unique value. Uniqueness matters; secrecy does not.
    pub nonce: u64,
}

impl RoundSeeds {
    /// Draw fresh seed material for a new round.
    ///
    /// A missing client seed is generated server-side so the derivation
    /// context is never player-empty. The nonce is the current wall clock
    /// in milliseconds.
    pub fn generate(client_seed: Option<String>) -> Self {
        let server_seed = secure_random_hex(SERVER_SEED_BYTES);
        let server_seed_hash = sha256_hex(server_seed.as_bytes());
        let client_seed =
            client_seed.unwrap_or_else(|| secure_random_hex(CLIENT_SEED_BYTES));
        let nonce = chrono::Utc::now().timestamp_millis() as u64;
        Self {
            server_seed,
            server_seed_hash,
            client_seed,
            nonce,
        }
    }

    /// Rebuild seed material from revealed parts (the verification path).
    ///
    /// The commitment is recomputed, not trusted.
    pub fn from_parts(server_seed: String, client_seed: String, nonce: u64) -> Self {
        let server_seed_hash = sha256_hex(server_seed.as_bytes());
        Self {
            server_seed,
            server_seed_hash,
            client_seed,
            nonce,
        }
    }

    /// Check a revealed secret against a published commitment.
    pub fn commitment_matches(server_seed: &str, server_seed_hash: &str) -> bool {
        sha256_hex(server_seed.as_bytes()) == server_seed_hash
    }
}

// =============================================================================
// TESTS
// =============================================================================
