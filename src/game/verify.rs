//! Fairness Verification
//!
//! Recompute a finished round from its revealed secret and confirm it
//! matches what was presented during play. A mismatch is an expected,
//! checkable verdict, never an error.

use serde::{Deserialize, Serialize};

use crate::game::fairness::RoundSeeds;
use crate::game::outcome::{derive_outcome, RoundOutcome};

/// Everything a player needs to audit a finished round.
///
/// Only derivable after termination: the secret is withheld while play is
/// possible, by construction rather than access control.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationData {
    /// Revealed server seed.
    pub server_seed: String,
    /// Commitment published at round start.
    pub server_seed_hash: String,
    /// Player seed used in the derivation.
    pub client_seed: String,
    /// Round nonce.
    pub nonce: u64,
    /// The outcome sequence as presented during play.
    pub outcome: RoundOutcome,
    /// Verdict of the recomputation.
    pub is_valid: bool,
}

/// Recompute and check a claimed round outcome.
///
/// True only if the revealed seed hashes to the published commitment AND
/// the sequence re-derived under the claimed outcome's own policy matches
/// it element-wise.
pub fn verify_round(
    server_seed: &str,
    server_seed_hash: &str,
    client_seed: &str,
    nonce: u64,
    cell_count: u8,
    claimed: &RoundOutcome,
) -> bool {
    if !RoundSeeds::commitment_matches(server_seed, server_seed_hash) {
        return false;
    }
    let seeds = RoundSeeds::from_parts(server_seed.to_string(), client_seed.to_string(), nonce);
    let recomputed = derive_outcome(claimed.policy(), &seeds, cell_count, claimed.len() as u8);
    recomputed == *claimed
}

// =============================================================================
// TESTS
// =============================================================================
