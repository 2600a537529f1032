//! Outcome Derivation
//!
//! Maps fixed seed material to the complete outcome sequence for a round.
//! Three interchangeable derivation policies implement the same contract;
//! one is selected per table at configuration time and they are never
//! mixed within a round.
//!
//! Shared contract: the sequence has exactly `row_count` entries, is
//! derived once at round creation, and entry `i` depends only on the seed
//! material and `i` — never on prior step results. Play decides *when* the
//! player stops, not *what* the hazard is.

use serde::{Deserialize, Serialize};

use crate::core::hash::{hmac_sha256, sha256, Digest32};
use crate::game::fairness::RoundSeeds;

/// How per-step outcomes are derived from the seed material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomePolicy {
    /// One keyed digest per row; the player loses by picking the trap cell.
    TrapPosition,
    /// One digest split into dice pairs; the first doubles caps the run.
    DicePair,
    /// One digest yields a biased safe-step ceiling plus a safe cell per row.
    SafePath,
}

/// A single dice pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    /// First die face, 1-6.
    pub die_one: u8,
    /// Second die face, 1-6.
    pub die_two: u8,
}

impl DiceRoll {
    /// Doubles end the run.
    pub fn is_double(self) -> bool {
        self.die_one == self.die_two
    }
}

/// The full precomputed outcome sequence for one round.
///
/// Immutable once derived; withheld from the player until the round is
/// terminal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    /// Trap-position policy: one trap cell per row.
    Trap {
        /// Trap cell index for each row.
        positions: Vec<u8>,
    },
    /// Dice-pair policy: one pair per row plus the derived loss ceiling.
    Dice {
        /// Dice pair for each row.
        rolls: Vec<DiceRoll>,
        /// First row showing doubles, if any. Rows at or beyond it are
        /// unreachable.
        loss_step: Option<u8>,
    },
    /// Safe-path policy: one safe cell per row plus the derived ceiling.
    Path {
        /// Safe cell index for each row.
        safe_cells: Vec<u8>,
        /// Rows at or beyond this index are losses.
        max_step: u8,
    },
}

impl RoundOutcome {
    /// Which policy produced this sequence.
    pub fn policy(&self) -> OutcomePolicy {
        match self {
            RoundOutcome::Trap { .. } => OutcomePolicy::TrapPosition,
            RoundOutcome::Dice { .. } => OutcomePolicy::DicePair,
            RoundOutcome::Path { .. } => OutcomePolicy::SafePath,
        }
    }

    /// Number of rows the sequence covers.
    pub fn len(&self) -> usize {
        match self {
            RoundOutcome::Trap { positions } => positions.len(),
            RoundOutcome::Dice { rolls, .. } => rolls.len(),
            RoundOutcome::Path { safe_cells, .. } => safe_cells.len(),
        }
    }

    /// True when the sequence covers no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Derive the outcome sequence for a round.
pub fn derive_outcome(
    policy: OutcomePolicy,
    seeds: &RoundSeeds,
    cell_count: u8,
    row_count: u8,
) -> RoundOutcome {
    match policy {
        OutcomePolicy::TrapPosition => derive_trap_positions(seeds, cell_count, row_count),
        OutcomePolicy::DicePair => derive_dice_rolls(seeds, row_count),
        OutcomePolicy::SafePath => derive_safe_path(seeds, cell_count, row_count),
    }
}

/// One trap cell per row, from a per-row keyed digest.
///
/// Row `r` hashes `"{client_seed}:{nonce}:{r}"` under the server seed;
/// the first four digest bytes, big-endian, select the trap cell.
fn derive_trap_positions(seeds: &RoundSeeds, cell_count: u8, row_count: u8) -> RoundOutcome {
    let positions = (0..row_count)
        .map(|row| {
            let message = format!("{}:{}:{}", seeds.client_seed, seeds.nonce, row);
            let digest = hmac_sha256(seeds.server_seed.as_bytes(), message.as_bytes());
            let value = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
            (value % u32::from(cell_count)) as u8
        })
        .collect();
    RoundOutcome::Trap { positions }
}

/// Two die faces per row from consecutive bytes of the combined digest.
/// The first doubles fixes the loss ceiling.
fn derive_dice_rolls(seeds: &RoundSeeds, row_count: u8) -> RoundOutcome {
    let mut stream = DigestStream::new(combined_digest(seeds));
    let rolls: Vec<DiceRoll> = (0..row_count)
        .map(|_| DiceRoll {
            die_one: stream.next_byte() % 6 + 1,
            die_two: stream.next_byte() % 6 + 1,
        })
        .collect();
    let loss_step = rolls.iter().position(|r| r.is_double()).map(|i| i as u8);
    RoundOutcome::Dice { rolls, loss_step }
}

/// A safe-step ceiling from the first byte of the combined digest, then
/// one safe cell per row from the following bytes.
fn derive_safe_path(seeds: &RoundSeeds, cell_count: u8, row_count: u8) -> RoundOutcome {
    let mut stream = DigestStream::new(combined_digest(seeds));
    // Cubing the normalized byte skews the ceiling toward short runs.
    let normalized = f64::from(stream.next_byte()) / 255.0;
    let max_step = (normalized.powi(3) * f64::from(row_count)) as u8;
    let safe_cells = (0..row_count)
        .map(|_| stream.next_byte() % cell_count)
        .collect();
    RoundOutcome::Path {
        safe_cells,
        max_step,
    }
}

/// Single derivation context shared by the dice and safe-path policies.
fn combined_digest(seeds: &RoundSeeds) -> Digest32 {
    let combined = format!(
        "{}-{}-{}",
        seeds.server_seed, seeds.client_seed, seeds.nonce
    );
    sha256(combined.as_bytes())
}

/// Deterministic byte stream seeded by a digest.
///
/// Rehashes its buffer when exhausted, so derivations are not capped by
/// one digest's width.
struct DigestStream {
    buffer: Digest32,
    cursor: usize,
}

impl DigestStream {
    fn new(buffer: Digest32) -> Self {
        Self { buffer, cursor: 0 }
    }

    fn next_byte(&mut self) -> u8 {
        if self.cursor == self.buffer.len() {
            self.buffer = sha256(&self.buffer);
            self.cursor = 0;
        }
        let byte = self.buffer[self.cursor];
        self.cursor += 1;
        byte
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SERVER_SEED: &str = "1f6fdb51bf6ea6da0b2e8c7df96e2c2d4a5b3f1e8d9c0a7b6e5f4d3c2b1a0918";
    const CLIENT_SEED: &str = "deadbeefcafebabe";
    const NONCE: u64 = 1_700_000_000_000;

    fn seeds_with_client(client_seed: &str) -> RoundSeeds {
        RoundSeeds::from_parts(SERVER_SEED.to_string(), client_seed.to_string(), NONCE)
    }

    fn seeds() -> RoundSeeds {
        seeds_with_client(CLIENT_SEED)
    }

    #[test]
    fn test_determinism_across_invocations() {
        for policy in [
            OutcomePolicy::TrapPosition,
            OutcomePolicy::DicePair,
            OutcomePolicy::SafePath,
        ] {
            let a = derive_outcome(policy, &seeds(), 3, 10);
            let b = derive_outcome(policy, &seeds(), 3, 10);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_trap_positions_known_values() {
        // Frozen regression vector: revealed rounds replay against it.
        let outcome = derive_outcome(OutcomePolicy::TrapPosition, &seeds(), 3, 10);
        assert_eq!(
            outcome,
            RoundOutcome::Trap {
                positions: vec![1, 1, 2, 1, 1, 1, 0, 0, 1, 0],
            }
        );
    }

    #[test]
    fn test_trap_positions_in_range() {
        for cell_count in 2..=5u8 {
            let outcome = derive_outcome(OutcomePolicy::TrapPosition, &seeds(), cell_count, 10);
            let RoundOutcome::Trap { positions } = outcome else {
                panic!("wrong variant");
            };
            assert_eq!(positions.len(), 10);
            assert!(positions.iter().all(|&p| p < cell_count));
        }
    }

    #[test]
    fn test_dice_rolls_known_values() {
        let outcome = derive_outcome(OutcomePolicy::DicePair, &seeds(), 3, 10);
        let RoundOutcome::Dice { rolls, loss_step } = outcome else {
            panic!("wrong variant");
        };
        let faces: Vec<(u8, u8)> = rolls.iter().map(|r| (r.die_one, r.die_two)).collect();
        assert_eq!(
            faces,
            vec![
                (1, 4),
                (3, 2),
                (4, 6),
                (5, 4),
                (1, 3),
                (1, 3),
                (1, 2),
                (5, 6),
                (2, 2),
                (5, 3),
            ]
        );
        // First doubles at row 8 caps the run there.
        assert_eq!(loss_step, Some(8));
    }

    #[test]
    fn test_dice_faces_are_valid() {
        let outcome = derive_outcome(OutcomePolicy::DicePair, &seeds(), 3, 10);
        let RoundOutcome::Dice { rolls, .. } = outcome else {
            panic!("wrong variant");
        };
        assert!(rolls
            .iter()
            .all(|r| (1..=6).contains(&r.die_one) && (1..=6).contains(&r.die_two)));
    }

    #[test]
    fn test_dice_loss_step_can_be_immediate() {
        let outcome = derive_outcome(OutcomePolicy::DicePair, &seeds_with_client("c0ffee02"), 3, 10);
        let RoundOutcome::Dice { rolls, loss_step } = outcome else {
            panic!("wrong variant");
        };
        assert_eq!((rolls[0].die_one, rolls[0].die_two), (3, 3));
        assert_eq!(loss_step, Some(0));
    }

    #[test]
    fn test_safe_path_known_values() {
        // First digest byte 0x60 = 96; (96/255)^3 * 10 floors to 0.
        let outcome = derive_outcome(OutcomePolicy::SafePath, &seeds(), 3, 10);
        assert_eq!(
            outcome,
            RoundOutcome::Path {
                safe_cells: vec![0, 2, 1, 0, 2, 1, 0, 0, 2, 0],
                max_step: 0,
            }
        );
    }

    #[test]
    fn test_safe_path_long_ceiling() {
        // First digest byte 0xf6 = 246; (246/255)^3 * 10 floors to 8.
        let outcome =
            derive_outcome(OutcomePolicy::SafePath, &seeds_with_client("feedface01"), 3, 10);
        assert_eq!(
            outcome,
            RoundOutcome::Path {
                safe_cells: vec![2, 0, 0, 0, 1, 1, 0, 1, 1, 2],
                max_step: 8,
            }
        );
    }

    #[test]
    fn test_safe_path_ceiling_bounds() {
        for client in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            let outcome = derive_outcome(OutcomePolicy::SafePath, &seeds_with_client(client), 4, 10);
            let RoundOutcome::Path { max_step, .. } = outcome else {
                panic!("wrong variant");
            };
            assert!(max_step <= 10);
        }
    }

    #[test]
    fn test_digest_stream_extends_past_one_digest() {
        // 20 rows of dice need 40 bytes, more than one 32-byte digest.
        let outcome = derive_outcome(OutcomePolicy::DicePair, &seeds(), 3, 20);
        let RoundOutcome::Dice { rolls, .. } = outcome else {
            panic!("wrong variant");
        };
        assert_eq!(rolls.len(), 20);
        assert!(rolls
            .iter()
            .all(|r| (1..=6).contains(&r.die_one) && (1..=6).contains(&r.die_two)));
    }

    #[test]
    fn test_different_seeds_diverge() {
        let a = derive_outcome(OutcomePolicy::TrapPosition, &seeds(), 3, 10);
        let b = derive_outcome(
            OutcomePolicy::TrapPosition,
            &seeds_with_client("other-client"),
            3,
            10,
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_nonce_separates_rounds() {
        let base = seeds();
        let mut shifted = seeds();
        shifted.nonce += 1;
        assert_ne!(
            derive_outcome(OutcomePolicy::TrapPosition, &base, 3, 10),
            derive_outcome(OutcomePolicy::TrapPosition, &shifted, 3, 10)
        );
    }

    #[test]
    fn test_policy_accessor() {
        assert_eq!(
            derive_outcome(OutcomePolicy::DicePair, &seeds(), 3, 10).policy(),
            OutcomePolicy::DicePair
        );
        assert_eq!(derive_outcome(OutcomePolicy::DicePair, &seeds(), 3, 10).len(), 10);
    }
}
