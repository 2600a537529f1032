//! Round Session State
//!
//! One round's immutable seed material plus its mutable progress, and the
//! step/cashout transitions enforced on it. Everything here is
//! deterministic given the session's fixed outcome sequence; no further
//! randomness is consulted during play.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::fairness::RoundSeeds;
use crate::game::outcome::{derive_outcome, DiceRoll, OutcomePolicy, RoundOutcome};
use crate::game::payout::{multiplier, potential_win};

// =============================================================================
// STATUS
// =============================================================================

/// Round lifecycle status.
///
/// `Idle -> Playing -> Won | Lost`; terminal rounds must be reset before
/// a new one starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// No active round.
    Idle,
    /// Round active; steps may be taken.
    Playing,
    /// Round cashed out.
    Won,
    /// Round hit a hazard.
    Lost,
}

// =============================================================================
// SESSION
// =============================================================================

/// One round of play.
///
/// The outcome sequence is fully determined at construction from the seed
/// material; play only decides when the player stops. The server seed
/// itself is held beside the session by the service, never inside it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameSession {
    /// Opaque round identifier.
    pub id: String,
    /// Published commitment to the withheld server seed.
    pub server_seed_hash: String,
    /// Player-influenceable seed.
    pub client_seed: String,
    /// Round-unique nonce.
    pub nonce: u64,
    /// Cells per row.
    pub cell_count: u8,
    /// Precomputed outcome for every row. Withheld from the player until
    /// the round is terminal.
    pub outcome: RoundOutcome,
    /// Stake debited at round start.
    pub bet: f64,
    /// Safe steps completed so far. Also the row to attempt next.
    pub steps_completed: u8,
    /// Multiplier earned so far.
    pub current_multiplier: f64,
    /// Lifecycle status.
    pub status: GameStatus,
    /// Round creation time.
    pub created_at: DateTime<Utc>,
}

impl GameSession {
    /// Create a round from fixed seed material.
    pub fn new(
        seeds: &RoundSeeds,
        policy: OutcomePolicy,
        bet: f64,
        cell_count: u8,
        row_count: u8,
    ) -> Self {
        let outcome = derive_outcome(policy, seeds, cell_count, row_count);
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            server_seed_hash: seeds.server_seed_hash.clone(),
            client_seed: seeds.client_seed.clone(),
            nonce: seeds.nonce,
            cell_count,
            outcome,
            bet,
            steps_completed: 0,
            current_multiplier: 1.0,
            status: GameStatus::Playing,
            created_at: Utc::now(),
        }
    }

    /// Rows in this round.
    pub fn row_count(&self) -> u8 {
        self.outcome.len() as u8
    }

    /// Is the round still accepting steps?
    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    /// Has the round reached a terminal status?
    pub fn is_terminal(&self) -> bool {
        matches!(self.status, GameStatus::Won | GameStatus::Lost)
    }

    /// Attempt the next step.
    ///
    /// `row` must equal the number of steps already completed; `choice` is
    /// required by the trap policy and ignored by the others. On a safe
    /// step the counter and multiplier advance; on a hazard the round is
    /// lost and no further transitions are accepted.
    pub fn advance_step(&mut self, row: u8, choice: Option<u8>) -> Result<StepResult, RoundError> {
        if !self.is_playing() {
            return Err(RoundError::NotPlaying);
        }
        if row != self.steps_completed {
            return Err(RoundError::OutOfSequence {
                expected: self.steps_completed,
                requested: row,
            });
        }
        if row >= self.row_count() {
            return Err(RoundError::RoundComplete);
        }

        let (success, evidence) = self.resolve_step(row, choice)?;
        if success {
            self.steps_completed += 1;
            self.current_multiplier = multiplier(self.cell_count, self.steps_completed);
        } else {
            self.status = GameStatus::Lost;
        }
        Ok(StepResult {
            success,
            evidence,
            new_multiplier: self.current_multiplier,
            potential_win: potential_win(self.bet, self.current_multiplier),
        })
    }

    /// Decide one step against the precomputed sequence.
    fn resolve_step(&self, row: u8, choice: Option<u8>) -> Result<(bool, StepEvidence), RoundError> {
        let idx = usize::from(row);
        match &self.outcome {
            RoundOutcome::Trap { positions } => {
                let chosen = choice.ok_or(RoundError::MissingCellChoice)?;
                if chosen >= self.cell_count {
                    return Err(RoundError::CellIndexOutOfRange {
                        chosen,
                        cell_count: self.cell_count,
                    });
                }
                let trap_index = positions[idx];
                Ok((chosen != trap_index, StepEvidence::Trap { trap_index }))
            }
            RoundOutcome::Dice { rolls, .. } => {
                let roll = rolls[idx];
                Ok((!roll.is_double(), StepEvidence::Dice { roll }))
            }
            RoundOutcome::Path {
                safe_cells,
                max_step,
            } => Ok((
                row < *max_step,
                StepEvidence::Path {
                    safe_cell: safe_cells[idx],
                },
            )),
        }
    }

    /// Cash out the current run.
    ///
    /// Requires at least one completed step; a round with no steps has
    /// nothing to pay out.
    pub fn cashout(&mut self) -> Result<CashoutResult, RoundError> {
        if !self.is_playing() {
            return Err(RoundError::NotPlaying);
        }
        if self.steps_completed == 0 {
            return Err(RoundError::NoStepsTaken);
        }
        self.status = GameStatus::Won;
        Ok(CashoutResult {
            success: true,
            amount: potential_win(self.bet, self.current_multiplier),
            final_multiplier: self.current_multiplier,
        })
    }

    /// Client-facing view with the outcome sequence withheld.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            server_seed_hash: self.server_seed_hash.clone(),
            client_seed: self.client_seed.clone(),
            nonce: self.nonce,
            cell_count: self.cell_count,
            row_count: self.row_count(),
            bet: self.bet,
            steps_completed: self.steps_completed,
            current_multiplier: self.current_multiplier,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Per-step proof of what the derivation held for a row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepEvidence {
    /// Trap-position policy: the row's trap cell.
    Trap {
        /// Trap cell index for the row.
        trap_index: u8,
    },
    /// Dice-pair policy: the row's dice pair.
    Dice {
        /// Dice pair rolled for the row.
        roll: DiceRoll,
    },
    /// Safe-path policy: the row's safe cell.
    Path {
        /// Safe cell index for the row.
        safe_cell: u8,
    },
}

/// Outcome of one attempted step. Produced fresh per step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    /// Did the step survive?
    pub success: bool,
    /// What the derivation held for the row.
    pub evidence: StepEvidence,
    /// Multiplier after the step.
    pub new_multiplier: f64,
    /// Payout a cashout would now yield.
    pub potential_win: f64,
}

/// Result of a successful cashout. Produced once per round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CashoutResult {
    /// Always true; a failed cashout is an error, not a result.
    pub success: bool,
    /// Amount credited to the balance.
    pub amount: f64,
    /// Multiplier at the time of cashout.
    pub final_multiplier: f64,
}

/// Client-facing view of a round, with the outcome sequence withheld.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Round identifier.
    pub id: String,
    /// Commitment to the withheld server seed.
    pub server_seed_hash: String,
    /// Player seed in use.
    pub client_seed: String,
    /// Round nonce.
    pub nonce: u64,
    /// Cells per row.
    pub cell_count: u8,
    /// Rows in the round.
    pub row_count: u8,
    /// Stake placed.
    pub bet: f64,
    /// Safe steps completed.
    pub steps_completed: u8,
    /// Multiplier earned so far.
    pub current_multiplier: f64,
    /// Round status.
    pub status: GameStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// ERRORS
// =============================================================================

/// Protocol violations on a single round.
///
/// These indicate a caller bug or stale client state rather than a player
/// mistake. The round is left unchanged in every case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RoundError {
    /// Round is not accepting play.
    #[error("round is not in playing state")]
    NotPlaying,

    /// Step requested out of order.
    #[error("expected step {expected}, got {requested}")]
    OutOfSequence {
        /// The row the round would accept next.
        expected: u8,
        /// The row the caller asked for.
        requested: u8,
    },

    /// Every row has already been cleared.
    #[error("no rows left to play")]
    RoundComplete,

    /// The trap policy needs a chosen cell.
    #[error("cell choice required")]
    MissingCellChoice,

    /// Chosen cell beyond the row width.
    #[error("cell {chosen} out of range for {cell_count} cells")]
    CellIndexOutOfRange {
        /// The cell the caller picked.
        chosen: u8,
        /// Cells per row in this round.
        cell_count: u8,
    },

    /// Cashout with zero completed steps.
    #[error("cannot cash out before completing a step")]
    NoStepsTaken,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::payout;

    const SERVER_SEED: &str = "1f6fdb51bf6ea6da0b2e8c7df96e2c2d4a5b3f1e8d9c0a7b6e5f4d3c2b1a0918";
    const CLIENT_SEED: &str = "deadbeefcafebabe";
    const NONCE: u64 = 1_700_000_000_000;

    fn seeds() -> RoundSeeds {
        RoundSeeds::from_parts(SERVER_SEED.to_string(), CLIENT_SEED.to_string(), NONCE)
    }

    fn trap_session(bet: f64) -> GameSession {
        GameSession::new(&seeds(), OutcomePolicy::TrapPosition, bet, 3, 10)
    }

    fn trap_at(session: &GameSession, row: u8) -> u8 {
        let RoundOutcome::Trap { positions } = &session.outcome else {
            panic!("wrong variant");
        };
        positions[usize::from(row)]
    }

    #[test]
    fn test_new_session_shape() {
        let session = trap_session(100.0);
        assert_eq!(session.status, GameStatus::Playing);
        assert_eq!(session.steps_completed, 0);
        assert_eq!(session.current_multiplier, 1.0);
        assert_eq!(session.row_count(), 10);
        assert!(session.is_playing());
        assert!(!session.is_terminal());
    }

    #[test]
    fn test_safe_step_advances() {
        let mut session = trap_session(100.0);
        let safe = (trap_at(&session, 0) + 1) % 3;
        let result = session.advance_step(0, Some(safe)).unwrap();
        assert!(result.success);
        assert_eq!(result.new_multiplier, 1.46);
        assert_eq!(result.potential_win, 146.0);
        assert_eq!(session.steps_completed, 1);
        assert_eq!(session.status, GameStatus::Playing);
    }

    #[test]
    fn test_trap_step_loses() {
        let mut session = trap_session(50.0);
        let trap = trap_at(&session, 0);
        let result = session.advance_step(0, Some(trap)).unwrap();
        assert!(!result.success);
        assert_eq!(result.evidence, StepEvidence::Trap { trap_index: trap });
        assert_eq!(session.status, GameStatus::Lost);
        assert_eq!(session.steps_completed, 0);
        // Multiplier stays at what was earned before the hazard.
        assert_eq!(result.new_multiplier, 1.0);
    }

    #[test]
    fn test_no_play_after_loss() {
        let mut session = trap_session(50.0);
        let trap = trap_at(&session, 0);
        session.advance_step(0, Some(trap)).unwrap();
        assert_eq!(
            session.advance_step(0, Some(0)),
            Err(RoundError::NotPlaying)
        );
        assert_eq!(session.cashout(), Err(RoundError::NotPlaying));
    }

    #[test]
    fn test_out_of_sequence_rejected() {
        let mut session = trap_session(100.0);
        assert_eq!(
            session.advance_step(1, Some(0)),
            Err(RoundError::OutOfSequence {
                expected: 0,
                requested: 1
            })
        );
        // A rejected step leaves the round untouched.
        assert_eq!(session.steps_completed, 0);
        assert!(session.is_playing());
    }

    #[test]
    fn test_trap_policy_requires_choice() {
        let mut session = trap_session(100.0);
        assert_eq!(
            session.advance_step(0, None),
            Err(RoundError::MissingCellChoice)
        );
    }

    #[test]
    fn test_choice_out_of_range_rejected() {
        let mut session = trap_session(100.0);
        assert_eq!(
            session.advance_step(0, Some(3)),
            Err(RoundError::CellIndexOutOfRange {
                chosen: 3,
                cell_count: 3
            })
        );
    }

    #[test]
    fn test_cashout_without_steps_rejected() {
        let mut session = trap_session(100.0);
        assert_eq!(session.cashout(), Err(RoundError::NoStepsTaken));
        assert!(session.is_playing());
    }

    #[test]
    fn test_cashout_after_one_step() {
        let mut session = trap_session(100.0);
        let safe = (trap_at(&session, 0) + 1) % 3;
        session.advance_step(0, Some(safe)).unwrap();
        let result = session.cashout().unwrap();
        assert!(result.success);
        assert_eq!(result.final_multiplier, 1.46);
        assert_eq!(result.amount, 146.0);
        assert_eq!(session.status, GameStatus::Won);
    }

    #[test]
    fn test_full_round_then_complete() {
        let mut session = trap_session(10.0);
        for row in 0..10 {
            let safe = (trap_at(&session, row) + 1) % 3;
            let result = session.advance_step(row, Some(safe)).unwrap();
            assert!(result.success);
        }
        assert_eq!(session.steps_completed, 10);
        assert_eq!(session.current_multiplier, payout::multiplier(3, 10));
        // Nothing left to step onto; the only move is cashing out.
        assert_eq!(
            session.advance_step(10, Some(0)),
            Err(RoundError::RoundComplete)
        );
        let result = session.cashout().unwrap();
        assert_eq!(result.final_multiplier, 55.94);
    }

    #[test]
    fn test_dice_session_runs_to_ceiling() {
        // Known seeds roll their first doubles at row 8.
        let mut session = GameSession::new(&seeds(), OutcomePolicy::DicePair, 10.0, 3, 10);
        for row in 0..8 {
            let result = session.advance_step(row, None).unwrap();
            assert!(result.success, "row {row} should be safe");
        }
        let result = session.advance_step(8, None).unwrap();
        assert!(!result.success);
        assert_eq!(
            result.evidence,
            StepEvidence::Dice {
                roll: DiceRoll {
                    die_one: 2,
                    die_two: 2
                }
            }
        );
        assert_eq!(session.status, GameStatus::Lost);
        assert_eq!(session.steps_completed, 8);
    }

    #[test]
    fn test_safe_path_session_hits_ceiling() {
        let seeds =
            RoundSeeds::from_parts(SERVER_SEED.to_string(), "feedface01".to_string(), NONCE);
        // max_step is 8 for these seeds.
        let mut session = GameSession::new(&seeds, OutcomePolicy::SafePath, 10.0, 3, 10);
        for row in 0..8 {
            assert!(session.advance_step(row, None).unwrap().success);
        }
        let result = session.advance_step(8, None).unwrap();
        assert!(!result.success);
        assert_eq!(session.status, GameStatus::Lost);
    }

    #[test]
    fn test_safe_path_zero_ceiling_is_instant_loss() {
        let mut session = GameSession::new(&seeds(), OutcomePolicy::SafePath, 10.0, 3, 10);
        let result = session.advance_step(0, None).unwrap();
        assert!(!result.success);
        assert_eq!(session.status, GameStatus::Lost);
        assert_eq!(session.steps_completed, 0);
    }

    #[test]
    fn test_snapshot_mirrors_session() {
        let mut session = trap_session(100.0);
        let safe = (trap_at(&session, 0) + 1) % 3;
        session.advance_step(0, Some(safe)).unwrap();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.id, session.id);
        assert_eq!(snapshot.server_seed_hash, session.server_seed_hash);
        assert_eq!(snapshot.steps_completed, 1);
        assert_eq!(snapshot.current_multiplier, 1.46);
        assert_eq!(snapshot.row_count, 10);
        assert_eq!(snapshot.status, GameStatus::Playing);
    }
}
