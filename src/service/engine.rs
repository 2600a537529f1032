//! Game Service
//!
//! The authoritative side of the engine: creates rounds, holds every
//! server seed until reveal, and arbitrates steps and cashouts. In a
//! deployed system this is the server; clients only ever see
//! [`SessionSnapshot`]s during play and [`VerificationData`] afterwards.

use std::collections::BTreeMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::game::config::GameConfig;
use crate::game::fairness::RoundSeeds;
use crate::game::session::{CashoutResult, GameSession, RoundError, SessionSnapshot, StepResult};
use crate::game::verify::{verify_round, VerificationData};

/// A stored round and the secret it will eventually reveal.
#[derive(Clone, Debug)]
struct SessionEntry {
    session: GameSession,
    server_seed: String,
}

/// Authoritative session store and round arbiter.
///
/// Owns every in-flight round together with its withheld server seed.
/// All mutations go through the write lock, so a step or cashout observes
/// a consistent session and never interleaves with another transition on
/// the same store.
pub struct GameService {
    config: GameConfig,
    sessions: RwLock<BTreeMap<String, SessionEntry>>,
}

impl GameService {
    /// Create a service with the given table configuration.
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(BTreeMap::new()),
        }
    }

    /// The configuration this service arbitrates under.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Start a new round.
    ///
    /// Draws fresh seed material, derives the full outcome sequence up
    /// front, and returns a snapshot carrying the commitment but neither
    /// the secret nor the outcomes.
    pub async fn start_game(
        &self,
        bet: f64,
        cell_count: u8,
        client_seed: Option<String>,
    ) -> Result<SessionSnapshot, GameError> {
        if !bet.is_finite() || bet <= 0.0 {
            return Err(GameError::BetOutOfRange { bet });
        }
        if !self.config.cell_count_in_range(cell_count) {
            return Err(GameError::CellCountOutOfRange {
                cell_count,
                min: self.config.min_cell_count,
                max: self.config.max_cell_count,
            });
        }

        let seeds = RoundSeeds::generate(client_seed);
        let session = GameSession::new(
            &seeds,
            self.config.policy,
            bet,
            cell_count,
            self.config.row_count,
        );
        let snapshot = session.snapshot();
        info!(
            id = %session.id,
            bet,
            cell_count,
            nonce = session.nonce,
            policy = ?self.config.policy,
            "round started"
        );
        self.sessions.write().await.insert(
            session.id.clone(),
            SessionEntry {
                session,
                server_seed: seeds.server_seed,
            },
        );
        Ok(snapshot)
    }

    /// Resolve one step of an active round.
    ///
    /// `row` must be the round's next row; `choice` is required by the
    /// trap policy and ignored by the others.
    pub async fn make_step(
        &self,
        session_id: &str,
        row: u8,
        choice: Option<u8>,
    ) -> Result<StepResult, GameError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| GameError::session_not_found(session_id))?;
        let result = entry.session.advance_step(row, choice)?;
        debug!(
            id = %session_id,
            row,
            success = result.success,
            multiplier = result.new_multiplier,
            "step resolved"
        );
        Ok(result)
    }

    /// Cash out an active round.
    pub async fn cashout(&self, session_id: &str) -> Result<CashoutResult, GameError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .get_mut(session_id)
            .ok_or_else(|| GameError::session_not_found(session_id))?;
        let result = entry.session.cashout()?;
        info!(
            id = %session_id,
            amount = result.amount,
            multiplier = result.final_multiplier,
            "round cashed out"
        );
        Ok(result)
    }

    /// Reveal and audit a finished round.
    ///
    /// The secret leaves the store only once the round is terminal; until
    /// then this fails with [`GameError::RoundInProgress`].
    pub async fn verification_data(
        &self,
        session_id: &str,
    ) -> Result<VerificationData, GameError> {
        let sessions = self.sessions.read().await;
        let entry = sessions
            .get(session_id)
            .ok_or_else(|| GameError::session_not_found(session_id))?;
        if entry.session.is_playing() {
            return Err(GameError::RoundInProgress);
        }
        let session = &entry.session;
        let is_valid = verify_round(
            &entry.server_seed,
            &session.server_seed_hash,
            &session.client_seed,
            session.nonce,
            session.cell_count,
            &session.outcome,
        );
        Ok(VerificationData {
            server_seed: entry.server_seed.clone(),
            server_seed_hash: session.server_seed_hash.clone(),
            client_seed: session.client_seed.clone(),
            nonce: session.nonce,
            outcome: session.outcome.clone(),
            is_valid,
        })
    }

    /// Client-facing view of a stored round, if any.
    pub async fn session(&self, session_id: &str) -> Option<SessionSnapshot> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.session.snapshot())
    }

    /// Drop a stored round and its secret. Returns whether it existed.
    pub async fn clear_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        if removed {
            debug!(id = %session_id, "session cleared");
        }
        removed
    }

    /// Number of rounds currently stored.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Test access to a stored round's precomputed outcome.
    #[cfg(test)]
    pub(crate) async fn outcome_of(&self, session_id: &str) -> Option<crate::game::RoundOutcome> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|entry| entry.session.outcome.clone())
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Errors surfaced by the game service.
///
/// User-correctable conditions and protocol violations both land here;
/// nothing is fatal, and no failed call mutates state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GameError {
    /// Unknown session id.
    #[error("session {session_id} not found")]
    SessionNotFound {
        /// The id the caller presented.
        session_id: String,
    },

    /// Stake must be positive and finite.
    #[error("bet {bet} is out of range")]
    BetOutOfRange {
        /// The requested stake.
        bet: f64,
    },

    /// Cell count outside the configured range.
    #[error("cell count {cell_count} outside {min}..={max}")]
    CellCountOutOfRange {
        /// The requested cell count.
        cell_count: u8,
        /// Smallest allowed value.
        min: u8,
        /// Largest allowed value.
        max: u8,
    },

    /// Stake exceeds the available balance.
    #[error("bet {bet} exceeds balance {balance}")]
    InsufficientBalance {
        /// The requested stake.
        bet: f64,
        /// The balance it was checked against.
        balance: f64,
    },

    /// Verification requested before the round ended.
    #[error("round is still in progress")]
    RoundInProgress,

    /// A round already occupies the table; reset it first.
    #[error("table is not idle")]
    TableNotIdle,

    /// A round-level protocol violation.
    #[error(transparent)]
    Round(#[from] RoundError),
}

impl GameError {
    fn session_not_found(session_id: &str) -> Self {
        GameError::SessionNotFound {
            session_id: session_id.to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
