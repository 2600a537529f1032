//! Player Table
//!
//! The single coordinating context owning the balance and round history,
//! driving rounds against the game service. At most one round is ever in
//! flight; all transitions take `&mut self`, so a step or cashout can
//! never interleave with another start, step or reset on the same table.

use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::game::payout::{multiplier, round_to_cents};
use crate::game::session::{CashoutResult, GameStatus, RoundError, SessionSnapshot, StepResult};
use crate::game::verify::VerificationData;
use crate::service::engine::{GameError, GameService};

// =============================================================================
// HISTORY
// =============================================================================

/// Result of a finished round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoundResult {
    /// Cashed out.
    Won,
    /// Hit a hazard.
    Lost,
}

/// Record of a finished round, kept most-recent-first.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Round identifier.
    pub id: String,
    /// Stake placed.
    pub bet: f64,
    /// Won or lost.
    pub result: RoundResult,
    /// Multiplier at termination.
    pub multiplier: f64,
    /// Amount paid out; zero on a loss.
    pub payout: f64,
    /// Safe steps completed.
    pub steps: u8,
    /// When the round ended.
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// ACTIVE ROUND
// =============================================================================

/// The table's mirror of the round in flight.
#[derive(Clone, Debug)]
pub struct ActiveRound {
    /// Session id at the service.
    pub session_id: String,
    /// Stake placed.
    pub bet: f64,
    /// Cells per row.
    pub cell_count: u8,
    /// Safe steps completed.
    pub steps_completed: u8,
    /// Multiplier earned so far.
    pub multiplier: f64,
    /// Payout a cashout would now yield.
    pub potential_win: f64,
    /// Round status as last observed.
    pub status: GameStatus,
}

// =============================================================================
// TABLE
// =============================================================================

/// A player's seat: balance, bounded history and the round in flight.
pub struct GameTable {
    service: Arc<GameService>,
    balance: f64,
    history: VecDeque<HistoryEntry>,
    active: Option<ActiveRound>,
    last_finished: Option<String>,
}

impl GameTable {
    /// Seat a player at `service` with the configured starting balance.
    pub fn new(service: Arc<GameService>) -> Self {
        let balance = service.config().initial_balance;
        Self {
            service,
            balance,
            history: VecDeque::new(),
            active: None,
            last_finished: None,
        }
    }

    /// Current balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Finished rounds, most recent first.
    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    /// The round in flight, if any.
    pub fn active_round(&self) -> Option<&ActiveRound> {
        self.active.as_ref()
    }

    /// Table status: the active round's status, or idle.
    pub fn status(&self) -> GameStatus {
        self.active
            .as_ref()
            .map(|round| round.status)
            .unwrap_or(GameStatus::Idle)
    }

    /// Multiplier the next safe step would earn. `None` when idle.
    pub fn next_multiplier(&self) -> Option<f64> {
        self.active
            .as_ref()
            .map(|round| multiplier(round.cell_count, round.steps_completed + 1))
    }

    /// Stake `bet` and start a round.
    ///
    /// Legal only from idle: a terminal round must be reset first. The
    /// bet is debited immediately; a later loss does not restore it.
    pub async fn start_round(
        &mut self,
        bet: f64,
        cell_count: u8,
        client_seed: Option<String>,
    ) -> Result<SessionSnapshot, GameError> {
        if self.active.is_some() {
            return Err(GameError::TableNotIdle);
        }
        if bet > self.balance {
            return Err(GameError::InsufficientBalance {
                bet,
                balance: self.balance,
            });
        }

        let snapshot = self.service.start_game(bet, cell_count, client_seed).await?;
        self.balance = round_to_cents(self.balance - bet);
        self.active = Some(ActiveRound {
            session_id: snapshot.id.clone(),
            bet,
            cell_count,
            steps_completed: 0,
            multiplier: 1.0,
            potential_win: bet,
            status: GameStatus::Playing,
        });
        Ok(snapshot)
    }

    /// Attempt the next step of the active round.
    ///
    /// A loss settles the round immediately: history records the stake,
    /// zero payout and the steps completed before the hazard.
    pub async fn step(&mut self, choice: Option<u8>) -> Result<StepResult, GameError> {
        let (session_id, row) = match &self.active {
            Some(round) if round.status == GameStatus::Playing => {
                (round.session_id.clone(), round.steps_completed)
            }
            _ => return Err(RoundError::NotPlaying.into()),
        };

        let result = self.service.make_step(&session_id, row, choice).await?;

        let mut settled = None;
        if let Some(round) = self.active.as_mut() {
            if result.success {
                round.steps_completed += 1;
                round.multiplier = result.new_multiplier;
                round.potential_win = result.potential_win;
            } else {
                round.status = GameStatus::Lost;
                settled = Some(HistoryEntry {
                    id: round.session_id.clone(),
                    bet: round.bet,
                    result: RoundResult::Lost,
                    multiplier: round.multiplier,
                    payout: 0.0,
                    steps: round.steps_completed,
                    timestamp: Utc::now(),
                });
            }
        }
        if let Some(entry) = settled {
            info!(
                id = %entry.id,
                bet = entry.bet,
                steps = entry.steps,
                balance = self.balance,
                "round lost"
            );
            self.record(entry);
        }
        Ok(result)
    }

    /// Cash out the active round and credit the payout.
    pub async fn cash_out(&mut self) -> Result<CashoutResult, GameError> {
        let session_id = match &self.active {
            Some(round) if round.status == GameStatus::Playing => round.session_id.clone(),
            _ => return Err(RoundError::NotPlaying.into()),
        };

        let result = self.service.cashout(&session_id).await?;
        self.balance = round_to_cents(self.balance + result.amount);

        let mut settled = None;
        if let Some(round) = self.active.as_mut() {
            round.status = GameStatus::Won;
            settled = Some(HistoryEntry {
                id: round.session_id.clone(),
                bet: round.bet,
                result: RoundResult::Won,
                multiplier: result.final_multiplier,
                payout: result.amount,
                steps: round.steps_completed,
                timestamp: Utc::now(),
            });
        }
        if let Some(entry) = settled {
            info!(
                id = %entry.id,
                payout = entry.payout,
                balance = self.balance,
                "round won"
            );
            self.record(entry);
        }
        Ok(result)
    }

    /// Return a terminal table to idle. Balance and history survive.
    ///
    /// Resetting an idle table is a no-op; resetting mid-round is
    /// rejected.
    pub fn reset(&mut self) -> Result<(), GameError> {
        if self.status() == GameStatus::Playing {
            return Err(GameError::RoundInProgress);
        }
        self.active = None;
        Ok(())
    }

    /// Reveal-and-audit data for the most recently finished round.
    pub async fn verification_data(&self) -> Result<VerificationData, GameError> {
        let session_id = self
            .active
            .as_ref()
            .map(|round| round.session_id.clone())
            .or_else(|| self.last_finished.clone())
            .ok_or(GameError::Round(RoundError::NotPlaying))?;
        self.service.verification_data(&session_id).await
    }

    /// Append a settled round, evicting the oldest beyond the bound.
    fn record(&mut self, entry: HistoryEntry) {
        self.last_finished = Some(entry.id.clone());
        self.history.push_front(entry);
        self.history
            .truncate(self.service.config().max_history_entries);
    }
}

// =============================================================================
// TESTS
// =============================================================================
