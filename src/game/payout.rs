//! Multiplier and Payout Model
//!
//! Pure functions mapping (cell count, steps completed) to payout
//! multipliers with a fixed house edge, plus the win-probability helpers
//! quoted to the player.
//!
//! All amounts are rounded to cents, half away from zero. Expected value
//! to the player stays strictly below the fair odds implied by
//! [`win_probability`].

use serde::{Deserialize, Serialize};

/// Fractional discount applied to fair odds on every step.
pub const HOUSE_EDGE: f64 = 0.03;

/// Payout multiplier after `steps_completed` safe steps.
///
/// `1.0` for zero steps (the pre-play state); otherwise
/// `(c / (c - 1))^steps * (1 - HOUSE_EDGE)` rounded to cents. Strictly
/// increasing in `steps_completed`, steeper for smaller `cell_count`.
pub fn multiplier(cell_count: u8, steps_completed: u8) -> f64 {
    debug_assert!(cell_count >= 2, "a single-cell row has no safe choice");
    if steps_completed == 0 {
        return 1.0;
    }
    let base = (f64::from(cell_count) / f64::from(cell_count - 1))
        .powi(i32::from(steps_completed));
    round_to_cents(base * (1.0 - HOUSE_EDGE))
}

/// Multiplier table for steps `1..=max_steps`.
pub fn multiplier_table(cell_count: u8, max_steps: u8) -> Vec<f64> {
    (1..=max_steps).map(|s| multiplier(cell_count, s)).collect()
}

/// Largest multiplier reachable in a full round of `row_count` rows.
pub fn max_multiplier(cell_count: u8, row_count: u8) -> f64 {
    multiplier(cell_count, row_count)
}

/// Probability of surviving a single step.
pub fn win_probability(cell_count: u8) -> f64 {
    f64::from(cell_count - 1) / f64::from(cell_count)
}

/// Probability of surviving `steps` consecutive steps.
pub fn total_win_probability(cell_count: u8, steps: u8) -> f64 {
    win_probability(cell_count).powi(i32::from(steps))
}

/// Payout for `bet` at `multiplier`, rounded to cents.
pub fn potential_win(bet: f64, multiplier: f64) -> f64 {
    round_to_cents(bet * multiplier)
}

/// Round an amount to two decimal places, half away from zero.
pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Risk tier implied by the cell count: fewer cells, worse odds per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Two cells: coin-flip odds per step.
    Extreme,
    /// Three cells.
    Hard,
    /// Four cells.
    Medium,
    /// Five cells.
    Easy,
}

/// Difficulty tier for a cell count. Out-of-range counts fall back to
/// [`Difficulty::Medium`].
pub fn difficulty(cell_count: u8) -> Difficulty {
    match cell_count {
        2 => Difficulty::Extreme,
        3 => Difficulty::Hard,
        5 => Difficulty::Easy,
        _ => Difficulty::Medium,
    }
}

// =============================================================================
// TESTS
// =============================================================================
