//! Table Configuration

use serde::{Deserialize, Serialize};

use crate::game::outcome::OutcomePolicy;

/// Tunable parameters for one game table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Rows a round can advance through.
    pub row_count: u8,
    /// Smallest selectable cell count per row.
    pub min_cell_count: u8,
    /// Largest selectable cell count per row.
    pub max_cell_count: u8,
    /// Starting balance for a fresh table.
    pub initial_balance: f64,
    /// History length bound; older entries are evicted.
    pub max_history_entries: usize,
    /// Outcome derivation policy for new rounds.
    pub policy: OutcomePolicy,
}

impl GameConfig {
    /// Is `cell_count` selectable under this configuration?
    pub fn cell_count_in_range(&self, cell_count: u8) -> bool {
        (self.min_cell_count..=self.max_cell_count).contains(&cell_count)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            row_count: 10,
            min_cell_count: 2,
            max_cell_count: 5,
            initial_balance: 1000.0,
            max_history_entries: 20,
            policy: OutcomePolicy::TrapPosition,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
