use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::position::Position;

/// One user's full set of positions, materialized in memory.
///
/// This is the in-process view of what the backing document store holds for
/// a single owner — the library never talks to storage itself, it is handed
/// an already-scoped ledger by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    /// The owner all contained positions belong to
    pub owner: Uuid,

    /// All purchase lots, in insertion order
    pub positions: Vec<Position>,
}

impl Ledger {
    pub fn new(owner: Uuid) -> Self {
        Self {
            owner,
            positions: Vec::new(),
        }
    }

    /// Find a position by its id.
    pub fn position(&self, id: Uuid) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    /// Find a position by its id, mutably.
    pub fn position_mut(&mut self, id: Uuid) -> Option<&mut Position> {
        self.positions.iter_mut().find(|p| p.id == id)
    }

    /// Total number of sale events across all positions.
    pub fn sale_count(&self) -> usize {
        self.positions.iter().map(|p| p.sales.len()).sum()
    }
}
