//! Relation resolution — which pattern cells feed which entry cells.
//!
//! An entry relates to every pattern in the same column on a row above it.
//! Row distance is unbounded; adjacency is not required.

use serde::{Deserialize, Serialize};

use crate::domain::{Grid, PlacedCell};

/// A pattern cell paired with an entry cell below it in the same column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternEntryPair {
    pub pattern: PlacedCell,
    pub entry: PlacedCell,
}

impl PatternEntryPair {
    /// `pattern -> entry` address label, e.g. `2-5 -> 5-5`.
    pub fn label(&self) -> String {
        format!("{} -> {}", self.pattern.position, self.entry.position)
    }
}

/// True when `entry` sits strictly below `pattern` in the same column.
pub fn is_related(pattern: &PlacedCell, entry: &PlacedCell) -> bool {
    entry.position.col == pattern.position.col && entry.position.row > pattern.position.row
}

/// Every related (pattern, entry) pair in the grid.
///
/// Entries are visited row-major; for each entry its patterns are visited
/// row-major. Empty when the grid lacks either role.
pub fn resolve_pairs(grid: &Grid) -> Vec<PatternEntryPair> {
    let patterns = grid.patterns();
    let entries = grid.entries();
    if patterns.is_empty() || entries.is_empty() {
        return Vec::new();
    }

    let mut pairs = Vec::new();
    for entry in &entries {
        for pattern in patterns.iter().filter(|p| is_related(p, entry)) {
            pairs.push(PatternEntryPair {
                pattern: pattern.clone(),
                entry: entry.clone(),
            });
        }
    }
    pairs
}
