//! Run fingerprinting — deterministic identities for grids and datasets.
//!
//! - `GridHash`: BLAKE3 over the canonical JSON of the configured cells.
//! - `DatasetHash`: BLAKE3 over every match in chronological order.
//!
//! Two runs with equal hashes saw the same configuration and the same data,
//! so their results are identical.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Grid, MatchRecord};
use crate::engine::sort_chronological;

/// Hash of a grid snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridHash(pub String);

impl GridHash {
    pub fn of(grid: &Grid) -> Self {
        // Vec of placed cells in row-major order serializes deterministically
        let json = serde_json::to_string(&grid.to_placed()).unwrap_or_default();
        Self(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

impl fmt::Display for GridHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash of a match dataset, independent of input order up to timestamp ties.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DatasetHash(pub String);

impl DatasetHash {
    pub fn of(matches: &[MatchRecord]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for m in sort_chronological(matches) {
            hasher.update(m.date.to_string().as_bytes());
            hasher.update(&[m.hour, m.minute]);
            hasher.update(&m.home_score.to_le_bytes());
            hasher.update(&m.away_score.to_le_bytes());
            hasher.update(&m.total_goals.to_le_bytes());
        }
        Self(hasher.finalize().to_hex().to_string())
    }
}

impl fmt::Display for DatasetHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
