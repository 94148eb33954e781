//! Gale classification — which retry stage of a look-ahead window hits.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{CellConfig, MatchRecord};

use super::condition::matches;

/// Number of records following a pattern hit that an entry may land on.
pub const LOOKAHEAD: usize = 5;

/// The retry stage at which an entry was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GaleLevel {
    /// Hit on the first look-ahead record.
    SG,
    G1,
    G2,
    G3,
    G4,
    /// No record in the window hit.
    F,
}

impl GaleLevel {
    /// All levels in stage order.
    pub const ALL: [GaleLevel; 6] = [
        GaleLevel::SG,
        GaleLevel::G1,
        GaleLevel::G2,
        GaleLevel::G3,
        GaleLevel::G4,
        GaleLevel::F,
    ];

    /// Level for a hit at window offset `offset` (0-based).
    pub fn from_offset(offset: usize) -> Self {
        match offset {
            0 => GaleLevel::SG,
            1 => GaleLevel::G1,
            2 => GaleLevel::G2,
            3 => GaleLevel::G3,
            4 => GaleLevel::G4,
            _ => GaleLevel::F,
        }
    }

    /// Number of stakes placed before this level resolved (1 for SG .. 5 for G4 and F).
    pub fn attempts(self) -> usize {
        match self {
            GaleLevel::SG => 1,
            GaleLevel::G1 => 2,
            GaleLevel::G2 => 3,
            GaleLevel::G3 => 4,
            GaleLevel::G4 | GaleLevel::F => LOOKAHEAD,
        }
    }

    pub fn is_success(self) -> bool {
        self != GaleLevel::F
    }
}

impl fmt::Display for GaleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Classify a window by the first record that satisfies `entry`.
pub fn classify(window: &[MatchRecord; LOOKAHEAD], entry: &CellConfig) -> GaleLevel {
    window
        .iter()
        .position(|record| matches(record, entry))
        .map_or(GaleLevel::F, GaleLevel::from_offset)
}
