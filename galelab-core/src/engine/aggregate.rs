//! Result aggregation — per-level counts and assertiveness percentages.

use serde::{Deserialize, Serialize};

use crate::domain::{CellConfig, Position};

use super::gale::GaleLevel;
use super::relation::PatternEntryPair;
use super::scanner::Occurrence;

/// A count and its share of all occurrences, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LevelStat {
    pub count: usize,
    pub percentage: f64,
}

impl LevelStat {
    fn of(count: usize, total: usize) -> Self {
        let percentage = if total > 0 {
            count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self { count, percentage }
    }
}

/// Breakdown of a pair's occurrences by gale level.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Assertiveness {
    pub sg: LevelStat,
    pub g1: LevelStat,
    pub g2: LevelStat,
    pub g3: LevelStat,
    pub g4: LevelStat,
    pub failures: LevelStat,
    /// Every occurrence resolved at SG through G4.
    pub total: LevelStat,
}

impl Assertiveness {
    pub fn level(&self, level: GaleLevel) -> LevelStat {
        match level {
            GaleLevel::SG => self.sg,
            GaleLevel::G1 => self.g1,
            GaleLevel::G2 => self.g2,
            GaleLevel::G3 => self.g3,
            GaleLevel::G4 => self.g4,
            GaleLevel::F => self.failures,
        }
    }
}

/// Outcome of backtesting one pattern → entry pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub pattern_position: Position,
    pub pattern_config: CellConfig,
    pub entry_position: Position,
    pub entry_config: CellConfig,
    pub total_occurrences: usize,
    pub assertiveness: Assertiveness,
    pub occurrences: Vec<Occurrence>,
}

impl BacktestResult {
    pub fn count(&self, level: GaleLevel) -> usize {
        self.assertiveness.level(level).count
    }

    pub fn percentage(&self, level: GaleLevel) -> f64 {
        self.assertiveness.level(level).percentage
    }

    pub fn label(&self) -> String {
        format!("{} -> {}", self.pattern_position, self.entry_position)
    }
}

/// Fold a pair's occurrences into a `BacktestResult`.
///
/// A pair with no occurrences is still reported, with every figure zero.
pub fn aggregate(pair: &PatternEntryPair, occurrences: Vec<Occurrence>) -> BacktestResult {
    let total = occurrences.len();
    let mut counts = [0usize; 6];
    for occurrence in &occurrences {
        counts[occurrence.level as usize] += 1;
    }
    let stat = |level: GaleLevel| LevelStat::of(counts[level as usize], total);
    let success: usize = counts[..GaleLevel::F as usize].iter().sum();

    BacktestResult {
        pattern_position: pair.pattern.position,
        pattern_config: pair.pattern.config.clone(),
        entry_position: pair.entry.position,
        entry_config: pair.entry.config.clone(),
        total_occurrences: total,
        assertiveness: Assertiveness {
            sg: stat(GaleLevel::SG),
            g1: stat(GaleLevel::G1),
            g2: stat(GaleLevel::G2),
            g3: stat(GaleLevel::G3),
            g4: stat(GaleLevel::G4),
            failures: stat(GaleLevel::F),
            total: LevelStat::of(success, total),
        },
        occurrences,
    }
}
