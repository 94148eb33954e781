//! Condition matching — a cell's markets folded into one predicate.

use crate::domain::{CellConfig, CombinationMode, MarketCode, MatchRecord};

use super::market::evaluate;

/// Whether `record` satisfies `config`'s markets under its combination mode.
pub fn matches(record: &MatchRecord, config: &CellConfig) -> bool {
    matches_markets(record, config.markets(), config.combination())
}

/// Fold `markets` with AND (`All`) or OR (`Any`). An empty list never matches.
pub fn matches_markets(record: &MatchRecord, markets: &[MarketCode], mode: CombinationMode) -> bool {
    if markets.is_empty() {
        return false;
    }
    match mode {
        CombinationMode::All => markets.iter().all(|m| evaluate(record, m)),
        CombinationMode::Any => markets.iter().any(|m| evaluate(record, m)),
    }
}
