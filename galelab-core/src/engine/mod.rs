//! Backtest engine — grid snapshot + match history in, per-pair results out.
//!
//! Stages, leaves first:
//! 1. `market`    one market predicate against one record
//! 2. `condition` a cell's markets combined with ALL / ANY
//! 3. `relation`  pattern/entry pairs from grid positions
//! 4. `scanner`   chronological scan for pattern hits and windows
//! 5. `gale`      retry-stage classification of a window
//! 6. `aggregate` per-level counts and percentages
//!
//! `run` is pure: the same inputs always produce the same output, in the
//! same order.

pub mod aggregate;
pub mod condition;
pub mod gale;
pub mod market;
pub mod relation;
pub mod scanner;

pub use aggregate::{aggregate, Assertiveness, BacktestResult, LevelStat};
pub use condition::{matches, matches_markets};
pub use gale::{classify, GaleLevel, LOOKAHEAD};
pub use market::{evaluate, evaluate_str};
pub use relation::{is_related, resolve_pairs, PatternEntryPair};
pub use scanner::{scan, scan_sorted, sort_chronological, window_starts, Occurrence};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{Grid, MatchRecord, Role};

/// Why a backtest could not be started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotRunnable {
    #[error("no match data supplied")]
    NoData,
    #[error("grid has no pattern cells")]
    NoPatterns,
    #[error("grid has no entry cells")]
    NoEntries,
}

/// Occurrence count for one evaluated pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairTrace {
    pub pair: String,
    pub occurrences: usize,
}

/// Structured diagnostics for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTrace {
    pub matches_supplied: usize,
    /// Indices that could open a full look-ahead window.
    pub window_starts: usize,
    pub patterns: usize,
    pub entries: usize,
    pub pairs_resolved: usize,
    pub per_pair: Vec<PairTrace>,
}

/// Check the inputs and resolve pairs.
///
/// `Ok` with an empty list means patterns and entries exist but none relate.
pub fn prepare(grid: &Grid, matches: &[MatchRecord]) -> Result<Vec<PatternEntryPair>, NotRunnable> {
    if matches.is_empty() {
        return Err(NotRunnable::NoData);
    }
    if grid.cells().all(|(_, c)| c.role() != Role::Pattern) {
        return Err(NotRunnable::NoPatterns);
    }
    if grid.cells().all(|(_, c)| c.role() != Role::Entry) {
        return Err(NotRunnable::NoEntries);
    }
    Ok(resolve_pairs(grid))
}

/// Scan and aggregate one pair over a sorted sequence.
pub fn evaluate_pair(pair: &PatternEntryPair, sorted: &[MatchRecord]) -> BacktestResult {
    let occurrences = scan_sorted(pair, sorted);
    tracing::debug!(
        pair = %pair.label(),
        occurrences = occurrences.len(),
        "pair scanned"
    );
    aggregate(pair, occurrences)
}

/// Run a backtest: one result per related pair, in resolution order.
pub fn run(grid: &Grid, matches: &[MatchRecord]) -> Result<Vec<BacktestResult>, NotRunnable> {
    run_traced(grid, matches).map(|(results, _)| results)
}

/// `run`, also returning the run's diagnostics.
pub fn run_traced(
    grid: &Grid,
    matches: &[MatchRecord],
) -> Result<(Vec<BacktestResult>, RunTrace), NotRunnable> {
    let pairs = prepare(grid, matches)?;
    let sorted = sort_chronological(matches);

    let results: Vec<BacktestResult> = pairs.iter().map(|p| evaluate_pair(p, &sorted)).collect();
    let trace = build_trace(grid, &sorted, &results);

    tracing::info!(
        matches = trace.matches_supplied,
        pairs = trace.pairs_resolved,
        "backtest complete"
    );
    Ok((results, trace))
}

/// Diagnostics for a finished set of results.
pub fn build_trace(grid: &Grid, matches: &[MatchRecord], results: &[BacktestResult]) -> RunTrace {
    RunTrace {
        matches_supplied: matches.len(),
        window_starts: window_starts(matches.len()),
        patterns: grid.patterns().len(),
        entries: grid.entries().len(),
        pairs_resolved: results.len(),
        per_pair: results
            .iter()
            .map(|r| PairTrace {
                pair: r.label(),
                occurrences: r.total_occurrences,
            })
            .collect(),
    }
}
