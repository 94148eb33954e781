//! Backtest runner — wires together config, data loading, engine, and metrics.
//!
//! Two entry points:
//! - `run_from_config()`: loads matches named by the run file, then runs. Used by CLI.
//! - `run_backtest_from_data()`: takes a grid and pre-loaded matches. No I/O.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use galelab_core::engine::{build_trace, evaluate_pair, prepare, sort_chronological};
use galelab_core::{
    BacktestResult, DatasetHash, Grid, GridHash, MatchRecord, NotRunnable, RunTrace,
};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{load_matches, DateFilter, LoadError};
use crate::metrics::{PairMetrics, RoiConfig};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("not runnable: {0}")]
    NotRunnable(#[from] NotRunnable),
    #[error("no match data path given (set [data].path or pass --matches)")]
    MissingDataPath,
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// How the runner executes pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Fan pairs out over the rayon pool. Output order is unchanged.
    pub parallel: bool,
}

/// A pair's engine result with its derived metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairReport {
    pub result: BacktestResult,
    pub metrics: PairMetrics,
}

/// Complete output of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub grid_hash: GridHash,
    pub dataset_hash: DatasetHash,
    pub date_filter: DateFilter,
    /// First and last match date after filtering.
    pub first_date: Option<String>,
    pub last_date: Option<String>,
    pub match_count: usize,
    pub roi: RoiConfig,
    pub pairs: Vec<PairReport>,
    pub trace: RunTrace,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl RunReport {
    pub fn results(&self) -> impl Iterator<Item = &BacktestResult> {
        self.pairs.iter().map(|p| &p.result)
    }
}

/// Run a backtest described by a run file.
///
/// `data_override` replaces `[data].path` when given.
pub fn run_from_config(
    config: &BacktestConfig,
    data_override: Option<PathBuf>,
    opts: RunOptions,
) -> Result<RunReport, RunError> {
    let path = data_override
        .or_else(|| config.data.path.clone())
        .ok_or(RunError::MissingDataPath)?;
    let grid = config.to_grid()?;
    let filter = config.date_filter()?;
    let matches = load_matches(&path)?;
    run_backtest_from_data(&grid, &matches, filter, config.roi, opts)
}

/// Run a backtest with pre-loaded matches. No I/O.
pub fn run_backtest_from_data(
    grid: &Grid,
    matches: &[MatchRecord],
    filter: DateFilter,
    roi: RoiConfig,
    opts: RunOptions,
) -> Result<RunReport, RunError> {
    let selected = filter.apply(matches);
    let pairs = prepare(grid, &selected)?;
    let sorted = sort_chronological(&selected);

    tracing::info!(
        matches = sorted.len(),
        pairs = pairs.len(),
        parallel = opts.parallel,
        "running backtest"
    );

    // Indexed parallel collect keeps resolution order
    let results: Vec<BacktestResult> = if opts.parallel {
        pairs.par_iter().map(|p| evaluate_pair(p, &sorted)).collect()
    } else {
        pairs.iter().map(|p| evaluate_pair(p, &sorted)).collect()
    };

    let trace = build_trace(grid, &sorted, &results);
    let reports = results
        .into_iter()
        .map(|result| PairReport {
            metrics: PairMetrics::compute(&result, &roi),
            result,
        })
        .collect();

    Ok(RunReport {
        schema_version: SCHEMA_VERSION,
        grid_hash: GridHash::of(grid),
        dataset_hash: DatasetHash::of(&sorted),
        date_filter: filter,
        first_date: sorted.first().map(|m| m.date.to_string()),
        last_date: sorted.last().map(|m| m.date.to_string()),
        match_count: sorted.len(),
        roi,
        pairs: reports,
        trace,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use galelab_core::{CellConfig, CombinationMode, MarketCode};

    fn grid() -> Grid {
        let mut g = Grid::new();
        g.set_at(
            1,
            1,
            CellConfig::pattern([MarketCode::BothScore], CombinationMode::All).unwrap(),
        )
        .unwrap();
        g.set_at(
            4,
            1,
            CellConfig::entry([MarketCode::Over25], CombinationMode::All).unwrap(),
        )
        .unwrap();
        g
    }

    #[test]
    fn filter_that_empties_data_is_no_data() {
        let data = vec![MatchRecord::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            12,
            0,
            1,
            1,
        )];
        let filter = DateFilter::Day(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let err = run_backtest_from_data(&grid(), &data, filter, RoiConfig::default(), RunOptions::default())
            .unwrap_err();
        assert!(matches!(err, RunError::NotRunnable(NotRunnable::NoData)));
    }

    #[test]
    fn missing_data_path_is_reported() {
        let config = BacktestConfig::from_grid(&grid());
        let err = run_from_config(&config, None, RunOptions::default()).unwrap_err();
        assert!(matches!(err, RunError::MissingDataPath));
    }
}
