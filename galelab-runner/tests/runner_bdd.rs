//! BDD tests for the runner: run files on disk through to per-pair reports.
//!
//! These tests verify:
//! - A run file with a relative data path resolves and runs
//! - Date selection narrows the history before scanning
//! - `--matches` style overrides replace the configured path
//! - Parallel and sequential execution produce identical reports

use chrono::NaiveDate;
use galelab_core::{CellConfig, CombinationMode, GaleLevel, Grid, MarketCode, MatchRecord};
use galelab_runner::{
    generate_synthetic_matches, run_backtest_from_data, run_from_config, write_matches_csv,
    BacktestConfig, DateFilter, Grade, RoiConfig, RunError, RunOptions,
};

const RUN_FILE: &str = r#"
[data]
path = "matches.csv"

[[cells]]
row = 1
col = 1
role = "pattern"
markets = ["AM"]

[[cells]]
row = 2
col = 1
role = "entry"
markets = ["O25"]
"#;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
}

/// Seven matches, one AM hit at the start, first O25 two records later.
fn seven_matches() -> Vec<MatchRecord> {
    vec![
        MatchRecord::new(day(1), 15, 0, 1, 1),
        MatchRecord::new(day(1), 17, 0, 0, 0),
        MatchRecord::new(day(2), 15, 0, 1, 0),
        MatchRecord::new(day(2), 17, 0, 2, 1),
        MatchRecord::new(day(3), 15, 0, 0, 1),
        MatchRecord::new(day(3), 17, 0, 0, 0),
        MatchRecord::new(day(4), 15, 0, 0, 0),
    ]
}

fn write_workspace(matches: &[MatchRecord]) -> (tempfile::TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let csv = std::fs::File::create(dir.path().join("matches.csv")).unwrap();
    write_matches_csv(csv, matches).unwrap();
    let run_file = dir.path().join("run.toml");
    std::fs::write(&run_file, RUN_FILE).unwrap();
    (dir, run_file)
}

#[test]
fn bdd_scenario_run_file_resolves_relative_data_path() {
    // GIVEN a run file next to a shuffled match CSV
    let mut matches = seven_matches();
    matches.reverse();
    let (_dir, run_file) = write_workspace(&matches);

    // WHEN the run file is loaded and executed
    let config = BacktestConfig::from_file(&run_file).unwrap();
    let report = run_from_config(&config, None, RunOptions::default()).unwrap();

    // THEN one pair ran and the single occurrence resolved at G2
    assert_eq!(report.match_count, 7);
    assert_eq!(report.pairs.len(), 1);
    let result = &report.pairs[0].result;
    assert_eq!(result.total_occurrences, 1);
    assert_eq!(result.count(GaleLevel::G2), 1);
    assert_eq!(result.percentage(GaleLevel::G2), 100.0);
    assert_eq!(result.assertiveness.total.percentage, 100.0);

    // AND the ROI simulation charged five stakes and paid three
    let metrics = &report.pairs[0].metrics;
    assert_eq!(metrics.roi.invested, 500.0);
    assert_eq!(metrics.roi.returned, 600.0);
    assert!((metrics.roi.roi - 20.0).abs() < 1e-9);
    assert_eq!(metrics.total_grade, Grade::Strong);
    assert_eq!(metrics.sg_grade, Grade::Weak);

    // AND the report spans the whole history
    assert_eq!(report.first_date.as_deref(), Some("2024-03-01"));
    assert_eq!(report.last_date.as_deref(), Some("2024-03-04"));
    assert_eq!(report.trace.window_starts, 2);
}

#[test]
fn bdd_scenario_date_selection_narrows_history() {
    // GIVEN the same history
    let grid = BacktestConfig::from_toml(RUN_FILE).unwrap().to_grid().unwrap();

    // WHEN the run is restricted to the first two days
    let filter = DateFilter::Range {
        start: None,
        end: Some(day(2)),
    };
    let report = run_backtest_from_data(
        &grid,
        &seven_matches(),
        filter,
        RoiConfig::default(),
        RunOptions::default(),
    )
    .unwrap();

    // THEN too few matches remain to open a full window
    assert_eq!(report.match_count, 4);
    assert_eq!(report.pairs[0].result.total_occurrences, 0);
    assert_eq!(report.pairs[0].result.assertiveness.total.percentage, 0.0);
    assert_eq!(report.pairs[0].metrics.roi.roi, 0.0);
}

#[test]
fn bdd_scenario_data_override_replaces_configured_path() {
    // GIVEN a run file whose configured path does not exist
    let (dir, _) = write_workspace(&seven_matches());
    let mut config = BacktestConfig::from_toml(RUN_FILE).unwrap();
    config.data.path = Some(dir.path().join("missing.csv"));

    // WHEN the caller supplies an explicit match file
    let report = run_from_config(
        &config,
        Some(dir.path().join("matches.csv")),
        RunOptions::default(),
    )
    .unwrap();

    // THEN the override is used
    assert_eq!(report.match_count, 7);

    // AND without the override the missing file is a data error
    let err = run_from_config(&config, None, RunOptions::default()).unwrap_err();
    assert!(matches!(err, RunError::Data(_)));
}

#[test]
fn bdd_scenario_parallel_matches_sequential() {
    // GIVEN a dense grid and a synthetic season
    let mut grid = Grid::new();
    for col in 1..=4u8 {
        grid.set_at(
            1,
            col,
            CellConfig::pattern([MarketCode::BothScore], CombinationMode::All).unwrap(),
        )
        .unwrap();
        grid.set_at(
            2,
            col,
            CellConfig::pattern(
                [MarketCode::Over25, MarketCode::BothNotScore],
                CombinationMode::Any,
            )
            .unwrap(),
        )
        .unwrap();
        for row in 4..=6u8 {
            grid.set_at(
                row,
                col,
                CellConfig::entry([MarketCode::Under35], CombinationMode::All).unwrap(),
            )
            .unwrap();
        }
    }
    let matches = generate_synthetic_matches(day(1), 60, 12, 2024);

    // WHEN the run executes sequentially and in parallel
    let seq = run_backtest_from_data(
        &grid,
        &matches,
        DateFilter::All,
        RoiConfig::default(),
        RunOptions { parallel: false },
    )
    .unwrap();
    let par = run_backtest_from_data(
        &grid,
        &matches,
        DateFilter::All,
        RoiConfig::default(),
        RunOptions { parallel: true },
    )
    .unwrap();

    // THEN the reports are identical, pair order included
    assert_eq!(seq.pairs.len(), 4 * 2 * 3);
    assert_eq!(seq, par);
}

#[test]
fn bdd_scenario_grid_without_entries_is_not_runnable() {
    // GIVEN a run file with only a pattern cell
    let toml = "[[cells]]\nrow = 1\ncol = 1\nrole = \"pattern\"\nmarkets = [\"AM\"]\n";
    let grid = BacktestConfig::from_toml(toml).unwrap().to_grid().unwrap();

    // WHEN it runs
    let err = run_backtest_from_data(
        &grid,
        &seven_matches(),
        DateFilter::All,
        RoiConfig::default(),
        RunOptions::default(),
    )
    .unwrap_err();

    // THEN it is rejected before scanning
    assert!(matches!(
        err,
        RunError::NotRunnable(galelab_core::NotRunnable::NoEntries)
    ));
}
