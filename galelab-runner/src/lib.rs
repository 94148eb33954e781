//! GaleLab Runner — run files, match loading, orchestration, and reporting.
//!
//! This crate builds on `galelab-core` to provide:
//! - TOML run files describing the grid, data source, and date selection
//! - Match loading from CSV/JSON plus deterministic synthetic fixtures
//! - Sequential or rayon-parallel execution over resolved pairs
//! - ROI simulation and assertiveness grades
//! - JSON/CSV/Markdown artifacts with schema versioning

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;

pub use config::{BacktestConfig, CellEntry, ConfigError, DataSection};
pub use data_loader::{
    available_dates, generate_synthetic_matches, load_matches, write_matches_csv, DateFilter,
    LoadError,
};
pub use export::{load_artifacts, save_artifacts};
pub use metrics::{simulate_roi, Grade, PairMetrics, RoiConfig, RoiSimulation};
pub use runner::{
    run_backtest_from_data, run_from_config, PairReport, RunError, RunOptions, RunReport,
    SCHEMA_VERSION,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn run_report_is_send_sync() {
        assert_send::<RunReport>();
        assert_sync::<RunReport>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<DateFilter>();
        assert_sync::<DateFilter>();
        assert_send::<RoiConfig>();
        assert_sync::<RoiConfig>();
    }

    #[test]
    fn pair_metrics_is_send_sync() {
        assert_send::<PairMetrics>();
        assert_sync::<PairMetrics>();
    }
}
