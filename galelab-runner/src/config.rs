//! Serializable run configuration (TOML).
//!
//! A run file names the match data, an optional date selection, the ROI
//! simulation parameters, and the configured grid cells:
//!
//! ```toml
//! [data]
//! path = "matches.csv"
//! start_date = "2024-01-01"
//!
//! [[cells]]
//! row = 2
//! col = 5
//! role = "pattern"
//! markets = ["AM"]
//! combination = "ALL"
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use galelab_core::{
    CellConfig, CellError, CombinationMode, Grid, GridError, MarketCode, Position, Role,
};

use crate::data_loader::DateFilter;
use crate::metrics::RoiConfig;

/// Errors from reading or validating a run file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("cell ({row}, {col}): {source}")]
    Cell {
        row: u8,
        col: u8,
        #[source]
        source: CellError,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("cell ({row}, {col}) is configured more than once")]
    DuplicateCell { row: u8, col: u8 },
    #[error("start_date {start} is after end_date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("`date` cannot be combined with `start_date`/`end_date`")]
    ConflictingDateFilter,
}

/// `[data]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSection {
    /// Match file (`.csv` or `.json`). Relative paths resolve against the run file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Single-day selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// One `[[cells]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellEntry {
    pub row: u8,
    pub col: u8,
    pub role: Role,
    pub markets: Vec<MarketCode>,
    #[serde(default)]
    pub combination: CombinationMode,
}

/// A complete run file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub roi: RoiConfig,
    #[serde(default)]
    pub cells: Vec<CellEntry>,
}

impl BacktestConfig {
    /// Load a run file. A relative `data.path` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml(&content)?;
        if let (Some(data_path), Some(dir)) = (config.data.path.as_ref(), path.parent()) {
            if data_path.is_relative() {
                config.data.path = Some(dir.join(data_path));
            }
        }
        Ok(config)
    }

    /// Parse and validate a run file from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Build a run file around an existing grid.
    pub fn from_grid(grid: &Grid) -> Self {
        let cells = grid
            .cells()
            .map(|(pos, cfg)| CellEntry {
                row: pos.row,
                col: pos.col,
                role: cfg.role(),
                markets: cfg.markets().to_vec(),
                combination: cfg.combination(),
            })
            .collect();
        Self {
            cells,
            ..Self::default()
        }
    }

    /// Check cells and dates without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.to_grid()?;
        self.date_filter()?;
        Ok(())
    }

    /// The grid snapshot described by `[[cells]]`.
    pub fn to_grid(&self) -> Result<Grid, ConfigError> {
        let mut grid = Grid::new();
        let mut seen = HashSet::new();
        for cell in &self.cells {
            let position = Position::new(cell.row, cell.col)?;
            if !seen.insert(position) {
                return Err(ConfigError::DuplicateCell {
                    row: cell.row,
                    col: cell.col,
                });
            }
            let config = CellConfig::new(cell.role, cell.markets.iter().cloned(), cell.combination)
                .map_err(|source| ConfigError::Cell {
                    row: cell.row,
                    col: cell.col,
                    source,
                })?;
            for market in config.unrecognized_markets() {
                tracing::warn!(
                    cell = %position,
                    market = %market,
                    "unrecognized market code; it will never match"
                );
            }
            grid.set(position, config);
        }
        Ok(grid)
    }

    /// The date selection described by `[data]`.
    pub fn date_filter(&self) -> Result<DateFilter, ConfigError> {
        let DataSection {
            start_date,
            end_date,
            date,
            ..
        } = self.data;
        match (date, start_date, end_date) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => Err(ConfigError::ConflictingDateFilter),
            (Some(day), None, None) => Ok(DateFilter::Day(day)),
            (None, Some(start), Some(end)) if start > end => {
                Err(ConfigError::InvalidDateRange { start, end })
            }
            (None, None, None) => Ok(DateFilter::All),
            (None, start, end) => Ok(DateFilter::Range { start, end }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[data]
path = "matches.csv"
start_date = "2024-01-01"
end_date = "2024-01-31"

[roi]
stake = 50.0

[[cells]]
row = 2
col = 5
role = "pattern"
markets = ["AM", "O25"]
combination = "AND"

[[cells]]
row = 5
col = 5
role = "entry"
markets = ["U35"]
"#;

    #[test]
    fn parses_sample_run_file() {
        let config = BacktestConfig::from_toml(SAMPLE).unwrap();
        assert_eq!(config.roi.stake, 50.0);
        assert_eq!(config.roi.odd, 2.0);

        let grid = config.to_grid().unwrap();
        assert_eq!(grid.patterns().len(), 1);
        assert_eq!(grid.entries().len(), 1);
        let pattern = grid.get(Position::new(2, 5).unwrap()).unwrap();
        assert_eq!(pattern.label(), "AM + O25");
        assert_eq!(
            grid.get(Position::new(5, 5).unwrap()).unwrap().combination(),
            CombinationMode::All
        );
    }

    #[test]
    fn empty_markets_rejected_with_address() {
        let toml = "[[cells]]\nrow = 1\ncol = 1\nrole = \"entry\"\nmarkets = []\n";
        let err = BacktestConfig::from_toml(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Cell { row: 1, col: 1, .. }));
    }

    #[test]
    fn out_of_bounds_and_duplicates_rejected() {
        let oob = "[[cells]]\nrow = 9\ncol = 1\nrole = \"entry\"\nmarkets = [\"AM\"]\n";
        assert!(matches!(
            BacktestConfig::from_toml(oob).unwrap_err(),
            ConfigError::Grid(GridError::OutOfBounds { row: 9, col: 1 })
        ));

        let dup = "[[cells]]\nrow = 1\ncol = 1\nrole = \"entry\"\nmarkets = [\"AM\"]\n\
                   [[cells]]\nrow = 1\ncol = 1\nrole = \"pattern\"\nmarkets = [\"O25\"]\n";
        assert!(matches!(
            BacktestConfig::from_toml(dup).unwrap_err(),
            ConfigError::DuplicateCell { row: 1, col: 1 }
        ));
    }

    #[test]
    fn unknown_market_is_kept_not_rejected() {
        let toml = "[[cells]]\nrow = 1\ncol = 1\nrole = \"pattern\"\nmarkets = [\"HT_O05\"]\n";
        let grid = BacktestConfig::from_toml(toml).unwrap().to_grid().unwrap();
        let cfg = grid.get(Position::new(1, 1).unwrap()).unwrap();
        assert_eq!(cfg.unrecognized_markets().count(), 1);
    }

    #[test]
    fn date_filters() {
        let config = BacktestConfig::from_toml(SAMPLE).unwrap();
        assert!(matches!(
            config.date_filter().unwrap(),
            DateFilter::Range {
                start: Some(_),
                end: Some(_)
            }
        ));

        let reversed = "[data]\nstart_date = \"2024-02-01\"\nend_date = \"2024-01-01\"\n";
        assert!(matches!(
            BacktestConfig::from_toml(reversed).unwrap_err(),
            ConfigError::InvalidDateRange { .. }
        ));

        let conflict = "[data]\ndate = \"2024-02-01\"\nend_date = \"2024-03-01\"\n";
        assert!(matches!(
            BacktestConfig::from_toml(conflict).unwrap_err(),
            ConfigError::ConflictingDateFilter
        ));

        let day = "[data]\ndate = \"2024-02-01\"\n";
        assert!(matches!(
            BacktestConfig::from_toml(day).unwrap().date_filter().unwrap(),
            DateFilter::Day(_)
        ));
    }

    #[test]
    fn grid_round_trips_through_toml() {
        let config = BacktestConfig::from_toml(SAMPLE).unwrap();
        let grid = config.to_grid().unwrap();
        let rebuilt = BacktestConfig::from_grid(&grid);
        let text = rebuilt.to_toml().unwrap();
        let reparsed = BacktestConfig::from_toml(&text).unwrap();
        assert_eq!(reparsed.to_grid().unwrap(), grid);
    }
}
