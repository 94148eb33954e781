//! Grid — the 8×20 snapshot of configured cells handed to the engine.
//!
//! The editor mutates a `Grid` while the user works; the engine only ever
//! sees a shared reference, so a run cannot observe a half-applied edit.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use super::cell::{CellConfig, CellError, CombinationMode, Role};
use super::market::MarketCode;

pub const GRID_ROWS: u8 = 8;
pub const GRID_COLS: u8 = 20;

/// Errors from grid addressing and bulk edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("cell ({row}, {col}) is outside the 8x20 grid")]
    OutOfBounds { row: u8, col: u8 },
    #[error("no cells selected")]
    NoSelection,
    #[error("select at least one market")]
    NoMarkets,
    #[error(transparent)]
    Cell(#[from] CellError),
}

/// A 1-indexed cell address. Ordering is row-major.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub fn new(row: u8, col: u8) -> Result<Self, GridError> {
        if row == 0 || row > GRID_ROWS || col == 0 || col > GRID_COLS {
            return Err(GridError::OutOfBounds { row, col });
        }
        Ok(Self { row, col })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

/// A configured cell together with its address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedCell {
    pub position: Position,
    pub config: CellConfig,
}

/// Sparse 8×20 grid of cell configurations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    cells: BTreeMap<Position, CellConfig>,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place (or replace) a configuration at `position`.
    pub fn set(&mut self, position: Position, config: CellConfig) {
        self.cells.insert(position, config);
    }

    /// Place a configuration by raw row/column, validating the address.
    pub fn set_at(&mut self, row: u8, col: u8, config: CellConfig) -> Result<(), GridError> {
        self.set(Position::new(row, col)?, config);
        Ok(())
    }

    /// Unconfigure a cell, returning what was there.
    pub fn clear(&mut self, position: Position) -> Option<CellConfig> {
        self.cells.remove(&position)
    }

    pub fn clear_all(&mut self) {
        self.cells.clear();
    }

    /// Apply one role/market selection to every selected cell, as the editor's
    /// "mark as pattern" / "mark as entry" buttons do.
    pub fn mark(
        &mut self,
        selection: &[Position],
        role: Role,
        markets: &[MarketCode],
        combination: CombinationMode,
    ) -> Result<(), GridError> {
        if selection.is_empty() {
            return Err(GridError::NoSelection);
        }
        if markets.is_empty() {
            return Err(GridError::NoMarkets);
        }
        let config = CellConfig::new(role, markets.iter().cloned(), combination)?;
        for &position in selection {
            self.set(position, config.clone());
        }
        Ok(())
    }

    pub fn get(&self, position: Position) -> Option<&CellConfig> {
        self.cells.get(&position)
    }

    /// Configured cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &CellConfig)> {
        self.cells.iter().map(|(p, c)| (*p, c))
    }

    /// Configured cells with the given role, row-major.
    pub fn with_role(&self, role: Role) -> Vec<PlacedCell> {
        self.cells()
            .filter(|(_, c)| c.role() == role)
            .map(|(position, config)| PlacedCell {
                position,
                config: config.clone(),
            })
            .collect()
    }

    pub fn patterns(&self) -> Vec<PlacedCell> {
        self.with_role(Role::Pattern)
    }

    pub fn entries(&self) -> Vec<PlacedCell> {
        self.with_role(Role::Entry)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Flatten into a list of placed cells (row-major).
    pub fn to_placed(&self) -> Vec<PlacedCell> {
        self.cells()
            .map(|(position, config)| PlacedCell {
                position,
                config: config.clone(),
            })
            .collect()
    }
}

impl FromIterator<PlacedCell> for Grid {
    fn from_iter<I: IntoIterator<Item = PlacedCell>>(iter: I) -> Self {
        let mut grid = Grid::new();
        for cell in iter {
            grid.set(cell.position, cell.config);
        }
        grid
    }
}
