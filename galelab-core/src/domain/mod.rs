//! Domain types for GaleLab

pub mod cell;
pub mod grid;
pub mod market;
pub mod match_record;

pub use cell::{CellConfig, CellError, CombinationMode, Role};
pub use grid::{Grid, GridError, PlacedCell, Position, GRID_COLS, GRID_ROWS};
pub use market::MarketCode;
pub use match_record::MatchRecord;
