//! GaleLab Core — pattern/entry backtesting over match histories.
//!
//! This crate contains the heart of the backtesting engine:
//! - Domain types (match records, market codes, cell configs, the 8×20 grid)
//! - Market and condition predicates
//! - Pattern → entry relation resolution
//! - Chronological scanning with a five-record look-ahead
//! - Gale-level classification and per-pair aggregation
//! - Grid and dataset fingerprints

pub mod domain;
pub mod engine;
pub mod fingerprint;

pub use domain::{
    CellConfig, CellError, CombinationMode, Grid, GridError, MarketCode, MatchRecord, PlacedCell,
    Position, Role,
};
pub use engine::{
    run, run_traced, BacktestResult, GaleLevel, NotRunnable, Occurrence, PatternEntryPair,
    RunTrace,
};
pub use fingerprint::{DatasetHash, GridHash};
