//! Cell configuration — role, selected markets, and how they combine.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::market::MarketCode;

/// Errors from building a cell configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CellError {
    #[error("a configured cell needs at least one market")]
    EmptyMarkets,
}

/// What a configured cell stands for in a backtest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Trigger condition to scan for.
    Pattern,
    /// Outcome tested in the look-ahead window after a trigger.
    Entry,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Pattern => f.write_str("pattern"),
            Role::Entry => f.write_str("entry"),
        }
    }
}

/// How a cell's markets combine into one predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombinationMode {
    /// Every selected market must hold.
    #[default]
    #[serde(rename = "ALL", alias = "AND", alias = "all", alias = "and")]
    All,
    /// At least one selected market must hold.
    #[serde(rename = "ANY", alias = "OR", alias = "any", alias = "or")]
    Any,
}

impl CombinationMode {
    /// Separator used when rendering a cell label.
    pub fn separator(self) -> &'static str {
        match self {
            CombinationMode::All => " + ",
            CombinationMode::Any => " | ",
        }
    }
}

/// One grid cell's configuration.
///
/// The market list is never empty and holds no duplicates; it keeps the
/// order in which markets were first selected so labels read the same way
/// the user built them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawCellConfig")]
pub struct CellConfig {
    role: Role,
    markets: Vec<MarketCode>,
    combination: CombinationMode,
}

#[derive(Deserialize)]
struct RawCellConfig {
    role: Role,
    markets: Vec<MarketCode>,
    #[serde(default)]
    combination: CombinationMode,
}

impl TryFrom<RawCellConfig> for CellConfig {
    type Error = CellError;

    fn try_from(raw: RawCellConfig) -> Result<Self, Self::Error> {
        CellConfig::new(raw.role, raw.markets, raw.combination)
    }
}

impl CellConfig {
    /// Validate and build a cell configuration.
    pub fn new(
        role: Role,
        markets: impl IntoIterator<Item = MarketCode>,
        combination: CombinationMode,
    ) -> Result<Self, CellError> {
        let mut unique: Vec<MarketCode> = Vec::new();
        for market in markets {
            if !unique.contains(&market) {
                unique.push(market);
            }
        }
        if unique.is_empty() {
            return Err(CellError::EmptyMarkets);
        }
        Ok(Self {
            role,
            markets: unique,
            combination,
        })
    }

    /// Shorthand for a pattern cell.
    pub fn pattern(
        markets: impl IntoIterator<Item = MarketCode>,
        combination: CombinationMode,
    ) -> Result<Self, CellError> {
        Self::new(Role::Pattern, markets, combination)
    }

    /// Shorthand for an entry cell.
    pub fn entry(
        markets: impl IntoIterator<Item = MarketCode>,
        combination: CombinationMode,
    ) -> Result<Self, CellError> {
        Self::new(Role::Entry, markets, combination)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn markets(&self) -> &[MarketCode] {
        &self.markets
    }

    pub fn combination(&self) -> CombinationMode {
        self.combination
    }

    /// Markets that are not part of the recognized set.
    pub fn unrecognized_markets(&self) -> impl Iterator<Item = &MarketCode> {
        self.markets.iter().filter(|m| !m.is_recognized())
    }

    /// Label such as `AM + O25` (ALL) or `U25 | ANM` (ANY).
    pub fn label(&self) -> String {
        let codes: Vec<&str> = self.markets.iter().map(|m| m.code()).collect();
        codes.join(self.combination.separator())
    }
}

impl fmt::Display for CellConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.role, self.label())
    }
}
