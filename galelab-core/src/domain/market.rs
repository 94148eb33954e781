//! Market codes — the closed set of score predicates a cell can select.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A market condition over a match's full-time score.
///
/// The six named variants are the markets the grid editor offers. Any other
/// code read from configuration is kept verbatim as `Unrecognized` so that it
/// survives a round-trip; it never matches a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MarketCode {
    /// AM: both teams scored.
    BothScore,
    /// ANM: at least one side kept a clean sheet.
    BothNotScore,
    /// O25: more than 2.5 goals.
    Over25,
    /// O35: more than 3.5 goals.
    Over35,
    /// U25: fewer than 2.5 goals.
    Under25,
    /// U35: fewer than 3.5 goals.
    Under35,
    Unrecognized(String),
}

impl MarketCode {
    /// All recognized markets, in editor order.
    pub const KNOWN: [MarketCode; 6] = [
        MarketCode::BothScore,
        MarketCode::BothNotScore,
        MarketCode::Over25,
        MarketCode::Over35,
        MarketCode::Under25,
        MarketCode::Under35,
    ];

    /// Parse a short code (`AM`, `O25`, ...). Unknown codes become `Unrecognized`.
    pub fn parse(code: &str) -> Self {
        match code.trim().to_ascii_uppercase().as_str() {
            "AM" => MarketCode::BothScore,
            "ANM" => MarketCode::BothNotScore,
            "O25" => MarketCode::Over25,
            "O35" => MarketCode::Over35,
            "U25" => MarketCode::Under25,
            "U35" => MarketCode::Under35,
            _ => MarketCode::Unrecognized(code.to_string()),
        }
    }

    /// The short code as written in configuration.
    pub fn code(&self) -> &str {
        match self {
            MarketCode::BothScore => "AM",
            MarketCode::BothNotScore => "ANM",
            MarketCode::Over25 => "O25",
            MarketCode::Over35 => "O35",
            MarketCode::Under25 => "U25",
            MarketCode::Under35 => "U35",
            MarketCode::Unrecognized(raw) => raw,
        }
    }

    /// Human-readable market name.
    pub fn label(&self) -> &str {
        match self {
            MarketCode::BothScore => "Both teams score",
            MarketCode::BothNotScore => "Both teams do not score",
            MarketCode::Over25 => "Over 2.5",
            MarketCode::Over35 => "Over 3.5",
            MarketCode::Under25 => "Under 2.5",
            MarketCode::Under35 => "Under 3.5",
            MarketCode::Unrecognized(_) => "Unrecognized market",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, MarketCode::Unrecognized(_))
    }
}

impl From<String> for MarketCode {
    fn from(code: String) -> Self {
        MarketCode::parse(&code)
    }
}

impl From<MarketCode> for String {
    fn from(code: MarketCode) -> Self {
        code.code().to_string()
    }
}

impl fmt::Display for MarketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
