//! Derived metrics over engine results: simulated ROI and assertiveness grade.
//!
//! None of this feeds back into the engine. Consumers may recompute these
//! figures with any stake/odd they like.

use serde::{Deserialize, Serialize};

use galelab_core::{BacktestResult, GaleLevel};

/// Stake and average odd for the ROI simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoiConfig {
    #[serde(default = "default_stake")]
    pub stake: f64,
    #[serde(default = "default_odd")]
    pub odd: f64,
}

fn default_stake() -> f64 {
    100.0
}

fn default_odd() -> f64 {
    2.0
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            stake: default_stake(),
            odd: default_odd(),
        }
    }
}

/// Outcome of the ROI simulation for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoiSimulation {
    pub invested: f64,
    pub returned: f64,
    /// Percent; zero when nothing was invested.
    pub roi: f64,
}

/// Simulate flat staking over every gale stage.
///
/// Each occurrence is charged the full five-stake ladder. A hit at stage `n`
/// (SG = 1 .. G4 = 5) returns `n * stake * odd`.
pub fn simulate_roi(result: &BacktestResult, config: &RoiConfig) -> RoiSimulation {
    let ladder = galelab_core::engine::LOOKAHEAD as f64;
    let invested = result.total_occurrences as f64 * config.stake * ladder;
    let returned: f64 = GaleLevel::ALL
        .iter()
        .filter(|l| l.is_success())
        .map(|l| result.count(*l) as f64 * config.stake * l.attempts() as f64 * config.odd)
        .sum();
    let roi = if invested > 0.0 {
        (returned - invested) / invested * 100.0
    } else {
        0.0
    };
    RoiSimulation {
        invested,
        returned,
        roi,
    }
}

/// Coarse rating of a success percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    /// 70% and above.
    Strong,
    /// 50% up to 70%.
    Moderate,
    Weak,
}

impl Grade {
    pub fn from_percentage(pct: f64) -> Self {
        if pct >= 70.0 {
            Grade::Strong
        } else if pct >= 50.0 {
            Grade::Moderate
        } else {
            Grade::Weak
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Strong => "strong",
            Grade::Moderate => "moderate",
            Grade::Weak => "weak",
        }
    }
}

/// Presentation-side figures for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairMetrics {
    pub roi: RoiSimulation,
    pub sg_grade: Grade,
    pub total_grade: Grade,
}

impl PairMetrics {
    pub fn compute(result: &BacktestResult, roi: &RoiConfig) -> Self {
        Self {
            roi: simulate_roi(result, roi),
            sg_grade: Grade::from_percentage(result.percentage(GaleLevel::SG)),
            total_grade: Grade::from_percentage(result.assertiveness.total.percentage),
        }
    }
}
