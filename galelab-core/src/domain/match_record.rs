//! MatchRecord — one historical fixture.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A finished match with its kick-off time and full-time score.
///
/// `hour` and `minute` only order matches played on the same date.
/// Team and league labels are carried for reporting and never consulted by
/// the matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub date: NaiveDate,
    pub hour: u8,
    pub minute: u8,
    pub home_score: u32,
    pub away_score: u32,
    pub total_goals: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away_team: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league: Option<String>,
}

impl MatchRecord {
    /// Build a record whose goal total is the sum of both scores.
    pub fn new(date: NaiveDate, hour: u8, minute: u8, home_score: u32, away_score: u32) -> Self {
        Self {
            date,
            hour,
            minute,
            home_score,
            away_score,
            total_goals: f64::from(home_score) + f64::from(away_score),
            home_team: None,
            away_team: None,
            league: None,
        }
    }

    /// Sort key: (date, hour, minute).
    pub fn timestamp(&self) -> (NaiveDate, u8, u8) {
        (self.date, self.hour, self.minute)
    }

    /// Short score label, e.g. `2-1`.
    pub fn score(&self) -> String {
        format!("{}-{}", self.home_score, self.away_score)
    }
}
