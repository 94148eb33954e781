//! Match loading and date selection for the runner.
//!
//! Given a path, loads match records from CSV or JSON and narrows them to
//! the requested dates:
//! 1. `.csv`  → header row `date,hour,minute,home_score,away_score[,total_goals,...]`
//! 2. `.json` → array of objects with the same fields
//! 3. Anything else → `LoadError::UnsupportedFormat`
//!
//! A missing `total_goals` is derived from the two scores. Synthetic fixtures
//! are a developer-only mode for demos and benchmarks.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use galelab_core::MatchRecord;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported match file '{0}' (expected .csv or .json)")]
    UnsupportedFormat(PathBuf),

    #[error("record {index}: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// On-disk shape of a match row. `total_goals` and labels are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawMatch {
    date: NaiveDate,
    hour: u8,
    minute: u8,
    home_score: u32,
    away_score: u32,
    #[serde(default)]
    total_goals: Option<f64>,
    #[serde(default)]
    home_team: Option<String>,
    #[serde(default)]
    away_team: Option<String>,
    #[serde(default)]
    league: Option<String>,
}

impl RawMatch {
    fn into_record(self, index: usize) -> Result<MatchRecord, LoadError> {
        if self.hour > 23 || self.minute > 59 {
            return Err(LoadError::InvalidRecord {
                index,
                reason: format!("invalid kick-off time {:02}:{:02}", self.hour, self.minute),
            });
        }
        let mut record = MatchRecord::new(
            self.date,
            self.hour,
            self.minute,
            self.home_score,
            self.away_score,
        );
        if let Some(total) = self.total_goals {
            if !total.is_finite() || total < 0.0 {
                return Err(LoadError::InvalidRecord {
                    index,
                    reason: format!("invalid total_goals {total}"),
                });
            }
            record.total_goals = total;
        }
        record.home_team = self.home_team.filter(|s| !s.is_empty());
        record.away_team = self.away_team.filter(|s| !s.is_empty());
        record.league = self.league.filter(|s| !s.is_empty());
        Ok(record)
    }
}

impl From<&MatchRecord> for RawMatch {
    fn from(m: &MatchRecord) -> Self {
        Self {
            date: m.date,
            hour: m.hour,
            minute: m.minute,
            home_score: m.home_score,
            away_score: m.away_score,
            total_goals: Some(m.total_goals),
            home_team: m.home_team.clone(),
            away_team: m.away_team.clone(),
            league: m.league.clone(),
        }
    }
}

/// Load match records from a `.csv` or `.json` file.
pub fn load_matches(path: &Path) -> Result<Vec<MatchRecord>, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let matches = match ext.as_deref() {
        Some("csv") => parse_csv(file)?,
        Some("json") => parse_json(file)?,
        _ => return Err(LoadError::UnsupportedFormat(path.to_path_buf())),
    };
    tracing::info!(path = %path.display(), matches = matches.len(), "loaded match data");
    Ok(matches)
}

/// Parse CSV match rows.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<MatchRecord>, LoadError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize::<RawMatch>()
        .enumerate()
        .map(|(i, row)| row?.into_record(i))
        .collect()
}

/// Parse a JSON array of match objects.
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<MatchRecord>, LoadError> {
    let raw: Vec<RawMatch> = serde_json::from_reader(reader)?;
    raw.into_iter()
        .enumerate()
        .map(|(i, row)| row.into_record(i))
        .collect()
}

/// Write match records as CSV (same columns `parse_csv` reads).
pub fn write_matches_csv<W: Write>(writer: W, matches: &[MatchRecord]) -> Result<(), LoadError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for m in matches {
        wtr.serialize(RawMatch::from(m))?;
    }
    wtr.flush().map_err(|source| LoadError::Io {
        path: PathBuf::from("<csv writer>"),
        source,
    })?;
    Ok(())
}

// ─── Date selection ─────────────────────────────────────────────────

/// Which dates of the history take part in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DateFilter {
    #[default]
    All,
    /// Inclusive bounds; either side may be open.
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// A single calendar day.
    Day(NaiveDate),
}

impl DateFilter {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            DateFilter::All => true,
            DateFilter::Range { start, end } => {
                start.map_or(true, |s| date >= s) && end.map_or(true, |e| date <= e)
            }
            DateFilter::Day(day) => date == day,
        }
    }

    /// Keep only matches on selected dates, preserving input order.
    pub fn apply(&self, matches: &[MatchRecord]) -> Vec<MatchRecord> {
        let kept: Vec<MatchRecord> = matches
            .iter()
            .filter(|m| self.contains(m.date))
            .cloned()
            .collect();
        if kept.is_empty() && !matches.is_empty() {
            tracing::warn!(filter = ?self, "date filter excluded every match");
        }
        kept
    }
}

/// Distinct match dates, ascending.
pub fn available_dates(matches: &[MatchRecord]) -> Vec<NaiveDate> {
    matches
        .iter()
        .map(|m| m.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ─── Synthetic fixtures ─────────────────────────────────────────────

/// Generate a deterministic synthetic match history.
///
/// `per_day` fixtures are spread over the afternoon/evening of each day.
/// Goals per side follow a rough 0–4 distribution. The same seed always
/// produces the same history.
pub fn generate_synthetic_matches(
    start: NaiveDate,
    days: u32,
    per_day: u8,
    seed: u64,
) -> Vec<MatchRecord> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const GOAL_WEIGHTS: [u32; 5] = [30, 35, 20, 10, 5];

    fn draw_goals(rng: &mut StdRng) -> u32 {
        let mut roll = rng.gen_range(0..100u32);
        for (goals, weight) in GOAL_WEIGHTS.iter().enumerate() {
            if roll < *weight {
                return goals as u32;
            }
            roll -= weight;
        }
        0
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut matches = Vec::with_capacity(days as usize * per_day as usize);
    for offset in 0..days {
        let date = start + chrono::Duration::days(i64::from(offset));
        for slot in 0..per_day {
            let hour = 12 + (slot % 11);
            let minute = ((slot / 11) % 4) * 15 + rng.gen_range(0..15u8);
            let home = draw_goals(&mut rng);
            let away = draw_goals(&mut rng);
            let mut record = MatchRecord::new(date, hour, minute, home, away);
            record.league = Some(format!("Synthetic {}", date.weekday()));
            matches.push(record);
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
date,hour,minute,home_score,away_score,total_goals,home_team,away_team
2024-01-02,15,30,2,1,3,Alpha,Beta
2024-01-01,20,00,0,0,,Gamma,Delta
";

    #[test]
    fn csv_parses_and_derives_missing_total() {
        let matches = parse_csv(SAMPLE_CSV.as_bytes()).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].total_goals, 3.0);
        assert_eq!(matches[0].home_team.as_deref(), Some("Alpha"));
        assert_eq!(matches[1].total_goals, 0.0);
        assert_eq!(matches[1].minute, 0);
    }

    #[test]
    fn csv_accepts_scores_at_u32_max() {
        let csv = "date,hour,minute,home_score,away_score\n2024-01-01,12,0,4294967295,1\n";
        let matches = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(matches[0].home_score, u32::MAX);
        assert_eq!(matches[0].total_goals, 4294967296.0);
    }

    #[test]
    fn csv_rejects_bad_time() {
        let csv = "date,hour,minute,home_score,away_score\n2024-01-01,25,0,1,1\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidRecord { index: 0, .. }));
    }

    #[test]
    fn json_parses_array() {
        let json = r#"[{"date":"2024-02-01","hour":9,"minute":5,"home_score":1,"away_score":3}]"#;
        let matches = parse_json(json.as_bytes()).unwrap();
        assert_eq!(matches[0].total_goals, 4.0);
        assert!(matches[0].league.is_none());
    }

    #[test]
    fn csv_write_then_read_preserves_records() {
        let original = generate_synthetic_matches(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 3, 4, 7);
        let mut buf = Vec::new();
        write_matches_csv(&mut buf, &original).unwrap();
        let back = parse_csv(buf.as_slice()).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matches.parquet");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            load_matches(&path),
            Err(LoadError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_matches(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn range_and_day_filters() {
        let matches = parse_csv(SAMPLE_CSV.as_bytes()).unwrap();
        let jan1 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let jan2 = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        assert_eq!(DateFilter::All.apply(&matches).len(), 2);
        assert_eq!(DateFilter::Day(jan1).apply(&matches)[0].date, jan1);
        let from_jan2 = DateFilter::Range {
            start: Some(jan2),
            end: None,
        };
        assert_eq!(from_jan2.apply(&matches).len(), 1);
        let until_jan1 = DateFilter::Range {
            start: None,
            end: Some(jan1),
        };
        assert_eq!(until_jan1.apply(&matches)[0].date, jan1);
    }

    #[test]
    fn available_dates_are_sorted_and_distinct() {
        let mut matches = parse_csv(SAMPLE_CSV.as_bytes()).unwrap();
        matches.push(matches[0].clone());
        let dates = available_dates(&matches);
        assert_eq!(dates.len(), 2);
        assert!(dates[0] < dates[1]);
    }

    #[test]
    fn synthetic_is_deterministic_per_seed() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let a = generate_synthetic_matches(start, 10, 6, 42);
        let b = generate_synthetic_matches(start, 10, 6, 42);
        let c = generate_synthetic_matches(start, 10, 6, 43);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 60);
        assert!(a.iter().all(|m| m.hour <= 23 && m.minute <= 59));
    }
}
