//! Sequence scanning — find pattern hits and their look-ahead windows.
//!
//! Matches are put in chronological order first. A hit at index `i` is only
//! considered when `i + LOOKAHEAD` is still inside the sequence, so every
//! window is complete; trailing records that cannot open a full window are
//! skipped. Windows of different hits may overlap.

use serde::{Deserialize, Serialize};

use crate::domain::MatchRecord;

use super::condition::matches;
use super::gale::{classify, GaleLevel, LOOKAHEAD};
use super::relation::PatternEntryPair;

/// One pattern hit with its window and outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Index of the hit in the chronologically sorted sequence.
    pub index: usize,
    pub pattern_match: MatchRecord,
    pub window: [MatchRecord; LOOKAHEAD],
    pub level: GaleLevel,
}

impl Occurrence {
    /// The record that resolved the entry, if any.
    pub fn resolving_match(&self) -> Option<&MatchRecord> {
        match self.level {
            GaleLevel::F => None,
            level => self.window.get(level.attempts() - 1),
        }
    }
}

/// Stable sort by (date, hour, minute). Ties keep their input order.
pub fn sort_chronological(matches: &[MatchRecord]) -> Vec<MatchRecord> {
    let mut sorted = matches.to_vec();
    sorted.sort_by_key(|m| m.timestamp());
    sorted
}

/// Number of indices a scan can start a full window from.
pub fn window_starts(len: usize) -> usize {
    len.saturating_sub(LOOKAHEAD)
}

/// Sort `matches` and scan them for `pair`.
pub fn scan(pair: &PatternEntryPair, matches: &[MatchRecord]) -> Vec<Occurrence> {
    scan_sorted(pair, &sort_chronological(matches))
}

/// Scan an already-sorted sequence for `pair`.
pub fn scan_sorted(pair: &PatternEntryPair, sorted: &[MatchRecord]) -> Vec<Occurrence> {
    let pattern = &pair.pattern.config;
    let entry = &pair.entry.config;

    sorted
        .windows(LOOKAHEAD + 1)
        .enumerate()
        .filter(|(_, span)| matches(&span[0], pattern))
        .map(|(index, span)| {
            // span is exactly LOOKAHEAD + 1 long
            let window: [MatchRecord; LOOKAHEAD] = std::array::from_fn(|k| span[k + 1].clone());
            let level = classify(&window, entry);
            Occurrence {
                index,
                pattern_match: span[0].clone(),
                window,
                level,
            }
        })
        .collect()
}
