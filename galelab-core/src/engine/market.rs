//! Market evaluation — one score predicate against one match.

use crate::domain::{MarketCode, MatchRecord};

/// Whether `code`'s condition holds for `record`.
///
/// Total over every `MarketCode`; an unrecognized code never holds.
pub fn evaluate(record: &MatchRecord, code: &MarketCode) -> bool {
    let home = record.home_score;
    let away = record.away_score;
    let goals = record.total_goals;
    match code {
        MarketCode::BothScore => home > 0 && away > 0,
        MarketCode::BothNotScore => home == 0 || away == 0,
        MarketCode::Over25 => goals > 2.5,
        MarketCode::Over35 => goals > 3.5,
        MarketCode::Under25 => goals < 2.5,
        MarketCode::Under35 => goals < 3.5,
        MarketCode::Unrecognized(_) => false,
    }
}

/// Evaluate a raw code string such as `"O25"`.
pub fn evaluate_str(record: &MatchRecord, code: &str) -> bool {
    evaluate(record, &MarketCode::parse(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn game(home: u32, away: u32) -> MatchRecord {
        MatchRecord::new(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), 10, 0, home, away)
    }

    #[test]
    fn both_score_and_not_score_are_complements() {
        for home in 0..5 {
            for away in 0..5 {
                let m = game(home, away);
                let am = evaluate(&m, &MarketCode::BothScore);
                assert_eq!(am, home > 0 && away > 0);
                assert_eq!(evaluate(&m, &MarketCode::BothNotScore), !am);
            }
        }
    }

    #[test]
    fn goal_lines() {
        let two = game(1, 1);
        let three = game(2, 1);
        let four = game(2, 2);
        assert!(!evaluate(&two, &MarketCode::Over25));
        assert!(evaluate(&two, &MarketCode::Under25));
        assert!(evaluate(&three, &MarketCode::Over25));
        assert!(!evaluate(&three, &MarketCode::Over35));
        assert!(evaluate(&three, &MarketCode::Under35));
        assert!(evaluate(&four, &MarketCode::Over35));
        assert!(!evaluate(&four, &MarketCode::Under35));
    }

    #[test]
    fn goal_lines_read_total_goals_field() {
        let mut m = game(0, 0);
        m.total_goals = 3.0;
        assert!(evaluate(&m, &MarketCode::Over25));
    }

    #[test]
    fn unrecognized_code_is_false() {
        let m = game(3, 3);
        assert!(!evaluate_str(&m, "HT_O05"));
        assert!(!evaluate_str(&m, ""));
        assert!(evaluate_str(&m, "am"));
    }
}
