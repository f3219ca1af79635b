use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::coupling::{self, LiftMap};
use crate::events::{EventLog, EventRecord};
use crate::reliability::{self, SignScores};
use crate::zodiac::Zodiac;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Performer rows required strictly before the tested date.
    pub min_past_rows: usize,
    /// Performer rows required on the tested date.
    pub min_day_rows: usize,
    pub reliability_weight: f64,
    pub lift_weight: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            min_past_rows: 50,
            min_day_rows: 3,
            reliability_weight: 0.6,
            lift_weight: 0.4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub season: Option<u32>,
    pub tests: usize,
    pub top1_correct: usize,
    /// Rounded to three decimals.
    pub accuracy: f64,
}

/// Linear score of each past-reliable sign given the early signs of a day.
///
/// Lifts are averaged over the early signs that have a defined lift into the
/// candidate; with none the lift term is 1.0.
pub fn score_candidates(
    reliability: &SignScores,
    lifts: &LiftMap,
    early: &[Zodiac],
    cfg: &BacktestConfig,
) -> Vec<(Zodiac, f64)> {
    let mut rows = reliability
        .iter()
        .map(|(sign, base)| {
            let found = early
                .iter()
                .filter_map(|trigger| lifts.get(&(*trigger, *sign)).copied())
                .collect::<Vec<_>>();
            let lift = if found.is_empty() {
                coupling::NEUTRAL_LIFT
            } else {
                found.iter().sum::<f64>() / found.len() as f64
            };
            (
                *sign,
                cfg.reliability_weight * base + cfg.lift_weight * lift,
            )
        })
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    rows
}

/// Most frequent sign; ties go to the sign seen first.
fn most_frequent(rows: &[&EventRecord]) -> Option<Zodiac> {
    let mut counts: BTreeMap<Zodiac, (u32, usize)> = BTreeMap::new();
    for (idx, sign) in rows.iter().filter_map(|r| r.zodiac).enumerate() {
        counts.entry(sign).or_insert((0, idx)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| (a.1.0).cmp(&b.1.0).then(b.1.1.cmp(&a.1.1)))
        .map(|(sign, _)| sign)
}

/// Strict walk-forward over one season: every tested day sees only earlier days.
pub fn backtest_season(events: &EventLog, cfg: &BacktestConfig) -> BacktestReport {
    let performed = EventLog::new(
        events.season,
        events
            .records
            .iter()
            .filter(|r| r.performed)
            .cloned()
            .collect(),
    );
    let dates = performed
        .records
        .iter()
        .map(|r| r.date)
        .collect::<BTreeSet<_>>();

    let mut tests = 0usize;
    let mut correct = 0usize;
    for date in dates {
        let past = performed.before(date);
        if past.records.len() < cfg.min_past_rows {
            continue;
        }
        let mut day = performed
            .records
            .iter()
            .filter(|r| r.date == date)
            .collect::<Vec<_>>();
        if day.len() < cfg.min_day_rows {
            continue;
        }
        // Unknown minutes sort last.
        day.sort_by(|a, b| b.minutes.cmp(&a.minutes));
        let (early_rows, late_rows) = day.split_at(day.len() / 2);

        let mut early = Vec::new();
        for sign in early_rows.iter().filter_map(|r| r.zodiac) {
            if !early.contains(&sign) {
                early.push(sign);
            }
        }
        if early.is_empty() {
            continue;
        }
        let Some(target) = most_frequent(late_rows) else {
            continue;
        };

        let scores = reliability::season_reliability(&past);
        let lifts = coupling::season_lift(&coupling::daily_sets(&past));
        let Some(&(predicted, _)) = score_candidates(&scores, &lifts, &early, cfg).first() else {
            continue;
        };

        tests += 1;
        if predicted == target {
            correct += 1;
        }
        log::debug!("{date}: early {early:?} predicted {predicted} actual {target}");
    }

    let accuracy = if tests > 0 {
        (correct as f64 / tests as f64 * 1000.0).round() / 1000.0
    } else {
        0.0
    };
    BacktestReport {
        season: events.season,
        tests,
        top1_correct: correct,
        accuracy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn neutral_lift_when_no_early_sign_links() {
        let reliability = SignScores::from([(Zodiac::Leo, 0.5), (Zodiac::Virgo, 0.2)]);
        let lifts = LiftMap::from([((Zodiac::Aries, Zodiac::Virgo), 2.0)]);
        let rows = score_candidates(
            &reliability,
            &lifts,
            &[Zodiac::Aries],
            &BacktestConfig::default(),
        );
        assert_eq!(rows[0].0, Zodiac::Virgo);
        assert!((rows[0].1 - (0.6 * 0.2 + 0.4 * 2.0)).abs() < 1e-12);
        assert!((rows[1].1 - (0.6 * 0.5 + 0.4)).abs() < 1e-12);
    }

    #[test]
    fn late_target_tie_goes_to_first_seen() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let rows = [
            EventRecord::new("a", date, Some(Zodiac::Pisces), true),
            EventRecord::new("b", date, Some(Zodiac::Aries), true),
            EventRecord::new("c", date, None, true),
        ];
        let refs = rows.iter().collect::<Vec<_>>();
        assert_eq!(most_frequent(&refs), Some(Zodiac::Pisces));
    }

    #[test]
    fn skips_days_without_enough_history() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let events = EventLog::new(
            Some(2024),
            (0..10)
                .map(|i| EventRecord::new(format!("p{i}"), date, Some(Zodiac::Leo), true))
                .collect(),
        );
        let report = backtest_season(&events, &BacktestConfig::default());
        assert_eq!(report.tests, 0);
        assert_eq!(report.accuracy, 0.0);
    }
}
