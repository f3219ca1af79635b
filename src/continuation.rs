use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::coupling::{self, DailySets};
use crate::events::EventLog;
use crate::zodiac::Zodiac;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinuationRow {
    pub sign: Zodiac,
    pub activation_days: u32,
    pub continuation_days: u32,
    pub continuation_rate: f64,
    /// Share of performer-days on which the sign appeared at all.
    pub baseline_rate: f64,
    pub lift: Option<f64>,
}

fn baseline_rates(sets: &DailySets) -> BTreeMap<Zodiac, f64> {
    let days = sets.len() as f64;
    let mut counts: BTreeMap<Zodiac, u32> = BTreeMap::new();
    for set in sets.values() {
        for sign in set {
            *counts.entry(*sign).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .map(|(sign, n)| (sign, if days > 0.0 { n as f64 / days } else { 0.0 }))
        .collect()
}

fn row(
    sign: Zodiac,
    activation_days: u32,
    continuation_days: u32,
    baseline: f64,
) -> ContinuationRow {
    let (continuation_rate, lift) = if activation_days > 0 {
        let rate = continuation_days as f64 / activation_days as f64;
        (rate, (baseline > 0.0).then(|| rate / baseline))
    } else {
        (0.0, None)
    };
    ContinuationRow {
        sign,
        activation_days,
        continuation_days,
        continuation_rate,
        baseline_rate: baseline,
        lift,
    }
}

fn sort_rows(rows: &mut [ContinuationRow]) {
    rows.sort_by(|a, b| match (a.lift, b.lift) {
        (Some(x), Some(y)) => y.total_cmp(&x).then(a.sign.cmp(&b.sign)),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.sign.cmp(&b.sign),
    });
}

/// Does a sign that performs in one match perform again in a later match the same day?
pub fn same_sign_continuation(events: &EventLog) -> Vec<ContinuationRow> {
    let baseline = baseline_rates(&coupling::daily_sets(events));
    let signs = events
        .records
        .iter()
        .filter_map(|r| r.zodiac)
        .collect::<BTreeSet<_>>();
    let days = events.matches_by_day();

    let mut rows = Vec::with_capacity(signs.len());
    for sign in signs {
        let mut activation_days = 0u32;
        let mut continuation_days = 0u32;
        for matches in days.values() {
            let mut appeared_early = false;
            for records in matches.values() {
                let performed = records.iter().any(|r| r.performing_sign() == Some(sign));
                if !appeared_early {
                    if performed {
                        appeared_early = true;
                        activation_days += 1;
                    }
                } else if performed {
                    continuation_days += 1;
                    break;
                }
            }
        }
        let base = baseline.get(&sign).copied().unwrap_or(0.0);
        rows.push(row(sign, activation_days, continuation_days, base));
    }
    sort_rows(&mut rows);
    rows
}

/// Does a sign present on day D appear again on calendar day D+1?
///
/// Only days whose next calendar day is in the log count as activations.
pub fn next_day_continuation(events: &EventLog) -> Vec<ContinuationRow> {
    let sets = coupling::daily_sets(events);
    let baseline = baseline_rates(&sets);

    let mut rows = Vec::with_capacity(baseline.len());
    for (sign, base) in &baseline {
        let mut activation_days = 0u32;
        let mut continuation_days = 0u32;
        for (date, set) in &sets {
            if !set.contains(sign) {
                continue;
            }
            let Some(next) = date.checked_add_signed(Duration::days(1)) else {
                continue;
            };
            let Some(next_set) = sets.get(&next) else {
                continue;
            };
            activation_days += 1;
            if next_set.contains(sign) {
                continuation_days += 1;
            }
        }
        rows.push(row(*sign, activation_days, continuation_days, *base));
    }
    sort_rows(&mut rows);
    rows
}
