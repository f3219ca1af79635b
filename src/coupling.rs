use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::events::EventLog;
use crate::zodiac::Zodiac;

/// Lift standing in for "no evidence" when a season or the manual log lacks a pair.
pub const NEUTRAL_LIFT: f64 = 1.0;

pub type DailySets = BTreeMap<NaiveDate, BTreeSet<Zodiac>>;
pub type LiftMap = BTreeMap<(Zodiac, Zodiac), f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairStat {
    pub trigger: Zodiac,
    pub target: Zodiac,
    pub co_days: u32,
    pub p_b_given_a: f64,
    pub baseline_p_b: f64,
    pub lift: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplingEntry {
    pub trigger: Zodiac,
    pub target: Zodiac,
    /// One slot per input season; `None` where the pair had no defined lift.
    pub seasons: Vec<Option<f64>>,
    pub historical: f64,
    pub manual: Option<f64>,
    pub lift: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouplingTable {
    pub seasons: Vec<Option<u32>>,
    /// Sorted by `lift` descending.
    pub entries: Vec<CouplingEntry>,
}

impl CouplingTable {
    pub fn from_lifts(lifts: &[(Zodiac, Zodiac, f64)]) -> Self {
        let entries = lifts
            .iter()
            .map(|(trigger, target, lift)| CouplingEntry {
                trigger: *trigger,
                target: *target,
                seasons: Vec::new(),
                historical: *lift,
                manual: None,
                lift: *lift,
            })
            .collect();
        let mut table = Self {
            seasons: Vec::new(),
            entries,
        };
        table.sort();
        table
    }

    pub fn lift(&self, trigger: Zodiac, target: Zodiac) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.trigger == trigger && e.target == target)
            .map(|e| e.lift)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn strongest_positive(&self, n: usize) -> Vec<&CouplingEntry> {
        self.entries.iter().take(n).collect()
    }

    pub fn strongest_negative(&self, n: usize) -> Vec<&CouplingEntry> {
        let mut rows = self.entries.iter().collect::<Vec<_>>();
        rows.sort_by(|a, b| {
            a.lift
                .total_cmp(&b.lift)
                .then((a.trigger, a.target).cmp(&(b.trigger, b.target)))
        });
        rows.truncate(n);
        rows
    }

    fn sort(&mut self) {
        self.entries.sort_by(|a, b| {
            b.lift
                .total_cmp(&a.lift)
                .then((a.trigger, a.target).cmp(&(b.trigger, b.target)))
        });
    }
}

/// Per date, the signs with at least one performer. Multiplicity collapses.
pub fn daily_sets(events: &EventLog) -> DailySets {
    let mut out = DailySets::new();
    for (date, sign) in events.performers() {
        out.entry(date).or_default().insert(sign);
    }
    out
}

/// Like [`daily_sets`], but a sign only counts with `min_support` performers that day.
pub fn daily_sets_with_min_support(events: &EventLog, min_support: u32) -> DailySets {
    let mut out = DailySets::new();
    for ((date, sign), performers) in events.day_aggregate() {
        if performers >= min_support.max(1) {
            out.entry(date).or_default().insert(sign);
        }
    }
    out
}

fn appearance_counts(sets: &DailySets) -> BTreeMap<Zodiac, u32> {
    let mut out = BTreeMap::new();
    for set in sets.values() {
        for sign in set {
            *out.entry(*sign).or_insert(0) += 1;
        }
    }
    out
}

fn coappearance_counts(sets: &DailySets) -> BTreeMap<(Zodiac, Zodiac), u32> {
    let mut out = BTreeMap::new();
    for set in sets.values() {
        for a in set {
            for b in set {
                if a != b {
                    *out.entry((*a, *b)).or_insert(0) += 1;
                }
            }
        }
    }
    out
}

/// Raw lift rows for every co-appearing ordered pair.
pub fn pair_stats(sets: &DailySets) -> Vec<PairStat> {
    let total_days = sets.len() as f64;
    let appearance = appearance_counts(sets);
    let mut rows = Vec::new();
    for ((a, b), co_days) in coappearance_counts(sets) {
        let app_a = appearance.get(&a).copied().unwrap_or(0);
        let app_b = appearance.get(&b).copied().unwrap_or(0);
        if app_a == 0 || total_days == 0.0 {
            continue;
        }
        let p_b = app_b as f64 / total_days;
        let p_b_given_a = co_days as f64 / app_a as f64;
        let lift = (p_b > 0.0).then(|| p_b_given_a / p_b);
        rows.push(PairStat {
            trigger: a,
            target: b,
            co_days,
            p_b_given_a,
            baseline_p_b: p_b,
            lift,
        });
    }
    rows.sort_by(|x, y| match (x.lift, y.lift) {
        (Some(lx), Some(ly)) => ly.total_cmp(&lx),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    rows
}

/// Defined lifts only; undefined pairs are left out rather than zero-filled.
pub fn season_lift(sets: &DailySets) -> LiftMap {
    pair_stats(sets)
        .into_iter()
        .filter_map(|row| row.lift.map(|l| ((row.trigger, row.target), l)))
        .collect()
}

/// Outer join across seasons; a season missing the pair contributes 1.0.
pub fn merge_seasons(maps: &[LiftMap]) -> BTreeMap<(Zodiac, Zodiac), (Vec<Option<f64>>, f64)> {
    let pairs = maps
        .iter()
        .flat_map(|m| m.keys().copied())
        .collect::<BTreeSet<_>>();
    let mut out = BTreeMap::new();
    for pair in pairs {
        let per_season = maps
            .iter()
            .map(|m| m.get(&pair).copied())
            .collect::<Vec<_>>();
        let mean = per_season
            .iter()
            .map(|v| v.unwrap_or(NEUTRAL_LIFT))
            .sum::<f64>()
            / per_season.len() as f64;
        out.insert(pair, (per_season, mean));
    }
    out
}

pub fn blend_lift(historical: Option<f64>, manual: Option<f64>, weight: f64) -> f64 {
    (1.0 - weight) * historical.unwrap_or(NEUTRAL_LIFT)
        + weight * manual.unwrap_or(NEUTRAL_LIFT)
}

pub fn coupling(
    seasons: &[EventLog],
    manual: Option<&EventLog>,
    cfg: &ModelConfig,
) -> CouplingTable {
    let per_season = seasons
        .par_iter()
        .map(|events| season_lift(&daily_sets(events)))
        .collect::<Vec<_>>();
    for (events, lifts) in seasons.iter().zip(&per_season) {
        log::debug!("season {:?}: {} coupled pairs", events.season, lifts.len());
    }
    let merged = merge_seasons(&per_season);
    let manual_lifts = manual
        .map(|events| season_lift(&daily_sets(events)))
        .unwrap_or_default();

    let pairs = merged
        .keys()
        .chain(manual_lifts.keys())
        .copied()
        .collect::<BTreeSet<_>>();

    let entries = pairs
        .into_iter()
        .map(|(trigger, target)| {
            let (by_season, historical) = match merged.get(&(trigger, target)) {
                Some((by_season, mean)) => (by_season.clone(), Some(*mean)),
                None => (vec![None; seasons.len()], None),
            };
            let manual_lift = manual_lifts.get(&(trigger, target)).copied();
            CouplingEntry {
                trigger,
                target,
                seasons: by_season,
                historical: historical.unwrap_or(NEUTRAL_LIFT),
                manual: manual_lift,
                lift: blend_lift(historical, manual_lift, cfg.blend_weight),
            }
        })
        .collect();

    let mut table = CouplingTable {
        seasons: seasons.iter().map(|s| s.season).collect(),
        entries,
    };
    table.sort();
    table
}

/// Unordered pair co-occurrence counts, most frequent first.
pub fn pair_counts(sets: &DailySets) -> Vec<((Zodiac, Zodiac), u32)> {
    let mut counts = BTreeMap::new();
    for set in sets.values() {
        let signs = set.iter().copied().collect::<Vec<_>>();
        for (i, a) in signs.iter().enumerate() {
            for b in &signs[i + 1..] {
                *counts.entry((*a, *b)).or_insert(0u32) += 1;
            }
        }
    }
    let mut rows = counts.into_iter().collect::<Vec<_>>();
    rows.sort_by(|x, y| y.1.cmp(&x.1).then(x.0.cmp(&y.0)));
    rows
}

/// P(B | A) over days on which A is present, highest first.
pub fn conditional_probabilities(sets: &DailySets) -> Vec<((Zodiac, Zodiac), f64)> {
    let appearance = appearance_counts(sets);
    let mut rows = coappearance_counts(sets)
        .into_iter()
        .filter_map(|((a, b), co)| {
            let app_a = appearance.get(&a).copied().unwrap_or(0);
            (app_a > 0).then(|| ((a, b), co as f64 / app_a as f64))
        })
        .collect::<Vec<_>>();
    rows.sort_by(|x, y| y.1.total_cmp(&x.1).then(x.0.cmp(&y.0)));
    rows
}
