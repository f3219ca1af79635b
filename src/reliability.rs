use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::events::EventLog;
use crate::zodiac::Zodiac;

pub type SignScores = BTreeMap<Zodiac, f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityEntry {
    pub sign: Zodiac,
    /// One slot per input season; `None` where the sign never appeared.
    pub seasons: Vec<Option<f64>>,
    pub historical: f64,
    pub manual: Option<f64>,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReliabilityTable {
    pub seasons: Vec<Option<u32>>,
    /// Sorted by `score` descending.
    pub entries: Vec<ReliabilityEntry>,
}

impl ReliabilityTable {
    /// Table with fixed scores and no season breakdown.
    pub fn from_scores(scores: &[(Zodiac, f64)]) -> Self {
        let entries = scores
            .iter()
            .map(|(sign, score)| ReliabilityEntry {
                sign: *sign,
                seasons: Vec::new(),
                historical: *score,
                manual: None,
                score: *score,
            })
            .collect();
        let mut table = Self {
            seasons: Vec::new(),
            entries,
        };
        table.sort();
        table
    }

    pub fn get(&self, sign: Zodiac) -> Option<f64> {
        self.entries.iter().find(|e| e.sign == sign).map(|e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn signs(&self) -> impl Iterator<Item = Zodiac> + '_ {
        self.entries.iter().map(|e| e.sign)
    }

    fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| b.score.total_cmp(&a.score).then(a.sign.cmp(&b.sign)));
    }
}

/// Clustered days / appeared days per sign for one season.
///
/// Only signs with at least one appeared day are present. A sign that appeared
/// but never clustered scores 0.
pub fn season_reliability(events: &EventLog) -> SignScores {
    let mut appeared: BTreeMap<Zodiac, u32> = BTreeMap::new();
    let mut clustered: BTreeMap<Zodiac, u32> = BTreeMap::new();
    for ((_, sign), performers) in events.day_aggregate() {
        if performers >= 1 {
            *appeared.entry(sign).or_insert(0) += 1;
        }
        if performers >= 2 {
            *clustered.entry(sign).or_insert(0) += 1;
        }
    }
    if appeared.is_empty() {
        log::warn!(
            "season {:?}: no performing rows with a known sign",
            events.season
        );
    }
    appeared
        .into_iter()
        .map(|(sign, days)| {
            let hits = clustered.get(&sign).copied().unwrap_or(0);
            (sign, hits as f64 / days as f64)
        })
        .collect()
}

/// Mean number of performers on the days a sign appeared.
pub fn same_day_clustering(events: &EventLog) -> SignScores {
    let mut totals: BTreeMap<Zodiac, (u32, u32)> = BTreeMap::new();
    for ((_, sign), performers) in events.day_aggregate() {
        let slot = totals.entry(sign).or_insert((0, 0));
        slot.0 += performers;
        slot.1 += 1;
    }
    totals
        .into_iter()
        .map(|(sign, (sum, days))| (sign, sum as f64 / days as f64))
        .collect()
}

/// Per-sign mean over the seasons where the sign is present.
///
/// Absent seasons are skipped rather than counted as zero.
pub fn merge_seasons(tables: &[SignScores]) -> BTreeMap<Zodiac, (Vec<Option<f64>>, f64)> {
    let mut out = BTreeMap::new();
    let signs = tables
        .iter()
        .flat_map(|t| t.keys().copied())
        .collect::<std::collections::BTreeSet<_>>();
    for sign in signs {
        let per_season = tables
            .iter()
            .map(|t| t.get(&sign).copied())
            .collect::<Vec<_>>();
        let present = per_season.iter().flatten().copied().collect::<Vec<_>>();
        let mean = present.iter().sum::<f64>() / present.len() as f64;
        out.insert(sign, (per_season, mean));
    }
    out
}

/// `(1 - w) * historical + w * manual`, with absent manual data counting as 0.
pub fn blend(historical: f64, manual: Option<f64>, weight: f64) -> f64 {
    (1.0 - weight) * historical + weight * manual.unwrap_or(0.0)
}

pub fn reliability(
    seasons: &[EventLog],
    manual: Option<&EventLog>,
    cfg: &ModelConfig,
) -> ReliabilityTable {
    let per_season = seasons
        .par_iter()
        .map(season_reliability)
        .collect::<Vec<_>>();
    for (events, scores) in seasons.iter().zip(&per_season) {
        log::debug!(
            "season {:?}: reliability over {} signs",
            events.season,
            scores.len()
        );
    }
    let merged = merge_seasons(&per_season);
    let manual_scores = manual.map(season_reliability).unwrap_or_default();

    let mut entries = merged
        .into_iter()
        .map(|(sign, (by_season, historical))| {
            let manual_score = manual_scores.get(&sign).copied();
            ReliabilityEntry {
                sign,
                seasons: by_season,
                historical,
                manual: manual_score,
                score: blend(historical, manual_score, cfg.blend_weight),
            }
        })
        .collect::<Vec<_>>();

    // Signs seen only in the manual log have no historical evidence.
    for (sign, value) in &manual_scores {
        if entries.iter().any(|e| e.sign == *sign) {
            continue;
        }
        entries.push(ReliabilityEntry {
            sign: *sign,
            seasons: vec![None; seasons.len()],
            historical: 0.0,
            manual: Some(*value),
            score: blend(0.0, Some(*value), cfg.blend_weight),
        });
    }

    let mut table = ReliabilityTable {
        seasons: seasons.iter().map(|s| s.season).collect(),
        entries,
    };
    table.sort();
    table
}
