use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::coupling;
use crate::events::EventLog;
use crate::zodiac::Zodiac;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NullTestReport {
    /// Highest real P(B|A) pairs.
    pub real_top: Vec<((Zodiac, Zodiac), f64)>,
    /// Max P(B|A) of each shuffled run.
    pub shuffled_max: Vec<f64>,
}

impl NullTestReport {
    pub fn real_max(&self) -> f64 {
        self.real_top.first().map(|(_, p)| *p).unwrap_or(0.0)
    }

    pub fn average_shuffled_max(&self) -> f64 {
        if self.shuffled_max.is_empty() {
            return 0.0;
        }
        self.shuffled_max.iter().sum::<f64>() / self.shuffled_max.len() as f64
    }

    pub fn max_shuffled_max(&self) -> f64 {
        self.shuffled_max.iter().copied().fold(0.0, f64::max)
    }
}

/// Same rows with the zodiac column permuted across all records.
pub fn shuffle_labels<R: Rng + ?Sized>(events: &EventLog, rng: &mut R) -> EventLog {
    let mut labels = events.records.iter().map(|r| r.zodiac).collect::<Vec<_>>();
    labels.shuffle(rng);
    let records = events
        .records
        .iter()
        .zip(labels)
        .map(|(r, zodiac)| {
            let mut r = r.clone();
            r.zodiac = zodiac;
            r
        })
        .collect();
    EventLog::new(events.season, records)
}

/// Compares real conditional co-occurrence against label-shuffled runs.
pub fn run_null_test<R: Rng + ?Sized>(
    events: &EventLog,
    shuffles: usize,
    top_n: usize,
    rng: &mut R,
) -> NullTestReport {
    let mut real_top = coupling::conditional_probabilities(&coupling::daily_sets(events));
    real_top.truncate(top_n);

    let mut shuffled_max = Vec::with_capacity(shuffles);
    for i in 0..shuffles {
        let shuffled = shuffle_labels(events, rng);
        let max = coupling::conditional_probabilities(&coupling::daily_sets(&shuffled))
            .first()
            .map(|(_, p)| *p)
            .unwrap_or(0.0);
        log::debug!("shuffle {}: max P(B|A) = {max:.3}", i + 1);
        shuffled_max.push(max);
    }

    NullTestReport {
        real_top,
        shuffled_max,
    }
}
