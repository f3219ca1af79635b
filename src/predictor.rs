use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ModelConfig;
use crate::model::ModelTables;
use crate::zodiac::Zodiac;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PredictError {
    #[error("no valid input: none of the active signs is a known zodiac sign")]
    NoValidInput,
    #[error("no result: reliability table is empty")]
    NoHistory,
}

/// Signs observed today with their repeat counts, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveSigns {
    counts: Vec<(Zodiac, u32)>,
    /// Tokens that did not normalize to a sign.
    pub dropped: usize,
}

impl ActiveSigns {
    pub fn from_tokens<S: AsRef<str>>(tokens: &[S]) -> Self {
        let mut out = Self::default();
        for token in tokens {
            match Zodiac::normalize(token.as_ref()) {
                Some(sign) => out.push(sign),
                None => out.dropped += 1,
            }
        }
        out
    }

    pub fn push(&mut self, sign: Zodiac) {
        match self.counts.iter_mut().find(|(s, _)| *s == sign) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((sign, 1)),
        }
    }

    pub fn count(&self, sign: Zodiac) -> u32 {
        self.counts
            .iter()
            .find(|(s, _)| *s == sign)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Zodiac, u32)> + '_ {
        self.counts.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|(_, c)| *c).sum()
    }

    /// First sign, in first-seen order, whose count reaches `threshold`.
    pub fn dominant(&self, threshold: u32) -> Option<(Zodiac, u32)> {
        self.counts.iter().copied().find(|(_, c)| *c >= threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub sign: Zodiac,
    pub log_score: f64,
    /// Percentage, rounded to two decimals.
    pub probability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Sorted by probability descending.
    pub rows: Vec<PredictionRow>,
    pub active: ActiveSigns,
    pub dominant: Option<(Zodiac, u32)>,
}

impl Prediction {
    pub fn probability(&self, sign: Zodiac) -> Option<f64> {
        self.rows
            .iter()
            .find(|r| r.sign == sign)
            .map(|r| r.probability)
    }

    pub fn top(&self, n: usize) -> &[PredictionRow] {
        &self.rows[..n.min(self.rows.len())]
    }

    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.probability).sum()
    }
}

pub fn predict<S: AsRef<str>>(
    tables: &ModelTables,
    tokens: &[S],
    cfg: &ModelConfig,
) -> Result<Prediction, PredictError> {
    predict_active(tables, ActiveSigns::from_tokens(tokens), cfg)
}

pub fn predict_active(
    tables: &ModelTables,
    active: ActiveSigns,
    cfg: &ModelConfig,
) -> Result<Prediction, PredictError> {
    if active.is_empty() {
        return Err(PredictError::NoValidInput);
    }
    if tables.reliability.is_empty() {
        return Err(PredictError::NoHistory);
    }

    let dominant = active.dominant(cfg.dominant_threshold);
    let scores = tables
        .reliability
        .signs()
        .map(|sign| (sign, log_score(tables, sign, &active, dominant, cfg)))
        .collect::<Vec<_>>();

    Ok(Prediction {
        rows: to_percentages(scores),
        active,
        dominant,
    })
}

/// Reliability-only distribution, for callers that want a prior without input.
pub fn predict_prior_only(
    tables: &ModelTables,
    cfg: &ModelConfig,
) -> Result<Prediction, PredictError> {
    if tables.reliability.is_empty() {
        return Err(PredictError::NoHistory);
    }
    let scores = tables
        .reliability
        .entries
        .iter()
        .map(|e| (e.sign, (e.score + cfg.log_floor).ln()))
        .collect::<Vec<_>>();
    Ok(Prediction {
        rows: to_percentages(scores),
        active: ActiveSigns::default(),
        dominant: None,
    })
}

/// Accumulated log-score of one candidate sign.
pub fn log_score(
    tables: &ModelTables,
    sign: Zodiac,
    active: &ActiveSigns,
    dominant: Option<(Zodiac, u32)>,
    cfg: &ModelConfig,
) -> f64 {
    let base = tables.reliability.get(sign).unwrap_or(0.0);
    let mut score = (base + cfg.log_floor).ln();

    let own = active.count(sign);
    if own > 0 {
        score += (own as f64).powf(cfg.momentum_exponent) * cfg.momentum_scale;
    }

    for (trigger, count) in active.iter() {
        if let Some(lift) = tables.coupling.lift(trigger, sign)
            && lift.is_finite()
            && lift > 0.0
        {
            score += count as f64 * lift.ln();
        }
    }

    if let Some((dom, dom_count)) = dominant {
        let excess = dom_count.saturating_sub(2) as f64;
        if dom == sign {
            score += (1.0 + cfg.dominant_self_boost * excess).ln();
        } else if tables
            .coupling
            .lift(dom, sign)
            .is_some_and(|lift| lift > cfg.dominant_lift_floor)
        {
            score += (1.0 + cfg.dominant_cross_boost * excess).ln();
        }
    }

    score
}

fn to_percentages(scores: Vec<(Zodiac, f64)>) -> Vec<PredictionRow> {
    let mx = scores
        .iter()
        .map(|(_, s)| *s)
        .fold(f64::NEG_INFINITY, f64::max);
    let weights = scores
        .iter()
        .map(|(_, s)| (s - mx).exp())
        .collect::<Vec<_>>();
    let den = weights.iter().sum::<f64>().max(1e-300);
    let shares = weights.iter().map(|w| w / den).collect::<Vec<_>>();
    let hundredths = largest_remainder(&shares, 10_000);

    let mut rows = scores
        .into_iter()
        .zip(hundredths)
        .map(|((sign, log_score), h)| PredictionRow {
            sign,
            log_score,
            probability: h as f64 / 100.0,
        })
        .collect::<Vec<_>>();
    rows.sort_by(|a, b| {
        b.probability
            .total_cmp(&a.probability)
            .then(b.log_score.total_cmp(&a.log_score))
            .then(a.sign.cmp(&b.sign))
    });
    rows
}

/// Splits `total` units over `shares` (summing to 1) so the parts sum to
/// `total` exactly. Leftover units go to the largest fractional remainders.
fn largest_remainder(shares: &[f64], total: u64) -> Vec<u64> {
    let scaled = shares.iter().map(|s| s * total as f64).collect::<Vec<_>>();
    let mut parts = scaled.iter().map(|v| v.floor() as u64).collect::<Vec<_>>();
    let assigned = parts.iter().sum::<u64>();
    let mut order = (0..scaled.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| {
        let ra = scaled[a] - scaled[a].floor();
        let rb = scaled[b] - scaled[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });
    for idx in order
        .into_iter()
        .cycle()
        .take(total.saturating_sub(assigned) as usize)
    {
        parts[idx] += 1;
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_signs_keep_first_seen_order() {
        let active = ActiveSigns::from_tokens(&["pisces", "Cancer", " PISCES", "", "Bogus"]);
        assert_eq!(
            active.iter().collect::<Vec<_>>(),
            vec![(Zodiac::Pisces, 2), (Zodiac::Cancer, 1)]
        );
        assert_eq!(active.dropped, 2);
        assert_eq!(active.total(), 3);
    }

    #[test]
    fn dominant_is_first_to_reach_threshold() {
        let active =
            ActiveSigns::from_tokens(&["Leo", "Virgo", "Virgo", "Virgo", "Leo", "Leo", "Leo"]);
        assert_eq!(active.dominant(3), Some((Zodiac::Leo, 4)));
        assert_eq!(active.dominant(5), None);
    }

    #[test]
    fn largest_remainder_hits_the_exact_total() {
        let shares = vec![1.0 / 3.0; 3];
        assert_eq!(largest_remainder(&shares, 10_000), vec![3334, 3333, 3333]);

        let shares = [0.125, 0.125, 0.75];
        assert_eq!(largest_remainder(&shares, 10_000), vec![1250, 1250, 7500]);
    }

    #[test]
    fn twelve_way_split_sums_to_one_hundred() {
        let scores = Zodiac::ALL
            .iter()
            .enumerate()
            .map(|(i, z)| (*z, (0.05 + 0.037 * i as f64).ln()))
            .collect::<Vec<_>>();
        let rows = to_percentages(scores);
        let total = rows.iter().map(|r| r.probability).sum::<f64>();
        assert!((total - 100.0).abs() <= 1e-9, "total {total}");
        assert_eq!(rows[0].sign, Zodiac::Pisces);
    }
}
