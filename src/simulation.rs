use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::day_state::DayState;
use crate::events::EventLog;
use crate::model::ModelTables;
use crate::predictor;
use crate::reliability::{self, SignScores};
use crate::zodiac::Zodiac;

/// Baseline-times-clustering scorer used by the day simulation.
#[derive(Debug, Clone)]
pub struct ActivationScorer {
    pub reliability: SignScores,
    pub clustering: SignScores,
    /// Exponent applied per same-day activation.
    pub activation_power: f64,
    /// Baseline for signs missing from the reliability table.
    pub min_baseline: f64,
}

impl ActivationScorer {
    pub fn from_log(events: &EventLog, activation_power: f64) -> Self {
        Self {
            reliability: reliability::season_reliability(events),
            clustering: reliability::same_day_clustering(events),
            activation_power,
            min_baseline: 0.01,
        }
    }

    pub fn score(&self, sign: Zodiac, day: &DayState) -> f64 {
        let base = self
            .reliability
            .get(&sign)
            .copied()
            .unwrap_or(self.min_baseline);
        let cluster = self.clustering.get(&sign).copied().unwrap_or(1.0);
        let activations = day.activation_count(sign) as f64;
        base * cluster.powf(activations * self.activation_power)
    }

    pub fn top_signs(&self, day: &DayState, n: usize) -> Vec<(Zodiac, f64)> {
        let mut rows = self
            .reliability
            .keys()
            .map(|sign| (*sign, self.score(*sign, day)))
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        rows.truncate(n);
        rows
    }

    pub fn mean_baseline(&self) -> f64 {
        if self.reliability.is_empty() {
            return 0.0;
        }
        self.reliability.values().sum::<f64>() / self.reliability.len() as f64
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub top_n: usize,
    /// Top score must reach this multiple of the mean baseline.
    pub confidence_multiplier: f64,
    pub activation_power: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            top_n: 2,
            confidence_multiplier: 1.2,
            activation_power: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchPrediction {
    pub date: chrono::NaiveDate,
    pub match_id: String,
    pub predicted: Vec<Zodiac>,
    pub actual: Vec<Zodiac>,
    pub hit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub predictions: usize,
    pub correct: usize,
    pub skipped_no_signal: usize,
    pub skipped_low_confidence: usize,
    pub matches: Vec<MatchPrediction>,
}

impl SimulationSummary {
    pub fn accuracy(&self) -> f64 {
        if self.predictions == 0 {
            return 0.0;
        }
        self.correct as f64 / self.predictions as f64
    }
}

/// Replays each day match by match, predicting before every match once the
/// day has at least one activation.
pub fn simulate_season(events: &EventLog, cfg: &SimulationConfig) -> SimulationSummary {
    let scorer = ActivationScorer::from_log(events, cfg.activation_power);
    let gate = cfg.confidence_multiplier * scorer.mean_baseline();
    let mut summary = SimulationSummary::default();

    for (date, matches) in events.matches_by_day() {
        let mut day = DayState::new(date);
        for (key, rows) in &matches {
            if day.has_activations() {
                let top = scorer.top_signs(&day, cfg.top_n);
                let top_score = top.first().map(|(_, s)| *s).unwrap_or(0.0);
                if top_score < gate {
                    summary.skipped_low_confidence += 1;
                } else {
                    let predicted = top.iter().map(|(s, _)| *s).collect::<BTreeSet<_>>();
                    let actual = rows
                        .iter()
                        .filter_map(|r| r.performing_sign())
                        .collect::<BTreeSet<_>>();
                    if actual.is_empty() {
                        summary.skipped_no_signal += 1;
                    } else {
                        let hit = !predicted.is_disjoint(&actual);
                        summary.predictions += 1;
                        if hit {
                            summary.correct += 1;
                        }
                        log::debug!(
                            "{date} match {}: predicted {predicted:?} actual {actual:?} hit={hit}",
                            key.id()
                        );
                        summary.matches.push(MatchPrediction {
                            date,
                            match_id: key.id().to_string(),
                            predicted: predicted.into_iter().collect(),
                            actual: actual.into_iter().collect(),
                            hit,
                        });
                    }
                }
            }
            day.update_from_match(rows);
        }
    }

    summary
}

/// Same replay, ranked by the momentum predictor over the day's activations.
///
/// There is no confidence gate; `skipped_low_confidence` stays 0.
pub fn simulate_season_momentum(
    events: &EventLog,
    tables: &ModelTables,
    model_cfg: &ModelConfig,
    cfg: &SimulationConfig,
) -> SimulationSummary {
    let mut summary = SimulationSummary::default();

    for (date, matches) in events.matches_by_day() {
        let mut day = DayState::new(date);
        for (key, rows) in &matches {
            let Ok(prediction) =
                predictor::predict_active(tables, day.activations().clone(), model_cfg)
            else {
                day.update_from_match(rows);
                continue;
            };
            let actual = rows
                .iter()
                .filter_map(|r| r.performing_sign())
                .collect::<BTreeSet<_>>();
            if actual.is_empty() {
                summary.skipped_no_signal += 1;
            } else {
                let predicted = prediction
                    .top(cfg.top_n)
                    .iter()
                    .map(|r| r.sign)
                    .collect::<BTreeSet<_>>();
                let hit = !predicted.is_disjoint(&actual);
                summary.predictions += 1;
                if hit {
                    summary.correct += 1;
                }
                summary.matches.push(MatchPrediction {
                    date,
                    match_id: key.id().to_string(),
                    predicted: predicted.into_iter().collect(),
                    actual: actual.into_iter().collect(),
                    hit,
                });
            }
            day.update_from_match(rows);
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventRecord;
    use chrono::NaiveDate;

    fn rec(player: &str, day: u32, sign: Zodiac, match_id: &str) -> EventRecord {
        let date = NaiveDate::from_ymd_opt(2024, 1, day).unwrap();
        EventRecord::new(player, date, Some(sign), true).with_match(match_id)
    }

    #[test]
    fn activations_amplify_by_clustering() {
        let events = EventLog::new(
            None,
            vec![
                rec("a", 1, Zodiac::Leo, "1"),
                rec("b", 1, Zodiac::Leo, "1"),
                rec("c", 2, Zodiac::Leo, "2"),
                rec("d", 2, Zodiac::Virgo, "2"),
            ],
        );
        let scorer = ActivationScorer::from_log(&events, 1.0);
        let mut day = DayState::new(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert!((scorer.score(Zodiac::Leo, &day) - 0.5).abs() < 1e-12);
        day.activate(Zodiac::Leo);
        assert!((scorer.score(Zodiac::Leo, &day) - 0.75).abs() < 1e-12);
        assert_eq!(scorer.score(Zodiac::Pisces, &day), 0.01);
    }

    #[test]
    fn first_match_of_a_day_is_never_predicted() {
        let events = EventLog::new(
            None,
            vec![
                rec("a", 1, Zodiac::Leo, "1"),
                rec("b", 1, Zodiac::Leo, "2"),
                rec("c", 2, Zodiac::Leo, "3"),
                rec("d", 3, Zodiac::Aries, "4"),
            ],
        );
        let summary = simulate_season(&events, &SimulationConfig::default());
        assert_eq!(summary.predictions, 1);
        assert_eq!(summary.correct, 1);
        assert_eq!(summary.matches[0].match_id, "2");
        assert_eq!(summary.accuracy(), 1.0);
    }

    #[test]
    fn momentum_replay_starts_after_first_activation() {
        let events = EventLog::new(
            None,
            vec![
                rec("a", 1, Zodiac::Leo, "1"),
                rec("b", 1, Zodiac::Leo, "2"),
                rec("c", 1, Zodiac::Aries, "3"),
                rec("d", 2, Zodiac::Aries, "4"),
            ],
        );
        let tables = ModelTables::from_logs(
            std::slice::from_ref(&events),
            None,
            &ModelConfig::default(),
        );
        let summary = simulate_season_momentum(
            &events,
            &tables,
            &ModelConfig::default(),
            &SimulationConfig {
                top_n: 1,
                ..SimulationConfig::default()
            },
        );
        assert_eq!(summary.predictions, 2);
        assert_eq!(summary.matches[0].match_id, "2");
        assert_eq!(summary.matches[0].predicted, vec![Zodiac::Leo]);
        assert!(summary.matches[0].hit);
        assert_eq!(summary.skipped_low_confidence, 0);
    }
}
