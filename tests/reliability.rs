use std::path::PathBuf;

use zodiac_momentum::config::ModelConfig;
use zodiac_momentum::events::{self, EventLog};
use zodiac_momentum::manual_log;
use zodiac_momentum::reliability;
use zodiac_momentum::zodiac::Zodiac;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn load(season: u32) -> EventLog {
    events::load_season(&fixture_path(&format!("season_events_{season}.csv")), season)
        .expect("fixture season should load")
}

#[test]
fn per_season_scores_follow_clustered_over_appeared() {
    let scores = reliability::season_reliability(&load(2023));
    assert_eq!(scores.get(&Zodiac::Leo), Some(&0.5));
    assert_eq!(scores.get(&Zodiac::Virgo), Some(&0.5));
    assert_eq!(scores.get(&Zodiac::Aries), Some(&0.0));
    assert!(!scores.contains_key(&Zodiac::Cancer));
}

#[test]
fn merged_table_skips_absent_seasons() {
    let cfg = ModelConfig::default();
    let seasons = vec![load(2023), load(2024)];
    let table = reliability::reliability(&seasons, None, &cfg);

    assert_eq!(table.seasons, vec![Some(2023), Some(2024)]);
    for entry in &table.entries {
        assert!((0.0..=1.0).contains(&entry.score), "{entry:?}");
    }

    let leo = table.entries.iter().find(|e| e.sign == Zodiac::Leo).unwrap();
    assert_eq!(leo.seasons, vec![Some(0.5), Some(0.0)]);
    assert!((leo.historical - 0.25).abs() < 1e-12);

    // Virgo only appears in 2023 and keeps that season's score.
    let virgo = table.entries.iter().find(|e| e.sign == Zodiac::Virgo).unwrap();
    assert_eq!(virgo.seasons, vec![Some(0.5), None]);
    assert!((virgo.historical - 0.5).abs() < 1e-12);

    assert_eq!(table.get(Zodiac::Scorpio), None);
}

#[test]
fn manual_log_blends_with_fixed_weight() {
    let cfg = ModelConfig::default();
    let w = cfg.blend_weight;
    let seasons = vec![load(2023), load(2024)];
    let observations = manual_log::load_manual_log(&fixture_path("manual_day_events.csv"))
        .expect("manual fixture should load");
    let manual = manual_log::to_event_log(&observations);
    let table = reliability::reliability(&seasons, Some(&manual), &cfg);

    let virgo = table.entries.iter().find(|e| e.sign == Zodiac::Virgo).unwrap();
    assert_eq!(virgo.manual, Some(1.0));
    assert!((virgo.score - ((1.0 - w) * 0.5 + w)).abs() < 1e-12);

    // No manual evidence: the historical score is scaled down, not kept.
    let cancer = table.entries.iter().find(|e| e.sign == Zodiac::Cancer).unwrap();
    assert_eq!(cancer.manual, None);
    assert!((cancer.score - (1.0 - w) * cancer.historical).abs() < 1e-12);

    // Manual-only sign enters with a zero historical score.
    let gemini = table.entries.iter().find(|e| e.sign == Zodiac::Gemini).unwrap();
    assert_eq!(gemini.historical, 0.0);
    assert_eq!(gemini.score, 0.0);
}

#[test]
fn empty_inputs_give_empty_table() {
    let cfg = ModelConfig::default();
    let table = reliability::reliability(&[EventLog::new(Some(2030), Vec::new())], None, &cfg);
    assert!(table.is_empty());
}
