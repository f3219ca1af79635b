use std::path::PathBuf;

use zodiac_momentum::config::ModelConfig;
use zodiac_momentum::coupling::{self, NEUTRAL_LIFT};
use zodiac_momentum::events::{self, EventLog};
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
fn daily_sets_collapse_repeats_and_drop_non_performers() {
    let sets = coupling::daily_sets(&load(2023));
    assert_eq!(sets.len(), 3);
    let days = sets.values().cloned().collect::<Vec<_>>();
    assert_eq!(days[0].iter().copied().collect::<Vec<_>>(), vec![Zodiac::Leo, Zodiac::Virgo]);
    assert_eq!(days[2].iter().copied().collect::<Vec<_>>(), vec![Zodiac::Aries]);
}

#[test]
fn season_lift_matches_hand_count() {
    let lifts = coupling::season_lift(&coupling::daily_sets(&load(2023)));
    // P(Virgo | Leo) = 2/2, P(Virgo) = 2/3.
    assert!((lifts[&(Zodiac::Leo, Zodiac::Virgo)] - 1.5).abs() < 1e-12);
    assert!(!lifts.contains_key(&(Zodiac::Aries, Zodiac::Leo)));
}

#[test]
fn missing_season_pairs_count_as_neutral() {
    let cfg = ModelConfig::default();
    let table = coupling::coupling(&[load(2023), load(2024)], None, &cfg);

    let leo_virgo = table
        .entries
        .iter()
        .find(|e| e.trigger == Zodiac::Leo && e.target == Zodiac::Virgo)
        .unwrap();
    assert_eq!(leo_virgo.seasons, vec![Some(1.5), None]);
    assert!((leo_virgo.historical - 1.25).abs() < 1e-12);
    let w = cfg.blend_weight;
    assert!((leo_virgo.lift - ((1.0 - w) * 1.25 + w * NEUTRAL_LIFT)).abs() < 1e-12);

    for e in &table.entries {
        assert!(e.lift.is_finite() && e.lift >= 0.0);
        assert_ne!(e.trigger, e.target);
    }
    assert_eq!(table.lift(Zodiac::Aries, Zodiac::Pisces), None);
}

#[test]
fn strongest_lists_are_ordered() {
    let table = coupling::coupling(&[load(2023), load(2024)], None, &ModelConfig::default());
    let pos = table.strongest_positive(3);
    assert!(pos.windows(2).all(|w| w[0].lift >= w[1].lift));
    let neg = table.strongest_negative(3);
    assert!(neg.windows(2).all(|w| w[0].lift <= w[1].lift));
}

#[test]
fn min_support_filters_thin_days() {
    let events = load(2023);
    let sets = coupling::daily_sets_with_min_support(&events, 2);
    let signs = sets
        .values()
        .flat_map(|s| s.iter().copied())
        .collect::<Vec<_>>();
    assert_eq!(signs, vec![Zodiac::Leo, Zodiac::Virgo]);
}
