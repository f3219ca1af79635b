use anyhow::Result;

use zodiac_momentum::config::{self, ModelConfig};
use zodiac_momentum::coupling::{self, PairStat};
use zodiac_momentum::model;

const TOP_N: usize = 15;

fn main() -> Result<()> {
    env_logger::init();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = ModelConfig::from_env();
    cfg.apply_args(&args);
    let min_support = config::flag_value(&args, "--min-support")
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(1)
        .max(1);

    let seasons = model::load_seasons(&cfg)?;
    let manual = model::load_manual(&cfg)?;

    for events in &seasons {
        let sets = coupling::daily_sets_with_min_support(events, min_support);
        let stats = coupling::pair_stats(&sets);
        let season = events
            .season
            .map(|s| s.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("Season {season}: {} days, min support {min_support}", sets.len());
        print_pairs("Strongest positive", stats.iter().take(TOP_N));
        print_pairs(
            "Strongest negative",
            stats.iter().filter(|s| s.lift.is_some()).rev().take(TOP_N),
        );
        println!();
    }

    let manual = (!manual.is_empty()).then_some(&manual);
    let table = coupling::coupling(&seasons, manual, &cfg);
    println!(
        "Merged table: {} pairs, manual weight {:.2}",
        table.len(),
        cfg.blend_weight
    );
    println!("Strongest positive (merged)");
    for e in table.strongest_positive(TOP_N) {
        println!("  {:<12} -> {:<12} lift={:.3}", e.trigger.label(), e.target.label(), e.lift);
    }
    println!("Strongest negative (merged)");
    for e in table.strongest_negative(TOP_N) {
        println!("  {:<12} -> {:<12} lift={:.3}", e.trigger.label(), e.target.label(), e.lift);
    }

    Ok(())
}

fn print_pairs<'a>(title: &str, rows: impl Iterator<Item = &'a PairStat>) {
    println!("{title}");
    for r in rows {
        let lift = r.lift.map(|l| format!("{l:.3}")).unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<12} -> {:<12} co_days={:<4} p(b|a)={:.3} p(b)={:.3} lift={lift}",
            r.trigger.label(),
            r.target.label(),
            r.co_days,
            r.p_b_given_a,
            r.baseline_p_b
        );
    }
}
