use anyhow::Result;

use zodiac_momentum::config::ModelConfig;
use zodiac_momentum::continuation::{self, ContinuationRow};
use zodiac_momentum::model;

fn main() -> Result<()> {
    env_logger::init();
    let cfg = ModelConfig::from_env_and_args();

    for events in model::load_seasons(&cfg)? {
        let season = events
            .season
            .map(|s| s.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!("Season {season}: same-day continuation (later match, same date)");
        print_rows(&continuation::same_sign_continuation(&events));
        println!();
        println!("Season {season}: next-day continuation (date + 1)");
        print_rows(&continuation::next_day_continuation(&events));
        println!();
    }

    Ok(())
}

fn print_rows(rows: &[ContinuationRow]) {
    println!(
        "  {:<12} {:>10} {:>12} {:>8} {:>8} {:>6}",
        "Zodiac", "Activated", "Continued", "Rate", "Base", "Lift"
    );
    for r in rows {
        let lift = r.lift.map(|l| format!("{l:.2}")).unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<12} {:>10} {:>12} {:>8.3} {:>8.3} {:>6}",
            r.sign.label(),
            r.activation_days,
            r.continuation_days,
            r.continuation_rate,
            r.baseline_rate,
            lift
        );
    }
}
