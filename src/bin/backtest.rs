use anyhow::Result;

use zodiac_momentum::backtest::{self, BacktestConfig};
use zodiac_momentum::config::ModelConfig;
use zodiac_momentum::model;

fn main() -> Result<()> {
    env_logger::init();
    let cfg = ModelConfig::from_env_and_args();

    let reports = model::load_seasons(&cfg)?
        .iter()
        .map(|events| backtest::backtest_season(events, &BacktestConfig::default()))
        .collect::<Vec<_>>();

    println!("Strict walk-forward backtest");
    println!();
    println!("{:>8} {:>6} {:>13} {:>9}", "Season", "Tests", "Top1_Correct", "Accuracy");
    for r in &reports {
        let season = r.season.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string());
        println!(
            "{:>8} {:>6} {:>13} {:>9.3}",
            season, r.tests, r.top1_correct, r.accuracy
        );
    }

    Ok(())
}
