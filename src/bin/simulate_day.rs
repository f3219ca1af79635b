use anyhow::Result;

use zodiac_momentum::config::{self, ModelConfig};
use zodiac_momentum::model::{self, ModelTables};
use zodiac_momentum::simulation::{self, SimulationConfig};

fn main() -> Result<()> {
    env_logger::init();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = ModelConfig::from_env();
    cfg.apply_args(&args);

    let mut sim = SimulationConfig::default();
    if let Some(n) = config::flag_value(&args, "--top").and_then(|v| v.parse::<usize>().ok()) {
        sim.top_n = n.max(1);
    }
    if let Some(m) = config::flag_value(&args, "--confidence").and_then(|v| v.parse::<f64>().ok())
    {
        sim.confidence_multiplier = m.max(0.0);
    }
    if let Some(p) = config::flag_value(&args, "--power").and_then(|v| v.parse::<f64>().ok()) {
        sim.activation_power = p;
    }

    println!(
        "Match-by-match day simulation (top {}, confidence x{:.2}, power {:.2})",
        sim.top_n, sim.confidence_multiplier, sim.activation_power
    );
    let momentum = config::has_flag(&args, "--momentum");
    let seasons = model::load_seasons(&cfg)?;
    let tables = if momentum {
        Some(ModelTables::from_logs(&seasons, None, &cfg))
    } else {
        None
    };
    if momentum {
        println!("Ranking by the momentum predictor over the day's activations");
    }

    for events in &seasons {
        let summary = match &tables {
            Some(tables) => simulation::simulate_season_momentum(events, tables, &cfg, &sim),
            None => simulation::simulate_season(events, &sim),
        };
        let season = events
            .season
            .map(|s| s.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "season {season} predictions={} correct={} accuracy={:.3} skipped_no_signal={} skipped_low_confidence={}",
            summary.predictions,
            summary.correct,
            summary.accuracy(),
            summary.skipped_no_signal,
            summary.skipped_low_confidence
        );
    }

    Ok(())
}
