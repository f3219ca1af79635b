use anyhow::{Result, anyhow};

use zodiac_momentum::config::ModelConfig;
use zodiac_momentum::model;
use zodiac_momentum::reliability;

fn main() -> Result<()> {
    env_logger::init();
    let cfg = ModelConfig::from_env_and_args();

    let seasons = model::load_seasons(&cfg)?;
    let manual = model::load_manual(&cfg)?;
    let manual = (!manual.is_empty()).then_some(&manual);
    let table = reliability::reliability(&seasons, manual, &cfg);
    if table.is_empty() {
        return Err(anyhow!("no performing rows in seasons {:?}", cfg.seasons));
    }

    println!("Cross-season zodiac reliability");
    println!("Data: {}", cfg.data_dir.display());
    println!("Manual weight: {:.2}", cfg.blend_weight);
    println!();

    let mut header = format!("{:<12}", "Zodiac");
    for season in &table.seasons {
        let label = season.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        header.push_str(&format!(" {label:>8}"));
    }
    header.push_str(&format!(" {:>10} {:>8} {:>8}", "Historical", "Manual", "Final"));
    println!("{header}");

    for entry in &table.entries {
        let mut line = format!("{:<12}", entry.sign.label());
        for value in &entry.seasons {
            line.push_str(&format!(" {:>8}", fmt_opt(*value)));
        }
        line.push_str(&format!(
            " {:>10.4} {:>8} {:>8.4}",
            entry.historical,
            fmt_opt(entry.manual),
            entry.score
        ));
        println!("{line}");
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".to_string())
}
