use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use zodiac_momentum::config::{self, ModelConfig};
use zodiac_momentum::manual_log;
use zodiac_momentum::model;
use zodiac_momentum::predictor::{self, Prediction};

const VALUE_FLAGS: &[&str] = &[
    "--data-dir",
    "--seasons",
    "--blend-weight",
    "--manual-log",
    "--date",
];

fn main() -> Result<()> {
    env_logger::init();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = ModelConfig::from_env();
    cfg.apply_args(&args);

    let as_json = config::has_flag(&args, "--json");
    let record = config::has_flag(&args, "--record");
    let record_date = match config::flag_value(&args, "--date") {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("invalid --date {raw}, expected YYYY-MM-DD"))?,
        None => chrono::Local::now().date_naive(),
    };

    let mut tokens = split_tokens(&config::positional_args(&args, VALUE_FLAGS));
    if tokens.is_empty() {
        tokens = prompt_tokens(as_json)?;
    }

    let tables = model::build_model(&cfg)?;
    match predictor::predict(&tables, &tokens, &cfg) {
        Ok(prediction) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            } else {
                print_table(&prediction);
            }
        }
        Err(err) => {
            if as_json {
                println!("{}", serde_json::json!({ "error": err.to_string() }));
            } else {
                println!("{err}");
            }
            return Ok(());
        }
    }

    if record {
        let path = cfg.manual_log_path();
        let appended = manual_log::record_observation(&path, &tokens, record_date)?;
        if !as_json {
            println!();
            println!(
                "Recorded {appended} observation(s) for {record_date} in {}",
                path.display()
            );
        }
    }

    Ok(())
}

/// Positional arguments may carry several comma-separated signs each.
fn split_tokens(raw: &[String]) -> Vec<String> {
    raw.iter()
        .flat_map(|arg| arg.split(','))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn prompt_tokens(quiet: bool) -> Result<Vec<String>> {
    if !quiet {
        println!("Same-Matchday Zodiac Momentum Predictor");
        println!();
        println!("Enter the signs that have already performed today, comma separated.");
        println!("Repeat a sign once per performance, e.g. Pisces,Pisces,Pisces,Cancer");
        println!();
        print!("Active signs: ");
        io::stdout().flush().context("flush stdout")?;
    }
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read active signs from stdin")?;
    Ok(split_tokens(&[line]))
}

fn print_table(prediction: &Prediction) {
    println!();
    println!("Predicted sign probabilities");
    if let Some((sign, count)) = prediction.dominant {
        println!("Dominant today: {sign} x{count}");
    }
    if prediction.active.dropped > 0 {
        println!("Ignored {} unrecognised token(s)", prediction.active.dropped);
    }
    println!();
    println!("{:<12} {:>11}", "Sign", "Probability");
    for row in &prediction.rows {
        println!("{:<12} {:>10.2}%", row.sign.label(), row.probability);
    }
}
