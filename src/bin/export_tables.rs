use std::path::PathBuf;

use anyhow::Result;

use zodiac_momentum::config::{self, ModelConfig};
use zodiac_momentum::export;
use zodiac_momentum::model;

fn main() -> Result<()> {
    env_logger::init();
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut cfg = ModelConfig::from_env();
    cfg.apply_args(&args);

    let out = config::flag_value(&args, "--out")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("zodiac_tables.xlsx"));

    let tables = model::build_model(&cfg)?;
    let report = export::export_tables(&out, &tables)?;
    println!(
        "Wrote {} ({} reliability rows, {} coupling rows)",
        out.display(),
        report.reliability_rows,
        report.coupling_rows
    );
    Ok(())
}
