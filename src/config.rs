use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_SEASONS: &[u32] = &[2023, 2024];
pub const DEFAULT_DATA_DIR: &str = "data";
pub const MANUAL_LOG_FILE: &str = "manual_day_events.csv";

/// Tunables shared by the estimators and the predictor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Weight of the manual log when blended with the historical tables.
    pub blend_weight: f64,
    pub seasons: Vec<u32>,
    pub momentum_exponent: f64,
    pub momentum_scale: f64,
    /// Count at which an active sign becomes dominant.
    pub dominant_threshold: u32,
    pub dominant_self_boost: f64,
    pub dominant_cross_boost: f64,
    /// Dominant->target lift must exceed this before the cross boost applies.
    pub dominant_lift_floor: f64,
    pub log_floor: f64,
    pub data_dir: PathBuf,
    #[serde(default)]
    pub manual_log: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            blend_weight: 0.15,
            seasons: DEFAULT_SEASONS.to_vec(),
            momentum_exponent: 1.2,
            momentum_scale: 0.15,
            dominant_threshold: 3,
            dominant_self_boost: 0.20,
            dominant_cross_boost: 0.08,
            dominant_lift_floor: 1.15,
            log_floor: 1e-9,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            manual_log: None,
        }
    }
}

impl ModelConfig {
    /// Defaults overridden by `.env.local`, `.env` and `ZODIAC_*` variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let mut cfg = Self::default();
        if let Ok(raw) = std::env::var("ZODIAC_DATA_DIR")
            && !raw.trim().is_empty()
        {
            cfg.data_dir = PathBuf::from(raw.trim());
        }
        if let Ok(raw) = std::env::var("ZODIAC_SEASONS") {
            let seasons = parse_seasons(&raw);
            if !seasons.is_empty() {
                cfg.seasons = seasons;
            }
        }
        if let Some(w) = std::env::var("ZODIAC_BLEND_WEIGHT")
            .ok()
            .and_then(|v| v.trim().parse::<f64>().ok())
        {
            cfg.blend_weight = w.clamp(0.0, 1.0);
        }
        if let Ok(raw) = std::env::var("ZODIAC_MANUAL_LOG")
            && !raw.trim().is_empty()
        {
            cfg.manual_log = Some(PathBuf::from(raw.trim()));
        }
        cfg
    }

    /// Applies `--data-dir`, `--seasons`, `--blend-weight` and `--manual-log`.
    pub fn apply_args(&mut self, args: &[String]) {
        if let Some(dir) = flag_value(args, "--data-dir") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(raw) = flag_value(args, "--seasons") {
            let seasons = parse_seasons(&raw);
            if !seasons.is_empty() {
                self.seasons = seasons;
            }
        }
        if let Some(w) = flag_value(args, "--blend-weight").and_then(|v| v.parse::<f64>().ok()) {
            self.blend_weight = w.clamp(0.0, 1.0);
        }
        if let Some(path) = flag_value(args, "--manual-log") {
            self.manual_log = Some(PathBuf::from(path));
        }
    }

    pub fn from_env_and_args() -> Self {
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        let mut cfg = Self::from_env();
        cfg.apply_args(&args);
        cfg
    }

    pub fn season_path(&self, season: u32) -> PathBuf {
        self.data_dir.join(format!("season_events_{season}.csv"))
    }

    pub fn manual_log_path(&self) -> PathBuf {
        self.manual_log
            .clone()
            .unwrap_or_else(|| self.data_dir.join(MANUAL_LOG_FILE))
    }
}

/// Value of `--name=value` or `--name value`.
pub fn flag_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn has_flag(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Positional arguments, skipping flags and the values of `takes_value` flags.
pub fn positional_args(args: &[String], takes_value: &[&str]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = takes_value.contains(&arg.as_str());
            continue;
        }
        out.push(arg.clone());
    }
    out
}

pub fn parse_seasons(raw: &str) -> Vec<u32> {
    let mut out = Vec::new();
    for season in raw
        .split([',', ';', ' '])
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .filter(|s| *s != 0)
    {
        if !out.contains(&season) {
            out.push(season);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_match_documented_constants() {
        let cfg = ModelConfig::default();
        assert_eq!(cfg.blend_weight, 0.15);
        assert_eq!(cfg.seasons, vec![2023, 2024]);
        assert_eq!(cfg.momentum_exponent, 1.2);
        assert_eq!(cfg.dominant_threshold, 3);
        assert_eq!(cfg.dominant_lift_floor, 1.15);
    }

    #[test]
    fn args_override_seasons_and_paths() {
        let mut cfg = ModelConfig::default();
        cfg.apply_args(&args(&[
            "--seasons=2022, 2023;2022",
            "--data-dir",
            "/tmp/zodiac",
            "--blend-weight=3.0",
        ]));
        assert_eq!(cfg.seasons, vec![2022, 2023]);
        assert_eq!(cfg.data_dir, PathBuf::from("/tmp/zodiac"));
        assert_eq!(cfg.blend_weight, 1.0);
        assert_eq!(
            cfg.season_path(2022),
            PathBuf::from("/tmp/zodiac/season_events_2022.csv")
        );
        assert_eq!(
            cfg.manual_log_path(),
            PathBuf::from("/tmp/zodiac/manual_day_events.csv")
        );
    }

    #[test]
    fn positional_args_skip_flag_values() {
        let raw = args(&["--data-dir", "d", "Cancer", "--json", "Pisces,Leo"]);
        assert_eq!(
            positional_args(&raw, &["--data-dir"]),
            vec!["Cancer".to_string(), "Pisces,Leo".to_string()]
        );
    }
}
