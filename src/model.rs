use anyhow::Result;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ModelConfig;
use crate::coupling::{self, CouplingTable};
use crate::events::{self, EventLog};
use crate::manual_log;
use crate::reliability::{self, ReliabilityTable};

/// The two historical tables the predictor reads from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelTables {
    pub reliability: ReliabilityTable,
    pub coupling: CouplingTable,
}

impl ModelTables {
    pub fn from_logs(seasons: &[EventLog], manual: Option<&EventLog>, cfg: &ModelConfig) -> Self {
        let manual = manual.filter(|m| !m.is_empty());
        Self {
            reliability: reliability::reliability(seasons, manual, cfg),
            coupling: coupling::coupling(seasons, manual, cfg),
        }
    }
}

/// Loads every configured season. Any unreadable or malformed file is an error.
pub fn load_seasons(cfg: &ModelConfig) -> Result<Vec<EventLog>> {
    cfg.seasons
        .par_iter()
        .map(|season| events::load_season(&cfg.season_path(*season), *season))
        .collect()
}

pub fn load_manual(cfg: &ModelConfig) -> Result<EventLog> {
    let observations = manual_log::load_manual_log(&cfg.manual_log_path())?;
    Ok(manual_log::to_event_log(&observations))
}

/// Reads the season logs and the manual log fresh and builds both tables.
pub fn build_model(cfg: &ModelConfig) -> Result<ModelTables> {
    let seasons = load_seasons(cfg)?;
    let manual = load_manual(cfg)?;
    let tables = ModelTables::from_logs(&seasons, Some(&manual), cfg);
    log::info!(
        "model: {} signs, {} pairs from seasons {:?} (+{} manual rows)",
        tables.reliability.len(),
        tables.coupling.len(),
        cfg.seasons,
        manual.records.len()
    );
    Ok(tables)
}
