use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::csv_table::{CsvTable, format_row};
use crate::events::{self, EventLog, EventRecord, RowError};
use crate::zodiac::Zodiac;

const HEADER: &str = "date,Zodiac,performed";
const MANUAL_PLAYER: &str = "manual";

/// A user-submitted "this sign performed today" row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualObservation {
    pub date: NaiveDate,
    pub zodiac: Zodiac,
}

impl ManualObservation {
    pub fn to_event(&self) -> EventRecord {
        EventRecord::new(MANUAL_PLAYER, self.date, Some(self.zodiac), true)
    }
}

pub fn to_event_log(observations: &[ManualObservation]) -> EventLog {
    EventLog::new(None, observations.iter().map(|o| o.to_event()).collect())
}

/// Reads the manual log; a missing file is an empty log.
pub fn load_manual_log(path: &Path) -> Result<Vec<ManualObservation>> {
    if !path.exists() {
        log::debug!("manual log {} not found, using none", path.display());
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read manual log {}", path.display()))?;
    let observations =
        parse_manual_csv(&raw).with_context(|| format!("parse manual log {}", path.display()))?;
    log::info!(
        "manual log: {} observations from {}",
        observations.len(),
        path.display()
    );
    Ok(observations)
}

pub fn parse_manual_csv(raw: &str) -> Result<Vec<ManualObservation>, RowError> {
    let table = CsvTable::parse(raw);
    if table.header.is_empty() {
        return Ok(Vec::new());
    }
    let date_col = table
        .column(&["date"])
        .ok_or(RowError::MissingColumn { column: "date" })?;
    let zodiac_col = table
        .column(&["zodiac"])
        .ok_or(RowError::MissingColumn { column: "Zodiac" })?;
    let performed_col = table.column(&["performed"]);

    let mut out = Vec::with_capacity(table.rows.len());
    for (line, cells) in &table.rows {
        let line = *line;
        let cell = |col: usize| cells.get(col).map(String::as_str).unwrap_or("");
        if let Some(col) = performed_col
            && !events::parse_performed(line, cell(col))?
        {
            continue;
        }
        let Some(zodiac) = events::parse_zodiac(line, cell(zodiac_col))? else {
            continue;
        };
        out.push(ManualObservation {
            date: events::parse_date(line, cell(date_col))?,
            zodiac,
        });
    }
    Ok(out)
}

/// Appends one `date,Zodiac,1` row per valid token, repeats included.
///
/// Invalid tokens are dropped. Never rewrites existing rows; calling twice
/// records the observation twice. Returns the number of rows appended.
pub fn record_observation<S: AsRef<str>>(
    path: &Path,
    active_signs: &[S],
    date: NaiveDate,
) -> Result<usize> {
    let signs = active_signs
        .iter()
        .filter_map(|s| Zodiac::normalize(s.as_ref()))
        .collect::<Vec<_>>();
    if signs.is_empty() {
        return Ok(0);
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create manual log dir {}", parent.display()))?;
    }
    let needs_header = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("open manual log {}", path.display()))?;

    let mut buf = String::new();
    if needs_header {
        buf.push_str(HEADER);
        buf.push('\n');
    }
    let date = date.format("%Y-%m-%d").to_string();
    for sign in &signs {
        buf.push_str(&format_row(&[&date, sign.label(), "1"]));
        buf.push('\n');
    }
    file.write_all(buf.as_bytes())
        .with_context(|| format!("append manual log {}", path.display()))?;

    log::info!(
        "manual log: appended {} rows for {date} to {}",
        signs.len(),
        path.display()
    );
    Ok(signs.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_non_performers_and_blank_signs() {
        let raw = "date,Zodiac,performed\n2024-05-01,Leo,1\n2024-05-01,Virgo,0\n2024-05-02,,1\n";
        let rows = parse_manual_csv(raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].zodiac, Zodiac::Leo);
    }

    #[test]
    fn parse_without_performed_column_keeps_all() {
        let rows = parse_manual_csv("date,Zodiac\n2024-05-01,leo\n").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn empty_file_is_empty_log() {
        assert!(parse_manual_csv("").unwrap().is_empty());
    }
}
