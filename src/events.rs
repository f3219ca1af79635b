use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::csv_table::CsvTable;
use crate::zodiac::Zodiac;

#[derive(Debug, Error, PartialEq)]
pub enum RowError {
    #[error("missing required column `{column}`")]
    MissingColumn { column: &'static str },
    #[error("line {line}: expected {expected} cells, found {found}")]
    ShortRow {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid date {value:?}")]
    InvalidDate { line: usize, value: String },
    #[error("line {line}: invalid performed flag {value:?}")]
    InvalidPerformed { line: usize, value: String },
    #[error("line {line}: unknown zodiac sign {value:?}")]
    UnknownZodiac { line: usize, value: String },
    #[error("line {line}: invalid minutes {value:?}")]
    InvalidMinutes { line: usize, value: String },
}

/// One (player, match, date) row of a season log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub player: String,
    pub date: NaiveDate,
    /// `None` when the birth date was unknown upstream.
    pub zodiac: Option<Zodiac>,
    /// Goal, assist or rating >= 7.0 in this match.
    pub performed: bool,
    pub minutes: Option<u32>,
    pub match_id: Option<String>,
}

impl EventRecord {
    pub fn new(
        player: impl Into<String>,
        date: NaiveDate,
        zodiac: Option<Zodiac>,
        performed: bool,
    ) -> Self {
        Self {
            player: player.into(),
            date,
            zodiac,
            performed,
            minutes: None,
            match_id: None,
        }
    }

    pub fn with_match(mut self, match_id: impl Into<String>) -> Self {
        self.match_id = Some(match_id.into());
        self
    }

    pub fn with_minutes(mut self, minutes: u32) -> Self {
        self.minutes = Some(minutes);
        self
    }

    /// Sign of a performing row; `None` for non-performers and unknown signs.
    pub fn performing_sign(&self) -> Option<Zodiac> {
        if self.performed { self.zodiac } else { None }
    }
}

/// Sortable key for match ids: numeric ids order numerically, the rest lexically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchKey(u64, String);

impl MatchKey {
    pub fn of(match_id: Option<&str>) -> Self {
        let raw = match_id.unwrap_or("").trim();
        MatchKey(raw.parse::<u64>().unwrap_or(u64::MAX), raw.to_string())
    }

    pub fn id(&self) -> &str {
        &self.1
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    pub season: Option<u32>,
    pub records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new(season: Option<u32>, records: Vec<EventRecord>) -> Self {
        Self { season, records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn performers(&self) -> impl Iterator<Item = (NaiveDate, Zodiac)> + '_ {
        self.records
            .iter()
            .filter_map(|r| r.performing_sign().map(|z| (r.date, z)))
    }

    /// Performer count per (date, sign). Null-sign rows never contribute.
    pub fn day_aggregate(&self) -> BTreeMap<(NaiveDate, Zodiac), u32> {
        let mut out = BTreeMap::new();
        for key in self.performers() {
            *out.entry(key).or_insert(0) += 1;
        }
        out
    }

    /// Rows grouped by date, then by match in match-id order.
    pub fn matches_by_day(&self) -> BTreeMap<NaiveDate, BTreeMap<MatchKey, Vec<&EventRecord>>> {
        let mut out: BTreeMap<NaiveDate, BTreeMap<MatchKey, Vec<&EventRecord>>> = BTreeMap::new();
        for r in &self.records {
            out.entry(r.date)
                .or_default()
                .entry(MatchKey::of(r.match_id.as_deref()))
                .or_default()
                .push(r);
        }
        out
    }

    /// Rows strictly before `date`, as a new log.
    pub fn before(&self, date: NaiveDate) -> EventLog {
        EventLog {
            season: self.season,
            records: self
                .records
                .iter()
                .filter(|r| r.date < date)
                .cloned()
                .collect(),
        }
    }
}

pub fn load_season(path: &Path, season: u32) -> Result<EventLog> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read season log {}", path.display()))?;
    let records =
        parse_event_csv(&raw).with_context(|| format!("parse season log {}", path.display()))?;
    log::info!(
        "season {season}: loaded {} rows from {}",
        records.len(),
        path.display()
    );
    Ok(EventLog::new(Some(season), records))
}

pub fn parse_event_csv(raw: &str) -> Result<Vec<EventRecord>, RowError> {
    let table = CsvTable::parse(raw);
    let player_col = required(&table, &["player", "name"], "player")?;
    let date_col = required(&table, &["date"], "date")?;
    let zodiac_col = required(&table, &["zodiac"], "Zodiac")?;
    let performed_col = required(&table, &["performed"], "performed")?;
    let minutes_col = table.column(&["minutes"]);
    let match_col = table.column(&["match_id", "fixture_id", "match"]);

    let width = [
        Some(player_col),
        Some(date_col),
        Some(zodiac_col),
        Some(performed_col),
        minutes_col,
        match_col,
    ]
    .into_iter()
    .flatten()
    .max()
    .unwrap_or(0)
        + 1;

    let mut out = Vec::with_capacity(table.rows.len());
    for (line, cells) in &table.rows {
        let line = *line;
        if cells.len() < width {
            return Err(RowError::ShortRow {
                line,
                expected: width,
                found: cells.len(),
            });
        }
        let minutes = match minutes_col {
            Some(col) => parse_minutes(line, &cells[col])?,
            None => None,
        };
        let match_id = match_col
            .map(|col| cells[col].trim().to_string())
            .filter(|id| !id.is_empty());
        out.push(EventRecord {
            player: cells[player_col].trim().to_string(),
            date: parse_date(line, &cells[date_col])?,
            zodiac: parse_zodiac(line, &cells[zodiac_col])?,
            performed: parse_performed(line, &cells[performed_col])?,
            minutes,
            match_id,
        });
    }
    Ok(out)
}

fn required(table: &CsvTable, aliases: &[&str], column: &'static str) -> Result<usize, RowError> {
    table
        .column(aliases)
        .ok_or(RowError::MissingColumn { column })
}

/// Accepts `YYYY-MM-DD` and timestamps that start with one.
pub fn parse_date(line: usize, raw: &str) -> Result<NaiveDate, RowError> {
    let trimmed = raw.trim();
    trimmed
        .get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        .ok_or_else(|| RowError::InvalidDate {
            line,
            value: raw.to_string(),
        })
}

pub fn parse_performed(line: usize, raw: &str) -> Result<bool, RowError> {
    let value = raw.trim().to_ascii_lowercase();
    match value.as_str() {
        "1" | "true" | "yes" => return Ok(true),
        "0" | "false" | "no" => return Ok(false),
        _ => {}
    }
    match value.parse::<f64>() {
        Ok(v) if v == 1.0 => Ok(true),
        Ok(v) if v == 0.0 => Ok(false),
        _ => Err(RowError::InvalidPerformed {
            line,
            value: raw.to_string(),
        }),
    }
}

pub fn parse_zodiac(line: usize, raw: &str) -> Result<Option<Zodiac>, RowError> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || ["nan", "none", "null"]
            .iter()
            .any(|m| trimmed.eq_ignore_ascii_case(m))
    {
        return Ok(None);
    }
    Zodiac::normalize(trimmed)
        .map(Some)
        .ok_or_else(|| RowError::UnknownZodiac {
            line,
            value: raw.to_string(),
        })
}

fn parse_minutes(line: usize, raw: &str) -> Result<Option<u32>, RowError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(Some(v.round() as u32)),
        _ => Err(RowError::InvalidMinutes {
            line,
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn performed_accepts_common_spellings() {
        assert_eq!(parse_performed(2, "1"), Ok(true));
        assert_eq!(parse_performed(2, "1.0"), Ok(true));
        assert_eq!(parse_performed(2, " False "), Ok(false));
        assert!(matches!(
            parse_performed(7, "2"),
            Err(RowError::InvalidPerformed { line: 7, .. })
        ));
    }

    #[test]
    fn date_accepts_api_timestamps() {
        let d = parse_date(1, "2024-08-16T19:00:00+00:00").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 8, 16).unwrap());
        assert!(parse_date(1, "16/08/2024").is_err());
        assert!(parse_date(1, "2024").is_err());
    }

    #[test]
    fn null_zodiac_markers_are_missing() {
        assert_eq!(parse_zodiac(1, ""), Ok(None));
        assert_eq!(parse_zodiac(1, "NaN"), Ok(None));
        assert_eq!(parse_zodiac(1, "leo"), Ok(Some(Zodiac::Leo)));
        assert!(parse_zodiac(1, "Dragon").is_err());
    }

    #[test]
    fn match_keys_order_numerically() {
        let mut keys = vec![
            MatchKey::of(Some("100")),
            MatchKey::of(Some("20")),
            MatchKey::of(None),
            MatchKey::of(Some("3")),
        ];
        keys.sort();
        let ids = keys.iter().map(|k| k.id()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["3", "20", "100", ""]);
    }
}
