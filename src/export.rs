use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::model::ModelTables;

#[derive(Debug, Clone)]
pub struct ExportReport {
    pub reliability_rows: usize,
    pub coupling_rows: usize,
}

/// Writes the reliability and coupling tables to an xlsx workbook.
pub fn export_tables(path: &Path, tables: &ModelTables) -> Result<ExportReport> {
    let reliability_rows = reliability_rows(tables);
    let coupling_rows = coupling_rows(tables);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Reliability")?;
        write_rows(sheet, &reliability_rows)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Coupling")?;
        write_rows(sheet, &coupling_rows)?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        reliability_rows: reliability_rows.len().saturating_sub(1),
        coupling_rows: coupling_rows.len().saturating_sub(1),
    })
}

fn season_headers(seasons: &[Option<u32>]) -> Vec<String> {
    seasons
        .iter()
        .enumerate()
        .map(|(idx, season)| match season {
            Some(s) => format!("Season_{s}"),
            None => format!("Season_{}", idx + 1),
        })
        .collect()
}

fn cell(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.4}")).unwrap_or_default()
}

fn reliability_rows(tables: &ModelTables) -> Vec<Vec<String>> {
    let table = &tables.reliability;
    let mut header = vec!["Zodiac".to_string()];
    header.extend(season_headers(&table.seasons));
    header.extend(["Historical", "Manual", "Final"].map(String::from));

    let mut rows = vec![header];
    for entry in &table.entries {
        let mut row = vec![entry.sign.to_string()];
        row.extend(entry.seasons.iter().map(|v| cell(*v)));
        row.push(cell(Some(entry.historical)));
        row.push(cell(entry.manual));
        row.push(cell(Some(entry.score)));
        rows.push(row);
    }
    rows
}

fn coupling_rows(tables: &ModelTables) -> Vec<Vec<String>> {
    let table = &tables.coupling;
    let mut header = vec!["Trigger".to_string(), "Target".to_string()];
    header.extend(season_headers(&table.seasons));
    header.extend(["Historical", "Manual", "Final_Lift"].map(String::from));

    let mut rows = vec![header];
    for entry in &table.entries {
        let mut row = vec![entry.trigger.to_string(), entry.target.to_string()];
        row.extend(entry.seasons.iter().map(|v| cell(*v)));
        row.push(cell(Some(entry.historical)));
        row.push(cell(entry.manual));
        row.push(cell(Some(entry.lift)));
        rows.push(row);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
