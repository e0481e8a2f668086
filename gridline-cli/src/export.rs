//! CSV and xlsx export of assembled hourly tables.
//!
//! Timestamps are written timezone-naive in local wall time — spreadsheet
//! tools reject timezone-aware timestamps. Missing values serialize as
//! empty fields (CSV) or blank cells (xlsx).

use anyhow::{Context, Result};
use gridline_core::{Dataset, HourlyTable, PeriodSpec, QueryName};
use rust_xlsxwriter::{Workbook, Worksheet};
use std::path::{Path, PathBuf};

/// Write one table as CSV: a `timestamp` column followed by the table's
/// columns in declaration order.
pub fn write_table_csv(table: &HourlyTable, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut header = vec!["timestamp".to_string()];
    header.extend(table.column_names().iter().cloned());
    wtr.write_record(&header)?;

    for (row, at) in table.index().iter().enumerate() {
        let mut record = vec![at.naive_local().format("%Y-%m-%d %H:%M:%S").to_string()];
        for value in table.row(row) {
            record.push(format_value(value));
        }
        wtr.write_record(&record)?;
    }

    wtr.flush().context("failed to flush CSV writer")?;
    Ok(())
}

/// Export every table of a dataset as `{query}_{period}.csv` under `dir`.
/// Returns the written paths.
pub fn export_dataset(dataset: &Dataset, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output dir {}", dir.display()))?;

    let mut paths = Vec::with_capacity(dataset.len());
    for (&(name, period), table) in dataset.iter() {
        let path = dir.join(format!("{}.csv", Dataset::label(name, period)));
        write_table_csv(table, &path)?;
        paths.push(path);
    }
    Ok(paths)
}

/// Write several windows' tables as one continuous CSV, in the given
/// order, with columns unioned across tables.
///
/// When two adjacent windows share a boundary timestamp (a provider that
/// returns inclusive end rows), the last row of the earlier window is the
/// one dropped.
pub fn write_stacked_csv(tables: &[&HourlyTable], path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    let mut columns: Vec<String> = Vec::new();
    for table in tables {
        for name in table.column_names() {
            if !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }

    let mut header = vec!["timestamp".to_string()];
    header.extend(columns.iter().cloned());
    wtr.write_record(&header)?;

    for (i, table) in tables.iter().enumerate() {
        let next_start = tables.get(i + 1).and_then(|next| next.index().first());
        for (row, at) in table.index().iter().enumerate() {
            if next_start == Some(at) {
                // Shared boundary row: the earlier window loses it.
                continue;
            }
            let mut record = vec![at.naive_local().format("%Y-%m-%d %H:%M:%S").to_string()];
            for column in &columns {
                let value = table.column(column).map(|values| values[row]);
                record.push(value.map_or_else(String::new, format_value));
            }
            wtr.write_record(&record)?;
        }
    }

    wtr.flush().context("failed to flush CSV writer")?;
    Ok(())
}

/// Write one table as a single-sheet xlsx workbook.
pub fn write_table_xlsx(table: &HourlyTable, sheet_name: &str, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;
    write_sheet(sheet, table)?;
    workbook
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Write a dataset as one workbook with one sheet per (query, period)
/// pair, labelled like the per-table CSV files. An empty dataset writes
/// nothing.
pub fn write_multisheet_xlsx(dataset: &Dataset, path: &Path) -> Result<()> {
    if dataset.is_empty() {
        return Ok(());
    }

    let mut workbook = Workbook::new();
    for (&(name, period), table) in dataset.iter() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(Dataset::label(name, period))?;
        write_sheet(sheet, table)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn write_sheet(sheet: &mut Worksheet, table: &HourlyTable) -> Result<()> {
    sheet.write_string(0, 0, "timestamp")?;
    for (col, name) in table.column_names().iter().enumerate() {
        sheet.write_string(0, col as u16 + 1, name)?;
    }
    for (row, at) in table.index().iter().enumerate() {
        let r = row as u32 + 1;
        sheet.write_string(r, 0, at.naive_local().format("%Y-%m-%d %H:%M:%S").to_string())?;
        for (col, value) in table.row(row).into_iter().enumerate() {
            // NaN stays a blank cell.
            if !value.is_nan() {
                sheet.write_number(r, col as u16 + 1, value)?;
            }
        }
    }
    Ok(())
}

/// Collect the historical year tables of a dataset in ascending year
/// order, for the stacked export.
pub fn historical_year_tables(dataset: &Dataset) -> Vec<&HourlyTable> {
    dataset
        .iter()
        .filter_map(|(&(name, period), table)| match (name, period) {
            (QueryName::Historical, PeriodSpec::Year(_)) => Some(table),
            _ => None,
        })
        .collect()
}

fn format_value(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{value:.2}")
    }
}
