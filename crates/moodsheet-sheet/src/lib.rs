//! Excel adapters for moodsheet.
//!
//! Input is the first worksheet of an `.xls` or `.xlsx` file, read through
//! calamine with the first row as header. Output is always `.xlsx`, written
//! with rust_xlsxwriter.

use anyhow::{Context, Result};
use calamine::{Data, Reader, Sheets, open_workbook_auto};
use moodsheet_ports::{TableReader, TableWriter};
use moodsheet_schema::{Cell, Table};
use rust_xlsxwriter::{Format, Workbook as XlsxWorkbook};
use std::path::{Path, PathBuf};

const EXCEL_EXTENSIONS: [&str; 2] = ["xls", "xlsx"];

/// Reject paths that are not `.xls`/`.xlsx` (case-insensitive).
pub fn ensure_excel_path(path: &Path) -> Result<()> {
    let ok = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| EXCEL_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)));
    if !ok {
        anyhow::bail!(
            "{} is not an Excel file (expected .xls or .xlsx)",
            path.display()
        );
    }
    Ok(())
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Float(*n),
        Data::Int(n) => Cell::Int(*n),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Error(e) => Cell::Error(e.to_string()),
        // Serial number when it does not map onto a calendar date.
        Data::DateTime(dt) => dt
            .as_datetime()
            .map_or_else(|| Cell::Float(dt.as_f64()), Cell::DateTime),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
    }
}

fn header_name(index: usize, data: &Data) -> String {
    let name = cell_from_data(data).text();
    if name.trim().is_empty() {
        format!("Unnamed: {index}")
    } else {
        name
    }
}

/// Read the first worksheet of `path` into a [`Table`].
///
/// The first row is the header. An empty sheet gives a table with no
/// headers and no rows.
pub fn read_table(path: &Path) -> Result<Table> {
    ensure_excel_path(path)?;

    let mut workbook: Sheets<_> = open_workbook_auto(path)
        .with_context(|| format!("open Excel file {}", path.display()))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .with_context(|| format!("{} contains no sheets", path.display()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("read sheet {sheet_name:?} of {}", path.display()))?;

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|header| {
            header
                .iter()
                .enumerate()
                .map(|(i, d)| header_name(i, d))
                .collect()
        })
        .unwrap_or_default();

    let rows: Vec<Vec<Cell>> = rows
        .map(|r| r.iter().map(cell_from_data).collect())
        .collect();

    tracing::debug!(
        "read {} data rows from sheet {sheet_name:?} of {}",
        rows.len(),
        path.display()
    );

    Ok(Table::new(sheet_name, headers).with_rows(rows))
}

/// Write `table` to `path` as a single-sheet `.xlsx` workbook.
///
/// Header cells are strings; data cells keep their type. Empty cells are
/// left blank. Dates get a date format, with the time part only when it is
/// not midnight.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let datetime_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let mut workbook = XlsxWorkbook::new();
    let worksheet = workbook.add_worksheet();
    if !table.sheet_name.is_empty() {
        worksheet
            .set_name(&table.sheet_name)
            .with_context(|| format!("name worksheet {:?}", table.sheet_name))?;
    }

    for (col, header) in table.headers.iter().enumerate() {
        worksheet
            .write_string(0, column_number(col)?, header)
            .with_context(|| format!("write header {header:?}"))?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row_number = u32::try_from(r + 1).context("too many rows for an xlsx sheet")?;
        for (c, cell) in row.iter().enumerate() {
            let col = column_number(c)?;
            let written = match cell {
                Cell::Empty => continue,
                Cell::Text(s) | Cell::Error(s) => worksheet.write_string(row_number, col, s),
                Cell::Float(n) if n.is_finite() => worksheet.write_number(row_number, col, *n),
                Cell::Float(n) => worksheet.write_string(row_number, col, n.to_string()),
                Cell::Int(n) => worksheet.write_number(row_number, col, *n as f64),
                Cell::Bool(b) => worksheet.write_boolean(row_number, col, *b),
                Cell::DateTime(dt) => {
                    let format = if dt.time() == chrono::NaiveTime::MIN {
                        &date_format
                    } else {
                        &datetime_format
                    };
                    worksheet.write_datetime_with_format(row_number, col, dt, format)
                }
            };
            written.with_context(|| format!("write cell at row {}, column {}", r + 2, c + 1))?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("save {}", path.display()))?;

    tracing::debug!("wrote {} data rows to {}", table.row_count(), path.display());
    Ok(())
}

fn column_number(index: usize) -> Result<u16> {
    u16::try_from(index).context("too many columns for an xlsx sheet")
}

/// [`TableReader`] over an Excel file on disk.
#[derive(Debug, Clone)]
pub struct ExcelReader {
    path: PathBuf,
}

impl ExcelReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableReader for ExcelReader {
    fn read_table(&self) -> Result<Table> {
        read_table(&self.path)
    }
}

/// [`TableWriter`] producing an `.xlsx` file.
#[derive(Debug, Clone)]
pub struct XlsxWriter {
    path: PathBuf,
}

impl XlsxWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableWriter for XlsxWriter {
    fn write_table(&self, table: &Table) -> Result<()> {
        write_table(&self.path, table)
    }
}
