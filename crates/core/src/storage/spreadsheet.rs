use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;

use crate::errors::CoreError;

/// A cell as read from the source file, before any schema is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
}

impl RawCell {
    pub fn is_empty(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell rendered as trimmed text (numbers without a trailing ".0").
    pub fn as_text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Text(s) => s.trim().to_string(),
            RawCell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            RawCell::Number(n) => n.to_string(),
            RawCell::Date(d) => d.to_string(),
        }
    }
}

/// Header row plus data rows of the first sheet of a source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

/// Supported source formats, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Result<Self, CoreError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Workbook),
            _ => Err(CoreError::DataUnavailable(format!(
                "Unsupported file type '{}': expected .csv, .xlsx, .xls or .ods",
                path.display()
            ))),
        }
    }
}

/// Read a source file into a `RawTable`, dispatching on its extension.
pub fn read_table(path: &Path) -> Result<RawTable, CoreError> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Csv => read_csv(path),
        SourceFormat::Workbook => read_workbook(path),
    }
}

/// Read a CSV file. Fields are trimmed and short rows are allowed.
pub fn read_csv(path: &Path) -> Result<RawTable, CoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let headers = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

/// Read the first worksheet of an Excel/OpenDocument workbook.
/// The first non-empty row is the header row.
pub fn read_workbook(path: &Path) -> Result<RawTable, CoreError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or_else(|| {
        CoreError::DataUnavailable(format!("Workbook '{}' has no worksheets", path.display()))
    })??;

    let mut rows = range.rows().map(|row| row.iter().map(convert_cell).collect::<Vec<_>>());

    let headers = rows
        .by_ref()
        .find(|row| !row.iter().all(RawCell::is_empty))
        .map(|row| row.iter().map(RawCell::as_text).collect())
        .unwrap_or_default();

    Ok(RawTable {
        headers,
        rows: rows.collect(),
    })
}

fn convert_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Empty => RawCell::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => RawCell::Text(s.clone()),
        Data::Float(f) => RawCell::Number(*f),
        Data::Int(i) => RawCell::Number(*i as f64),
        Data::Bool(b) => RawCell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(datetime) => RawCell::Date(datetime.date()),
            None => RawCell::Number(dt.as_f64()),
        },
        Data::Error(e) => RawCell::Text(format!("#{e:?}")),
    }
}
