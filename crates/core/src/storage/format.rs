use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::spreadsheet::{RawCell, RawTable};
use crate::errors::CoreError;
use crate::models::fold_label;
use crate::models::transaction::{Currency, TransactionRow};

// ── Canonical column names (after header normalization) ─────────────

pub const PERIOD: &str = "Periodo";
pub const CURRENCY: &str = "Moneda";
pub const MARKET: &str = "Mercado";
pub const INSTRUMENT: &str = "Instrumento";
pub const AMOUNT: &str = "Monto_en_PYG";

pub const REQUIRED_COLUMNS: [&str; 5] = [PERIOD, CURRENCY, MARKET, INSTRUMENT, AMOUNT];

/// Day zero of the Excel 1900 date system (accounts for the 1900 leap-year bug).
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Normalize a header: trim surrounding whitespace and join inner words
/// with `_`, so `"  Monto en PYG "` becomes `"Monto_en_PYG"`.
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Positions of the canonical columns inside a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap {
    pub period: usize,
    pub currency: usize,
    pub market: usize,
    pub instrument: usize,
    pub amount: usize,
}

impl ColumnMap {
    /// Locate every required column. Matching is case- and accent-insensitive
    /// on normalized headers; the first match wins on duplicates.
    pub fn from_headers(headers: &[String]) -> Result<Self, CoreError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| fold_label(&normalize_header(h)))
            .collect();
        let find = |name: &str| {
            let wanted = fold_label(name);
            normalized.iter().position(|h| *h == wanted)
        };

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|name| find(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::SchemaMismatch(format!(
                "missing column(s) {}; found [{}]",
                missing.join(", "),
                headers
                    .iter()
                    .map(|h| normalize_header(h))
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }

        // All present: checked above.
        let column = |name: &str| find(name).unwrap_or_default();
        Ok(Self {
            period: column(PERIOD),
            currency: column(CURRENCY),
            market: column(MARKET),
            instrument: column(INSTRUMENT),
            amount: column(AMOUNT),
        })
    }
}

/// Apply the transaction schema to a raw table.
///
/// Blank rows are skipped. Any row with an unreadable period, currency or
/// amount fails the whole load, naming its spreadsheet line.
pub fn parse_rows(table: &RawTable) -> Result<Vec<TransactionRow>, CoreError> {
    let columns = ColumnMap::from_headers(&table.headers)?;
    let mut rows = Vec::with_capacity(table.rows.len());

    for (idx, raw) in table.rows.iter().enumerate() {
        // +2: one for the header row, one because spreadsheet lines are 1-based
        let line = idx + 2;
        if raw.iter().all(RawCell::is_empty) {
            continue;
        }
        let cell = |i: usize| cell_at(raw, i);

        let period = parse_period(cell(columns.period)).ok_or_else(|| {
            CoreError::DataUnavailable(format!(
                "line {line}: cannot read {PERIOD} value '{}' as a date",
                cell(columns.period).as_text()
            ))
        })?;

        let currency = Currency::from_str(&cell(columns.currency).as_text()).map_err(|e| {
            CoreError::DataUnavailable(format!("line {line}: {e}"))
        })?;

        let amount_pyg = parse_amount(cell(columns.amount)).ok_or_else(|| {
            CoreError::DataUnavailable(format!(
                "line {line}: cannot read {AMOUNT} value '{}' as a number",
                cell(columns.amount).as_text()
            ))
        })?;

        rows.push(TransactionRow::new(
            period,
            currency,
            cell(columns.market).as_text(),
            cell(columns.instrument).as_text(),
            amount_pyg,
        ));
    }

    Ok(rows)
}

static EMPTY_CELL: RawCell = RawCell::Empty;

/// Short rows (allowed in CSV) read as empty trailing cells.
fn cell_at(row: &[RawCell], index: usize) -> &RawCell {
    row.get(index).unwrap_or(&EMPTY_CELL)
}

/// Coerce a period cell to a date.
///
/// Accepts native date cells, Excel serial numbers and the common textual
/// layouts; a bare `YYYY-MM` means the first day of that month.
pub fn parse_period(cell: &RawCell) -> Option<NaiveDate> {
    match cell {
        RawCell::Date(d) => Some(*d),
        RawCell::Number(n) => excel_serial_to_date(*n),
        RawCell::Text(s) => parse_period_text(s.trim()),
        RawCell::Empty => None,
    }
}

fn parse_period_text(s: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];
    const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

    if let Some(d) = DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
    {
        return Some(d);
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt.date());
    }
    // Year-month only
    NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok()
}

/// Convert an Excel serial day number (1900 date system) to a date.
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let (y, m, d) = EXCEL_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    let date = epoch.checked_add_signed(Duration::try_days(serial.trunc() as i64)?)?;
    // Serials past year 9999 are not dates
    (date.year() <= 9999).then_some(date)
}

/// Coerce an amount cell to a decimal. Blank amounts count as zero.
pub fn parse_amount(cell: &RawCell) -> Option<Decimal> {
    match cell {
        RawCell::Empty => Some(Decimal::ZERO),
        RawCell::Number(n) => Decimal::from_f64(*n),
        RawCell::Text(s) => {
            let s = s.trim();
            if s.is_empty() {
                return Some(Decimal::ZERO);
            }
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_str(&s.replace(',', "")))
                .ok()
        }
        RawCell::Date(_) => None,
    }
}
