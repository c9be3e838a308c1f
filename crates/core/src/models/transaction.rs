use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::fold_label;
use crate::errors::CoreError;

/// Settlement currency of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    /// Paraguayan guaraní (PYG)
    Guarani,
    /// US dollar (USD)
    Dolar,
}

impl Currency {
    /// Name as it appears in the source spreadsheet.
    pub fn display_name(&self) -> &'static str {
        match self {
            Currency::Guarani => "Guaraní",
            Currency::Dolar => "Dólar",
        }
    }

    /// ISO code used as the chart category.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Guarani => "PYG",
            Currency::Dolar => "USD",
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Currency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_label(s).as_str() {
            "guarani" | "guaranies" | "pyg" | "gs" => Ok(Currency::Guarani),
            "dolar" | "dolares" | "usd" | "us$" => Ok(Currency::Dolar),
            _ => Err(CoreError::DataUnavailable(format!(
                "Unrecognized currency '{}'",
                s.trim()
            ))),
        }
    }
}

/// One transaction record from the source spreadsheet.
///
/// Rows are immutable once loaded; every view derives from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    /// Reporting period (the spreadsheet's `Periodo` column)
    pub period: NaiveDate,

    /// Settlement currency
    pub currency: Currency,

    /// Market segment, e.g. "Mercado Primario", "Mercado Secundario", "Repos"
    pub market: String,

    /// Instrument traded, e.g. "Bonos", "Acciones"
    pub instrument: String,

    /// Traded amount expressed in guaraníes
    pub amount_pyg: Decimal,
}

impl TransactionRow {
    pub fn new(
        period: NaiveDate,
        currency: Currency,
        market: impl Into<String>,
        instrument: impl Into<String>,
        amount_pyg: Decimal,
    ) -> Self {
        Self {
            period,
            currency,
            market: market.into(),
            instrument: instrument.into(),
            amount_pyg,
        }
    }

    pub fn year(&self) -> i32 {
        self.period.year()
    }

    /// Calendar month, 1..=12.
    pub fn month(&self) -> u32 {
        self.period.month()
    }
}

/// The loaded transaction table. Read-only after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    source: PathBuf,
    rows: Vec<TransactionRow>,
}

impl Dataset {
    pub fn new(source: impl Into<PathBuf>, rows: Vec<TransactionRow>) -> Self {
        Self {
            source: source.into(),
            rows,
        }
    }

    /// Path of the file this dataset was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn rows(&self) -> &[TransactionRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Distinct years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.rows.iter().map(TransactionRow::year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }
}
