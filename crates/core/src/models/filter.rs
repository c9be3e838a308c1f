use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::fold_label;
use super::transaction::Currency;
use crate::errors::CoreError;

/// Spanish month names, indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

/// A selectable month cutoff: "January through `label`, inclusive".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthOption {
    /// Month index, 1..=12
    pub index: u32,

    /// Human-readable month name (e.g. "Junio")
    pub label: String,
}

impl MonthOption {
    /// Returns `None` for an index outside 1..=12.
    pub fn from_index(index: u32) -> Option<Self> {
        let label = month_label(index)?;
        Some(Self {
            index,
            label: label.to_string(),
        })
    }
}

/// Spanish name of a month index.
pub fn month_label(index: u32) -> Option<&'static str> {
    if (1..=12).contains(&index) {
        Some(MONTH_NAMES[index as usize - 1])
    } else {
        None
    }
}

/// Map a month label back to its index.
///
/// Accepts the Spanish name in any case, with or without accents
/// ("Setiembre" is the Paraguayan spelling of September), or a number 1..=12.
pub fn month_index(label: &str) -> Option<u32> {
    let folded = fold_label(label);
    if let Ok(n) = folded.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    if folded == "setiembre" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|name| fold_label(name) == folded)
        .map(|i| i as u32 + 1)
}

/// Currency selection for the market-composition view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CurrencyFilter {
    /// No currency restriction ("Ambas")
    #[default]
    Both,
    /// Guaraní rows only
    Pyg,
    /// Dollar rows only
    Usd,
}

impl CurrencyFilter {
    /// True when a row in `currency` passes this filter.
    pub fn accepts(&self, currency: Currency) -> bool {
        match self {
            CurrencyFilter::Both => true,
            CurrencyFilter::Pyg => currency == Currency::Guarani,
            CurrencyFilter::Usd => currency == Currency::Dolar,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CurrencyFilter::Both => "Ambas",
            CurrencyFilter::Pyg => "PYG",
            CurrencyFilter::Usd => "USD",
        }
    }
}

impl std::fmt::Display for CurrencyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for CurrencyFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match fold_label(s).as_str() {
            "ambas" | "both" | "all" => Ok(CurrencyFilter::Both),
            "pyg" | "guarani" => Ok(CurrencyFilter::Pyg),
            "usd" | "dolar" => Ok(CurrencyFilter::Usd),
            _ => Err(CoreError::ValidationError(format!(
                "Unknown currency filter '{}': expected Ambas, PYG or USD",
                s.trim()
            ))),
        }
    }
}
