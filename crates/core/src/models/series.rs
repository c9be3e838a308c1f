use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionRow;

/// Which row attribute becomes the chart category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryKey {
    /// Currency short code ("PYG" / "USD")
    Currency,
    /// Market segment name
    Market,
    /// Instrument name
    Instrument,
}

impl CategoryKey {
    pub fn category_of(&self, row: &TransactionRow) -> String {
        match self {
            CategoryKey::Currency => row.currency.code().to_string(),
            CategoryKey::Market => row.market.clone(),
            CategoryKey::Instrument => row.instrument.clone(),
        }
    }

    /// Column title used on axes, legends and tooltips.
    pub fn title(&self) -> &'static str {
        match self {
            CategoryKey::Currency => "Moneda",
            CategoryKey::Market => "Mercado",
            CategoryKey::Instrument => "Instrumento",
        }
    }
}

/// The monetary value summed by the aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Measure {
    /// Amount in guaraníes
    AmountPyg,
    /// Amount in millions of guaraníes
    AmountPygMillions,
}

impl Measure {
    pub fn value(&self, row: &TransactionRow) -> Decimal {
        match self {
            Measure::AmountPyg => row.amount_pyg,
            Measure::AmountPygMillions => row.amount_pyg / Decimal::from(1_000_000),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Measure::AmountPyg => "Monto (PYG)",
            Measure::AmountPygMillions => "Millones de PYG",
        }
    }

    pub fn tooltip_title(&self) -> &'static str {
        match self {
            Measure::AmountPyg => "Monto (PYG)",
            Measure::AmountPygMillions => "Millones PYG",
        }
    }

    /// d3-format used when the amount is shown in a tooltip.
    pub fn tooltip_format(&self) -> &'static str {
        match self {
            Measure::AmountPyg => ",.0f",
            Measure::AmountPygMillions => ",.1f",
        }
    }
}

/// Summed measure for one (year, category) pair, with its change
/// against the same category's previous year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: i32,

    /// Currency code, market or instrument, depending on the `CategoryKey`
    pub category: String,

    pub total_amount: Decimal,

    /// Total of the previous year present for this category
    pub prior_year_total: Option<Decimal>,

    /// Percent change vs `prior_year_total`; `None` when there is no valid comparison
    pub yoy_percent: Option<f64>,

    /// Signed one-decimal label ("+12.3%"), empty when `yoy_percent` is `None`
    pub yoy_label: String,
}

/// A `SeriesPoint` placed inside a stacked bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackedSeriesPoint {
    #[serde(flatten)]
    pub point: SeriesPoint,

    /// Position in the stacking priority list; unknown categories get the list length
    pub draw_order: usize,

    /// Sum of the segments drawn below this one in the same year
    pub cumulative_base: Decimal,

    /// `cumulative_base + total_amount / 2`, where the label sits
    pub segment_center: Decimal,
}

impl StackedSeriesPoint {
    /// Top edge of this segment; `None` if it would overflow.
    pub fn segment_top(&self) -> Option<Decimal> {
        self.cumulative_base.checked_add(self.point.total_amount)
    }
}
