use std::collections::{BTreeMap, HashMap};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::series::{CategoryKey, Measure, SeriesPoint};
use crate::models::transaction::TransactionRow;

/// Groups transaction rows into per-year, per-category totals and annotates
/// each total with its change against the category's previous year.
pub struct AggregationService;

impl AggregationService {
    pub fn new() -> Self {
        Self
    }

    /// Sum `measure` by (year, category).
    ///
    /// Output is sorted by year, then category. The year-over-year change is
    /// computed per category against the previous year *present* for that
    /// category, so a category missing a year compares with the last year it
    /// traded. Fails only if a total leaves the decimal range.
    pub fn aggregate<'a, I>(
        &self,
        rows: I,
        key: CategoryKey,
        measure: Measure,
    ) -> Result<Vec<SeriesPoint>, CoreError>
    where
        I: IntoIterator<Item = &'a TransactionRow>,
    {
        let mut totals: BTreeMap<(i32, String), Decimal> = BTreeMap::new();
        for row in rows {
            let year = row.year();
            let total = totals.entry((year, key.category_of(row))).or_default();
            *total = total.checked_add(measure.value(row)).ok_or_else(|| {
                CoreError::DataUnavailable(format!(
                    "{} total for '{}' in {year} overflows",
                    measure.title(),
                    key.category_of(row)
                ))
            })?;
        }

        // BTreeMap iterates year-major, so each category is visited in year order.
        let mut previous: HashMap<String, Decimal> = HashMap::new();
        let points: Vec<SeriesPoint> = totals
            .into_iter()
            .map(|((year, category), total_amount)| {
                let prior_year_total = previous.insert(category.clone(), total_amount);
                let yoy_percent = prior_year_total.and_then(|prior| percent_change(prior, total_amount));
                SeriesPoint {
                    year,
                    category,
                    total_amount,
                    prior_year_total,
                    yoy_percent,
                    yoy_label: format_yoy_label(yoy_percent),
                }
            })
            .collect();
        Ok(points)
    }
}

impl Default for AggregationService {
    fn default() -> Self {
        Self::new()
    }
}

/// `(current - prior) / prior * 100`.
///
/// `None` when either side is zero: a zero prior has no defined ratio, and a
/// zero-volume period has nothing to compare.
pub fn percent_change(prior: Decimal, current: Decimal) -> Option<f64> {
    if prior.is_zero() || current.is_zero() {
        return None;
    }
    (current - prior)
        .checked_div(prior)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .to_f64()
        .filter(|pct| pct.is_finite())
}

/// One decimal, explicit sign, percent suffix: `+12.3%`, `-4.0%`.
/// An absent change renders as an empty string.
pub fn format_yoy_label(yoy_percent: Option<f64>) -> String {
    match yoy_percent {
        Some(pct) if pct.is_finite() => format!("{pct:+.1}%"),
        _ => String::new(),
    }
}
