use tracing::debug;

use crate::errors::CoreError;
use crate::models::filter::{month_index, CurrencyFilter, MonthOption};
use crate::models::transaction::{Dataset, TransactionRow};

/// Turns user selections (month cutoff, currency) into the subset of rows
/// a chart is built from.
///
/// Pure logic over the read-only dataset. Never fails on an empty result:
/// an empty selection is a valid state that renders an empty chart.
pub struct FilterService;

impl FilterService {
    pub fn new() -> Self {
        Self
    }

    /// Months present anywhere in the dataset, ascending and deduplicated.
    pub fn months_available(&self, dataset: &Dataset) -> Vec<MonthOption> {
        let mut months: Vec<u32> = dataset.rows().iter().map(TransactionRow::month).collect();
        months.sort_unstable();
        months.dedup();
        months.into_iter().filter_map(MonthOption::from_index).collect()
    }

    /// The default cutoff: the latest month with data.
    pub fn default_cutoff(&self, dataset: &Dataset) -> Option<u32> {
        dataset.rows().iter().map(TransactionRow::month).max()
    }

    /// Resolve an optional month label to a cutoff index.
    ///
    /// `None` picks the default cutoff (December for an empty dataset).
    /// A label must name a month that has data, as the selector only offers those.
    pub fn resolve_cutoff(&self, dataset: &Dataset, label: Option<&str>) -> Result<u32, CoreError> {
        let Some(label) = label else {
            return Ok(self.default_cutoff(dataset).unwrap_or(12));
        };

        let index = month_index(label).ok_or_else(|| {
            CoreError::ValidationError(format!("'{label}' is not a month name or number 1-12"))
        })?;

        let available = self.months_available(dataset);
        if available.iter().any(|m| m.index == index) {
            Ok(index)
        } else {
            Err(CoreError::ValidationError(format!(
                "No data for month '{label}'; available: {}",
                available
                    .iter()
                    .map(|m| m.label.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            )))
        }
    }

    /// Rows from January through `max_month` (inclusive) of every year that
    /// pass the currency filter.
    pub fn resolve<'a>(
        &self,
        dataset: &'a Dataset,
        max_month: u32,
        currency: CurrencyFilter,
    ) -> Vec<&'a TransactionRow> {
        let rows: Vec<&TransactionRow> = dataset
            .rows()
            .iter()
            .filter(|row| row.month() <= max_month && currency.accepts(row.currency))
            .collect();
        debug!(
            max_month,
            currency = %currency,
            selected = rows.len(),
            total = dataset.len(),
            "resolved filter"
        );
        rows
    }
}

impl Default for FilterService {
    fn default() -> Self {
        Self::new()
    }
}
