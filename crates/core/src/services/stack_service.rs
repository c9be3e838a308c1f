use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::series::{SeriesPoint, StackedSeriesPoint};

/// Places aggregated points into stacked bars.
///
/// Within a year, segments go bottom-to-top in `priority` order; categories
/// not in the list share the last slot (`priority.len()`) and keep their input
/// order among themselves.
pub struct StackService;

impl StackService {
    pub fn new() -> Self {
        Self
    }

    /// Position of `category` in the stacking priority list.
    pub fn draw_order<S: AsRef<str>>(&self, category: &str, priority: &[S]) -> usize {
        priority
            .iter()
            .position(|p| p.as_ref() == category)
            .unwrap_or(priority.len())
    }

    /// Sort points by (year, draw order) and compute each segment's base and
    /// midpoint. Segments of a year tile from zero without gaps.
    pub fn with_stack_order<S: AsRef<str>>(
        &self,
        points: &[SeriesPoint],
        priority: &[S],
    ) -> Result<Vec<StackedSeriesPoint>, CoreError> {
        let mut ordered: Vec<(usize, &SeriesPoint)> = points
            .iter()
            .map(|p| (self.draw_order(&p.category, priority), p))
            .collect();
        // Stable: equal keys keep input order.
        ordered.sort_by_key(|(order, p)| (p.year, *order));

        let mut stacked = Vec::with_capacity(ordered.len());
        let mut current_year = None;
        let mut running = Decimal::ZERO;

        for (draw_order, point) in ordered {
            if current_year != Some(point.year) {
                current_year = Some(point.year);
                running = Decimal::ZERO;
            }
            let overflow = || {
                CoreError::DataUnavailable(format!(
                    "stacked total for {} overflows at '{}'",
                    point.year, point.category
                ))
            };
            let segment_center = (point.total_amount / Decimal::TWO)
                .checked_add(running)
                .ok_or_else(overflow)?;
            let segment = StackedSeriesPoint {
                point: point.clone(),
                draw_order,
                cumulative_base: running,
                segment_center,
            };
            running = segment.segment_top().ok_or_else(overflow)?;
            stacked.push(segment);
        }

        Ok(stacked)
    }
}

impl Default for StackService {
    fn default() -> Self {
        Self::new()
    }
}
