//! Terminal tables for the data view and the chart series.

use bursatil_core::models::filter::MonthOption;
use bursatil_core::models::series::{SeriesPoint, StackedSeriesPoint};
use bursatil_core::models::transaction::{Dataset, TransactionRow};
use rust_decimal::Decimal;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct RowView {
    #[tabled(rename = "Periodo")]
    period: String,
    #[tabled(rename = "Moneda")]
    currency: &'static str,
    #[tabled(rename = "Mercado")]
    market: String,
    #[tabled(rename = "Instrumento")]
    instrument: String,
    #[tabled(rename = "Monto en PYG")]
    amount: String,
}

#[derive(Tabled)]
struct MonthView {
    #[tabled(rename = "#")]
    index: u32,
    #[tabled(rename = "Mes")]
    label: String,
}

#[derive(Tabled)]
struct SeriesView {
    #[tabled(rename = "Año")]
    year: i32,
    #[tabled(rename = "Categoría")]
    category: String,
    #[tabled(rename = "Monto")]
    amount: String,
    #[tabled(rename = "% vs año anterior")]
    yoy: String,
}

#[derive(Tabled)]
struct StackedView {
    #[tabled(rename = "Año")]
    year: i32,
    #[tabled(rename = "Mercado")]
    category: String,
    #[tabled(rename = "Orden")]
    draw_order: usize,
    #[tabled(rename = "Monto")]
    amount: String,
    #[tabled(rename = "Base")]
    base: String,
    #[tabled(rename = "Centro")]
    center: String,
    #[tabled(rename = "% vs año anterior")]
    yoy: String,
}

pub fn data_table(rows: &[TransactionRow]) -> String {
    render(rows.iter().map(|r| RowView {
        period: r.period.to_string(),
        currency: r.currency.display_name(),
        market: r.market.clone(),
        instrument: r.instrument.clone(),
        amount: r.amount_pyg.to_string(),
    }))
}

/// "N filas, 2019-2024" under the data table.
pub fn coverage_line(dataset: &Dataset) -> String {
    let years = dataset.years();
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if first != last => {
            format!("{} filas, {first}-{last}", dataset.len())
        }
        (Some(year), _) => format!("{} filas, {year}", dataset.len()),
        _ => "Sin datos".to_string(),
    }
}

pub fn month_table(months: &[MonthOption]) -> String {
    render(months.iter().map(|m| MonthView {
        index: m.index,
        label: m.label.clone(),
    }))
}

pub fn series_table(points: &[SeriesPoint]) -> String {
    render(points.iter().map(|p| SeriesView {
        year: p.year,
        category: p.category.clone(),
        amount: amount(p.total_amount),
        yoy: p.yoy_label.clone(),
    }))
}

pub fn stacked_table(points: &[StackedSeriesPoint]) -> String {
    render(points.iter().map(|s| StackedView {
        year: s.point.year,
        category: s.point.category.clone(),
        draw_order: s.draw_order,
        amount: amount(s.point.total_amount),
        base: amount(s.cumulative_base),
        center: amount(s.segment_center),
        yoy: s.point.yoy_label.clone(),
    }))
}

fn render<T: Tabled>(rows: impl IntoIterator<Item = T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    table.to_string()
}

fn amount(value: Decimal) -> String {
    value.round_dp(1).to_string()
}
