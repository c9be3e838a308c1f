use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::errors::CoreError;
use crate::models::chart::{
    fields, BarLayout, ChartDatum, ChartSpec, ChartSpecBuilder, ChartTab, ColorEncoding,
    FieldEncoding, FieldType, LabelAnchor, LabelColor, SortOrder, TextLayer, TooltipField,
};
use crate::models::series::{CategoryKey, Measure, SeriesPoint, StackedSeriesPoint};
use crate::models::settings::Settings;

const YEAR_TITLE: &str = "Año";
const YOY_TITLE: &str = "% vs año anterior";
const DARK_TEXT: &str = "black";
const LIGHT_TEXT: &str = "white";

/// Turns aggregated series into declarative chart specs.
///
/// The core decides every encoding, label position and label color;
/// a `ChartRenderer` only translates the `ChartSpec` into its own format.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// "Volumen por moneda": grouped bars, one per currency and year,
    /// annotated above each bar with the year-over-year change.
    pub fn currency_volume_chart(&self, points: &[SeriesPoint]) -> Result<ChartSpec, CoreError> {
        self.grouped_chart(
            ChartTab::CurrencyVolume.heading(),
            points,
            CategoryKey::Currency,
            Measure::AmountPygMillions,
        )
    }

    /// "Mercado": bars stacked by market in the configured order, with the
    /// year-over-year change written at the middle of each segment.
    pub fn market_composition_chart(
        &self,
        points: &[StackedSeriesPoint],
        settings: &Settings,
    ) -> Result<ChartSpec, CoreError> {
        self.stacked_chart(
            ChartTab::MarketComposition.heading(),
            points,
            CategoryKey::Market,
            Measure::AmountPyg,
            settings,
        )
    }

    /// Grouped bars: x = year, x-offset and color = category.
    pub fn grouped_chart(
        &self,
        title: &str,
        points: &[SeriesPoint],
        key: CategoryKey,
        measure: Measure,
    ) -> Result<ChartSpec, CoreError> {
        let data = points
            .iter()
            .map(|p| ChartDatum {
                year: p.year,
                category: p.category.clone(),
                amount: to_chart_number(p.total_amount),
                yoy_label: p.yoy_label.clone(),
                draw_order: None,
                segment_center: None,
            })
            .collect();

        let builder = ChartSpecBuilder::new(title, BarLayout::Grouped)
            .x(FieldEncoding::ordinal(fields::YEAR).with_title(YEAR_TITLE))
            .x_offset(fields::CATEGORY)
            .y(FieldEncoding::quantitative(fields::AMOUNT).with_title(measure.title()))
            .color(ColorEncoding::new(fields::CATEGORY).with_title(key.title()))
            .labels(TextLayer {
                text_field: fields::YOY_LABEL.to_string(),
                anchor: LabelAnchor::BarTop { dy: -5 },
                color: LabelColor::Fixed(DARK_TEXT.to_string()),
                font_size: None,
                bold: true,
            })
            .data(data);

        Self::with_tooltip(builder, key, measure).build()
    }

    /// Stacked bars: color = category with the priority list as domain,
    /// explicit order channel = draw order, labels at segment centers.
    pub fn stacked_chart(
        &self,
        title: &str,
        points: &[StackedSeriesPoint],
        key: CategoryKey,
        measure: Measure,
        settings: &Settings,
    ) -> Result<ChartSpec, CoreError> {
        let data = points
            .iter()
            .map(|s| ChartDatum {
                year: s.point.year,
                category: s.point.category.clone(),
                amount: to_chart_number(s.point.total_amount),
                yoy_label: s.point.yoy_label.clone(),
                draw_order: Some(s.draw_order),
                segment_center: Some(to_chart_number(s.segment_center)),
            })
            .collect();

        let builder = ChartSpecBuilder::new(title, BarLayout::Stacked)
            .x(FieldEncoding::ordinal(fields::YEAR)
                .with_title(YEAR_TITLE)
                .sorted(SortOrder::Ascending))
            .y(FieldEncoding::quantitative(fields::AMOUNT)
                .with_title(measure.title())
                .with_format("~s"))
            .color(
                ColorEncoding::new(fields::CATEGORY)
                    .with_title(key.title())
                    .with_domain(settings.stack_order.clone()),
            )
            .order(FieldEncoding::quantitative(fields::DRAW_ORDER).sorted(SortOrder::Ascending))
            .labels(TextLayer {
                text_field: fields::YOY_LABEL.to_string(),
                anchor: LabelAnchor::SegmentCenter {
                    field: fields::SEGMENT_CENTER.to_string(),
                },
                color: segment_label_color(&settings.light_label_categories),
                font_size: Some(13),
                bold: true,
            })
            .height(settings.chart_height)
            .data(data);

        Self::with_tooltip(builder, key, measure).build()
    }

    fn with_tooltip(builder: ChartSpecBuilder, key: CategoryKey, measure: Measure) -> ChartSpecBuilder {
        builder
            .tooltip(TooltipField::new(fields::YEAR, FieldType::Ordinal, YEAR_TITLE))
            .tooltip(TooltipField::new(fields::CATEGORY, FieldType::Nominal, key.title()))
            .tooltip(
                TooltipField::new(fields::AMOUNT, FieldType::Quantitative, measure.tooltip_title())
                    .with_format(measure.tooltip_format()),
            )
            .tooltip(TooltipField::new(fields::YOY_LABEL, FieldType::Nominal, YOY_TITLE))
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}

/// White text over the dark segments, black everywhere else.
pub fn segment_label_color(light_categories: &[String]) -> LabelColor {
    LabelColor::Conditional {
        field: fields::CATEGORY.to_string(),
        values: light_categories.to_vec(),
        when_true: LIGHT_TEXT.to_string(),
        otherwise: DARK_TEXT.to_string(),
    }
}

fn to_chart_number(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
