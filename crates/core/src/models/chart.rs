use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Data field names used by every `ChartDatum`.
pub mod fields {
    pub const YEAR: &str = "year";
    pub const CATEGORY: &str = "category";
    pub const AMOUNT: &str = "amount";
    pub const YOY_LABEL: &str = "yoy_label";
    pub const DRAW_ORDER: &str = "draw_order";
    pub const SEGMENT_CENTER: &str = "segment_center";
}

/// Measurement type of an encoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Ordinal,
    Quantitative,
    Nominal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// How bars of different categories share a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BarLayout {
    /// Side by side, offset horizontally by category
    Grouped,
    /// On top of each other, stacked from zero
    Stacked,
}

/// A positional or ordering channel bound to a data field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEncoding {
    pub field: String,
    pub field_type: FieldType,
    pub title: Option<String>,

    /// d3-format string for axis labels (e.g. "~s")
    pub format: Option<String>,
    pub sort: Option<SortOrder>,
}

impl FieldEncoding {
    fn new(field: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            field: field.into(),
            field_type,
            title: None,
            format: None,
            sort: None,
        }
    }

    pub fn ordinal(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Ordinal)
    }

    pub fn quantitative(field: impl Into<String>) -> Self {
        Self::new(field, FieldType::Quantitative)
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Category → color channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEncoding {
    pub field: String,
    pub title: Option<String>,

    /// Fixed legend/scale order; `None` lets the renderer pick
    pub domain: Option<Vec<String>>,
}

impl ColorEncoding {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: None,
            domain: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_domain(mut self, domain: Vec<String>) -> Self {
        self.domain = Some(domain);
        self
    }
}

/// One line of the hover tooltip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipField {
    pub field: String,
    pub field_type: FieldType,
    pub title: String,
    pub format: Option<String>,
}

impl TooltipField {
    pub fn new(field: impl Into<String>, field_type: FieldType, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            field_type,
            title: title.into(),
            format: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Where a text label sits relative to its bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LabelAnchor {
    /// Above the bar, shifted by `dy` pixels
    BarTop { dy: i32 },
    /// Vertically centered on the data field (the stacked segment's midpoint)
    SegmentCenter { field: String },
}

/// Text color of on-chart labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LabelColor {
    Fixed(String),
    /// `when_true` if `field` equals one of `values`, otherwise `otherwise`
    Conditional {
        field: String,
        values: Vec<String>,
        when_true: String,
        otherwise: String,
    },
}

/// The text-label layer drawn over the bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLayer {
    /// Field shown as the label text
    pub text_field: String,
    pub anchor: LabelAnchor,
    pub color: LabelColor,
    pub font_size: Option<u32>,
    pub bold: bool,
}

/// One row of chart data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDatum {
    pub year: i32,
    pub category: String,
    pub amount: f64,
    pub yoy_label: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_order: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment_center: Option<f64>,
}

/// Declarative, renderer-agnostic description of a bar chart.
///
/// Built once through `ChartSpecBuilder` and never mutated afterwards;
/// renderers only read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub title: String,
    pub layout: BarLayout,
    pub x: FieldEncoding,
    pub y: FieldEncoding,

    /// Horizontal offset channel (grouped bars only)
    pub x_offset: Option<String>,
    pub color: ColorEncoding,

    /// Explicit stacking order channel (stacked bars only)
    pub order: Option<FieldEncoding>,
    pub tooltip: Vec<TooltipField>,
    pub labels: Option<TextLayer>,
    pub height: Option<u32>,
    pub data: Vec<ChartDatum>,
}

/// Accumulates encodings and data, then produces an immutable `ChartSpec`.
#[derive(Debug, Clone)]
#[must_use]
pub struct ChartSpecBuilder {
    title: String,
    layout: BarLayout,
    x: Option<FieldEncoding>,
    y: Option<FieldEncoding>,
    x_offset: Option<String>,
    color: Option<ColorEncoding>,
    order: Option<FieldEncoding>,
    tooltip: Vec<TooltipField>,
    labels: Option<TextLayer>,
    height: Option<u32>,
    data: Vec<ChartDatum>,
}

impl ChartSpecBuilder {
    pub fn new(title: impl Into<String>, layout: BarLayout) -> Self {
        Self {
            title: title.into(),
            layout,
            x: None,
            y: None,
            x_offset: None,
            color: None,
            order: None,
            tooltip: Vec::new(),
            labels: None,
            height: None,
            data: Vec::new(),
        }
    }

    pub fn x(mut self, encoding: FieldEncoding) -> Self {
        self.x = Some(encoding);
        self
    }

    pub fn y(mut self, encoding: FieldEncoding) -> Self {
        self.y = Some(encoding);
        self
    }

    pub fn x_offset(mut self, field: impl Into<String>) -> Self {
        self.x_offset = Some(field.into());
        self
    }

    pub fn color(mut self, encoding: ColorEncoding) -> Self {
        self.color = Some(encoding);
        self
    }

    pub fn order(mut self, encoding: FieldEncoding) -> Self {
        self.order = Some(encoding);
        self
    }

    pub fn tooltip(mut self, field: TooltipField) -> Self {
        self.tooltip.push(field);
        self
    }

    pub fn labels(mut self, layer: TextLayer) -> Self {
        self.labels = Some(layer);
        self
    }

    pub fn height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn data(mut self, data: Vec<ChartDatum>) -> Self {
        self.data = data;
        self
    }

    /// Fails when a required channel (x, y, color) was never set, or when a
    /// channel only meaningful for the other layout was.
    pub fn build(self) -> Result<ChartSpec, CoreError> {
        let missing = |channel: &str| {
            CoreError::ValidationError(format!(
                "Chart '{}' has no {channel} encoding",
                self.title
            ))
        };
        let x = self.x.clone().ok_or_else(|| missing("x"))?;
        let y = self.y.clone().ok_or_else(|| missing("y"))?;
        let color = self.color.clone().ok_or_else(|| missing("color"))?;

        match self.layout {
            BarLayout::Grouped if self.order.is_some() => {
                return Err(CoreError::ValidationError(format!(
                    "Chart '{}': grouped bars take no order channel",
                    self.title
                )));
            }
            BarLayout::Stacked if self.x_offset.is_some() => {
                return Err(CoreError::ValidationError(format!(
                    "Chart '{}': stacked bars take no x-offset channel",
                    self.title
                )));
            }
            _ => {}
        }

        Ok(ChartSpec {
            title: self.title,
            layout: self.layout,
            x,
            y,
            x_offset: self.x_offset,
            color,
            order: self.order,
            tooltip: self.tooltip,
            labels: self.labels,
            height: self.height,
            data: self.data,
        })
    }
}

/// The chart tabs of the market view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartTab {
    /// Grouped bars of traded volume per currency
    CurrencyVolume,
    /// Stacked bars of traded volume per market segment
    MarketComposition,
}

impl ChartTab {
    pub const ALL: [ChartTab; 2] = [ChartTab::CurrencyVolume, ChartTab::MarketComposition];

    /// Tab caption.
    pub fn label(&self) -> &'static str {
        match self {
            ChartTab::CurrencyVolume => "Volumen por moneda",
            ChartTab::MarketComposition => "Mercado",
        }
    }

    /// Heading shown above the chart.
    pub fn heading(&self) -> &'static str {
        match self {
            ChartTab::CurrencyVolume => "Volumen acumulado por año y moneda",
            ChartTab::MarketComposition => "Volumen acumulado por año y tipo de mercado",
        }
    }
}
