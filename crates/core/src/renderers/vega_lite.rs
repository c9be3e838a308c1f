use serde_json::{json, Map, Value};

use super::traits::ChartRenderer;
use crate::errors::CoreError;
use crate::models::chart::{
    BarLayout, ChartSpec, ColorEncoding, FieldEncoding, LabelAnchor, LabelColor, TextLayer,
    TooltipField,
};

pub const SCHEMA_URL: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Renders a `ChartSpec` as a layered Vega-Lite v5 document:
/// a bar layer plus an optional text layer, with the data inlined.
#[derive(Debug, Clone, Default)]
pub struct VegaLiteRenderer {
    pretty: bool,
}

impl VegaLiteRenderer {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Indent the emitted JSON.
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Build the Vega-Lite document as a JSON value.
    pub fn to_document(&self, spec: &ChartSpec) -> Result<Value, CoreError> {
        let data = serde_json::to_value(&spec.data)?;

        let mut layers = vec![bar_layer(spec)];
        if let Some(labels) = &spec.labels {
            layers.push(text_layer(spec, labels));
        }

        let mut doc = Map::new();
        doc.insert("$schema".into(), json!(SCHEMA_URL));
        doc.insert("title".into(), json!(spec.title));
        doc.insert("width".into(), json!("container"));
        if let Some(height) = spec.height {
            doc.insert("height".into(), json!(height));
        }
        doc.insert("data".into(), json!({ "values": data }));
        doc.insert("layer".into(), Value::Array(layers));
        Ok(Value::Object(doc))
    }
}

impl ChartRenderer for VegaLiteRenderer {
    fn name(&self) -> &str {
        "Vega-Lite"
    }

    fn render(&self, spec: &ChartSpec) -> Result<String, CoreError> {
        let doc = self.to_document(spec)?;
        let text = if self.pretty {
            serde_json::to_string_pretty(&doc)?
        } else {
            serde_json::to_string(&doc)?
        };
        Ok(text)
    }
}

fn bar_layer(spec: &ChartSpec) -> Value {
    let mut encoding = Map::new();
    encoding.insert("x".into(), field(&spec.x));

    let mut y = field(&spec.y);
    if spec.layout == BarLayout::Stacked {
        y["stack"] = json!("zero");
    }
    encoding.insert("y".into(), y);

    if let Some(offset) = &spec.x_offset {
        encoding.insert("xOffset".into(), json!({ "field": offset, "type": "nominal" }));
    }
    encoding.insert("color".into(), color(&spec.color));
    if let Some(order) = &spec.order {
        encoding.insert("order".into(), field(order));
    }
    if !spec.tooltip.is_empty() {
        encoding.insert(
            "tooltip".into(),
            Value::Array(spec.tooltip.iter().map(tooltip).collect()),
        );
    }

    json!({ "mark": { "type": "bar" }, "encoding": encoding })
}

fn text_layer(spec: &ChartSpec, labels: &TextLayer) -> Value {
    let mut mark = Map::new();
    mark.insert("type".into(), json!("text"));
    if labels.bold {
        mark.insert("fontWeight".into(), json!("bold"));
    }
    if let Some(size) = labels.font_size {
        mark.insert("fontSize".into(), json!(size));
    }

    let mut encoding = Map::new();
    let mut x = json!({ "field": spec.x.field, "type": spec.x.field_type });
    if let Some(sort) = spec.x.sort {
        x["sort"] = json!(sort);
    }
    encoding.insert("x".into(), x);

    match &labels.anchor {
        LabelAnchor::BarTop { dy } => {
            mark.insert("dy".into(), json!(dy));
            mark.insert("baseline".into(), json!("bottom"));
            encoding.insert("y".into(), json!({
                "field": spec.y.field,
                "type": spec.y.field_type,
            }));
        }
        LabelAnchor::SegmentCenter { field } => {
            mark.insert("baseline".into(), json!("middle"));
            mark.insert("align".into(), json!("center"));
            encoding.insert("y".into(), json!({ "field": field, "type": "quantitative" }));
        }
    }

    if let Some(offset) = &spec.x_offset {
        encoding.insert("xOffset".into(), json!({ "field": offset, "type": "nominal" }));
    }
    encoding.insert("text".into(), json!({ "field": labels.text_field, "type": "nominal" }));
    encoding.insert("color".into(), label_color(&labels.color));

    json!({ "mark": mark, "encoding": encoding })
}

fn field(encoding: &FieldEncoding) -> Value {
    let mut out = Map::new();
    out.insert("field".into(), json!(encoding.field));
    out.insert("type".into(), json!(encoding.field_type));
    if let Some(title) = &encoding.title {
        out.insert("title".into(), json!(title));
    }
    if let Some(format) = &encoding.format {
        out.insert("axis".into(), json!({ "format": format }));
    }
    if let Some(sort) = encoding.sort {
        out.insert("sort".into(), json!(sort));
    }
    Value::Object(out)
}

fn color(encoding: &ColorEncoding) -> Value {
    let mut out = Map::new();
    out.insert("field".into(), json!(encoding.field));
    out.insert("type".into(), json!("nominal"));
    if let Some(title) = &encoding.title {
        out.insert("title".into(), json!(title));
    }
    if let Some(domain) = &encoding.domain {
        out.insert("scale".into(), json!({ "domain": domain }));
    }
    Value::Object(out)
}

fn tooltip(field: &TooltipField) -> Value {
    let mut out = Map::new();
    out.insert("field".into(), json!(field.field));
    out.insert("type".into(), json!(field.field_type));
    out.insert("title".into(), json!(field.title));
    if let Some(format) = &field.format {
        out.insert("format".into(), json!(format));
    }
    Value::Object(out)
}

fn label_color(color: &LabelColor) -> Value {
    match color {
        LabelColor::Fixed(value) => json!({ "value": value }),
        LabelColor::Conditional {
            field,
            values,
            when_true,
            otherwise,
        } => json!({
            "condition": { "test": equals_any(field, values), "value": when_true },
            "value": otherwise,
        }),
    }
}

/// Vega expression testing `datum[field]` against each value.
/// JSON string literals are valid Vega expression literals.
fn equals_any(field: &str, values: &[String]) -> String {
    if values.is_empty() {
        return "false".to_string();
    }
    let field = Value::String(field.to_string()).to_string();
    values
        .iter()
        .map(|v| format!("datum[{field}] === {}", Value::String(v.clone())))
        .collect::<Vec<_>>()
        .join(" || ")
}
