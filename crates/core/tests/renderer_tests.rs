use bursatil_core::models::chart::{ChartSpec, ChartTab};
use bursatil_core::models::series::SeriesPoint;
use bursatil_core::models::settings::Settings;
use bursatil_core::models::transaction::{Currency, TransactionRow};
use bursatil_core::renderers::html::{escape, DashboardPage, HtmlDashboardRenderer};
use bursatil_core::renderers::traits::ChartRenderer;
use bursatil_core::renderers::vega_lite::{VegaLiteRenderer, SCHEMA_URL};
use bursatil_core::services::chart_service::ChartService;
use bursatil_core::services::stack_service::StackService;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

// ═══════════════════════════════════════════════════════════════════
//  Fixtures
// ═══════════════════════════════════════════════════════════════════

fn point(year: i32, category: &str, total: Decimal, yoy_label: &str) -> SeriesPoint {
    SeriesPoint {
        year,
        category: category.to_string(),
        total_amount: total,
        prior_year_total: None,
        yoy_percent: None,
        yoy_label: yoy_label.to_string(),
    }
}

fn grouped_spec() -> ChartSpec {
    ChartService::new()
        .currency_volume_chart(&[
            point(2022, "PYG", dec!(10), ""),
            point(2022, "USD", dec!(4), ""),
            point(2023, "PYG", dec!(15), "+50.0%"),
        ])
        .unwrap()
}

fn stacked_spec() -> ChartSpec {
    let settings = Settings::default();
    let stacked = StackService::new().with_stack_order(
        &[
            point(2023, "Mercado Primario", dec!(20), "+10.0%"),
            point(2023, "Repos", dec!(60), "-5.0%"),
        ],
        &settings.stack_order,
    )
    .unwrap();
    ChartService::new()
        .market_composition_chart(&stacked, &settings)
        .unwrap()
}

fn document(spec: &ChartSpec) -> Value {
    VegaLiteRenderer::new().to_document(spec).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  Vega-Lite
// ═══════════════════════════════════════════════════════════════════

mod vega_lite {
    use super::*;

    #[test]
    fn document_header() {
        let doc = document(&stacked_spec());
        assert_eq!(doc["$schema"], SCHEMA_URL);
        assert_eq!(doc["title"], ChartTab::MarketComposition.heading());
        assert_eq!(doc["width"], "container");
        assert_eq!(doc["height"], 420);
    }

    #[test]
    fn grouped_chart_has_no_height() {
        let doc = document(&grouped_spec());
        assert!(doc.get("height").is_none());
    }

    #[test]
    fn bar_and_text_layers() {
        let doc = document(&grouped_spec());
        let layers = doc["layer"].as_array().unwrap();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0]["mark"]["type"], "bar");
        assert_eq!(layers[1]["mark"]["type"], "text");
    }

    #[test]
    fn grouped_bars_use_x_offset() {
        let doc = document(&grouped_spec());
        let enc = &doc["layer"][0]["encoding"];
        assert_eq!(enc["x"]["field"], "year");
        assert_eq!(enc["x"]["type"], "ordinal");
        assert_eq!(enc["x"]["title"], "Año");
        assert_eq!(enc["xOffset"]["field"], "category");
        assert!(enc["y"].get("stack").is_none());
        assert!(enc.get("order").is_none());
    }

    #[test]
    fn grouped_labels_sit_above_bars() {
        let doc = document(&grouped_spec());
        let text = &doc["layer"][1];
        assert_eq!(text["mark"]["dy"], -5);
        assert_eq!(text["mark"]["baseline"], "bottom");
        assert_eq!(text["mark"]["fontWeight"], "bold");
        assert_eq!(text["encoding"]["y"]["field"], "amount");
        assert_eq!(text["encoding"]["text"]["field"], "yoy_label");
        assert_eq!(text["encoding"]["color"]["value"], "black");
        assert!(text["encoding"]["x"].get("sort").is_none());
    }

    #[test]
    fn stacked_bars_stack_from_zero_in_draw_order() {
        let doc = document(&stacked_spec());
        let enc = &doc["layer"][0]["encoding"];
        assert_eq!(enc["y"]["stack"], "zero");
        assert_eq!(enc["y"]["axis"]["format"], "~s");
        assert_eq!(enc["order"]["field"], "draw_order");
        assert_eq!(enc["order"]["sort"], "ascending");
        assert_eq!(enc["x"]["sort"], "ascending");
        assert!(enc.get("xOffset").is_none());
        assert_eq!(
            enc["color"]["scale"]["domain"],
            serde_json::json!(["Repos", "Mercado Secundario", "Mercado Primario"])
        );
    }

    #[test]
    fn stacked_labels_centered_with_conditional_color() {
        let doc = document(&stacked_spec());
        let text = &doc["layer"][1];
        assert_eq!(text["mark"]["fontSize"], 13);
        assert_eq!(text["mark"]["align"], "center");
        assert_eq!(text["encoding"]["y"]["field"], "segment_center");

        let color = &text["encoding"]["color"];
        assert_eq!(color["condition"]["test"], r#"datum["category"] === "Repos""#);
        assert_eq!(color["condition"]["value"], "white");
        assert_eq!(color["value"], "black");
    }

    #[test]
    fn several_light_categories_join_with_or() {
        let settings = Settings {
            light_label_categories: vec!["Repos".into(), "Otros".into()],
            ..Settings::default()
        };
        let spec = ChartService::new()
            .market_composition_chart(&[], &settings)
            .unwrap();
        let doc = document(&spec);
        assert_eq!(
            doc["layer"][1]["encoding"]["color"]["condition"]["test"],
            r#"datum["category"] === "Repos" || datum["category"] === "Otros""#
        );
    }

    #[test]
    fn no_light_categories_never_match() {
        let settings = Settings {
            light_label_categories: vec![],
            ..Settings::default()
        };
        let spec = ChartService::new()
            .market_composition_chart(&[], &settings)
            .unwrap();
        let doc = document(&spec);
        assert_eq!(doc["layer"][1]["encoding"]["color"]["condition"]["test"], "false");
    }

    #[test]
    fn tooltip_titles_and_formats() {
        let doc = document(&stacked_spec());
        let tooltip = doc["layer"][0]["encoding"]["tooltip"].as_array().unwrap();
        assert_eq!(tooltip.len(), 4);
        assert_eq!(tooltip[1]["title"], "Mercado");
        assert_eq!(tooltip[2]["field"], "amount");
        assert_eq!(tooltip[2]["format"], ",.0f");
        assert_eq!(tooltip[3]["title"], "% vs año anterior");
    }

    #[test]
    fn stacked_data_carries_stack_fields() {
        let doc = document(&stacked_spec());
        let values = doc["data"]["values"].as_array().unwrap();
        assert_eq!(values[0]["category"], "Repos");
        assert_eq!(values[0]["draw_order"], 0);
        assert_eq!(values[0]["segment_center"], 30.0);
        assert_eq!(values[1]["segment_center"], 70.0);
        assert_eq!(values[1]["yoy_label"], "+10.0%");
    }

    #[test]
    fn grouped_data_omits_stack_fields() {
        let doc = document(&grouped_spec());
        let first = &doc["data"]["values"][0];
        assert!(first.get("draw_order").is_none());
        assert!(first.get("segment_center").is_none());
        assert_eq!(first["amount"], 10.0);
    }

    #[test]
    fn render_is_parseable_json() {
        let spec = grouped_spec();
        let compact = VegaLiteRenderer::new().render(&spec).unwrap();
        let pretty = VegaLiteRenderer::new().pretty().render(&spec).unwrap();
        assert!(!compact.contains('\n'));
        assert!(pretty.contains('\n'));
        let a: Value = serde_json::from_str(&compact).unwrap();
        let b: Value = serde_json::from_str(&pretty).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn renderer_name() {
        assert_eq!(VegaLiteRenderer::new().name(), "Vega-Lite");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  HTML
// ═══════════════════════════════════════════════════════════════════

mod html {
    use super::*;

    fn rows() -> Vec<TransactionRow> {
        vec![TransactionRow::new(
            NaiveDate::from_ymd_opt(2023, 3, 31).unwrap(),
            Currency::Guarani,
            "Repos",
            "Bonos <CDA>",
            dec!(1500000),
        )]
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<a href="x">O'Neil & co</a>"#),
            "&lt;a href=&quot;x&quot;&gt;O&#39;Neil &amp; co&lt;/a&gt;"
        );
        assert_eq!(escape("Guaraní"), "Guaraní");
    }

    #[test]
    fn page_has_data_view_and_attribution() {
        let rows = rows();
        let settings = Settings::default();
        let page = DashboardPage {
            title: "Mercado bursátil Paraguay",
            rows: &rows,
            source_name: &settings.source_name,
            source_url: &settings.source_url,
            selection: "Acumulado Enero – Marzo".to_string(),
            charts: vec![],
        };
        let html = HtmlDashboardRenderer::new().render_page(&page).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Mercado bursátil Paraguay</title>"));
        assert!(html.contains("<th>Monto en PYG</th>"));
        assert!(html.contains("<td>Guaraní</td>"));
        assert!(html.contains("Bonos &lt;CDA&gt;"));
        assert!(html.contains(&format!("href=\"{}\"", settings.source_url)));
        assert!(html.contains("Acumulado Enero – Marzo"));
    }

    #[test]
    fn page_embeds_each_chart_tab() {
        let page = DashboardPage {
            title: "t",
            rows: &[],
            source_name: "s",
            source_url: "u",
            selection: String::new(),
            charts: vec![
                (ChartTab::CurrencyVolume, grouped_spec()),
                (ChartTab::MarketComposition, stacked_spec()),
            ],
        };
        let html = HtmlDashboardRenderer::new().render_page(&page).unwrap();

        assert!(html.contains("Volumen por moneda</button>"));
        assert!(html.contains("Mercado</button>"));
        assert!(html.contains("<h3>Volumen acumulado por año y tipo de mercado</h3>"));
        assert!(html.contains("vegaEmbed('#chart-0'"));
        assert!(html.contains("vegaEmbed('#chart-1'"));
        assert!(html.contains("class=\"tab active\" id=\"tab-0\""));
        assert!(html.contains("class=\"tab\" id=\"tab-1\""));
    }

    #[test]
    fn embedded_json_cannot_close_script() {
        let spec = ChartService::new()
            .currency_volume_chart(&[point(2023, "</script>", dec!(1), "")])
            .unwrap();
        let html = HtmlDashboardRenderer::new().render(&spec).unwrap();
        assert_eq!(html.matches("</script>").count(), 4);
        assert!(html.contains(r"<\/script>"));
    }

    #[test]
    fn single_chart_page() {
        let html = HtmlDashboardRenderer::new().render(&grouped_spec()).unwrap();
        assert!(html.contains("vegaEmbed('#chart'"));
        assert!(html.contains(SCHEMA_URL));
        assert_eq!(HtmlDashboardRenderer::new().name(), "HTML");
    }
}
