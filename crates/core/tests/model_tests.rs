use std::str::FromStr;

use bursatil_core::errors::CoreError;
use bursatil_core::models::chart::{
    BarLayout, ChartSpecBuilder, ChartTab, ColorEncoding, FieldEncoding,
};
use bursatil_core::models::filter::{month_index, month_label, CurrencyFilter, MonthOption};
use bursatil_core::models::series::{CategoryKey, Measure};
use bursatil_core::models::settings::Settings;
use bursatil_core::models::transaction::{Currency, Dataset, TransactionRow};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  Currency
// ═══════════════════════════════════════════════════════════════════

mod currency {
    use super::*;

    #[test]
    fn codes() {
        assert_eq!(Currency::Guarani.code(), "PYG");
        assert_eq!(Currency::Dolar.code(), "USD");
    }

    #[test]
    fn display_uses_spreadsheet_name() {
        assert_eq!(Currency::Guarani.to_string(), "Guaraní");
        assert_eq!(Currency::Dolar.to_string(), "Dólar");
    }

    #[test]
    fn parses_accented_names() {
        assert_eq!(Currency::from_str("Guaraní").unwrap(), Currency::Guarani);
        assert_eq!(Currency::from_str("Dólar").unwrap(), Currency::Dolar);
    }

    #[test]
    fn parses_without_accents_any_case() {
        assert_eq!(Currency::from_str("GUARANI").unwrap(), Currency::Guarani);
        assert_eq!(Currency::from_str(" dolar ").unwrap(), Currency::Dolar);
    }

    #[test]
    fn parses_codes() {
        assert_eq!(Currency::from_str("pyg").unwrap(), Currency::Guarani);
        assert_eq!(Currency::from_str("USD").unwrap(), Currency::Dolar);
    }

    #[test]
    fn rejects_unknown() {
        let err = Currency::from_str("Euro").unwrap_err();
        assert!(matches!(err, CoreError::DataUnavailable(ref m) if m.contains("Euro")));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  TransactionRow / Dataset
// ═══════════════════════════════════════════════════════════════════

mod transaction {
    use super::*;

    #[test]
    fn year_and_month_come_from_period() {
        let row = TransactionRow::new(d(2023, 7, 31), Currency::Dolar, "Repos", "Bonos", dec!(10));
        assert_eq!(row.year(), 2023);
        assert_eq!(row.month(), 7);
    }

    #[test]
    fn dataset_years_are_distinct_and_sorted() {
        let rows = vec![
            TransactionRow::new(d(2024, 1, 31), Currency::Guarani, "Repos", "Bonos", dec!(1)),
            TransactionRow::new(d(2022, 5, 31), Currency::Guarani, "Repos", "Bonos", dec!(1)),
            TransactionRow::new(d(2024, 2, 29), Currency::Dolar, "Repos", "Bonos", dec!(1)),
        ];
        let dataset = Dataset::new("data.csv", rows);
        assert_eq!(dataset.years(), vec![2022, 2024]);
        assert_eq!(dataset.len(), 3);
        assert!(!dataset.is_empty());
        assert_eq!(dataset.source(), std::path::Path::new("data.csv"));
    }

    #[test]
    fn empty_dataset() {
        let dataset = Dataset::new("empty.csv", Vec::new());
        assert!(dataset.is_empty());
        assert!(dataset.years().is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Months & currency filter
// ═══════════════════════════════════════════════════════════════════

mod months {
    use super::*;

    #[test]
    fn labels_are_spanish() {
        assert_eq!(month_label(1), Some("Enero"));
        assert_eq!(month_label(9), Some("Septiembre"));
        assert_eq!(month_label(12), Some("Diciembre"));
    }

    #[test]
    fn label_out_of_range() {
        assert_eq!(month_label(0), None);
        assert_eq!(month_label(13), None);
        assert!(MonthOption::from_index(13).is_none());
    }

    #[test]
    fn option_from_index() {
        let opt = MonthOption::from_index(6).unwrap();
        assert_eq!(opt.index, 6);
        assert_eq!(opt.label, "Junio");
    }

    #[test]
    fn index_from_name_any_case() {
        assert_eq!(month_index("Junio"), Some(6));
        assert_eq!(month_index("junio"), Some(6));
        assert_eq!(month_index("  DICIEMBRE "), Some(12));
    }

    #[test]
    fn index_from_number() {
        assert_eq!(month_index("3"), Some(3));
        assert_eq!(month_index("0"), None);
        assert_eq!(month_index("13"), None);
    }

    #[test]
    fn setiembre_spelling() {
        assert_eq!(month_index("Setiembre"), Some(9));
        assert_eq!(month_index("Septiembre"), Some(9));
    }

    #[test]
    fn unknown_name() {
        assert_eq!(month_index("June"), None);
        assert_eq!(month_index(""), None);
    }

    #[test]
    fn every_label_round_trips() {
        for i in 1..=12 {
            assert_eq!(month_index(month_label(i).unwrap()), Some(i));
        }
    }
}

mod currency_filter {
    use super::*;

    #[test]
    fn default_is_both() {
        assert_eq!(CurrencyFilter::default(), CurrencyFilter::Both);
    }

    #[test]
    fn both_accepts_everything() {
        assert!(CurrencyFilter::Both.accepts(Currency::Guarani));
        assert!(CurrencyFilter::Both.accepts(Currency::Dolar));
    }

    #[test]
    fn single_currency() {
        assert!(CurrencyFilter::Pyg.accepts(Currency::Guarani));
        assert!(!CurrencyFilter::Pyg.accepts(Currency::Dolar));
        assert!(CurrencyFilter::Usd.accepts(Currency::Dolar));
        assert!(!CurrencyFilter::Usd.accepts(Currency::Guarani));
    }

    #[test]
    fn parses_selector_values() {
        assert_eq!("Ambas".parse::<CurrencyFilter>().unwrap(), CurrencyFilter::Both);
        assert_eq!("pyg".parse::<CurrencyFilter>().unwrap(), CurrencyFilter::Pyg);
        assert_eq!("USD".parse::<CurrencyFilter>().unwrap(), CurrencyFilter::Usd);
        assert_eq!("dólar".parse::<CurrencyFilter>().unwrap(), CurrencyFilter::Usd);
    }

    #[test]
    fn rejects_unknown_value() {
        let err = "eur".parse::<CurrencyFilter>().unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn display() {
        assert_eq!(CurrencyFilter::Both.to_string(), "Ambas");
        assert_eq!(CurrencyFilter::Pyg.to_string(), "PYG");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Category keys & measures
// ═══════════════════════════════════════════════════════════════════

mod series_keys {
    use super::*;

    fn row() -> TransactionRow {
        TransactionRow::new(
            d(2023, 3, 31),
            Currency::Dolar,
            "Mercado Secundario",
            "Acciones",
            dec!(2500000),
        )
    }

    #[test]
    fn category_of_each_key() {
        assert_eq!(CategoryKey::Currency.category_of(&row()), "USD");
        assert_eq!(CategoryKey::Market.category_of(&row()), "Mercado Secundario");
        assert_eq!(CategoryKey::Instrument.category_of(&row()), "Acciones");
    }

    #[test]
    fn measure_values() {
        assert_eq!(Measure::AmountPyg.value(&row()), dec!(2500000));
        assert_eq!(Measure::AmountPygMillions.value(&row()), dec!(2.5));
    }

    #[test]
    fn titles() {
        assert_eq!(CategoryKey::Currency.title(), "Moneda");
        assert_eq!(CategoryKey::Market.title(), "Mercado");
        assert_eq!(Measure::AmountPygMillions.title(), "Millones de PYG");
        assert_eq!(Measure::AmountPyg.tooltip_format(), ",.0f");
        assert_eq!(Measure::AmountPygMillions.tooltip_format(), ",.1f");
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.data_file, std::path::PathBuf::from("mercado bursatil.xlsx"));
        assert_eq!(
            s.stack_order,
            vec!["Repos", "Mercado Secundario", "Mercado Primario"]
        );
        assert_eq!(s.light_label_categories, vec!["Repos"]);
        assert_eq!(s.chart_height, 420);
        assert!(s.source_url.contains("bcp.gov.py"));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let s = Settings::from_toml_str(
            r#"
            data_file = "datos.csv"
            chart_height = 600
            "#,
        )
        .unwrap();
        assert_eq!(s.data_file, std::path::PathBuf::from("datos.csv"));
        assert_eq!(s.chart_height, 600);
        assert_eq!(s.stack_order, Settings::default().stack_order);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn custom_stack_order() {
        let s = Settings::from_toml_str(r#"stack_order = ["B", "A"]"#).unwrap();
        assert_eq!(s.stack_order, vec!["B", "A"]);
    }

    #[test]
    fn invalid_toml() {
        let err = Settings::from_toml_str("chart_height = \"tall\"").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn zero_height_rejected() {
        let err = Settings::from_toml_str("chart_height = 0").unwrap_err();
        assert!(matches!(err, CoreError::Config(ref m) if m.contains("chart_height")));
    }

    #[test]
    fn duplicate_stack_entry_rejected() {
        let err = Settings::from_toml_str(r#"stack_order = ["Repos", "Repos"]"#).unwrap_err();
        assert!(matches!(err, CoreError::Config(ref m) if m.contains("Repos")));
    }

    #[test]
    fn missing_config_file() {
        let err = Settings::load_from_file("/no/such/bursatil.toml").unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bursatil.toml");
        std::fs::write(&path, "light_label_categories = [\"Repos\", \"Otros\"]\n").unwrap();
        let s = Settings::load_from_file(&path).unwrap();
        assert_eq!(s.light_label_categories, vec!["Repos", "Otros"]);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Chart spec builder
// ═══════════════════════════════════════════════════════════════════

mod chart_builder {
    use super::*;

    fn complete(layout: BarLayout) -> ChartSpecBuilder {
        ChartSpecBuilder::new("t", layout)
            .x(FieldEncoding::ordinal("year"))
            .y(FieldEncoding::quantitative("amount"))
            .color(ColorEncoding::new("category"))
    }

    #[test]
    fn builds_with_required_channels() {
        let spec = complete(BarLayout::Grouped).height(300).build().unwrap();
        assert_eq!(spec.title, "t");
        assert_eq!(spec.height, Some(300));
        assert!(spec.data.is_empty());
        assert!(spec.labels.is_none());
    }

    #[test]
    fn missing_y_fails() {
        let err = ChartSpecBuilder::new("t", BarLayout::Grouped)
            .x(FieldEncoding::ordinal("year"))
            .color(ColorEncoding::new("category"))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(ref m) if m.contains("y")));
    }

    #[test]
    fn missing_color_fails() {
        let err = ChartSpecBuilder::new("t", BarLayout::Stacked)
            .x(FieldEncoding::ordinal("year"))
            .y(FieldEncoding::quantitative("amount"))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(ref m) if m.contains("color")));
    }

    #[test]
    fn grouped_rejects_order_channel() {
        let err = complete(BarLayout::Grouped)
            .order(FieldEncoding::quantitative("draw_order"))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn stacked_rejects_x_offset() {
        let err = complete(BarLayout::Stacked)
            .x_offset("category")
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn tooltips_accumulate_in_order() {
        use bursatil_core::models::chart::{FieldType, TooltipField};
        let spec = complete(BarLayout::Grouped)
            .tooltip(TooltipField::new("year", FieldType::Ordinal, "Año"))
            .tooltip(TooltipField::new("amount", FieldType::Quantitative, "Monto").with_format(",.0f"))
            .build()
            .unwrap();
        assert_eq!(spec.tooltip.len(), 2);
        assert_eq!(spec.tooltip[0].title, "Año");
        assert_eq!(spec.tooltip[1].format.as_deref(), Some(",.0f"));
    }

    #[test]
    fn tab_labels() {
        assert_eq!(ChartTab::CurrencyVolume.label(), "Volumen por moneda");
        assert_eq!(ChartTab::MarketComposition.label(), "Mercado");
        assert_eq!(ChartTab::ALL.len(), 2);
    }
}
