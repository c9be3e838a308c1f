//! Paraguay stock-market dashboard CLI.
//!
//! # Usage
//!
//! ```bash
//! # Raw data table
//! bursatil --file "mercado bursatil.xlsx" data
//!
//! # Months with data
//! bursatil months
//!
//! # Volume by currency, January through June, as Vega-Lite JSON
//! bursatil currency --month Junio --output moneda.vl.json
//!
//! # Stacked market composition, guaraní rows only
//! bursatil market --currency pyg --output mercado.vl.json
//!
//! # Volume per instrument through March
//! bursatil instruments --month marzo
//!
//! # Full HTML dashboard
//! bursatil report --output dashboard.html
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bursatil_core::models::chart::ChartSpec;
use bursatil_core::models::filter::CurrencyFilter;
use bursatil_core::models::settings::Settings;
use bursatil_core::renderers::html::HtmlDashboardRenderer;
use bursatil_core::renderers::traits::ChartRenderer;
use bursatil_core::renderers::vega_lite::VegaLiteRenderer;
use bursatil_core::MarketDashboard;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

mod views;

/// Config file picked up from the working directory when `--config` is absent.
const DEFAULT_CONFIG: &str = "bursatil.toml";

#[derive(Parser)]
#[command(name = "bursatil")]
#[command(about = "Mercado bursátil Paraguay - volume charts with year-over-year change", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file (default: ./bursatil.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Transaction spreadsheet (.xlsx, .xls, .ods or .csv); overrides the config
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the unfiltered source rows
    Data,

    /// List the months available as cutoffs
    Months,

    /// Volume per year and currency (grouped bars)
    Currency {
        /// Accumulate January through this month (name or 1-12; default: latest)
        #[arg(short, long)]
        month: Option<String>,

        /// Write the chart here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::VegaLite)]
        format: OutputFormat,
    },

    /// Volume per year and market type (stacked bars)
    Market {
        /// Accumulate January through this month (name or 1-12; default: latest)
        #[arg(short, long)]
        month: Option<String>,

        /// Currency filter: ambas, pyg or usd
        #[arg(long, default_value = "ambas")]
        currency: CurrencyFilter,

        /// Write the chart here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = OutputFormat::VegaLite)]
        format: OutputFormat,
    },

    /// Volume per year and instrument, with year-over-year change
    Instruments {
        /// Accumulate January through this month (name or 1-12; default: latest)
        #[arg(short, long)]
        month: Option<String>,

        /// Currency filter: ambas, pyg or usd
        #[arg(long, default_value = "ambas")]
        currency: CurrencyFilter,
    },

    /// Write the whole dashboard as a static HTML page
    Report {
        /// Accumulate January through this month (name or 1-12; default: latest)
        #[arg(short, long)]
        month: Option<String>,

        /// Currency filter for the market tab: ambas, pyg or usd
        #[arg(long, default_value = "ambas")]
        currency: CurrencyFilter,

        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Vega-Lite v5 JSON
    VegaLite,
    /// Standalone HTML page
    Html,
}

impl OutputFormat {
    fn renderer(self) -> Box<dyn ChartRenderer> {
        match self {
            OutputFormat::VegaLite => Box::new(VegaLiteRenderer::new().pretty()),
            OutputFormat::Html => Box::new(HtmlDashboardRenderer::new()),
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so chart documents on stdout stay machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bursatil=info,bursatil_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref(), cli.file)?;
    let data_file = settings.data_file.clone();
    let dashboard = MarketDashboard::open(settings)
        .with_context(|| format!("Cannot load market data from '{}'", data_file.display()))?;

    match cli.command {
        Commands::Data => {
            println!("{}", views::data_table(dashboard.raw_rows()));
            println!("{}", views::coverage_line(dashboard.dataset()));
            println!(
                "Fuente: datos oficiales del {} ({})",
                dashboard.settings().source_name,
                dashboard.settings().source_url
            );
        }

        Commands::Months => {
            println!("{}", views::month_table(&dashboard.months_available()));
        }

        Commands::Currency {
            month,
            output,
            format,
        } => {
            let cutoff = dashboard.resolve_cutoff(month.as_deref())?;
            let spec = dashboard.currency_volume_chart(cutoff)?;
            emit_chart(&dashboard, &spec, format, output.as_deref(), || {
                Ok(views::series_table(&dashboard.currency_volume_series(cutoff)?))
            })?;
        }

        Commands::Market {
            month,
            currency,
            output,
            format,
        } => {
            let cutoff = dashboard.resolve_cutoff(month.as_deref())?;
            let spec = dashboard.market_composition_chart(cutoff, currency)?;
            emit_chart(&dashboard, &spec, format, output.as_deref(), || {
                Ok(views::stacked_table(
                    &dashboard.market_composition_series(cutoff, currency)?,
                ))
            })?;
        }

        Commands::Instruments { month, currency } => {
            let cutoff = dashboard.resolve_cutoff(month.as_deref())?;
            let series = dashboard.instrument_series(cutoff, currency)?;
            println!("{}", views::series_table(&series));
        }

        Commands::Report {
            month,
            currency,
            output,
        } => {
            let cutoff = dashboard.resolve_cutoff(month.as_deref())?;
            let html = dashboard.render_report(cutoff, currency)?;
            std::fs::write(&output, html)
                .with_context(|| format!("Cannot write report to '{}'", output.display()))?;
            info!(path = %output.display(), "dashboard written");
        }
    }

    Ok(())
}

/// Settings from `--config`, else `./bursatil.toml`, else defaults;
/// `--file` wins over the configured data file.
fn load_settings(config: Option<&Path>, file: Option<PathBuf>) -> Result<Settings> {
    let mut settings = match config {
        Some(path) => Settings::load_from_file(path)?,
        None if Path::new(DEFAULT_CONFIG).is_file() => Settings::load_from_file(DEFAULT_CONFIG)?,
        None => Settings::default(),
    };
    if let Some(file) = file {
        settings.data_file = file;
    }
    Ok(settings)
}

/// With `--output`, write the document there and print the series table;
/// without it, print only the document.
fn emit_chart(
    dashboard: &MarketDashboard<'_>,
    spec: &ChartSpec,
    format: OutputFormat,
    output: Option<&Path>,
    summary: impl FnOnce() -> Result<String>,
) -> Result<()> {
    let renderer = format.renderer();
    let document = dashboard.render_chart(spec, renderer.as_ref())?;
    match output {
        Some(path) => {
            std::fs::write(path, document)
                .with_context(|| format!("Cannot write chart to '{}'", path.display()))?;
            println!("{}", summary()?);
            info!(path = %path.display(), "chart written");
        }
        None => println!("{document}"),
    }
    Ok(())
}
