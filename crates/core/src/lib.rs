pub mod errors;
pub mod models;
pub mod renderers;
pub mod services;
pub mod storage;

use models::{
    chart::{ChartSpec, ChartTab},
    filter::{month_label, CurrencyFilter, MonthOption},
    series::{CategoryKey, Measure, SeriesPoint, StackedSeriesPoint},
    settings::Settings,
    transaction::{Dataset, TransactionRow},
};
use renderers::html::{DashboardPage, HtmlDashboardRenderer};
use renderers::traits::ChartRenderer;
use services::{
    aggregation_service::AggregationService, chart_service::ChartService,
    filter_service::FilterService, stack_service::StackService,
};
use storage::loader::DatasetLoader;
use tracing::info;

use errors::CoreError;

/// Dashboard page title.
pub const DASHBOARD_TITLE: &str = "Mercado bursátil Paraguay";

/// Main entry point for the dashboard core.
///
/// Borrows the read-only dataset and recomputes every view from scratch on
/// each call: nothing derived outlives the request that produced it.
#[must_use]
pub struct MarketDashboard<'a> {
    dataset: &'a Dataset,
    settings: Settings,
    filter_service: FilterService,
    aggregation_service: AggregationService,
    stack_service: StackService,
    chart_service: ChartService,
}

impl std::fmt::Debug for MarketDashboard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDashboard")
            .field("source", &self.dataset.source())
            .field("rows", &self.dataset.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl MarketDashboard<'static> {
    /// Load `settings.data_file` through the process-wide cache and open a dashboard on it.
    pub fn open(settings: Settings) -> Result<Self, CoreError> {
        let dataset = DatasetLoader::load(&settings.data_file)?;
        Ok(Self::build(dataset, settings))
    }
}

impl<'a> MarketDashboard<'a> {
    /// Open a dashboard on an already loaded dataset.
    pub fn with_dataset(dataset: &'a Dataset, settings: Settings) -> Self {
        Self::build(dataset, settings)
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        self.dataset
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    // ── Data view ───────────────────────────────────────────────────

    /// All source rows, unfiltered, in file order.
    #[must_use]
    pub fn raw_rows(&self) -> &[TransactionRow] {
        self.dataset.rows()
    }

    // ── Selections ──────────────────────────────────────────────────

    /// Month options for the "accumulated through" selector.
    #[must_use]
    pub fn months_available(&self) -> Vec<MonthOption> {
        self.filter_service.months_available(self.dataset)
    }

    /// Resolve the month selector; `None` means the latest month with data.
    pub fn resolve_cutoff(&self, label: Option<&str>) -> Result<u32, CoreError> {
        self.filter_service.resolve_cutoff(self.dataset, label)
    }

    // ── Series ──────────────────────────────────────────────────────

    /// Volume per (year, currency) in millions of guaraníes, January through `cutoff`.
    pub fn currency_volume_series(&self, cutoff: u32) -> Result<Vec<SeriesPoint>, CoreError> {
        let rows = self
            .filter_service
            .resolve(self.dataset, cutoff, CurrencyFilter::Both);
        self.aggregation_service
            .aggregate(rows, CategoryKey::Currency, Measure::AmountPygMillions)
    }

    /// Volume per (year, market) in guaraníes, stacked in the configured order.
    pub fn market_composition_series(
        &self,
        cutoff: u32,
        currency: CurrencyFilter,
    ) -> Result<Vec<StackedSeriesPoint>, CoreError> {
        let rows = self.filter_service.resolve(self.dataset, cutoff, currency);
        let points = self
            .aggregation_service
            .aggregate(rows, CategoryKey::Market, Measure::AmountPyg)?;
        self.stack_service
            .with_stack_order(&points, &self.settings.stack_order)
    }

    /// Volume per (year, instrument) in millions of guaraníes.
    pub fn instrument_series(
        &self,
        cutoff: u32,
        currency: CurrencyFilter,
    ) -> Result<Vec<SeriesPoint>, CoreError> {
        let rows = self.filter_service.resolve(self.dataset, cutoff, currency);
        self.aggregation_service
            .aggregate(rows, CategoryKey::Instrument, Measure::AmountPygMillions)
    }

    // ── Charts ──────────────────────────────────────────────────────

    /// The "Volumen por moneda" chart.
    pub fn currency_volume_chart(&self, cutoff: u32) -> Result<ChartSpec, CoreError> {
        let points = self.currency_volume_series(cutoff)?;
        self.chart_service.currency_volume_chart(&points)
    }

    /// The "Mercado" chart.
    pub fn market_composition_chart(
        &self,
        cutoff: u32,
        currency: CurrencyFilter,
    ) -> Result<ChartSpec, CoreError> {
        let points = self.market_composition_series(cutoff, currency)?;
        self.chart_service
            .market_composition_chart(&points, &self.settings)
    }

    /// Build one chart tab.
    pub fn chart(
        &self,
        tab: ChartTab,
        cutoff: u32,
        currency: CurrencyFilter,
    ) -> Result<ChartSpec, CoreError> {
        match tab {
            ChartTab::CurrencyVolume => self.currency_volume_chart(cutoff),
            ChartTab::MarketComposition => self.market_composition_chart(cutoff, currency),
        }
    }

    /// Render a chart with any renderer.
    pub fn render_chart(
        &self,
        spec: &ChartSpec,
        renderer: &dyn ChartRenderer,
    ) -> Result<String, CoreError> {
        let out = renderer.render(spec)?;
        info!(
            renderer = renderer.name(),
            chart = %spec.title,
            points = spec.data.len(),
            "rendered chart"
        );
        Ok(out)
    }

    // ── Report ──────────────────────────────────────────────────────

    /// The whole dashboard (raw data view + both chart tabs) as one HTML page.
    /// The currency filter applies to the market tab only.
    pub fn render_report(&self, cutoff: u32, currency: CurrencyFilter) -> Result<String, CoreError> {
        let charts = ChartTab::ALL
            .iter()
            .map(|tab| Ok((*tab, self.chart(*tab, cutoff, currency)?)))
            .collect::<Result<Vec<_>, CoreError>>()?;

        let page = DashboardPage {
            title: DASHBOARD_TITLE,
            rows: self.dataset.rows(),
            source_name: &self.settings.source_name,
            source_url: &self.settings.source_url,
            selection: format!(
                "Acumulado Enero – {} · Moneda (Mercado): {}",
                month_label(cutoff).unwrap_or("?"),
                currency
            ),
            charts,
        };
        HtmlDashboardRenderer::new().render_page(&page)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(dataset: &'a Dataset, settings: Settings) -> Self {
        Self {
            dataset,
            settings,
            filter_service: FilterService::new(),
            aggregation_service: AggregationService::new(),
            stack_service: StackService::new(),
            chart_service: ChartService::new(),
        }
    }
}
