use super::traits::ChartRenderer;
use super::vega_lite::VegaLiteRenderer;
use crate::errors::CoreError;
use crate::models::chart::{ChartSpec, ChartTab};
use crate::models::transaction::TransactionRow;

const EMBED_SCRIPTS: &str = r#"<script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
<script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
<script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>"#;

const STYLE: &str = r#"<style>
body { font-family: sans-serif; margin: 2rem; }
nav a, .tabs button { margin-right: 1rem; }
table { border-collapse: collapse; font-size: 0.85rem; }
th, td { border: 1px solid #ccc; padding: 0.2rem 0.5rem; }
td.num { text-align: right; }
.chart { width: 100%; min-height: 320px; }
.tab { display: none; }
.tab.active { display: block; }
</style>"#;

/// Everything the static dashboard page shows.
#[derive(Debug, Clone)]
pub struct DashboardPage<'a> {
    pub title: &'a str,

    /// Unfiltered source rows for the "Datos" view
    pub rows: &'a [TransactionRow],
    pub source_name: &'a str,
    pub source_url: &'a str,

    /// Human-readable summary of the active selections
    pub selection: String,
    pub charts: Vec<(ChartTab, ChartSpec)>,
}

/// Renders the two dashboard views into one self-contained HTML page:
/// "Datos" (raw table + attribution) and "Mercado bursátil" (chart tabs).
#[derive(Debug, Clone, Default)]
pub struct HtmlDashboardRenderer {
    vega: VegaLiteRenderer,
}

impl HtmlDashboardRenderer {
    pub fn new() -> Self {
        Self {
            vega: VegaLiteRenderer::new(),
        }
    }

    pub fn render_page(&self, page: &DashboardPage<'_>) -> Result<String, CoreError> {
        let mut html = String::new();
        push_head(&mut html, page.title);

        html.push_str("<nav><a href=\"#datos\">Datos</a><a href=\"#mercado\">Mercado bursátil</a></nav>\n");

        html.push_str("<section id=\"datos\">\n<h2>Datos originales</h2>\n");
        push_table(&mut html, page.rows);
        html.push_str(&format!(
            "<p><strong>Fuente</strong><br>Datos oficiales del <a href=\"{}\">{}</a>.</p>\n</section>\n",
            escape(page.source_url),
            escape(page.source_name)
        ));

        html.push_str("<section id=\"mercado\">\n<h2>Mercado bursátil</h2>\n");
        html.push_str(&format!("<p>{}</p>\n", escape(&page.selection)));
        html.push_str("<div class=\"tabs\">");
        for (i, (tab, _)) in page.charts.iter().enumerate() {
            html.push_str(&format!(
                "<button onclick=\"showTab({i})\">{}</button>",
                escape(tab.label())
            ));
        }
        html.push_str("</div>\n");

        let mut embeds = String::new();
        for (i, (tab, spec)) in page.charts.iter().enumerate() {
            let active = if i == 0 { " active" } else { "" };
            html.push_str(&format!(
                "<div class=\"tab{active}\" id=\"tab-{i}\"><h3>{}</h3><div class=\"chart\" id=\"chart-{i}\"></div></div>\n",
                escape(tab.heading())
            ));
            embeds.push_str(&format!(
                "vegaEmbed('#chart-{i}', {});\n",
                script_safe(&self.vega.render(spec)?)
            ));
        }
        html.push_str("</section>\n");

        html.push_str("<script>\n");
        html.push_str(
            "function showTab(n) { document.querySelectorAll('.tab').forEach((t, i) => t.classList.toggle('active', i === n)); }\n",
        );
        html.push_str(&embeds);
        html.push_str("</script>\n</body>\n</html>\n");
        Ok(html)
    }
}

impl ChartRenderer for HtmlDashboardRenderer {
    fn name(&self) -> &str {
        "HTML"
    }

    /// A standalone page holding just this chart.
    fn render(&self, spec: &ChartSpec) -> Result<String, CoreError> {
        let mut html = String::new();
        push_head(&mut html, &spec.title);
        html.push_str("<div class=\"chart\" id=\"chart\"></div>\n<script>\n");
        html.push_str(&format!("vegaEmbed('#chart', {});\n", script_safe(&self.vega.render(spec)?)));
        html.push_str("</script>\n</body>\n</html>\n");
        Ok(html)
    }
}

fn push_head(html: &mut String, title: &str) {
    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"es\">\n<head>\n<meta charset=\"utf-8\">\n<title>{0}</title>\n{EMBED_SCRIPTS}\n{STYLE}\n</head>\n<body>\n<h1>{0}</h1>\n",
        escape(title)
    ));
}

fn push_table(html: &mut String, rows: &[TransactionRow]) {
    html.push_str(
        "<table>\n<thead><tr><th>Periodo</th><th>Moneda</th><th>Mercado</th><th>Instrumento</th><th>Monto en PYG</th></tr></thead>\n<tbody>\n",
    );
    for row in rows {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"num\">{}</td></tr>\n",
            row.period,
            escape(row.currency.display_name()),
            escape(&row.market),
            escape(&row.instrument),
            row.amount_pyg
        ));
    }
    html.push_str("</tbody>\n</table>\n");
}

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// JSON embedded in a `<script>` block must not close the block early.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}
