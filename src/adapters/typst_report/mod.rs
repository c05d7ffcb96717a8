//! Typst dashboard report generation.
//!
//! Orchestrates placeholder resolution: takes a Typst template (either the
//! built-in default or a custom file via `[report] template_path`), resolves
//! all `{{PLACEHOLDER}}` markers by calling helpers from `chart_svg` and
//! `tables`, and writes the final `.typ` file.

pub mod chart_svg;
pub mod default_template;
pub mod tables;

use std::fs;
use std::path::Path;

use crate::domain::cycle::DashboardSnapshot;
use crate::domain::error::SentinelError;
use crate::ports::config_port::ConfigPort;
use crate::ports::report_port::ReportPort;

fn embed_svg(svg: &str) -> String {
    format!(
        "#image.decode(\n\"{}\",\n  width: 100%,\n)",
        svg.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

fn render_price_charts(snapshot: &DashboardSnapshot) -> String {
    if snapshot.charts.is_empty() {
        return "_No price data._".to_string();
    }

    let mut output = String::new();
    for series in &snapshot.charts {
        let svg = chart_svg::generate_price_svg(series);
        if svg.is_empty() {
            continue;
        }
        output.push_str(&format!("=== {}\n\n", tables::escape(&series.ticker)));
        output.push_str(&embed_svg(&svg));
        output.push_str("\n\n");
    }
    output
}

/// Resolve all `{{PLACEHOLDER}}`s in the given template string and return
/// the final Typst markup ready to be written to a `.typ` file.
pub fn resolve(template: &str, snapshot: &DashboardSnapshot) -> String {
    let mut output = template.to_string();

    let generated = snapshot.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    output = output.replace("{{GENERATED_AT}}", &generated);

    output = output.replace("{{NOTICES}}", &tables::format_notices(&snapshot.notices));

    let watchlist = tables::format_watchlist_table(&snapshot.rows);
    output = output.replace("{{WATCHLIST_TABLE}}", &watchlist);

    let positions = tables::format_positions_table(&snapshot.portfolio);
    output = output.replace("{{POSITIONS_TABLE}}", &positions);

    let totals = tables::format_pnl_totals(&snapshot.portfolio);
    output = output.replace("{{PNL_TOTALS}}", &totals);

    output = output.replace("{{PRICE_CHARTS}}", &render_price_charts(snapshot));

    let trade_log = tables::format_trade_log(&snapshot.trades);
    output = output.replace("{{TRADE_LOG}}", &trade_log);

    output
}

/// Renders snapshots through a Typst template.
#[derive(Debug, Clone, Default)]
pub struct TypstReportAdapter {
    /// Custom template text; the built-in template is used when `None`.
    template: Option<String>,
}

impl TypstReportAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(template: impl Into<String>) -> Self {
        Self {
            template: Some(template.into()),
        }
    }

    /// Loads the custom template named by `[report] template_path`, if any.
    /// A relative path is taken from `base_dir`.
    pub fn from_config(config: &dyn ConfigPort, base_dir: &Path) -> Result<Self, SentinelError> {
        match config.get_string("report", "template_path") {
            Some(raw) => {
                let path = base_dir.join(raw.trim());
                let content = fs::read_to_string(&path).map_err(|e| SentinelError::DataSource {
                    path: path.display().to_string(),
                    reason: format!("failed to read template: {}", e),
                })?;
                Ok(Self::with_template(content))
            }
            None => Ok(Self::new()),
        }
    }
}

impl ReportPort for TypstReportAdapter {
    fn render(&self, snapshot: &DashboardSnapshot) -> String {
        let template = self
            .template
            .as_deref()
            .unwrap_or(default_template::template());
        resolve(template, snapshot)
    }
}
