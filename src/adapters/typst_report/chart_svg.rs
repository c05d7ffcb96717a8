//! SVG line charts for ticker price histories.

use rust_decimal::prelude::ToPrimitive;

use crate::domain::price::ChartSeries;

const WIDTH: f64 = 500.0;
const HEIGHT: f64 = 150.0;
const PADDING: f64 = 30.0;

/// Render a close-price line chart, or an empty string when there is nothing
/// to draw.
pub fn generate_price_svg(series: &ChartSeries) -> String {
    if series.bars.is_empty() {
        return String::new();
    }

    let closes: Vec<f64> = series
        .bars
        .iter()
        .map(|b| b.close.to_f64().unwrap_or(0.0))
        .collect();
    let min = closes.iter().copied().fold(f64::INFINITY, f64::min);
    let max = closes.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let plot_width = WIDTH - 2.0 * PADDING;
    let plot_height = HEIGHT - 2.0 * PADDING;

    let range = max - min;
    let scale_y = if range > 0.0 { plot_height / range } else { 0.0 };
    let scale_x = if closes.len() > 1 {
        plot_width / (closes.len() - 1) as f64
    } else {
        0.0
    };
    // flat series sit mid-plot
    let offset_y = if range > 0.0 { 0.0 } else { plot_height / 2.0 };

    let points: Vec<String> = closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let x = PADDING + i as f64 * scale_x;
            let y = HEIGHT - PADDING - offset_y - (close - min) * scale_y;
            format!("{:.1},{:.1}", x, y)
        })
        .collect();

    let first_date = series.bars.first().map(|b| b.date.to_string()).unwrap_or_default();
    let last_date = series.bars.last().map(|b| b.date.to_string()).unwrap_or_default();

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        w = WIDTH,
        h = HEIGHT
    );
    svg.push_str(&format!(
        r##"<rect width="{:.0}" height="{:.0}" fill="#ffffff"/>"##,
        WIDTH, HEIGHT
    ));
    svg.push_str(&format!(
        r##"<line x1="{p:.0}" y1="{b:.0}" x2="{r:.0}" y2="{b:.0}" stroke="#999999" stroke-width="1"/>"##,
        p = PADDING,
        b = HEIGHT - PADDING,
        r = WIDTH - PADDING
    ));
    svg.push_str(&format!(
        r##"<polyline fill="none" stroke="#1f77b4" stroke-width="2" points="{}"/>"##,
        points.join(" ")
    ));
    svg.push_str(&format!(
        r#"<text x="{:.0}" y="{:.0}" font-size="10">{:.2}</text>"#,
        2.0,
        PADDING - 8.0,
        max
    ));
    svg.push_str(&format!(
        r#"<text x="{:.0}" y="{:.0}" font-size="10">{:.2}</text>"#,
        2.0,
        HEIGHT - 8.0,
        min
    ));
    svg.push_str(&format!(
        r#"<text x="{:.0}" y="{:.0}" font-size="10">{}</text>"#,
        PADDING,
        HEIGHT - PADDING + 14.0,
        first_date
    ));
    svg.push_str(&format!(
        r#"<text x="{:.0}" y="{:.0}" font-size="10" text-anchor="end">{}</text>"#,
        WIDTH - PADDING,
        HEIGHT - PADDING + 14.0,
        last_date
    ));
    svg.push_str("</svg>");
    svg
}
