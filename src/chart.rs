//! Bar charts of records per category.
//!
//! The dashboard embeds the SVG version; the CLI prints the text version.

use crate::types::CategoryCount;
use std::fmt::Write;

pub const CHART_TITLE: &str = "Records by category";

const BAR_COLOR: &str = "#87ceeb";
const SVG_WIDTH: u32 = 560;
const SVG_HEIGHT: u32 = 320;
const MARGIN_LEFT: u32 = 48;
const MARGIN_RIGHT: u32 = 16;
const MARGIN_TOP: u32 = 40;
const MARGIN_BOTTOM: u32 = 90;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render an SVG bar chart with one bar per category and rotated labels.
///
/// Returns an empty string when there is nothing to plot.
pub fn render_svg_bar_chart(counts: &[CategoryCount]) -> String {
    if counts.is_empty() {
        return String::new();
    }

    let max = counts.iter().map(|c| c.count).max().unwrap_or(0).max(1);
    let plot_w = SVG_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = SVG_HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let slot = plot_w as f64 / counts.len() as f64;
    let bar_w = slot * 0.7;
    let baseline = (MARGIN_TOP + plot_h) as f64;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg class="chart" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" role="img" aria-label="{title}">"#,
        w = SVG_WIDTH,
        h = SVG_HEIGHT,
        title = CHART_TITLE
    );
    let _ = write!(
        svg,
        r#"<text x="{x}" y="24" text-anchor="middle" class="chart-title">{title}</text>"#,
        x = SVG_WIDTH / 2,
        title = CHART_TITLE
    );

    // Axes
    let _ = write!(
        svg,
        r##"<line x1="{l}" y1="{t}" x2="{l}" y2="{b}" stroke="#666"/><line x1="{l}" y1="{b}" x2="{r}" y2="{b}" stroke="#666"/>"##,
        l = MARGIN_LEFT,
        t = MARGIN_TOP,
        b = baseline,
        r = SVG_WIDTH - MARGIN_RIGHT
    );
    let _ = write!(
        svg,
        r#"<text x="{x}" y="{y}" text-anchor="end" class="chart-tick">{max}</text><text x="{x}" y="{b}" text-anchor="end" class="chart-tick">0</text>"#,
        x = MARGIN_LEFT - 6,
        y = MARGIN_TOP + 4,
        b = baseline + 4.0,
        max = max
    );

    for (i, c) in counts.iter().enumerate() {
        let h = plot_h as f64 * c.count as f64 / max as f64;
        let x = MARGIN_LEFT as f64 + slot * i as f64 + (slot - bar_w) / 2.0;
        let y = baseline - h;
        let cx = x + bar_w / 2.0;
        let label = escape(c.category.label());

        let _ = write!(
            svg,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_w:.1}" height="{h:.1}" fill="{BAR_COLOR}"><title>{label}: {count}</title></rect>"#,
            count = c.count
        );
        let _ = write!(
            svg,
            r#"<text x="{cx:.1}" y="{ty:.1}" text-anchor="middle" class="chart-value">{count}</text>"#,
            ty = y - 4.0,
            count = c.count
        );
        let _ = write!(
            svg,
            r#"<text x="{cx:.1}" y="{ly:.1}" text-anchor="end" transform="rotate(-45 {cx:.1} {ly:.1})" class="chart-label">{label}</text>"#,
            ly = baseline + 14.0
        );
    }

    svg.push_str("</svg>");
    svg
}

/// Render a text bar chart, scaling the longest bar to `width` cells.
pub fn render_text_bar_chart(counts: &[CategoryCount], width: usize) -> String {
    if counts.is_empty() {
        return String::new();
    }

    let max = counts.iter().map(|c| c.count).max().unwrap_or(0).max(1);
    let label_w = counts
        .iter()
        .map(|c| c.category.label().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{}", CHART_TITLE);
    for c in counts {
        let mut len = (c.count as f64 / max as f64 * width as f64).round() as usize;
        if c.count > 0 && len == 0 {
            len = 1;
        }
        let _ = writeln!(
            out,
            "{:<label_w$}  {} {}",
            c.category.label(),
            "█".repeat(len),
            c.count,
        );
    }
    out
}
