//! Chart artifacts for the analysis tools.
//!
//! Charts are written as self-contained SVG documents under the configured
//! plot directory. Tools embed the returned path behind a `[VISUALIZATION]:`
//! marker; nothing in the agent parses the artifact itself.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use super::errors::ToolError;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;
const MARGIN_LEFT: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 70.0;
const MARGIN_TOP: f64 = 50.0;

/// Render a vertical bar chart and return the written file's path.
///
/// `file_stem` becomes `<plot_dir>/<file_stem>.svg`. The plot directory is
/// created if missing. Values are labeled above each bar with two decimals.
pub fn render_bar_chart(
    plot_dir: &Path,
    file_stem: &str,
    title: &str,
    bars: &[(String, f64)],
) -> Result<PathBuf, ToolError> {
    let path = plot_dir.join(format!("{file_stem}.svg"));

    std::fs::create_dir_all(plot_dir).map_err(|e| ToolError::ChartError {
        path: path.display().to_string(),
        reason: format!("failed to create plot dir: {e}"),
    })?;

    let svg = build_bar_chart_svg(title, bars);
    std::fs::write(&path, svg).map_err(|e| ToolError::ChartError {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    tracing::debug!(path = %path.display(), bars = bars.len(), "chart written");
    Ok(path)
}

fn build_bar_chart_svg(title: &str, bars: &[(String, f64)]) -> String {
    let plot_width = WIDTH - MARGIN_LEFT - 20.0;
    let plot_height = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let max_value = bars
        .iter()
        .map(|(_, v)| *v)
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    );
    let _ = write!(
        svg,
        r#"<rect width="{WIDTH}" height="{HEIGHT}" fill="white"/><text x="{x}" y="28" text-anchor="middle" font-family="sans-serif" font-size="16">{title}</text>"#,
        x = WIDTH / 2.0,
        title = escape_text(title),
    );
    // Axes
    let axis_y = HEIGHT - MARGIN_BOTTOM;
    let _ = write!(
        svg,
        r#"<line x1="{MARGIN_LEFT}" y1="{MARGIN_TOP}" x2="{MARGIN_LEFT}" y2="{axis_y}" stroke="black"/><line x1="{MARGIN_LEFT}" y1="{axis_y}" x2="{x2}" y2="{axis_y}" stroke="black"/>"#,
        x2 = WIDTH - 20.0,
    );

    let n = bars.len().max(1) as f64;
    let slot = plot_width / n;
    let bar_width = (slot * 0.6).min(80.0);

    for (i, (label, value)) in bars.iter().enumerate() {
        let height = (value / max_value) * plot_height;
        let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_width) / 2.0;
        let y = axis_y - height;
        let center = x + bar_width / 2.0;
        let _ = write!(
            svg,
            r#"<rect x="{x:.1}" y="{y:.1}" width="{bar_width:.1}" height="{height:.1}" fill="coral"/>"#
        );
        let _ = write!(
            svg,
            r#"<text x="{center:.1}" y="{vy:.1}" text-anchor="middle" font-family="sans-serif" font-size="12">{value:.2}</text>"#,
            vy = y - 6.0,
        );
        let _ = write!(
            svg,
            r#"<text x="{center:.1}" y="{ly:.1}" text-anchor="middle" font-family="sans-serif" font-size="12">{label}</text>"#,
            ly = axis_y + 18.0,
            label = escape_text(label),
        );
    }

    svg.push_str("</svg>");
    svg
}

/// Minimal XML text escaping for labels and titles.
fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ─── Tests ──────────────────────────────────────────────────────────────────
