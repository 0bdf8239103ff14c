//! Bar, line and pie charts drawn as SVG and rasterised with resvg.
//!
//! No text is rendered: titles and labels travel in the surrounding HTML.

use super::error::{ChartError, Result};
use super::spec::{ChartSpec, ChartType};
use super::ChartGenerator;
use std::f64::consts::PI;
use std::fmt::Write;

const DEFAULT_BAR_COLOR: &str = "#7C3AED";
const HIGHLIGHT_COLOR: &str = "#EC4899";
const MUTED_COLOR: &str = "#94A3B8";
const LINE_PALETTE: [&str; 5] = ["#7C3AED", "#EC4899", "#10B981", "#F59E0B", "#3B82F6"];
const PIE_PALETTE: [&str; 12] = [
    "#8DD3C7", "#FFFFB3", "#BEBADA", "#FB8072", "#80B1D3", "#FDB462", "#B3DE69", "#FCCDE5",
    "#D9D9D9", "#BC80BD", "#CCEBC5", "#FFED6F",
];

/// In-process chart renderer producing PNG bytes.
///
/// Colours are `#RRGGBB` strings.
#[derive(Debug, Clone)]
pub struct RasterChartGenerator {
    pub background: String,
    pub axis: String,
    pub grid: String,
}

impl Default for RasterChartGenerator {
    fn default() -> Self {
        RasterChartGenerator {
            background: "#FFFFFF".to_string(),
            axis: "#64748B".to_string(),
            grid: "#E2E8F0".to_string(),
        }
    }
}

impl ChartGenerator for RasterChartGenerator {
    fn render_png(&self, spec: &ChartSpec) -> Result<Vec<u8>> {
        let svg = self.render_svg(spec)?;
        let tree = usvg::Tree::from_str(&svg, &usvg::Options::default())
            .map_err(|e| ChartError::Render(format!("SVG parsing failed: {}", e)))?;
        let mut pixmap = tiny_skia::Pixmap::new(spec.width, spec.height).ok_or_else(|| {
            ChartError::Render(format!("Failed to create pixmap ({}x{})", spec.width, spec.height))
        })?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
        log::debug!(
            "Rendered {} chart '{}' at {}x{}",
            spec.chart_type,
            spec.title,
            spec.width,
            spec.height
        );
        pixmap
            .encode_png()
            .map_err(|e| ChartError::Render(format!("PNG encoding failed: {}", e)))
    }
}

impl RasterChartGenerator {
    /// The chart as a standalone SVG document of `spec.width` x `spec.height`.
    pub fn render_svg(&self, spec: &ChartSpec) -> Result<String> {
        let area = PlotArea::inside(spec.width, spec.height);
        let mut svg = String::new();
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = spec.width,
            h = spec.height
        )?;
        writeln!(svg, "<title>{}</title>", escape_xml(&spec.title))?;
        writeln!(
            svg,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="{}"/>"#,
            spec.width,
            spec.height,
            color_or(&self.background, "#FFFFFF")
        )?;
        match spec.chart_type {
            ChartType::Bar => self.write_bars(&mut svg, spec, &area)?,
            ChartType::Line => self.write_lines(&mut svg, spec, &area)?,
            ChartType::Pie => write_pie(&mut svg, spec, &area)?,
        }
        svg.push_str("</svg>\n");
        Ok(svg)
    }

    fn write_bars(&self, svg: &mut String, spec: &ChartSpec, area: &PlotArea) -> Result<()> {
        let points = spec.points();
        if points.is_empty() {
            return Err(ChartError::EmptyData);
        }
        let (lo, hi) = value_range(points.iter().map(|(_, v)| *v), true);
        let colors = bar_colors(spec, &points);

        self.write_grid(svg, area)?;
        let slot = area.width() / points.len() as f64;
        let zero = area.y_of(0.0, lo, hi);
        for (i, ((_, value), color)) in points.iter().zip(colors).enumerate() {
            let x = area.left + slot * i as f64 + slot * 0.2;
            let y = area.y_of(*value, lo, hi);
            writeln!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"/>"#,
                x,
                y.min(zero),
                slot * 0.6,
                (y - zero).abs(),
                color
            )?;
        }
        self.write_axes(svg, area, zero)
    }

    fn write_lines(&self, svg: &mut String, spec: &ChartSpec, area: &PlotArea) -> Result<()> {
        let longest = spec.data.values().map(Vec::len).max().unwrap_or(0);
        if longest == 0 {
            return Err(ChartError::EmptyData);
        }
        let (lo, hi) = value_range(spec.data.values().flatten().copied(), false);
        let palette = palette(&spec.colors, &LINE_PALETTE);

        self.write_grid(svg, area)?;
        let step = if longest > 1 {
            area.width() / (longest - 1) as f64
        } else {
            0.0
        };
        for (idx, values) in spec.data.values().enumerate() {
            let color = &palette[idx % palette.len()];
            let coords: Vec<(f64, f64)> = values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    let x = if longest > 1 {
                        area.left + step * i as f64
                    } else {
                        area.left + area.width() / 2.0
                    };
                    (x, area.y_of(*v, lo, hi))
                })
                .collect();
            if coords.len() > 1 {
                let points: Vec<String> = coords.iter().map(|(x, y)| format!("{:.2},{:.2}", x, y)).collect();
                writeln!(
                    svg,
                    r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="3" stroke-linejoin="round"/>"#,
                    points.join(" "),
                    color
                )?;
            }
            for (x, y) in coords {
                writeln!(svg, r#"<circle cx="{:.2}" cy="{:.2}" r="4" fill="{}"/>"#, x, y, color)?;
            }
        }
        self.write_axes(svg, area, area.bottom)
    }

    fn write_grid(&self, svg: &mut String, area: &PlotArea) -> Result<()> {
        let grid = color_or(&self.grid, "#E2E8F0");
        for i in 0..=4 {
            let y = area.top + area.height() * i as f64 / 4.0;
            writeln!(
                svg,
                r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="1"/>"#,
                area.left, y, area.right, y, grid
            )?;
        }
        Ok(())
    }

    /// The x axis at `baseline` and the y axis along the left edge.
    fn write_axes(&self, svg: &mut String, area: &PlotArea, baseline: f64) -> Result<()> {
        let axis = color_or(&self.axis, "#64748B");
        writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="2"/>"#,
            area.left, baseline, area.right, baseline, axis
        )?;
        writeln!(
            svg,
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="2"/>"#,
            area.left, area.top, area.left, area.bottom, axis
        )?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct PlotArea {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
}

impl PlotArea {
    fn inside(width: u32, height: u32) -> Self {
        let mx = (width as f64 * 0.1).max(8.0);
        let my = (height as f64 * 0.1).max(8.0);
        PlotArea {
            left: mx,
            top: my,
            right: width as f64 - mx,
            bottom: height as f64 - my,
        }
    }

    fn width(&self) -> f64 {
        self.right - self.left
    }

    fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Maps `value` within `[lo, hi]` to a y coordinate.
    fn y_of(&self, value: f64, lo: f64, hi: f64) -> f64 {
        self.bottom - (value - lo) / (hi - lo) * self.height()
    }
}

/// Wedges clockwise from twelve o'clock.
fn write_pie(svg: &mut String, spec: &ChartSpec, area: &PlotArea) -> Result<()> {
    let slices: Vec<f64> = spec.points().into_iter().map(|(_, v)| v.max(0.0)).collect();
    let total: f64 = slices.iter().sum();
    if total <= 0.0 {
        return Err(ChartError::EmptyData);
    }
    let palette = palette(&spec.colors, &PIE_PALETTE);

    let cx = area.left + area.width() / 2.0;
    let cy = area.top + area.height() / 2.0;
    let r = area.width().min(area.height()) / 2.0;
    let at = |fraction: f64| {
        let angle = fraction * 2.0 * PI - PI / 2.0;
        (cx + r * angle.cos(), cy + r * angle.sin())
    };

    let mut start = 0.0;
    for (i, value) in slices.iter().enumerate() {
        let fraction = value / total;
        if fraction <= 0.0 {
            continue;
        }
        let color = &palette[i % palette.len()];
        if fraction >= 0.9999 {
            writeln!(svg, r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}"/>"#, cx, cy, r, color)?;
            break;
        }
        let (x0, y0) = at(start);
        let (x1, y1) = at(start + fraction);
        let large_arc = if fraction > 0.5 { 1 } else { 0 };
        writeln!(
            svg,
            r#"<path d="M {:.2} {:.2} L {:.2} {:.2} A {:.2} {:.2} 0 {} 1 {:.2} {:.2} Z" fill="{}"/>"#,
            cx, cy, x0, y0, r, r, large_arc, x1, y1, color
        )?;
        start += fraction;
    }
    Ok(())
}

/// Per-bar colours: an exact-length `colors` list wins, then highlighting,
/// then the single `color`.
fn bar_colors(spec: &ChartSpec, points: &[(&str, f64)]) -> Vec<String> {
    if !spec.colors.is_empty() && spec.colors.len() == points.len() {
        return spec.colors.iter().map(|c| color_or(c, DEFAULT_BAR_COLOR)).collect();
    }
    if !spec.highlighted_items.is_empty() {
        return points
            .iter()
            .map(|(label, _)| {
                if spec.highlighted_items.iter().any(|h| h == label) {
                    HIGHLIGHT_COLOR.to_string()
                } else {
                    MUTED_COLOR.to_string()
                }
            })
            .collect();
    }
    let single = color_or(spec.color.as_deref().unwrap_or(""), DEFAULT_BAR_COLOR);
    vec![single; points.len()]
}

fn palette(colors: &[String], default: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = colors.iter().filter_map(|c| parse_hex_color(c)).collect();
    if parsed.is_empty() {
        default.iter().map(|c| c.to_string()).collect()
    } else {
        parsed
    }
}

fn value_range(values: impl Iterator<Item = f64>, include_zero: bool) -> (f64, f64) {
    let (mut lo, mut hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if (hi - lo).abs() < f64::EPSILON {
        hi = lo + 1.0;
    }
    (lo, hi)
}

/// Normalizes `#RGB` or `#RRGGBB`, with or without the leading `#`, to
/// upper-case `#RRGGBB`.
pub fn parse_hex_color(text: &str) -> Option<String> {
    let hex = text.trim().trim_start_matches('#');
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    if !expanded.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", expanded.to_ascii_uppercase()))
}

fn color_or(text: &str, default: &str) -> String {
    parse_hex_color(text).unwrap_or_else(|| default.to_string())
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
