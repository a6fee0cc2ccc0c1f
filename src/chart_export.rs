//! Chart rendering to PNG (plotters bitmap) and EPS (minimal PostScript, no deps).
//!
//! Consumes a [`RankedResult`]: line charts place numeric group keys on a
//! continuous axis; bar charts get one slot per group with the key label on
//! the axis. Horizontal bars list groups top-down in result order.

use color_eyre::Result;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::aggregate::RankedResult;

const PNG_SIZE: (u32, u32) = (960, 640);

/// Shape of the rendered chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    #[serde(rename = "barh")]
    BarHorizontal,
}

/// Export format for a chart file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ChartExportFormat {
    Png,
    Eps,
}

impl ChartExportFormat {
    pub const ALL: [Self; 2] = [Self::Png, Self::Eps];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Eps => "eps",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Eps => "EPS",
        }
    }
}

/// Title and axis labels for one chart. `palette_index` rotates through the
/// fixed series palette.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub palette_index: usize,
}

impl ChartStyle {
    pub fn new(title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            palette_index: 0,
        }
    }
}

/// Fixed series palette (RGB 0-255), shared by both backends.
const PALETTE: [(u8, u8, u8); 6] = [
    (255, 140, 0),  // dark orange
    (70, 130, 180), // steel blue
    (218, 165, 32), // goldenrod
    (46, 139, 87),  // sea green
    (205, 92, 92),  // indian red
    (106, 90, 205), // slate blue
];

fn palette_color(index: usize) -> (u8, u8, u8) {
    PALETTE[index % PALETTE.len()]
}

/// Escape a string for PostScript ( and ) and \.
fn ps_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('(', "\\(")
        .replace(')', "\\)")
}

/// Generate "nice" tick values in [min, max] with roughly max_ticks steps.
fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    let range = if max > min { max - min } else { 1.0 };
    if range <= 0.0 || max_ticks == 0 {
        return vec![min];
    }
    let raw_step = range / (max_ticks as f64).max(1.0);
    let mag = 10.0_f64.powf(raw_step.log10().floor());
    let norm = if mag > 0.0 { raw_step / mag } else { raw_step };
    let step = if norm <= 1.0 {
        1.0 * mag
    } else if norm <= 2.0 {
        2.0 * mag
    } else if norm <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    };
    let step = step.max(f64::EPSILON);
    let start = (min / step).floor() * step;
    let mut ticks = Vec::new();
    let mut v = start;
    while v <= max + step * 0.001 {
        if v >= min - step * 0.001 {
            ticks.push(v);
        }
        v += step;
        if ticks.len() > max_ticks + 2 {
            break;
        }
    }
    if ticks.is_empty() {
        ticks.push(min);
    }
    ticks
}

/// Format a tick value for display (compact: integer when whole, else 1-2 decimals).
fn format_tick(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    let abs = v.abs();
    if abs >= 1000.0 || (abs <= 0.01 && abs > 0.0) {
        format!("{:e}", v)
    } else if (v - v.round()).abs() < 1e-10 {
        format!("{:.0}", v)
    } else if abs >= 1.0 {
        format!("{:.1}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Positions along the group axis. Line charts over all-numeric keys use the
/// key values themselves; everything else uses one slot per group.
fn group_positions(result: &RankedResult, kind: ChartKind) -> (Vec<f64>, Option<Vec<String>>) {
    let numeric: Option<Vec<f64>> = match kind {
        ChartKind::Line => result.rows.iter().map(|r| r.key.as_number()).collect(),
        _ => None,
    };
    match numeric {
        Some(xs) => (xs, None),
        None => {
            let labels = result.rows.iter().map(|r| r.key.label()).collect();
            (
                (0..result.rows.len()).map(|i| i as f64).collect(),
                Some(labels),
            )
        }
    }
}

fn value_bounds(means: &[f64], include_zero: bool) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &v in means {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    if include_zero {
        min = min.min(0.0);
        max = max.max(0.0);
    }
    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
    let low = if include_zero && min == 0.0 { 0.0 } else { min - pad };
    (low, max + pad)
}

fn position_bounds(xs: &[f64], categorical: bool) -> (f64, f64) {
    if categorical {
        return (-0.6, xs.len() as f64 - 0.4);
    }
    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if max > min { (max - min) * 0.05 } else { 1.0 };
    (min - pad, max + pad)
}

/// Render `result` to `path` in the requested format.
pub fn render_chart(
    path: &Path,
    result: &RankedResult,
    kind: ChartKind,
    style: &ChartStyle,
    format: ChartExportFormat,
) -> Result<()> {
    match format {
        ChartExportFormat::Png => write_chart_png(path, result, kind, style),
        ChartExportFormat::Eps => write_chart_eps(path, result, kind, style),
    }
}

/// Write chart to PNG using the plotters bitmap backend.
pub fn write_chart_png(
    path: &Path,
    result: &RankedResult,
    kind: ChartKind,
    style: &ChartStyle,
) -> Result<()> {
    use plotters::prelude::*;

    if result.is_empty() {
        return Err(color_eyre::eyre::eyre!("no data to render"));
    }

    let root = BitMapBackend::new(path, PNG_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (r, g, b) = palette_color(style.palette_index);
    let color = RGBColor(r, g, b);
    let means: Vec<f64> = result.rows.iter().map(|row| row.mean).collect();

    match kind {
        ChartKind::BarHorizontal => {
            let n = result.rows.len();
            let labels: Vec<String> = result.rows.iter().map(|row| row.key.label()).collect();
            let (v_min, v_max) = value_bounds(&means, true);

            let mut chart = ChartBuilder::on(&root)
                .caption(&style.title, ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(50)
                .y_label_area_size(130)
                .build_cartesian_2d(v_min..v_max, -0.6f64..(n as f64 - 0.4))?;

            // Row 0 of the result draws at the top.
            let label_for = |pos: &f64| -> String {
                let slot = pos.round();
                if (pos - slot).abs() > 0.3 || slot < 0.0 || slot >= n as f64 {
                    return String::new();
                }
                labels[n - 1 - slot as usize].clone()
            };

            chart
                .configure_mesh()
                .x_desc(style.x_label.as_str())
                .y_desc(style.y_label.as_str())
                .y_labels(n)
                .y_label_formatter(&label_for)
                .draw()?;

            chart.draw_series(result.rows.iter().enumerate().map(|(i, row)| {
                let pos = (n - 1 - i) as f64;
                Rectangle::new([(0.0, pos - 0.4), (row.mean, pos + 0.4)], color.filled())
            }))?;
        }
        ChartKind::Line | ChartKind::Bar => {
            let (xs, labels) = group_positions(result, kind);
            let categorical = labels.is_some();
            let (x_min, x_max) = position_bounds(&xs, categorical);
            let (v_min, v_max) = value_bounds(&means, kind == ChartKind::Bar);

            let x_label_area = if categorical && kind == ChartKind::Bar {
                110
            } else {
                50
            };
            let mut chart = ChartBuilder::on(&root)
                .caption(&style.title, ("sans-serif", 24))
                .margin(20)
                .x_label_area_size(x_label_area)
                .y_label_area_size(70)
                .build_cartesian_2d(x_min..x_max, v_min..v_max)?;

            let label_for = |pos: &f64| -> String {
                let slot = pos.round();
                if (pos - slot).abs() > 0.3 || slot < 0.0 {
                    return String::new();
                }
                match &labels {
                    Some(labels) => labels.get(slot as usize).cloned().unwrap_or_default(),
                    None => format_tick(*pos),
                }
            };

            let mut mesh = chart.configure_mesh();
            mesh.x_desc(style.x_label.as_str())
                .y_desc(style.y_label.as_str());
            if categorical {
                mesh.x_labels(xs.len()).x_label_formatter(&label_for);
                if kind == ChartKind::Bar {
                    // Long group labels read better rotated on a bar chart.
                    mesh.x_label_style(
                        ("sans-serif", 13)
                            .into_font()
                            .transform(FontTransform::Rotate90),
                    );
                }
            }
            mesh.draw()?;

            match kind {
                ChartKind::Line => {
                    let points: Vec<(f64, f64)> = xs
                        .iter()
                        .copied()
                        .zip(means.iter().copied())
                        .filter(|(x, y)| x.is_finite() && y.is_finite())
                        .collect();
                    chart.draw_series(LineSeries::new(points.iter().copied(), &color))?;
                    chart.draw_series(
                        points
                            .iter()
                            .map(|&(x, y)| Circle::new((x, y), 4, color.filled())),
                    )?;
                }
                ChartKind::Bar => {
                    chart.draw_series(xs.iter().zip(means.iter()).map(|(&x, &mean)| {
                        Rectangle::new([(x - 0.4, 0.0), (x + 0.4, mean)], color.filled())
                    }))?;
                }
                ChartKind::BarHorizontal => unreachable!(),
            }
        }
    }

    root.present()?;
    Ok(())
}

/// Write chart to EPS (Encapsulated PostScript). No external dependencies.
pub fn write_chart_eps(
    path: &Path,
    result: &RankedResult,
    kind: ChartKind,
    style: &ChartStyle,
) -> Result<()> {
    if result.is_empty() {
        return Err(color_eyre::eyre::eyre!("no data to render"));
    }

    const W: f64 = 400.0;
    const H: f64 = 300.0;
    const MARGIN_BOTTOM: f64 = 40.0;
    const MAX_TICKS: usize = 8;
    let margin_left: f64 = if kind == ChartKind::BarHorizontal {
        90.0
    } else {
        50.0
    };
    let plot_w = W - margin_left - 40.0;
    let plot_h = H - MARGIN_BOTTOM - 30.0;

    let means: Vec<f64> = result.rows.iter().map(|row| row.mean).collect();
    let n = result.rows.len();

    // Axis layout: horizontal bars put values on x and group slots on y;
    // the other kinds put group positions on x and values on y.
    let (xs, x_labels) = group_positions(result, kind);
    let (x_min, x_max, y_min, y_max) = match kind {
        ChartKind::BarHorizontal => {
            let (v_min, v_max) = value_bounds(&means, true);
            (v_min, v_max, -0.6, n as f64 - 0.4)
        }
        _ => {
            let (x_min, x_max) = position_bounds(&xs, x_labels.is_some());
            let (v_min, v_max) = value_bounds(&means, kind == ChartKind::Bar);
            (x_min, x_max, v_min, v_max)
        }
    };
    let x_range = if x_max > x_min { x_max - x_min } else { 1.0 };
    let y_range = if y_max > y_min { y_max - y_min } else { 1.0 };

    let to_x = |x: f64| margin_left + (x - x_min) / x_range * plot_w;
    let to_y = |y: f64| MARGIN_BOTTOM + (y - y_min) / y_range * plot_h;

    // Ticks as (position, label) pairs so numeric and categorical axes share
    // the drawing loops. Categorical axes subsample labels past the budget.
    let category_ticks = |labels: &[String], reversed: bool| -> Vec<(f64, String)> {
        let step = labels.len().div_ceil(MAX_TICKS * 2).max(1);
        labels
            .iter()
            .enumerate()
            .step_by(step)
            .map(|(i, label)| {
                let pos = if reversed {
                    (labels.len() - 1 - i) as f64
                } else {
                    i as f64
                };
                (pos, label.clone())
            })
            .collect()
    };
    let numeric_ticks = |min: f64, max: f64| -> Vec<(f64, String)> {
        nice_ticks(min, max, MAX_TICKS)
            .into_iter()
            .map(|v| (v, format_tick(v)))
            .collect()
    };

    let y_category_labels: Option<Vec<String>> = match kind {
        ChartKind::BarHorizontal => Some(result.rows.iter().map(|row| row.key.label()).collect()),
        _ => None,
    };
    let x_ticks: Vec<(f64, String)> = match (&x_labels, kind) {
        (_, ChartKind::BarHorizontal) => numeric_ticks(x_min, x_max),
        (Some(labels), _) => category_ticks(labels, false),
        (None, _) => numeric_ticks(x_min, x_max),
    };
    let y_ticks: Vec<(f64, String)> = match &y_category_labels {
        Some(labels) => category_ticks(labels, true),
        None => numeric_ticks(y_min, y_max),
    };

    let mut f = File::create(path)?;

    writeln!(f, "%!PS-Adobe-3.0 EPSF-3.0")?;
    writeln!(
        f,
        "%%BoundingBox: 0 0 {} {}",
        W.ceil() as i32,
        H.ceil() as i32
    )?;
    writeln!(f, "%%Creator: lifechart")?;
    writeln!(f, "%%Title: {}", ps_escape(&style.title))?;
    writeln!(f, "%%EndComments")?;
    writeln!(f, "gsave")?;
    writeln!(f, "1 setlinewidth")?;

    // Grid (light gray, behind plot)
    writeln!(f, "0.9 setgray")?;
    writeln!(f, "0.5 setlinewidth")?;
    for (v, _) in &x_ticks {
        let px = to_x(*v);
        if (margin_left..=margin_left + plot_w).contains(&px) {
            writeln!(
                f,
                "{} {} moveto 0 {} rlineto stroke",
                px, MARGIN_BOTTOM, plot_h
            )?;
        }
    }
    for (v, _) in &y_ticks {
        let py = to_y(*v);
        if (MARGIN_BOTTOM..=MARGIN_BOTTOM + plot_h).contains(&py) {
            writeln!(
                f,
                "{} {} moveto {} 0 rlineto stroke",
                margin_left, py, plot_w
            )?;
        }
    }
    writeln!(f, "1 setlinewidth")?;
    writeln!(f, "0 setgray")?;

    // Axis box
    writeln!(f, "{} {} moveto", margin_left, MARGIN_BOTTOM)?;
    writeln!(f, "{} 0 rlineto", plot_w)?;
    writeln!(f, "0 {} rlineto", plot_h)?;
    writeln!(f, "{} 0 rlineto", -plot_w)?;
    writeln!(f, "closepath stroke")?;

    // Tick marks (short lines on axes)
    const TICK_LEN: f64 = 4.0;
    for (v, _) in &x_ticks {
        let px = to_x(*v);
        if (margin_left..=margin_left + plot_w).contains(&px) {
            writeln!(
                f,
                "{} {} moveto 0 {} rlineto stroke",
                px, MARGIN_BOTTOM, -TICK_LEN
            )?;
        }
    }
    for (v, _) in &y_ticks {
        let py = to_y(*v);
        if (MARGIN_BOTTOM..=MARGIN_BOTTOM + plot_h).contains(&py) {
            writeln!(
                f,
                "{} {} moveto {} 0 rlineto stroke",
                margin_left, py, -TICK_LEN
            )?;
        }
    }

    // Tick labels
    writeln!(f, "/Helvetica findfont 9 scalefont setfont")?;
    let char_w: f64 = 5.0;
    for (v, label) in &x_ticks {
        let px = to_x(*v);
        if (margin_left..=margin_left + plot_w).contains(&px) {
            let label_w = label.len() as f64 * char_w;
            let tx = (px - label_w / 2.0)
                .max(margin_left)
                .min(margin_left + plot_w - label_w);
            writeln!(
                f,
                "{} {} moveto ({}) show",
                tx,
                MARGIN_BOTTOM - 12.0,
                ps_escape(label)
            )?;
        }
    }
    for (v, label) in &y_ticks {
        let py = to_y(*v);
        if (MARGIN_BOTTOM..=MARGIN_BOTTOM + plot_h).contains(&py) {
            let label_w = label.len() as f64 * char_w;
            let tx = (margin_left - label_w - 4.0).max(2.0);
            writeln!(f, "{} {} moveto ({}) show", tx, py - 3.0, ps_escape(label))?;
        }
    }

    // Axis titles (x below tick labels, y left of plot) and chart title on top
    writeln!(f, "/Helvetica findfont 10 scalefont setfont")?;
    if !style.x_label.is_empty() {
        let x_center = margin_left + plot_w / 2.0;
        let approx_len = style.x_label.len() as f64 * char_w;
        writeln!(
            f,
            "{} {} moveto ({}) show",
            (x_center - approx_len / 2.0).max(margin_left),
            MARGIN_BOTTOM - 24.0,
            ps_escape(&style.x_label)
        )?;
    }
    if !style.y_label.is_empty() {
        writeln!(f, "gsave")?;
        writeln!(f, "12 {} translate -90 rotate", MARGIN_BOTTOM + plot_h / 2.0)?;
        let approx_len = style.y_label.len() as f64 * char_w;
        writeln!(
            f,
            "{} 0 moveto ({}) show",
            -approx_len / 2.0,
            ps_escape(&style.y_label)
        )?;
        writeln!(f, "grestore")?;
    }
    if !style.title.is_empty() {
        let x_center = margin_left + plot_w / 2.0;
        let approx_len = style.title.len() as f64 * char_w;
        writeln!(
            f,
            "{} {} moveto ({}) show",
            (x_center - approx_len / 2.0).max(2.0),
            MARGIN_BOTTOM + plot_h + 12.0,
            ps_escape(&style.title)
        )?;
    }

    let (r, g, b) = palette_color(style.palette_index);
    writeln!(
        f,
        "{:.3} {:.3} {:.3} setrgbcolor",
        r as f64 / 255.0,
        g as f64 / 255.0,
        b as f64 / 255.0
    )?;

    match kind {
        ChartKind::Line => {
            let points: Vec<(f64, f64)> = xs
                .iter()
                .copied()
                .zip(means.iter().copied())
                .filter(|(x, y)| x.is_finite() && y.is_finite())
                .collect();
            if let Some(&(px, py)) = points.first() {
                writeln!(f, "{} {} moveto", to_x(px), to_y(py))?;
                for &(px, py) in &points[1..] {
                    writeln!(f, "{} {} lineto", to_x(px), to_y(py))?;
                }
                writeln!(f, "stroke")?;
            }
            for &(px, py) in &points {
                writeln!(f, "{} {} 2.5 0 360 arc fill", to_x(px), to_y(py))?;
            }
        }
        ChartKind::Bar => {
            let bar_w = (plot_w / n as f64).clamp(1.0, 40.0) * 0.7;
            for (&x, &mean) in xs.iter().zip(means.iter()) {
                let cx = to_x(x) - bar_w / 2.0;
                let base = to_y(y_min.max(0.0).min(y_max));
                let h = to_y(mean.clamp(y_min, y_max)) - base;
                writeln!(f, "{} {} {} {} rectfill", cx, base, bar_w, h)?;
            }
        }
        ChartKind::BarHorizontal => {
            let bar_h = (plot_h / n as f64).clamp(1.0, 30.0) * 0.7;
            for (i, &mean) in means.iter().enumerate() {
                let pos = (n - 1 - i) as f64;
                let cy = to_y(pos) - bar_h / 2.0;
                let base = to_x(x_min.max(0.0).min(x_max));
                let w = to_x(mean.clamp(x_min, x_max)) - base;
                writeln!(f, "{} {} {} {} rectfill", base, cy, w, bar_h)?;
            }
        }
    }

    writeln!(f, "grestore")?;
    writeln!(f, "%%EOF")?;
    f.sync_all()?;
    Ok(())
}
