//! Figure export in five interchangeable formats.
//!
//! For a base path `p`, `save_all` writes the sibling files:
//!
//! - `p.svg`  — vector document (Plotters SVG backend, full text)
//! - `p.png`  — raster image (Plotters bitmap backend; rendered text-free
//!   because the minimal Plotters feature set carries no font rasterizer)
//! - `p.tex`  — embeddable pgfplots figure source
//! - `p.gp`   — re-loadable gnuplot script with inline data
//! - `p.json` — serialized-object archive (config + curves), reloadable via
//!   [`read_overlay_archive`]

use std::fs::File;
use std::path::{Path, PathBuf};

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::ranged1d::Ranged;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::PlotError;
use crate::hist::Hist1D;
use crate::plot::overlay::{DrawStyle, OverlayConfig, OverlayCurve, SpectralOverlay};
use crate::plot::palette::{LineStyle, Rgb};

const FIGURE_SIZE: (u32, u32) = (640, 480);

/// The serialized-object archive written next to the rendered figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayArchive {
    pub config: OverlayConfig,
    pub curves: Vec<OverlayCurve>,
}

/// Write all five export formats for an overlay. Returns the written paths.
pub(crate) fn save_all(overlay: &SpectralOverlay, base: &Path) -> Result<Vec<PathBuf>, PlotError> {
    let svg = with_extension(base, "svg");
    let png = with_extension(base, "png");
    let tex = with_extension(base, "tex");
    let gp = with_extension(base, "gp");
    let json = with_extension(base, "json");

    write_svg(overlay, &svg)?;
    write_png(overlay, &png)?;
    std::fs::write(&tex, render_tex(overlay)).map_err(|e| {
        PlotError::export(format!("failed to write '{}': {e}", tex.display()))
    })?;
    std::fs::write(&gp, render_gnuplot(overlay, base)).map_err(|e| {
        PlotError::export(format!("failed to write '{}': {e}", gp.display()))
    })?;
    write_archive(overlay, &json)?;

    Ok(vec![svg, png, tex, gp, json])
}

/// Reload a previously saved overlay archive.
pub fn read_overlay_archive(path: &Path) -> Result<OverlayArchive, PlotError> {
    let file = File::open(path).map_err(|e| {
        PlotError::export(format!("failed to open '{}': {e}", path.display()))
    })?;
    serde_json::from_reader(file).map_err(|e| {
        PlotError::export(format!("invalid overlay archive '{}': {e}", path.display()))
    })
}

fn with_extension(base: &Path, ext: &str) -> PathBuf {
    PathBuf::from(format!("{}.{ext}", base.display()))
}

fn write_svg(overlay: &SpectralOverlay, path: &Path) -> Result<(), PlotError> {
    let root = SVGBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::export(format!("failed to fill '{}': {e}", path.display())))?;
    render_chart(overlay, &root, true)?;
    root.present()
        .map_err(|e| PlotError::export(format!("failed to write '{}': {e}", path.display())))
}

fn write_png(overlay: &SpectralOverlay, path: &Path) -> Result<(), PlotError> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| PlotError::export(format!("failed to fill '{}': {e}", path.display())))?;
    // No text on the bitmap path: the minimal Plotters feature set has no
    // font rasterizer, so captions/labels/legend are SVG-only.
    render_chart(overlay, &root, false)?;
    root.present()
        .map_err(|e| PlotError::export(format!("failed to write '{}': {e}", path.display())))
}

fn write_archive(overlay: &SpectralOverlay, path: &Path) -> Result<(), PlotError> {
    let archive = OverlayArchive {
        config: overlay.config().clone(),
        curves: overlay.curves().to_vec(),
    };
    let file = File::create(path).map_err(|e| {
        PlotError::export(format!("failed to create '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, &archive).map_err(|e| {
        PlotError::export(format!("failed to write '{}': {e}", path.display()))
    })
}

fn render_chart<DB>(
    overlay: &SpectralOverlay,
    root: &DrawingArea<DB, Shift>,
    with_text: bool,
) -> Result<(), PlotError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let config = overlay.config();
    let (x0, x1) = overlay.x_bounds();
    let (y0, y1) = overlay.y_bounds();

    let mut builder = ChartBuilder::on(root);
    builder.margin(10);
    if with_text {
        if !config.title.is_empty() {
            builder.caption(&config.title, ("sans-serif", 18));
        }
        builder
            .x_label_area_size(36)
            .y_label_area_size(56);
    }

    if config.log_y {
        let mut chart = builder
            .build_cartesian_2d(x0..x1, (y0..y1).log_scale())
            .map_err(|e| PlotError::export(format!("failed to build chart: {e}")))?;
        configure_mesh(&mut chart, config, with_text)?;
        draw_curves(overlay, &mut chart, with_text)?;
    } else {
        let mut chart = builder
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(|e| PlotError::export(format!("failed to build chart: {e}")))?;
        configure_mesh(&mut chart, config, with_text)?;
        draw_curves(overlay, &mut chart, with_text)?;
    }

    Ok(())
}

fn configure_mesh<'a, DB, X, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<X, Y>>,
    config: &OverlayConfig,
    with_text: bool,
) -> Result<(), PlotError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
    X: Ranged<ValueType = f64> + plotters::coord::ranged1d::ValueFormatter<f64>,
    Y: Ranged<ValueType = f64> + plotters::coord::ranged1d::ValueFormatter<f64>,
{
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh().disable_y_mesh();
    if with_text {
        mesh.x_desc(&config.x_title).y_desc(&config.y_title);
    } else {
        mesh.x_labels(0).y_labels(0);
    }
    mesh.draw()
        .map_err(|e| PlotError::export(format!("failed to draw axes: {e}")))
}

/// Stepped outline of a histogram: one horizontal segment per bin.
fn step_points(hist: &Hist1D) -> Vec<(f64, f64)> {
    let axis = hist.axis();
    let mut points = Vec::with_capacity(2 * axis.bins());
    for i in 0..axis.bins() {
        let v = hist.bin(i);
        points.push((axis.edge(i), v));
        points.push((axis.edge(i + 1), v));
    }
    points
}

fn marker_points(hist: &Hist1D) -> Vec<(f64, f64)> {
    let axis = hist.axis();
    (0..axis.bins())
        .filter(|&i| hist.bin(i) != 0.0)
        .map(|i| (axis.center(i), hist.bin(i)))
        .collect()
}

fn draw_curves<'a, DB, X, Y>(
    overlay: &SpectralOverlay,
    chart: &mut ChartContext<'a, DB, Cartesian2d<X, Y>>,
    with_legend: bool,
) -> Result<(), PlotError>
where
    DB: DrawingBackend + 'a,
    DB::ErrorType: 'static,
    X: Ranged<ValueType = f64>,
    Y: Ranged<ValueType = f64>,
{
    let line_width = overlay.config().line_width;

    for curve in overlay.curves() {
        let color = to_rgb(curve.style.color);
        let style = ShapeStyle::from(&color).stroke_width(line_width);

        // Legend entries are registered for every curve, drawn or not; an
        // undrawn curve contributes an empty series so the legend still lists
        // it in add order.
        let anno = if !curve.drawn {
            chart
                .draw_series(std::iter::empty::<Circle<(f64, f64), i32>>())
                .map_err(|e| PlotError::export(format!("failed to draw series: {e}")))?
        } else {
            match curve.style.draw {
                DrawStyle::Line => {
                    let points = step_points(&curve.hist);
                    match curve.style.line {
                        LineStyle::Solid => chart
                            .draw_series(LineSeries::new(points, style))
                            .map_err(|e| {
                                PlotError::export(format!("failed to draw series: {e}"))
                            })?,
                        LineStyle::Dashed => chart
                            .draw_series(DashedLineSeries::new(points, 8, 4, style))
                            .map_err(|e| {
                                PlotError::export(format!("failed to draw series: {e}"))
                            })?,
                        LineStyle::Dotted => chart
                            .draw_series(DashedLineSeries::new(points, 2, 4, style))
                            .map_err(|e| {
                                PlotError::export(format!("failed to draw series: {e}"))
                            })?,
                    }
                }
                DrawStyle::Points => chart
                    .draw_series(
                        marker_points(&curve.hist)
                            .into_iter()
                            .map(|xy| Circle::new(xy, 3, color.filled())),
                    )
                    .map_err(|e| PlotError::export(format!("failed to draw series: {e}")))?,
            }
        };

        if with_legend {
            anno.label(curve.legend.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], style));
        }
    }

    if with_legend && !overlay.curves().is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", 12))
            .draw()
            .map_err(|e| PlotError::export(format!("failed to draw legend: {e}")))?;
    }

    Ok(())
}

fn to_rgb(color: Rgb) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

fn hex(color: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

/// Embeddable pgfplots figure source.
fn render_tex(overlay: &SpectralOverlay) -> String {
    let config = overlay.config();
    let (x0, x1) = overlay.x_bounds();
    let (y0, y1) = overlay.y_bounds();

    let mut s = String::new();
    s.push_str("% pgfplots figure; \\usepackage{pgfplots} required\n");
    for (i, curve) in overlay.curves().iter().enumerate() {
        let c = curve.style.color;
        s.push_str(&format!(
            "\\definecolor{{curve{i}}}{{RGB}}{{{},{},{}}}\n",
            c.r, c.g, c.b
        ));
    }
    s.push_str("\\begin{tikzpicture}\n\\begin{axis}[\n");
    if !config.title.is_empty() {
        s.push_str(&format!("  title={{{}}},\n", config.title));
    }
    s.push_str(&format!("  xlabel={{{}}},\n", config.x_title));
    s.push_str(&format!("  ylabel={{{}}},\n", config.y_title));
    s.push_str(&format!("  xmin={x0}, xmax={x1},\n"));
    s.push_str(&format!("  ymin={y0}, ymax={y1},\n"));
    if config.log_y {
        s.push_str("  ymode=log,\n");
    }
    s.push_str("  legend pos=north east,\n]\n");

    for (i, curve) in overlay.curves().iter().enumerate() {
        if !curve.drawn {
            // Legend parity with the rendered figure: entry, no curve.
            s.push_str("\\addlegendimage{empty legend}\n");
        } else {
            match curve.style.draw {
                DrawStyle::Line => {
                    let dash = match curve.style.line {
                        LineStyle::Solid => "solid",
                        LineStyle::Dashed => "dashed",
                        LineStyle::Dotted => "dotted",
                    };
                    s.push_str(&format!(
                        "\\addplot[const plot, {dash}, color=curve{i}, line width={}pt] coordinates {{\n",
                        config.line_width
                    ));
                    let axis = curve.hist.axis();
                    for b in 0..axis.bins() {
                        s.push_str(&format!("  ({},{})\n", axis.edge(b), curve.hist.bin(b)));
                    }
                    s.push_str(&format!(
                        "  ({},{})\n}};\n",
                        axis.edge(axis.bins()),
                        curve.hist.bin(axis.bins() - 1)
                    ));
                }
                DrawStyle::Points => {
                    s.push_str(&format!(
                        "\\addplot[only marks, mark=*, color=curve{i}] coordinates {{\n"
                    ));
                    for (x, y) in marker_points(&curve.hist) {
                        s.push_str(&format!("  ({x},{y})\n"));
                    }
                    s.push_str("};\n");
                }
            }
        }
        s.push_str(&format!("\\addlegendentry{{{}}}\n", curve.legend));
    }

    s.push_str("\\end{axis}\n\\end{tikzpicture}\n");
    s
}

/// Re-loadable gnuplot script with inline data blocks.
fn render_gnuplot(overlay: &SpectralOverlay, base: &Path) -> String {
    let config = overlay.config();
    let (x0, x1) = overlay.x_bounds();
    let (y0, y1) = overlay.y_bounds();

    let mut s = String::new();
    s.push_str("# Reload with: gnuplot <this file>\n");
    s.push_str(&format!(
        "set terminal svg size {},{}\n",
        FIGURE_SIZE.0, FIGURE_SIZE.1
    ));
    s.push_str(&format!("set output '{}.gp.svg'\n", base.display()));
    if !config.title.is_empty() {
        s.push_str(&format!("set title \"{}\"\n", config.title));
    }
    s.push_str(&format!("set xlabel \"{}\"\n", config.x_title));
    s.push_str(&format!("set ylabel \"{}\"\n", config.y_title));
    s.push_str(&format!("set xrange [{x0}:{x1}]\n"));
    s.push_str(&format!("set yrange [{y0}:{y1}]\n"));
    if config.log_y {
        s.push_str("set logscale y\n");
    }

    if overlay.curves().is_empty() {
        s.push_str("# no curves registered\n");
        return s;
    }

    let mut specs = Vec::new();
    for curve in overlay.curves() {
        let color = hex(curve.style.color);
        if !curve.drawn {
            // Legend-only entry; `1/0` draws nothing.
            specs.push(format!("1/0 with lines title \"{}\"", curve.legend));
            continue;
        }
        match curve.style.draw {
            DrawStyle::Line => {
                let dt = match curve.style.line {
                    LineStyle::Solid => 1,
                    LineStyle::Dashed => 2,
                    LineStyle::Dotted => 3,
                };
                specs.push(format!(
                    "'-' with steps lw {} dt {dt} lc rgb '{color}' title \"{}\"",
                    config.line_width, curve.legend
                ));
            }
            DrawStyle::Points => {
                specs.push(format!(
                    "'-' with points pt 7 lc rgb '{color}' title \"{}\"",
                    curve.legend
                ));
            }
        }
    }
    s.push_str(&format!("plot {}\n", specs.join(", \\\n     ")));

    // Inline data blocks, one per '-' spec, in plot order.
    for curve in overlay.curves().iter().filter(|c| c.drawn) {
        match curve.style.draw {
            DrawStyle::Line => {
                let axis = curve.hist.axis();
                for b in 0..axis.bins() {
                    s.push_str(&format!("{} {}\n", axis.edge(b), curve.hist.bin(b)));
                }
                s.push_str(&format!(
                    "{} {}\n",
                    axis.edge(axis.bins()),
                    curve.hist.bin(axis.bins() - 1)
                ));
            }
            DrawStyle::Points => {
                for (x, y) in marker_points(&curve.hist) {
                    s.push_str(&format!("{x} {y}\n"));
                }
            }
        }
        s.push_str("e\n");
    }

    s
}
