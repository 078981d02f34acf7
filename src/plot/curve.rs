//! Render a correction graph and its fitted curve to an SVG image.
//!
//! Styling is carried by an explicit [`PlotStyle`] value rather than global
//! state, so two renders with different styles can never bleed into each
//! other. The defaults reproduce the house look: blue error-bar points, a
//! thick translucent red fit curve, and the correction-factor axis window.
//!
//! Output is SVG only. The SVG backend embeds text as text elements, so no
//! font rasterization is needed at render time.

use std::path::Path;

use plotters::coord::types::RangedCoordf64;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::domain::{CorrectionGraph, FitFunction};
use crate::error::AppError;

/// Visual configuration for a correction-curve image.
#[derive(Debug, Clone)]
pub struct PlotStyle {
    pub width: u32,
    pub height: u32,
    /// Chart caption. Usually the eta range, e.g. `0 < |eta| < 0.435`.
    pub title: Option<String>,
    pub x_label: String,
    pub y_label: String,
    /// Axis window; `None` derives it from the plotted data.
    pub x_range: Option<(f64, f64)>,
    pub y_range: Option<(f64, f64)>,
    pub point_color: RGBColor,
    pub fit_color: RGBColor,
    /// Alpha applied to the fit curve so points stay visible underneath.
    pub fit_alpha: f64,
    pub marker_size: u32,
    pub fit_stroke: u32,
    pub font_size: u32,
    pub legend: bool,
    /// Number of samples used to draw the fit curve.
    pub curve_samples: usize,
}

impl Default for PlotStyle {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: None,
            x_label: "<E_T^L1> (GeV)".to_string(),
            y_label: "correction factor".to_string(),
            x_range: None,
            y_range: Some((0.97, 2.03)),
            point_color: RGBColor(30, 60, 200),
            fit_color: RED,
            fit_alpha: 0.7,
            marker_size: 4,
            fit_stroke: 5,
            font_size: 22,
            legend: true,
            curve_samples: 101,
        }
    }
}

/// Render `graph` (and optionally its fitted function) to an SVG file.
pub fn render_correction_curve(
    graph: &CorrectionGraph,
    fit: Option<&FitFunction>,
    style: &PlotStyle,
    path: &Path,
) -> Result<(), AppError> {
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    if !is_svg {
        return Err(AppError::new(
            2,
            format!("Output '{}' must use the .svg extension.", path.display()),
        ));
    }
    if !graph.is_consistent() {
        return Err(AppError::new(
            3,
            format!("Graph '{}' has ragged point vectors.", graph.name),
        ));
    }

    let (x0, x1) = style.x_range.unwrap_or_else(|| auto_x_range(graph));
    let (y0, y1) = style.y_range.unwrap_or_else(|| auto_y_range(graph));
    if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0
    {
        return Err(AppError::new(2, "Invalid axis ranges for plot."));
    }

    let root = SVGBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| AppError::new(4, format!("Failed to prepare plot canvas: {e}")))?;

    let label_font = ("sans-serif", style.font_size).into_font();
    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 50);
    if let Some(title) = &style.title {
        builder.caption(title, ("sans-serif", style.font_size + 8).into_font());
    }
    let mut chart = builder
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| AppError::new(4, format!("Failed to build chart: {e}")))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(&style.x_label)
        .y_desc(&style.y_label)
        .x_labels(8)
        .y_labels(8)
        .label_style(label_font.clone())
        .axis_desc_style(label_font)
        .draw()
        .map_err(|e| AppError::new(4, format!("Failed to draw axes: {e}")))?;

    draw_points(&mut chart, graph, style)
        .map_err(|e| AppError::new(4, format!("Failed to draw graph points: {e}")))?;

    if let Some(fit) = fit {
        draw_fit(&mut chart, fit, style, (x0, x1))
            .map_err(|e| AppError::new(4, format!("Failed to draw fit curve: {e}")))?;
    }

    if style.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.85))
            .border_style(BLACK.mix(0.4))
            .label_font(("sans-serif", style.font_size - 2))
            .draw()
            .map_err(|e| AppError::new(4, format!("Failed to draw legend: {e}")))?;
    }

    root.present()
        .map_err(|e| AppError::new(4, format!("Failed to write '{}': {e}", path.display())))?;
    Ok(())
}

fn draw_points<'a, DB: DrawingBackend + 'a>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    graph: &CorrectionGraph,
    style: &PlotStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let color = style.point_color;

    // Vertical error bars carry the point marker; horizontal bars are drawn
    // separately and stay out of the legend.
    let n = graph.len();
    chart
        .draw_series((0..n).map(|i| {
            ErrorBar::new_vertical(
                graph.x[i],
                graph.y[i] - graph.ey[i],
                graph.y[i],
                graph.y[i] + graph.ey[i],
                color.filled(),
                style.marker_size,
            )
        }))?
        .label("points from reference-pt bins")
        .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));

    chart.draw_series((0..n).map(|i| {
        ErrorBar::new_horizontal(
            graph.y[i],
            graph.x[i] - graph.ex[i],
            graph.x[i],
            graph.x[i] + graph.ex[i],
            color.filled(),
            style.marker_size,
        )
    }))?;

    Ok(())
}

fn draw_fit<'a, DB: DrawingBackend + 'a>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    fit: &FitFunction,
    style: &PlotStyle,
    x_window: (f64, f64),
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    // Sample the curve over the visible part of its fit domain.
    let (fit_min, fit_max) = fit.domain();
    let lo = fit_min.max(x_window.0);
    let hi = fit_max.min(x_window.1);
    if hi <= lo {
        return Ok(());
    }

    let n = style.curve_samples.max(2);
    let samples: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let u = i as f64 / (n as f64 - 1.0);
            let pt = lo + u * (hi - lo);
            (pt, fit.eval(pt))
        })
        .filter(|(_, y)| y.is_finite())
        .collect();

    let stroke = style
        .fit_color
        .mix(style.fit_alpha)
        .stroke_width(style.fit_stroke);
    let legend_stroke = style.fit_color.mix(style.fit_alpha).stroke_width(3);
    chart
        .draw_series(LineSeries::new(samples, stroke))?
        .label("fit to graph")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], legend_stroke));

    Ok(())
}

fn auto_x_range(graph: &CorrectionGraph) -> (f64, f64) {
    let mut hi = f64::NEG_INFINITY;
    for i in 0..graph.len() {
        hi = hi.max(graph.x[i] + graph.ex[i].abs());
    }
    if hi.is_finite() && hi > 0.0 {
        (0.0, hi * 1.05)
    } else {
        (0.0, 600.0)
    }
}

fn auto_y_range(graph: &CorrectionGraph) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for i in 0..graph.len() {
        lo = lo.min(graph.y[i] - graph.ey[i].abs());
        hi = hi.max(graph.y[i] + graph.ey[i].abs());
    }
    if lo.is_finite() && hi.is_finite() && hi > lo {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    } else {
        (0.97, 2.03)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FitModel;

    fn sample_graph() -> CorrectionGraph {
        CorrectionGraph {
            name: "l1corr_eta_0_0.435".to_string(),
            title: "0 < |eta| < 0.435".to_string(),
            x: vec![15.0, 40.0, 120.0, 300.0],
            y: vec![1.8, 1.45, 1.2, 1.1],
            ex: vec![2.0, 5.0, 15.0, 40.0],
            ey: vec![0.05, 0.03, 0.02, 0.02],
        }
    }

    fn sample_fit() -> FitFunction {
        FitFunction::new(
            "fitfcneta_0_0.435".to_string(),
            FitModel::Standard,
            vec![1.02, 2.0, 2.0, 0.3, 0.5, 1.2],
            10.0,
            400.0,
        )
    }

    #[test]
    fn writes_an_svg_with_labels_and_curve() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.svg");

        let style = PlotStyle {
            title: Some("0 < |eta| < 0.435".to_string()),
            ..PlotStyle::default()
        };
        render_correction_curve(&sample_graph(), Some(&sample_fit()), &style, &path).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.starts_with("<?xml") || svg.starts_with("<svg"));
        assert!(svg.contains("correction factor"));
        assert!(svg.contains("fit to graph"));
        assert!(svg.contains("polyline") || svg.contains("path"));
    }

    #[test]
    fn points_only_render_works_without_fit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.svg");
        render_correction_curve(&sample_graph(), None, &PlotStyle::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn non_svg_extension_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.png");
        let err =
            render_correction_curve(&sample_graph(), None, &PlotStyle::default(), &path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains(".svg"));
    }

    #[test]
    fn inverted_explicit_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.svg");
        let style = PlotStyle {
            y_range: Some((2.0, 1.0)),
            ..PlotStyle::default()
        };
        let err = render_correction_curve(&sample_graph(), None, &style, &path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn empty_graph_falls_back_to_default_window() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.svg");
        let graph = CorrectionGraph {
            name: "g".to_string(),
            title: String::new(),
            x: vec![],
            y: vec![],
            ex: vec![],
            ey: vec![],
        };
        let style = PlotStyle {
            y_range: None,
            ..PlotStyle::default()
        };
        render_correction_curve(&graph, None, &style, &path).unwrap();
        assert!(path.exists());
    }
}
