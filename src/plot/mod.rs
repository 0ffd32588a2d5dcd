//! PNG chart rendering.
//!
//! One generic dated-line renderer drives every chart in the tool: rebased
//! sector series, backtest equity curves, and market summary series are all
//! "named lines over a shared date axis, plus optional vertical event
//! markers". Keeping the drawing in one place makes output changes local.

use std::path::Path;

use chrono::NaiveDate;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::domain::{EquityFile, EventMarker, RebasedTable};
use crate::error::AppError;
use crate::report::BrokerNet;

/// A named line: `(label, points)`.
pub type DatedLine = (String, Vec<(NaiveDate, f64)>);

/// Render rebased sector series to a PNG, one line per sector.
pub fn render_sector_chart(
    path: &Path,
    table: &RebasedTable,
    events: &[EventMarker],
    width: u32,
    height: u32,
) -> Result<(), AppError> {
    let lines: Vec<DatedLine> = table
        .columns
        .iter()
        .map(|col| {
            let points = table
                .dates
                .iter()
                .zip(&col.values)
                .filter_map(|(&d, &v)| Some((d, v?)))
                .collect();
            (col.sector.display_name().to_string(), points)
        })
        .collect();

    let title = format!("NEPSE sector indices (base 100 @ {})", table.anchor);
    render_dated_lines(path, &title, &lines, events, width, height)
}

/// Render a saved equity curve to a PNG, with rotations as event markers.
pub fn render_equity_chart(
    path: &Path,
    file: &EquityFile,
    width: u32,
    height: u32,
) -> Result<(), AppError> {
    let points: Vec<(NaiveDate, f64)> = file.equity.iter().map(|p| (p.date, p.value)).collect();
    let lines = vec![(format!("equity (window={})", file.lookback), points)];

    let markers: Vec<EventMarker> = file
        .rotations
        .iter()
        .map(|r| EventMarker {
            date: r.date,
            label: format!("-> {}", r.to),
        })
        .collect();

    let title = format!("Rotation backtest - {}", file.input);
    render_dated_lines(path, &title, &lines, &markers, width, height)
}

/// Render a broker net buy/sell ranking as a horizontal bar chart.
///
/// Net buyers extend right of the zero line in green, net sellers left in
/// red, best-ranked at the top.
pub fn render_broker_chart(
    path: &Path,
    ranking: &[BrokerNet],
    width: u32,
    height: u32,
) -> Result<(), AppError> {
    if width < 100 || height < 100 {
        return Err(AppError::usage(format!(
            "Chart size {width}x{height} is too small (minimum 100x100)."
        )));
    }
    if ranking.is_empty() {
        return Err(AppError::no_data("Nothing to plot: broker ranking is empty."));
    }

    let max_abs = ranking
        .iter()
        .map(|b| b.net_pct.abs())
        .fold(1.0_f64, f64::max);
    let x_min = -max_abs * 1.1;
    let x_max = max_abs * 1.1;
    let n = ranking.len() as f64;

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Brokers by net buy/sell percentage", ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(36)
        .y_label_area_size(10)
        .build_cartesian_2d(x_min..x_max, 0.0..n)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(0)
        .x_labels(9)
        .x_desc("net trading percentage")
        .label_style(("sans-serif", 12))
        .draw()
        .map_err(draw_err)?;

    chart
        .draw_series(LineSeries::new(
            [(0.0, 0.0), (0.0, n)],
            BLACK.stroke_width(1),
        ))
        .map_err(draw_err)?;

    for (idx, b) in ranking.iter().enumerate() {
        // Rank 0 sits at the top of the chart.
        let y = n - 1.0 - idx as f64;
        let color = if b.net_pct >= 0.0 { GREEN } else { RED };
        chart
            .draw_series(std::iter::once(Rectangle::new(
                [(0.0, y + 0.15), (b.net_pct, y + 0.85)],
                color.mix(0.6).filled(),
            )))
            .map_err(draw_err)?;
        // Member name goes on the empty side of the zero line, anchored
        // toward it.
        let (label_x, h_pos) = if b.net_pct >= 0.0 {
            (-max_abs * 0.02, Pos::new(HPos::Right, VPos::Center))
        } else {
            (max_abs * 0.02, Pos::new(HPos::Left, VPos::Center))
        };
        chart
            .draw_series(std::iter::once(Text::new(
                b.member.clone(),
                (label_x, y + 0.5),
                ("sans-serif", 12).into_font().color(&BLACK).pos(h_pos),
            )))
            .map_err(draw_err)?;
    }

    root.present().map_err(|e| {
        AppError::external(format!("Failed to write chart '{}': {e}", path.display()))
    })?;
    Ok(())
}

/// Draw named lines over a shared date axis and save as PNG.
pub fn render_dated_lines(
    path: &Path,
    title: &str,
    lines: &[DatedLine],
    events: &[EventMarker],
    width: u32,
    height: u32,
) -> Result<(), AppError> {
    if width < 100 || height < 100 {
        return Err(AppError::usage(format!(
            "Chart size {width}x{height} is too small (minimum 100x100)."
        )));
    }
    let Some((x_min, x_max, y_min, y_max)) = bounds(lines) else {
        return Err(AppError::no_data("Nothing to plot: every series is empty."));
    };
    // A flat or single-point chart still needs a non-degenerate y range.
    let pad = ((y_max - y_min) * 0.05).max(y_max.abs() * 0.01).max(1e-6);
    let (y_min, y_max) = (y_min - pad, y_max + pad);

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 22))
        .margin(10)
        .x_label_area_size(36)
        .y_label_area_size(56)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .x_labels(8)
        .y_labels(8)
        .x_label_formatter(&|d| d.format("%Y-%m-%d").to_string())
        .label_style(("sans-serif", 12))
        .draw()
        .map_err(draw_err)?;

    for (idx, (label, points)) in lines.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(draw_err)?
            .label(label.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 18, y)], color.stroke_width(2))
            });
    }

    let marker_style = RGBColor(120, 120, 120).stroke_width(1);
    for (idx, event) in events.iter().enumerate() {
        if event.date < x_min || event.date > x_max {
            continue;
        }
        chart
            .draw_series(DashedLineSeries::new(
                [(event.date, y_min), (event.date, y_max)],
                4,
                4,
                marker_style,
            ))
            .map_err(draw_err)?;
        // Stagger labels vertically so adjacent markers stay legible.
        let y_frac = 0.95 - 0.05 * (idx % 4) as f64;
        let y_label = y_min + (y_max - y_min) * y_frac;
        chart
            .draw_series(std::iter::once(Text::new(
                event.label.clone(),
                (event.date, y_label),
                ("sans-serif", 11).into_font().color(&RGBColor(90, 90, 90)),
            )))
            .map_err(draw_err)?;
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.85))
        .border_style(RGBColor(200, 200, 200))
        .position(SeriesLabelPosition::UpperLeft)
        .draw()
        .map_err(draw_err)?;

    root.present()
        .map_err(|e| AppError::external(format!("Failed to write chart '{}': {e}", path.display())))?;
    Ok(())
}

fn bounds(lines: &[DatedLine]) -> Option<(NaiveDate, NaiveDate, f64, f64)> {
    let mut x_min: Option<NaiveDate> = None;
    let mut x_max: Option<NaiveDate> = None;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (_, points) in lines {
        for &(d, v) in points {
            if !v.is_finite() {
                continue;
            }
            x_min = Some(x_min.map_or(d, |m| m.min(d)));
            x_max = Some(x_max.map_or(d, |m| m.max(d)));
            y_min = y_min.min(v);
            y_max = y_max.max(v);
        }
    }
    Some((x_min?, x_max?, y_min, y_max))
}

fn draw_err<E: std::fmt::Display>(e: E) -> AppError {
    AppError::external(format!("Chart rendering failed: {e}"))
}
