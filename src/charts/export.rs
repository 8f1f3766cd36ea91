//! Static Chart Export Module
//! Renders the current dashboard state (selection filters applied) to PNG
//! files with plotters.

use crate::charts::plotter::PALETTE;
use crate::compose::{
    dashboard::{VIEW_DRIVER_HIST, VIEW_DRIVER_SCATTER, VIEW_DURATION_BARS, VIEW_QUALITY_BARS,
                VIEW_SCATTER},
    ComposeError, Dashboard, View,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error(transparent)]
    Compose(#[from] ComposeError),
    #[error("Missing view: {0}")]
    MissingView(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Render error: {0}")]
    Backend(String),
}

fn backend_err<E: std::fmt::Display>(e: E) -> ExportError {
    ExportError::Backend(e.to_string())
}

fn series_rgb(index: usize) -> RGBColor {
    let c = PALETTE[index % PALETTE.len()];
    RGBColor(c.r(), c.g(), c.b())
}

/// Renders dashboard panels to static images.
pub struct ChartExporter;

impl ChartExporter {
    /// Export the three panels as PNG files into `dir`; returns the paths
    /// written.
    pub fn export_all(dashboard: &Dashboard, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        std::fs::create_dir_all(dir)?;

        let bars = dir.join("category_bars.png");
        Self::export_bar_pair(dashboard, &bars)?;

        let scatter = dir.join("duration_vs_quality.png");
        Self::export_scatter(dashboard, VIEW_SCATTER, &scatter)?;

        let drivers = dir.join("duration_drivers.png");
        Self::export_driver_pair(dashboard, &drivers)?;

        log::info!("exported 3 charts to {}", dir.display());
        Ok(vec![bars, scatter, drivers])
    }

    fn view<'a>(dashboard: &'a Dashboard, name: &str) -> Result<&'a View, ExportError> {
        dashboard
            .view(name)
            .ok_or_else(|| ExportError::MissingView(name.to_string()))
    }

    fn export_bar_pair(dashboard: &Dashboard, path: &Path) -> Result<(), ExportError> {
        let root = BitMapBackend::new(path, (1200, 500)).into_drawing_area();
        root.fill(&WHITE).map_err(backend_err)?;
        let halves = root.split_evenly((1, 2));

        for (area, name) in halves.iter().zip([VIEW_DURATION_BARS, VIEW_QUALITY_BARS]) {
            let view = Self::view(dashboard, name)?;
            Self::draw_bars(area, view, dashboard)?;
        }

        root.present().map_err(backend_err)?;
        Ok(())
    }

    fn draw_bars(
        area: &DrawingArea<BitMapBackend, Shift>,
        view: &View,
        dashboard: &Dashboard,
    ) -> Result<(), ExportError> {
        let bars = view.bar_data(dashboard.session())?;
        let n = bars.labels.len().max(1);
        let max_mean = bars.means.iter().cloned().fold(0.0f64, f64::max).max(1.0);

        let mut chart = ChartBuilder::on(area)
            .margin(15)
            .caption(view.spec.x.label(), ("sans-serif", 20))
            .x_label_area_size(35)
            .y_label_area_size(130)
            .build_cartesian_2d(0.0..max_mean * 1.1, (0..n).into_segmented())
            .map_err(backend_err)?;

        let label_for = |seg: &SegmentValue<usize>| match seg {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                bars.labels.get(*i).cloned().unwrap_or_default()
            }
            SegmentValue::Last => String::new(),
        };
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n)
            .y_label_formatter(&label_for)
            .draw()
            .map_err(backend_err)?;

        let color = series_rgb(0);
        chart
            .draw_series(bars.means.iter().enumerate().map(|(i, &mean)| {
                Rectangle::new(
                    [
                        (0.0, SegmentValue::Exact(i)),
                        (mean, SegmentValue::Exact(i + 1)),
                    ],
                    color.mix(0.8).filled(),
                )
            }))
            .map_err(backend_err)?;

        Ok(())
    }

    fn export_scatter(dashboard: &Dashboard, name: &str, path: &Path) -> Result<(), ExportError> {
        let root = BitMapBackend::new(path, (800, 650)).into_drawing_area();
        root.fill(&WHITE).map_err(backend_err)?;

        let view = Self::view(dashboard, name)?;
        Self::draw_scatter(&root, view, dashboard)?;

        root.present().map_err(backend_err)?;
        Ok(())
    }

    fn draw_scatter(
        area: &DrawingArea<BitMapBackend, Shift>,
        view: &View,
        dashboard: &Dashboard,
    ) -> Result<(), ExportError> {
        let series = view.scatter_data(dashboard.session())?;

        let (x_range, y_range) = Self::scatter_ranges(view, &series);
        let mut chart = ChartBuilder::on(area)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range, y_range)
            .map_err(backend_err)?;

        chart
            .configure_mesh()
            .x_desc(view.spec.x.label())
            .y_desc(view.spec.y.label())
            .draw()
            .map_err(backend_err)?;

        for (idx, s) in series.iter().enumerate() {
            let color = series_rgb(idx);
            chart
                .draw_series(
                    s.points
                        .iter()
                        .map(|p| Circle::new((p.x, p.y), 3, color.mix(0.7).filled())),
                )
                .map_err(backend_err)?
                .label(s.label.clone())
                .legend(move |(x, y)| Circle::new((x, y), 3, color.filled()));
        }

        chart
            .configure_series_labels()
            .border_style(BLACK)
            .background_style(WHITE.mix(0.8))
            .draw()
            .map_err(backend_err)?;

        Ok(())
    }

    fn scatter_ranges(
        view: &View,
        series: &[crate::compose::view::ScatterSeries],
    ) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
        let points = series.iter().flat_map(|s| s.points.iter());
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for p in points {
            x_min = x_min.min(p.x);
            x_max = x_max.max(p.x);
            y_min = y_min.min(p.y);
            y_max = y_max.max(p.y);
        }
        if !x_min.is_finite() {
            (x_min, x_max, y_min, y_max) = (0.0, 1.0, 0.0, 1.0);
        }

        let [x_lo, x_hi] = view.spec.x.domain.unwrap_or([x_min, x_max]);
        let [y_lo, y_hi] = view.spec.y.domain.unwrap_or([y_min, y_max]);
        let pad_x = ((x_hi - x_lo) * 0.05).max(0.1);
        let pad_y = ((y_hi - y_lo) * 0.05).max(0.1);
        (x_lo - pad_x..x_hi + pad_x, y_lo - pad_y..y_hi + pad_y)
    }

    fn export_driver_pair(dashboard: &Dashboard, path: &Path) -> Result<(), ExportError> {
        let root = BitMapBackend::new(path, (1200, 550)).into_drawing_area();
        root.fill(&WHITE).map_err(backend_err)?;
        let halves = root.split_evenly((1, 2));

        let scatter = Self::view(dashboard, VIEW_DRIVER_SCATTER)?;
        Self::draw_scatter(&halves[0], scatter, dashboard)?;

        let hist_view = Self::view(dashboard, VIEW_DRIVER_HIST)?;
        Self::draw_histogram(&halves[1], hist_view, dashboard)?;

        root.present().map_err(backend_err)?;
        Ok(())
    }

    fn draw_histogram(
        area: &DrawingArea<BitMapBackend, Shift>,
        view: &View,
        dashboard: &Dashboard,
    ) -> Result<(), ExportError> {
        let hist = view.histogram_data(dashboard.session())?;
        let params = hist.params;
        let max_count = hist
            .series
            .iter()
            .flat_map(|s| s.counts.iter())
            .cloned()
            .max()
            .unwrap_or(0)
            .max(1);

        let mut chart = ChartBuilder::on(area)
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(params.start..params.stop, 0.0..max_count as f64 * 1.1)
            .map_err(backend_err)?;

        chart
            .configure_mesh()
            .x_desc(view.spec.x.label())
            .y_desc("count")
            .draw()
            .map_err(backend_err)?;

        let edges = params.edges();
        for (idx, s) in hist.series.iter().enumerate() {
            let color = series_rgb(idx);
            chart
                .draw_series(s.counts.iter().enumerate().filter(|(_, &c)| c > 0).map(
                    |(b, &count)| {
                        Rectangle::new(
                            [(edges[b], 0.0), (edges[b + 1], count as f64)],
                            color.mix(0.3).filled(),
                        )
                    },
                ))
                .map_err(backend_err)?;
        }

        Ok(())
    }
}
