//! Chart Plotter Module
//! Renders composed views with egui_plot: aggregated bar pairs, scatters
//! with a nearest-point hover readout, and overlapping histograms.

use crate::compose::{Mark, SessionState, View};
use crate::stats::MeasureStats;
use egui::{Color32, RichText};
use egui_plot::{Bar, BarChart, Plot, PlotPoints, Points};

/// Color palette for category series
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(52, 152, 219),  // Blue
    Color32::from_rgb(231, 76, 60),   // Red
    Color32::from_rgb(46, 204, 113),  // Green
    Color32::from_rgb(155, 89, 182),  // Purple
    Color32::from_rgb(243, 156, 18),  // Orange
    Color32::from_rgb(26, 188, 156),  // Teal
    Color32::from_rgb(233, 30, 99),   // Pink
    Color32::from_rgb(0, 188, 212),   // Cyan
    Color32::from_rgb(255, 87, 34),   // Deep Orange
    Color32::from_rgb(96, 125, 139),  // Blue Grey
];

/// Display scale applied to the descriptor's layout hints.
const SCALE: f32 = 1.6;

/// Creates interactive visualizations using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Color for the series at `index` of a view's label order.
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw one composed view, dispatching on its mark shape.
    pub fn draw_view(ui: &mut egui::Ui, view: &View, session: &SessionState) {
        match view.spec.mark {
            Mark::Circle => Self::draw_scatter(ui, view, session),
            Mark::Bar if view.spec.x.bin.is_some() || view.spec.y.bin.is_some() => {
                Self::draw_histogram(ui, view, session)
            }
            Mark::Bar => Self::draw_bars(ui, view, session),
        }
    }

    /// Horizontal mean bars with the category axis in sort order.
    fn draw_bars(ui: &mut egui::Ui, view: &View, session: &SessionState) {
        let bars = match view.bar_data(session) {
            Ok(bars) => bars,
            Err(e) => {
                log::error!("bar data for '{}': {e}", view.spec.name);
                ui.label(format!("Chart error: {e}"));
                return;
            }
        };

        let labels = bars.labels.clone();
        let elements: Vec<Bar> = bars
            .labels
            .iter()
            .enumerate()
            .map(|(i, label)| {
                Bar::new(i as f64, bars.means[i])
                    .name(format!("{label}  n={}", bars.counts[i]))
                    .width(0.7)
                    .fill(Self::series_color(0).gamma_multiply(0.8))
            })
            .collect();

        Plot::new(format!("bars_{}", view.spec.name))
            .width(view.spec.width * SCALE)
            .height(view.spec.height * SCALE)
            .x_axis_label(view.spec.x.label())
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                labels
                    .get(idx as usize)
                    .cloned()
                    .unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(elements).horizontal());
            });
    }

    /// Scatter with per-category colors and a nearest-point hover readout.
    fn draw_scatter(ui: &mut egui::Ui, view: &View, session: &SessionState) {
        let series = match view.scatter_data(session) {
            Ok(series) => series,
            Err(e) => {
                log::error!("scatter data for '{}': {e}", view.spec.name);
                ui.label(format!("Chart error: {e}"));
                return;
            }
        };

        let mut plot = Plot::new(format!("scatter_{}", view.spec.name))
            .width(view.spec.width * SCALE)
            .height(view.spec.height * SCALE)
            .x_axis_label(view.spec.x.label())
            .y_axis_label(view.spec.y.label())
            .allow_zoom(true)
            .allow_drag(true)
            .allow_scroll(false);
        if let Some([lo, hi]) = view.spec.x.domain {
            plot = plot.include_x(lo).include_x(hi);
        }
        if let Some([lo, hi]) = view.spec.y.domain {
            plot = plot.include_y(lo).include_y(hi);
        }

        let hover = plot
            .show(ui, |plot_ui| {
                for (idx, s) in series.iter().enumerate() {
                    let points: PlotPoints =
                        s.points.iter().map(|p| [p.x, p.y]).collect();
                    plot_ui.points(
                        Points::new(points)
                            .radius(3.0)
                            .color(Self::series_color(idx))
                            .name(&s.label),
                    );
                }

                // Nearest point within a small fraction of the visible span.
                let pointer = plot_ui.pointer_coordinate()?;
                let bounds = plot_ui.plot_bounds();
                let span_x = bounds.width().max(f64::EPSILON);
                let span_y = bounds.height().max(f64::EPSILON);

                let mut best: Option<(f64, &str)> = None;
                for s in &series {
                    for p in &s.points {
                        let dx = (p.x - pointer.x) / span_x;
                        let dy = (p.y - pointer.y) / span_y;
                        let d = dx * dx + dy * dy;
                        if best.map_or(true, |(b, _)| d < b) {
                            best = Some((d, &p.tooltip));
                        }
                    }
                }
                match best {
                    Some((d, tooltip)) if d.sqrt() < 0.03 && !tooltip.is_empty() => {
                        Some(tooltip.to_string())
                    }
                    _ => None,
                }
            })
            .inner;

        if let Some(text) = hover {
            egui::show_tooltip_at_pointer(
                ui.ctx(),
                ui.layer_id(),
                egui::Id::new(format!("tip_{}", view.spec.name)),
                |ui| {
                    ui.label(text);
                },
            );
        }
    }

    /// Overlapping per-category histograms on shared bin edges. Bars run
    /// upward when the x encoding is binned and sideways when y is.
    fn draw_histogram(ui: &mut egui::Ui, view: &View, session: &SessionState) {
        let hist = match view.histogram_data(session) {
            Ok(hist) => hist,
            Err(e) => {
                log::error!("histogram data for '{}': {e}", view.spec.name);
                ui.label(format!("Chart error: {e}"));
                return;
            }
        };

        let sideways = view.spec.y.bin.is_some();
        let params = hist.params;

        let mut plot = Plot::new(format!("hist_{}", view.spec.name))
            .width(view.spec.width * SCALE)
            .height(view.spec.height * SCALE)
            .x_axis_label(view.spec.x.label())
            .y_axis_label(view.spec.y.label())
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false);
        if sideways {
            plot = plot.include_y(params.start).include_y(params.stop);
        } else {
            plot = plot.include_x(params.start).include_x(params.stop);
        }

        plot.show(ui, |plot_ui| {
            for (idx, s) in hist.series.iter().enumerate() {
                let color = Self::series_color(idx);
                let bars: Vec<Bar> = s
                    .counts
                    .iter()
                    .enumerate()
                    .filter(|(_, &count)| count > 0)
                    .map(|(b, &count)| {
                        let center = params.start + (b as f64 + 0.5) * params.step;
                        Bar::new(center, count as f64)
                            .width(params.step)
                            .name(&s.label)
                            .fill(color.gamma_multiply(0.3))
                            .stroke(egui::Stroke::new(1.0, color.gamma_multiply(0.6)))
                    })
                    .collect();

                let mut chart = BarChart::new(bars).name(&s.label);
                if sideways {
                    chart = chart.horizontal();
                }
                plot_ui.bar_chart(chart);
            }
        });
    }

    /// Draw the group comparison table for one outcome measure.
    pub fn draw_stats_table(ui: &mut egui::Ui, stats: &MeasureStats) {
        let ordered = stats.ordered_groups();
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.label(RichText::new(&stats.measure).strong().size(13.0));
                egui::Grid::new(ui.make_persistent_id(format!("stats_{}", stats.measure)))
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        for header in ["Group", "N", "Mean", "Median", "Std", "P95", "P05",
                                       "(M-C)/σ", "P-value"] {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        let default_text_color = ui.visuals().text_color();
                        let significant_color = Color32::from_rgb(220, 53, 69);

                        for group_name in &ordered {
                            let Some(gs) = stats.group_stats.get(group_name) else {
                                continue;
                            };
                            let is_control = group_name == &stats.control_group;
                            let text_color = if is_control {
                                PALETTE[0]
                            } else if gs.is_significant {
                                significant_color
                            } else {
                                default_text_color
                            };

                            ui.label(RichText::new(&gs.group_name).size(11.0).color(text_color));
                            ui.label(RichText::new(gs.count.to_string()).size(11.0));
                            ui.label(RichText::new(format!("{:.3}", gs.mean)).size(11.0));
                            ui.label(RichText::new(format!("{:.3}", gs.median)).size(11.0));
                            ui.label(RichText::new(format!("{:.3}", gs.std)).size(11.0));
                            ui.label(RichText::new(format!("{:.3}", gs.p95)).size(11.0));
                            ui.label(RichText::new(format!("{:.3}", gs.p05)).size(11.0));

                            if let Some(diff) = gs.std_diff_from_control {
                                ui.label(RichText::new(format!("{:.3}", diff)).size(11.0));
                            } else {
                                ui.label(RichText::new("-").size(11.0));
                            }

                            if let Some(p) = gs.p_value {
                                let p_color = if gs.is_significant {
                                    significant_color
                                } else {
                                    default_text_color
                                };
                                ui.label(
                                    RichText::new(format!("{:.4}", p)).size(11.0).color(p_color),
                                );
                            } else {
                                ui.label(RichText::new("-").size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }

    /// Clickable legend row: swatch plus label per series. Returns the
    /// label clicked this frame, if any.
    pub fn draw_legend(
        ui: &mut egui::Ui,
        labels: &[String],
        selected: Option<&str>,
    ) -> Option<String> {
        let mut clicked = None;
        ui.horizontal_wrapped(|ui| {
            for (idx, label) in labels.iter().enumerate() {
                let color = Self::series_color(idx);
                let dimmed = selected.is_some() && selected != Some(label.as_str());

                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter().rect_filled(
                    rect,
                    2.0,
                    if dimmed {
                        color.gamma_multiply(0.3)
                    } else {
                        color
                    },
                );

                if ui
                    .selectable_label(selected == Some(label.as_str()), label)
                    .clicked()
                {
                    clicked = Some(label.clone());
                }
                ui.add_space(10.0);
            }
        });
        clicked
    }
}
