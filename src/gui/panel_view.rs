//! Panel View Widget
//! Central scrollable area: draws the three composed panels by walking
//! their layout trees, plus the clickable legend and the comparison table.

use crate::charts::ChartPlotter;
use crate::compose::dashboard::SEL_DISORDER;
use crate::compose::{Dashboard, Layout};
use crate::stats::MeasureStats;
use egui::{Color32, RichText, ScrollArea};
use std::collections::HashMap;

const PANEL_SPACING: f32 = 15.0;

/// Scrollable dashboard area.
pub struct PanelView;

impl PanelView {
    /// Draw every panel; legend clicks toggle the disorder selection.
    pub fn show(
        ui: &mut egui::Ui,
        dashboard: &mut Dashboard,
        stats: &HashMap<String, MeasureStats>,
        measure_order: &[&str],
    ) {
        let mut legend_click: Option<String> = None;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for (index, panel) in dashboard.panels().iter().enumerate() {
                    egui::Frame::none()
                        .rounding(8.0)
                        .stroke(egui::Stroke::new(1.0, Color32::from_gray(70)))
                        .fill(ui.visuals().widgets.noninteractive.bg_fill)
                        .inner_margin(12.0)
                        .show(ui, |ui| {
                            ui.label(RichText::new(&panel.title).size(18.0).strong());
                            ui.label(
                                RichText::new(&panel.hint).size(11.0).color(Color32::GRAY),
                            );
                            ui.add_space(6.0);

                            // Panels linked to the legend selection get the
                            // clickable legend row, colored in series order.
                            let legend_view = panel
                                .layout
                                .view_names()
                                .into_iter()
                                .filter_map(|name| dashboard.view(name))
                                .find(|v| {
                                    v.spec.filters.iter().any(|f| f.as_str() == SEL_DISORDER)
                                        && !v.series_labels().is_empty()
                                });
                            if let Some(view) = legend_view {
                                if let Some(clicked) = ChartPlotter::draw_legend(
                                    ui,
                                    view.series_labels(),
                                    dashboard.session().value(SEL_DISORDER),
                                ) {
                                    legend_click = Some(clicked);
                                }
                                ui.add_space(4.0);
                            }

                            Self::draw_layout(ui, dashboard, &panel.layout);

                            // Group comparison table under the scatter panel.
                            if index == 1 && !stats.is_empty() {
                                ui.add_space(8.0);
                                for measure in measure_order {
                                    if let Some(ms) = stats.get(*measure) {
                                        ChartPlotter::draw_stats_table(ui, ms);
                                        ui.add_space(6.0);
                                    }
                                }
                            }
                        });
                    ui.add_space(PANEL_SPACING);
                }
            });

        if let Some(value) = legend_click {
            dashboard.session_mut().toggle(SEL_DISORDER, &value);
        }
    }

    /// Recursively render a layout tree.
    fn draw_layout(ui: &mut egui::Ui, dashboard: &Dashboard, layout: &Layout) {
        match layout {
            Layout::View(name) => match dashboard.view(name) {
                Some(view) => ChartPlotter::draw_view(ui, view, dashboard.session()),
                None => {
                    ui.label(format!("Missing view: {name}"));
                }
            },
            Layout::HConcat(items) => {
                ui.horizontal(|ui| {
                    for item in items {
                        Self::draw_layout(ui, dashboard, item);
                        ui.add_space(6.0);
                    }
                });
            }
            Layout::VConcat(items) => {
                ui.vertical(|ui| {
                    for item in items {
                        Self::draw_layout(ui, dashboard, item);
                        ui.add_space(6.0);
                    }
                });
            }
        }
    }
}
