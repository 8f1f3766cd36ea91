//! SleepScope Main Application
//! Main window with control panel and the linked chart panels.

use crate::charts::ChartExporter;
use crate::compose::Dashboard;
use crate::config::AppConfig;
use crate::data;
use crate::gui::{ControlPanel, ControlPanelAction, PanelView};
use crate::stats::{MeasureStats, StatsCalculator};
use egui::{RichText, SidePanel};
use std::collections::HashMap;
use std::path::Path;

/// Outcome measures compared across disorder groups.
pub const OUTCOME_MEASURES: [&str; 2] = ["Sleep Duration", "Quality of Sleep"];
const GROUP_FIELD: &str = "Sleep Disorder";
const CONTROL_GROUP: &str = "None";

/// Main application window.
pub struct SleepScopeApp {
    config: AppConfig,
    control_panel: ControlPanel,
    dashboard: Option<Dashboard>,
    stats: HashMap<String, MeasureStats>,
}

impl SleepScopeApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = AppConfig::load();
        let mut app = Self {
            config,
            control_panel: ControlPanel::new(),
            dashboard: None,
            stats: HashMap::new(),
        };

        let default_csv = app.config.csv_path.clone();
        if Path::new(&default_csv).exists() {
            app.load_csv(&default_csv);
        }
        app
    }

    /// Load a CSV and compose the dashboard over it. All failures are
    /// terminal for the attempt: surfaced in the status line, nothing kept.
    fn load_csv(&mut self, path: &str) {
        let result = data::load(path)
            .map_err(anyhow::Error::from)
            .and_then(|df| {
                let dashboard = Dashboard::compose(&self.config, &df)?;
                Ok((df, dashboard))
            });

        match result {
            Ok((df, dashboard)) => {
                let measures: Vec<String> =
                    OUTCOME_MEASURES.iter().map(|m| m.to_string()).collect();
                self.stats = StatsCalculator::compute_all_parallel(
                    &df,
                    &measures,
                    GROUP_FIELD,
                    CONTROL_GROUP,
                );
                self.control_panel.csv_path = Some(path.into());
                self.control_panel
                    .set_status(&format!("Loaded {} rows", df.height()));
                self.dashboard = Some(dashboard);
            }
            Err(e) => {
                log::error!("failed to load {path}: {e:#}");
                self.dashboard = None;
                self.stats.clear();
                self.control_panel.set_status(&format!("Error: {e:#}"));
            }
        }
    }

    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            let path = path.to_string_lossy().to_string();
            self.load_csv(&path);
        }
    }

    fn handle_export_charts(&mut self) {
        let Some(dashboard) = &self.dashboard else {
            self.control_panel.set_status("No charts to export");
            return;
        };

        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        match ChartExporter::export_all(dashboard, &dir) {
            Ok(paths) => {
                self.control_panel
                    .set_status(&format!("Exported {} charts", paths.len()));
            }
            Err(e) => {
                log::error!("chart export failed: {e}");
                self.control_panel.set_status(&format!("Error: {e}"));
            }
        }
    }
}

impl eframe::App for SleepScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut action = ControlPanelAction::None;

        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let session = self.dashboard.as_mut().map(|d| d.session_mut());
                    action = self.control_panel.show(ui, session);
                });
            });

        match action {
            ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
            ControlPanelAction::ExportCharts => self.handle_export_charts(),
            ControlPanelAction::None => {}
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            match &mut self.dashboard {
                Some(dashboard) => {
                    PanelView::show(ui, dashboard, &self.stats, &OUTCOME_MEASURES);
                }
                None => {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            RichText::new("No Data — browse for the Sleep, Health & Lifestyle CSV")
                                .size(20.0),
                        );
                    });
                }
            }
        });
    }
}
