//! Control Panel Widget
//! Left side panel: data source, the dropdown selections, and status.

use crate::compose::dashboard::{SEL_CATEGORY, SEL_DISORDER, SEL_XVAR};
use crate::compose::{SessionState, SelectionBinding};
use egui::{Color32, ComboBox, RichText};
use std::path::PathBuf;

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    ExportCharts,
}

/// Left side control panel with file selection and the dropdown-bound
/// selections.
pub struct ControlPanel {
    pub csv_path: Option<PathBuf>,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            csv_path: None,
            status: "Ready".to_string(),
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel. `session` is None until a dataset loads.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        session: Option<&mut SessionState>,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("😴 SleepScope")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Sleep, Health & Lifestyle explorer")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data source =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = self
                        .csv_path
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if self.csv_path.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Selections =====
        ui.label(RichText::new("🔧 Selections").size(14.0).strong());
        ui.add_space(8.0);

        match session {
            Some(session) => {
                Self::dropdown_row(ui, session, SEL_CATEGORY, "Category:");
                ui.add_space(5.0);
                Self::dropdown_row(ui, session, SEL_XVAR, "X-variable:");
                ui.add_space(8.0);

                if session.value(SEL_DISORDER).is_some()
                    && ui.small_button("Clear legend filter").clicked()
                {
                    session.set(SEL_DISORDER, None);
                }
            }
            None => {
                ui.label(RichText::new("Load a dataset first.").size(12.0).color(Color32::GRAY));
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("🖼 Export Charts").size(14.0))
                .min_size(egui::vec2(170.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::ExportCharts;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Loaded") || self.status.contains("Exported") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// One labeled dropdown bound to a selection; the "(all)" entry unsets
    /// it.
    fn dropdown_row(ui: &mut egui::Ui, session: &mut SessionState, name: &str, label: &str) {
        let Some(selection) = session.get(name) else {
            return;
        };
        debug_assert_eq!(selection.binding, SelectionBinding::Dropdown);
        let options = selection.options.clone();
        let current = selection.value().map(str::to_string);

        ui.horizontal(|ui| {
            ui.add_sized([90.0, 20.0], egui::Label::new(label));
            ComboBox::from_id_salt(name.to_string())
                .width(160.0)
                .selected_text(current.clone().unwrap_or_else(|| "(all)".to_string()))
                .show_ui(ui, |ui| {
                    if ui.selectable_label(current.is_none(), "(all)").clicked() {
                        session.set(name, None);
                    }
                    for option in &options {
                        if ui
                            .selectable_label(current.as_deref() == Some(option), option)
                            .clicked()
                        {
                            session.set(name, Some(option.clone()));
                        }
                    }
                });
        });
    }
}
