//! SleepScope - Sleep, Health & Lifestyle Explorer
//!
//! Loads the Sleep, Health & Lifestyle dataset and renders three panels of
//! linked interactive charts for exploring how lifestyle factors relate to
//! sleep duration and quality.

mod config;
mod data;
mod compose;
mod stats;
mod charts;
mod gui;

use eframe::egui;
use gui::SleepScopeApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("SleepScope"),
        ..Default::default()
    };

    eframe::run_native(
        "SleepScope",
        options,
        Box::new(|cc| Ok(Box::new(SleepScopeApp::new(cc)))),
    )
}
