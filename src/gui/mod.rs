//! GUI module - User interface components

mod app;
mod control_panel;
mod panel_view;

pub use app::SleepScopeApp;
pub use control_panel::{ControlPanel, ControlPanelAction};
pub use panel_view::PanelView;
