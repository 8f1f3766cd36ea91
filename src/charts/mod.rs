//! Charts module - interactive rendering and static export

mod export;
mod plotter;

pub use export::{ChartExporter, ExportError};
pub use plotter::ChartPlotter;
