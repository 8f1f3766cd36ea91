//! Chart composer - declarative view grammar over one loaded dataset
//!
//! Architecture:
//! ```text
//!   DataFrame ──► fold (optional) ──► View::frame()
//!                                        │ filters re-evaluated against
//!                                        ▼ Selection values every render
//!   SessionState { Selection… } ──► filtered frame ──► bar / scatter /
//!                                                      histogram data
//! ```

pub mod bin;
pub mod dashboard;
pub mod layout;
pub mod selection;
pub mod view;

pub use bin::{BinConfig, BinParams};
pub use dashboard::{Dashboard, Panel};
pub use layout::Layout;
pub use selection::{Selection, SelectionBinding, SessionState};
pub use view::{Aggregate, Encoding, Mark, SortSpec, View, ViewSpec};

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComposeError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("{owner}: unknown field '{field}'")]
    UnknownField { owner: String, field: String },
    #[error("Selection '{0}' has an empty option list")]
    EmptyOptions(String),
    #[error("Selection already bound: {0}")]
    DuplicateSelection(String),
    #[error("View '{view}' references unknown selection '{selection}'")]
    UnknownSelection { view: String, selection: String },
    #[error(transparent)]
    Transform(#[from] crate::data::TransformError),
}
