//! Data module - CSV loading, normalization, and reshaping

pub mod loader;
pub mod transform;

pub use loader::{load, DataError};
pub use transform::{fold, TransformError, FOLD_KEY, FOLD_VALUE};
