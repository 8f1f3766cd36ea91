//! Data Transform Module
//! Long-form reshaping: folds a set of named columns into key/value pairs.

use polars::prelude::*;
use thiserror::Error;

/// Output column holding the folded column's name.
pub const FOLD_KEY: &str = "column";
/// Output column holding the folded column's value.
pub const FOLD_VALUE: &str = "value";

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Cannot fold missing column: {0}")]
    MissingColumn(String),
    #[error("Fold requires at least one column")]
    NoColumns,
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Reshape `columns` into long form: one output row per (input row × folded
/// column), with `column` naming the source field and `value` carrying its
/// cell. All other source columns pass through unchanged, so downstream
/// encodings can still reach them. The input is never mutated.
///
/// `value` is Float64 when every folded column is numeric, String otherwise.
pub fn fold(df: &DataFrame, columns: &[String]) -> Result<DataFrame, TransformError> {
    if columns.is_empty() {
        return Err(TransformError::NoColumns);
    }

    let mut all_numeric = true;
    for name in columns {
        let column = df
            .column(name)
            .map_err(|_| TransformError::MissingColumn(name.clone()))?;
        if !is_numeric(column.dtype()) {
            all_numeric = false;
        }
    }
    let value_dtype = if all_numeric {
        DataType::Float64
    } else {
        DataType::String
    };

    let frames: Vec<LazyFrame> = columns
        .iter()
        .map(|name| {
            df.clone().lazy().with_columns([
                lit(name.as_str()).alias(FOLD_KEY),
                col(name.as_str())
                    .cast(value_dtype.clone())
                    .alias(FOLD_VALUE),
            ])
        })
        .collect();

    let folded = concat(frames, UnionArgs::default())?.collect()?;
    Ok(folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{self, tests::five_rows};

    #[test]
    fn fold_height_is_rows_times_columns() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();

        let columns = vec!["Gender".to_string(), "BMI Category".to_string()];
        let folded = fold(&df, &columns).unwrap();
        assert_eq!(folded.height(), df.height() * columns.len());

        // Original columns pass through for downstream encodings.
        assert!(loader::has_column(&folded, "Sleep Duration"));
        assert!(loader::has_column(&folded, FOLD_KEY));
        assert!(loader::has_column(&folded, FOLD_VALUE));
    }

    #[test]
    fn fold_value_matches_source_field() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();

        let columns = vec!["Gender".to_string(), "Sleep Disorder".to_string()];
        let folded = fold(&df, &columns).unwrap();

        let ids = folded.column("Person ID").unwrap();
        let keys = folded.column(FOLD_KEY).unwrap();
        let values = folded.column(FOLD_VALUE).unwrap();

        for i in 0..folded.height() {
            let id = ids.get(i).unwrap().to_string();
            let key = keys.get(i).unwrap().to_string().trim_matches('"').to_string();
            let value = values.get(i).unwrap().to_string().trim_matches('"').to_string();

            // Locate the source row by identifier and compare fields.
            let source_ids = df.column("Person ID").unwrap();
            let row = (0..df.height())
                .find(|&r| source_ids.get(r).unwrap().to_string() == id)
                .unwrap();
            let expected = df
                .column(&key)
                .unwrap()
                .get(row)
                .unwrap()
                .to_string()
                .trim_matches('"')
                .to_string();
            assert_eq!(value, expected);
        }
    }

    #[test]
    fn numeric_fold_produces_float_values() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();

        let columns = vec!["Age".to_string(), "Heart Rate".to_string()];
        let folded = fold(&df, &columns).unwrap();
        assert_eq!(folded.column(FOLD_VALUE).unwrap().dtype(), &DataType::Float64);
        assert_eq!(folded.height(), 10);
    }

    #[test]
    fn folding_missing_column_fails() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();

        let err = fold(&df, &["Shoe Size".to_string()]).unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn(_)));
    }
}
