//! CSV Data Loader Module
//! Loads the Sleep, Health & Lifestyle CSV with Polars and applies the
//! load-time normalization steps.

use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Failed to load CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Missing expected column: {0}")]
    MissingColumn(String),
    #[error("Dataset is empty")]
    NoData,
}

/// Columns every loaded dataset must carry. `Blood Pressure` is not listed:
/// it is dropped on load when present and never used downstream.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "Person ID",
    "Gender",
    "Age",
    "Occupation",
    "Sleep Duration",
    "Quality of Sleep",
    "Physical Activity Level",
    "Stress Level",
    "BMI Category",
    "Heart Rate",
    "Daily Steps",
    "Sleep Disorder",
];

/// Load a CSV file and normalize it:
/// * absent `Sleep Disorder` values become the explicit category `"None"`
/// * the retired `"Normal Weight"` BMI label is renamed `"Underweight"`
/// * the `Blood Pressure` column is dropped
pub fn load(file_path: &str) -> Result<DataFrame, DataError> {
    let df = LazyCsvReader::new(file_path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .collect()?;

    if df.height() == 0 {
        return Err(DataError::NoData);
    }

    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    for required in REQUIRED_COLUMNS {
        if !names.iter().any(|n| n == required) {
            return Err(DataError::MissingColumn(required.to_string()));
        }
    }

    let df = if names.iter().any(|n| n == "Blood Pressure") {
        df.drop("Blood Pressure")?
    } else {
        df
    };

    let df = df
        .lazy()
        .with_columns([
            col("Sleep Disorder")
                .cast(DataType::String)
                .fill_null(lit("None")),
            when(col("BMI Category").eq(lit("Normal Weight")))
                .then(lit("Underweight"))
                .otherwise(col("BMI Category"))
                .alias("BMI Category"),
        ])
        .collect()?;

    log::info!(
        "loaded {} rows, {} columns from {}",
        df.height(),
        df.width(),
        file_path
    );

    Ok(df)
}

/// Whether the dataset schema carries the named column.
pub fn has_column(df: &DataFrame, column: &str) -> bool {
    df.get_column_names().iter().any(|n| n.as_str() == column)
}

/// Get unique values from a column.
pub fn unique_values(df: &DataFrame, column: &str) -> Vec<String> {
    df.column(column)
        .ok()
        .and_then(|col| col.unique().ok())
        .map(|unique| {
            let series = unique.as_materialized_series();
            (0..series.len())
                .filter_map(|i| {
                    let val = series.get(i).ok()?;
                    if val.is_null() {
                        None
                    } else {
                        Some(val.to_string().trim_matches('"').to_string())
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "Person ID,Gender,Age,Occupation,Sleep Duration,Quality of Sleep,\
Physical Activity Level,Stress Level,BMI Category,Blood Pressure,Heart Rate,Daily Steps,\
Sleep Disorder";

    pub(crate) fn write_csv(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file.flush().unwrap();
        file
    }

    pub(crate) fn five_rows() -> NamedTempFile {
        write_csv(&[
            "1,Male,27,Engineer,6.1,6,42,6,Overweight,126/83,77,4200,",
            "2,Female,28,Doctor,6.2,6,60,8,Normal,125/80,75,10000,Insomnia",
            "3,Male,28,Doctor,6.2,6,60,8,Normal Weight,125/80,75,10000,Sleep Apnea",
            "4,Female,30,Nurse,7.9,8,75,4,Normal,120/80,68,7000,Insomnia",
            "5,Male,35,Teacher,7.1,7,60,5,Obese,132/87,80,5500,Sleep Apnea",
        ])
    }

    #[test]
    fn empty_disorder_becomes_none_and_others_unchanged() {
        let file = five_rows();
        let df = load(file.path().to_str().unwrap()).unwrap();

        let disorders = unique_values(&df, "Sleep Disorder");
        assert!(disorders.iter().any(|d| d == "None"));

        let col = df.column("Sleep Disorder").unwrap();
        let values: Vec<String> = (0..df.height())
            .map(|i| {
                col.get(i)
                    .unwrap()
                    .to_string()
                    .trim_matches('"')
                    .to_string()
            })
            .collect();
        assert_eq!(
            values,
            ["None", "Insomnia", "Sleep Apnea", "Insomnia", "Sleep Apnea"]
        );
    }

    #[test]
    fn retired_bmi_label_is_renamed() {
        let file = five_rows();
        let df = load(file.path().to_str().unwrap()).unwrap();

        let labels = unique_values(&df, "BMI Category");
        assert!(!labels.iter().any(|l| l == "Normal Weight"));
        assert!(labels.iter().any(|l| l == "Underweight"));

        let col = df.column("BMI Category").unwrap();
        let row2 = col.get(2).unwrap().to_string();
        assert_eq!(row2.trim_matches('"'), "Underweight");
    }

    #[test]
    fn blood_pressure_is_dropped() {
        let file = five_rows();
        let df = load(file.path().to_str().unwrap()).unwrap();
        assert!(!has_column(&df, "Blood Pressure"));
        assert!(has_column(&df, "Heart Rate"));
    }

    #[test]
    fn missing_column_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Person ID,Gender,Age").unwrap();
        writeln!(file, "1,Male,27").unwrap();
        file.flush().unwrap();

        let err = load(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(_)));
    }
}
