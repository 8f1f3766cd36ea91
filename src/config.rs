//! Application configuration.
//! Compiled-in defaults, optionally overridden by a JSON file in the
//! working directory.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the optional override file looked up next to the binary.
pub const CONFIG_FILE: &str = "sleepscope.json";

/// Fixed composition-time configuration: dataset location, the two dropdown
/// option lists, and the axis domains shared by the scatter and its
/// marginal histograms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// CSV loaded at startup when present.
    pub csv_path: String,
    /// Option list for the category breakdown dropdown (panel 1).
    pub category_options: Vec<String>,
    /// Option list for the x-variable dropdown (panel 3).
    pub numeric_options: Vec<String>,
    /// Sleep Duration axis domain, shared with the top marginal histogram.
    pub duration_domain: [f64; 2],
    /// Quality of Sleep axis domain, shared with the right marginal histogram.
    pub quality_domain: [f64; 2],
    /// Upper bound on histogram bucket counts.
    pub max_bins: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            csv_path: "SHLS.csv".to_string(),
            category_options: vec![
                "Gender".to_string(),
                "Occupation".to_string(),
                "BMI Category".to_string(),
                "Sleep Disorder".to_string(),
            ],
            numeric_options: vec![
                "Age".to_string(),
                "Physical Activity Level".to_string(),
                "Stress Level".to_string(),
                "Heart Rate".to_string(),
                "Daily Steps".to_string(),
            ],
            duration_domain: [5.5, 8.5],
            quality_domain: [4.0, 9.0],
            max_bins: 6,
        }
    }
}

impl AppConfig {
    /// Load the override file if it exists, otherwise return defaults.
    /// A malformed file is logged and ignored rather than aborting startup.
    pub fn load() -> Self {
        let path = Path::new(CONFIG_FILE);
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|text| serde_json::from_str(&text).map_err(anyhow::Error::from))
        {
            Ok(config) => {
                log::info!("loaded configuration from {CONFIG_FILE}");
                config
            }
            Err(e) => {
                log::warn!("ignoring {CONFIG_FILE}: {e}");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_option_lists() {
        let config = AppConfig::default();
        assert_eq!(config.category_options.len(), 4);
        assert_eq!(config.numeric_options.len(), 5);
        assert_eq!(config.duration_domain, [5.5, 8.5]);
        assert_eq!(config.quality_domain, [4.0, 9.0]);
        assert_eq!(config.max_bins, 6);
    }

    #[test]
    fn partial_override_keeps_remaining_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{ "csv_path": "data/sleep.csv" }"#).unwrap();
        assert_eq!(config.csv_path, "data/sleep.csv");
        assert_eq!(config.max_bins, 6);
        assert_eq!(config.category_options.len(), 4);
    }
}
