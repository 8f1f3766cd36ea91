//! Statistics Calculator Module
//! Descriptive statistics per category group and Welch's t-test against a
//! control group, per outcome measure.

use polars::prelude::*;
use rayon::prelude::*;
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::collections::HashMap;

/// Significance threshold for the t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Statistics for a single group.
#[derive(Debug, Clone)]
pub struct GroupStats {
    pub group_name: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub variance: f64,
    pub p95: f64,
    pub p05: f64,
    pub std_diff_from_control: Option<f64>,
    pub p_value: Option<f64>,
    pub is_significant: bool,
}

impl Default for GroupStats {
    fn default() -> Self {
        Self {
            group_name: String::new(),
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            variance: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
            std_diff_from_control: None,
            p_value: None,
            is_significant: false,
        }
    }
}

/// Statistics for one outcome measure across the groups of a categorical
/// field.
#[derive(Debug, Clone)]
pub struct MeasureStats {
    pub measure: String,
    pub group_field: String,
    pub control_group: String,
    pub group_stats: HashMap<String, GroupStats>,
}

impl MeasureStats {
    /// Get groups ordered with the control first.
    pub fn ordered_groups(&self) -> Vec<String> {
        let mut groups: Vec<String> = self.group_stats.keys().cloned().collect();
        groups.sort();

        if let Some(pos) = groups.iter().position(|g| g == &self.control_group) {
            groups.remove(pos);
            groups.insert(0, self.control_group.clone());
        }

        groups
    }

    /// Check if any non-control group differs significantly.
    pub fn has_significant_results(&self) -> bool {
        self.group_stats
            .iter()
            .any(|(name, gs)| name != &self.control_group && gs.is_significant)
    }
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> GroupStats {
        let n = values.len();
        if n == 0 {
            return GroupStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std = variance.sqrt();

        let p95 = Self::percentile(&sorted, 95.0);
        let p05 = Self::percentile(&sorted, 5.0);

        GroupStats {
            group_name: String::new(),
            count: n,
            mean,
            median,
            std,
            variance,
            p95,
            p05,
            std_diff_from_control: None,
            p_value: None,
            is_significant: false,
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Perform Welch's t-test (independent samples, unequal variance).
    pub fn perform_ttest(group_values: &[f64], control_values: &[f64]) -> (f64, bool) {
        let n1 = group_values.len() as f64;
        let n2 = control_values.len() as f64;

        if n1 < 2.0 || n2 < 2.0 {
            return (f64::NAN, false);
        }

        let mean1 = group_values.iter().sum::<f64>() / n1;
        let mean2 = control_values.iter().sum::<f64>() / n2;

        let var1 = group_values
            .iter()
            .map(|x| (x - mean1).powi(2))
            .sum::<f64>()
            / (n1 - 1.0);
        let var2 = control_values
            .iter()
            .map(|x| (x - mean2).powi(2))
            .sum::<f64>()
            / (n2 - 1.0);

        let se = (var1 / n1 + var2 / n2).sqrt();
        if se == 0.0 {
            return (1.0, false); // No variance difference
        }

        let t = (mean1 - mean2) / se;

        // Welch-Satterthwaite degrees of freedom
        let df_num = (var1 / n1 + var2 / n2).powi(2);
        let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
        let df = df_num / df_denom;

        // Two-tailed p-value using t-distribution
        if let Ok(dist) = StudentsT::new(0.0, 1.0, df) {
            let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
            let is_significant = p_value <= SIGNIFICANCE_THRESHOLD;
            (p_value, is_significant)
        } else {
            (f64::NAN, false)
        }
    }

    /// Get one measure's values for a specific group.
    pub fn values_for_group(
        df: &DataFrame,
        group_field: &str,
        group: &str,
        measure: &str,
    ) -> Vec<f64> {
        df.clone()
            .lazy()
            .filter(col(group_field).eq(lit(group)))
            .select([col(measure).cast(DataType::Float64)])
            .collect()
            .ok()
            .and_then(|df| df.column(measure).ok().cloned())
            .map(|col| {
                col.f64()
                    .ok()
                    .map(|ca| ca.into_iter().flatten().collect())
                    .unwrap_or_default()
            })
            .unwrap_or_default()
    }

    /// Compute statistics for all groups of one measure.
    pub fn compute_measure_stats(
        df: &DataFrame,
        measure: &str,
        group_field: &str,
        control_group: &str,
    ) -> MeasureStats {
        let groups = crate::data::loader::unique_values(df, group_field);

        let mut group_stats: HashMap<String, GroupStats> = HashMap::new();

        // Control group first so the comparisons have a baseline.
        let control_values = Self::values_for_group(df, group_field, control_group, measure);
        let mut control_stats = Self::compute_descriptive_stats(&control_values);
        control_stats.group_name = control_group.to_string();
        let control_std = control_stats.std;
        let control_mean = control_stats.mean;
        group_stats.insert(control_group.to_string(), control_stats);

        for group_name in &groups {
            if group_name == control_group {
                continue;
            }

            let values = Self::values_for_group(df, group_field, group_name, measure);
            let mut gs = Self::compute_descriptive_stats(&values);
            gs.group_name = group_name.clone();

            // Standardized mean difference against the control.
            if control_std > 0.0 && !control_mean.is_nan() {
                gs.std_diff_from_control = Some((gs.mean - control_mean) / control_std);
            }

            if !control_values.is_empty() {
                let (p_value, is_significant) = Self::perform_ttest(&values, &control_values);
                gs.p_value = Some(p_value);
                gs.is_significant = is_significant;
            }

            group_stats.insert(group_name.clone(), gs);
        }

        MeasureStats {
            measure: measure.to_string(),
            group_field: group_field.to_string(),
            control_group: control_group.to_string(),
            group_stats,
        }
    }

    /// Compute statistics for several measures in parallel.
    pub fn compute_all_parallel(
        df: &DataFrame,
        measures: &[String],
        group_field: &str,
        control_group: &str,
    ) -> HashMap<String, MeasureStats> {
        measures
            .par_iter()
            .map(|measure| {
                let stats = Self::compute_measure_stats(df, measure, group_field, control_group);
                (measure.clone(), stats)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{self, tests::five_rows};

    #[test]
    fn descriptive_stats_on_known_values() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let stats = StatsCalculator::compute_descriptive_stats(&values);
        assert_eq!(stats.count, 5);
        assert!((stats.mean - 3.0).abs() < 1e-12);
        assert!((stats.median - 3.0).abs() < 1e-12);
        assert!((stats.variance - 2.5).abs() < 1e-12);
        assert!((stats.p95 - 4.8).abs() < 1e-12);
        assert!((stats.p05 - 1.2).abs() < 1e-12);
    }

    #[test]
    fn ttest_separates_disjoint_samples() {
        let group = [10.0, 10.5, 11.0, 10.2, 10.8, 10.4];
        let control = [2.0, 2.5, 2.1, 2.4, 2.2, 2.6];
        let (p, significant) = StatsCalculator::perform_ttest(&group, &control);
        assert!(p < 0.001);
        assert!(significant);

        let (p_same, significant_same) = StatsCalculator::perform_ttest(&control, &control);
        assert!(p_same > 0.9);
        assert!(!significant_same);
    }

    #[test]
    fn measure_stats_put_control_first() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();

        let stats = StatsCalculator::compute_measure_stats(
            &df,
            "Sleep Duration",
            "Sleep Disorder",
            "None",
        );
        let ordered = stats.ordered_groups();
        assert_eq!(ordered[0], "None");
        assert_eq!(ordered.len(), 3);
        assert_eq!(stats.group_stats["Insomnia"].count, 2);
        assert!((stats.group_stats["None"].mean - 6.1).abs() < 1e-9);
    }

    #[test]
    fn parallel_results_cover_every_measure() {
        let file = five_rows();
        let df = loader::load(file.path().to_str().unwrap()).unwrap();

        let measures = vec!["Sleep Duration".to_string(), "Quality of Sleep".to_string()];
        let all =
            StatsCalculator::compute_all_parallel(&df, &measures, "Sleep Disorder", "None");
        assert_eq!(all.len(), 2);
        assert!(all.contains_key("Quality of Sleep"));
    }
}
