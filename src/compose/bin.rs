//! Histogram Binning Module
//! Bounded bucket counts with "nice" steps, matching the 1-2-5 progression
//! so paired marginal histograms line up with their scatter's axis domain.

use serde::{Deserialize, Serialize};

/// Declarative bin request carried by an encoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinConfig {
    /// Upper bound on the number of buckets.
    pub max_bins: usize,
    /// Fixed domain. When set, edges start and stop exactly here so bin
    /// boundaries align with an axis scale sharing the same domain.
    #[serde(default)]
    pub extent: Option<[f64; 2]>,
}

impl BinConfig {
    pub fn new(max_bins: usize) -> Self {
        Self {
            max_bins,
            extent: None,
        }
    }

    pub fn with_extent(max_bins: usize, extent: [f64; 2]) -> Self {
        Self {
            max_bins,
            extent: Some(extent),
        }
    }

    /// Resolve to concrete bin parameters. Falls back to the data extent
    /// when no fixed extent is configured; `None` when there is no data to
    /// derive an extent from.
    pub fn params(&self, values: &[f64]) -> Option<BinParams> {
        if let Some([lo, hi]) = self.extent {
            return BinParams::fixed(lo, hi, self.max_bins);
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            if v.is_nan() {
                continue;
            }
            min = min.min(v);
            max = max.max(v);
        }
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        if min == max {
            // Degenerate single-value data: one bucket around it.
            return Some(BinParams {
                start: min.floor(),
                stop: min.floor() + 1.0,
                step: 1.0,
            });
        }

        let step = nice_step(max - min, self.max_bins);
        let start = (min / step).floor() * step;
        let stop = (max / step).ceil() * step;
        Some(BinParams { start, stop, step })
    }
}

/// Concrete bucket boundaries: `count()` buckets of width `step` covering
/// `[start, stop]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinParams {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl BinParams {
    fn fixed(lo: f64, hi: f64, max_bins: usize) -> Option<Self> {
        if !(hi > lo) || max_bins == 0 {
            return None;
        }
        Some(Self {
            start: lo,
            stop: hi,
            step: nice_step(hi - lo, max_bins),
        })
    }

    /// Number of buckets.
    pub fn count(&self) -> usize {
        (((self.stop - self.start) / self.step) - 1e-9).ceil().max(1.0) as usize
    }

    /// All bucket edges, `count() + 1` of them.
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.count())
            .map(|i| self.start + i as f64 * self.step)
            .collect()
    }

    /// Bucket index for a value; values equal to `stop` land in the last
    /// bucket, values outside the domain land nowhere.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        if value.is_nan() || value < self.start || value > self.stop + 1e-9 {
            return None;
        }
        let idx = ((value - self.start) / self.step).floor() as usize;
        Some(idx.min(self.count() - 1))
    }

    /// Per-bucket counts for a set of values.
    pub fn histogram(&self, values: &[f64]) -> Vec<usize> {
        let mut counts = vec![0usize; self.count()];
        for &v in values {
            if let Some(idx) = self.index_of(v) {
                counts[idx] += 1;
            }
        }
        counts
    }
}

/// Smallest step from the {1, 2, 5}×10^k progression giving at most
/// `max_bins` buckets over `span`.
fn nice_step(span: f64, max_bins: usize) -> f64 {
    let raw = span / max_bins.max(1) as f64;
    if !raw.is_finite() || raw <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(raw.log10().floor());
    for mult in [1.0, 2.0, 5.0] {
        let step = magnitude * mult;
        if step >= raw - magnitude * 1e-9 {
            return step;
        }
    }
    magnitude * 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_extent_bins_match_axis_domain() {
        let params = BinConfig::with_extent(6, [5.5, 8.5]).params(&[]).unwrap();
        assert_eq!(params.step, 0.5);
        assert_eq!(params.count(), 6);
        let edges = params.edges();
        assert_eq!(edges.first().copied(), Some(5.5));
        assert_eq!(edges.last().copied(), Some(8.5));
        assert_eq!(edges, vec![5.5, 6.0, 6.5, 7.0, 7.5, 8.0, 8.5]);
    }

    #[test]
    fn quality_extent_stays_under_max_bins() {
        let params = BinConfig::with_extent(6, [4.0, 9.0]).params(&[]).unwrap();
        assert_eq!(params.step, 1.0);
        assert_eq!(params.count(), 5);
        assert_eq!(params.edges(), vec![4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn data_extent_bins_are_niced_outward() {
        let values = [41.0, 52.0, 63.0, 88.0];
        let params = BinConfig::new(6).params(&values).unwrap();
        assert!(params.start <= 41.0);
        assert!(params.stop >= 88.0);
        assert!(params.count() <= 6);
        // Edges sit on step multiples.
        let ratio = params.start / params.step;
        assert!((ratio - ratio.round()).abs() < 1e-9);
    }

    #[test]
    fn histogram_counts_every_in_domain_value_once() {
        let params = BinConfig::with_extent(6, [5.5, 8.5]).params(&[]).unwrap();
        let values = [5.5, 6.1, 6.2, 6.2, 7.1, 7.9, 8.5];
        let counts = params.histogram(&values);
        assert_eq!(counts.iter().sum::<usize>(), values.len());
        // The domain maximum lands in the last bucket.
        assert!(counts[5] >= 1);
    }

    #[test]
    fn empty_data_without_extent_has_no_bins() {
        assert!(BinConfig::new(6).params(&[]).is_none());
    }
}
