//! Statistics module - group comparisons per outcome measure

mod calculator;

pub use calculator::{GroupStats, MeasureStats, StatsCalculator, SIGNIFICANCE_THRESHOLD};
