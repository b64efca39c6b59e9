//! Distance metrics used by nearest-code search.

use serde::{Deserialize, Serialize};

/// Distance between two flattened features of equal length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// L2 distance.
    #[default]
    Euclidean,
    /// L1 distance.
    Manhattan,
    /// L-infinity distance.
    Chebyshev,
    /// General L-p distance.
    Minkowski {
        /// Exponent, at least 1 for a true metric.
        p: f64,
    },
}

impl Metric {
    /// Computes the distance between `a` and `b`.
    ///
    /// Only the common prefix is compared when the lengths differ; callers
    /// are expected to pass vectors of identical length.
    pub fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let diffs = a.iter().zip(b).map(|(x, y)| (x - y).abs());
        match *self {
            Metric::Euclidean => diffs.map(|d| d * d).sum::<f64>().sqrt(),
            Metric::Manhattan => diffs.sum(),
            Metric::Chebyshev => diffs.fold(0.0, f64::max),
            Metric::Minkowski { p } => diffs.map(|d| d.powf(p)).sum::<f64>().powf(1.0 / p),
        }
    }

    /// Returns whether the metric parameters are usable.
    pub fn is_valid(&self) -> bool {
        match *self {
            Metric::Minkowski { p } => p.is_finite() && p >= 1.0,
            _ => true,
        }
    }
}
