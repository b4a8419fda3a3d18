//! Quantile breakpoints and the four ordinal pollution categories.
//!
//! Breakpoints are `[min, q25, q50, q75, max]` of the finite values in a
//! view. Bins are closed on the right, and the first bin also takes the
//! minimum:
//!
//! ```text
//!   Low        [b0, b1]
//!   Medium     (b1, b2]
//!   High       (b2, b3]
//!   Very High  (b3, b4]
//! ```
//!
//! A value sitting exactly on an inner breakpoint therefore lands in the
//! lower of the two bins. Anything non-finite or outside `[b0, b4]` is
//! [`Category::Unclassified`].

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::data::filter::FilteredView;
use crate::data::model::{Metric, Site};
use crate::error::DataError;

/// Quantile levels for the five breakpoints.
pub const QUANTILE_LEVELS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
    /// Sentinel for values no bin accepts; never drawn.
    Unclassified,
}

impl Category {
    /// The four real bins, lowest first.
    pub const LABELED: [Category; 4] = [
        Category::Low,
        Category::Medium,
        Category::High,
        Category::VeryHigh,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Low => "Low",
            Category::Medium => "Medium",
            Category::High => "High",
            Category::VeryHigh => "Very High",
            Category::Unclassified => "Unclassified",
        }
    }

    pub fn is_labeled(self) -> bool {
        self != Category::Unclassified
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Breakpoints
// ---------------------------------------------------------------------------

/// Non-decreasing `[min, q25, q50, q75, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Breakpoints([f64; 5]);

impl Breakpoints {
    /// Breakpoints of the finite values in `values`; `None` if there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_unstable_by(f64::total_cmp);
        Some(Breakpoints(QUANTILE_LEVELS.map(|p| quantile_sorted(&sorted, p))))
    }

    pub fn edges(&self) -> &[f64; 5] {
        &self.0
    }

    pub fn min(&self) -> f64 {
        self.0[0]
    }

    pub fn max(&self) -> f64 {
        self.0[4]
    }

    /// All five edges equal: every observation had the same value.
    pub fn is_degenerate(&self) -> bool {
        self.min() == self.max()
    }
}

/// Linear-interpolation quantile on **pre-sorted**, non-empty data.
///
/// Position `p * (n - 1)`, interpolated between the neighbouring values.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }

    let h = (n - 1) as f64 * p.clamp(0.0, 1.0);
    let j = h.floor() as usize;
    let g = h - h.floor();

    if j + 1 >= n {
        sorted[n - 1]
    } else {
        (1.0 - g) * sorted[j] + g * sorted[j + 1]
    }
}

/// Breakpoints for one `(site, metric)` column of the view.
pub fn compute_breakpoints(
    view: &FilteredView<'_>,
    site: Site,
    metric: Metric,
) -> Result<Breakpoints, DataError> {
    Breakpoints::from_values(&view.values(site, metric))
        .ok_or(DataError::InsufficientData { site, metric })
}

/// Assign `value` to a bin. Total: never fails, never panics.
pub fn categorize(value: f64, breakpoints: &Breakpoints) -> Category {
    let [b0, b1, b2, b3, b4] = breakpoints.0;
    if !value.is_finite() || value < b0 || value > b4 {
        return Category::Unclassified;
    }

    if value <= b1 {
        Category::Low
    } else if value <= b2 {
        Category::Medium
    } else if value <= b3 {
        Category::High
    } else {
        Category::VeryHigh
    }
}

// ---------------------------------------------------------------------------
// QuantileBinning – breakpoints for every binned (site, metric) pair
// ---------------------------------------------------------------------------

/// Metrics the scatter views bin on.
pub const BINNED_METRICS: [Metric; 2] = [Metric::Pm25, Metric::Pm10];

/// Breakpoints per `(site, metric)`, or why they are unavailable.
///
/// Rebuilt from scratch for every view; never updated in place.
#[derive(Debug, Clone, Default)]
pub struct QuantileBinning {
    entries: BTreeMap<(Site, Metric), Result<Breakpoints, DataError>>,
}

impl QuantileBinning {
    pub fn compute(view: &FilteredView<'_>, sites: &[Site], metrics: &[Metric]) -> Self {
        let mut entries = BTreeMap::new();
        for &site in sites {
            for &metric in metrics {
                entries.insert((site, metric), compute_breakpoints(view, site, metric));
            }
        }
        QuantileBinning { entries }
    }

    pub fn get(&self, site: Site, metric: Metric) -> Option<&Result<Breakpoints, DataError>> {
        self.entries.get(&(site, metric))
    }

    /// Category of `value` for a pair; `Unclassified` if the pair has no breakpoints.
    pub fn categorize(&self, site: Site, metric: Metric, value: f64) -> Category {
        match self.get(site, metric) {
            Some(Ok(bp)) => categorize(value, bp),
            _ => Category::Unclassified,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&(Site, Metric), &Result<Breakpoints, DataError>)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::filter;
    use crate::data::model::tests::hourly_dataset;
    use pretty_assertions::assert_eq;

    fn bp(edges: [f64; 5]) -> Breakpoints {
        Breakpoints(edges)
    }

    #[test]
    fn test_four_row_example() {
        let ds = hourly_dataset(&[10.0, 20.0, 30.0, 40.0]);
        let (lo, hi) = ds.bounds().unwrap();
        let view = filter(&ds, lo, hi).unwrap();
        let b = compute_breakpoints(&view, Site::Shunyi, Metric::Pm25).unwrap();

        assert_eq!(b.edges(), &[10.0, 17.5, 25.0, 32.5, 40.0]);
        assert_eq!(categorize(10.0, &b), Category::Low);
        assert_eq!(categorize(25.0, &b), Category::Medium);
        assert_eq!(categorize(40.0, &b), Category::VeryHigh);
    }

    #[test]
    fn test_boundaries_fall_into_lower_bin() {
        let b = bp([10.0, 17.5, 25.0, 32.5, 40.0]);
        let cases = [
            (10.0, Category::Low),
            (17.5, Category::Low),
            (17.6, Category::Medium),
            (25.0, Category::Medium),
            (25.1, Category::High),
            (32.5, Category::High),
            (32.6, Category::VeryHigh),
            (40.0, Category::VeryHigh),
        ];
        for (v, expected) in cases {
            assert_eq!(categorize(v, &b), expected, "value {v}");
        }
    }

    #[test]
    fn test_unclassified_inputs() {
        let b = bp([10.0, 17.5, 25.0, 32.5, 40.0]);
        for v in [9.99, 40.01, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert_eq!(categorize(v, &b), Category::Unclassified);
        }
    }

    #[test]
    fn test_degenerate_routes_to_low() {
        let b = Breakpoints::from_values(&[7.0, 7.0, 7.0]).unwrap();
        assert!(b.is_degenerate());
        assert_eq!(b.edges(), &[7.0; 5]);
        assert_eq!(categorize(7.0, &b), Category::Low);
        assert_eq!(categorize(7.5, &b), Category::Unclassified);
    }

    #[test]
    fn test_repeated_inner_edges() {
        // q25 == q50 == min: ties resolve to the lowest matching bin
        let b = Breakpoints::from_values(&[1.0, 1.0, 1.0, 1.0, 5.0]).unwrap();
        assert_eq!(b.edges(), &[1.0, 1.0, 1.0, 1.0, 5.0]);
        assert_eq!(categorize(1.0, &b), Category::Low);
        assert_eq!(categorize(3.0, &b), Category::VeryHigh);
    }

    #[test]
    fn test_breakpoints_non_decreasing() {
        let samples: [&[f64]; 4] = [
            &[3.0],
            &[5.0, -2.0],
            &[9.0, 1.0, 4.0, 4.0, 8.0, 0.5, 2.0],
            &[f64::NAN, 2.0, -7.0, 100.0, 3.3],
        ];
        for s in samples {
            let b = Breakpoints::from_values(s).unwrap();
            assert!(b.edges().windows(2).all(|w| w[0] <= w[1]), "{s:?}");
        }
    }

    #[test]
    fn test_categorize_total_over_grid() {
        let b = Breakpoints::from_values(&[2.0, 3.0, 5.0, 8.0, 13.0]).unwrap();
        let mut v = 0.0;
        while v < 15.0 {
            let c = categorize(v, &b);
            assert_eq!(c.is_labeled(), (2.0..=13.0).contains(&v), "value {v}");
            v += 0.25;
        }
    }

    #[test]
    fn test_empty_view_is_insufficient() {
        let ds = hourly_dataset(&[1.0]);
        let t = ds.records()[0].datetime();
        let later = t + chrono::Duration::hours(1);
        let view = filter(&ds, later, later).unwrap();
        assert_eq!(
            compute_breakpoints(&view, Site::Guanyan, Metric::Pm10),
            Err(DataError::InsufficientData {
                site: Site::Guanyan,
                metric: Metric::Pm10
            })
        );
    }

    #[test]
    fn test_all_nan_is_insufficient() {
        let ds = hourly_dataset(&[f64::NAN, f64::NAN]);
        let (lo, hi) = ds.bounds().unwrap();
        let view = filter(&ds, lo, hi).unwrap();
        assert!(compute_breakpoints(&view, Site::Shunyi, Metric::Pm25).is_err());
    }

    #[test]
    fn test_binning_covers_pairs() {
        let ds = hourly_dataset(&[10.0, 20.0, 30.0, 40.0]);
        let (lo, hi) = ds.bounds().unwrap();
        let view = filter(&ds, lo, hi).unwrap();
        let binning = QuantileBinning::compute(&view, &Site::ALL, &BINNED_METRICS);

        assert_eq!(binning.iter().count(), 4);
        assert_eq!(
            binning.categorize(Site::Guanyan, Metric::Pm10, 60.0),
            Category::VeryHigh
        );
        assert_eq!(
            binning.categorize(Site::Guanyan, Metric::Temp, 1.0),
            Category::Unclassified
        );
    }
}
