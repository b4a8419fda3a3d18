/// Analysis layer: everything derived from a filtered view.
///
/// ```text
///   FilteredView ──┬── correlation  → CorrelationMatrix (selected site)
///                  ├── binning      → QuantileBinning   (PM2.5, PM10 × both sites)
///                  └── series       → time series, per-site scatter groups
/// ```
///
/// A [`Snapshot`] bundles one full recomputation. Nothing in it is updated
/// incrementally; a new selection produces a new snapshot.

pub mod binning;
pub mod correlation;
pub mod series;

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

use crate::data::filter::filter;
use crate::data::model::{Dataset, Metric, Site};
use crate::error::DataError;
use crate::selection::Selection;
use binning::{BINNED_METRICS, QuantileBinning};
use correlation::{CorrelationMatrix, correlate};
use series::{SCATTER_BIN_METRIC, ScatterGroup, scatter_groups, time_series};

/// Everything the views need for one selection.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub selection: Selection,
    /// Dataset row indices inside the window.
    pub rows: Vec<usize>,
    pub series: Vec<(NaiveDateTime, f64)>,
    pub correlation: CorrelationMatrix,
    pub binning: QuantileBinning,
    pub scatter: BTreeMap<Site, Result<Vec<ScatterGroup>, DataError>>,
}

impl Snapshot {
    /// Run the whole pipeline. Only an inverted range fails outright; a
    /// degenerate window yields a snapshot whose panels are unavailable.
    pub fn compute(dataset: &Dataset, selection: &Selection) -> Result<Self, DataError> {
        let view = filter(dataset, selection.start, selection.end)?;
        if view.is_empty() {
            log::debug!("no records between {} and {}", selection.start, selection.end);
        } else {
            log::trace!("{} records between {} and {}", view.len(), selection.start, selection.end);
        }

        let series = time_series(&view, selection.site, selection.metric);
        let correlation = correlate(&view, selection.site, &Metric::ALL);
        let binning = QuantileBinning::compute(&view, &Site::ALL, &BINNED_METRICS);

        let scatter = Site::ALL
            .into_iter()
            .map(|site| {
                let groups = match binning.get(site, SCATTER_BIN_METRIC) {
                    Some(Ok(bp)) => Ok(scatter_groups(&view, site, bp)),
                    Some(Err(e)) => Err(e.clone()),
                    None => Err(DataError::InsufficientData {
                        site,
                        metric: SCATTER_BIN_METRIC,
                    }),
                };
                (site, groups)
            })
            .collect();

        Ok(Snapshot {
            selection: selection.clone(),
            rows: view.into_indices(),
            series,
            correlation,
            binning,
            scatter,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::hourly_dataset;

    #[test]
    fn test_snapshot_full_range() {
        let ds = hourly_dataset(&[10.0, 20.0, 30.0, 40.0]);
        let mut sel = Selection::covering(ds.bounds().unwrap());
        sel.site = Site::Guanyan;
        sel.metric = Metric::Temp;

        let snap = Snapshot::compute(&ds, &sel).unwrap();
        assert_eq!(snap.rows, vec![0, 1, 2, 3]);
        assert_eq!(snap.series.len(), 4);
        assert_eq!(snap.series[3].1, 3.0);
        assert_eq!(snap.correlation.site(), Site::Guanyan);
        assert_eq!(snap.correlation.fields(), &Metric::ALL);
        let groups = snap.scatter[&Site::Shunyi].as_ref().unwrap();
        assert_eq!(groups.iter().map(|g| g.points.len()).sum::<usize>(), 4);
    }

    #[test]
    fn test_snapshot_empty_window_is_unavailable_not_error() {
        let ds = hourly_dataset(&[10.0, 20.0]);
        let (_, hi) = ds.bounds().unwrap();
        let later = hi + chrono::Duration::hours(5);
        let sel = Selection {
            start: later,
            end: later,
            metric: Metric::Pm25,
            site: Site::Shunyi,
        };
        let snap = Snapshot::compute(&ds, &sel).unwrap();
        assert!(snap.is_empty());
        assert!(snap.series.is_empty());
        assert!(matches!(
            snap.scatter[&Site::Guanyan],
            Err(DataError::InsufficientData { .. })
        ));
        assert!(snap.correlation.get(0, 1).is_nan());
    }

    #[test]
    fn test_snapshot_inverted_range() {
        let ds = hourly_dataset(&[10.0, 20.0]);
        let (lo, hi) = ds.bounds().unwrap();
        let sel = Selection {
            start: hi,
            end: lo,
            metric: Metric::Pm25,
            site: Site::Shunyi,
        };
        assert!(matches!(
            Snapshot::compute(&ds, &sel),
            Err(DataError::InvalidRange { .. })
        ));
    }
}
