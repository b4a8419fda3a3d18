use chrono::NaiveDateTime;

use super::model::{Dataset, Metric, Record, Site};
use crate::error::DataError;

// ---------------------------------------------------------------------------
// FilteredView – records inside an inclusive time window
// ---------------------------------------------------------------------------

/// Indices of the dataset rows whose timestamp lies in `[start, end]`.
///
/// Borrows the dataset; never copies or reorders records.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Number of records in the view.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Row indices into the underlying dataset, in dataset order.
    pub fn into_indices(self) -> Vec<usize> {
        self.indices
    }

    pub fn records(&self) -> impl Iterator<Item = &'a Record> + '_ {
        let dataset = self.dataset;
        self.indices.iter().map(move |&i| &dataset.records()[i])
    }

    /// One column of the view, NaNs included, in view order.
    pub fn values(&self, site: Site, metric: Metric) -> Vec<f64> {
        self.records().map(|r| r.value(site, metric)).collect()
    }
}

/// Select the records with `start <= datetime <= end`.
///
/// * `start > end` → [`DataError::InvalidRange`]; bounds are never swapped
/// * no matching row → an empty view, not an error
pub fn filter(
    dataset: &Dataset,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<FilteredView<'_>, DataError> {
    if start > end {
        return Err(DataError::InvalidRange { start, end });
    }

    let indices = dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, r)| (start..=end).contains(&r.datetime()))
        .map(|(i, _)| i)
        .collect();

    Ok(FilteredView { dataset, indices })
}
