use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::analysis::Snapshot;
use crate::data::loader::load_file;
use crate::data::model::{Dataset, Metric, Site};
use crate::error::DataError;
use crate::selection::Selection;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Orientation of the projected 3-D scatter, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub yaw: f64,
    pub pitch: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            yaw: 35.0,
            pitch: 25.0,
        }
    }
}

/// The full UI state of one viewer, independent of rendering.
///
/// The dataset is shared read-only; the selection and every derived result
/// belong to this viewer alone.
#[derive(Default)]
pub struct AppState {
    /// Loaded dataset (None until user loads a file).
    pub dataset: Option<Arc<Dataset>>,

    /// Timestamp extremes of `dataset`, cached at load.
    pub bounds: Option<(NaiveDateTime, NaiveDateTime)>,

    /// Current selection; set once a dataset is loaded.
    pub selection: Option<Selection>,

    /// Latest accepted recomputation, or why it failed.
    pub analysis: Option<Result<Snapshot, DataError>>,

    /// Ticket of the most recent recomputation request.
    generation: u64,

    pub camera: Camera,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    /// Ingest a newly loaded dataset and select its full range.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) -> Result<(), DataError> {
        let bounds = dataset.bounds()?;
        log::info!(
            "Loaded {} records from {} to {}",
            dataset.len(),
            bounds.0,
            bounds.1
        );

        self.dataset = Some(dataset);
        self.bounds = Some(bounds);
        self.selection = Some(Selection::covering(bounds));
        self.status_message = None;
        self.refilter();
        Ok(())
    }

    /// Load a file and make it the current dataset. Failures end up in
    /// `status_message`; the previous dataset stays in place.
    pub fn open_path(&mut self, path: &Path) {
        let result = load_file(path)
            .and_then(|ds| self.set_dataset(Arc::new(ds)).map_err(anyhow::Error::from));
        if let Err(e) = result {
            log::error!("Failed to load {}: {e:#}", path.display());
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    /// Apply a new time window, clamped to the dataset bounds.
    ///
    /// An inverted window is kept as given and reported through `analysis`.
    pub fn set_range(&mut self, start: NaiveDateTime, end: NaiveDateTime) {
        let bounds = self.bounds;
        if let Some(sel) = self.selection.as_mut() {
            sel.start = start;
            sel.end = end;
            if let Some(b) = bounds {
                sel.clamp_to(b);
            }
        }
        self.refilter();
    }

    pub fn set_metric(&mut self, metric: Metric) {
        if let Some(sel) = self.selection.as_mut() {
            sel.metric = metric;
        }
        self.refilter();
    }

    pub fn set_site(&mut self, site: Site) {
        if let Some(sel) = self.selection.as_mut() {
            sel.site = site;
        }
        self.refilter();
    }

    /// Start a recomputation; any result holding an older ticket is stale.
    pub fn begin_recompute(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Install a result if `ticket` is still current. Stale results are dropped.
    pub fn accept(&mut self, ticket: u64, result: Result<Snapshot, DataError>) -> bool {
        if ticket != self.generation {
            log::warn!(
                "discarding stale recomputation {ticket} (current {})",
                self.generation
            );
            return false;
        }
        if let Err(e) = &result {
            log::warn!("selection unavailable: {e}");
        }
        self.analysis = Some(result);
        true
    }

    /// Recompute the view and everything derived from it.
    pub fn refilter(&mut self) {
        let (Some(ds), Some(sel)) = (self.dataset.clone(), self.selection.clone()) else {
            return;
        };
        let ticket = self.begin_recompute();
        let result = Snapshot::compute(&ds, &sel);
        if let Ok(snap) = &result {
            log::debug!("recompute {ticket}: {} of {} rows", snap.rows.len(), ds.len());
        }
        self.accept(ticket, result);
    }

    /// The accepted snapshot, if the last recomputation succeeded.
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.analysis.as_ref().and_then(|r| r.as_ref().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::derive_datetime;
    use crate::data::model::tests::hourly_dataset;

    fn loaded(pm25: &[f64]) -> AppState {
        let mut state = AppState::default();
        state.set_dataset(Arc::new(hourly_dataset(pm25))).unwrap();
        state
    }

    #[test]
    fn test_set_dataset_selects_everything() {
        let state = loaded(&[1.0, 2.0, 3.0]);
        let snap = state.snapshot().unwrap();
        assert_eq!(snap.rows, vec![0, 1, 2]);
        assert_eq!(snap.selection.metric, Metric::Pm25);
        assert_eq!(snap.selection.site, Site::Shunyi);
    }

    #[test]
    fn test_open_path_failure_sets_status() {
        let mut state = loaded(&[1.0]);
        state.open_path(Path::new("missing.csv"));
        assert!(state.status_message.as_deref().unwrap().starts_with("Error"));
        assert_eq!(state.dataset.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let mut state = AppState::default();
        let err = state.set_dataset(Arc::new(Dataset::default())).unwrap_err();
        assert_eq!(err, DataError::EmptyDataset);
        assert!(state.dataset.is_none());
    }

    #[test]
    fn test_range_change_recomputes() {
        let mut state = loaded(&[1.0, 2.0, 3.0]);
        let t = |h| derive_datetime(2013, 3, 1, h).unwrap();
        state.set_range(t(0), t(1));
        assert_eq!(state.snapshot().unwrap().rows, vec![0, 1]);

        // clamped into the dataset bounds
        state.set_range(derive_datetime(2012, 1, 1, 0).unwrap(), t(0));
        assert_eq!(state.selection.as_ref().unwrap().start, t(0));
        assert_eq!(state.snapshot().unwrap().rows, vec![0]);
    }

    #[test]
    fn test_inverted_range_not_swapped() {
        let mut state = loaded(&[1.0, 2.0, 3.0]);
        let t = |h| derive_datetime(2013, 3, 1, h).unwrap();
        state.set_range(t(2), t(0));
        assert!(matches!(
            state.analysis,
            Some(Err(DataError::InvalidRange { .. }))
        ));
        assert_eq!(state.selection.as_ref().unwrap().start, t(2));
        assert!(state.snapshot().is_none());
    }

    #[test]
    fn test_stale_result_discarded() {
        let mut state = loaded(&[1.0, 2.0, 3.0]);
        let ds = state.dataset.clone().unwrap();
        let full = state.selection.clone().unwrap();

        let old_ticket = state.begin_recompute();
        let mut narrow = full.clone();
        narrow.end = narrow.start;
        let new_ticket = state.begin_recompute();

        assert!(state.accept(new_ticket, Snapshot::compute(&ds, &narrow)));
        assert!(!state.accept(old_ticket, Snapshot::compute(&ds, &full)));
        assert_eq!(state.snapshot().unwrap().rows, vec![0]);
    }

    #[test]
    fn test_viewers_are_isolated() {
        let ds = Arc::new(hourly_dataset(&[1.0, 2.0, 3.0]));
        let mut a = AppState::default();
        let mut b = AppState::default();
        a.set_dataset(ds.clone()).unwrap();
        b.set_dataset(ds).unwrap();

        a.set_site(Site::Guanyan);
        assert_eq!(b.selection.as_ref().unwrap().site, Site::Shunyi);
        assert_eq!(b.snapshot().unwrap().correlation.site(), Site::Shunyi);
        assert_eq!(a.snapshot().unwrap().correlation.site(), Site::Guanyan);
    }
}
