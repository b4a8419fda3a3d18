use chrono::NaiveDateTime;
use thiserror::Error;

use crate::data::model::{Metric, Site};

// ---------------------------------------------------------------------------
// Domain errors
// ---------------------------------------------------------------------------

/// Errors raised by the data pipeline.
///
/// `Clone` + `PartialEq` so a failed computation can be kept inside a
/// [`Snapshot`](crate::analysis::Snapshot) as an "unavailable" panel state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// A required column is absent from the table header.
    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    /// A required field is absent from one row.
    #[error("row {row}: missing required field '{column}'")]
    MissingField { row: usize, column: String },

    #[error("row {row}: invalid date (year {year}, month {month}, day {day}, hour {hour})")]
    InvalidDate {
        row: usize,
        year: f64,
        month: f64,
        day: f64,
        hour: f64,
    },

    #[error("dataset contains no rows")]
    EmptyDataset,

    #[error("no {metric} data for {site} in the selected range")]
    InsufficientData { site: Site, metric: Metric },

    #[error("start {start} is after end {end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("unknown metric '{0}' (expected one of PM2.5, PM10, TEMP, DEWP, WSPM)")]
    UnknownMetric(String),

    #[error("unknown site '{0}' (expected Shunyi or Guanyan)")]
    UnknownSite(String),
}

impl DataError {
    /// Whether the error means "nothing to show" rather than bad input.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            DataError::EmptyDataset | DataError::InsufficientData { .. }
        )
    }
}
