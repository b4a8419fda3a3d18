use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::data::model::{Metric, Site};

// ---------------------------------------------------------------------------
// Selection – the user-selectable parameters
// ---------------------------------------------------------------------------

/// Time window plus the metric and site shown in the single-site views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub metric: Metric,
    pub site: Site,
}

impl Selection {
    /// Whole dataset, first metric, first site.
    pub fn covering((start, end): (NaiveDateTime, NaiveDateTime)) -> Self {
        Selection {
            start,
            end,
            metric: Metric::Pm25,
            site: Site::Shunyi,
        }
    }

    /// Pull both ends into `[lo, hi]`. Does not reorder an inverted range.
    pub fn clamp_to(&mut self, (lo, hi): (NaiveDateTime, NaiveDateTime)) {
        self.start = self.start.clamp(lo, hi);
        self.end = self.end.clamp(lo, hi);
    }
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` or `YYYY-MM-DDTHH:MM[:SS]`.
/// A bare date means midnight.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    if let Some(t) = FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Ok(t);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("'{s}' is not a date (expected YYYY-MM-DD[ HH:MM])"))
}
