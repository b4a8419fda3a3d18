//! Headless JSON report of a snapshot (`--summary`).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::Snapshot;
use crate::analysis::binning::Breakpoints;
use crate::data::model::{Metric, Site};
use crate::selection::Selection;

#[derive(Debug, Serialize)]
pub struct Summary {
    pub selection: Selection,
    pub rows: usize,
    pub correlation: CorrelationSummary,
    pub breakpoints: Vec<BreakpointSummary>,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug, Serialize)]
pub struct CorrelationSummary {
    pub site: Site,
    pub fields: Vec<Metric>,
    /// `null` where the coefficient is undefined.
    pub matrix: Vec<Vec<Option<f64>>>,
}

#[derive(Debug, Serialize)]
pub struct BreakpointSummary {
    pub site: Site,
    pub metric: Metric,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Breakpoints>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Scatter point counts per category for one site.
#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub site: Site,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<BTreeMap<String, usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Snapshot> for Summary {
    fn from(snap: &Snapshot) -> Self {
        let corr = &snap.correlation;
        let correlation = CorrelationSummary {
            site: corr.site(),
            fields: corr.fields().to_vec(),
            matrix: corr
                .rows()
                .map(|row| row.iter().map(|&v| v.is_finite().then_some(v)).collect())
                .collect(),
        };

        let breakpoints = snap
            .binning
            .iter()
            .map(|(&(site, metric), result)| BreakpointSummary {
                site,
                metric,
                breakpoints: result.as_ref().ok().copied(),
                error: result.as_ref().err().map(|e| e.to_string()),
            })
            .collect();

        let categories = snap
            .scatter
            .iter()
            .map(|(&site, result)| match result {
                Ok(groups) => CategorySummary {
                    site,
                    counts: Some(
                        groups
                            .iter()
                            .map(|g| (g.category.label().to_string(), g.points.len()))
                            .collect(),
                    ),
                    error: None,
                },
                Err(e) => CategorySummary {
                    site,
                    counts: None,
                    error: Some(e.to_string()),
                },
            })
            .collect();

        Summary {
            selection: snap.selection.clone(),
            rows: snap.rows.len(),
            correlation,
            breakpoints,
            categories,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::hourly_dataset;

    #[test]
    fn test_summary_json() {
        let ds = hourly_dataset(&[10.0, 20.0, 30.0, 40.0]);
        let sel = Selection::covering(ds.bounds().unwrap());
        let snap = Snapshot::compute(&ds, &sel).unwrap();
        let json = serde_json::to_value(Summary::from(&snap)).unwrap();

        assert_eq!(json["rows"], 4);
        assert_eq!(json["selection"]["metric"], "PM2.5");
        assert_eq!(json["correlation"]["matrix"][0][0], 1.0);
        // constant wind speed → undefined coefficient
        assert!(json["correlation"]["matrix"][0][4].is_null());
        assert_eq!(
            json["breakpoints"][0]["breakpoints"],
            serde_json::json!([10.0, 17.5, 25.0, 32.5, 40.0])
        );
        assert_eq!(json["categories"][0]["counts"]["Very High"], 1);
    }
}
