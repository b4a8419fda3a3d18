//! Plot-ready projections of a view: the time series and the banded scatter.

use chrono::NaiveDateTime;
use eframe::egui::Color32;

use super::binning::{Breakpoints, Category, categorize};
use crate::color::category_color;
use crate::data::filter::FilteredView;
use crate::data::model::{Metric, Site};

/// Axes of the 3-D scatter, in x, y, z order.
pub const SCATTER_AXES: [Metric; 3] = [Metric::Pm25, Metric::Pm10, Metric::Temp];

/// The scatter is coloured by this metric's category.
pub const SCATTER_BIN_METRIC: Metric = Metric::Pm25;

/// `(datetime, value)` pairs in view order. Missing values stay NaN so the
/// line shows a gap.
pub fn time_series(view: &FilteredView<'_>, site: Site, metric: Metric) -> Vec<(NaiveDateTime, f64)> {
    view.records()
        .map(|r| (r.datetime(), r.value(site, metric)))
        .collect()
}

/// Points of one category, ready for a single scatter trace.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterGroup {
    pub category: Category,
    pub color: Color32,
    pub points: Vec<[f64; 3]>,
}

/// Partition the view's `SCATTER_AXES` points by category.
///
/// One group per labelled category, lowest first, even when empty.
/// Unclassified points and points with a non-finite coordinate are dropped.
pub fn scatter_groups(view: &FilteredView<'_>, site: Site, breakpoints: &Breakpoints) -> Vec<ScatterGroup> {
    let mut groups: Vec<ScatterGroup> = Category::LABELED
        .iter()
        .map(|&category| ScatterGroup {
            category,
            color: category_color(category),
            points: Vec::new(),
        })
        .collect();

    for record in view.records() {
        let point = SCATTER_AXES.map(|m| record.value(site, m));
        if point.iter().any(|v| !v.is_finite()) {
            continue;
        }
        let category = categorize(record.value(site, SCATTER_BIN_METRIC), breakpoints);
        if !category.is_labeled() {
            continue;
        }
        if let Some(group) = groups.iter_mut().find(|g| g.category == category) {
            group.points.push(point);
        }
    }

    groups
}
