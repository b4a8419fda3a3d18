pub mod heatmap;
pub mod panels;
pub mod plot;
pub mod table;

use eframe::egui::{self, RichText, Ui};

use crate::analysis::Snapshot;
use crate::analysis::series::SCATTER_BIN_METRIC;
use crate::data::model::Dataset;
use crate::state::Camera;

/// Stand-in for a chart that has nothing to show.
pub fn placeholder(ui: &mut Ui, message: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_height(60.0);
        ui.set_width(ui.available_width());
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label(RichText::new(message).weak());
        });
    });
}

/// The stacked views for one snapshot, top to bottom.
pub fn dashboard(ui: &mut Ui, dataset: &Dataset, snapshot: &Snapshot, camera: Camera) {
    let sel = &snapshot.selection;

    ui.label(format!(
        "Data from {} to {}",
        sel.start.format("%Y-%m-%d %H:%M"),
        sel.end.format("%Y-%m-%d %H:%M")
    ));
    if snapshot.is_empty() {
        placeholder(ui, "No data in range");
    } else {
        table::records_table(ui, dataset, &snapshot.rows, &snapshot.binning);
    }
    ui.add_space(12.0);

    ui.heading(format!("{} Levels at {}", sel.metric, sel.site));
    if snapshot.series.iter().any(|(_, v)| v.is_finite()) {
        plot::time_series_plot(ui, snapshot);
    } else {
        placeholder(ui, "No data in range");
    }
    ui.add_space(12.0);

    ui.heading("Correlation Heatmap");
    let fields: Vec<&str> = snapshot.correlation.fields().iter().map(|m| m.label()).collect();
    ui.label(format!("Correlation Heatmap for {} in {}", fields.join(", "), sel.site));
    heatmap::correlation_heatmap(ui, &snapshot.correlation);
    ui.add_space(12.0);

    for (site, groups) in &snapshot.scatter {
        ui.heading(format!("Scatter Plot of PM2.5 vs PM10 with Percentile Bins ({site})"));
        if let Some(Ok(bp)) = snapshot.binning.get(*site, SCATTER_BIN_METRIC) {
            let edges: Vec<String> = bp.edges().iter().map(|e| format!("{e:.1}")).collect();
            let note = if bp.is_degenerate() { "  (all values identical)" } else { "" };
            ui.small(format!("{SCATTER_BIN_METRIC} breakpoints: {}{note}", edges.join(" / ")));
        }
        match groups {
            Ok(groups) => plot::scatter_plot(ui, &format!("scatter_{}", site.column_suffix()), groups, camera),
            Err(e) if e.is_no_data() => placeholder(ui, &format!("No data in range: {e}")),
            Err(e) => placeholder(ui, &e.to_string()),
        }
        ui.add_space(12.0);
    }
}
