use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::analysis::binning::{BINNED_METRICS, QuantileBinning};
use crate::color::category_color;
use crate::data::model::{Dataset, Metric, Site};

/// Filtered rows with the timestamp and every metric of both sites.
/// Binned metrics are tinted with their category colour.
pub fn records_table(ui: &mut Ui, dataset: &Dataset, rows: &[usize], binning: &QuantileBinning) {
    let columns: Vec<(Site, Metric)> = Site::ALL
        .iter()
        .flat_map(|&site| Metric::ALL.iter().map(move |&metric| (site, metric)))
        .collect();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(260.0)
        .column(Column::auto().at_least(120.0))
        .columns(Column::auto().at_least(64.0), columns.len())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("datetime");
            });
            for &(site, metric) in &columns {
                header.col(|ui| {
                    ui.strong(metric.column_name(site));
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let Some(record) = dataset.get(rows[row.index()]) else {
                    return;
                };
                row.col(|ui| {
                    ui.label(record.datetime().format("%Y-%m-%d %H:%M").to_string());
                });
                for &(site, metric) in &columns {
                    let v = record.value(site, metric);
                    row.col(|ui| {
                        let text = if v.is_finite() { format!("{v}") } else { "NaN".to_string() };
                        if BINNED_METRICS.contains(&metric) {
                            let category = binning.categorize(site, metric, v);
                            if category.is_labeled() {
                                ui.label(RichText::new(text).color(category_color(category)));
                                return;
                            }
                        }
                        ui.label(text);
                    });
                }
            });
        });
}
