use chrono::{NaiveDate, Timelike};
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::color::CATEGORY_COLORS;
use crate::data::model::{Metric, Site};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Select Date Range");
    ui.separator();

    let Some(selection) = state.selection.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            let mut start = (selection.start.date(), selection.start.hour());
            let mut end = (selection.end.date(), selection.end.hour());

            let start_changed = date_hour_row(ui, "Start", "start_date", &mut start);
            let end_changed = date_hour_row(ui, "End", "end_date", &mut end);

            if start_changed || end_changed {
                if let (Some(s), Some(e)) = (
                    start.0.and_hms_opt(start.1, 0, 0),
                    end.0.and_hms_opt(end.1, 0, 0),
                ) {
                    state.set_range(s, e);
                }
            }

            if let Some((lo, hi)) = state.bounds {
                ui.small(format!("Available: {} – {}", lo.format("%Y-%m-%d %H:%M"), hi.format("%Y-%m-%d %H:%M")));
                if ui.small_button("Full range").clicked() {
                    state.set_range(lo, hi);
                }
            }
            ui.separator();

            // ---- Metric and site ----
            ui.strong("Visualization Options");
            egui::ComboBox::from_id_salt("metric")
                .selected_text(selection.metric.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for metric in Metric::ALL {
                        if ui
                            .selectable_label(selection.metric == metric, metric.label())
                            .clicked()
                        {
                            state.set_metric(metric);
                        }
                    }
                });
            egui::ComboBox::from_id_salt("site")
                .selected_text(selection.site.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for site in Site::ALL {
                        if ui
                            .selectable_label(selection.site == site, site.label())
                            .clicked()
                        {
                            state.set_site(site);
                        }
                    }
                });
            ui.separator();

            // ---- Scatter orientation ----
            ui.strong("3-D view");
            ui.add(egui::Slider::new(&mut state.camera.yaw, -180.0..=180.0).text("Yaw"));
            ui.add(egui::Slider::new(&mut state.camera.pitch, -90.0..=90.0).text("Pitch"));
            if ui.small_button("Reset").clicked() {
                state.camera = Default::default();
            }
            ui.separator();

            // ---- Legend ----
            ui.strong("PM2.5 percentile bins");
            for (category, name, color) in CATEGORY_COLORS {
                ui.label(RichText::new(format!("■ {category} ({name})")).color(color));
            }
        });
}

/// Date picker plus an hour field. Returns whether either changed.
fn date_hour_row(ui: &mut Ui, label: &str, id: &str, value: &mut (NaiveDate, u32)) -> bool {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(label);
        let date = ui.add(DatePickerButton::new(&mut value.0).id_salt(id));
        let hour = ui.add(
            egui::DragValue::new(&mut value.1)
                .range(0..=23)
                .suffix(":00"),
        );
        date.changed() || hour.changed()
    })
    .inner
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let visible = state.snapshot().map_or(0, |s| s.rows.len());
            ui.label(format!("{} records loaded, {visible} in range", ds.len()));
        }

        if let Some(Err(e)) = &state.analysis {
            ui.separator();
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open air-quality data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(&path);
    }
}
