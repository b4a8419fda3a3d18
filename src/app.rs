use eframe::egui;

use crate::state::AppState;
use crate::ui::{self, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyHazeApp {
    pub state: AppState,
}

impl RustyHazeApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for RustyHazeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: views ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let Some(dataset) = self.state.dataset.clone() else {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a dataset to explore  (File → Open…)");
                });
                return;
            };

            match &self.state.analysis {
                Some(Ok(snapshot)) => {
                    let camera = self.state.camera;
                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .show(ui, |ui| ui::dashboard(ui, &dataset, snapshot, camera));
                }
                Some(Err(e)) => ui::placeholder(ui, &e.to_string()),
                None => {}
            }
        });
    }
}
