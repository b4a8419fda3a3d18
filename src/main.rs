mod analysis;
mod app;
mod color;
mod data;
mod error;
mod selection;
mod state;
mod summary;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use clap::Parser;
use eframe::egui;

use app::RustyHazeApp;
use data::model::{Metric, Site};
use state::AppState;

/// Explore hourly PM2.5 / PM10 / weather observations for two sites.
#[derive(Parser, Debug)]
#[command(name = "rusty-haze", version, about)]
struct Cli {
    /// Dataset to open (.csv, .json, .parquet)
    path: Option<PathBuf>,

    /// Window start, e.g. 2013-03-01 or "2013-03-01 06:00"
    #[arg(long, value_parser = selection::parse_timestamp)]
    start: Option<NaiveDateTime>,

    /// Window end (inclusive)
    #[arg(long, value_parser = selection::parse_timestamp)]
    end: Option<NaiveDateTime>,

    /// Metric for the time-series view
    #[arg(long, default_value = "PM2.5")]
    metric: Metric,

    /// Site for the time-series and correlation views
    #[arg(long, default_value = "Shunyi")]
    site: Site,

    /// Print a JSON summary of the selection and exit
    #[arg(long, requires = "path")]
    summary: bool,
}

impl Cli {
    /// Overlay command-line choices on a freshly loaded state.
    fn apply(&self, state: &mut AppState) {
        let Some(sel) = state.selection.clone() else {
            return;
        };
        state.set_metric(self.metric);
        state.set_site(self.site);
        if self.start.is_some() || self.end.is_some() {
            state.set_range(self.start.unwrap_or(sel.start), self.end.unwrap_or(sel.end));
        }
    }
}

fn run_summary(cli: &Cli, path: &std::path::Path) -> Result<()> {
    let dataset = data::loader::load_file(path)
        .with_context(|| format!("loading {}", path.display()))?;

    let mut state = AppState::default();
    state.set_dataset(Arc::new(dataset))?;
    cli.apply(&mut state);

    let snapshot = match &state.analysis {
        Some(Ok(snapshot)) => snapshot,
        Some(Err(e)) => return Err(e.clone().into()),
        None => return Err(anyhow!("nothing computed")),
    };
    let report = summary::Summary::from(snapshot);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.summary {
        let path = cli.path.clone().context("--summary needs a dataset path")?;
        return run_summary(&cli, &path);
    }

    let mut state = AppState::default();
    if let Some(path) = &cli.path {
        state.open_path(path);
        cli.apply(&mut state);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Haze – Air Quality Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(RustyHazeApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
