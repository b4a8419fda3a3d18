use chrono::{DateTime, NaiveDateTime};
use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::analysis::Snapshot;
use crate::analysis::series::{SCATTER_AXES, ScatterGroup};
use crate::state::Camera;

// ---------------------------------------------------------------------------
// Time-series line
// ---------------------------------------------------------------------------

fn to_x(t: NaiveDateTime) -> f64 {
    t.and_utc().timestamp() as f64
}

fn format_x(x: f64) -> String {
    DateTime::from_timestamp(x as i64, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Split at missing values so the line shows gaps instead of bridging them.
fn segments(series: &[(NaiveDateTime, f64)]) -> Vec<Vec<[f64; 2]>> {
    let mut out = vec![Vec::new()];
    for &(t, v) in series {
        if v.is_finite() {
            if let Some(last) = out.last_mut() {
                last.push([to_x(t), v]);
            }
        } else if out.last().is_some_and(|s| !s.is_empty()) {
            out.push(Vec::new());
        }
    }
    out.retain(|s| !s.is_empty());
    out
}

/// Selected metric over time at the selected site.
pub fn time_series_plot(ui: &mut Ui, snapshot: &Snapshot) {
    let sel = &snapshot.selection;
    let name = format!("{} ({})", sel.metric, sel.site);

    Plot::new("time_series")
        .height(280.0)
        .legend(Legend::default())
        .x_axis_label("Date and Time")
        .y_axis_label(format!("{} Levels ({})", sel.metric, sel.metric.unit()))
        .x_axis_formatter(|mark, _range| format_x(mark.value))
        .label_formatter(|name, point| format!("{name}\n{}\n{:.2}", format_x(point.x), point.y))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for segment in segments(&snapshot.series) {
                let line = Line::new(PlotPoints::from(segment))
                    .name(&name)
                    .color(Color32::LIGHT_BLUE)
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Projected 3-D scatter
// ---------------------------------------------------------------------------

/// Orthographic projection of a point in the unit cube centred on the origin.
/// Yaw turns around the vertical (z) axis, pitch tilts towards a top view.
pub fn project([x, y, z]: [f64; 3], camera: Camera) -> [f64; 2] {
    let (yaw, pitch) = (camera.yaw.to_radians(), camera.pitch.to_radians());
    let u = x * yaw.cos() - y * yaw.sin();
    let depth = x * yaw.sin() + y * yaw.cos();
    let v = z * pitch.cos() + depth * pitch.sin();
    [u, v]
}

/// Per-axis `(min, max)` over every point of every group.
fn axis_ranges(groups: &[ScatterGroup]) -> [(f64, f64); 3] {
    let mut ranges = [(f64::INFINITY, f64::NEG_INFINITY); 3];
    for p in groups.iter().flat_map(|g| &g.points) {
        for (r, &v) in ranges.iter_mut().zip(p) {
            r.0 = r.0.min(v);
            r.1 = r.1.max(v);
        }
    }
    ranges
}

/// Map each coordinate into `[-0.5, 0.5]`; a flat axis collapses to 0.
fn normalize(p: &[f64; 3], ranges: &[(f64, f64); 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for ((o, &v), &(lo, hi)) in out.iter_mut().zip(p).zip(ranges) {
        *o = if hi > lo { (v - lo) / (hi - lo) - 0.5 } else { 0.0 };
    }
    out
}

/// PM2.5 / PM10 / TEMP points coloured by PM2.5 percentile bin.
pub fn scatter_plot(ui: &mut Ui, id: &str, groups: &[ScatterGroup], camera: Camera) {
    let ranges = axis_ranges(groups);

    Plot::new(id)
        .height(360.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .legend(Legend::default())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            // axis edges from the shared corner
            let corner = [-0.5, -0.5, -0.5];
            for (axis, metric) in SCATTER_AXES.iter().enumerate() {
                let mut tip = corner;
                tip[axis] = 0.5;
                let (a, b) = (project(corner, camera), project(tip, camera));
                plot_ui.line(Line::new(PlotPoints::from(vec![a, b])).color(Color32::DARK_GRAY));
                plot_ui.text(Text::new(PlotPoint::new(b[0], b[1]), metric.label()));
            }

            for group in groups {
                let points: PlotPoints = group
                    .points
                    .iter()
                    .map(|p| project(normalize(p, &ranges), camera))
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .name(format!("PM2.5 {}", group.category))
                        .color(group.color)
                        .radius(2.5),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::derive_datetime;

    #[test]
    fn test_segments_break_at_nan() {
        let t = |h| derive_datetime(2013, 3, 1, h).unwrap();
        let series = [
            (t(0), 1.0),
            (t(1), f64::NAN),
            (t(2), 3.0),
            (t(3), 4.0),
            (t(4), f64::NAN),
        ];
        let segs = segments(&series);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].len(), 2);
        assert_eq!(format_x(segs[0][0][0]), "2013-03-01 00:00");
    }

    #[test]
    fn test_projection_front_view() {
        let front = Camera { yaw: 0.0, pitch: 0.0 };
        assert_eq!(project([0.3, 0.1, -0.2], front), [0.3, -0.2]);

        let top = Camera { yaw: 0.0, pitch: 90.0 };
        let [u, v] = project([0.3, 0.1, -0.2], top);
        assert!((u - 0.3).abs() < 1e-12 && (v - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_flat_axis() {
        let ranges = [(0.0, 10.0), (5.0, 5.0), (-1.0, 1.0)];
        assert_eq!(normalize(&[10.0, 5.0, -1.0], &ranges), [0.5, 0.0, -0.5]);
    }
}
