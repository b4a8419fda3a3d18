use eframe::egui::{Align2, FontId, Rect, Sense, Ui, Vec2};

use crate::analysis::correlation::CorrelationMatrix;
use crate::color::{contrasting_text, diverging};

const LABEL_WIDTH: f32 = 56.0;
const LABEL_HEIGHT: f32 = 22.0;
const RAMP_STEPS: usize = 40;

/// Annotated correlation grid with a -1..1 colour ramp underneath.
pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    let n = matrix.len();
    if n == 0 {
        return;
    }
    let cell = ((ui.available_width() - LABEL_WIDTH) / n as f32).clamp(40.0, 88.0);
    let grid = cell * n as f32;
    let size = Vec2::new(LABEL_WIDTH + grid, grid + LABEL_HEIGHT * 2.5);

    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min;
    let font = FontId::proportional(12.0);
    let text_color = ui.visuals().text_color();

    for (i, row) in matrix.rows().enumerate() {
        for (j, &r) in row.iter().enumerate() {
            let rect = Rect::from_min_size(
                origin + Vec2::new(LABEL_WIDTH + j as f32 * cell, i as f32 * cell),
                Vec2::splat(cell),
            );
            let fill = diverging(r);
            painter.rect_filled(rect.shrink(1.0), 0.0, fill);
            let text = if r.is_finite() { format!("{r:.2}") } else { "n/a".to_string() };
            painter.text(rect.center(), Align2::CENTER_CENTER, text, font.clone(), contrasting_text(fill));
        }
    }

    for (k, field) in matrix.fields().iter().enumerate() {
        let mid = (k as f32 + 0.5) * cell;
        painter.text(
            origin + Vec2::new(LABEL_WIDTH - 6.0, mid),
            Align2::RIGHT_CENTER,
            field.label(),
            font.clone(),
            text_color,
        );
        painter.text(
            origin + Vec2::new(LABEL_WIDTH + mid, grid + LABEL_HEIGHT * 0.5),
            Align2::CENTER_CENTER,
            field.label(),
            font.clone(),
            text_color,
        );
    }

    // colour ramp
    let ramp_top = grid + LABEL_HEIGHT * 1.2;
    let step = grid / RAMP_STEPS as f32;
    for s in 0..RAMP_STEPS {
        let value = -1.0 + 2.0 * (s as f64 + 0.5) / RAMP_STEPS as f64;
        let rect = Rect::from_min_size(
            origin + Vec2::new(LABEL_WIDTH + s as f32 * step, ramp_top),
            Vec2::new(step + 0.5, LABEL_HEIGHT * 0.5),
        );
        painter.rect_filled(rect, 0.0, diverging(value));
    }
    let ramp_mid = ramp_top + LABEL_HEIGHT * 0.25;
    painter.text(origin + Vec2::new(LABEL_WIDTH - 6.0, ramp_mid), Align2::RIGHT_CENTER, "-1", font.clone(), text_color);
    painter.text(origin + Vec2::new(LABEL_WIDTH + grid + 6.0, ramp_mid), Align2::LEFT_CENTER, "+1", font, text_color);
}
