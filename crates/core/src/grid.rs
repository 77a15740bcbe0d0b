//! Regular sampling of the field for arrow (quiver) rendering.

use crate::config::DisplayConfig;
use crate::source::FIELD_EPS;
use crate::superposition::VectorField;
use crate::viewport::Viewport;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Field sample at one vector-grid node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowSample {
    pub position: DVec2,
    pub field: DVec2,
    pub magnitude: f64,
    /// Unit direction of the field, zero where it vanishes.
    pub direction: DVec2,
    /// Color intensity in [0, 1].
    pub intensity: f64,
    /// Arrow length in pixels.
    pub length: f64,
}

/// Maps a field magnitude to [0, 1], saturating at `max_field_display`.
pub fn intensity(magnitude: f64, max_field_display: f64) -> f64 {
    if max_field_display <= 0.0 {
        return 1.0;
    }
    (magnitude / max_field_display).clamp(0.0, 1.0)
}

/// Samples `field` at `(spacing/2 + i·spacing, spacing/2 + j·spacing)` for
/// every node inside the canvas, row by row.
pub fn sample_vector_grid<F: VectorField + ?Sized>(
    field: &F,
    viewport: &Viewport,
    spacing: usize,
    display: &DisplayConfig,
) -> Vec<ArrowSample> {
    let spacing = spacing.max(1) as f64;
    let half = spacing / 2.0;
    let cols = ((viewport.width - half) / spacing).floor().max(-1.0) as i64 + 1;
    let rows = ((viewport.height - half) / spacing).floor().max(-1.0) as i64 + 1;

    let mut samples = Vec::new();
    for j in 0..rows {
        for i in 0..cols {
            let position = DVec2::new(half + i as f64 * spacing, half + j as f64 * spacing);
            let b = field.field_at(position);
            let magnitude = b.length();
            let direction = if magnitude < FIELD_EPS {
                DVec2::ZERO
            } else {
                b / magnitude
            };
            let intensity = intensity(magnitude, display.max_field_display);
            samples.push(ArrowSample {
                position,
                field: b,
                magnitude,
                direction,
                intensity,
                length: intensity * display.arrow_scale * spacing / 4.0,
            });
        }
    }
    samples
}
