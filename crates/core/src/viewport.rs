//! Canvas extent in pixel coordinates.

use crate::error::FieldError;
use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Rectangle `[0, width] x [0, height]` that streamlines and seeds live in.
///
/// Edges are inclusive: a point with `x == width` is still on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Returns `FieldError::InvalidDimensions` unless both sides are finite and positive.
    pub fn new(width: f64, height: f64) -> Result<Self, FieldError> {
        let viewport = Self { width, height };
        viewport.validate()?;
        Ok(viewport)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.width) && ok(self.height) {
            Ok(())
        } else {
            Err(FieldError::InvalidDimensions)
        }
    }

    /// Non-finite points are never on the canvas.
    pub fn contains(&self, p: DVec2) -> bool {
        p.is_finite() && p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.width / 2.0, self.height / 2.0)
    }
}
