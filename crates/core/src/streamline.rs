//! Streamline tracing by direction-normalized RK4.
//!
//! Each RK4 stage samples the field and normalizes it to a unit vector before
//! using it as a derivative, so one step always advances an arclength of about
//! `h` no matter how strong the field is locally. Dipole and wire fields span
//! many orders of magnitude across the canvas; a magnitude-weighted step would
//! crawl near sources and jump far from them.

use crate::source::FIELD_EPS;
use crate::superposition::VectorField;
use crate::viewport::Viewport;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Which way along the field line to step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Along +B.
    Forward,
    /// Along −B.
    Backward,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Forward => 1.0,
            Direction::Backward => -1.0,
        }
    }
}

/// One vertex of a streamline with the local field magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamPoint {
    pub x: f64,
    pub y: f64,
    pub magnitude: f64,
}

impl StreamPoint {
    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

/// Polyline ordered from the backward-most point, through the seed, to the
/// forward-most point.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Streamline {
    pub points: Vec<StreamPoint>,
}

impl Streamline {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fewer than two points has nothing to draw.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2
    }
}

/// Step size, step budget and canvas for tracing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tracer {
    pub step_size: f64,
    /// Maximum steps in each direction.
    pub max_steps: usize,
    pub viewport: Viewport,
}

/// Unit field direction at `p`, or `None` where the field vanishes.
fn unit_direction<F: VectorField + ?Sized>(field: &F, p: DVec2, sign: f64) -> Option<DVec2> {
    let b = field.field_at(p);
    let mag = b.length();
    if mag.is_nan() || mag < FIELD_EPS {
        return None;
    }
    Some(sign * b / mag)
}

/// One RK4 step of arclength `h` along (or against) the field direction.
///
/// Returns `None` if the field magnitude at any of the four stages is below
/// [`FIELD_EPS`]; the caller ends the line there.
pub fn rk4_step<F: VectorField + ?Sized>(
    field: &F,
    p: DVec2,
    h: f64,
    direction: Direction,
) -> Option<DVec2> {
    let sign = direction.sign();
    let k1 = unit_direction(field, p, sign)?;
    let k2 = unit_direction(field, p + h * k1 / 2.0, sign)?;
    let k3 = unit_direction(field, p + h * k2 / 2.0, sign)?;
    let k4 = unit_direction(field, p + h * k3, sign)?;
    Some(p + h * (k1 + 2.0 * k2 + 2.0 * k3 + k4) / 6.0)
}

impl Tracer {
    pub fn new(step_size: f64, max_steps: usize, viewport: Viewport) -> Self {
        Self {
            step_size,
            max_steps,
            viewport,
        }
    }

    /// Traces the field line through `seed` in both directions.
    ///
    /// The forward pass bounds-checks a point before recording it, so the
    /// seed itself is included when it is on the canvas. The backward pass
    /// steps first and bounds-checks the new point, so the seed is never
    /// checked there. Backward points are prepended.
    pub fn trace<F: VectorField + ?Sized>(&self, field: &F, seed: DVec2) -> Streamline {
        let h = self.step_size;
        let mut points = VecDeque::new();
        let sample = |p: DVec2| StreamPoint {
            x: p.x,
            y: p.y,
            magnitude: field.field_at(p).length(),
        };

        let mut p = seed;
        for _ in 0..self.max_steps {
            if !self.viewport.contains(p) {
                break;
            }
            points.push_back(sample(p));
            match rk4_step(field, p, h, Direction::Forward) {
                Some(next) => p = next,
                None => break,
            }
        }

        let mut p = seed;
        for _ in 0..self.max_steps {
            match rk4_step(field, p, h, Direction::Backward) {
                Some(next) => p = next,
                None => break,
            }
            if !self.viewport.contains(p) {
                break;
            }
            points.push_front(sample(p));
        }

        Streamline {
            points: points.into(),
        }
    }

    /// Traces every seed in order, dropping lines with nothing to draw.
    pub fn trace_all<F: VectorField + ?Sized>(&self, field: &F, seeds: &[DVec2]) -> Vec<Streamline> {
        seeds
            .iter()
            .map(|&seed| self.trace(field, seed))
            .filter(Streamline::is_drawable)
            .collect()
    }
}
