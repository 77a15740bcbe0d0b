//! Superposition of source contributions and the [`VectorField`] abstraction
//! the streamline integrator follows.

use crate::config::FieldConstants;
use crate::source::{Dipole, FieldSource, Wire};
use glam::DVec2;

/// A 2D vector field that can be sampled anywhere.
pub trait VectorField {
    fn field_at(&self, point: DVec2) -> DVec2;
}

impl<F> VectorField for F
where
    F: Fn(DVec2) -> DVec2,
{
    fn field_at(&self, point: DVec2) -> DVec2 {
        self(point)
    }
}

/// Sums the contributions of `sources` at `point`.
pub fn superpose<I>(sources: I, point: DVec2, constants: &FieldConstants) -> DVec2
where
    I: IntoIterator,
    I::Item: FieldSource,
{
    sources
        .into_iter()
        .fold(DVec2::ZERO, |acc, s| acc + s.field_at(point, constants))
}

/// Read-only view over a session's dipoles and wires.
///
/// Holds borrows, never copies, so every query reflects the sources as they
/// are right now.
#[derive(Debug, Clone, Copy)]
pub struct Superposition<'a> {
    pub dipoles: &'a [Dipole],
    pub wires: &'a [Wire],
    pub constants: FieldConstants,
}

impl<'a> Superposition<'a> {
    pub fn new(dipoles: &'a [Dipole], wires: &'a [Wire], constants: FieldConstants) -> Self {
        Self {
            dipoles,
            wires,
            constants,
        }
    }

    /// Total field at (x, y).
    pub fn total_field(&self, x: f64, y: f64) -> DVec2 {
        self.field_at(DVec2::new(x, y))
    }

    pub fn source_count(&self) -> usize {
        self.dipoles.len() + self.wires.len()
    }
}

impl VectorField for Superposition<'_> {
    fn field_at(&self, point: DVec2) -> DVec2 {
        superpose(self.dipoles, point, &self.constants)
            + superpose(self.wires, point, &self.constants)
    }
}
