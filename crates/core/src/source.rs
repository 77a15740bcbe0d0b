//! Field sources: point magnetic dipoles and infinite straight wires.
//!
//! Both laws use a softened distance `r = sqrt(dx² + dy² + S²)`, so a query
//! exactly on top of a source yields a finite, bounded field. All
//! implementations are pure: same source state and query point, same output.

use crate::config::FieldConstants;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Distances and magnitudes below this are treated as zero.
pub const FIELD_EPS: f64 = 1e-6;

/// Grab radius around a dipole's rotation handle, in pixels.
const HANDLE_GRAB_RADIUS: f64 = 8.0;

/// Anything that contributes a 2D magnetic field.
pub trait FieldSource {
    /// Field contribution at `point`.
    fn field_at(&self, point: DVec2, constants: &FieldConstants) -> DVec2;
}

/// Point magnetic dipole.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dipole {
    pub x: f64,
    pub y: f64,
    /// Orientation in radians; 0 points along +x.
    pub angle: f64,
    pub moment: f64,
    /// Drawing radius; not part of the field law.
    pub radius: f64,
}

/// Infinite straight wire perpendicular to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub x: f64,
    pub y: f64,
    /// Signed current; the sign picks the out-of-plane direction.
    pub current: f64,
    /// Drawing radius; not part of the field law.
    pub radius: f64,
}

/// Direction of a wire's current relative to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn sign(self) -> f64 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => -1.0,
        }
    }
}

/// Either kind of source, for heterogeneous collections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Source {
    Dipole(Dipole),
    Wire(Wire),
}

impl Dipole {
    pub fn new(x: f64, y: f64, angle: f64, moment: f64, radius: f64) -> Self {
        Self {
            x,
            y,
            angle,
            moment,
            radius,
        }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Moment vector `m (cos θ, sin θ)`.
    pub fn moment_vector(&self) -> DVec2 {
        self.moment * DVec2::from_angle(self.angle)
    }

    /// Centre of the rotation handle, two radii out along the moment axis.
    pub fn handle_position(&self) -> DVec2 {
        self.position() + 2.0 * self.radius * DVec2::from_angle(self.angle)
    }

    /// Whether `point` is on the dipole body.
    pub fn contains(&self, point: DVec2) -> bool {
        point.distance(self.position()) < self.radius * 1.5
    }

    /// Whether `point` is on the rotation handle.
    pub fn handle_contains(&self, point: DVec2) -> bool {
        point.distance(self.handle_position()) < HANDLE_GRAB_RADIUS
    }
}

impl Wire {
    pub fn new(x: f64, y: f64, current: f64, radius: f64) -> Self {
        Self {
            x,
            y,
            current,
            radius,
        }
    }

    pub fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn polarity(&self) -> Polarity {
        if self.current.is_sign_negative() {
            Polarity::Negative
        } else {
            Polarity::Positive
        }
    }

    /// Whether `point` is within the (generous) grab area of the wire.
    pub fn contains(&self, point: DVec2) -> bool {
        point.distance(self.position()) < self.radius * 3.0
    }
}

impl FieldSource for Dipole {
    /// `B = μ₀ / r³ · (3 (m·r̂) r̂ − m)` with softened `r`.
    fn field_at(&self, point: DVec2, constants: &FieldConstants) -> DVec2 {
        let d = point - self.position();
        let r2_soft = d.length_squared() + constants.softening * constants.softening;
        let r = r2_soft.sqrt();
        if r < FIELD_EPS {
            return DVec2::ZERO;
        }
        let r3 = r2_soft * r;
        let m = self.moment_vector();
        let r_hat = d / r;
        let m_dot_r = m.dot(r_hat);
        (constants.mu_0 / r3) * (3.0 * m_dot_r * r_hat - m)
    }
}

impl FieldSource for Wire {
    /// `|B| = μ₀ I / (2π r)`, circulating around the wire.
    fn field_at(&self, point: DVec2, constants: &FieldConstants) -> DVec2 {
        let d = point - self.position();
        let r = (d.length_squared() + constants.softening * constants.softening).sqrt();
        if r < FIELD_EPS {
            return DVec2::ZERO;
        }
        let b_mag = constants.mu_0 * self.current / (2.0 * PI * r);
        DVec2::new(-b_mag * d.y / r, b_mag * d.x / r)
    }
}

impl FieldSource for Source {
    fn field_at(&self, point: DVec2, constants: &FieldConstants) -> DVec2 {
        match self {
            Source::Dipole(d) => d.field_at(point, constants),
            Source::Wire(w) => w.field_at(point, constants),
        }
    }
}

impl<S: FieldSource + ?Sized> FieldSource for &S {
    fn field_at(&self, point: DVec2, constants: &FieldConstants) -> DVec2 {
        (**self).field_at(point, constants)
    }
}

impl From<Dipole> for Source {
    fn from(d: Dipole) -> Self {
        Source::Dipole(d)
    }
}

impl From<Wire> for Source {
    fn from(w: Wire) -> Self {
        Source::Wire(w)
    }
}
