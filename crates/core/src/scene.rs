//! Reproducible description of a session.
//!
//! A [`Scene`] captures everything needed to rebuild a session: canvas size,
//! configuration, PRNG seed and every source. Loading the same scene twice
//! and rendering produces identical streamlines.

use crate::config::SessionConfig;
use crate::error::FieldError;
use crate::source::{Dipole, Wire};
use crate::viewport::Viewport;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    /// Seed for the jitter PRNG.
    pub seed: u64,
    #[serde(default)]
    pub config: SessionConfig,
    #[serde(default)]
    pub dipoles: Vec<Dipole>,
    #[serde(default)]
    pub wires: Vec<Wire>,
}

impl Scene {
    /// Empty scene with the default configuration.
    pub fn new(width: f64, height: f64, seed: u64) -> Self {
        Self {
            width,
            height,
            seed,
            config: SessionConfig::default(),
            dipoles: Vec::new(),
            wires: Vec::new(),
        }
    }

    /// The initial scene: one default dipole at the canvas centre, angle 0.
    pub fn with_default_dipole(width: f64, height: f64, seed: u64) -> Self {
        let mut scene = Self::new(width, height, seed);
        scene.dipoles.push(Dipole::new(
            width / 2.0,
            height / 2.0,
            0.0,
            scene.config.presets.dipole_moment,
            scene.config.display.dipole_radius,
        ));
        scene
    }

    pub fn viewport(&self) -> Result<Viewport, FieldError> {
        Viewport::new(self.width, self.height)
    }

    /// Checks dimensions, configuration and that every source is finite.
    pub fn validate(&self) -> Result<(), FieldError> {
        self.viewport()?;
        self.config.validate()?;
        if let Some(i) = self
            .dipoles
            .iter()
            .position(|d| ![d.x, d.y, d.angle, d.moment, d.radius].iter().all(|v| v.is_finite()))
        {
            return Err(FieldError::InvalidScene(format!(
                "dipole {i} has a non-finite value"
            )));
        }
        if let Some(i) = self
            .wires
            .iter()
            .position(|w| ![w.x, w.y, w.current, w.radius].iter().all(|v| v.is_finite()))
        {
            return Err(FieldError::InvalidScene(format!(
                "wire {i} has a non-finite value"
            )));
        }
        Ok(())
    }
}
