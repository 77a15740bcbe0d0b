//! Session configuration: physical constants, strength presets, display and
//! streamline settings.
//!
//! Everything here is plain data owned by a [`Session`](crate::session::Session).
//! `SessionConfig::apply_json` layers a JSON object of overrides on top of an
//! existing config, and `validate` enforces the ranges afterwards.

use crate::error::FieldError;
use crate::params::{override_bool, override_f64, override_usize};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Permeability-like scale factor.
pub const DEFAULT_MU_0: f64 = 1.0;
/// Softening length added (squared) to every source distance.
pub const DEFAULT_SOFTENING: f64 = 5.0;
pub const DEFAULT_DIPOLE_MOMENT: f64 = 100.0;
pub const DEFAULT_WIRE_CURRENT: f64 = 50.0;
pub const DEFAULT_DIPOLE_RADIUS: f64 = 15.0;
pub const DEFAULT_WIRE_RADIUS: f64 = 10.0;
pub const DEFAULT_ARROW_SCALE: f64 = 2.0;
/// Field magnitude mapped to full color intensity.
pub const DEFAULT_MAX_FIELD_DISPLAY: f64 = 5.0;
pub const DEFAULT_GRID_SPACING: usize = 40;
pub const DEFAULT_STREAM_DENSITY: usize = 15;
pub const DEFAULT_STREAM_LENGTH: usize = 200;
pub const DEFAULT_STEP_SIZE: f64 = 2.0;

/// Constants that enter the field formulas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldConstants {
    pub mu_0: f64,
    pub softening: f64,
}

impl Default for FieldConstants {
    fn default() -> Self {
        Self {
            mu_0: DEFAULT_MU_0,
            softening: DEFAULT_SOFTENING,
        }
    }
}

/// Strengths given to new sources and re-applied to existing ones when changed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrengthPresets {
    pub dipole_moment: f64,
    /// Magnitude only; each wire keeps its own sign.
    pub wire_current: f64,
}

impl Default for StrengthPresets {
    fn default() -> Self {
        Self {
            dipole_moment: DEFAULT_DIPOLE_MOMENT,
            wire_current: DEFAULT_WIRE_CURRENT,
        }
    }
}

/// Consumer-side display parameters. The core only uses them for vector-grid
/// intensities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub arrow_scale: f64,
    pub max_field_display: f64,
    pub dipole_radius: f64,
    pub wire_radius: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            arrow_scale: DEFAULT_ARROW_SCALE,
            max_field_display: DEFAULT_MAX_FIELD_DISPLAY,
            dipole_radius: DEFAULT_DIPOLE_RADIUS,
            wire_radius: DEFAULT_WIRE_RADIUS,
        }
    }
}

/// User-facing sliders and toggles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamSettings {
    /// Arclength of one RK4 step, in pixels.
    pub step_size: f64,
    /// Maximum RK4 steps per trace direction.
    pub stream_length: usize,
    /// Seed grid resolution per axis.
    pub stream_density: usize,
    /// Pixel spacing of the vector-grid samples.
    pub grid_spacing: usize,
    pub show_vectors: bool,
    pub show_streamlines: bool,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            step_size: DEFAULT_STEP_SIZE,
            stream_length: DEFAULT_STREAM_LENGTH,
            stream_density: DEFAULT_STREAM_DENSITY,
            grid_spacing: DEFAULT_GRID_SPACING,
            show_vectors: true,
            show_streamlines: true,
        }
    }
}

/// Full configuration of a session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub constants: FieldConstants,
    pub presets: StrengthPresets,
    pub display: DisplayConfig,
    pub stream: StreamSettings,
}

impl SessionConfig {
    /// Applies flat JSON overrides (`{"step_size": 1.5, "softening": 0}`),
    /// ignoring unknown keys and mistyped values.
    pub fn apply_json(&mut self, params: &Value) {
        override_f64(params, "mu_0", &mut self.constants.mu_0);
        override_f64(params, "softening", &mut self.constants.softening);
        override_f64(params, "dipole_moment", &mut self.presets.dipole_moment);
        override_f64(params, "wire_current", &mut self.presets.wire_current);
        override_f64(params, "arrow_scale", &mut self.display.arrow_scale);
        override_f64(params, "max_field_display", &mut self.display.max_field_display);
        override_f64(params, "step_size", &mut self.stream.step_size);
        override_usize(params, "stream_length", &mut self.stream.stream_length);
        override_usize(params, "stream_density", &mut self.stream.stream_density);
        override_usize(params, "grid_spacing", &mut self.stream.grid_spacing);
        override_bool(params, "show_vectors", &mut self.stream.show_vectors);
        override_bool(params, "show_streamlines", &mut self.stream.show_streamlines);
    }

    /// Default config with `params` applied, then validated.
    pub fn from_json(params: &Value) -> Result<Self, FieldError> {
        let mut config = Self::default();
        config.apply_json(params);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FieldError> {
        let finite = |name: &str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(FieldError::setting(name, "must be finite"))
            }
        };
        let positive = |name: &str, v: f64| {
            finite(name, v)?;
            if v > 0.0 {
                Ok(())
            } else {
                Err(FieldError::setting(name, format!("must be > 0, got {v}")))
            }
        };
        let nonzero = |name: &str, v: usize| {
            if v > 0 {
                Ok(())
            } else {
                Err(FieldError::setting(name, "must be at least 1"))
            }
        };

        finite("mu_0", self.constants.mu_0)?;
        finite("softening", self.constants.softening)?;
        if self.constants.softening < 0.0 {
            return Err(FieldError::setting("softening", "must not be negative"));
        }
        finite("dipole_moment", self.presets.dipole_moment)?;
        finite("wire_current", self.presets.wire_current)?;
        positive("arrow_scale", self.display.arrow_scale)?;
        positive("max_field_display", self.display.max_field_display)?;
        positive("step_size", self.stream.step_size)?;
        nonzero("stream_length", self.stream.stream_length)?;
        nonzero("stream_density", self.stream.stream_density)?;
        nonzero("grid_spacing", self.stream.grid_spacing)?;
        Ok(())
    }

    /// Current values in the flat shape accepted by [`apply_json`](Self::apply_json).
    pub fn params(&self) -> Value {
        json!({
            "mu_0": self.constants.mu_0,
            "softening": self.constants.softening,
            "dipole_moment": self.presets.dipole_moment,
            "wire_current": self.presets.wire_current,
            "arrow_scale": self.display.arrow_scale,
            "max_field_display": self.display.max_field_display,
            "step_size": self.stream.step_size,
            "stream_length": self.stream.stream_length,
            "stream_density": self.stream.stream_density,
            "grid_spacing": self.stream.grid_spacing,
            "show_vectors": self.stream.show_vectors,
            "show_streamlines": self.stream.show_streamlines,
        })
    }

    /// Schema for every key accepted by [`apply_json`](Self::apply_json).
    pub fn param_schema() -> Value {
        json!({
            "mu_0": {
                "type": "number",
                "default": DEFAULT_MU_0,
                "description": "Permeability-like scale applied to every source"
            },
            "softening": {
                "type": "number",
                "default": DEFAULT_SOFTENING,
                "min": 0.0,
                "description": "Length added in quadrature to source distances"
            },
            "dipole_moment": {
                "type": "number",
                "default": DEFAULT_DIPOLE_MOMENT,
                "description": "Moment shared by all dipoles"
            },
            "wire_current": {
                "type": "number",
                "default": DEFAULT_WIRE_CURRENT,
                "description": "Current magnitude shared by all wires"
            },
            "arrow_scale": {
                "type": "number",
                "default": DEFAULT_ARROW_SCALE,
                "min": 0.0,
                "description": "Vector-grid arrow length multiplier"
            },
            "max_field_display": {
                "type": "number",
                "default": DEFAULT_MAX_FIELD_DISPLAY,
                "min": 0.0,
                "description": "Field magnitude mapped to full color intensity"
            },
            "step_size": {
                "type": "number",
                "default": DEFAULT_STEP_SIZE,
                "min": 0.0,
                "description": "Streamline arclength per RK4 step"
            },
            "stream_length": {
                "type": "integer",
                "default": DEFAULT_STREAM_LENGTH,
                "min": 1,
                "description": "Maximum RK4 steps per direction"
            },
            "stream_density": {
                "type": "integer",
                "default": DEFAULT_STREAM_DENSITY,
                "min": 1,
                "description": "Seed grid resolution per axis"
            },
            "grid_spacing": {
                "type": "integer",
                "default": DEFAULT_GRID_SPACING,
                "min": 1,
                "description": "Pixel spacing of vector-field samples"
            },
            "show_vectors": {
                "type": "boolean",
                "default": true,
                "description": "Sample the vector grid"
            },
            "show_streamlines": {
                "type": "boolean",
                "default": true,
                "description": "Trace streamlines on render"
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn from_json_applies_overrides() {
        let cfg = SessionConfig::from_json(&json!({
            "softening": 0,
            "step_size": 1.5,
            "stream_density": 20,
            "show_vectors": false,
        }))
        .unwrap();
        assert_eq!(cfg.constants.softening, 0.0);
        assert_eq!(cfg.stream.step_size, 1.5);
        assert_eq!(cfg.stream.stream_density, 20);
        assert!(!cfg.stream.show_vectors);
        assert_eq!(cfg.stream.stream_length, DEFAULT_STREAM_LENGTH);
    }

    #[test]
    fn from_json_rejects_non_positive_step() {
        let err = SessionConfig::from_json(&json!({"step_size": 0.0})).unwrap_err();
        assert!(err.to_string().contains("step_size"), "got: {err}");
        assert!(SessionConfig::from_json(&json!({"step_size": -2.0})).is_err());
    }

    #[test]
    fn from_json_rejects_zero_counts() {
        for key in ["stream_length", "stream_density", "grid_spacing"] {
            let mut params = serde_json::Map::new();
            params.insert(key.to_owned(), json!(0));
            let err = SessionConfig::from_json(&Value::Object(params)).unwrap_err();
            assert!(err.to_string().contains(key), "got: {err}");
        }
    }

    #[test]
    fn negative_softening_is_rejected() {
        assert!(SessionConfig::from_json(&json!({"softening": -1.0})).is_err());
    }

    #[test]
    fn params_round_trip_through_apply_json() {
        let mut original = SessionConfig::default();
        original.stream.stream_density = 9;
        original.presets.wire_current = 75.0;
        let mut restored = SessionConfig::default();
        restored.apply_json(&original.params());
        assert_eq!(original, restored);
    }

    #[test]
    fn schema_covers_every_param() {
        let schema = SessionConfig::param_schema();
        let params = SessionConfig::default().params();
        for key in params.as_object().unwrap().keys() {
            assert!(schema.get(key).is_some(), "schema missing {key}");
        }
    }

    #[test]
    fn partial_config_deserializes_with_defaults() {
        let cfg: SessionConfig =
            serde_json::from_value(json!({"stream": {
                "step_size": 1.0,
                "stream_length": 50,
                "stream_density": 5,
                "grid_spacing": 20,
                "show_vectors": true,
                "show_streamlines": false
            }}))
            .unwrap();
        assert_eq!(cfg.stream.stream_length, 50);
        assert_eq!(cfg.constants, FieldConstants::default());
    }
}
