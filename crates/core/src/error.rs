//! Error types for the magfield core.
//!
//! Numerical degeneracy (a zero field, a stalled RK4 step, a streamline that
//! leaves the canvas) is never reported here: those are ordinary outcomes and
//! surface as zero vectors, `None` or short streamlines. These errors cover
//! construction and configuration only.

use thiserror::Error;

/// Errors produced when building or editing a session.
#[derive(Debug, Error)]
pub enum FieldError {
    /// Canvas width or height was zero, negative or not finite.
    #[error("invalid dimensions: width and height must be finite and positive")]
    InvalidDimensions,

    /// A setting was outside its allowed range.
    #[error("invalid setting '{name}': {reason}")]
    InvalidSetting { name: String, reason: String },

    /// A source index did not refer to an existing dipole or wire.
    #[error("{kind} index {index} out of range (have {len})")]
    SourceOutOfRange {
        kind: &'static str,
        index: usize,
        len: usize,
    },

    /// A scene description was structurally invalid.
    #[error("invalid scene: {0}")]
    InvalidScene(String),
}

impl FieldError {
    pub(crate) fn setting(name: &str, reason: impl Into<String>) -> Self {
        FieldError::InvalidSetting {
            name: name.to_owned(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_dimensions_mentions_width_and_height() {
        let msg = FieldError::InvalidDimensions.to_string();
        assert!(
            msg.contains("width") && msg.contains("height"),
            "expected message mentioning width and height, got: {msg}"
        );
    }

    #[test]
    fn invalid_setting_includes_name_and_reason() {
        let msg = FieldError::setting("step_size", "must be positive").to_string();
        assert!(msg.contains("step_size"), "missing name in: {msg}");
        assert!(msg.contains("must be positive"), "missing reason in: {msg}");
    }

    #[test]
    fn source_out_of_range_includes_kind_index_and_len() {
        let err = FieldError::SourceOutOfRange {
            kind: "wire",
            index: 7,
            len: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("wire"), "missing kind in: {msg}");
        assert!(msg.contains('7'), "missing index in: {msg}");
        assert!(msg.contains('3'), "missing len in: {msg}");
    }

    #[test]
    fn field_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FieldError>();
    }
}
