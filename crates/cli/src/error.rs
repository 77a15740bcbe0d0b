//! CLI errors with distinct exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: field error (bad dimensions, bad setting, bad scene contents)
//! - 11: I/O error (reading a scene, writing output)
//! - 12: input error (unparseable scene file or --params JSON)
//! - 13: serialization error

use magfield_core::FieldError;
use std::fmt;

/// Everything that can end a `magfield` run early.
pub enum CliError {
    /// Dimensions, settings or scene contents rejected by the core (exit 10).
    Field(FieldError),
    /// A file could not be read or written (exit 11).
    Io(String),
    /// Scene file or `--params` is not valid JSON for its shape (exit 12).
    Input(String),
    /// Output could not be serialized (exit 13).
    Serialization(String),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Field(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Field(e) => write!(f, "{e}"),
            CliError::Io(msg) | CliError::Input(msg) | CliError::Serialization(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CliError({}): {self}", self.exit_code())
    }
}

impl From<FieldError> for CliError {
    fn from(e: FieldError) -> Self {
        CliError::Field(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [
            CliError::Field(FieldError::InvalidDimensions).exit_code(),
            CliError::Io("disk full".into()).exit_code(),
            CliError::Input("bad json".into()).exit_code(),
            CliError::Serialization("oops".into()).exit_code(),
        ];
        assert_eq!(codes, [10, 11, 12, 13]);
    }

    #[test]
    fn field_error_converts_and_keeps_message() {
        let err = CliError::from(FieldError::InvalidScene("wire 2 has a non-finite value".into()));
        assert_eq!(err.exit_code(), 10);
        assert!(err.to_string().contains("wire 2"));
    }

    #[test]
    fn serde_error_routes_to_serialization() {
        let bad = serde_json::from_str::<serde_json::Value>("{invalid");
        let err = CliError::from(bad.unwrap_err());
        assert_eq!(err.exit_code(), 13);
    }
}
