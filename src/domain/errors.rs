//! Domain error types
//!
//! All errors are domain-specific and don't expose third-party types.
//! Recognizer-local failures (unparseable numerals, bad dates) are not
//! represented here at all: they are swallowed inside the recognizers and
//! reported as "no match". Only facade-level failures become errors.

use thiserror::Error;

/// Main Mosaic error type
///
/// This is the primary error type used throughout the engine.
/// It wraps specific failure classes and provides context for error handling.
#[derive(Debug, Error)]
pub enum MosaicError {
    /// Configuration-related errors (missing synthesis credential, bad
    /// pattern library, invalid log level)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A requested language has no registered recognizers
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// A recognition result carries offsets outside the text
    #[error("Invalid span {start}..{end} for text of {len} characters")]
    InvalidSpan {
        start: usize,
        end: usize,
        len: usize,
    },

    /// An operator configuration names an operator the engine doesn't know
    #[error("Unknown anonymization operator: {0}")]
    UnknownOperator(String),

    /// An operator configuration is missing or carries malformed parameters
    #[error("Invalid operator parameters for '{operator}': {message}")]
    InvalidOperatorParams { operator: String, message: String },

    /// Generative synthesis call failed
    #[error("Synthesis error: {0}")]
    Synthesis(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Validation errors (bad request shape)
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<std::io::Error> for MosaicError {
    fn from(err: std::io::Error) -> Self {
        MosaicError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MosaicError {
    fn from(err: serde_json::Error) -> Self {
        MosaicError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for MosaicError {
    fn from(err: toml::de::Error) -> Self {
        MosaicError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MosaicError::Configuration("missing credential".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing credential");
    }

    #[test]
    fn test_invalid_span_display() {
        let err = MosaicError::InvalidSpan {
            start: 4,
            end: 9,
            len: 6,
        };
        assert_eq!(err.to_string(), "Invalid span 4..9 for text of 6 characters");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MosaicError = io_err.into();
        assert!(matches!(err, MosaicError::Io(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: MosaicError = toml_err.into();
        assert!(matches!(err, MosaicError::Configuration(_)));
    }

    #[test]
    fn test_implements_std_error() {
        let err = MosaicError::Validation("test".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
