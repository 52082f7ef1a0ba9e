//! Error types for Cinder

use thiserror::Error;

/// The main error type for Cinder operations
#[derive(Debug, Error)]
pub enum CinderError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Value out of range: {field} must be between {min} and {max}, got {value}")]
    ValueOutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    #[error("Invalid enum value: {value} is not one of {allowed:?}")]
    InvalidEnumValue {
        value: String,
        allowed: Vec<String>,
    },

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParseError(String),
}

/// Result type alias for Cinder operations
pub type Result<T> = std::result::Result<T, CinderError>;

impl CinderError {
    /// Build a `ValueOutOfRange` error for `field`
    pub fn out_of_range(field: &str, min: f64, max: f64, value: f64) -> Self {
        CinderError::ValueOutOfRange {
            field: field.to_string(),
            min,
            max,
            value,
        }
    }
}

impl From<toml::de::Error> for CinderError {
    fn from(err: toml::de::Error) -> Self {
        CinderError::TomlParseError(err.to_string())
    }
}
