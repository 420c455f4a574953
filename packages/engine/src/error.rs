//! Error types for the Parkwise engine

use thiserror::Error;

/// Main error type for engine operations.
///
/// The evaluator entry points never return these; they surface from loading
/// and parsing raw data, and from the display normalizer before it falls back
/// to raw descriptions.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to load a blockface dataset
    #[error("Failed to load blockfaces: {0}")]
    LoadError(String),

    /// YAML parsing error
    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml_ng::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Wall-clock string that is not a valid `HH:mm`
    #[error("Invalid time of day: '{0}'. Expected HH:mm (e.g., 09:30)")]
    InvalidTimeOfDay(String),

    /// Day-of-week index outside 0..=6
    #[error("Invalid day of week: {0}. Expected 0 (Sunday) through 6 (Saturday)")]
    InvalidDayOfWeek(u8),

    /// Invalid date-time string
    #[error("Invalid date-time format: {0}")]
    InvalidDateTime(String),

    /// Rule text could not be normalized for display
    #[error("Normalization failed for rule '{rule_id}': {reason}")]
    Normalization { rule_id: String, reason: String },
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
