//! Error types for profile validation and engine configuration.
//!
//! A `ValidationError` is the only way a prediction can fail. Telemetry
//! problems never surface here; they degrade to documented defaults.

use thiserror::Error;

/// A required profile field is absent or outside its declared domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field was not supplied.
    #[error("missing required profile field: {field}")]
    MissingField { field: &'static str },

    /// A closed-set field held a value outside its enumeration.
    #[error("unrecognized {field}: '{value}'")]
    UnknownValue { field: &'static str, value: String },

    /// A numeric field fell outside its bounds.
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A `{min, max}` pair had `min > max`.
    #[error("{field} range is inverted: min {min} > max {max}")]
    InvertedRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    /// A numeric field was NaN or infinite.
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    /// A text field was present but blank.
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    /// A list field repeated an entry.
    #[error("{field} lists '{value}' more than once")]
    Duplicate { field: &'static str, value: String },
}

impl ValidationError {
    /// Name of the offending profile field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::UnknownValue { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::InvertedRange { field, .. }
            | ValidationError::NonFinite { field }
            | ValidationError::Empty { field }
            | ValidationError::Duplicate { field, .. } => field,
        }
    }
}

/// The engine configuration is internally inconsistent.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A rank table violates its ordering rules.
    #[error("rank table {year}: {reason}")]
    RankTable { year: u16, reason: String },

    /// No rank table was configured at all.
    #[error("at least one rank table must be configured")]
    NoRankTables,

    /// Two rank tables claim the same exam year.
    #[error("rank table for {0} is defined more than once")]
    DuplicateYear(u16),

    /// A probability band has malformed steps.
    #[error("probability band '{name}': {reason}")]
    ProbabilityBand { name: String, reason: String },

    /// Score limits or a factor constant are inconsistent.
    #[error("invalid {section} setting: {reason}")]
    Setting {
        section: &'static str,
        reason: String,
    },
}

/// A narrative payload failed strict decoding.
#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("narrative is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("narrative field {field} {reason}")]
    Field {
        field: &'static str,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_field() {
        let err = ValidationError::UnknownValue {
            field: "category",
            value: "alien".into(),
        };
        assert_eq!(err.to_string(), "unrecognized category: 'alien'");
        assert_eq!(err.field(), "category");

        let err = ValidationError::OutOfRange {
            field: "qualifying_percentage",
            value: 120.0,
            min: 0.0,
            max: 100.0,
        };
        assert!(err.to_string().contains("[0, 100]"));
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::RankTable {
            year: 2025,
            reason: "thresholds must strictly descend".into(),
        };
        assert_eq!(
            err.to_string(),
            "rank table 2025: thresholds must strictly descend"
        );
    }
}
