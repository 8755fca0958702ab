//! Validation errors for user-submitted forms

use thiserror::Error;

/// Rejection of a review form before it reaches the queue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent or blank
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// A field could not be parsed into its expected type
    #[error("Invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// Rating outside of the star range
    #[error("Rating must be between {min} and {max}, got {got}")]
    RatingOutOfRange { min: u8, max: u8, got: i64 },

    /// Text field longer than allowed
    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },
}
