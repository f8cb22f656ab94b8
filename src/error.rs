//! Error taxonomy for input validation.
//!
//! Everything that can go wrong is detected before a packing run starts.
//! Infeasible placements and exhausted budgets are normal results, not errors.

use thiserror::Error;

/// Rejected input data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid dimension: {0}")]
    InvalidDimension(String),

    #[error("Invalid weight: {0}")]
    InvalidWeight(String),

    #[error("Malformed dimension string '{input}': {reason}")]
    MalformedDimension { input: String, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Occupancy grid would need {cells} cells, limit is {limit}")]
    GridTooLarge { cells: u64, limit: u64 },
}

/// Checks that a length is strictly positive and finite.
pub(crate) fn validate_dimension(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidDimension(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

/// Checks that a weight is strictly positive and finite.
pub(crate) fn validate_weight(value: f64, name: &str) -> Result<(), ValidationError> {
    if value <= 0.0 || value.is_nan() || value.is_infinite() {
        return Err(ValidationError::InvalidWeight(format!(
            "{} must be positive, got: {}",
            name, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_dimension() {
        assert!(validate_dimension(10.0, "Length").is_ok());
        assert!(validate_dimension(0.0, "Length").is_err());
        assert!(validate_dimension(-1.0, "Length").is_err());
        assert!(validate_dimension(f64::NAN, "Length").is_err());
        assert!(validate_dimension(f64::INFINITY, "Length").is_err());
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight(2.5, "Weight").is_ok());
        assert!(matches!(
            validate_weight(0.0, "Weight"),
            Err(ValidationError::InvalidWeight(_))
        ));
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let err = validate_dimension(-3.0, "Container width").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid dimension: Container width must be positive, got: -3"
        );
    }
}
