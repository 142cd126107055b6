// =============================================================================
// Engine errors
// =============================================================================
//
// Only two things can make a batch fail: a bad tuning parameter or a bad bar.
// Missing history is never an error; it is carried as `None` in the derived
// columns.

use thiserror::Error;

/// Errors raised eagerly by the indicator and signal engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// A length, multiplier or threshold is outside its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    /// A bar in the input batch is malformed or out of order.
    #[error("invalid input at bar {index}: {reason}")]
    InvalidInput { index: usize, reason: String },
}

impl EngineError {
    pub fn invalid_parameter(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    pub fn invalid_input(index: usize, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            index,
            reason: reason.into(),
        }
    }
}

/// Reject a zero window length.
pub(crate) fn require_length(name: &'static str, length: usize) -> Result<(), EngineError> {
    if length == 0 {
        return Err(EngineError::invalid_parameter(name, "length must be at least 1"));
    }
    Ok(())
}

/// Reject a non-finite or non-positive multiplier.
pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(EngineError::invalid_parameter(
            name,
            format!("must be a positive finite number, got {value}"),
        ));
    }
    Ok(())
}

/// Reject NaN / infinite thresholds.
pub(crate) fn require_finite(name: &'static str, value: f64) -> Result<(), EngineError> {
    if !value.is_finite() {
        return Err(EngineError::invalid_parameter(
            name,
            format!("must be finite, got {value}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_rejected() {
        let err = require_length("band_length", 0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameter { name: "band_length", .. }));
        assert!(require_length("band_length", 1).is_ok());
    }

    #[test]
    fn multiplier_must_be_positive_and_finite() {
        assert!(require_positive("band_std_dev", 0.0).is_err());
        assert!(require_positive("band_std_dev", -1.5).is_err());
        assert!(require_positive("band_std_dev", f64::NAN).is_err());
        assert!(require_positive("band_std_dev", 1.5).is_ok());
    }

    #[test]
    fn display_includes_index() {
        let err = EngineError::invalid_input(3, "low > high");
        assert_eq!(err.to_string(), "invalid input at bar 3: low > high");
    }
}
