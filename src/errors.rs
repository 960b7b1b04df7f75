//! Centralized error handling for masked statistics
//!
//! Only configuration and I/O problems are errors. A pass that selects no
//! samples is not one: it finishes normally and reports `count == 0`.

use thiserror::Error;

/// Main error type for masked statistics operations
#[derive(Debug, Error)]
pub enum MaskedStatsError {
    /// Mask geometry does not match the image geometry
    #[error("mask geometry {mask:?} does not match image geometry {image:?}")]
    GeometryMismatch { image: Vec<usize>, mask: Vec<usize> },

    /// Region does not lie inside the image
    #[error("invalid region: {0}")]
    InvalidRegion(String),

    /// Controller operation called in the wrong pass state
    #[error("invalid pass state: expected {expected}, found {found}")]
    InvalidPassState {
        expected: &'static str,
        found: &'static str,
    },

    /// Configuration changed while a pass is accumulating
    #[error("cannot change configuration while a pass is in progress")]
    PassInProgress,

    /// Image data could not be interpreted
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Variable not found in NetCDF file
    #[error("Variable '{var}' not found in file")]
    VariableNotFound { var: String },

    /// NetCDF file operation errors
    #[error("NetCDF error: {0}")]
    NetCDFError(#[from] netcdf::Error),

    /// I/O operation errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Array shape or dimension error
    #[error("Array error: {0}")]
    ArrayError(#[from] ndarray::ShapeError),

    /// JSON report serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Thread pool configuration error
    #[error("Thread pool error: {0}")]
    ThreadPoolError(String),
}

impl MaskedStatsError {
    /// Create an invalid region error.
    #[must_use]
    pub fn invalid_region(details: impl Into<String>) -> Self {
        Self::InvalidRegion(details.into())
    }

    /// Create an invalid image error.
    #[must_use]
    pub fn invalid_image(details: impl Into<String>) -> Self {
        Self::InvalidImage(details.into())
    }
}

/// Result type alias for masked statistics operations
pub type Result<T> = std::result::Result<T, MaskedStatsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MaskedStatsError::GeometryMismatch {
            image: vec![4, 3],
            mask: vec![3, 4],
        };
        assert!(format!("{err}").contains("[3, 4]"));

        let err = MaskedStatsError::invalid_region("outside image");
        assert!(format!("{err}").contains("outside image"));

        let err = MaskedStatsError::VariableNotFound {
            var: "temp".to_string(),
        };
        assert_eq!(format!("{err}"), "Variable 'temp' not found in file");

        let err = MaskedStatsError::InvalidPassState {
            expected: "Accumulating",
            found: "Idle",
        };
        assert!(format!("{err}").contains("expected Accumulating, found Idle"));
    }
}
