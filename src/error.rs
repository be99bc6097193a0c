//! Error types for the taxi fare prediction pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, TaxiFareError>;

/// Main error type for the crate
#[derive(Error, Debug)]
pub enum TaxiFareError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Inference error: {0}")]
    InferenceError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<polars::error::PolarsError> for TaxiFareError {
    fn from(err: polars::error::PolarsError) -> Self {
        TaxiFareError::DataError(err.to_string())
    }
}

impl From<xgboost::XGBError> for TaxiFareError {
    fn from(err: xgboost::XGBError) -> Self {
        TaxiFareError::TrainingError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TaxiFareError::DataError("bad row".to_string());
        assert_eq!(err.to_string(), "Data error: bad row");
    }

    #[test]
    fn test_schema_mismatch_display() {
        let err = TaxiFareError::SchemaMismatch {
            expected: "a, b".to_string(),
            actual: "a".to_string(),
        };
        assert_eq!(err.to_string(), "Schema mismatch: expected a, b, got a");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TaxiFareError = io_err.into();
        assert!(matches!(err, TaxiFareError::IoError(_)));
    }
}
