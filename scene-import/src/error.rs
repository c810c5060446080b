//! Error types for the import engine.
//!
//! Only failures that make a whole import call meaningless are errors.
//! Everything scoped to a single record is reported as an
//! [`ImportIssue`](crate::report::ImportIssue) instead.

use thiserror::Error;

/// Result type for import calls.
pub type ImportResult<T> = Result<T, ImportError>;

/// Fatal import errors.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The input holds no usable top-level record.
    #[error("No importable root found: {0}")]
    RootNotFound(String),

    /// The input is not valid JSON.
    #[error("Invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ImportError::RootNotFound("empty array".to_string());
        assert_eq!(err.to_string(), "No importable root found: empty array");

        let err: ImportError = serde_json::from_str::<serde_json::Value>("{")
            .map_err(ImportError::from)
            .expect_err("invalid");
        assert!(err.to_string().starts_with("Invalid JSON"));
    }
}
