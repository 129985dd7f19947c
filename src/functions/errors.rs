//! # Function Errors

use thiserror::Error;

use crate::types::ValidationError;

/// Result type for function operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Function errors
#[derive(Debug, Clone, Error)]
pub enum FunctionError {
    #[error("Function not found: {0}")]
    NotFound(String),

    #[error("Function already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid arguments for {function}: {source}")]
    InvalidArguments {
        function: String,
        source: ValidationError,
    },

    #[error("Invalid return value from {function}: {source}")]
    InvalidReturn {
        function: String,
        source: ValidationError,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FunctionError {
    /// Stable error code for responses
    pub fn code(&self) -> &'static str {
        match self {
            FunctionError::NotFound(_) => "FUNCTION_NOT_FOUND",
            FunctionError::AlreadyExists(_) => "FUNCTION_ALREADY_EXISTS",
            FunctionError::InvalidArguments { .. } => "FUNCTION_INVALID_ARGUMENTS",
            FunctionError::InvalidReturn { .. } => "FUNCTION_INVALID_RETURN",
            FunctionError::Internal(_) => "FUNCTION_INTERNAL",
        }
    }

    /// The validation failure behind an argument or return rejection
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            FunctionError::InvalidArguments { source, .. }
            | FunctionError::InvalidReturn { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldPath, PathSegment};

    #[test]
    fn test_codes() {
        assert_eq!(FunctionError::NotFound("games:winGame".into()).code(), "FUNCTION_NOT_FOUND");
        assert_eq!(
            FunctionError::AlreadyExists("games:winGame".into()).code(),
            "FUNCTION_ALREADY_EXISTS"
        );
    }

    #[test]
    fn test_invalid_arguments_display() {
        let err = FunctionError::InvalidArguments {
            function: "test:testQuery".into(),
            source: ValidationError::Mismatch {
                path: FieldPath::from(vec![PathSegment::Field("test".into())]),
                expected: "String".into(),
                actual: "Int64".into(),
            },
        };
        let display = err.to_string();
        assert!(display.contains("test:testQuery"));
        assert!(display.contains("test"));
        assert!(err.validation().is_some());
    }
}
