//! Schema registry error types
//!
//! Error codes:
//! - SHAPE_DUPLICATE_COLLECTION (FATAL)
//! - SHAPE_SCHEMA_FROZEN (FATAL)
//! - SHAPE_NOT_FROZEN (FATAL)
//! - SHAPE_INVALID_SHAPE (FATAL)
//! - SHAPE_UNKNOWN_COLLECTION (REJECT)
//! - SHAPE_VALIDATION_FAILED (REJECT)
//!
//! Fatal errors are registry misconfiguration or wiring defects and may only
//! halt the process during startup. Reject errors refuse a single write or
//! call and are always recoverable.

use std::fmt;

use crate::types::ValidationError;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Write or call rejected
    Reject,
    /// Startup must not proceed
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Collection registered twice
    DuplicateCollection,
    /// `register` after `freeze`, or a second `freeze`
    SchemaFrozen,
    /// Validation requested before `freeze`
    NotFrozen,
    /// Shape breaks a registry rule
    InvalidShape,
    /// Collection name not registered
    UnknownCollection,
    /// Document violates its shape
    ValidationFailed,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::DuplicateCollection => "SHAPE_DUPLICATE_COLLECTION",
            SchemaErrorCode::SchemaFrozen => "SHAPE_SCHEMA_FROZEN",
            SchemaErrorCode::NotFrozen => "SHAPE_NOT_FROZEN",
            SchemaErrorCode::InvalidShape => "SHAPE_INVALID_SHAPE",
            SchemaErrorCode::UnknownCollection => "SHAPE_UNKNOWN_COLLECTION",
            SchemaErrorCode::ValidationFailed => "SHAPE_VALIDATION_FAILED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::UnknownCollection | SchemaErrorCode::ValidationFailed => {
                Severity::Reject
            }
            _ => Severity::Fatal,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    code: SchemaErrorCode,
    message: String,
    collection: Option<String>,
    details: Option<ValidationError>,
}

impl SchemaError {
    /// Create a duplicate collection error
    pub fn duplicate_collection(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: SchemaErrorCode::DuplicateCollection,
            message: format!("Collection '{}' is already registered", name),
            collection: Some(name),
            details: None,
        }
    }

    /// Create a frozen registry error
    pub fn schema_frozen() -> Self {
        Self {
            code: SchemaErrorCode::SchemaFrozen,
            message: "Schema registry is frozen".into(),
            collection: None,
            details: None,
        }
    }

    /// Create a not-yet-frozen error
    pub fn not_frozen() -> Self {
        Self {
            code: SchemaErrorCode::NotFrozen,
            message: "Schema registry must be frozen before validation".into(),
            collection: None,
            details: None,
        }
    }

    /// Create an invalid shape error
    pub fn invalid_shape(name: impl Into<String>, reason: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: SchemaErrorCode::InvalidShape,
            message: format!("Invalid shape for collection '{}': {}", name, reason.into()),
            collection: Some(name),
            details: None,
        }
    }

    /// Create an unknown collection error
    pub fn unknown_collection(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            code: SchemaErrorCode::UnknownCollection,
            message: format!("Collection '{}' not found", name),
            collection: Some(name),
            details: None,
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(name: impl Into<String>, details: ValidationError) -> Self {
        let name = name.into();
        Self {
            code: SchemaErrorCode::ValidationFailed,
            message: format!("Document validation failed: {}", details),
            collection: Some(name),
            details: Some(details),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the collection name if applicable
    pub fn collection(&self) -> Option<&str> {
        self.collection.as_deref()
    }

    /// Returns validation details if applicable
    pub fn details(&self) -> Option<&ValidationError> {
        self.details.as_ref()
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.details
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FieldPath, PathSegment};

    #[test]
    fn test_error_codes() {
        assert_eq!(SchemaErrorCode::DuplicateCollection.code(), "SHAPE_DUPLICATE_COLLECTION");
        assert_eq!(SchemaErrorCode::SchemaFrozen.code(), "SHAPE_SCHEMA_FROZEN");
        assert_eq!(SchemaErrorCode::ValidationFailed.code(), "SHAPE_VALIDATION_FAILED");
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(SchemaErrorCode::DuplicateCollection.severity(), Severity::Fatal);
        assert_eq!(SchemaErrorCode::SchemaFrozen.severity(), Severity::Fatal);
        assert_eq!(SchemaErrorCode::UnknownCollection.severity(), Severity::Reject);
        assert_eq!(SchemaErrorCode::ValidationFailed.severity(), Severity::Reject);
    }

    #[test]
    fn test_validation_failed_display() {
        let path = FieldPath::from(vec![PathSegment::Field("loss_count".into())]);
        let details = ValidationError::Mismatch {
            path,
            expected: "Int64".into(),
            actual: "missing".into(),
        };
        let err = SchemaError::validation_failed("games", details);
        let display = err.to_string();
        assert!(display.starts_with("[REJECT] SHAPE_VALIDATION_FAILED"));
        assert!(display.contains("loss_count"));
        assert_eq!(err.collection(), Some("games"));
        assert!(!err.is_fatal());
    }
}
