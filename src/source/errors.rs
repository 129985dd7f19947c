//! Source parsing errors
//!
//! Every syntax error carries the 1-based line and column of the offending
//! source position.

use std::path::PathBuf;

use thiserror::Error;

use crate::functions::FunctionError;
use crate::schema::SchemaError;
use crate::types::TypeError;

/// Result type for source parsing
pub type SourceResult<T> = Result<T, SourceError>;

/// A declarative source that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("source is empty")]
    EmptySource,

    #[error("no defineSchema(...) call found")]
    MissingSchema,

    #[error("{line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{line}:{column}: expected {expected}, found {found}")]
    Unexpected {
        line: usize,
        column: usize,
        expected: String,
        found: String,
    },

    #[error("{line}:{column}: unknown validator 'v.{name}' (valid: {valid})")]
    UnknownValidator {
        line: usize,
        column: usize,
        name: String,
        valid: String,
    },

    #[error("{line}:{column}: args of '{function}' must be an object of validators")]
    InvalidArgs {
        line: usize,
        column: usize,
        function: String,
    },

    #[error("{line}:{column}: invalid type at {path}: {source}")]
    Type {
        line: usize,
        column: usize,
        path: String,
        source: TypeError,
    },
}

impl SourceError {
    /// Position of the error, when it has one
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            SourceError::EmptySource | SourceError::MissingSchema => None,
            SourceError::Syntax { line, column, .. }
            | SourceError::Unexpected { line, column, .. }
            | SourceError::UnknownValidator { line, column, .. }
            | SourceError::InvalidArgs { line, column, .. }
            | SourceError::Type { line, column, .. } => Some((*line, *column)),
        }
    }
}

/// Failure while loading source files into the registries
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}:{source}", path.display())]
    Source { path: PathBuf, source: SourceError },

    #[error("{}: {source}", path.display())]
    Schema { path: PathBuf, source: SchemaError },

    #[error("{}: {source}", path.display())]
    Function {
        path: PathBuf,
        source: FunctionError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position() {
        let err = SourceError::Syntax {
            line: 3,
            column: 7,
            message: "unterminated string".into(),
        };
        assert_eq!(err.position(), Some((3, 7)));
        assert_eq!(err.to_string(), "3:7: unterminated string");
        assert_eq!(SourceError::MissingSchema.position(), None);
    }

    #[test]
    fn test_load_error_display_includes_path() {
        let err = LoadError::Source {
            path: PathBuf::from("convex/schema.ts"),
            source: SourceError::Syntax {
                line: 1,
                column: 2,
                message: "unexpected character '#'".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "convex/schema.ts:1:2: unexpected character '#'"
        );
    }
}
