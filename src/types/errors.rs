//! Type construction and validation errors
//!
//! - `TypeError`: a type tree that breaks a construction invariant. Raised
//!   while the schema is being built, never during validation.
//! - `ValidationError`: a value that does not conform to its node. Always
//!   recoverable; the caller rejects the write or call.

use std::fmt;

use thiserror::Error;

/// Invalid type tree
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("union must have at least one alternative")]
    EmptyUnion,

    #[error("duplicate object field '{0}'")]
    DuplicateField(String),

    #[error("record key type must be a string, an id or a string literal, found {0}")]
    InvalidRecordKey(String),
}

/// One step on the way from the root value to a mismatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object field
    Field(String),
    /// Array index
    Index(usize),
    /// Record key
    Key(String),
}

/// Location of a mismatch, root first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, segment: PathSegment) {
        self.0.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    /// Returns a copy of this path prefixed by `segment`.
    pub fn prefixed(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.push(segment);
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }
}

impl From<Vec<PathSegment>> for FieldPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "$root");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Field(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Field(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
                PathSegment::Key(key) => write!(f, "[{:?}]", key)?,
            }
        }
        Ok(())
    }
}

/// A value that does not conform to its declared node
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at {path}: expected {expected}, got {actual}")]
    Mismatch {
        path: FieldPath,
        expected: String,
        actual: String,
    },

    #[error("at {path}: value nesting exceeds depth limit of {limit}")]
    TooDeep { path: FieldPath, limit: usize },
}

impl ValidationError {
    pub(crate) fn mismatch(
        path: &FieldPath,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ValidationError::Mismatch {
            path: path.clone(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn path(&self) -> &FieldPath {
        match self {
            ValidationError::Mismatch { path, .. } | ValidationError::TooDeep { path, .. } => path,
        }
    }

    /// Expected kind, `None` for a tripped depth guard
    pub fn expected(&self) -> Option<&str> {
        match self {
            ValidationError::Mismatch { expected, .. } => Some(expected),
            ValidationError::TooDeep { .. } => None,
        }
    }

    /// Actual kind, `None` for a tripped depth guard
    pub fn actual(&self) -> Option<&str> {
        match self {
            ValidationError::Mismatch { actual, .. } => Some(actual),
            ValidationError::TooDeep { .. } => None,
        }
    }

    pub fn is_too_deep(&self) -> bool {
        matches!(self, ValidationError::TooDeep { .. })
    }

    /// Re-roots the error under `segment`, used when the validated value is
    /// itself nested in a larger structure.
    pub fn prefixed(self, segment: PathSegment) -> Self {
        match self {
            ValidationError::Mismatch {
                path,
                expected,
                actual,
            } => ValidationError::Mismatch {
                path: path.prefixed(segment),
                expected,
                actual,
            },
            ValidationError::TooDeep { path, limit } => ValidationError::TooDeep {
                path: path.prefixed(segment),
                limit,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = FieldPath::from(vec![
            PathSegment::Field("metadata".into()),
            PathSegment::Field("counts".into()),
            PathSegment::Key("red".into()),
            PathSegment::Index(2),
        ]);
        assert_eq!(path.to_string(), r#"metadata.counts["red"][2]"#);
    }

    #[test]
    fn test_root_path_display() {
        assert_eq!(FieldPath::root().to_string(), "$root");
    }

    #[test]
    fn test_mismatch_display() {
        let path = FieldPath::from(vec![PathSegment::Field("win_count".into())]);
        let err = ValidationError::mismatch(&path, "Int64", "Float64");
        assert_eq!(err.to_string(), "at win_count: expected Int64, got Float64");
        assert_eq!(err.expected(), Some("Int64"));
        assert_eq!(err.actual(), Some("Float64"));
    }

    #[test]
    fn test_prefixed() {
        let path = FieldPath::from(vec![PathSegment::Field("limit".into())]);
        let err = ValidationError::mismatch(&path, "Float64", "String")
            .prefixed(PathSegment::Field("pagination".into()));
        assert_eq!(err.path().to_string(), "pagination.limit");
    }
}
