//! Dynamic values checked against type descriptors
//!
//! A `Value` is the host representation of whatever crosses the storage or
//! dispatch boundary: documents, endpoint arguments and handler results.
//!
//! Absence is not a value. A field missing from an `Object` is absent, which
//! is what lets `Optional` fields be omitted entirely while `Null` stays a
//! distinct, present value.

mod json;

pub use json::{DecodeError, DEFAULT_DECODE_DEPTH};

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

/// Ordered field map used by `Value::Object`.
pub type ValueMap = IndexMap<String, Value>;

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The null marker
    Null,
    /// 64-bit signed integer
    Int64(i64),
    /// IEEE-754 double
    Float64(f64),
    /// Boolean
    Boolean(bool),
    /// UTF-8 text
    String(String),
    /// Arbitrary binary payload
    Bytes(Vec<u8>),
    /// Reference to a document in a named collection
    Id(DocumentId),
    /// Ordered sequence
    Array(Vec<Value>),
    /// Keyed structure, insertion ordered
    Object(ValueMap),
}

impl Value {
    /// Returns the kind name reported as `actual` in validation errors.
    pub fn kind_name(&self) -> String {
        match self {
            Value::Null => "Null".into(),
            Value::Int64(_) => "Int64".into(),
            Value::Float64(_) => "Float64".into(),
            Value::Boolean(_) => "Boolean".into(),
            Value::String(_) => "String".into(),
            Value::Bytes(_) => "Bytes".into(),
            Value::Id(id) => format!("Id({})", id.table()),
            Value::Array(_) => "Array".into(),
            Value::Object(_) => "Object".into(),
        }
    }

    /// Builds an object from `(name, value)` pairs, keeping their order.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn as_object(&self) -> Option<&ValueMap> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_id(&self) -> Option<&DocumentId> {
        match self {
            Value::Id(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int64(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float64(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<DocumentId> for Value {
    fn from(id: DocumentId) -> Self {
        Value::Id(id)
    }
}

/// Identifier of a document, scoped to its collection.
///
/// The text form is `table:id`. The `id` half is opaque; only the storage
/// engine assigns it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId {
    table: String,
    id: String,
}

impl DocumentId {
    pub fn new(table: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            id: id.into(),
        }
    }

    /// Collection this identifier belongs to
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Opaque per-collection identifier
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.table, self.id)
    }
}

/// Malformed `table:id` text
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed document id '{0}': expected 'table:id'")]
pub struct IdParseError(pub String);

impl FromStr for DocumentId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((table, id)) if !table.is_empty() && !id.is_empty() => {
                Ok(DocumentId::new(table, id))
            }
            _ => Err(IdParseError(s.to_string())),
        }
    }
}
