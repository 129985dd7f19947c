//! Type nodes of the document-type language
//!
//! Supported constructors:
//! - null, int64, float64, boolean, string, bytes
//! - id(table): identifier scoped to a collection
//! - array(element), object(fields), record(key, value)
//! - union(alternatives), literal(scalar), optional(inner), any
//!
//! Trees are built once and never mutated. Composite constructors that can
//! break an invariant return `Result` so a bad tree never exists.

use indexmap::IndexMap;
use serde::Serialize;

use super::errors::TypeError;

/// Ordered field map of an `Object` node
pub type FieldMap = IndexMap<String, TypeNode>;

/// One node of the type language.
///
/// Equality is structural. `Object` equality ignores field order; the
/// description from [`describe`](super::describe) does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeNode {
    /// Only the null value
    Null,
    /// 64-bit signed integer
    Int64,
    /// IEEE-754 double
    Float64,
    /// Boolean
    Boolean,
    /// UTF-8 text
    String,
    /// Binary payload
    Bytes,
    /// Identifier of a document in `table`
    Id { table: String },
    /// Homogeneous sequence of any length
    Array { element: Box<TypeNode> },
    /// Fixed field set, field order kept for encoding
    Object { fields: FieldMap },
    /// Open key set, keys and values checked separately
    Record {
        key: Box<TypeNode>,
        value: Box<TypeNode>,
    },
    /// First matching alternative wins
    Union { alternatives: Vec<TypeNode> },
    /// Exactly one scalar value
    Literal { value: Literal },
    /// May be absent when used as an object field
    Optional { inner: Box<TypeNode> },
    /// Matches every value
    Any,
}

impl TypeNode {
    pub fn id(table: impl Into<String>) -> Self {
        TypeNode::Id {
            table: table.into(),
        }
    }

    pub fn array(element: TypeNode) -> Self {
        TypeNode::Array {
            element: Box::new(element),
        }
    }

    /// Builds an object node, rejecting duplicate field names.
    pub fn object<K, I>(fields: I) -> Result<Self, TypeError>
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TypeNode)>,
    {
        Ok(TypeNode::Object {
            fields: field_map(fields)?,
        })
    }

    /// Builds a record node. Keys must serialize to a unique string form,
    /// so only strings, ids and string literals are accepted.
    pub fn record(key: TypeNode, value: TypeNode) -> Result<Self, TypeError> {
        match &key {
            TypeNode::String
            | TypeNode::Id { .. }
            | TypeNode::Literal {
                value: Literal::String(_),
            } => {}
            other => return Err(TypeError::InvalidRecordKey(other.kind_name())),
        }
        Ok(TypeNode::Record {
            key: Box::new(key),
            value: Box::new(value),
        })
    }

    pub fn union(alternatives: Vec<TypeNode>) -> Result<Self, TypeError> {
        if alternatives.is_empty() {
            return Err(TypeError::EmptyUnion);
        }
        Ok(TypeNode::Union { alternatives })
    }

    pub fn literal(value: impl Into<Literal>) -> Self {
        TypeNode::Literal {
            value: value.into(),
        }
    }

    pub fn optional(inner: TypeNode) -> Self {
        TypeNode::Optional {
            inner: Box::new(inner),
        }
    }

    /// Closed enumeration of string literals, in declaration order.
    pub fn string_enum<I, S>(variants: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::union(
            variants
                .into_iter()
                .map(|s| TypeNode::literal(Literal::String(s.into())))
                .collect(),
        )
    }

    /// Returns the kind name used in error messages.
    pub fn kind_name(&self) -> String {
        match self {
            TypeNode::Null => "Null".into(),
            TypeNode::Int64 => "Int64".into(),
            TypeNode::Float64 => "Float64".into(),
            TypeNode::Boolean => "Boolean".into(),
            TypeNode::String => "String".into(),
            TypeNode::Bytes => "Bytes".into(),
            TypeNode::Id { table } => format!("Id({})", table),
            TypeNode::Array { .. } => "Array".into(),
            TypeNode::Object { .. } => "Object".into(),
            TypeNode::Record { .. } => "Record".into(),
            TypeNode::Union { .. } => "Union".into(),
            TypeNode::Literal { .. } => "Literal".into(),
            TypeNode::Optional { .. } => "Optional".into(),
            TypeNode::Any => "Any".into(),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeNode::Optional { .. })
    }

    /// Object fields, if this is an object node
    pub fn fields(&self) -> Option<&FieldMap> {
        match self {
            TypeNode::Object { fields } => Some(fields),
            _ => None,
        }
    }
}

/// Collects `(name, node)` pairs, keeping order and rejecting duplicates.
pub fn field_map<K, I>(fields: I) -> Result<FieldMap, TypeError>
where
    K: Into<String>,
    I: IntoIterator<Item = (K, TypeNode)>,
{
    let mut map = FieldMap::new();
    for (name, node) in fields {
        let name = name.into();
        if map.contains_key(&name) {
            return Err(TypeError::DuplicateField(name));
        }
        map.insert(name, node);
    }
    Ok(map)
}

/// Scalar carried by a `Literal` node.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Literal {
    String(String),
    Int64(i64),
    Float64(f64),
    Boolean(bool),
}

// Float literals compare bit-exactly so equality agrees with `describe`.
impl PartialEq for Literal {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Literal::String(a), Literal::String(b)) => a == b,
            (Literal::Int64(a), Literal::Int64(b)) => a == b,
            (Literal::Float64(a), Literal::Float64(b)) => a.to_bits() == b.to_bits(),
            (Literal::Boolean(a), Literal::Boolean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Literal {}

impl Literal {
    /// Kind name of the scalar, as reported for values
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::String(_) => "String",
            Literal::Int64(_) => "Int64",
            Literal::Float64(_) => "Float64",
            Literal::Boolean(_) => "Boolean",
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::String(s)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Int64(n)
    }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self {
        Literal::Float64(n)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_rejects_duplicate_fields() {
        let result = TypeNode::object([("a", TypeNode::String), ("a", TypeNode::Int64)]);
        assert_eq!(result.unwrap_err(), TypeError::DuplicateField("a".into()));
    }

    #[test]
    fn test_union_requires_alternatives() {
        assert_eq!(TypeNode::union(vec![]).unwrap_err(), TypeError::EmptyUnion);
    }

    #[test]
    fn test_record_rejects_structured_keys() {
        let object_key = TypeNode::object([("a", TypeNode::String)]).unwrap();
        let err = TypeNode::record(object_key, TypeNode::String).unwrap_err();
        assert_eq!(err, TypeError::InvalidRecordKey("Object".into()));

        let union_key = TypeNode::string_enum(["a", "b"]).unwrap();
        assert!(TypeNode::record(union_key, TypeNode::String).is_err());
        assert!(TypeNode::record(TypeNode::array(TypeNode::String), TypeNode::Any).is_err());
        assert!(TypeNode::record(TypeNode::Int64, TypeNode::Any).is_err());
        assert!(TypeNode::record(TypeNode::literal(1i64), TypeNode::Any).is_err());
    }

    #[test]
    fn test_record_accepts_scalar_keys() {
        assert!(TypeNode::record(TypeNode::String, TypeNode::Float64).is_ok());
        assert!(TypeNode::record(TypeNode::id("users"), TypeNode::Boolean).is_ok());
        assert!(TypeNode::record(TypeNode::literal("only"), TypeNode::Any).is_ok());
    }

    #[test]
    fn test_object_equality_ignores_field_order() {
        let a = TypeNode::object([("x", TypeNode::Int64), ("y", TypeNode::String)]).unwrap();
        let b = TypeNode::object([("y", TypeNode::String), ("x", TypeNode::Int64)]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_float_literal_equality_is_bitwise() {
        assert_eq!(Literal::Float64(f64::NAN), Literal::Float64(f64::NAN));
        assert_ne!(Literal::Float64(0.0), Literal::Float64(-0.0));
        assert_ne!(Literal::Float64(1.0), Literal::Int64(1));
    }

    #[test]
    fn test_serialized_shape() {
        let node = TypeNode::array(TypeNode::id("games"));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "array",
                "element": { "type": "id", "table": "games" }
            })
        );
    }
}
