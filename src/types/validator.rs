//! Structural validation of values against type nodes
//!
//! Validation semantics:
//! - Scalar kinds match exactly; no coercion between Int64 and Float64
//! - Objects carry exactly the declared fields; only Optional fields may be absent
//! - Records accept any key set; every key and value is checked
//! - Unions try alternatives in declaration order, the first match wins
//! - Any always passes
//!
//! The first mismatch is reported with its full path. Validation is pure:
//! no shared state, no I/O, safe to call from any number of threads.

use serde_json::{Map, Value as JsonValue};

use crate::value::{DocumentId, Value};

use super::describe::{describe, describe_literal};
use super::errors::{FieldPath, PathSegment, ValidationError};
use super::node::{FieldMap, Literal, TypeNode};

/// Nesting bound used by [`validate`] and [`encode`]
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Validates `value` against `node` with the default depth bound.
pub fn validate(node: &TypeNode, value: &Value) -> Result<(), ValidationError> {
    Validator::default().validate(node, value)
}

/// Validates `value` and encodes it in the wire format.
pub fn encode(node: &TypeNode, value: &Value) -> Result<JsonValue, ValidationError> {
    Validator::default().encode(node, value)
}

/// Validator with a configurable recursion bound.
///
/// The type tree is acyclic by construction, but values come from outside.
/// Every descent into an element, field or record entry counts one level;
/// passing `max_depth` fails with `ValidationError::TooDeep`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Validator {
    max_depth: usize,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Validator {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Checks `value` against `node`.
    pub fn validate(&self, node: &TypeNode, value: &Value) -> Result<(), ValidationError> {
        let mut path = FieldPath::root();
        self.check(node, value, &mut path, 0)
    }

    /// Returns the index of the first alternative `value` matches.
    pub fn select_arm(
        &self,
        alternatives: &[TypeNode],
        value: &Value,
    ) -> Result<usize, ValidationError> {
        let mut path = FieldPath::root();
        self.match_arm(alternatives, value, &mut path, 0)
    }

    /// Validates `value`, then encodes it with object fields in declared
    /// order. Union values are encoded through their matched arm.
    pub fn encode(&self, node: &TypeNode, value: &Value) -> Result<JsonValue, ValidationError> {
        self.validate(node, value)?;
        let mut path = FieldPath::root();
        self.emit(node, value, &mut path, 0)
    }

    fn check(
        &self,
        node: &TypeNode,
        value: &Value,
        path: &mut FieldPath,
        depth: usize,
    ) -> Result<(), ValidationError> {
        if depth > self.max_depth {
            return Err(ValidationError::TooDeep {
                path: path.clone(),
                limit: self.max_depth,
            });
        }

        let matches = match (node, value) {
            (TypeNode::Any, _) => true,
            (TypeNode::Optional { inner }, _) => return self.check(inner, value, path, depth),
            (TypeNode::Null, Value::Null) => true,
            (TypeNode::Int64, Value::Int64(_)) => true,
            (TypeNode::Float64, Value::Float64(_)) => true,
            (TypeNode::Boolean, Value::Boolean(_)) => true,
            (TypeNode::String, Value::String(_)) => true,
            (TypeNode::Bytes, Value::Bytes(_)) => true,
            (TypeNode::Id { table }, Value::Id(id)) => id.table() == table,
            (TypeNode::Array { element }, Value::Array(items)) => {
                for (index, item) in items.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    self.check(element, item, path, depth + 1)?;
                    path.pop();
                }
                true
            }
            (TypeNode::Object { fields }, Value::Object(_)) => {
                return self.check_object(fields, value, path, depth);
            }
            (TypeNode::Record { key, value: entry }, Value::Object(map)) => {
                for (name, item) in map {
                    path.push(PathSegment::Key(name.clone()));
                    // `$` keys would read back as tagged values
                    if name.starts_with('$') {
                        return Err(ValidationError::mismatch(
                            path,
                            "key not starting with '$'",
                            format!("key {:?}", name),
                        ));
                    }
                    self.check(key, &record_key(key, name), path, depth + 1)?;
                    self.check(entry, item, path, depth + 1)?;
                    path.pop();
                }
                true
            }
            (TypeNode::Union { alternatives }, _) => {
                return self.match_arm(alternatives, value, path, depth).map(|_| ());
            }
            (TypeNode::Literal { value: literal }, _) => {
                if literal_matches(literal, value) {
                    true
                } else {
                    return Err(ValidationError::mismatch(
                        path,
                        describe(node),
                        literal_actual(value),
                    ));
                }
            }
            _ => false,
        };

        if matches {
            Ok(())
        } else {
            Err(ValidationError::mismatch(path, node.kind_name(), value.kind_name()))
        }
    }

    fn check_object(
        &self,
        fields: &FieldMap,
        value: &Value,
        path: &mut FieldPath,
        depth: usize,
    ) -> Result<(), ValidationError> {
        let Some(map) = value.as_object() else {
            return Err(ValidationError::mismatch(path, "Object", value.kind_name()));
        };

        // No undeclared fields
        for (name, item) in map {
            if !fields.contains_key(name) {
                path.push(PathSegment::Field(name.clone()));
                return Err(ValidationError::mismatch(path, "no such field", item.kind_name()));
            }
        }

        for (name, field) in fields {
            path.push(PathSegment::Field(name.clone()));
            match map.get(name) {
                Some(item) => self.check(field, item, path, depth + 1)?,
                None if field.is_optional() => {}
                None => {
                    return Err(ValidationError::mismatch(path, field.kind_name(), "missing"));
                }
            }
            path.pop();
        }

        Ok(())
    }

    fn match_arm(
        &self,
        alternatives: &[TypeNode],
        value: &Value,
        path: &mut FieldPath,
        depth: usize,
    ) -> Result<usize, ValidationError> {
        for (index, alternative) in alternatives.iter().enumerate() {
            let mut arm_path = path.clone();
            match self.check(alternative, value, &mut arm_path, depth) {
                Ok(()) => return Ok(index),
                Err(err) if err.is_too_deep() => return Err(err),
                Err(_) => continue,
            }
        }

        let expected = match alternatives {
            [] => "Union".to_string(),
            _ => describe(&TypeNode::Union {
                alternatives: alternatives.to_vec(),
            }),
        };
        Err(ValidationError::mismatch(path, expected, value.kind_name()))
    }

    fn emit(
        &self,
        node: &TypeNode,
        value: &Value,
        path: &mut FieldPath,
        depth: usize,
    ) -> Result<JsonValue, ValidationError> {
        let json = match (node, value) {
            (TypeNode::Optional { inner }, _) => return self.emit(inner, value, path, depth),
            (TypeNode::Union { alternatives }, _) => {
                let arm = self.match_arm(alternatives, value, path, depth)?;
                return self.emit(&alternatives[arm], value, path, depth);
            }
            (TypeNode::Array { element }, Value::Array(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    path.push(PathSegment::Index(index));
                    out.push(self.emit(element, item, path, depth + 1)?);
                    path.pop();
                }
                JsonValue::Array(out)
            }
            (TypeNode::Object { fields }, Value::Object(map)) => {
                let mut out = Map::new();
                for (name, field) in fields {
                    if let Some(item) = map.get(name) {
                        path.push(PathSegment::Field(name.clone()));
                        out.insert(name.clone(), self.emit(field, item, path, depth + 1)?);
                        path.pop();
                    }
                }
                JsonValue::Object(out)
            }
            (TypeNode::Record { value: entry, .. }, Value::Object(map)) => {
                let mut out = Map::new();
                for (name, item) in map {
                    path.push(PathSegment::Key(name.clone()));
                    out.insert(name.clone(), self.emit(entry, item, path, depth + 1)?);
                    path.pop();
                }
                JsonValue::Object(out)
            }
            _ => value.to_json(),
        };

        Ok(json)
    }
}

/// Record keys are strings on the wire; id-typed keys use the `table:id` form.
fn record_key(key: &TypeNode, name: &str) -> Value {
    match key {
        TypeNode::Id { .. } => match name.parse::<DocumentId>() {
            Ok(id) => Value::Id(id),
            Err(_) => Value::String(name.to_string()),
        },
        _ => Value::String(name.to_string()),
    }
}

fn literal_matches(literal: &Literal, value: &Value) -> bool {
    match (literal, value) {
        (Literal::String(a), Value::String(b)) => a == b,
        (Literal::Int64(a), Value::Int64(b)) => a == b,
        (Literal::Float64(a), Value::Float64(b)) => a.to_bits() == b.to_bits(),
        (Literal::Boolean(a), Value::Boolean(b)) => a == b,
        _ => false,
    }
}

/// Scalars are shown by content so a wrong enum member is visible.
fn literal_actual(value: &Value) -> String {
    let literal = match value {
        Value::String(s) => Literal::String(s.clone()),
        Value::Int64(n) => Literal::Int64(*n),
        Value::Float64(f) => Literal::Float64(*f),
        Value::Boolean(b) => Literal::Boolean(*b),
        other => return other.kind_name(),
    };
    describe_literal(&literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DocumentId;

    fn games_shape() -> TypeNode {
        TypeNode::object([
            ("win_count", TypeNode::Int64),
            ("loss_count", TypeNode::Int64),
        ])
        .unwrap()
    }

    #[test]
    fn test_scalars_match_exact_kind() {
        assert!(validate(&TypeNode::Int64, &Value::Int64(3)).is_ok());
        assert!(validate(&TypeNode::Float64, &Value::Float64(3.0)).is_ok());
        assert!(validate(&TypeNode::Int64, &Value::Float64(3.0)).is_err());
        assert!(validate(&TypeNode::Float64, &Value::Int64(3)).is_err());
        assert!(validate(&TypeNode::Null, &Value::Null).is_ok());
        assert!(validate(&TypeNode::String, &Value::Null).is_err());
        assert!(validate(&TypeNode::Bytes, &Value::Bytes(vec![1])).is_ok());
    }

    #[test]
    fn test_id_must_match_table() {
        let node = TypeNode::id("games");
        assert!(validate(&node, &Value::Id(DocumentId::new("games", "a"))).is_ok());

        let err = validate(&node, &Value::Id(DocumentId::new("users", "a"))).unwrap_err();
        assert_eq!(err.expected(), Some("Id(games)"));
        assert_eq!(err.actual(), Some("Id(users)"));
    }

    #[test]
    fn test_array_elements_report_index() {
        let node = TypeNode::array(TypeNode::String);
        assert!(validate(&node, &Value::Array(vec![])).is_ok());

        let value = Value::Array(vec!["a".into(), Value::Int64(1)]);
        let err = validate(&node, &value).unwrap_err();
        assert_eq!(err.path().to_string(), "[1]");
    }

    #[test]
    fn test_object_missing_field() {
        let value = Value::object([("win_count", Value::Int64(3))]);
        let err = validate(&games_shape(), &value).unwrap_err();
        assert_eq!(err.path().to_string(), "loss_count");
        assert_eq!(err.expected(), Some("Int64"));
        assert_eq!(err.actual(), Some("missing"));
    }

    #[test]
    fn test_object_extra_field() {
        let value = Value::object([
            ("win_count", Value::Int64(3)),
            ("loss_count", Value::Int64(0)),
            ("draws", Value::Int64(1)),
        ]);
        let err = validate(&games_shape(), &value).unwrap_err();
        assert_eq!(err.path().to_string(), "draws");
        assert_eq!(err.expected(), Some("no such field"));
    }

    #[test]
    fn test_optional_field_may_be_absent_but_not_null() {
        let node = TypeNode::object([
            ("name", TypeNode::String),
            ("nickname", TypeNode::optional(TypeNode::String)),
        ])
        .unwrap();

        assert!(validate(&node, &Value::object([("name", "a".into())])).is_ok());

        let with_null = Value::object([("name", "a".into()), ("nickname", Value::Null)]);
        let err = validate(&node, &with_null).unwrap_err();
        assert_eq!(err.path().to_string(), "nickname");
        assert_eq!(err.actual(), Some("Null"));
    }

    #[test]
    fn test_record_checks_keys_and_values() {
        let node = TypeNode::record(TypeNode::String, TypeNode::Float64).unwrap();
        let good = Value::object([("a", Value::Float64(1.0)), ("b", Value::Float64(2.0))]);
        assert!(validate(&node, &good).is_ok());

        let bad = Value::object([("a", Value::Float64(1.0)), ("b", Value::Int64(2))]);
        let err = validate(&node, &bad).unwrap_err();
        assert_eq!(err.path().to_string(), r#"["b"]"#);
    }

    #[test]
    fn test_record_rejects_reserved_keys() {
        let node = TypeNode::record(TypeNode::String, TypeNode::String).unwrap();
        let tagged = Value::object([("$id", Value::String("games:x".into()))]);
        let err = validate(&node, &tagged).unwrap_err();
        assert_eq!(err.path().to_string(), r#"["$id"]"#);
        assert_eq!(err.actual(), Some(r#"key "$id""#));
        assert!(encode(&node, &tagged).is_err());

        // A `$` later in the key is fine
        let inner = Value::object([("a$id", Value::String("x".into()))]);
        assert!(validate(&node, &inner).is_ok());
    }

    #[test]
    fn test_record_with_id_keys() {
        let node = TypeNode::record(TypeNode::id("users"), TypeNode::Boolean).unwrap();
        let good = Value::object([("users:1", Value::Boolean(true))]);
        assert!(validate(&node, &good).is_ok());

        let bad = Value::object([("teams:1", Value::Boolean(true))]);
        let err = validate(&node, &bad).unwrap_err();
        assert_eq!(err.actual(), Some("Id(teams)"));

        let not_an_id = Value::object([("plain", Value::Boolean(true))]);
        assert_eq!(validate(&node, &not_an_id).unwrap_err().actual(), Some("String"));
    }

    #[test]
    fn test_union_first_match_wins() {
        let alternatives = vec![TypeNode::literal("a"), TypeNode::String];
        let validator = Validator::default();
        assert_eq!(validator.select_arm(&alternatives, &"a".into()).unwrap(), 0);
        assert_eq!(validator.select_arm(&alternatives, &"b".into()).unwrap(), 1);
        assert!(validator.select_arm(&alternatives, &Value::Int64(1)).is_err());
    }

    #[test]
    fn test_union_failure_describes_alternatives() {
        let node = TypeNode::string_enum(["asc", "desc"]).unwrap();
        let err = validate(&node, &"up".into()).unwrap_err();
        assert_eq!(
            err.expected(),
            Some(r#"v.union(v.literal("asc"), v.literal("desc"))"#)
        );
        assert_eq!(err.actual(), Some("String"));
    }

    #[test]
    fn test_literal_mismatch_shows_content() {
        let err = validate(&TypeNode::literal("asc"), &"up".into()).unwrap_err();
        assert_eq!(err.expected(), Some(r#"v.literal("asc")"#));
        assert_eq!(err.actual(), Some(r#""up""#));
    }

    #[test]
    fn test_depth_guard() {
        let mut node = TypeNode::Int64;
        let mut value = Value::Int64(1);
        for _ in 0..6 {
            node = TypeNode::array(node);
            value = Value::Array(vec![value]);
        }

        assert!(Validator::new(6).validate(&node, &value).is_ok());
        let err = Validator::new(4).validate(&node, &value).unwrap_err();
        assert!(err.is_too_deep());
        assert_eq!(err.path().to_string(), "[0][0][0][0][0]");
    }

    #[test]
    fn test_depth_guard_is_not_swallowed_by_union() {
        let mut inner = TypeNode::Int64;
        let mut value = Value::Int64(1);
        for _ in 0..3 {
            inner = TypeNode::array(inner);
            value = Value::Array(vec![value]);
        }
        let node = TypeNode::union(vec![inner, TypeNode::Any]).unwrap();
        let err = Validator::new(1).validate(&node, &value).unwrap_err();
        assert!(err.is_too_deep());
    }

    #[test]
    fn test_encode_uses_declared_field_order() {
        let value = Value::object([("loss_count", Value::Int64(0)), ("win_count", Value::Int64(3))]);
        let json = encode(&games_shape(), &value).unwrap();
        assert_eq!(json.to_string(), r#"{"win_count":3,"loss_count":0}"#);
    }

    #[test]
    fn test_encode_rejects_invalid_value() {
        let value = Value::object([("win_count", Value::Int64(3))]);
        assert!(encode(&games_shape(), &value).is_err());
    }
}
