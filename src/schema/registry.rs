//! Schema registry
//!
//! Collects the document shapes of a deployment. Two lifecycle states:
//! - Building: accepts `register`
//! - Frozen: accepts `validate_document` / `validate_insert`
//!
//! `freeze` happens exactly once, at startup, before any validation. The
//! frozen registry is immutable and is shared across request handlers as
//! `Arc<SchemaRegistry>`; it is never rebuilt per request.

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use regex::Regex;

use crate::observability::{log_event_with_fields, Event};
use crate::types::{TypeNode, ValidationError, Validator};
use crate::value::Value;

use super::errors::{SchemaError, SchemaResult};
use super::shape::DocumentShape;

/// Registry lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    Building,
    Frozen,
}

/// A registered shape with its precomputed validation nodes
#[derive(Debug, Clone)]
struct Collection {
    shape: DocumentShape,
    /// `_id` plus user fields
    document: TypeNode,
    /// User fields only
    insert: TypeNode,
}

/// Registry of named document shapes.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    state: RegistryState,
    collections: IndexMap<String, Collection>,
    validator: Validator,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaRegistry {
    /// Creates an empty registry in the Building state.
    pub fn new() -> Self {
        Self::with_validator(Validator::default())
    }

    /// Creates an empty registry that validates with `validator`.
    pub fn with_validator(validator: Validator) -> Self {
        Self {
            state: RegistryState::Building,
            collections: IndexMap::new(),
            validator,
        }
    }

    /// Registers a shape under `name`.
    ///
    /// # Errors
    ///
    /// - `SHAPE_SCHEMA_FROZEN` once the registry is frozen
    /// - `SHAPE_DUPLICATE_COLLECTION` if `name` is taken
    /// - `SHAPE_INVALID_SHAPE` for a bad collection name, a mistyped `_id`
    ///   declaration or a bad index
    pub fn register(&mut self, name: impl Into<String>, shape: DocumentShape) -> SchemaResult<()> {
        let name = name.into();

        if self.state == RegistryState::Frozen {
            return Err(SchemaError::schema_frozen());
        }
        if self.collections.contains_key(&name) {
            return Err(SchemaError::duplicate_collection(name));
        }
        if !collection_name_pattern().is_match(&name) {
            return Err(SchemaError::invalid_shape(
                &name,
                "collection names start with a letter and contain only letters, digits and '_'",
            ));
        }
        shape
            .check(&name)
            .map_err(|reason| SchemaError::invalid_shape(&name, reason))?;

        let field_count = shape.user_fields().count().to_string();
        let collection = Collection {
            document: shape.document_node(&name),
            insert: shape.insert_node(),
            shape,
        };
        self.collections.insert(name.clone(), collection);

        log_event_with_fields(
            Event::CollectionRegistered,
            &[("collection", name.as_str()), ("fields", field_count.as_str())],
        );
        Ok(())
    }

    /// Moves the registry to the Frozen state.
    pub fn freeze(&mut self) -> SchemaResult<()> {
        if self.state == RegistryState::Frozen {
            return Err(SchemaError::schema_frozen());
        }
        self.state = RegistryState::Frozen;

        let count = self.collections.len().to_string();
        log_event_with_fields(Event::RegistryFrozen, &[("collections", count.as_str())]);
        Ok(())
    }

    /// Freezes the registry and wraps it for sharing.
    pub fn into_shared(mut self) -> SchemaResult<Arc<SchemaRegistry>> {
        if self.state == RegistryState::Building {
            self.freeze()?;
        }
        Ok(Arc::new(self))
    }

    pub fn state(&self) -> RegistryState {
        self.state
    }

    pub fn is_frozen(&self) -> bool {
        self.state == RegistryState::Frozen
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Returns the shape registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<&DocumentShape> {
        self.collections.get(name).map(|c| &c.shape)
    }

    /// Returns the full document node (`_id` included) for `name`.
    pub fn document_node(&self, name: &str) -> Option<&TypeNode> {
        self.collections.get(name).map(|c| &c.document)
    }

    /// Registered collections in registration order
    pub fn collections(&self) -> impl Iterator<Item = (&str, &DocumentShape)> {
        self.collections
            .iter()
            .map(|(name, c)| (name.as_str(), &c.shape))
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    /// Validates a stored document, `_id` included.
    ///
    /// # Errors
    ///
    /// - `SHAPE_NOT_FROZEN` before `freeze`
    /// - `SHAPE_UNKNOWN_COLLECTION` if `name` is not registered
    /// - `SHAPE_VALIDATION_FAILED` with the mismatch as details
    pub fn validate_document(&self, name: &str, value: &Value) -> SchemaResult<()> {
        let collection = self.frozen_collection(name)?;
        self.check(name, &collection.document, value)
    }

    /// Validates a document about to be inserted, before it has an `_id`.
    pub fn validate_insert(&self, name: &str, value: &Value) -> SchemaResult<()> {
        let collection = self.frozen_collection(name)?;
        self.check(name, &collection.insert, value)
    }

    fn frozen_collection(&self, name: &str) -> SchemaResult<&Collection> {
        if self.state != RegistryState::Frozen {
            return Err(SchemaError::not_frozen());
        }
        self.collections
            .get(name)
            .ok_or_else(|| SchemaError::unknown_collection(name))
    }

    fn check(&self, name: &str, node: &TypeNode, value: &Value) -> SchemaResult<()> {
        self.validator
            .validate(node, value)
            .map_err(|details: ValidationError| SchemaError::validation_failed(name, details))
    }
}

fn collection_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("static pattern"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{IndexDef, SchemaErrorCode};
    use crate::value::DocumentId;

    fn games() -> DocumentShape {
        DocumentShape::new([("win_count", TypeNode::Int64), ("loss_count", TypeNode::Int64)])
            .unwrap()
    }

    fn frozen_registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        registry.register("games", games()).unwrap();
        registry.freeze().unwrap();
        registry
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = frozen_registry();
        assert_eq!(registry.lookup("games"), Some(&games()));
        assert!(registry.lookup("players").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_collection() {
        let mut registry = SchemaRegistry::new();
        registry.register("games", games()).unwrap();
        let err = registry.register("games", games()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::DuplicateCollection);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_register_after_freeze() {
        let mut registry = frozen_registry();
        let err = registry.register("players", games()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::SchemaFrozen);
    }

    #[test]
    fn test_freeze_twice() {
        let mut registry = frozen_registry();
        assert_eq!(registry.freeze().unwrap_err().code(), SchemaErrorCode::SchemaFrozen);
    }

    #[test]
    fn test_validation_requires_freeze() {
        let mut registry = SchemaRegistry::new();
        registry.register("games", games()).unwrap();
        let doc = Value::object([("win_count", Value::Int64(1))]);
        let err = registry.validate_document("games", &doc).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::NotFrozen);
    }

    #[test]
    fn test_invalid_collection_name() {
        let mut registry = SchemaRegistry::new();
        let err = registry.register("_system", games()).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::InvalidShape);
    }

    #[test]
    fn test_invalid_index_rejected_at_register() {
        let mut registry = SchemaRegistry::new();
        let shape = games().with_index(IndexDef::new("by_x", ["x"]));
        let err = registry.register("games", shape).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::InvalidShape);
    }

    #[test]
    fn test_validate_document_and_insert() {
        let registry = frozen_registry();
        let stored = Value::object([
            ("_id", Value::Id(DocumentId::new("games", "abc"))),
            ("win_count", Value::Int64(3)),
            ("loss_count", Value::Int64(0)),
        ]);
        assert!(registry.validate_document("games", &stored).is_ok());

        let fresh = Value::object([("win_count", Value::Int64(0)), ("loss_count", Value::Int64(1))]);
        assert!(registry.validate_insert("games", &fresh).is_ok());
        assert!(registry.validate_document("games", &fresh).is_err());
        assert!(registry.validate_insert("games", &stored).is_err());
    }

    #[test]
    fn test_unknown_collection_rejected() {
        let registry = frozen_registry();
        let err = registry.validate_document("players", &Value::Null).unwrap_err();
        assert_eq!(err.code(), SchemaErrorCode::UnknownCollection);
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_into_shared_freezes() {
        let mut registry = SchemaRegistry::new();
        registry.register("games", games()).unwrap();
        let shared = registry.into_shared().unwrap();
        assert!(shared.is_frozen());
    }

    #[test]
    fn test_registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaRegistry>();
    }
}
