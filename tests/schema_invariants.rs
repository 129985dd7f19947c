//! Schema Invariant Tests
//!
//! Tests for the registry lifecycle:
//! - Registration only while building, validation only once frozen
//! - Collection names are unique
//! - `_id` is implicit on every stored document
//! - The frozen registry is shared read-only across threads

use std::sync::Arc;
use std::thread;

use docshape::schema::{
    DocumentShape, IndexDef, RegistryState, SchemaErrorCode, SchemaRegistry, ID_FIELD,
};
use docshape::types::{describe, TypeNode};
use docshape::value::{DocumentId, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn users() -> DocumentShape {
    DocumentShape::new([
        ("name", TypeNode::String),
        ("age", TypeNode::optional(TypeNode::Int64)),
    ])
    .unwrap()
}

fn user(id: &str, name: &str) -> Value {
    Value::object([
        (ID_FIELD, Value::Id(DocumentId::new("users", id))),
        ("name", Value::from(name)),
    ])
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

/// A new registry is building and refuses validation.
#[test]
fn test_building_refuses_validation() {
    let mut registry = SchemaRegistry::new();
    registry.register("users", users()).unwrap();
    assert_eq!(registry.state(), RegistryState::Building);

    let err = registry.validate_document("users", &user("u1", "Alice")).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::NotFrozen);
    assert!(err.is_fatal());
}

/// Registering after freeze is a wiring defect.
#[test]
fn test_frozen_refuses_registration() {
    let mut registry = SchemaRegistry::new();
    registry.register("users", users()).unwrap();
    registry.freeze().unwrap();

    let err = registry.register("posts", users()).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::SchemaFrozen);
    assert!(err.is_fatal());
    assert!(registry.lookup("posts").is_none());
}

/// A duplicate name leaves the first registration in place.
#[test]
fn test_duplicate_collection_keeps_first() {
    let mut registry = SchemaRegistry::new();
    registry.register("users", users()).unwrap();

    let other = DocumentShape::new([("title", TypeNode::String)]).unwrap();
    let err = registry.register("users", other).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::DuplicateCollection);
    assert_eq!(err.collection(), Some("users"));
    assert_eq!(registry.lookup("users"), Some(&users()));
}

/// Registration order is preserved.
#[test]
fn test_collections_in_registration_order() {
    let mut registry = SchemaRegistry::new();
    for name in ["zebras", "apples", "mangos"] {
        registry.register(name, users()).unwrap();
    }
    let names: Vec<_> = registry.collections().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["zebras", "apples", "mangos"]);
}

// =============================================================================
// System Field Tests
// =============================================================================

/// The document node always leads with `_id`.
#[test]
fn test_document_node_has_implicit_id() {
    let mut registry = SchemaRegistry::new();
    registry.register("users", users()).unwrap();
    assert!(registry.document_node("posts").is_none());
    let node = registry.document_node("users").unwrap();
    assert_eq!(
        describe(node),
        r#"v.object({_id: v.id("users"), name: v.string(), age: v.optional(v.int64())})"#
    );
}

/// Stored documents need `_id`; inserts must not carry one.
#[test]
fn test_id_required_on_documents_only() {
    let mut registry = SchemaRegistry::new();
    registry.register("users", users()).unwrap();
    registry.freeze().unwrap();

    let stored = user("u1", "Alice");
    let fresh = Value::object([("name", Value::from("Alice"))]);

    assert!(registry.validate_document("users", &stored).is_ok());
    assert!(registry.validate_document("users", &fresh).is_err());
    assert!(registry.validate_insert("users", &fresh).is_ok());
    assert!(registry.validate_insert("users", &stored).is_err());
}

/// Indexes may cover `_id` and nested paths of declared fields.
#[test]
fn test_index_paths() {
    let shape = DocumentShape::new([(
        "profile",
        TypeNode::object([("city", TypeNode::String)]).unwrap(),
    )])
    .unwrap()
    .with_index(IndexDef::new("by_city", ["profile.city", "_id"]));

    let mut registry = SchemaRegistry::new();
    assert!(registry.register("people", shape).is_ok());
}

// =============================================================================
// Rejection Tests
// =============================================================================

/// Unknown collections are rejects, not fatal.
#[test]
fn test_unknown_collection_is_reject() {
    let registry = SchemaRegistry::new().into_shared().unwrap();
    let err = registry.validate_insert("ghosts", &Value::Object(Default::default())).unwrap_err();
    assert_eq!(err.code(), SchemaErrorCode::UnknownCollection);
    assert!(!err.is_fatal());
}

/// Invalid documents fail the same way every time.
#[test]
fn test_invalid_document_fails_consistently() {
    let mut registry = SchemaRegistry::new();
    registry.register("users", users()).unwrap();
    registry.freeze().unwrap();

    let doc = Value::object([(ID_FIELD, Value::Id(DocumentId::new("users", "u1")))]);
    let first = registry.validate_document("users", &doc).unwrap_err();
    for _ in 0..100 {
        let err = registry.validate_document("users", &doc).unwrap_err();
        assert_eq!(err.details(), first.details());
    }
}

// =============================================================================
// Sharing Tests
// =============================================================================

/// Frozen registry validates from many threads at once.
#[test]
fn test_shared_registry_across_threads() {
    let mut registry = SchemaRegistry::new();
    registry.register("users", users()).unwrap();
    let registry = registry.into_shared().unwrap();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let doc = user(&format!("u{}", i), "Alice");
                (0..100).all(|_| registry.validate_document("users", &doc).is_ok())
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap());
    }
}
