//! Document storage boundary
//!
//! `DocumentStore` is the narrow interface the rest of a deployment writes
//! through. Every write is checked against the frozen schema registry
//! before it is committed; a rejected write leaves the store unchanged.
//!
//! `MemoryStore` is the in-process implementation, used by tests and by
//! small tools.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use thiserror::Error;
use uuid::Uuid;

use crate::observability::{log_event_with_fields, Event};
use crate::schema::{SchemaError, SchemaRegistry, ID_FIELD};
use crate::value::{DocumentId, Value, ValueMap};

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Document not found: {0}")]
    NotFound(DocumentId),

    #[error("Invalid patch: {0}")]
    InvalidPatch(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Storage for schema-checked documents
pub trait DocumentStore {
    /// Inserts a new document and returns its assigned id.
    fn insert(&self, collection: &str, document: Value) -> StoreResult<DocumentId>;

    /// Shallow-merges `changes` into an existing document.
    fn patch(&self, id: &DocumentId, changes: Value) -> StoreResult<()>;

    /// Returns the stored document, `_id` included.
    fn get(&self, id: &DocumentId) -> StoreResult<Option<Value>>;

    /// Returns the oldest document in `collection`.
    fn first(&self, collection: &str) -> StoreResult<Option<Value>>;
}

type Table = IndexMap<String, ValueMap>;

/// In-memory `DocumentStore`
#[derive(Debug)]
pub struct MemoryStore {
    registry: Arc<SchemaRegistry>,
    tables: RwLock<IndexMap<String, Table>>,
}

impl MemoryStore {
    /// Creates an empty store over a frozen registry.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self {
            registry,
            tables: RwLock::new(IndexMap::new()),
        }
    }

    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Number of documents in `collection`
    pub fn count(&self, collection: &str) -> StoreResult<usize> {
        let tables = self.read()?;
        Ok(tables.get(collection).map_or(0, |t| t.len()))
    }

    fn read(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, IndexMap<String, Table>>> {
        self.tables
            .read()
            .map_err(|_| StoreError::Internal("Lock poisoned".into()))
    }

    fn write(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, IndexMap<String, Table>>> {
        self.tables
            .write()
            .map_err(|_| StoreError::Internal("Lock poisoned".into()))
    }

    fn known(&self, collection: &str) -> StoreResult<()> {
        match self.registry.lookup(collection) {
            Some(_) => Ok(()),
            None => Err(SchemaError::unknown_collection(collection).into()),
        }
    }

    fn rejected(collection: &str, err: SchemaError) -> StoreError {
        let path = err
            .details()
            .map(|d| d.path().to_string())
            .unwrap_or_default();
        log_event_with_fields(
            Event::ValidationRejected,
            &[
                ("code", err.code().code()),
                ("collection", collection),
                ("path", path.as_str()),
            ],
        );
        StoreError::Schema(err)
    }
}

impl DocumentStore for MemoryStore {
    fn insert(&self, collection: &str, document: Value) -> StoreResult<DocumentId> {
        self.registry
            .validate_insert(collection, &document)
            .map_err(|e| Self::rejected(collection, e))?;

        let fields = match document {
            Value::Object(fields) => fields,
            // validate_insert only accepts objects
            other => {
                return Err(StoreError::Internal(format!(
                    "validated document is a {}",
                    other.kind_name()
                )))
            }
        };

        let id = DocumentId::new(collection, Uuid::new_v4().to_string());
        let mut stored = ValueMap::with_capacity(fields.len() + 1);
        stored.insert(ID_FIELD.to_string(), Value::Id(id.clone()));
        stored.extend(fields);

        self.write()?
            .entry(collection.to_string())
            .or_default()
            .insert(id.id().to_string(), stored);

        log_event_with_fields(
            Event::DocumentCommitted,
            &[("collection", collection), ("id", id.id())],
        );
        Ok(id)
    }

    fn patch(&self, id: &DocumentId, changes: Value) -> StoreResult<()> {
        let changes = match changes {
            Value::Object(changes) => changes,
            other => {
                return Err(StoreError::InvalidPatch(format!(
                    "expected Object, got {}",
                    other.kind_name()
                )))
            }
        };
        if changes.contains_key(ID_FIELD) {
            return Err(StoreError::InvalidPatch(format!("'{}' cannot be patched", ID_FIELD)));
        }
        self.known(id.table())?;

        let mut tables = self.write()?;
        let current = tables
            .get_mut(id.table())
            .and_then(|t| t.get_mut(id.id()))
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        let mut next = current.clone();
        next.extend(changes);
        self.registry
            .validate_document(id.table(), &Value::Object(next.clone()))
            .map_err(|e| Self::rejected(id.table(), e))?;

        *current = next;
        log_event_with_fields(
            Event::DocumentCommitted,
            &[("collection", id.table()), ("id", id.id())],
        );
        Ok(())
    }

    fn get(&self, id: &DocumentId) -> StoreResult<Option<Value>> {
        self.known(id.table())?;
        let tables = self.read()?;
        Ok(tables
            .get(id.table())
            .and_then(|t| t.get(id.id()))
            .map(|fields| Value::Object(fields.clone())))
    }

    fn first(&self, collection: &str) -> StoreResult<Option<Value>> {
        self.known(collection)?;
        let tables = self.read()?;
        Ok(tables
            .get(collection)
            .and_then(|t| t.first())
            .map(|(_, fields)| Value::Object(fields.clone())))
    }
}
