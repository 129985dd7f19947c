//! Schema registry subsystem
//!
//! Collects the named document shapes of a deployment into one registry,
//! built once at startup, frozen, then consulted read-only.
//!
//! # Design Principles
//!
//! - Build then freeze; no runtime schema mutation
//! - `_id: Id(<collection>)` is implicit on every stored document
//! - Misconfiguration is fatal at startup, validation failures are rejects
//! - Deterministic validation

mod errors;
mod registry;
mod shape;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use registry::{RegistryState, SchemaRegistry};
pub use shape::{DocumentShape, IndexDef, ID_FIELD};
