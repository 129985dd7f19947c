//! Type descriptor library
//!
//! A closed set of composable type nodes describing document shapes, plus
//! the operations over them:
//! - `validate`: check a value against a node, reporting the first mismatch
//! - `describe`: stable text form, equal iff the trees are structurally equal
//! - `encode`: validate then emit the wire format in declared field order
//!
//! # Invariants
//!
//! - Type trees are acyclic and immutable once built
//! - Object field names are unique within a node
//! - Unions have at least one alternative; the first matching one wins
//! - Record keys are strings, ids or string literals
//! - No implicit numeric coercion

mod describe;
mod errors;
mod node;
mod validator;

pub use describe::{describe, describe_literal};
pub use errors::{FieldPath, PathSegment, TypeError, ValidationError};
pub use node::{field_map, FieldMap, Literal, TypeNode};
pub use validator::{encode, validate, Validator, DEFAULT_MAX_DEPTH};
