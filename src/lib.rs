//! docshape - declared document types, checked
//!
//! A closed type language for JSON-like documents, a frozen registry of
//! collection shapes, typed endpoint declarations, a parser for the
//! declarative `v.*` source syntax and a Rust type generator.

pub mod cli;
pub mod codegen;
pub mod functions;
pub mod observability;
pub mod schema;
pub mod source;
pub mod store;
pub mod types;
pub mod value;
