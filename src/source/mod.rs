//! Declarative source parsing
//!
//! Reads the TypeScript-flavoured schema and function files that declare
//! a deployment's collections and endpoints:
//!
//! ```text
//! export default defineSchema({
//!   games: defineTable({ win_count: v.int64(), loss_count: v.int64() }),
//! });
//! ```
//!
//! The accepted validator syntax is the same one `describe` produces.

mod errors;
mod loader;
mod parser;

pub use errors::{LoadError, SourceError, SourceResult};
pub use loader::Loader;
pub use parser::{
    parse_functions, parse_schema, parse_validator, SchemaSource, TableSource, VALID_VALIDATORS,
};
