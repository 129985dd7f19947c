//! # Endpoints
//!
//! Declared queries, mutations and actions with their argument and
//! return types. Handlers are not executed here; the registry only
//! decides whether a call or a result is well-typed.

pub mod endpoint;
pub mod errors;
pub mod registry;

pub use endpoint::{Endpoint, FunctionKind};
pub use errors::{FunctionError, FunctionResult};
pub use registry::FunctionRegistry;
