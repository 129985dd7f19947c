//! # Endpoint Declaration

use std::fmt;

use serde::Serialize;

use crate::types::{FieldMap, TypeNode};

/// What an endpoint is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionKind {
    /// Read-only
    Query,
    /// Transactional write
    Mutation,
    /// Side effects outside the database
    Action,
}

impl FunctionKind {
    /// Maps a declaring constructor (`query`, `internalMutation`, ...) to the
    /// kind and whether it is internal.
    pub fn from_constructor(name: &str) -> Option<(FunctionKind, bool)> {
        match name {
            "query" => Some((FunctionKind::Query, false)),
            "mutation" => Some((FunctionKind::Mutation, false)),
            "action" => Some((FunctionKind::Action, false)),
            "internalQuery" => Some((FunctionKind::Query, true)),
            "internalMutation" => Some((FunctionKind::Mutation, true)),
            "internalAction" => Some((FunctionKind::Action, true)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FunctionKind::Query => "query",
            FunctionKind::Mutation => "mutation",
            FunctionKind::Action => "action",
        }
    }
}

impl fmt::Display for FunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    /// Module the endpoint is declared in (function file stem)
    pub module: String,
    /// Exported name
    pub name: String,
    pub kind: FunctionKind,
    /// Callable only from other endpoints
    pub internal: bool,
    /// Always an `Object` node
    args: TypeNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<TypeNode>,
}

impl Endpoint {
    /// Creates a public endpoint that takes no arguments.
    pub fn new(module: impl Into<String>, name: impl Into<String>, kind: FunctionKind) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            kind,
            internal: false,
            args: TypeNode::Object {
                fields: FieldMap::new(),
            },
            returns: None,
        }
    }

    pub fn internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    pub fn with_args(mut self, fields: FieldMap) -> Self {
        self.args = TypeNode::Object { fields };
        self
    }

    pub fn with_returns(mut self, returns: TypeNode) -> Self {
        self.returns = Some(returns);
        self
    }

    /// `module:name`
    pub fn path(&self) -> String {
        format!("{}:{}", self.module, self.name)
    }

    pub fn args(&self) -> &TypeNode {
        &self.args
    }

    /// Declared argument fields, in order
    pub fn arg_fields(&self) -> &FieldMap {
        match &self.args {
            TypeNode::Object { fields } => fields,
            _ => unreachable!("endpoint args are always an object node"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::field_map;

    #[test]
    fn test_from_constructor() {
        assert_eq!(
            FunctionKind::from_constructor("mutation"),
            Some((FunctionKind::Mutation, false))
        );
        assert_eq!(
            FunctionKind::from_constructor("internalAction"),
            Some((FunctionKind::Action, true))
        );
        assert_eq!(FunctionKind::from_constructor("httpAction"), None);
    }

    #[test]
    fn test_path_and_args() {
        let endpoint = Endpoint::new("test", "testQuery", FunctionKind::Query)
            .with_args(field_map([("test", TypeNode::String)]).unwrap());
        assert_eq!(endpoint.path(), "test:testQuery");
        assert_eq!(endpoint.arg_fields().len(), 1);
        assert!(!endpoint.internal);
    }

    #[test]
    fn test_default_args_are_empty_object() {
        let endpoint = Endpoint::new("games", "getGame", FunctionKind::Query);
        assert!(endpoint.arg_fields().is_empty());
        assert!(endpoint.returns.is_none());
    }
}
