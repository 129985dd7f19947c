//! # Function Registry
//!
//! Endpoints by `module:name` path. Arguments are checked against the
//! declared args node before a handler is allowed to run.

use std::sync::{Arc, RwLock};

use indexmap::IndexMap;

use crate::observability::{log_event_with_fields, Event};
use crate::types::Validator;
use crate::value::Value;

use super::endpoint::Endpoint;
use super::errors::{FunctionError, FunctionResult};

/// Registry of declared endpoints
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    /// Endpoints by path, in registration order
    by_path: RwLock<IndexMap<String, Arc<Endpoint>>>,

    validator: Validator,
}

impl FunctionRegistry {
    /// Create a new registry
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validator(validator: Validator) -> Self {
        Self {
            by_path: RwLock::default(),
            validator,
        }
    }

    /// Register an endpoint
    pub fn register(&self, endpoint: Endpoint) -> FunctionResult<()> {
        let path = endpoint.path();
        {
            let mut by_path = self
                .by_path
                .write()
                .map_err(|_| FunctionError::Internal("Lock poisoned".into()))?;
            if by_path.contains_key(&path) {
                return Err(FunctionError::AlreadyExists(path));
            }
            by_path.insert(path.clone(), Arc::new(endpoint));
        }

        log_event_with_fields(Event::FunctionRegistered, &[("function", path.as_str())]);
        Ok(())
    }

    /// Get endpoint by path
    pub fn get(&self, path: &str) -> FunctionResult<Arc<Endpoint>> {
        let by_path = self
            .by_path
            .read()
            .map_err(|_| FunctionError::Internal("Lock poisoned".into()))?;
        by_path
            .get(path)
            .cloned()
            .ok_or_else(|| FunctionError::NotFound(path.to_string()))
    }

    /// Checks a call's arguments and returns the endpoint to dispatch to.
    pub fn bind_args(&self, path: &str, args: &Value) -> FunctionResult<Arc<Endpoint>> {
        let endpoint = self.get(path)?;
        self.validator
            .validate(endpoint.args(), args)
            .map_err(|source| FunctionError::InvalidArguments {
                function: path.to_string(),
                source,
            })?;
        Ok(endpoint)
    }

    /// Checks a handler result against the declared return type, if any.
    pub fn check_return(&self, path: &str, value: &Value) -> FunctionResult<()> {
        let endpoint = self.get(path)?;
        match &endpoint.returns {
            Some(returns) => {
                self.validator
                    .validate(returns, value)
                    .map_err(|source| FunctionError::InvalidReturn {
                        function: path.to_string(),
                        source,
                    })
            }
            None => Ok(()),
        }
    }

    /// List all endpoints in registration order
    pub fn list(&self) -> Vec<Arc<Endpoint>> {
        self.by_path
            .read()
            .map(|m| m.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Get endpoint count
    pub fn len(&self) -> usize {
        self.by_path.read().map(|m| m.len()).unwrap_or(0)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
