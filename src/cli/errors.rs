//! CLI-specific error types
//!
//! A CLI error ends the command with a non-zero exit. Per-document
//! rejections are not CLI errors; they are written as error responses and
//! the command carries on with the next line.

use std::fmt;
use std::io;

use crate::source::LoadError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout/output file)
    IoError,
    /// Schema or function sources failed to load
    LoadFailed,
    /// `--collection` names no registered collection
    UnknownCollection,
    /// `--function` names no registered endpoint
    UnknownFunction,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DOCSHAPE_CLI_CONFIG_ERROR",
            Self::IoError => "DOCSHAPE_CLI_IO_ERROR",
            Self::LoadFailed => "DOCSHAPE_CLI_LOAD_FAILED",
            Self::UnknownCollection => "DOCSHAPE_CLI_UNKNOWN_COLLECTION",
            Self::UnknownFunction => "DOCSHAPE_CLI_UNKNOWN_FUNCTION",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn unknown_collection(name: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownCollection,
            format!("Collection '{}' is not declared in the schema", name),
        )
    }

    pub fn unknown_function(path: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownFunction,
            format!("Function '{}' is not declared in any function file", path),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<LoadError> for CliError {
    fn from(e: LoadError) -> Self {
        Self::new(CliErrorCode::LoadFailed, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
