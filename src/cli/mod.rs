//! CLI module for docshape
//!
//! Provides command-line interface for:
//! - check: Load and report declared collections and endpoints
//! - describe: Print declared types
//! - validate: Validate documents from stdin
//! - args: Validate endpoint arguments from stdin
//! - codegen: Write Rust types for the schema and endpoints

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{
    check, check_args, describe_types, generate_types, load_project, run, run_command, validate,
    Config, Project,
};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_requests, write_error, write_response, write_text};
