//! CLI argument definitions using clap
//!
//! Commands:
//! - docshape check --config <path>
//! - docshape describe --config <path> [--json]
//! - docshape validate --config <path> --collection <name> [--insert]
//! - docshape args --config <path> --function <module:name>
//! - docshape codegen --config <path> [--out <file>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docshape - declared document types, checked
#[derive(Parser, Debug)]
#[command(name = "docshape")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the schema and function files and report what was declared
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./docshape.json")]
        config: PathBuf,
    },

    /// Print the declared types
    Describe {
        /// Path to configuration file
        #[arg(long, default_value = "./docshape.json")]
        config: PathBuf,

        /// Emit the type trees as JSON instead of constructor syntax
        #[arg(long)]
        json: bool,
    },

    /// Validate JSON documents read from stdin, one per line
    Validate {
        /// Path to configuration file
        #[arg(long, default_value = "./docshape.json")]
        config: PathBuf,

        /// Collection the documents belong to
        #[arg(long)]
        collection: String,

        /// Documents are new inserts without an `_id`
        #[arg(long)]
        insert: bool,
    },

    /// Validate endpoint argument objects read from stdin, one per line
    Args {
        /// Path to configuration file
        #[arg(long, default_value = "./docshape.json")]
        config: PathBuf,

        /// Endpoint path, `module:name`
        #[arg(long)]
        function: String,
    },

    /// Generate Rust types for the schema and endpoints
    Codegen {
        /// Path to configuration file
        #[arg(long, default_value = "./docshape.json")]
        config: PathBuf,

        /// Output file, overriding `out_file`; `-` writes to stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Command {
    /// Configuration file the command was given
    pub fn config_path(&self) -> &PathBuf {
        match self {
            Command::Check { config }
            | Command::Describe { config, .. }
            | Command::Validate { config, .. }
            | Command::Args { config, .. }
            | Command::Codegen { config, .. } => config,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
