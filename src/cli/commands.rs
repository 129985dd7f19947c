//! CLI command implementations
//!
//! Every command follows the same startup sequence:
//! 1. Configuration load, log level applied
//! 2. Schema load, registry frozen
//! 3. Function files load
//!
//! A failure in any step is fatal and ends the command. After startup the
//! registries are read-only.

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

use crate::codegen;
use crate::functions::{FunctionError, FunctionRegistry};
use crate::observability::{log_event_with_fields, Event, Logger, Severity};
use crate::schema::{SchemaError, SchemaRegistry};
use crate::source::{LoadError, Loader};
use crate::types::{describe, ValidationError, Validator, DEFAULT_MAX_DEPTH};
use crate::value::Value;

use super::args::Command;
use super::errors::{CliError, CliResult};
use super::io::{read_requests, write_error, write_response, write_text};

/// Configuration file structure (`docshape.json`)
///
/// Relative paths in a configuration file are resolved against the
/// directory that contains it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Schema file (default `convex/schema.ts`)
    #[serde(default = "default_schema_path")]
    pub schema_path: PathBuf,

    /// Function files or directories (default none)
    #[serde(default)]
    pub function_paths: Vec<PathBuf>,

    /// Generated Rust output (default `src/convex_types.rs`)
    #[serde(default = "default_out_file")]
    pub out_file: PathBuf,

    /// Nesting bound for validation and JSON decoding (default 64)
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Minimum log severity (default `info`)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_schema_path() -> PathBuf {
    PathBuf::from("convex/schema.ts")
}
fn default_out_file() -> PathBuf {
    PathBuf::from("src/convex_types.rs")
}
fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_path: default_schema_path(),
            function_paths: Vec::new(),
            out_file: default_out_file(),
            max_depth: default_max_depth(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from file. A missing file means all defaults.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.max_depth == 0 {
            return Err(CliError::config_error("max_depth must be > 0"));
        }
        self.severity()?;
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        resolve(&mut self.schema_path);
        resolve(&mut self.out_file);
        self.function_paths.iter_mut().for_each(resolve);
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e| CliError::config_error(format!("Invalid log_level: {}", e)))
    }

    pub fn validator(&self) -> Validator {
        Validator::new(self.max_depth)
    }
}

/// Frozen registries built at startup
#[derive(Debug)]
pub struct Project {
    pub registry: Arc<SchemaRegistry>,
    pub functions: FunctionRegistry,
}

/// Loads and freezes the schema, then loads the function files.
pub fn load_project(config: &Config) -> CliResult<Project> {
    let loader = Loader::new(config.validator());
    let registry = loader
        .load_schema(&config.schema_path)
        .map_err(startup_failed)?;
    let functions = loader
        .load_functions(&config.function_paths)
        .map_err(startup_failed)?;

    Ok(Project {
        registry: Arc::new(registry),
        functions,
    })
}

fn startup_failed(err: LoadError) -> CliError {
    log_event_with_fields(Event::StartupFailed, &[("error", err.to_string().as_str())]);
    err.into()
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    let config = Config::load(cmd.config_path())?;
    Logger::set_min_severity(config.severity()?);
    log_event_with_fields(
        Event::ConfigLoaded,
        &[
            ("path", &*cmd.config_path().to_string_lossy()),
            ("schema_path", &*config.schema_path.to_string_lossy()),
        ],
    );

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cmd {
        Command::Check { .. } => check(&config, &mut out),
        Command::Describe { json, .. } => describe_types(&config, json, &mut out),
        Command::Validate {
            collection, insert, ..
        } => validate(&config, &collection, insert, stdin.lock(), &mut out),
        Command::Args { function, .. } => check_args(&config, &function, stdin.lock(), &mut out),
        Command::Codegen { out: target, .. } => {
            generate_types(&config, target.as_deref(), &mut out)
        }
    }
}

/// Loads everything and reports the declared collections and endpoints.
pub fn check<W: Write>(config: &Config, out: &mut W) -> CliResult<()> {
    let project = load_project(config)?;

    let collections: Vec<JsonValue> = project
        .registry
        .collections()
        .map(|(name, shape)| {
            json!({
                "name": name,
                "fields": shape.user_fields().count(),
                "indexes": shape.indexes().len(),
            })
        })
        .collect();
    let functions: Vec<String> = project.functions.list().iter().map(|e| e.path()).collect();

    write_response(out, json!({"collections": collections, "functions": functions}))
}

/// Prints every declared type, as constructor syntax or as JSON.
pub fn describe_types<W: Write>(config: &Config, as_json: bool, out: &mut W) -> CliResult<()> {
    let project = load_project(config)?;

    if as_json {
        let mut collections = serde_json::Map::new();
        for (name, shape) in project.registry.collections() {
            collections.insert(name.to_string(), serde_json::to_value(shape)?);
        }
        let functions = project
            .functions
            .list()
            .iter()
            .map(|endpoint| serde_json::to_value(endpoint.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        return write_response(out, json!({"collections": collections, "functions": functions}));
    }

    for (name, shape) in project.registry.collections() {
        if let Some(node) = project.registry.document_node(name) {
            write_text(out, &format!("{}: {}", name, describe(node)))?;
        }
        for index in shape.indexes() {
            write_text(out, &format!("  .index({:?}, {:?})", index.name, index.fields))?;
        }
    }

    for endpoint in project.functions.list() {
        let visibility = if endpoint.internal { "internal " } else { "" };
        let mut line = format!(
            "{} ({}{}) args: {}",
            endpoint.path(),
            visibility,
            endpoint.kind,
            describe(endpoint.args())
        );
        if let Some(returns) = &endpoint.returns {
            line.push_str(&format!(" returns: {}", describe(returns)));
        }
        write_text(out, &line)?;
    }

    Ok(())
}

/// Validates each JSON document on `input` against `collection`.
pub fn validate<R: BufRead, W: Write>(
    config: &Config,
    collection: &str,
    insert: bool,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    let project = load_project(config)?;
    let registry = project.registry;
    if registry.lookup(collection).is_none() {
        return Err(CliError::unknown_collection(collection));
    }

    answer_lines(input, out, config.max_depth, collection, |value| {
        let result = if insert {
            registry.validate_insert(collection, value)
        } else {
            registry.validate_document(collection, value)
        };
        result.map_err(Rejection::from)
    })
}

/// Checks each JSON argument object on `input` against `function`.
pub fn check_args<R: BufRead, W: Write>(
    config: &Config,
    function: &str,
    input: R,
    out: &mut W,
) -> CliResult<()> {
    let project = load_project(config)?;
    if project.functions.get(function).is_err() {
        return Err(CliError::unknown_function(function));
    }

    answer_lines(input, out, config.max_depth, function, |value| {
        project
            .functions
            .bind_args(function, value)
            .map(|_| ())
            .map_err(Rejection::from)
    })
}

/// Writes generated Rust to `target` (or `out_file`); `-` means `out`.
pub fn generate_types<W: Write>(
    config: &Config,
    target: Option<&Path>,
    out: &mut W,
) -> CliResult<()> {
    let project = load_project(config)?;
    let source = codegen::generate(&project.registry, &project.functions);

    let target = target.unwrap_or(config.out_file.as_path());
    if target == Path::new("-") {
        out.write_all(source.as_bytes())?;
        out.flush()?;
        return Ok(());
    }

    if let Some(parent) = target.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(target, &source)?;

    let bytes = source.len().to_string();
    log_event_with_fields(
        Event::CodegenWritten,
        &[
            ("bytes", bytes.as_str()),
            ("out_file", &*target.to_string_lossy()),
        ],
    );

    write_response(
        out,
        json!({
            "out_file": target.display().to_string(),
            "collections": project.registry.len(),
            "functions": project.functions.len(),
        }),
    )
}

const INVALID_JSON: &str = "DOCSHAPE_INVALID_JSON";
const DECODE_FAILED: &str = "DOCSHAPE_DECODE_FAILED";

/// A refused document or argument set, as written back to the caller
struct Rejection {
    code: &'static str,
    message: String,
    validation: Option<ValidationError>,
}

impl From<SchemaError> for Rejection {
    fn from(err: SchemaError) -> Self {
        Self {
            code: err.code().code(),
            message: err.message().to_string(),
            validation: err.details().cloned(),
        }
    }
}

impl From<FunctionError> for Rejection {
    fn from(err: FunctionError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
            validation: err.validation().cloned(),
        }
    }
}

impl Rejection {
    fn details(&self, line: usize) -> JsonValue {
        let mut details = json!({ "line": line });
        if let Some(validation) = &self.validation {
            details["path"] = json!(validation.path().to_string());
            details["expected"] = json!(validation.expected());
            details["actual"] = json!(validation.actual());
        }
        details
    }
}

/// Answers every line of `input` with one response line on `out`.
fn answer_lines<R, W, F>(
    input: R,
    out: &mut W,
    max_depth: usize,
    subject: &str,
    mut check: F,
) -> CliResult<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(&Value) -> Result<(), Rejection>,
{
    for request in read_requests(input) {
        let (line, parsed) = request?;
        let line_field = json!({ "line": line });

        let json = match parsed {
            Ok(json) => json,
            Err(e) => {
                write_error(out, INVALID_JSON, &e.to_string(), Some(line_field))?;
                continue;
            }
        };
        // Decoding is bounded looser than validation so an over-deep value
        // is rejected by the validator with the path where it tripped.
        let value = match Value::from_json_with_depth(&json, max_depth.saturating_mul(2)) {
            Ok(value) => value,
            Err(e) => {
                write_error(out, DECODE_FAILED, &e.to_string(), Some(line_field))?;
                continue;
            }
        };

        match check(&value) {
            Ok(()) => write_response(out, json!({"line": line, "valid": true}))?,
            Err(rejection) => {
                let line_text = line.to_string();
                log_event_with_fields(
                    Event::ValidationRejected,
                    &[
                        ("code", rejection.code),
                        ("line", line_text.as_str()),
                        ("subject", subject),
                    ],
                );
                write_error(
                    out,
                    rejection.code,
                    &rejection.message,
                    Some(rejection.details(line)),
                )?;
            }
        }
    }
    Ok(())
}
