//! Loads schema and function files from disk into the registries
//!
//! Any failure here is a startup failure: a missing file, a syntax error,
//! a malformed shape or a duplicate endpoint all stop the load.

use std::fs;
use std::path::{Path, PathBuf};

use crate::functions::FunctionRegistry;
use crate::observability::{log_event_with_fields, Event};
use crate::schema::SchemaRegistry;
use crate::types::Validator;

use super::errors::LoadError;
use super::parser::{parse_functions, parse_schema, SchemaSource};

/// Reads declarative sources and builds frozen registries from them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Loader {
    validator: Validator,
}

impl Loader {
    pub fn new(validator: Validator) -> Self {
        Self { validator }
    }

    /// Parses the schema file at `path`, registers every table and freezes
    /// the registry.
    pub fn load_schema(&self, path: &Path) -> Result<SchemaRegistry, LoadError> {
        let content = read_source(path)?;
        let schema = parse_schema(&content).map_err(|source| LoadError::Source {
            path: path.to_path_buf(),
            source,
        })?;

        let table_count = schema.tables.len().to_string();
        log_event_with_fields(
            Event::SourceParsed,
            &[
                ("file", &*path.to_string_lossy()),
                ("tables", table_count.as_str()),
            ],
        );

        self.build_registry(path, schema)
    }

    /// Registers parsed tables in declaration order and freezes.
    pub fn build_registry(
        &self,
        path: &Path,
        schema: SchemaSource,
    ) -> Result<SchemaRegistry, LoadError> {
        let schema_error = |source| LoadError::Schema {
            path: path.to_path_buf(),
            source,
        };

        let mut registry = SchemaRegistry::with_validator(self.validator);
        for table in schema.tables {
            for index in &table.ignored_indexes {
                log_event_with_fields(
                    Event::IndexDeclared,
                    &[("collection", table.name.as_str()), ("index", index.as_str())],
                );
            }
            registry
                .register(table.name, table.shape)
                .map_err(schema_error)?;
        }
        registry.freeze().map_err(schema_error)?;
        Ok(registry)
    }

    /// Parses every function file under `paths`. A directory contributes
    /// its `.ts` and `.js` files other than `schema.ts`, in name order.
    pub fn load_functions<P: AsRef<Path>>(
        &self,
        paths: &[P],
    ) -> Result<FunctionRegistry, LoadError> {
        let registry = FunctionRegistry::with_validator(self.validator);

        for path in paths {
            for file in function_files(path.as_ref())? {
                let module = module_name(&file);
                let content = read_source(&file)?;
                let endpoints =
                    parse_functions(&module, &content).map_err(|source| LoadError::Source {
                        path: file.clone(),
                        source,
                    })?;

                let count = endpoints.len().to_string();
                log_event_with_fields(
                    Event::SourceParsed,
                    &[
                        ("file", &*file.to_string_lossy()),
                        ("functions", count.as_str()),
                    ],
                );

                for endpoint in endpoints {
                    registry
                        .register(endpoint)
                        .map_err(|source| LoadError::Function {
                            path: file.clone(),
                            source,
                        })?;
                }
            }
        }

        Ok(registry)
    }
}

fn read_source(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn function_files(path: &Path) -> Result<Vec<PathBuf>, LoadError> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let io_error = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(io_error)? {
        let file = entry.map_err(io_error)?.path();
        let is_source = file
            .extension()
            .is_some_and(|ext| ext == "ts" || ext == "js");
        let is_schema = file.file_stem().is_some_and(|stem| stem == "schema");
        if file.is_file() && is_source && !is_schema {
            files.push(file);
        }
    }
    files.sort();
    Ok(files)
}

/// File stem, the module part of `module:name`
fn module_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaErrorCode;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_schema_freezes() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "schema.ts",
            "export default defineSchema({ games: defineTable({ win_count: v.int64() }) });",
        );
        let registry = Loader::default().load_schema(&path).unwrap();
        assert!(registry.is_frozen());
        assert!(registry.lookup("games").is_some());
    }

    #[test]
    fn test_missing_schema_file() {
        let dir = TempDir::new().unwrap();
        let err = Loader::default()
            .load_schema(&dir.path().join("schema.ts"))
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_duplicate_table_is_schema_error() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "schema.ts",
            "defineSchema({ a: defineTable({}), a: defineTable({}) })",
        );
        match Loader::default().load_schema(&path).unwrap_err() {
            LoadError::Schema { source, .. } => {
                assert_eq!(source.code(), SchemaErrorCode::DuplicateCollection)
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_load_functions_from_directory() {
        let dir = TempDir::new().unwrap();
        write(&dir, "schema.ts", "defineSchema({})");
        write(&dir, "notes.md", "export const x = query({})");
        write(
            &dir,
            "games.ts",
            "export const getGame = query({ args: {}, handler: async () => {} });",
        );
        write(
            &dir,
            "players.ts",
            "export const list = query({ args: { limit: v.number() }, handler: async () => {} });",
        );

        let registry = Loader::default().load_functions(&[dir.path()]).unwrap();
        let paths: Vec<_> = registry.list().iter().map(|e| e.path()).collect();
        assert_eq!(paths, vec!["games:getGame", "players:list"]);
    }

    #[test]
    fn test_duplicate_endpoint_across_paths() {
        let dir = TempDir::new().unwrap();
        let file = write(&dir, "games.ts", "export const a = query({ args: {} });");
        let err = Loader::default()
            .load_functions(&[file.clone(), file])
            .unwrap_err();
        assert!(matches!(err, LoadError::Function { .. }));
    }
}
